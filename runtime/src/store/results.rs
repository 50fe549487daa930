use super::{new_id, now, parse_enum, parse_time, placeholders, Store};
use crate::model::{TestResult, TestStatus};
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, Row};

const COLUMNS: &str = "id, page_id, test_type, status, notes, created_at, updated_at";

fn result_from_row(row: &Row<'_>) -> rusqlite::Result<TestResult> {
    let status: String = row.get(3)?;
    let created: String = row.get(5)?;
    let updated: String = row.get(6)?;
    Ok(TestResult {
        id: row.get(0)?,
        page_id: row.get(1)?,
        test_type: row.get(2)?,
        status: parse_enum(3, &status)?,
        notes: row.get(4)?,
        created_at: parse_time(5, &created)?,
        updated_at: parse_time(6, &updated)?,
    })
}

impl Store {
    /// Record a result, replacing any earlier one for the same page and test type.
    pub fn upsert_test_result(
        &self,
        page_id: &str,
        test_type: &str,
        status: TestStatus,
        notes: Option<&str>,
    ) -> Result<TestResult> {
        let ts = now();
        let notes = notes.map(str::trim).filter(|n| !n.is_empty());
        self.db
            .execute(
                "INSERT INTO test_results (id, page_id, test_type, status, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT (page_id, test_type) DO UPDATE SET
                     status = excluded.status,
                     notes = excluded.notes,
                     updated_at = excluded.updated_at",
                params![new_id(), page_id, test_type, status.as_str(), notes, ts],
            )
            .with_context(|| format!("failed to save {test_type} result"))?;

        self.db
            .query_row(
                &format!("SELECT {COLUMNS} FROM test_results WHERE page_id = ?1 AND test_type = ?2"),
                params![page_id, test_type],
                result_from_row,
            )
            .context("failed to reload test result")
    }

    /// All results for any of `page_ids`.
    pub fn list_test_results(&self, page_ids: &[String]) -> Result<Vec<TestResult>> {
        if page_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.db.prepare(&format!(
            "SELECT {COLUMNS} FROM test_results WHERE page_id IN ({}) ORDER BY page_id, test_type",
            placeholders(page_ids.len())
        ))?;
        let results = stmt
            .query_map(params_from_iter(page_ids.iter()), result_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list test results")?;
        Ok(results)
    }
}
