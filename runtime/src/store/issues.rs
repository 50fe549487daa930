use super::{new_id, now, parse_enum, parse_time, placeholders, Store};
use crate::model::{Issue, IssuePriority, IssueStatus, NewIssue};
use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

const COLUMNS: &str = "id, page_id, title, description, priority, status, created_at, updated_at";

fn issue_from_row(row: &Row<'_>) -> rusqlite::Result<Issue> {
    let priority: Option<String> = row.get(4)?;
    let status: Option<String> = row.get(5)?;
    let created: String = row.get(6)?;
    let updated: String = row.get(7)?;
    Ok(Issue {
        id: row.get(0)?,
        page_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        priority: priority
            .map(|p| parse_enum::<IssuePriority>(4, &p))
            .transpose()?,
        status: status.map(|s| parse_enum::<IssueStatus>(5, &s)).transpose()?,
        created_at: parse_time(6, &created)?,
        updated_at: parse_time(7, &updated)?,
    })
}

impl Store {
    /// Log an issue. It starts open, with medium priority unless given.
    pub fn insert_issue(&self, new: &NewIssue) -> Result<Issue> {
        let id = new_id();
        let ts = now();
        let priority = new.priority.unwrap_or_default();
        let description = new
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());
        self.db
            .execute(
                "INSERT INTO issues (id, page_id, title, description, priority, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    id,
                    new.page_id,
                    new.title.trim(),
                    description,
                    priority.as_str(),
                    IssueStatus::Open.as_str(),
                    ts
                ],
            )
            .context("failed to insert issue")?;

        self.get_issue(&id)?.context("issue vanished after insert")
    }

    pub fn get_issue(&self, id: &str) -> Result<Option<Issue>> {
        self.db
            .query_row(
                &format!("SELECT {COLUMNS} FROM issues WHERE id = ?1"),
                params![id],
                issue_from_row,
            )
            .optional()
            .context("failed to load issue")
    }

    /// Issues for any of `page_ids`, oldest first.
    pub fn list_issues(&self, page_ids: &[String]) -> Result<Vec<Issue>> {
        if page_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut stmt = self.db.prepare(&format!(
            "SELECT {COLUMNS} FROM issues WHERE page_id IN ({}) ORDER BY created_at, rowid",
            placeholders(page_ids.len())
        ))?;
        let issues = stmt
            .query_map(params_from_iter(page_ids.iter()), issue_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list issues")?;
        Ok(issues)
    }

    /// Change an issue's status. Returns `None` if the issue does not exist.
    pub fn set_issue_status(&self, id: &str, status: IssueStatus) -> Result<Option<Issue>> {
        let rows = self
            .db
            .execute(
                "UPDATE issues SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id, status.as_str(), now()],
            )
            .context("failed to update issue")?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_issue(id)
    }
}
