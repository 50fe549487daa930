use super::{new_id, now, parse_time, Store};
use crate::model::{NewPage, Page};
use anyhow::{bail, Context, Result};
use rusqlite::{params, OptionalExtension, Row};

const COLUMNS: &str = "id, website_id, url, title, parent_id, order_index, created_at, updated_at";

/// Shortest id prefix accepted by [`Store::resolve_page`].
pub const MIN_PREFIX_LEN: usize = 4;

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    let created: String = row.get(6)?;
    let updated: String = row.get(7)?;
    Ok(Page {
        id: row.get(0)?,
        website_id: row.get(1)?,
        url: row.get(2)?,
        title: row.get(3)?,
        parent_id: row.get(4)?,
        order_index: row.get(5)?,
        created_at: parse_time(6, &created)?,
        updated_at: parse_time(7, &updated)?,
    })
}

impl Store {
    fn page_count(&self, website_id: &str) -> Result<i64> {
        self.db
            .query_row(
                "SELECT COUNT(*) FROM pages WHERE website_id = ?1",
                params![website_id],
                |r| r.get(0),
            )
            .context("failed to count pages")
    }

    /// Bulk-insert pages in one transaction, keeping their list order.
    ///
    /// New pages are appended after any existing ones, so on a fresh
    /// website `order_index` equals the position in `pages`.
    pub fn insert_pages(&mut self, website_id: &str, pages: &[NewPage]) -> Result<Vec<Page>> {
        let offset = self.page_count(website_id)?;
        let ts = now();
        let tx = self.db.transaction().context("failed to begin transaction")?;
        let mut ids = Vec::with_capacity(pages.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO pages (id, website_id, url, title, order_index, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            )?;
            for (i, page) in pages.iter().enumerate() {
                let id = new_id();
                stmt.execute(params![
                    id,
                    website_id,
                    page.url,
                    page.title,
                    offset + i as i64,
                    ts
                ])
                .with_context(|| format!("failed to insert page {}", page.url))?;
                ids.push(id);
            }
        }
        tx.commit().context("failed to commit pages")?;

        let mut inserted = Vec::with_capacity(ids.len());
        for id in &ids {
            if let Some(page) = self.get_page(id)? {
                inserted.push(page);
            }
        }
        Ok(inserted)
    }

    /// Insert a single page at the end of the website's list.
    pub fn add_page(&mut self, website_id: &str, url: &str, title: Option<&str>) -> Result<Page> {
        let new = NewPage {
            url: url.trim().to_string(),
            title: title.map(str::to_string),
        };
        self.insert_pages(website_id, std::slice::from_ref(&new))?
            .pop()
            .context("page vanished after insert")
    }

    /// Pages of a website in display order.
    pub fn list_pages(&self, website_id: &str) -> Result<Vec<Page>> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {COLUMNS} FROM pages WHERE website_id = ?1 ORDER BY order_index, rowid"
        ))?;
        let pages = stmt
            .query_map(params![website_id], page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list pages")?;
        Ok(pages)
    }

    pub fn get_page(&self, id: &str) -> Result<Option<Page>> {
        self.db
            .query_row(
                &format!("SELECT {COLUMNS} FROM pages WHERE id = ?1"),
                params![id],
                page_from_row,
            )
            .optional()
            .context("failed to load page")
    }

    /// A page by full id or by an unambiguous id prefix.
    pub fn resolve_page(&self, key: &str) -> Result<Option<Page>> {
        let key = key.trim();
        if let Some(page) = self.get_page(key)? {
            return Ok(Some(page));
        }
        if key.len() < MIN_PREFIX_LEN || key.contains(['%', '_']) {
            return Ok(None);
        }

        let mut stmt = self.db.prepare(&format!(
            "SELECT {COLUMNS} FROM pages WHERE id LIKE ?1 || '%' LIMIT 2"
        ))?;
        let mut matches = stmt
            .query_map(params![key], page_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to resolve page")?;
        if matches.len() > 1 {
            bail!("page id prefix '{key}' is ambiguous");
        }
        Ok(matches.pop())
    }

    /// Rewrite `order_index` so pages follow `ordered_ids`.
    ///
    /// Pages of the website missing from `ordered_ids` keep their relative
    /// order after the listed ones.
    pub fn resequence_pages(&mut self, website_id: &str, ordered_ids: &[String]) -> Result<Vec<Page>> {
        let existing = self.list_pages(website_id)?;
        for id in ordered_ids {
            if !existing.iter().any(|p| &p.id == id) {
                bail!("page {id} does not belong to website {website_id}");
            }
        }

        let rest = existing
            .iter()
            .map(|p| &p.id)
            .filter(|id| !ordered_ids.contains(*id));
        let sequence: Vec<&String> = ordered_ids.iter().chain(rest).collect();

        let ts = now();
        let tx = self.db.transaction().context("failed to begin transaction")?;
        {
            let mut stmt = tx.prepare(
                "UPDATE pages SET order_index = ?2, updated_at = ?3 WHERE id = ?1",
            )?;
            for (i, id) in sequence.iter().enumerate() {
                stmt.execute(params![id, i as i64, ts])?;
            }
        }
        tx.commit().context("failed to commit page order")?;

        self.list_pages(website_id)
    }
}
