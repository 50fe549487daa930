use super::{new_id, now, parse_opt_time, parse_time, Store};
use crate::model::{NewWebsite, Website, WebsiteChanges};
use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

const COLUMNS: &str = "id, name, base_url, sitemap_url, created_at, updated_at, deleted_at";

fn website_from_row(row: &Row<'_>) -> rusqlite::Result<Website> {
    let created: String = row.get(4)?;
    let updated: String = row.get(5)?;
    Ok(Website {
        id: row.get(0)?,
        name: row.get(1)?,
        base_url: row.get(2)?,
        sitemap_url: row.get(3)?,
        created_at: parse_time(4, &created)?,
        updated_at: parse_time(5, &updated)?,
        deleted_at: parse_opt_time(6, row.get(6)?)?,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Store {
    /// Insert a website.
    pub fn create_website(&self, new: &NewWebsite) -> Result<Website> {
        let id = new_id();
        let ts = now();
        self.db
            .execute(
                "INSERT INTO websites (id, name, base_url, sitemap_url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![
                    id,
                    new.name.trim(),
                    new.base_url.trim(),
                    non_empty(new.sitemap_url.as_deref()),
                    ts
                ],
            )
            .context("failed to insert website")?;

        self.get_website(&id)?
            .context("website vanished after insert")
    }

    /// All websites that are not soft-deleted, oldest first.
    pub fn list_websites(&self) -> Result<Vec<Website>> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {COLUMNS} FROM websites WHERE deleted_at IS NULL ORDER BY created_at, rowid"
        ))?;
        let websites = stmt
            .query_map([], website_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to list websites")?;
        Ok(websites)
    }

    /// A website by id, unless it is soft-deleted.
    pub fn get_website(&self, id: &str) -> Result<Option<Website>> {
        self.db
            .query_row(
                &format!("SELECT {COLUMNS} FROM websites WHERE id = ?1 AND deleted_at IS NULL"),
                params![id],
                website_from_row,
            )
            .optional()
            .context("failed to load website")
    }

    /// A live website by id or by case-insensitive name.
    pub fn find_website(&self, key: &str) -> Result<Option<Website>> {
        self.db
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM websites
                     WHERE deleted_at IS NULL AND (id = ?1 OR lower(name) = lower(?1))
                     ORDER BY created_at, rowid LIMIT 1"
                ),
                params![key.trim()],
                website_from_row,
            )
            .optional()
            .context("failed to look up website")
    }

    /// Apply `changes` to a live website. Returns `None` if it does not exist.
    ///
    /// An empty `sitemap_url` clears the column.
    pub fn update_website(&self, id: &str, changes: &WebsiteChanges) -> Result<Option<Website>> {
        let Some(current) = self.get_website(id)? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(current));
        }

        let name = non_empty(changes.name.as_deref()).unwrap_or(current.name.as_str());
        let base_url = non_empty(changes.base_url.as_deref()).unwrap_or(current.base_url.as_str());
        let sitemap_url = match &changes.sitemap_url {
            Some(s) => non_empty(Some(s.as_str())),
            None => current.sitemap_url.as_deref(),
        };

        self.db
            .execute(
                "UPDATE websites SET name = ?2, base_url = ?3, sitemap_url = ?4, updated_at = ?5
                 WHERE id = ?1 AND deleted_at IS NULL",
                params![id, name, base_url, sitemap_url, now()],
            )
            .context("failed to update website")?;

        self.get_website(id)
    }

    /// Mark a website deleted. Returns `false` if it was missing or already deleted.
    pub fn soft_delete_website(&self, id: &str) -> Result<bool> {
        let ts = now();
        let rows = self
            .db
            .execute(
                "UPDATE websites SET deleted_at = ?2, updated_at = ?2
                 WHERE id = ?1 AND deleted_at IS NULL",
                params![id, ts],
            )
            .context("failed to delete website")?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(name: &str) -> NewWebsite {
        NewWebsite {
            name: name.to_string(),
            base_url: format!("https://{}.example", name.to_lowercase()),
            sitemap_url: None,
        }
    }

    #[test]
    fn test_create_and_list() {
        let store = Store::open_in_memory().unwrap();
        let a = store.create_website(&site("Alpha")).unwrap();
        let b = store.create_website(&site("Beta")).unwrap();

        let all = store.list_websites().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);
        assert_eq!(all[1].id, b.id);
        assert!(a.deleted_at.is_none());
        assert!(a.sitemap_url.is_none());
    }

    #[test]
    fn test_soft_delete_hides_website() {
        let store = Store::open_in_memory().unwrap();
        let a = store.create_website(&site("Alpha")).unwrap();

        assert!(store.soft_delete_website(&a.id).unwrap());
        assert!(!store.soft_delete_website(&a.id).unwrap());
        assert!(store.list_websites().unwrap().is_empty());
        assert!(store.get_website(&a.id).unwrap().is_none());
        assert!(store.find_website("alpha").unwrap().is_none());

        // The row is still there for history.
        let count: i64 = store
            .db
            .query_row("SELECT COUNT(*) FROM websites WHERE deleted_at IS NOT NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_find_by_id_or_name() {
        let store = Store::open_in_memory().unwrap();
        let a = store.create_website(&site("Shop Front")).unwrap();
        assert_eq!(store.find_website(&a.id).unwrap().unwrap().id, a.id);
        assert_eq!(store.find_website("shop front").unwrap().unwrap().id, a.id);
        assert!(store.find_website("nope").unwrap().is_none());
    }

    #[test]
    fn test_update_website() {
        let store = Store::open_in_memory().unwrap();
        let mut new = site("Alpha");
        new.sitemap_url = Some("https://alpha.example/sitemap.xml".into());
        let a = store.create_website(&new).unwrap();

        let changes = WebsiteChanges {
            name: Some("Alpha Prime".into()),
            base_url: None,
            sitemap_url: Some(String::new()),
        };
        let updated = store.update_website(&a.id, &changes).unwrap().unwrap();
        assert_eq!(updated.name, "Alpha Prime");
        assert_eq!(updated.base_url, a.base_url);
        assert!(updated.sitemap_url.is_none());

        assert!(store.update_website("missing", &changes).unwrap().is_none());
    }
}
