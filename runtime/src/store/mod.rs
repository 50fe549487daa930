//! SQLite-backed persistence for websites, pages, test results and issues.
//!
//! One `Store` wraps one connection. Foreign keys are enforced, so pages,
//! results and issues cascade with their parent rows. Websites are only
//! ever soft-deleted, and every website read filters out deleted rows.

mod issues;
mod pages;
mod results;
mod schema;
mod websites;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;
use std::path::Path;
use std::str::FromStr;

/// Persistent store.
pub struct Store {
    db: Connection,
}

impl Store {
    /// Open or create a store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create data directory: {}", parent.display())
                })?;
            }
        }
        let db = Connection::open(path)
            .with_context(|| format!("failed to open database: {}", path.display()))?;
        Self::init(db)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::init(db)
    }

    fn init(db: Connection) -> Result<Self> {
        db.execute_batch("PRAGMA foreign_keys = ON;")
            .context("failed to enable foreign keys")?;
        schema::migrate(&db)?;
        Ok(Self { db })
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn now() -> String {
    timestamp(Utc::now())
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_opt_time(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_time(idx, &s)).transpose()
}

fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// `?1, ?2, …, ?n` for an `IN (...)` clause.
fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?1");
        assert_eq!(placeholders(3), "?1, ?2, ?3");
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let t = Utc::now();
        let parsed = parse_time(0, &timestamp(t)).unwrap();
        assert_eq!(parsed.timestamp_micros(), t.timestamp_micros());
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sitecheck.db");
        Store::open(&path).unwrap();
        assert!(path.exists());
    }
}
