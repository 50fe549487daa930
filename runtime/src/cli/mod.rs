//! CLI subcommand implementations for the Sitecheck binary.
//!
//! One-shot subcommands and REPL slash commands share these functions, so
//! both act on a [`Context`] holding the open session.

pub mod checklist_cmd;
pub mod export_cmd;
pub mod import_cmd;
pub mod issue_cmd;
pub mod output;
pub mod page_cmd;
pub mod progress;
pub mod repl;
pub mod repl_commands;
pub mod repl_complete;
pub mod serve_cmd;
pub mod website_cmd;

use crate::acquisition::http_client::HttpClient;
use crate::config::Settings;
use crate::session::Session;
use crate::store::Store;
use anyhow::{Context as _, Result};
use tracing::debug;

/// Everything a command needs.
pub struct Context {
    pub settings: Settings,
    pub session: Session,
    pub client: HttpClient,
}

impl Context {
    /// Open the configured store and select `website`, or the first one.
    pub fn open(settings: Settings, website: Option<&str>) -> Result<Self> {
        let path = settings.database_path();
        debug!("opening store at {}", path.display());
        let store = Store::open(&path)?;
        Self::with_store(settings, store, website)
    }

    pub fn with_store(settings: Settings, store: Store, website: Option<&str>) -> Result<Self> {
        let client =
            HttpClient::new(settings.http.timeout_ms).context("failed to build HTTP client")?;
        let mut session = Session::new(store);
        match website {
            Some(key) => {
                session.select_website(key)?;
            }
            None => {
                session.select_first()?;
            }
        }
        Ok(Self {
            settings,
            session,
            client,
        })
    }
}
