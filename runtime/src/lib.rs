//! Sitecheck: manual QA tracking for websites.
//!
//! Pages are imported from a site's XML sitemap, tested by hand against a
//! fixed checklist, and reported as spreadsheets. The same [`session::Session`]
//! backs the CLI, the REPL and the HTTP API.

pub mod acquisition;
pub mod cartography;
pub mod checklist;
pub mod cli;
pub mod config;
pub mod export;
pub mod model;
pub mod server;
pub mod session;
pub mod store;
