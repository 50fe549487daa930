//! Domain rows shared by the store, session, exporter and API.

pub mod types;

pub use types::*;
