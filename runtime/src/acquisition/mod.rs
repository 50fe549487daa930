//! Network acquisition: the shared HTTP client.

pub mod http_client;
