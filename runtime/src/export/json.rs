use super::Report;
use anyhow::{Context, Result};

pub fn render(report: &Report) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("failed to serialize report")
}
