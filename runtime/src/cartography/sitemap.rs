//! Sitemap extraction: turn a sitemap (or sitemap index) into an ordered
//! list of pages with derived titles.
//!
//! Parsing is a plain regex scan for `<loc>` values, not XML validation.
//! A sitemap index is followed one level deep; a child that fails to load
//! is logged and skipped so the remaining children still contribute.

use crate::acquisition::http_client::HttpClient;
use crate::cartography::title::title_for_url;
use futures::future::join_all;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

/// A leaf page found in a sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    pub title: String,
}

/// Failure to load the top-level sitemap document.
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("invalid sitemap URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to fetch sitemap {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to fetch sitemap {url}: HTTP {status}")]
    Status { url: String, status: u16 },
}

fn url_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<url>.*?<loc>(.*?)</loc>.*?</url>").expect("valid url entry pattern")
    })
}

fn sitemap_entry_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<sitemap>.*?<loc>(.*?)</loc>.*?</sitemap>")
            .expect("valid sitemap entry pattern")
    })
}

/// `<loc>` values of `<url>` entries, in document order.
pub fn leaf_locations(xml: &str) -> Vec<String> {
    capture_locations(url_entry_re(), xml)
}

/// `<loc>` values of `<sitemap>` entries of a sitemap index, in document order.
pub fn child_sitemap_locations(xml: &str) -> Vec<String> {
    capture_locations(sitemap_entry_re(), xml)
}

fn capture_locations(re: &Regex, xml: &str) -> Vec<String> {
    re.captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}

/// Build pages from `<url>` entries. Entries whose location is not a valid
/// absolute URL are skipped.
pub fn parse_leaf_pages(xml: &str) -> Vec<ExtractedPage> {
    leaf_locations(xml)
        .into_iter()
        .filter_map(|loc| match Url::parse(&loc) {
            Ok(url) => Some(ExtractedPage {
                title: title_for_url(&url),
                url: loc,
            }),
            Err(e) => {
                debug!("skipping sitemap entry '{loc}': {e}");
                None
            }
        })
        .collect()
}

/// Fetch `sitemap_url` and extract its pages.
///
/// Only a failure on the top-level document is an error. An empty result
/// means the sitemap had nothing importable.
pub async fn extract_pages(
    client: &HttpClient,
    sitemap_url: &str,
) -> Result<Vec<ExtractedPage>, SitemapError> {
    Url::parse(sitemap_url).map_err(|source| SitemapError::InvalidUrl {
        url: sitemap_url.to_string(),
        source,
    })?;

    let resp = client
        .fetch(sitemap_url)
        .await
        .map_err(|source| SitemapError::Request {
            url: sitemap_url.to_string(),
            source,
        })?;
    if !resp.is_success() {
        return Err(SitemapError::Status {
            url: sitemap_url.to_string(),
            status: resp.status,
        });
    }

    let pages = parse_leaf_pages(&resp.body);
    if !pages.is_empty() {
        info!("sitemap {sitemap_url}: {} pages", pages.len());
        return Ok(pages);
    }

    let children = child_sitemap_locations(&resp.body);
    if children.is_empty() {
        info!("sitemap {sitemap_url}: no pages found");
        return Ok(Vec::new());
    }

    info!("sitemap index {sitemap_url}: {} child sitemaps", children.len());
    let fetched = join_all(children.iter().map(|child| fetch_child(client, child))).await;
    let pages: Vec<ExtractedPage> = fetched.into_iter().flatten().collect();
    info!("sitemap index {sitemap_url}: {} pages", pages.len());
    Ok(pages)
}

/// Fetch one child sitemap. Failures are logged and yield no pages.
async fn fetch_child(client: &HttpClient, url: &str) -> Vec<ExtractedPage> {
    match client.fetch(url).await {
        Ok(resp) if resp.is_success() => parse_leaf_pages(&resp.body),
        Ok(resp) => {
            warn!("skipping child sitemap {url}: HTTP {}", resp.status);
            Vec::new()
        }
        Err(e) => {
            warn!("skipping child sitemap {url}: {e}");
            Vec::new()
        }
    }
}
