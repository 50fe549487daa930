//! Locate a site's sitemap from a website URL via robots.txt.

use crate::acquisition::http_client::HttpClient;
use tracing::debug;
use url::Url;

/// Timeout for the robots.txt probe. Discovery is best-effort.
const ROBOTS_TIMEOUT_MS: u64 = 5_000;

/// `Sitemap:` directives of a robots.txt file, in file order.
///
/// Sitemap lines are global, so user-agent groups are ignored.
pub fn sitemap_directives(txt: &str) -> Vec<String> {
    txt.lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case("sitemap"))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Whether the input already names a sitemap document.
pub fn looks_like_sitemap(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    path.contains("sitemap") || path.ends_with(".xml")
}

/// The conventional sitemap location for a site.
pub fn default_sitemap_url(url: &Url) -> String {
    format!("{}/sitemap.xml", url.origin().ascii_serialization())
}

/// Resolve the sitemap to import for `input`.
///
/// Sitemap URLs are returned unchanged. For any other page of a site, the
/// first `Sitemap:` directive of its robots.txt is used, falling back to
/// `/sitemap.xml`. Unparseable input is returned as-is so the extractor
/// reports it.
pub async fn resolve_sitemap_url(client: &HttpClient, input: &str) -> String {
    let Ok(url) = Url::parse(input) else {
        return input.to_string();
    };
    if looks_like_sitemap(&url) {
        return input.to_string();
    }

    let robots_url = format!("{}/robots.txt", url.origin().ascii_serialization());
    match client.get(&robots_url, ROBOTS_TIMEOUT_MS).await {
        Ok(resp) if resp.is_success() => {
            if let Some(first) = sitemap_directives(&resp.body).into_iter().next() {
                debug!("sitemap for {input} found in robots.txt: {first}");
                return first;
            }
        }
        Ok(resp) => debug!("{robots_url}: HTTP {}", resp.status),
        Err(e) => debug!("{robots_url}: {e}"),
    }

    default_sitemap_url(&url)
}
