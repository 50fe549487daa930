//! Thin HTTP client used for sitemap and robots.txt fetches.
//!
//! Every request carries the fixed Sitecheck user agent. Bodies are read
//! as text; callers decide what a non-success status means.

use std::time::Duration;

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; Sitecheck/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// A fetched document.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Shared HTTP client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Build a client whose requests time out after `timeout_ms`.
    pub fn new(timeout_ms: u64) -> reqwest::Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { inner, timeout_ms })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// GET `url` with the client's default timeout.
    pub async fn fetch(&self, url: &str) -> reqwest::Result<HttpResponse> {
        self.get(url, self.timeout_ms).await
    }

    /// GET `url`, waiting at most `timeout_ms` for the whole exchange.
    pub async fn get(&self, url: &str, timeout_ms: u64) -> reqwest::Result<HttpResponse> {
        let resp = self
            .inner
            .get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await?;

        let final_url = resp.url().to_string();
        let status = resp.status().as_u16();
        let body = resp.text().await?;

        Ok(HttpResponse {
            url: final_url,
            status,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_identifies_sitecheck() {
        assert!(USER_AGENT.starts_with("Mozilla/5.0 (compatible; Sitecheck/"));
        assert!(USER_AGENT.ends_with(')'));
    }

    #[test]
    fn test_response_success_range() {
        let mut resp = HttpResponse {
            url: "https://example.com/sitemap.xml".to_string(),
            status: 200,
            body: String::new(),
        };
        assert!(resp.is_success());
        resp.status = 204;
        assert!(resp.is_success());
        resp.status = 301;
        assert!(!resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }

    #[test]
    fn test_client_keeps_timeout() {
        let client = HttpClient::new(1_500).unwrap();
        assert_eq!(client.timeout_ms(), 1_500);
    }
}
