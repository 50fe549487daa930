//! Sitemap extraction against a mock HTTP server.

use sitecheck_runtime::acquisition::http_client::{HttpClient, USER_AGENT};
use sitecheck_runtime::cartography::robots::resolve_sitemap_url;
use sitecheck_runtime::cartography::sitemap::{extract_pages, SitemapError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> HttpClient {
    HttpClient::new(5_000).unwrap()
}

fn urlset(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("  <url><loc>{loc}</loc><lastmod>2024-01-01</lastmod></url>\n"))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{entries}</urlset>"
    )
}

async fn serve_xml(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_flat_sitemap_keeps_document_order() {
    let server = MockServer::start().await;
    let base = server.uri();
    serve_xml(
        &server,
        "/sitemap.xml",
        urlset(&[
            format!("{base}/"),
            format!("{base}/about-us"),
            format!("{base}/blog/first_post.html"),
        ]),
    )
    .await;

    let pages = extract_pages(&client(), &format!("{base}/sitemap.xml"))
        .await
        .unwrap();

    let titles: Vec<&str> = pages.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Home", "About Us", "Blog - First Post"]);
    assert_eq!(pages[1].url, format!("{base}/about-us"));
}

#[tokio::test]
async fn test_requests_carry_user_agent() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(urlset(&[format!("{base}/")])))
        .expect(1)
        .mount(&server)
        .await;

    let pages = extract_pages(&client(), &format!("{base}/sitemap.xml"))
        .await
        .unwrap();
    assert_eq!(pages.len(), 1);
}

#[tokio::test]
async fn test_index_skips_failing_child() {
    let server = MockServer::start().await;
    let base = server.uri();
    let index = format!(
        "<sitemapindex>\
           <sitemap><loc>{base}/pages.xml</loc></sitemap>\
           <sitemap><loc>{base}/missing.xml</loc></sitemap>\
           <sitemap><loc>{base}/posts.xml</loc></sitemap>\
         </sitemapindex>"
    );
    serve_xml(&server, "/sitemap_index.xml", index).await;
    serve_xml(
        &server,
        "/pages.xml",
        urlset(&[format!("{base}/"), format!("{base}/contact")]),
    )
    .await;
    serve_xml(&server, "/posts.xml", urlset(&[format!("{base}/posts/hello")])).await;
    Mock::given(method("GET"))
        .and(path("/missing.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let pages = extract_pages(&client(), &format!("{base}/sitemap_index.xml"))
        .await
        .unwrap();

    let urls: Vec<String> = pages.into_iter().map(|p| p.url).collect();
    assert_eq!(
        urls,
        vec![
            format!("{base}/"),
            format!("{base}/contact"),
            format!("{base}/posts/hello"),
        ]
    );
}

#[tokio::test]
async fn test_index_skips_unreachable_child() {
    let server = MockServer::start().await;
    let base = server.uri();
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let index = format!(
        "<sitemapindex>\
           <sitemap><loc>http://{closed}/sitemap.xml</loc></sitemap>\
           <sitemap><loc>{base}/pages.xml</loc></sitemap>\
         </sitemapindex>"
    );
    serve_xml(&server, "/sitemap_index.xml", index).await;
    serve_xml(&server, "/pages.xml", urlset(&[format!("{base}/pricing")])).await;

    let pages = extract_pages(&client(), &format!("{base}/sitemap_index.xml"))
        .await
        .unwrap();
    let urls: Vec<String> = pages.into_iter().map(|p| p.url).collect();
    assert_eq!(urls, vec![format!("{base}/pricing")]);
}

#[tokio::test]
async fn test_top_level_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = extract_pages(&client(), &format!("{}/sitemap.xml", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, SitemapError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_invalid_url_is_an_error() {
    let err = extract_pages(&client(), "not a url").await.unwrap_err();
    assert!(matches!(err, SitemapError::InvalidUrl { .. }));
}

#[tokio::test]
async fn test_document_without_entries_is_empty() {
    let server = MockServer::start().await;
    serve_xml(&server, "/sitemap.xml", "<html><body>nope</body></html>".into()).await;

    let pages = extract_pages(&client(), &format!("{}/sitemap.xml", server.uri()))
        .await
        .unwrap();
    assert!(pages.is_empty());
}

#[tokio::test]
async fn test_resolve_uses_robots_directive() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nDisallow: /admin\nSitemap: {base}/maps/main.xml\n"
        )))
        .mount(&server)
        .await;

    let resolved = resolve_sitemap_url(&client(), &format!("{base}/shop")).await;
    assert_eq!(resolved, format!("{base}/maps/main.xml"));
}

#[tokio::test]
async fn test_resolve_falls_back_to_sitemap_xml() {
    let server = MockServer::start().await;
    let base = server.uri();

    let resolved = resolve_sitemap_url(&client(), &format!("{base}/")).await;
    assert_eq!(resolved, format!("{base}/sitemap.xml"));

    let direct = format!("{base}/custom/sitemap-pages.xml");
    assert_eq!(resolve_sitemap_url(&client(), &direct).await, direct);
}
