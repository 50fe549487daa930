//! HTTP API against a live listener.

use serde_json::{json, Value};
use sitecheck_runtime::acquisition::http_client::HttpClient;
use sitecheck_runtime::server::{self, AppState};
use sitecheck_runtime::session::Session;
use sitecheck_runtime::store::Store;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start the API on an ephemeral port and return its base URL.
async fn spawn_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(
        Session::new(Store::open_in_memory().unwrap()),
        HttpClient::new(5_000).unwrap(),
    );
    tokio::spawn(server::serve(listener, state));
    format!("http://{addr}/api")
}

#[tokio::test]
async fn test_health_and_catalog() {
    let api = spawn_api().await;
    let http = reqwest::Client::new();

    let health: Value = http
        .get(format!("{api}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let catalog: Value = http
        .get(format!("{api}/catalog"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog.as_array().unwrap().len(), 10);
    assert_eq!(catalog[0]["id"], "visual-1");
}

#[tokio::test]
async fn test_sitemap_endpoint_errors() {
    let api = spawn_api().await;
    let http = reqwest::Client::new();

    let missing = http.get(format!("{api}/sitemap")).send().await.unwrap();
    assert_eq!(missing.status(), 400);

    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;
    let failed = http
        .get(format!("{api}/sitemap"))
        .query(&[("url", format!("{}/sitemap.xml", upstream.uri()))])
        .send()
        .await
        .unwrap();
    assert_eq!(failed.status(), 502);
    let body: Value = failed.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_sitemap_endpoint_fetches_the_given_url() {
    let upstream = MockServer::start().await;
    let base = upstream.uri();
    Mock::given(method("GET"))
        .and(path("/feeds/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{base}/</loc></url><url><loc>{base}/team-members</loc></url></urlset>"
        )))
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&upstream)
        .await;

    let api = spawn_api().await;
    let response = reqwest::Client::new()
        .get(format!("{api}/sitemap"))
        .query(&[("url", format!("{base}/feeds/pages"))])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let pages = body["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["title"], "Home");
    assert_eq!(pages[1]["url"], format!("{base}/team-members"));
    assert_eq!(pages[1]["title"], "Team Members");
}

#[tokio::test]
async fn test_website_lifecycle() {
    let upstream = MockServer::start().await;
    let base = upstream.uri();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset><url><loc>{base}/</loc></url><url><loc>{base}/about</loc></url></urlset>"
        )))
        .mount(&upstream)
        .await;

    let api = spawn_api().await;
    let http = reqwest::Client::new();

    let created = http
        .post(format!("{api}/websites"))
        .json(&json!({ "name": "Acme", "base_url": base }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);
    let website: Value = created.json().await.unwrap();
    let id = website["id"].as_str().unwrap().to_string();

    let summary: Value = http
        .post(format!("{api}/websites/{id}/import"))
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["inserted"], 2);

    let grid: Value = http
        .get(format!("{api}/websites/{id}/pages"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(grid[1]["page"]["title"], "About");
    assert_eq!(grid[1]["categories"]["loading"], "pending");
    let page_id = grid[0]["page"]["id"].as_str().unwrap().to_string();

    let recorded = http
        .put(format!("{api}/pages/{page_id}/results/images"))
        .json(&json!({ "status": "not-ok", "notes": "logo blurry" }))
        .send()
        .await
        .unwrap();
    assert_eq!(recorded.status(), 200);

    let unknown = http
        .put(format!("{api}/pages/{page_id}/results/teleport"))
        .json(&json!({ "status": "ok" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 400);

    let issue: Value = http
        .post(format!("{api}/pages/{page_id}/issues"))
        .json(&json!({ "title": "Blurry logo", "priority": "low" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(issue["status"], "open");

    let progress: Value = http
        .get(format!("{api}/websites/{id}/progress"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["not_ok"], 1);
    assert_eq!(progress["open_issues"], 1);

    let closed: Value = http
        .patch(format!("{api}/issues/{}", issue["id"].as_str().unwrap()))
        .json(&json!({ "status": "closed" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(closed["status"], "closed");

    let export = http
        .get(format!("{api}/websites/{id}/export?format=csv"))
        .send()
        .await
        .unwrap();
    assert_eq!(export.status(), 200);
    assert_eq!(
        export.headers()["content-disposition"],
        "attachment; filename=\"website-test-report-acme.csv\""
    );

    let deleted = http
        .delete(format!("{api}/websites/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 204);
    let gone = http
        .get(format!("{api}/websites/{id}/pages"))
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), 404);

    let orphan = http
        .get(format!("{api}/pages/{page_id}/checklist"))
        .send()
        .await
        .unwrap();
    assert_eq!(orphan.status(), 404);
    let orphan = http
        .put(format!("{api}/pages/{page_id}/results/visual-2"))
        .json(&json!({ "status": "ok" }))
        .send()
        .await
        .unwrap();
    assert_eq!(orphan.status(), 404);
}
