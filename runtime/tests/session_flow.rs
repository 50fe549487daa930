//! End-to-end session flow over an on-disk store.

use sitecheck_runtime::acquisition::http_client::HttpClient;
use sitecheck_runtime::export::{write_report, ExportFormat, Report};
use sitecheck_runtime::model::{IssuePriority, IssueStatus, NewIssue, NewWebsite, TestStatus};
use sitecheck_runtime::session::{Fallback, Session};
use sitecheck_runtime::store::Store;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn open_session(dir: &TempDir) -> Session {
    Session::new(Store::open(&dir.path().join("sitecheck.db")).unwrap())
}

fn new_website(name: &str, base_url: &str) -> NewWebsite {
    NewWebsite {
        name: name.to_string(),
        base_url: base_url.to_string(),
        sitemap_url: None,
    }
}

#[tokio::test]
async fn test_import_then_track_and_reopen() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<urlset>\
               <url><loc>{base}/</loc></url>\
               <url><loc>{base}/pricing</loc></url>\
               <url><loc>{base}/contact-us</loc></url>\
             </urlset>"
        )))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = HttpClient::new(5_000).unwrap();

    let website_id = {
        let mut session = open_session(&dir);
        session.create_website(&new_website("Acme", &base)).unwrap();

        let summary = session
            .import_sitemap(&client, None, Fallback::None)
            .await
            .unwrap();
        assert_eq!(summary.sitemap_url, format!("{base}/sitemap.xml"));
        assert_eq!(summary.found, 3);
        assert_eq!(summary.inserted, 3);

        let titles: Vec<&str> = session.pages().iter().map(|p| p.display_title()).collect();
        assert_eq!(titles, vec!["Home", "Pricing", "Contact Us"]);

        let home = session.resolve_page("1").unwrap();
        for category in ["loading", "images", "colors", "fonts", "layout"] {
            session
                .record_result(&home.id, category, TestStatus::Ok, None)
                .unwrap();
        }
        let contact = session.resolve_page("3").unwrap();
        session
            .record_result(&contact.id, "functional-3", TestStatus::NotOk, Some("submit fails"))
            .unwrap();
        session
            .log_issue(&NewIssue {
                page_id: contact.id.clone(),
                title: "Form does not submit".into(),
                description: None,
                priority: Some(IssuePriority::High),
            })
            .unwrap();

        session.current().unwrap().id.clone()
    };

    // A fresh session over the same file sees everything.
    let mut session = open_session(&dir);
    session.select_website(&website_id).unwrap();

    let grid = session.grid().unwrap();
    let overall: Vec<TestStatus> = grid.iter().map(|r| r.overall).collect();
    assert_eq!(
        overall,
        vec![TestStatus::Ok, TestStatus::Pending, TestStatus::NotOk]
    );
    assert_eq!(grid[2].open_issues, 1);

    let progress = session.progress().unwrap();
    assert_eq!(progress.total, 3);
    assert_eq!(progress.ok, 1);
    assert_eq!(progress.not_ok, 1);
    assert_eq!(progress.open_issues, 1);

    let issue_id = session.issues().unwrap()[0].id.clone();
    let resolved = session
        .set_issue_status(&issue_id, IssueStatus::Resolved)
        .unwrap();
    assert_eq!(resolved.status, Some(IssueStatus::Resolved));
    assert_eq!(session.progress().unwrap().open_issues, 0);

    let report = Report::build(&session).unwrap();
    let out = write_report(&report, ExportFormat::Csv, dir.path()).unwrap();
    assert_eq!(out.file_name().unwrap(), "website-test-report-acme.csv");
    let csv = std::fs::read_to_string(out).unwrap();
    assert!(csv.starts_with("Order,Title,URL,"));
    assert_eq!(csv.lines().count(), 4);
}

#[tokio::test]
async fn test_empty_sitemap_applies_fallback() {
    let server = MockServer::start().await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset></urlset>"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = HttpClient::new(5_000).unwrap();
    let mut session = open_session(&dir);
    session.create_website(&new_website("Empty", &base)).unwrap();

    let none = session
        .import_sitemap(&client, None, Fallback::None)
        .await
        .unwrap();
    assert_eq!(none.inserted, 0);
    assert!(none.fallback.is_none());
    assert!(session.pages().is_empty());

    let home = session
        .import_sitemap(&client, None, Fallback::HomeOnly)
        .await
        .unwrap();
    assert_eq!(home.inserted, 1);
    assert_eq!(home.fallback, Some(Fallback::HomeOnly));
    assert_eq!(session.pages()[0].display_title(), "Home");
}

#[tokio::test]
async fn test_failed_fetch_leaves_store_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let client = HttpClient::new(5_000).unwrap();
    let mut session = open_session(&dir);
    session
        .create_website(&new_website("Down", &server.uri()))
        .unwrap();

    let err = session
        .import_sitemap(&client, None, Fallback::CommonPages)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("503"));
    assert!(session.pages().is_empty());
}

#[test]
fn test_deleted_website_is_hidden() {
    let dir = TempDir::new().unwrap();
    let mut session = open_session(&dir);
    session
        .create_website(&new_website("Old", "https://old.example"))
        .unwrap();
    session
        .create_website(&new_website("New", "https://new.example"))
        .unwrap();

    session.select_website("Old").unwrap();
    let next = session.delete_current().unwrap().map(|w| w.name.clone());
    assert_eq!(next.as_deref(), Some("New"));

    let names: Vec<String> = session
        .websites()
        .unwrap()
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, vec!["New"]);
    assert!(session.select_website("Old").is_err());
}
