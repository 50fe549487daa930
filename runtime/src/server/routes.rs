//! API route handlers.

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::cartography::robots::resolve_sitemap_url;
use crate::cartography::sitemap::{extract_pages, ExtractedPage};
use crate::checklist::catalog::{is_known_test_type, TestItem, TEST_ITEMS};
use crate::export::{default_filename, render, ExportFormat, Report};
use crate::model::{
    Issue, IssuePriority, IssueStatus, NewIssue, NewWebsite, Page, TestResult, TestStatus,
    Website, WebsiteChanges,
};
use crate::session::{ChecklistEntry, Fallback, GridRow, ImportSummary, Progress, Session};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn catalog() -> Json<&'static [TestItem]> {
    Json(TEST_ITEMS)
}

#[derive(Deserialize)]
pub struct SitemapQuery {
    pub url: Option<String>,
}

#[derive(Serialize)]
pub struct SitemapResponse {
    pub pages: Vec<ExtractedPage>,
}

/// Fetch the given sitemap URL as-is, without touching the store.
pub async fn sitemap(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SitemapQuery>,
) -> ApiResult<Json<SitemapResponse>> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("missing 'url' query parameter"))?;
    let pages = extract_pages(&state.client, url.trim()).await?;
    Ok(Json(SitemapResponse { pages }))
}

/// Select website `id` or answer 404.
fn select(session: &mut Session, id: &str) -> ApiResult<()> {
    if session.store().get_website(id)?.is_none() {
        return Err(ApiError::not_found(format!("website '{id}' not found")));
    }
    session.select_website(id)?;
    Ok(())
}

pub async fn list_websites(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Website>>> {
    let session = state.session.lock().await;
    Ok(Json(session.websites()?))
}

pub async fn create_website(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewWebsite>,
) -> ApiResult<(StatusCode, Json<Website>)> {
    if body.name.trim().is_empty() || body.base_url.trim().is_empty() {
        return Err(ApiError::bad_request("name and base_url are required"));
    }
    let mut session = state.session.lock().await;
    let website = session.create_website(&body)?.clone();
    Ok((StatusCode::CREATED, Json(website)))
}

pub async fn update_website(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(changes): Json<WebsiteChanges>,
) -> ApiResult<Json<Website>> {
    let mut session = state.session.lock().await;
    select(&mut session, &id)?;
    Ok(Json(session.update_current(&changes)?.clone()))
}

pub async fn delete_website(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let mut session = state.session.lock().await;
    select(&mut session, &id)?;
    session.delete_current()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_pages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<GridRow>>> {
    let mut session = state.session.lock().await;
    select(&mut session, &id)?;
    Ok(Json(session.grid()?))
}

#[derive(Deserialize)]
pub struct AddPageRequest {
    pub url: String,
    pub title: Option<String>,
}

pub async fn add_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<AddPageRequest>,
) -> ApiResult<(StatusCode, Json<Page>)> {
    if body.url.trim().is_empty() {
        return Err(ApiError::bad_request("url is required"));
    }
    let mut session = state.session.lock().await;
    select(&mut session, &id)?;
    let page = session.add_page(&body.url, body.title.as_deref())?;
    Ok((StatusCode::CREATED, Json(page)))
}

#[derive(Deserialize, Default)]
pub struct ImportRequest {
    pub sitemap_url: Option<String>,
    #[serde(default)]
    pub fallback: Fallback,
}

/// Import a sitemap into a website. The session lock is released while
/// the sitemap is fetched.
pub async fn import(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Option<Json<ImportRequest>>,
) -> ApiResult<Json<ImportSummary>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let (website, input) = {
        let mut session = state.session.lock().await;
        select(&mut session, &id)?;
        session.import_source(body.sitemap_url.as_deref())?
    };

    let sitemap_url = resolve_sitemap_url(&state.client, &input).await;
    let extracted = extract_pages(&state.client, &sitemap_url).await?;

    let mut session = state.session.lock().await;
    select(&mut session, &id)?;
    let summary = session.finish_import(&website, sitemap_url, &extracted, body.fallback)?;
    Ok(Json(summary))
}

pub async fn progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Progress>> {
    let mut session = state.session.lock().await;
    select(&mut session, &id)?;
    Ok(Json(session.progress()?))
}

pub async fn list_issues(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Issue>>> {
    let mut session = state.session.lock().await;
    select(&mut session, &id)?;
    Ok(Json(session.issues()?))
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let format = match query.format.as_deref() {
        Some(f) => f
            .parse::<ExportFormat>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => ExportFormat::default(),
    };
    let report = {
        let mut session = state.session.lock().await;
        select(&mut session, &id)?;
        Report::build(&session)?
    };
    let bytes = render(&report, format)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        default_filename(&report.website.name, format)
    );
    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// 404 unless the page exists and its website is not deleted.
async fn ensure_page(state: &AppState, page_id: &str) -> ApiResult<()> {
    let session = state.session.lock().await;
    let live = match session.store().get_page(page_id)? {
        Some(page) => session.store().get_website(&page.website_id)?.is_some(),
        None => false,
    };
    if !live {
        return Err(ApiError::not_found(format!("page '{page_id}' not found")));
    }
    Ok(())
}

pub async fn checklist(
    State(state): State<Arc<AppState>>,
    Path(page_id): Path<String>,
) -> ApiResult<Json<Vec<ChecklistEntry>>> {
    ensure_page(&state, &page_id).await?;
    let session = state.session.lock().await;
    Ok(Json(session.checklist(&page_id)?))
}

#[derive(Deserialize)]
pub struct RecordResultRequest {
    pub status: TestStatus,
    pub notes: Option<String>,
}

pub async fn record_result(
    State(state): State<Arc<AppState>>,
    Path((page_id, test_type)): Path<(String, String)>,
    Json(body): Json<RecordResultRequest>,
) -> ApiResult<Json<TestResult>> {
    if !is_known_test_type(&test_type) {
        return Err(ApiError::bad_request(format!("unknown test type '{test_type}'")));
    }
    ensure_page(&state, &page_id).await?;
    let mut session = state.session.lock().await;
    let result = session.record_result(&page_id, &test_type, body.status, body.notes.as_deref())?;
    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct LogIssueRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<IssuePriority>,
}

pub async fn log_issue(
    State(state): State<Arc<AppState>>,
    Path(page_id): Path<String>,
    Json(body): Json<LogIssueRequest>,
) -> ApiResult<(StatusCode, Json<Issue>)> {
    if body.title.trim().is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    ensure_page(&state, &page_id).await?;
    let mut session = state.session.lock().await;
    let issue = session.log_issue(&NewIssue {
        page_id,
        title: body.title,
        description: body.description,
        priority: body.priority,
    })?;
    Ok((StatusCode::CREATED, Json(issue)))
}

#[derive(Deserialize)]
pub struct IssueStatusRequest {
    pub status: IssueStatus,
}

pub async fn set_issue_status(
    State(state): State<Arc<AppState>>,
    Path(issue_id): Path<String>,
    Json(body): Json<IssueStatusRequest>,
) -> ApiResult<Json<Issue>> {
    let mut session = state.session.lock().await;
    if session.store().get_issue(&issue_id)?.is_none() {
        return Err(ApiError::not_found(format!("issue '{issue_id}' not found")));
    }
    Ok(Json(session.set_issue_status(&issue_id, body.status)?))
}
