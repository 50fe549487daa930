//! Report export: a denormalized snapshot of one website rendered as an
//! xlsx workbook, a CSV grid or JSON.

pub mod csv;
pub mod json;
pub mod xlsx;

use crate::checklist::catalog::{test_type_title, Category};
use crate::checklist::status::CategoryStatuses;
use crate::model::{Issue, IssuePriority, IssueStatus, TestStatus, Website};
use crate::session::{progress_of, Progress, Session};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => bail!("unknown export format '{other}' (expected xlsx, csv or json)"),
        }
    }
}

/// One page row of the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPage {
    pub order: i64,
    pub id: String,
    pub title: String,
    pub url: String,
    pub categories: CategoryStatuses,
    pub overall: TestStatus,
    pub open_issues: usize,
}

/// One recorded test result, with its page and test named.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResult {
    pub page: String,
    pub test_type: String,
    pub test: String,
    pub status: TestStatus,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// One issue, with its page named.
#[derive(Debug, Clone, Serialize)]
pub struct ReportIssue {
    pub id: String,
    pub page: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: IssuePriority,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
}

/// Everything an export needs, gathered in one pass.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub website: Website,
    pub generated_at: DateTime<Utc>,
    pub summary: Progress,
    pub pages: Vec<ReportPage>,
    pub results: Vec<ReportResult>,
    pub issues: Vec<ReportIssue>,
}

impl Report {
    /// Snapshot the selected website of `session`.
    pub fn build(session: &Session) -> Result<Self> {
        let website = session
            .current()
            .cloned()
            .context("no website selected")?;
        let grid = session.grid()?;
        let page_ids: Vec<String> = session.pages().iter().map(|p| p.id.clone()).collect();
        let mut results = session.store().list_test_results(&page_ids)?;
        let issues = session.issues()?;

        let position: HashMap<&str, usize> = page_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        results.sort_by(|a, b| {
            let pa = position.get(a.page_id.as_str());
            let pb = position.get(b.page_id.as_str());
            pa.cmp(&pb).then_with(|| a.test_type.cmp(&b.test_type))
        });

        let titles: HashMap<&str, &str> = session
            .pages()
            .iter()
            .map(|p| (p.id.as_str(), p.display_title()))
            .collect();
        let page_name = |id: &str| titles.get(id).copied().unwrap_or("Unknown").to_string();

        Ok(Self {
            generated_at: Utc::now(),
            summary: progress_of(&grid),
            pages: grid
                .iter()
                .map(|row| ReportPage {
                    order: row.page.order_index,
                    id: row.page.id.clone(),
                    title: row.page.display_title().to_string(),
                    url: row.page.url.clone(),
                    categories: row.categories,
                    overall: row.overall,
                    open_issues: row.open_issues,
                })
                .collect(),
            results: results
                .iter()
                .map(|r| ReportResult {
                    page: page_name(&r.page_id),
                    test_type: r.test_type.clone(),
                    test: test_type_title(&r.test_type).to_string(),
                    status: r.status,
                    notes: r.notes.clone(),
                    updated_at: r.updated_at,
                })
                .collect(),
            issues: issues.iter().map(|i| report_issue(i, page_name(&i.page_id))).collect(),
            website,
        })
    }

    /// Column headers of the page grid.
    pub fn grid_headers() -> Vec<String> {
        let mut headers = vec!["Order".to_string(), "Title".to_string(), "URL".to_string()];
        headers.extend(Category::ALL.iter().map(|c| c.label().to_string()));
        headers.push("Overall".to_string());
        headers.push("Open Issues".to_string());
        headers
    }

    /// The page grid as text cells, one row per page.
    pub fn grid_rows(&self) -> Vec<Vec<String>> {
        self.pages
            .iter()
            .map(|p| {
                let mut row = vec![(p.order + 1).to_string(), p.title.clone(), p.url.clone()];
                row.extend(p.categories.iter().map(|(_, s)| s.as_str().to_string()));
                row.push(p.overall.as_str().to_string());
                row.push(p.open_issues.to_string());
                row
            })
            .collect()
    }
}

fn report_issue(issue: &Issue, page: String) -> ReportIssue {
    ReportIssue {
        id: issue.id.clone(),
        page,
        title: issue.title.clone(),
        description: issue.description.clone(),
        priority: issue.priority.unwrap_or_default(),
        status: issue.status.unwrap_or_default(),
        created_at: issue.created_at,
    }
}

/// Render `report` in `format`.
pub fn render(report: &Report, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Xlsx => xlsx::render(report),
        ExportFormat::Csv => csv::render(report),
        ExportFormat::Json => json::render(report),
    }
}

/// Lowercase a name and collapse whitespace runs into `-`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .replace(['/', '\\'], "-")
        .to_lowercase()
}

/// `website-test-report-<slug>.<ext>`
pub fn default_filename(website_name: &str, format: ExportFormat) -> String {
    format!(
        "website-test-report-{}.{}",
        slugify(website_name),
        format.extension()
    )
}

/// Render and write a report. `out` may be a directory or a file path.
pub fn write_report(report: &Report, format: ExportFormat, out: &Path) -> Result<PathBuf> {
    let path = if out.is_dir() {
        out.join(default_filename(&report.website.name, format))
    } else {
        out.to_path_buf()
    };
    let bytes = render(report, format)?;
    std::fs::write(&path, bytes)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cartography::sitemap::ExtractedPage;
    use crate::model::{NewIssue, NewWebsite};
    use crate::store::Store;

    /// A session with two pages, a few results and one issue.
    pub(crate) fn sample_session() -> Session {
        let mut session = Session::new(Store::open_in_memory().unwrap());
        session
            .create_website(&NewWebsite {
                name: "Acme Shop".into(),
                base_url: "https://acme.example".into(),
                sitemap_url: None,
            })
            .unwrap();
        session
            .import_pages(&[
                ExtractedPage {
                    url: "https://acme.example/".into(),
                    title: "Home".into(),
                },
                ExtractedPage {
                    url: "https://acme.example/contact".into(),
                    title: "Contact, Sales".into(),
                },
            ])
            .unwrap();
        let home = session.pages()[0].id.clone();
        let contact = session.pages()[1].id.clone();
        session
            .record_result(&home, "visual-1", TestStatus::Ok, None)
            .unwrap();
        session
            .record_result(&contact, "functional-3", TestStatus::NotOk, Some("form 500s"))
            .unwrap();
        session
            .log_issue(&NewIssue {
                page_id: contact,
                title: "Contact form fails".into(),
                description: Some("Submitting returns HTTP 500".into()),
                priority: Some(IssuePriority::High),
            })
            .unwrap();
        session
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(
            default_filename("Acme  Shop", ExportFormat::Xlsx),
            "website-test-report-acme-shop.xlsx"
        );
        assert_eq!(
            default_filename("a/b", ExportFormat::Csv),
            "website-test-report-a-b.csv"
        );
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("XLSX".parse::<ExportFormat>().unwrap(), ExportFormat::Xlsx);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_build_report() {
        let report = Report::build(&sample_session()).unwrap();
        assert_eq!(report.website.name, "Acme Shop");
        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].page, "Contact, Sales");
        assert_eq!(report.summary.not_ok, 1);

        let rows = report.grid_rows();
        assert_eq!(rows[0][0], "1");
        assert_eq!(rows[1][Report::grid_headers().len() - 2], "not-ok");
        assert_eq!(rows[1].len(), Report::grid_headers().len());
    }

    #[test]
    fn test_build_requires_selection() {
        let session = Session::new(Store::open_in_memory().unwrap());
        assert!(Report::build(&session).is_err());
    }

    #[test]
    fn test_write_report_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = Report::build(&sample_session()).unwrap();
        let path = write_report(&report, ExportFormat::Json, dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "website-test-report-acme-shop.json"
        );
        assert!(path.exists());
    }
}
