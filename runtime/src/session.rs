//! Application state shared by the REPL, the CLI commands and the HTTP API.
//!
//! A `Session` owns the store plus the currently selected website and its
//! page list. Grid rows, checklists and progress are derived from the
//! stored results every time they are read.

use crate::acquisition::http_client::HttpClient;
use crate::cartography::robots::resolve_sitemap_url;
use crate::cartography::sitemap::{extract_pages, ExtractedPage};
use crate::cartography::title::HOME_TITLE;
use crate::checklist::catalog::{canonical_test_type, TestItem, TEST_ITEMS};
use crate::checklist::status::CategoryStatuses;
use crate::model::{
    Issue, IssueStatus, NewIssue, NewPage, NewWebsite, Page, TestResult, TestStatus, Website,
    WebsiteChanges,
};
use crate::store::Store;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::info;

/// Stub pages offered when a sitemap yields nothing.
pub const COMMON_PAGES: &[(&str, &str)] = &[
    ("Home", ""),
    ("About", "about"),
    ("Services", "services"),
    ("Products", "products"),
    ("Contact", "contact"),
    ("Blog", "blog"),
    ("FAQ", "faq"),
    ("Terms", "terms"),
    ("Privacy", "privacy"),
    ("Support", "support"),
];

/// What to insert when an import finds no pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fallback {
    /// Insert nothing; the caller reports the empty result.
    #[default]
    None,
    /// A single `Home` page at the base URL.
    HomeOnly,
    /// The ten common page stubs.
    CommonPages,
}

impl FromStr for Fallback {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "home" | "home-only" => Ok(Self::HomeOnly),
            "common" | "common-pages" => Ok(Self::CommonPages),
            other => bail!("unknown fallback '{other}' (expected none, home or common)"),
        }
    }
}

/// Stub pages for `fallback` under `base_url`.
pub fn fallback_pages(base_url: &str, fallback: Fallback) -> Vec<NewPage> {
    let base = base_url.trim().trim_end_matches('/');
    let stub = |title: &str, path: &str| NewPage {
        url: if path.is_empty() {
            format!("{base}/")
        } else {
            format!("{base}/{path}")
        },
        title: Some(title.to_string()),
    };
    match fallback {
        Fallback::None => Vec::new(),
        Fallback::HomeOnly => vec![stub(HOME_TITLE, "")],
        Fallback::CommonPages => COMMON_PAGES
            .iter()
            .map(|(title, path)| stub(title, path))
            .collect(),
    }
}

/// Outcome of an import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub sitemap_url: String,
    /// Pages found in the sitemap.
    pub found: usize,
    /// Pages inserted, including fallback stubs.
    pub inserted: usize,
    /// Fallback applied because the sitemap was empty.
    pub fallback: Option<Fallback>,
}

/// One row of the page grid.
#[derive(Debug, Clone, Serialize)]
pub struct GridRow {
    pub page: Page,
    pub categories: CategoryStatuses,
    pub overall: TestStatus,
    pub open_issues: usize,
}

/// A catalog item paired with the page's recorded result.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistEntry {
    pub item: TestItem,
    pub status: TestStatus,
    pub notes: Option<String>,
}

/// Completion summary of the selected website.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Progress {
    pub total: usize,
    pub ok: usize,
    pub not_ok: usize,
    pub open_issues: usize,
    pub percent: f64,
}

/// The selected website and its pages, over a store.
pub struct Session {
    store: Store,
    current: Option<Website>,
    pages: Vec<Page>,
}

impl Session {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            current: None,
            pages: Vec::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn current(&self) -> Option<&Website> {
        self.current.as_ref()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    fn require_current(&self) -> Result<&Website> {
        self.current
            .as_ref()
            .context("no website selected (use /use <name> or create one)")
    }

    fn page_ids(&self) -> Vec<String> {
        self.pages.iter().map(|p| p.id.clone()).collect()
    }

    pub fn websites(&self) -> Result<Vec<Website>> {
        self.store.list_websites()
    }

    /// Select a website by id or name and load its pages.
    pub fn select_website(&mut self, key: &str) -> Result<&Website> {
        let website = self
            .store
            .find_website(key)?
            .with_context(|| format!("website '{key}' not found"))?;
        self.pages = self.store.list_pages(&website.id)?;
        Ok(self.current.insert(website))
    }

    /// Select the first website, if there is one.
    pub fn select_first(&mut self) -> Result<Option<&Website>> {
        match self.store.list_websites()?.into_iter().next() {
            Some(website) => {
                self.pages = self.store.list_pages(&website.id)?;
                Ok(Some(self.current.insert(website)))
            }
            None => {
                self.current = None;
                self.pages.clear();
                Ok(None)
            }
        }
    }

    /// Create a website and select it.
    pub fn create_website(&mut self, new: &NewWebsite) -> Result<&Website> {
        if new.name.trim().is_empty() {
            bail!("website name must not be empty");
        }
        if new.base_url.trim().is_empty() {
            bail!("website base URL must not be empty");
        }
        let website = self.store.create_website(new)?;
        info!("created website {} ({})", website.name, website.id);
        self.pages.clear();
        Ok(self.current.insert(website))
    }

    pub fn update_current(&mut self, changes: &WebsiteChanges) -> Result<&Website> {
        let id = self.require_current()?.id.clone();
        let website = self
            .store
            .update_website(&id, changes)?
            .context("selected website no longer exists")?;
        Ok(self.current.insert(website))
    }

    /// Soft-delete the selected website, then select the first remaining one.
    pub fn delete_current(&mut self) -> Result<Option<&Website>> {
        let website = self.require_current()?.clone();
        self.store.soft_delete_website(&website.id)?;
        info!("deleted website {} ({})", website.name, website.id);
        self.select_first()
    }

    pub fn refresh_pages(&mut self) -> Result<&[Page]> {
        let id = self.require_current()?.id.clone();
        self.pages = self.store.list_pages(&id)?;
        Ok(&self.pages)
    }

    /// Insert extracted pages in sitemap order.
    pub fn import_pages(&mut self, extracted: &[ExtractedPage]) -> Result<Vec<Page>> {
        let new: Vec<NewPage> = extracted
            .iter()
            .map(|p| NewPage {
                url: p.url.clone(),
                title: Some(p.title.clone()),
            })
            .collect();
        self.insert_new_pages(&new)
    }

    fn insert_new_pages(&mut self, new: &[NewPage]) -> Result<Vec<Page>> {
        let id = self.require_current()?.id.clone();
        if new.is_empty() {
            return Ok(Vec::new());
        }
        let inserted = self.store.insert_pages(&id, new)?;
        self.pages = self.store.list_pages(&id)?;
        Ok(inserted)
    }

    /// Discover and extract a sitemap, then insert its pages.
    ///
    /// `url` defaults to the website's sitemap URL, then its base URL. The
    /// store is only touched after the fetch finishes.
    pub async fn import_sitemap(
        &mut self,
        client: &HttpClient,
        url: Option<&str>,
        fallback: Fallback,
    ) -> Result<ImportSummary> {
        let (website, input) = self.import_source(url)?;
        let sitemap_url = resolve_sitemap_url(client, &input).await;
        let extracted = extract_pages(client, &sitemap_url).await?;
        self.finish_import(&website, sitemap_url, &extracted, fallback)
    }

    /// The selected website and the URL an import should start from.
    pub fn import_source(&self, url: Option<&str>) -> Result<(Website, String)> {
        let website = self.require_current()?.clone();
        let input = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| website.sitemap_url.clone())
            .unwrap_or_else(|| website.base_url.clone());
        Ok((website, input))
    }

    /// Insert fetched pages, applying `fallback` when there are none.
    pub fn finish_import(
        &mut self,
        website: &Website,
        sitemap_url: String,
        extracted: &[ExtractedPage],
        fallback: Fallback,
    ) -> Result<ImportSummary> {
        if self.current.as_ref().map(|w| w.id.as_str()) != Some(website.id.as_str()) {
            self.select_website(&website.id)?;
        }

        if !extracted.is_empty() {
            let inserted = self.import_pages(extracted)?;
            info!("imported {} pages from {sitemap_url}", inserted.len());
            return Ok(ImportSummary {
                sitemap_url,
                found: extracted.len(),
                inserted: inserted.len(),
                fallback: None,
            });
        }

        if fallback == Fallback::None {
            info!("sitemap {sitemap_url}: no pages found");
            return Ok(ImportSummary {
                sitemap_url,
                found: 0,
                inserted: 0,
                fallback: None,
            });
        }
        let stubs = fallback_pages(&website.base_url, fallback);
        let inserted = self.insert_new_pages(&stubs)?;
        info!(
            "sitemap {sitemap_url} was empty, added {} fallback pages",
            inserted.len()
        );
        Ok(ImportSummary {
            sitemap_url,
            found: 0,
            inserted: inserted.len(),
            fallback: Some(fallback),
        })
    }

    pub fn add_page(&mut self, url: &str, title: Option<&str>) -> Result<Page> {
        let id = self.require_current()?.id.clone();
        if url.trim().is_empty() {
            bail!("page URL must not be empty");
        }
        let title = title.map(str::trim).filter(|t| !t.is_empty());
        let page = self.store.add_page(&id, url, title)?;
        self.pages.push(page.clone());
        Ok(page)
    }

    /// Reorder the selected website's pages.
    pub fn reorder_pages(&mut self, ordered_ids: &[String]) -> Result<&[Page]> {
        let id = self.require_current()?.id.clone();
        self.pages = self.store.resequence_pages(&id, ordered_ids)?;
        Ok(&self.pages)
    }

    /// Resolve a page of the selected website by 1-based row number or id.
    pub fn resolve_page(&self, key: &str) -> Result<Page> {
        let key = key.trim();
        if let Ok(row) = key.parse::<usize>() {
            if let Some(page) = row.checked_sub(1).and_then(|i| self.pages.get(i)) {
                return Ok(page.clone());
            }
        }
        let page = self
            .store
            .resolve_page(key)?
            .with_context(|| format!("page '{key}' not found"))?;
        if let Some(website) = &self.current {
            if page.website_id != website.id {
                bail!("page '{key}' belongs to another website");
            }
        }
        Ok(page)
    }

    fn results(&self) -> Result<Vec<TestResult>> {
        self.store.list_test_results(&self.page_ids())
    }

    pub fn issues(&self) -> Result<Vec<Issue>> {
        self.store.list_issues(&self.page_ids())
    }

    /// The page grid, in display order.
    pub fn grid(&self) -> Result<Vec<GridRow>> {
        let results = self.results()?;
        let issues = self.issues()?;

        let mut by_page: HashMap<&str, Vec<&TestResult>> = HashMap::new();
        for result in &results {
            by_page.entry(result.page_id.as_str()).or_default().push(result);
        }
        let mut open: HashMap<&str, usize> = HashMap::new();
        for issue in issues.iter().filter(|i| i.is_open()) {
            *open.entry(issue.page_id.as_str()).or_default() += 1;
        }

        Ok(self
            .pages
            .iter()
            .map(|page| {
                let categories = CategoryStatuses::from_results(
                    by_page.get(page.id.as_str()).into_iter().flatten().copied(),
                );
                GridRow {
                    page: page.clone(),
                    overall: categories.overall(),
                    categories,
                    open_issues: open.get(page.id.as_str()).copied().unwrap_or(0),
                }
            })
            .collect())
    }

    /// The standard checklist for one page with its recorded results.
    pub fn checklist(&self, page_id: &str) -> Result<Vec<ChecklistEntry>> {
        let results = self.store.list_test_results(&[page_id.to_string()])?;
        Ok(TEST_ITEMS
            .iter()
            .map(|item| {
                let recorded = results
                    .iter()
                    .find(|r| r.test_type == item.id)
                    .or_else(|| {
                        results
                            .iter()
                            .find(|r| canonical_test_type(&r.test_type) == Some(item.id))
                    });
                ChecklistEntry {
                    item: *item,
                    status: recorded.map(|r| r.status).unwrap_or_default(),
                    notes: recorded.and_then(|r| r.notes.clone()),
                }
            })
            .collect())
    }

    /// Record a test outcome. The test type must be a catalog id or category;
    /// categories are stored under the catalog id that tracks them.
    pub fn record_result(
        &mut self,
        page_id: &str,
        test_type: &str,
        status: TestStatus,
        notes: Option<&str>,
    ) -> Result<TestResult> {
        let requested = test_type.trim();
        let Some(test_type) = canonical_test_type(requested) else {
            bail!("unknown test type '{requested}'");
        };
        if self.store.get_page(page_id)?.is_none() {
            bail!("page '{page_id}' not found");
        }
        self.store.upsert_test_result(page_id, test_type, status, notes)
    }

    pub fn log_issue(&mut self, new: &NewIssue) -> Result<Issue> {
        if new.title.trim().is_empty() {
            bail!("issue title must not be empty");
        }
        if self.store.get_page(&new.page_id)?.is_none() {
            bail!("page '{}' not found", new.page_id);
        }
        self.store.insert_issue(new)
    }

    pub fn set_issue_status(&mut self, issue_id: &str, status: IssueStatus) -> Result<Issue> {
        self.store
            .set_issue_status(issue_id, status)?
            .with_context(|| format!("issue '{issue_id}' not found"))
    }

    /// Completion summary of the selected website.
    pub fn progress(&self) -> Result<Progress> {
        let rows = self.grid()?;
        Ok(progress_of(&rows))
    }
}

/// Summarize grid rows.
pub fn progress_of(rows: &[GridRow]) -> Progress {
    let total = rows.len();
    let ok = rows.iter().filter(|r| r.overall == TestStatus::Ok).count();
    let not_ok = rows.iter().filter(|r| r.overall == TestStatus::NotOk).count();
    let open_issues = rows.iter().map(|r| r.open_issues).sum();
    let percent = if total == 0 {
        0.0
    } else {
        ok as f64 * 100.0 / total as f64
    };
    Progress {
        total,
        ok,
        not_ok,
        open_issues,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IssuePriority;

    fn session_with_site() -> Session {
        let mut session = Session::new(Store::open_in_memory().unwrap());
        session
            .create_website(&NewWebsite {
                name: "Example".into(),
                base_url: "https://ex.com/".into(),
                sitemap_url: None,
            })
            .unwrap();
        session
    }

    fn extracted(path: &str, title: &str) -> ExtractedPage {
        ExtractedPage {
            url: format!("https://ex.com{path}"),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_fallback_pages() {
        let home = fallback_pages("https://ex.com/", Fallback::HomeOnly);
        assert_eq!(home.len(), 1);
        assert_eq!(home[0].url, "https://ex.com/");
        assert_eq!(home[0].title.as_deref(), Some("Home"));

        let common = fallback_pages("https://ex.com", Fallback::CommonPages);
        assert_eq!(common.len(), 10);
        assert_eq!(common[1].url, "https://ex.com/about");
        assert_eq!(common[9].title.as_deref(), Some("Support"));

        assert!(fallback_pages("https://ex.com", Fallback::None).is_empty());
    }

    #[test]
    fn test_parse_fallback() {
        assert_eq!("home".parse::<Fallback>().unwrap(), Fallback::HomeOnly);
        assert_eq!("common-pages".parse::<Fallback>().unwrap(), Fallback::CommonPages);
        assert!("everything".parse::<Fallback>().is_err());
    }

    #[test]
    fn test_import_keeps_sitemap_order() {
        let mut session = session_with_site();
        let pages = session
            .import_pages(&[extracted("/", "Home"), extracted("/about-us", "About Us")])
            .unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(session.pages()[0].order_index, 0);
        assert_eq!(session.pages()[1].display_title(), "About Us");
    }

    #[test]
    fn test_empty_import_applies_fallback() {
        let mut session = session_with_site();
        let website = session.current().unwrap().clone();

        let summary = session
            .finish_import(&website, "https://ex.com/sitemap.xml".into(), &[], Fallback::None)
            .unwrap();
        assert_eq!(summary.inserted, 0);
        assert!(summary.fallback.is_none());
        assert!(session.pages().is_empty());

        let summary = session
            .finish_import(&website, "https://ex.com/sitemap.xml".into(), &[], Fallback::HomeOnly)
            .unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.fallback, Some(Fallback::HomeOnly));
        assert_eq!(session.pages()[0].display_title(), "Home");
    }

    #[test]
    fn test_grid_derives_overall_status() {
        let mut session = session_with_site();
        session
            .import_pages(&[extracted("/", "Home"), extracted("/about", "About")])
            .unwrap();
        let home = session.pages()[0].id.clone();
        let about = session.pages()[1].id.clone();

        for test_type in ["visual-1", "visual-2", "visual-3", "visual-4", "functional-1"] {
            session
                .record_result(&home, test_type, TestStatus::Ok, None)
                .unwrap();
        }
        session
            .record_result(&about, "functional-2", TestStatus::NotOk, Some("dead link"))
            .unwrap();
        session
            .log_issue(&NewIssue {
                page_id: about.clone(),
                title: "Footer link 404s".into(),
                description: None,
                priority: Some(IssuePriority::High),
            })
            .unwrap();

        let grid = session.grid().unwrap();
        assert_eq!(grid[0].overall, TestStatus::Ok);
        assert_eq!(grid[1].overall, TestStatus::NotOk);
        assert_eq!(grid[1].open_issues, 1);

        let progress = session.progress().unwrap();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.ok, 1);
        assert_eq!(progress.not_ok, 1);
        assert_eq!(progress.open_issues, 1);
        assert!((progress.percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_result_rejects_unknown_type() {
        let mut session = session_with_site();
        let page = session.add_page("https://ex.com/", Some("Home")).unwrap();
        assert!(session
            .record_result(&page.id, "visual-9", TestStatus::Ok, None)
            .is_err());
        assert!(session
            .record_result(&page.id, "images", TestStatus::Ok, None)
            .is_ok());
    }

    #[test]
    fn test_checklist_shows_recorded_results() {
        let mut session = session_with_site();
        let page = session.add_page("https://ex.com/", None).unwrap();
        session
            .record_result(&page.id, "visual-2", TestStatus::NotOk, Some("grey on grey"))
            .unwrap();

        let checklist = session.checklist(&page.id).unwrap();
        assert_eq!(checklist.len(), 10);
        let colors = checklist.iter().find(|e| e.item.id == "visual-2").unwrap();
        assert_eq!(colors.status, TestStatus::NotOk);
        assert_eq!(colors.notes.as_deref(), Some("grey on grey"));
        assert!(checklist
            .iter()
            .filter(|e| e.item.id != "visual-2")
            .all(|e| e.status == TestStatus::Pending));
    }

    #[test]
    fn test_category_result_lands_on_its_checklist_item() {
        let mut session = session_with_site();
        let page = session.add_page("https://ex.com/", None).unwrap();
        let stored = session
            .record_result(&page.id, "images", TestStatus::NotOk, Some("hero missing"))
            .unwrap();
        assert_eq!(stored.test_type, "visual-1");

        session
            .record_result(&page.id, "visual-1", TestStatus::Ok, None)
            .unwrap();
        let results = session
            .store()
            .list_test_results(&[page.id.clone()])
            .unwrap();
        assert_eq!(results.len(), 1);

        session
            .record_result(&page.id, "images", TestStatus::NotOk, None)
            .unwrap();
        let grid = session.grid().unwrap();
        assert_eq!(grid[0].overall, TestStatus::NotOk);
        let checklist = session.checklist(&page.id).unwrap();
        let images = checklist.iter().find(|e| e.item.id == "visual-1").unwrap();
        assert_eq!(images.status, TestStatus::NotOk);
    }

    #[test]
    fn test_checklist_reads_rows_stored_under_a_category() {
        let mut session = session_with_site();
        let page = session.add_page("https://ex.com/", None).unwrap();
        session
            .store()
            .upsert_test_result(&page.id, "fonts", TestStatus::Ok, None)
            .unwrap();
        let checklist = session.checklist(&page.id).unwrap();
        let fonts = checklist.iter().find(|e| e.item.id == "visual-3").unwrap();
        assert_eq!(fonts.status, TestStatus::Ok);
    }

    #[test]
    fn test_delete_selects_next_website() {
        let mut session = session_with_site();
        let first = session.current().unwrap().id.clone();
        session
            .create_website(&NewWebsite {
                name: "Second".into(),
                base_url: "https://second.example".into(),
                sitemap_url: None,
            })
            .unwrap();

        let next = session.delete_current().unwrap().map(|w| w.id.clone());
        assert_eq!(next.as_deref(), Some(first.as_str()));
        session.delete_current().unwrap();
        assert!(session.current().is_none());
        assert!(session.websites().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_page_by_row() {
        let mut session = session_with_site();
        session
            .import_pages(&[extracted("/", "Home"), extracted("/about", "About")])
            .unwrap();
        assert_eq!(session.resolve_page("2").unwrap().display_title(), "About");
        assert!(session.resolve_page("7").is_err());
    }
}
