//! Row types for websites, pages, test results and issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A website under test. Soft-deleted rows carry `deleted_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Website {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub sitemap_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields needed to create a website.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewWebsite {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub sitemap_url: Option<String>,
}

/// Partial update of a website. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebsiteChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub sitemap_url: Option<String>,
}

impl WebsiteChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.base_url.is_none() && self.sitemap_url.is_none()
    }
}

/// A page of a website, ordered by `order_index` in the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub website_id: String,
    pub url: String,
    pub title: Option<String>,
    pub parent_id: Option<String>,
    pub order_index: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Title to show in the grid; falls back to the URL.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

/// A page waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPage {
    pub url: String,
    pub title: Option<String>,
}

/// Outcome of a single test item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    Ok,
    NotOk,
    #[default]
    Pending,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotOk => "not-ok",
            Self::Pending => "pending",
        }
    }

    pub fn is_reported(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// The recorded result of one test type on one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: String,
    pub page_id: String,
    pub test_type: String,
    pub status: TestStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
}

impl IssuePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    #[default]
    Open,
    Resolved,
    Closed,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

/// An issue logged against a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub page_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<IssuePriority>,
    pub status: Option<IssueStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Issues without a status are treated as open.
    pub fn is_open(&self) -> bool {
        matches!(self.status, None | Some(IssueStatus::Open))
    }
}

/// Fields needed to log an issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewIssue {
    pub page_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<IssuePriority>,
}

/// Error returned when parsing one of the enums from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

impl FromStr for TestStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ok" | "pass" => Ok(Self::Ok),
            "not-ok" | "not_ok" | "notok" | "fail" => Ok(Self::NotOk),
            "pending" => Ok(Self::Pending),
            _ => Err(ParseEnumError {
                kind: "test status",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for IssuePriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError {
                kind: "issue priority",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for IssueStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseEnumError {
                kind: "issue status",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_uses_kebab_case() {
        let json = serde_json::to_string(&TestStatus::NotOk).unwrap();
        assert_eq!(json, "\"not-ok\"");
        let back: TestStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(back, TestStatus::Pending);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("not-ok".parse::<TestStatus>().unwrap(), TestStatus::NotOk);
        assert_eq!(" OK ".parse::<TestStatus>().unwrap(), TestStatus::Ok);
        assert_eq!("High".parse::<IssuePriority>().unwrap(), IssuePriority::High);
        assert_eq!("closed".parse::<IssueStatus>().unwrap(), IssueStatus::Closed);

        let err = "maybe".parse::<TestStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid test status: 'maybe'");
    }

    #[test]
    fn test_issue_without_status_is_open() {
        let now = Utc::now();
        let mut issue = Issue {
            id: "i1".into(),
            page_id: "p1".into(),
            title: "Broken hero image".into(),
            description: None,
            priority: None,
            status: None,
            created_at: now,
            updated_at: now,
        };
        assert!(issue.is_open());
        issue.status = Some(IssueStatus::Resolved);
        assert!(!issue.is_open());
    }
}
