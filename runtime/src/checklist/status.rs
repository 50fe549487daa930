//! Derive a page's overall status from its recorded test results.
//!
//! The overall status is never stored. It is recomputed from the
//! `test_results` rows every time it is read.

use crate::checklist::catalog::{category_for, Category};
use crate::model::{TestResult, TestStatus};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Minimum number of reported categories before a page counts as ok.
pub const MIN_REPORTED_CATEGORIES: usize = 5;

/// Status of each tracked category for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryStatuses([TestStatus; 8]);

impl CategoryStatuses {
    /// Fold a page's results into per-category statuses.
    ///
    /// When several rows land on one category, not-ok beats ok beats pending.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> Self {
        let mut statuses = Self::default();
        for result in results {
            if let Some(category) = category_for(&result.test_type) {
                statuses.merge(category, result.status);
            }
        }
        statuses
    }

    fn merge(&mut self, category: Category, status: TestStatus) {
        let slot = &mut self.0[category.index()];
        *slot = match (*slot, status) {
            (TestStatus::NotOk, _) | (_, TestStatus::NotOk) => TestStatus::NotOk,
            (TestStatus::Ok, _) | (_, TestStatus::Ok) => TestStatus::Ok,
            _ => TestStatus::Pending,
        };
    }

    pub fn get(&self, category: Category) -> TestStatus {
        self.0[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, TestStatus)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn reported(&self) -> usize {
        self.0.iter().filter(|s| s.is_reported()).count()
    }

    /// Apply the overall rule.
    pub fn overall(&self) -> TestStatus {
        if self.0.contains(&TestStatus::NotOk) {
            TestStatus::NotOk
        } else if self.reported() >= MIN_REPORTED_CATEGORIES {
            TestStatus::Ok
        } else {
            TestStatus::Pending
        }
    }
}

/// Serializes as a map from category name to status, in column order.
impl Serialize for CategoryStatuses {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for (category, status) in self.iter() {
            map.serialize_entry(category.as_str(), &status)?;
        }
        map.end()
    }
}

/// Overall status for a single page's results.
pub fn overall_status<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> TestStatus {
    CategoryStatuses::from_results(results).overall()
}

/// Per-category statuses for every page id present in `results`.
pub fn category_statuses_by_page(results: &[TestResult]) -> HashMap<String, CategoryStatuses> {
    let mut grouped: HashMap<&str, Vec<&TestResult>> = HashMap::new();
    for result in results {
        grouped.entry(result.page_id.as_str()).or_default().push(result);
    }
    grouped
        .into_iter()
        .map(|(page_id, rows)| (page_id.to_string(), CategoryStatuses::from_results(rows)))
        .collect()
}

/// Overall status for each of `page_ids`. Pages without results are pending.
pub fn reconcile(page_ids: &[String], results: &[TestResult]) -> HashMap<String, TestStatus> {
    let by_page = category_statuses_by_page(results);
    page_ids
        .iter()
        .map(|id| {
            let overall = by_page
                .get(id)
                .map(CategoryStatuses::overall)
                .unwrap_or(TestStatus::Pending);
            (id.clone(), overall)
        })
        .collect()
}
