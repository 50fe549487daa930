//! Static catalog of the standard per-page test items.

use serde::Serialize;
use std::fmt;

/// Whether a test item checks appearance or behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Visual,
    Functional,
}

/// The eight categories that feed the overall page status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Loading,
    Images,
    Colors,
    Fonts,
    Layout,
    Navigation,
    Forms,
    Buttons,
}

impl Category {
    /// All tracked categories in grid column order.
    pub const ALL: [Category; 8] = [
        Category::Loading,
        Category::Images,
        Category::Colors,
        Category::Fonts,
        Category::Layout,
        Category::Navigation,
        Category::Forms,
        Category::Buttons,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Images => "images",
            Self::Colors => "colors",
            Self::Fonts => "fonts",
            Self::Layout => "layout",
            Self::Navigation => "navigation",
            Self::Forms => "forms",
            Self::Buttons => "buttons",
        }
    }

    /// Column header used in the grid and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "Loading",
            Self::Images => "Images",
            Self::Colors => "Colors",
            Self::Fonts => "Fonts",
            Self::Layout => "Layout",
            Self::Navigation => "Navigation",
            Self::Forms => "Forms",
            Self::Buttons => "Buttons",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the standard checklist.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestItem {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: TestKind,
    pub title: &'static str,
    pub description: &'static str,
    /// Display grouping shown next to the item.
    pub category: &'static str,
    /// Category this item feeds into, if any.
    pub tracks: Option<Category>,
}

pub const TEST_ITEMS: &[TestItem] = &[
    TestItem {
        id: "visual-1",
        kind: TestKind::Visual,
        title: "Images Loading",
        description: "Check that all images on the page load properly without broken links",
        category: "Visual",
        tracks: Some(Category::Images),
    },
    TestItem {
        id: "visual-2",
        kind: TestKind::Visual,
        title: "Text Colors",
        description: "Verify text colors match the design specifications",
        category: "Visual",
        tracks: Some(Category::Colors),
    },
    TestItem {
        id: "visual-3",
        kind: TestKind::Visual,
        title: "Font Styles",
        description: "Check that fonts are consistent with the design system",
        category: "Visual",
        tracks: Some(Category::Fonts),
    },
    TestItem {
        id: "visual-4",
        kind: TestKind::Visual,
        title: "Layout Consistency",
        description: "Ensure layout is consistent across different screen sizes",
        category: "Visual",
        tracks: Some(Category::Layout),
    },
    TestItem {
        id: "visual-5",
        kind: TestKind::Visual,
        title: "Color Contrast",
        description: "Verify color contrast meets accessibility standards",
        category: "Visual",
        tracks: None,
    },
    TestItem {
        id: "functional-1",
        kind: TestKind::Functional,
        title: "Page Loading Speed",
        description: "Check page loading time and performance",
        category: "Performance",
        tracks: Some(Category::Loading),
    },
    TestItem {
        id: "functional-2",
        kind: TestKind::Functional,
        title: "Navigation Links",
        description: "Test all navigation links work correctly",
        category: "Navigation",
        tracks: Some(Category::Navigation),
    },
    TestItem {
        id: "functional-3",
        kind: TestKind::Functional,
        title: "Form Submissions",
        description: "Test form validation and submission functionality",
        category: "Forms",
        tracks: Some(Category::Forms),
    },
    TestItem {
        id: "functional-4",
        kind: TestKind::Functional,
        title: "Button Functionality",
        description: "Verify all buttons perform expected actions",
        category: "Interactions",
        tracks: Some(Category::Buttons),
    },
    TestItem {
        id: "functional-5",
        kind: TestKind::Functional,
        title: "Error Handling",
        description: "Test error messages and recovery mechanisms",
        category: "Error Handling",
        tracks: None,
    },
];

/// Look up a catalog item by id.
pub fn find_item(id: &str) -> Option<&'static TestItem> {
    TEST_ITEMS.iter().find(|item| item.id == id)
}

/// Map a stored `test_type` onto its tracked category.
///
/// Accepts catalog ids (`visual-1`) and bare category names (`images`).
pub fn category_for(test_type: &str) -> Option<Category> {
    match find_item(test_type) {
        Some(item) => item.tracks,
        None => Category::from_name(test_type),
    }
}

/// The catalog id a result for `test_type` is stored under.
///
/// A bare category name resolves to the item tracking it (`images` is
/// `visual-1`), so a page holds one row per category.
pub fn canonical_test_type(test_type: &str) -> Option<&'static str> {
    if let Some(item) = find_item(test_type) {
        return Some(item.id);
    }
    let category = Category::from_name(test_type)?;
    TEST_ITEMS
        .iter()
        .find(|item| item.tracks == Some(category))
        .map(|item| item.id)
}

/// Whether `test_type` is something a result may be recorded for.
pub fn is_known_test_type(test_type: &str) -> bool {
    canonical_test_type(test_type).is_some()
}

/// Human name for a test type, falling back to the raw id.
pub fn test_type_title(test_type: &str) -> &str {
    match find_item(test_type) {
        Some(item) => item.title,
        None => match Category::from_name(test_type) {
            Some(c) => c.label(),
            None => test_type,
        },
    }
}
