//! Shared CLI output formatting with colors, symbols, and structured display.

use crate::checklist::catalog::Category;
use crate::model::{IssuePriority, IssueStatus, TestStatus};
use crate::session::{GridRow, Progress};
use serde::Serialize;
use std::io::IsTerminal;

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("SITECHECK_NO_COLOR").is_ok() {
        return false;
    }
    std::io::stdout().is_terminal()
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    /// A builder that never emits escape codes.
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Green checkmark symbol.
    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    /// Red X symbol.
    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    /// Yellow warning symbol.
    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    /// Blue circle (info/neutral) symbol.
    pub fn info_sym(&self) -> &str {
        if self.use_color {
            "\x1b[34m\u{25cb}\x1b[0m"
        } else {
            "--"
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn blue(&self, s: &str) -> String {
        self.paint(BLUE, s)
    }

    pub fn cyan(&self, s: &str) -> String {
        self.paint(CYAN, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }

    /// A status word padded to `width`, colored by outcome.
    pub fn status(&self, status: TestStatus, width: usize) -> String {
        let text = format!("{:<width$}", status.as_str());
        match status {
            TestStatus::Ok => self.green(&text),
            TestStatus::NotOk => self.red(&text),
            TestStatus::Pending => self.dim(&text),
        }
    }

    /// One-character grid cell for a status.
    pub fn status_cell(&self, status: TestStatus) -> String {
        match (status, self.use_color) {
            (TestStatus::Ok, true) => self.green("\u{2713}"),
            (TestStatus::NotOk, true) => self.red("\u{2717}"),
            (TestStatus::Pending, true) => self.dim("\u{00b7}"),
            (TestStatus::Ok, false) => "+".to_string(),
            (TestStatus::NotOk, false) => "x".to_string(),
            (TestStatus::Pending, false) => ".".to_string(),
        }
    }

    pub fn priority(&self, priority: IssuePriority) -> String {
        let text = format!("{:<6}", priority.as_str());
        match priority {
            IssuePriority::High => self.red(&text),
            IssuePriority::Medium => self.yellow(&text),
            IssuePriority::Low => self.blue(&text),
        }
    }

    pub fn issue_status(&self, status: IssueStatus) -> String {
        let text = format!("{:<8}", status.as_str());
        match status {
            IssueStatus::Open => self.yellow(&text),
            IssueStatus::Resolved => self.green(&text),
            IssueStatus::Closed => self.dim(&text),
        }
    }
}

/// Print a branded header for CLI output.
pub fn print_header(s: &Styled) {
    eprintln!(
        "  {} {}",
        s.bold("Sitecheck"),
        s.dim(&format!("v{}", env!("CARGO_PKG_VERSION")))
    );
    eprintln!();
}

/// Print a section header.
pub fn print_section(s: &Styled, title: &str) {
    eprintln!("  {}", s.bold(title));
}

/// Print a check result line with symbol and label/value.
pub fn print_check(symbol: &str, label: &str, value: &str) {
    eprintln!("    {symbol} {label:<16} {value}");
}

/// Truncate `s` to `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}\u{2026}")
}

/// First eight characters of an id, for display.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Two-letter column headers for the category cells.
fn category_abbrev(category: Category) -> &'static str {
    match category {
        Category::Loading => "Ld",
        Category::Images => "Im",
        Category::Colors => "Co",
        Category::Fonts => "Fo",
        Category::Layout => "La",
        Category::Navigation => "Nv",
        Category::Forms => "Fm",
        Category::Buttons => "Bt",
    }
}

/// Print the page grid to stdout.
pub fn print_grid(s: &Styled, rows: &[GridRow]) {
    let cats: Vec<&str> = Category::ALL.iter().map(|c| category_abbrev(*c)).collect();
    println!(
        "  {:>3}  {:<28} {}  {:<8} {}",
        s.bold("#"),
        s.bold("Page"),
        s.bold(&cats.join(" ")),
        s.bold("Overall"),
        s.bold("Issues")
    );
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .categories
            .iter()
            .map(|(_, status)| format!("{} ", s.status_cell(status)))
            .collect();
        let issues = if row.open_issues > 0 {
            s.yellow(&row.open_issues.to_string())
        } else {
            s.dim("0")
        };
        println!(
            "  {:>3}  {:<28} {}  {} {}",
            i + 1,
            truncate(row.page.display_title(), 28),
            cells.join(" "),
            s.status(row.overall, 8),
            issues
        );
        println!("       {}", s.dim(&truncate(&row.page.url, 72)));
    }
}

/// Print the completion summary line.
pub fn print_progress(s: &Styled, progress: &Progress) {
    println!(
        "  {} {}  {} ok  {} not ok  {} open issues  {}",
        s.bold("Progress:"),
        progress_bar(progress.ok, progress.total, 20),
        s.green(&progress.ok.to_string()),
        s.red(&progress.not_ok.to_string()),
        s.yellow(&progress.open_issues.to_string()),
        s.dim(&format!("({} pages)", progress.total))
    );
}

/// Simple progress bar string.
pub fn progress_bar(current: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return format!("[{}]   0%", " ".repeat(width));
    }
    let filled = (current.min(total) * width) / total;
    let empty = width - filled;
    let pct = (current.min(total) * 100) / total;
    format!(
        "[{}{}] {pct:>3}%",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(empty)
    )
}

/// Check if --quiet mode is active.
pub fn is_quiet() -> bool {
    std::env::var("SITECHECK_QUIET").is_ok()
}

/// Check if --json mode is active.
pub fn is_json() -> bool {
    std::env::var("SITECHECK_JSON").is_ok()
}

/// Print a value as pretty JSON to stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0, 0, 4), "[    ]   0%");
        assert_eq!(progress_bar(1, 2, 4), "[\u{2588}\u{2588}\u{2591}\u{2591}]  50%");
        assert_eq!(progress_bar(3, 3, 2), "[\u{2588}\u{2588}] 100%");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd\u{2026}");
    }

    #[test]
    fn test_plain_cells() {
        let s = Styled::plain();
        assert_eq!(s.status_cell(TestStatus::Ok), "+");
        assert_eq!(s.status_cell(TestStatus::NotOk), "x");
        assert_eq!(s.status(TestStatus::Pending, 8), "pending ");
        assert_eq!(s.ok_sym(), "OK");
    }
}
