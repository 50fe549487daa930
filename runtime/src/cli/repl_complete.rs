// Copyright 2026 Sitecheck Contributors
// SPDX-License-Identifier: MIT

//! Tab completion for the Sitecheck interactive REPL.
//!
//! Completes slash commands, website names for `/use`, and test types and
//! statuses for `/test`.

use crate::checklist::catalog::{Category, TEST_ITEMS};
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Helper;

/// All available REPL slash commands.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/websites", "List websites"),
    ("/use", "Switch to a website by name or id"),
    ("/new", "Create a website: /new <name> <url> [sitemap-url]"),
    ("/edit", "Edit the website: /edit name=.. url=.. sitemap=.."),
    ("/delete", "Delete the current website"),
    ("/sitemap", "Preview the pages of a sitemap"),
    ("/import", "Import pages: /import [url] [--fallback home|common]"),
    ("/pages", "Show the page grid"),
    ("/add", "Add a page: /add <url> [title]"),
    ("/move", "Move pages to the top: /move <row>..."),
    ("/check", "Show a page's checklist: /check <row>"),
    ("/test", "Record a result: /test <row> <type> <status> [notes]"),
    ("/issue", "Log an issue: /issue <row> <title> [--priority p]"),
    ("/issues", "List issues (--open for open only)"),
    ("/resolve", "Set issue status: /resolve <id> [resolved|closed|open]"),
    ("/progress", "Show completion progress"),
    ("/export", "Export a report: /export [xlsx|csv|json] [path]"),
    ("/catalog", "Show the standard test items"),
    ("/settings", "View current configuration"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

const TEST_STATUSES: &[&str] = &["ok", "not-ok", "pending"];
const ISSUE_STATUSES: &[&str] = &["resolved", "closed", "open"];
const FORMATS: &[&str] = &["xlsx", "csv", "json"];

/// Sitecheck REPL helper providing tab completion.
#[derive(Default)]
pub struct SitecheckHelper {
    /// Website names, refreshed after every command.
    websites: Vec<String>,
}

impl SitecheckHelper {
    pub fn new(websites: Vec<String>) -> Self {
        Self { websites }
    }

    pub fn set_websites(&mut self, websites: Vec<String>) {
        self.websites = websites;
    }

    fn test_types() -> impl Iterator<Item = &'static str> {
        TEST_ITEMS
            .iter()
            .map(|item| item.id)
            .chain(Category::ALL.iter().map(|c| c.as_str()))
    }
}

fn pairs<'a>(candidates: impl Iterator<Item = &'a str>, prefix: &str) -> Vec<Pair> {
    candidates
        .filter(|c| c.starts_with(prefix))
        .map(|c| Pair {
            display: c.to_string(),
            replacement: format!("{c} "),
        })
        .collect()
}

impl Completer for SitecheckHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // Position of the word under the cursor.
        let word_start = input.rfind(' ').map(|i| i + 1).unwrap_or(0);
        let word = &input[word_start..];
        let args: Vec<&str> = input.split_whitespace().collect();
        let Some(cmd) = args.first().copied() else {
            return Ok((pos, Vec::new()));
        };
        // Index of the argument being typed, counting the command as 0.
        let arg_index = if word.is_empty() { args.len() } else { args.len() - 1 };

        let matches = match (cmd, arg_index) {
            ("/use", 1) => pairs(self.websites.iter().map(String::as_str), word),
            ("/test", 2) => pairs(Self::test_types(), word),
            ("/test", 3) => pairs(TEST_STATUSES.iter().copied(), word),
            ("/resolve", 2) => pairs(ISSUE_STATUSES.iter().copied(), word),
            ("/export", 1) => pairs(FORMATS.iter().copied(), word),
            _ => Vec::new(),
        };
        Ok((word_start, matches))
    }
}

impl Hinter for SitecheckHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        // Show first matching command as ghost text
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for SitecheckHelper {}
impl Validator for SitecheckHelper {}
impl Helper for SitecheckHelper {}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut cur = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
        }
        prev = cur;
    }
    prev[b.len()]
}

/// Closest known command to a mistyped one, if any is close enough.
pub fn suggest_command(cmd: &str) -> Option<&'static str> {
    let typed = format!("/{}", cmd.trim_start_matches('/'));
    COMMANDS
        .iter()
        .map(|(name, _)| (*name, edit_distance(&typed, name)))
        .filter(|(_, d)| *d <= 2)
        .min_by_key(|(_, d)| *d)
        .map(|(name, _)| name)
}
