// Copyright 2026 Sitecheck Contributors
// SPDX-License-Identifier: MIT

//! Slash command parsing and dispatch for the Sitecheck REPL.
//!
//! Each slash command maps onto the same functions the one-shot CLI
//! subcommands use, acting on the REPL's open context.

use crate::cli::output::{self, Styled};
use crate::cli::repl_complete::{suggest_command, COMMANDS};
use crate::cli::{
    checklist_cmd, export_cmd, import_cmd, issue_cmd, page_cmd, website_cmd, Context,
};
use crate::export::ExportFormat;
use crate::model::{IssuePriority, IssueStatus, TestStatus, WebsiteChanges};
use crate::session::Fallback;
use anyhow::{bail, Result};
use std::path::Path;

/// Split a command line into words. Double quotes group words and are removed.
pub fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }
    args
}

/// Remove `--name value` from `args`, returning the value.
fn take_option(args: &mut Vec<String>, name: &str) -> Result<Option<String>> {
    let Some(i) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if i + 1 >= args.len() {
        bail!("{name} needs a value");
    }
    let value = args.remove(i + 1);
    args.remove(i);
    Ok(Some(value))
}

/// Remove a bare `--name` flag from `args`.
fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    match args.iter().position(|a| a == name) {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    }
}

fn usage(cmd: &str) -> anyhow::Error {
    let line = COMMANDS
        .iter()
        .find(|(name, _)| name.trim_start_matches('/') == cmd)
        .map(|(_, desc)| *desc)
        .unwrap_or("see /help");
    anyhow::anyhow!("usage: {line}")
}

/// Parse and execute a slash command. Returns `true` if the REPL should exit.
pub async fn execute(input: &str, ctx: &mut Context) -> Result<bool> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(false);
    }

    // Strip leading / if present
    let input = input.strip_prefix('/').unwrap_or(input);

    // Bare `/` shows help
    if input.is_empty() {
        cmd_help();
        return Ok(false);
    }

    let mut args = split_args(input);
    let cmd = args.remove(0);

    match cmd.as_str() {
        "exit" | "quit" | "q" => return Ok(true),
        "help" | "h" | "?" => cmd_help(),
        "clear" | "cls" => cmd_clear(),
        "websites" | "ls" => website_cmd::list(ctx)?,
        "use" if args.is_empty() => return Err(usage("use")),
        "use" => website_cmd::select(ctx, &args.join(" "))?,
        "new" => cmd_new(&args, ctx)?,
        "edit" => cmd_edit(&args, ctx)?,
        "delete" => website_cmd::delete(ctx)?,
        "sitemap" => match args.first() {
            Some(url) => import_cmd::preview(ctx, url).await?,
            None => return Err(usage("sitemap")),
        },
        "import" => cmd_import(args, ctx).await?,
        "pages" | "grid" => page_cmd::grid(ctx)?,
        "add" => match args.as_slice() {
            [url] => page_cmd::add(ctx, url, None)?,
            [url, title @ ..] => page_cmd::add(ctx, url, Some(&title.join(" ")))?,
            [] => return Err(usage("add")),
        },
        "move" => page_cmd::reorder(ctx, &args)?,
        "check" => match args.first() {
            Some(page) => checklist_cmd::show(ctx, page)?,
            None => return Err(usage("check")),
        },
        "test" => cmd_test(&args, ctx)?,
        "issue" => cmd_issue(args, ctx)?,
        "issues" => issue_cmd::list(ctx, take_flag(&mut args, "--open"))?,
        "resolve" => match args.as_slice() {
            [id] => issue_cmd::set_status(ctx, id, IssueStatus::Resolved)?,
            [id, status] => issue_cmd::set_status(ctx, id, status.parse()?)?,
            _ => return Err(usage("resolve")),
        },
        "progress" => cmd_progress(ctx)?,
        "export" => cmd_export(&args, ctx)?,
        "catalog" => checklist_cmd::catalog()?,
        "settings" | "config" => cmd_settings(ctx),
        _ => {
            let s = Styled::new();
            if let Some(suggestion) = suggest_command(&cmd) {
                eprintln!(
                    "  {} Unknown command '/{cmd}'. Did you mean {}?",
                    s.warn_sym(),
                    s.bold(suggestion)
                );
            } else {
                eprintln!(
                    "  {} Unknown command '/{cmd}'. Type {} or press {} for commands.",
                    s.warn_sym(),
                    s.bold("/help"),
                    s.bold("/")
                );
            }
        }
    }

    Ok(false)
}

/// /help: Show available commands.
fn cmd_help() {
    let s = Styled::new();
    eprintln!();
    eprintln!("  {}", s.bold("Commands:"));
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {:<22} {}", s.cyan(cmd), s.dim(desc));
    }
    eprintln!();
    eprintln!(
        "  {}",
        s.dim("Pages are addressed by grid row number (see /pages) or id prefix.")
    );
    eprintln!();
}

/// /clear: Clear the terminal.
fn cmd_clear() {
    eprint!("\x1b[2J\x1b[H");
}

/// /new <name> <url> [sitemap-url]
fn cmd_new(args: &[String], ctx: &mut Context) -> Result<()> {
    match args {
        [name, url] => website_cmd::add(ctx, name, url, None),
        [name, url, sitemap] => website_cmd::add(ctx, name, url, Some(sitemap)),
        _ => Err(usage("new")),
    }
}

/// Parse `key=value` pairs into website changes.
fn parse_changes(args: &[String]) -> Result<WebsiteChanges> {
    let mut changes = WebsiteChanges::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("expected key=value, got '{arg}'");
        };
        match key {
            "name" => changes.name = Some(value.to_string()),
            "url" | "base_url" => changes.base_url = Some(value.to_string()),
            "sitemap" | "sitemap_url" => changes.sitemap_url = Some(value.to_string()),
            other => bail!("unknown field '{other}' (expected name, url or sitemap)"),
        }
    }
    if changes.is_empty() {
        bail!("nothing to change");
    }
    Ok(changes)
}

/// /edit name=.. url=.. sitemap=..
fn cmd_edit(args: &[String], ctx: &mut Context) -> Result<()> {
    let changes = parse_changes(args)?;
    website_cmd::edit(ctx, &changes)
}

/// /import [url] [--fallback home|common]
async fn cmd_import(mut args: Vec<String>, ctx: &mut Context) -> Result<()> {
    let fallback = match take_option(&mut args, "--fallback")? {
        Some(f) => f.parse::<Fallback>()?,
        None => Fallback::None,
    };
    import_cmd::import(ctx, args.first().map(String::as_str), fallback).await
}

/// /test <row> <type> <status> [notes]
fn cmd_test(args: &[String], ctx: &mut Context) -> Result<()> {
    match args {
        [page, test_type, status, notes @ ..] => {
            let status: TestStatus = status.parse()?;
            let notes = notes.join(" ");
            let notes = (!notes.is_empty()).then_some(notes.as_str());
            checklist_cmd::record(ctx, page, test_type, status, notes)
        }
        _ => Err(usage("test")),
    }
}

/// /issue <row> <title> [--priority p] [--description text]
fn cmd_issue(mut args: Vec<String>, ctx: &mut Context) -> Result<()> {
    let priority = take_option(&mut args, "--priority")?
        .map(|p| p.parse::<IssuePriority>())
        .transpose()?;
    let description = take_option(&mut args, "--description")?;
    match args.as_slice() {
        [page, title @ ..] if !title.is_empty() => {
            issue_cmd::add(ctx, page, &title.join(" "), description.as_deref(), priority)
        }
        _ => Err(usage("issue")),
    }
}

/// /progress: One-line summary.
fn cmd_progress(ctx: &Context) -> Result<()> {
    let progress = ctx.session.progress()?;
    if output::is_json() {
        output::print_json(&progress);
    } else {
        output::print_progress(&Styled::new(), &progress);
    }
    Ok(())
}

/// /export [xlsx|csv|json] [path]
fn cmd_export(args: &[String], ctx: &Context) -> Result<()> {
    let (format, path) = match args {
        [] => (ExportFormat::default(), None),
        [format] => (format.parse()?, None),
        [format, path, ..] => (format.parse()?, Some(Path::new(path.as_str()))),
    };
    export_cmd::run(ctx, format, path)
}

/// /settings: Show the effective configuration.
fn cmd_settings(ctx: &Context) {
    if output::is_json() {
        output::print_json(&ctx.settings);
        return;
    }
    let s = Styled::new();
    output::print_section(&s, "Settings");
    output::print_check(
        s.info_sym(),
        "Database:",
        &ctx.settings.database_path().display().to_string(),
    );
    output::print_check(
        s.info_sym(),
        "HTTP timeout:",
        &format!("{} ms", ctx.settings.http.timeout_ms),
    );
    output::print_check(s.info_sym(), "Server bind:", &ctx.settings.server.bind);
    output::print_check(
        s.info_sym(),
        "Export dir:",
        &ctx.settings.export_dir().display().to_string(),
    );
}
