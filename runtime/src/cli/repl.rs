// Copyright 2026 Sitecheck Contributors
// SPDX-License-Identifier: MIT

//! Interactive REPL for Sitecheck.
//!
//! Launch with `sitecheck` (no subcommand) to enter the interactive mode.
//! Type `/help` for available commands, Tab for completion.

use crate::cli::output::Styled;
use crate::cli::repl_commands;
use crate::cli::repl_complete::SitecheckHelper;
use crate::cli::Context;
use crate::config::sitecheck_home;
use anyhow::Result;
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};

/// History file location.
fn history_path() -> std::path::PathBuf {
    sitecheck_home().join("repl_history")
}

fn website_names(ctx: &Context) -> Vec<String> {
    ctx.session
        .websites()
        .map(|sites| sites.into_iter().map(|w| w.name).collect())
        .unwrap_or_default()
}

/// Print the welcome banner with the selected website.
fn print_banner(ctx: &Context) {
    let s = Styled::new();

    eprintln!();
    eprintln!(
        "  {} {} {}",
        s.green("\u{25c9}"),
        s.bold(&format!("Sitecheck v{}", env!("CARGO_PKG_VERSION"))),
        s.dim("manual QA tracker")
    );

    match ctx.session.current() {
        Some(site) => eprintln!(
            "    Website: {} {} | Pages: {}",
            s.bold(&site.name),
            s.dim(&site.base_url),
            ctx.session.pages().len()
        ),
        None => eprintln!(
            "    {} Create one with {}",
            s.yellow("No websites yet."),
            s.cyan("/new <name> <url>")
        ),
    }

    eprintln!();
    eprintln!(
        "    Press {} to browse commands, {} to complete, {} to quit.",
        s.cyan("/"),
        s.dim("Tab"),
        s.dim("/exit")
    );
    eprintln!();
}

/// Run the interactive REPL.
pub async fn run(mut ctx: Context) -> Result<()> {
    print_banner(&ctx);

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<SitecheckHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(SitecheckHelper::new(website_names(&ctx))));

    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let prompt = format!(
        " {} ",
        if Styled::new().ok_sym() == "OK" {
            "sitecheck>"
        } else {
            "\x1b[36msitecheck>\x1b[0m"
        }
    );

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match repl_commands::execute(line, &mut ctx).await {
                    Ok(true) => {
                        let s = Styled::new();
                        eprintln!("  {} Goodbye!", s.dim("\u{2728}"));
                        break;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        let s = Styled::new();
                        eprintln!("  {} {e:#}", s.fail_sym());
                    }
                }

                if let Some(helper) = rl.helper_mut() {
                    helper.set_websites(website_names(&ctx));
                }
            }
            Err(ReadlineError::Interrupted) => {
                let s = Styled::new();
                eprintln!("  {} Type {} to quit.", s.dim("(Ctrl+C)"), s.bold("/exit"));
            }
            Err(ReadlineError::Eof) => {
                let s = Styled::new();
                eprintln!("  {} Goodbye!", s.dim("\u{2728}"));
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    if let Some(parent) = hist_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&hist_path);

    Ok(())
}
