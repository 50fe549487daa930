//! `sitecheck issue`: log, list and resolve issues.

use crate::cli::output::{self, Styled};
use crate::cli::Context;
use crate::model::{IssuePriority, IssueStatus, NewIssue};
use anyhow::Result;
use std::collections::HashMap;

pub fn add(
    ctx: &mut Context,
    page_key: &str,
    title: &str,
    description: Option<&str>,
    priority: Option<IssuePriority>,
) -> Result<()> {
    let page = ctx.session.resolve_page(page_key)?;
    let issue = ctx.session.log_issue(&NewIssue {
        page_id: page.id.clone(),
        title: title.to_string(),
        description: description.map(str::to_string),
        priority,
    })?;

    if output::is_json() {
        output::print_json(&issue);
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!(
            "  {} Logged issue {} on {}.",
            s.ok_sym(),
            s.dim(output::short_id(&issue.id)),
            s.bold(page.display_title())
        );
    }
    Ok(())
}

/// List issues of the selected website. `open_only` hides resolved and closed ones.
pub fn list(ctx: &Context, open_only: bool) -> Result<()> {
    let issues: Vec<_> = ctx
        .session
        .issues()?
        .into_iter()
        .filter(|i| !open_only || i.is_open())
        .collect();

    if output::is_json() {
        output::print_json(&issues);
        return Ok(());
    }

    let s = Styled::new();
    if issues.is_empty() {
        println!("  {} No issues.", s.info_sym());
        return Ok(());
    }
    let titles: HashMap<&str, &str> = ctx
        .session
        .pages()
        .iter()
        .map(|p| (p.id.as_str(), p.display_title()))
        .collect();
    for issue in &issues {
        println!(
            "  {}  {} {} {:<36} {}",
            s.dim(output::short_id(&issue.id)),
            s.priority(issue.priority.unwrap_or_default()),
            s.issue_status(issue.status.unwrap_or_default()),
            output::truncate(&issue.title, 36),
            s.dim(titles.get(issue.page_id.as_str()).copied().unwrap_or("?"))
        );
    }
    Ok(())
}

/// Change an issue's status. `id` may be a unique prefix.
pub fn set_status(ctx: &mut Context, id: &str, status: IssueStatus) -> Result<()> {
    let id = resolve_issue_id(ctx, id)?;
    let issue = ctx.session.set_issue_status(&id, status)?;

    if output::is_json() {
        output::print_json(&issue);
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!(
            "  {} {} is now {}.",
            s.ok_sym(),
            s.bold(&issue.title),
            status.as_str()
        );
    }
    Ok(())
}

fn resolve_issue_id(ctx: &Context, key: &str) -> Result<String> {
    let key = key.trim();
    let matches: Vec<String> = ctx
        .session
        .issues()?
        .into_iter()
        .filter(|i| i.id.starts_with(key))
        .map(|i| i.id)
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.clone()),
        [] => Ok(key.to_string()),
        _ => anyhow::bail!("issue id prefix '{key}' is ambiguous"),
    }
}
