//! `sitecheck pages` and `sitecheck page`: the page grid and page edits.

use crate::cli::output::{self, Styled};
use crate::cli::Context;
use anyhow::{bail, Context as _, Result};

/// Print the page grid of the selected website with its progress line.
pub fn grid(ctx: &Context) -> Result<()> {
    let website = ctx
        .session
        .current()
        .context("no website selected")?
        .clone();
    let rows = ctx.session.grid()?;
    let progress = crate::session::progress_of(&rows);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "website": website,
            "pages": rows,
            "progress": progress,
        }));
        return Ok(());
    }

    let s = Styled::new();
    println!();
    println!("  {} {}", s.bold(&website.name), s.dim(&website.base_url));
    println!();
    if rows.is_empty() {
        println!(
            "  {} No pages yet. Use {} or {}.",
            s.info_sym(),
            s.bold("import"),
            s.bold("page add <url>")
        );
        return Ok(());
    }
    output::print_grid(&s, &rows);
    println!();
    output::print_progress(&s, &progress);
    println!();
    Ok(())
}

pub fn add(ctx: &mut Context, url: &str, title: Option<&str>) -> Result<()> {
    let page = ctx.session.add_page(url, title)?;
    if output::is_json() {
        output::print_json(&page);
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!(
            "  {} Added {} as row {}.",
            s.ok_sym(),
            s.bold(page.display_title()),
            ctx.session.pages().len()
        );
    }
    Ok(())
}

/// Move the given pages (row numbers or ids) to the top, in that order.
pub fn reorder(ctx: &mut Context, keys: &[String]) -> Result<()> {
    if keys.is_empty() {
        bail!("give the pages to move, by row number or id");
    }
    let ids = keys
        .iter()
        .map(|k| ctx.session.resolve_page(k).map(|p| p.id))
        .collect::<Result<Vec<_>>>()?;
    ctx.session.reorder_pages(&ids)?;

    if output::is_json() {
        output::print_json(ctx.session.pages());
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!("  {} Reordered {} pages.", s.ok_sym(), ids.len());
    }
    Ok(())
}
