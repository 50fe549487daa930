//! `sitecheck website`: create, list, edit, select and delete websites.

use crate::cli::output::{self, Styled};
use crate::cli::Context;
use crate::model::{NewWebsite, Website, WebsiteChanges};
use anyhow::Result;

fn print_website(s: &Styled, website: &Website, selected: bool) {
    let marker = if selected { s.green("\u{25c9}") } else { " ".to_string() };
    println!("  {marker} {:<24} {}", s.bold(&website.name), website.base_url);
    if let Some(sitemap) = &website.sitemap_url {
        println!("      {}", s.dim(&format!("sitemap: {sitemap}")));
    }
    println!("      {}", s.dim(&format!("id: {}", website.id)));
}

pub fn add(ctx: &mut Context, name: &str, base_url: &str, sitemap_url: Option<&str>) -> Result<()> {
    let website = ctx
        .session
        .create_website(&NewWebsite {
            name: name.to_string(),
            base_url: base_url.to_string(),
            sitemap_url: sitemap_url.map(str::to_string),
        })?
        .clone();

    if output::is_json() {
        output::print_json(&website);
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!("  {} Created {} and selected it.", s.ok_sym(), s.bold(&website.name));
    }
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let websites = ctx.session.websites()?;
    if output::is_json() {
        output::print_json(&websites);
        return Ok(());
    }

    let s = Styled::new();
    if websites.is_empty() {
        eprintln!(
            "  {} No websites yet. Add one with {}.",
            s.info_sym(),
            s.bold("website add <name> <url>")
        );
        return Ok(());
    }
    let current = ctx.session.current().map(|w| w.id.as_str());
    for website in &websites {
        print_website(&s, website, current == Some(website.id.as_str()));
    }
    Ok(())
}

/// Select a website by id or name.
pub fn select(ctx: &mut Context, key: &str) -> Result<()> {
    let website = ctx.session.select_website(key)?.clone();
    let pages = ctx.session.pages().len();
    if output::is_json() {
        output::print_json(&website);
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!(
            "  {} Using {} ({pages} pages).",
            s.ok_sym(),
            s.bold(&website.name)
        );
    }
    Ok(())
}

pub fn edit(ctx: &mut Context, changes: &WebsiteChanges) -> Result<()> {
    let website = ctx.session.update_current(changes)?.clone();
    if output::is_json() {
        output::print_json(&website);
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!("  {} Updated:", s.ok_sym());
        print_website(&s, &website, true);
    }
    Ok(())
}

/// Soft-delete the selected website.
pub fn delete(ctx: &mut Context) -> Result<()> {
    let name = ctx
        .session
        .current()
        .map(|w| w.name.clone())
        .unwrap_or_default();
    let next = ctx.session.delete_current()?.map(|w| w.name.clone());

    if output::is_json() {
        output::print_json(&serde_json::json!({ "deleted": name, "selected": next }));
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!("  {} Deleted {}.", s.ok_sym(), s.bold(&name));
        match next {
            Some(next) => eprintln!("  {} Now using {}.", s.info_sym(), s.bold(&next)),
            None => eprintln!("  {} No websites left.", s.info_sym()),
        }
    }
    Ok(())
}
