//! `sitecheck sitemap` and `sitecheck import`.

use crate::cartography::sitemap::extract_pages;
use crate::cli::output::{self, Styled};
use crate::cli::progress;
use crate::cli::Context;
use crate::session::Fallback;
use anyhow::Result;

/// Fetch a sitemap and print its pages without storing them. The URL is
/// fetched as given; discovery only runs on import.
pub async fn preview(ctx: &Context, url: &str) -> Result<()> {
    let s = Styled::new();
    let hidden = output::is_quiet() || output::is_json();
    let bar = progress::create_spinner(&format!("Fetching {url}"), hidden);

    let sitemap_url = url.trim();
    let pages = match extract_pages(&ctx.client, sitemap_url).await {
        Ok(pages) => pages,
        Err(e) => {
            progress::finish(&bar, s.fail_sym(), sitemap_url);
            return Err(e.into());
        }
    };
    progress::finish(
        &bar,
        s.ok_sym(),
        &format!("{} pages in {sitemap_url}", pages.len()),
    );

    if output::is_json() {
        output::print_json(&serde_json::json!({ "pages": pages }));
        return Ok(());
    }
    for (i, page) in pages.iter().enumerate() {
        println!("  {:>4}  {:<32} {}", i + 1, output::truncate(&page.title, 32), s.dim(&page.url));
    }
    Ok(())
}

/// Import a sitemap into the selected website.
pub async fn import(ctx: &mut Context, url: Option<&str>, fallback: Fallback) -> Result<()> {
    let s = Styled::new();
    let hidden = output::is_quiet() || output::is_json();
    let bar = progress::create_spinner("Importing sitemap", hidden);

    let summary = match ctx.session.import_sitemap(&ctx.client, url, fallback).await {
        Ok(summary) => summary,
        Err(e) => {
            progress::finish(&bar, s.fail_sym(), "Import failed");
            return Err(e);
        }
    };

    if output::is_json() {
        bar.finish_and_clear();
        output::print_json(&summary);
        return Ok(());
    }
    match summary.fallback {
        _ if summary.found > 0 => progress::finish(
            &bar,
            s.ok_sym(),
            &format!("Imported {} pages from {}", summary.inserted, summary.sitemap_url),
        ),
        Some(fallback) => progress::finish(
            &bar,
            s.warn_sym(),
            &format!(
                "No pages in {}; added {} {} pages",
                summary.sitemap_url,
                summary.inserted,
                match fallback {
                    Fallback::HomeOnly => "home",
                    _ => "common",
                }
            ),
        ),
        None => progress::finish(
            &bar,
            s.warn_sym(),
            &format!(
                "No pages found in {}. Retry with --fallback home or --fallback common.",
                summary.sitemap_url
            ),
        ),
    }
    Ok(())
}
