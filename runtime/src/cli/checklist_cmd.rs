//! `sitecheck catalog`, `sitecheck checklist` and `sitecheck test`.

use crate::checklist::catalog::{test_type_title, TEST_ITEMS};
use crate::checklist::status::CategoryStatuses;
use crate::cli::output::{self, Styled};
use crate::cli::Context;
use crate::model::TestStatus;
use anyhow::Result;

pub fn catalog() -> Result<()> {
    if output::is_json() {
        output::print_json(TEST_ITEMS);
        return Ok(());
    }
    let s = Styled::new();
    for item in TEST_ITEMS {
        let tracks = item
            .tracks
            .map(|c| c.as_str().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<14} {:<22} {:<12} {}",
            s.cyan(item.id),
            item.title,
            s.dim(&tracks),
            s.dim(item.description)
        );
    }
    Ok(())
}

/// Show the checklist of one page (row number or id).
pub fn show(ctx: &Context, page_key: &str) -> Result<()> {
    let page = ctx.session.resolve_page(page_key)?;
    let entries = ctx.session.checklist(&page.id)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({ "page": page, "checklist": entries }));
        return Ok(());
    }

    let s = Styled::new();
    let results = ctx.session.store().list_test_results(&[page.id.clone()])?;
    let overall = CategoryStatuses::from_results(&results).overall();
    println!();
    println!("  {} {}", s.bold(page.display_title()), s.dim(&page.url));
    println!("  Overall: {}", s.status(overall, 8));
    println!();
    for entry in &entries {
        println!(
            "  {:<14} {:<22} {}",
            s.cyan(entry.item.id),
            entry.item.title,
            s.status(entry.status, 8)
        );
        if let Some(notes) = &entry.notes {
            println!("  {:<14} {}", "", s.dim(notes));
        }
    }
    println!();
    Ok(())
}

/// Record a result for one page and test type.
pub fn record(
    ctx: &mut Context,
    page_key: &str,
    test_type: &str,
    status: TestStatus,
    notes: Option<&str>,
) -> Result<()> {
    let page = ctx.session.resolve_page(page_key)?;
    let result = ctx.session.record_result(&page.id, test_type, status, notes)?;

    if output::is_json() {
        output::print_json(&result);
    } else if !output::is_quiet() {
        let s = Styled::new();
        eprintln!(
            "  {} {} on {}: {}",
            s.ok_sym(),
            test_type_title(&result.test_type),
            s.bold(page.display_title()),
            s.status(result.status, 0)
        );
    }
    Ok(())
}
