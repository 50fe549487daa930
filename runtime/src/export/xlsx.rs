//! Excel workbook with Summary, Pages, Test Results and Issues sheets.

use super::Report;
use crate::model::{IssuePriority, TestStatus};
use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF1F5F9))
}

fn status_format(status: TestStatus) -> Option<Format> {
    match status {
        TestStatus::Ok => Some(
            Format::new()
                .set_background_color(Color::RGB(0xE8F5E8))
                .set_font_color(Color::RGB(0x2E7D32)),
        ),
        TestStatus::NotOk => Some(
            Format::new()
                .set_background_color(Color::RGB(0xFFEBEE))
                .set_font_color(Color::RGB(0xC62828)),
        ),
        TestStatus::Pending => None,
    }
}

fn priority_format(priority: IssuePriority) -> Format {
    let (fill, font) = match priority {
        IssuePriority::High => (0xFFEBEE, 0xC62828),
        IssuePriority::Medium => (0xFFF8E1, 0xEF6C00),
        IssuePriority::Low => (0xE3F2FD, 0x1565C0),
    };
    Format::new()
        .set_background_color(Color::RGB(fill))
        .set_font_color(Color::RGB(font))
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    let bold = header_format();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_status(sheet: &mut Worksheet, row: u32, col: u16, status: TestStatus) -> Result<(), XlsxError> {
    match status_format(status) {
        Some(format) => sheet.write_string_with_format(row, col, status.as_str(), &format)?,
        None => sheet.write_string(row, col, status.as_str())?,
    };
    Ok(())
}

fn summary_sheet(report: &Report) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Summary")?;
    let bold = header_format();
    let site = &report.website;
    let text_rows = [
        ("Website", site.name.clone()),
        ("Base URL", site.base_url.clone()),
        ("Sitemap URL", site.sitemap_url.clone().unwrap_or_default()),
        ("Created At", site.created_at.format(DATE_FORMAT).to_string()),
        ("Generated At", report.generated_at.format(DATE_FORMAT).to_string()),
    ];
    let s = &report.summary;
    let number_rows = [
        ("Total Pages", s.total as f64),
        ("Pages OK", s.ok as f64),
        ("Pages Not OK", s.not_ok as f64),
        ("Open Issues", s.open_issues as f64),
        ("Total Test Results", report.results.len() as f64),
        ("Total Issues", report.issues.len() as f64),
        ("Completion %", (s.percent * 10.0).round() / 10.0),
    ];

    let mut row = 0u32;
    for (label, value) in text_rows {
        sheet.write_string_with_format(row, 0, label, &bold)?;
        sheet.write_string(row, 1, value)?;
        row += 1;
    }
    for (label, value) in number_rows {
        sheet.write_string_with_format(row, 0, label, &bold)?;
        sheet.write_number(row, 1, value)?;
        row += 1;
    }
    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 48)?;
    Ok(sheet)
}

fn pages_sheet(report: &Report) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Pages")?;
    let headers = Report::grid_headers();
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    write_headers(&mut sheet, &header_refs)?;

    for (i, page) in report.pages.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, (page.order + 1) as f64)?;
        sheet.write_string(row, 1, page.title.as_str())?;
        sheet.write_string(row, 2, page.url.as_str())?;
        let mut col = 3u16;
        for (_, status) in page.categories.iter() {
            write_status(&mut sheet, row, col, status)?;
            col += 1;
        }
        write_status(&mut sheet, row, col, page.overall)?;
        sheet.write_number(row, col + 1, page.open_issues as f64)?;
    }
    sheet.set_column_width(1, 28)?;
    sheet.set_column_width(2, 48)?;
    Ok(sheet)
}

fn results_sheet(report: &Report) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Test Results")?;
    write_headers(
        &mut sheet,
        &["Page", "Test Type", "Test", "Status", "Notes", "Updated At"],
    )?;

    for (i, result) in report.results.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, result.page.as_str())?;
        sheet.write_string(row, 1, result.test_type.as_str())?;
        sheet.write_string(row, 2, result.test.as_str())?;
        write_status(&mut sheet, row, 3, result.status)?;
        sheet.write_string(row, 4, result.notes.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 5, result.updated_at.format(DATE_FORMAT).to_string())?;
    }
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(2, 24)?;
    sheet.set_column_width(4, 40)?;
    Ok(sheet)
}

fn issues_sheet(report: &Report) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name("Issues")?;
    write_headers(
        &mut sheet,
        &["Issue ID", "Page", "Title", "Description", "Priority", "Status", "Created At"],
    )?;

    for (i, issue) in report.issues.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, issue.id.as_str())?;
        sheet.write_string(row, 1, issue.page.as_str())?;
        sheet.write_string(row, 2, issue.title.as_str())?;
        sheet.write_string(row, 3, issue.description.as_deref().unwrap_or(""))?;
        sheet.write_string_with_format(
            row,
            4,
            issue.priority.as_str(),
            &priority_format(issue.priority),
        )?;
        sheet.write_string(row, 5, issue.status.as_str())?;
        sheet.write_string(row, 6, issue.created_at.format(DATE_FORMAT).to_string())?;
    }
    sheet.set_column_width(2, 32)?;
    sheet.set_column_width(3, 48)?;
    Ok(sheet)
}

pub fn render(report: &Report) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(summary_sheet(report).context("failed to build Summary sheet")?);
    workbook.push_worksheet(pages_sheet(report).context("failed to build Pages sheet")?);
    workbook.push_worksheet(results_sheet(report).context("failed to build Test Results sheet")?);
    workbook.push_worksheet(issues_sheet(report).context("failed to build Issues sheet")?);
    workbook.save_to_buffer().context("failed to write workbook")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_session;

    #[test]
    fn test_render_workbook() {
        let report = Report::build(&sample_session()).unwrap();
        let bytes = render(&report).unwrap();
        // xlsx files are zip archives.
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn test_status_formats() {
        assert!(status_format(TestStatus::Ok).is_some());
        assert!(status_format(TestStatus::NotOk).is_some());
        assert!(status_format(TestStatus::Pending).is_none());
    }
}
