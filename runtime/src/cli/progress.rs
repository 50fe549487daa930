//! Spinner shown while a sitemap is being fetched.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("\u{25b8}\u{25b9}\u{25b8}\u{25b9}\u{25b8}")
}

/// Start a spinner, or a hidden bar when output is quiet or JSON.
pub fn create_spinner(message: &str, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(spinner_style());
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Replace the spinner with a final status line.
pub fn finish(bar: &ProgressBar, symbol: &str, message: &str) {
    bar.set_style(
        ProgressStyle::with_template("  {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.finish_with_message(format!("{symbol} {message}"));
}
