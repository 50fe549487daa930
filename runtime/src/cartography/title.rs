//! Derive a human-readable page title from a URL path.

use url::Url;

/// Title of the site root.
pub const HOME_TITLE: &str = "Home";

/// Title for a parsed URL.
pub fn title_for_url(url: &Url) -> String {
    title_from_path(url.path())
}

/// Title for a URL path.
///
/// `/` becomes `Home`. Otherwise every non-empty segment is split on `-`
/// and `_`, each word gets an upper-case first letter, the final segment
/// loses its file extension, and segments are joined with ` - `.
pub fn title_from_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return HOME_TITLE.to_string();
    }

    let last = segments.len() - 1;
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let segment = if i == last {
                strip_extension(segment)
            } else {
                segment
            };
            humanize_segment(segment)
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" - ")
}

fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => segment,
    }
}

fn humanize_segment(segment: &str) -> String {
    segment
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
