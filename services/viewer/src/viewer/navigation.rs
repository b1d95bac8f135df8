//! services/viewer/src/viewer/navigation.rs
//!
//! Pure helpers for link validation, page clamping and zoom arithmetic.

use crate::error::ViewerError;
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;
pub const SCALE_STEP: f64 = 0.1;
pub const DEFAULT_SCALE: f64 = 1.2;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?P<host>[^\s/?#]+)(?P<path>/[^\s?#]*)?(?P<query>\?[^\s#]*)?(?P<fragment>#\S*)?$",
    )
    .expect("URL pattern is a valid regex")
});

/// Checks that `input` is an absolute URL whose path ends in `.pdf`.
///
/// A query string (and fragment) after the path is allowed. Returns the
/// trimmed URL on success.
pub fn validate_pdf_url(input: &str) -> Result<String, ViewerError> {
    let trimmed = input.trim();
    let captures = URL_PATTERN
        .captures(trimmed)
        .ok_or_else(|| ViewerError::InvalidUrl(trimmed.to_string()))?;

    let path = captures.name("path").map(|m| m.as_str()).unwrap_or("");
    if !path.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ViewerError::NotPdfLink(trimmed.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Clamps `page` to `[1, num_pages]`, or only to `>= 1` while the page count is unknown.
pub fn clamp_page(page: u32, num_pages: Option<u32>) -> u32 {
    match num_pages {
        Some(total) => page.clamp(1, total.max(1)),
        None => page.max(1),
    }
}

/// Rounds to two decimals so repeated steps do not accumulate drift.
pub fn round_scale(scale: f64) -> f64 {
    (scale * 100.0).round() / 100.0
}

pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return DEFAULT_SCALE;
    }
    round_scale(scale).clamp(MIN_SCALE, MAX_SCALE)
}

pub fn zoom_in(scale: f64) -> f64 {
    clamp_scale(scale + SCALE_STEP)
}

pub fn zoom_out(scale: f64) -> f64 {
    clamp_scale(scale - SCALE_STEP)
}

/// Percentage of the document reached, once the page count is known.
pub fn progress_percent(page: u32, num_pages: Option<u32>) -> Option<u8> {
    let total = num_pages.filter(|n| *n > 0)?;
    let page = page.min(total);
    Some(((page as f64 / total as f64) * 100.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_links_with_or_without_query() {
        assert_eq!(
            validate_pdf_url("https://example.com/book.pdf").unwrap(),
            "https://example.com/book.pdf"
        );
        assert!(validate_pdf_url("  https://example.com/docs/Book.PDF?download=1 ").is_ok());
        assert!(validate_pdf_url("http://localhost:8080/a.pdf#page=3").is_ok());
    }

    #[test]
    fn rejects_non_pdf_links() {
        assert!(matches!(
            validate_pdf_url("https://example.com/book"),
            Err(ViewerError::NotPdfLink(_))
        ));
        assert!(matches!(
            validate_pdf_url("https://example.com/view?file=book.pdf"),
            Err(ViewerError::NotPdfLink(_))
        ));
        assert!(matches!(
            validate_pdf_url("https://example.com"),
            Err(ViewerError::NotPdfLink(_))
        ));
    }

    #[test]
    fn rejects_strings_that_are_not_urls() {
        assert!(matches!(validate_pdf_url("not a url"), Err(ViewerError::InvalidUrl(_))));
        assert!(matches!(validate_pdf_url("book.pdf"), Err(ViewerError::InvalidUrl(_))));
        assert!(matches!(validate_pdf_url(""), Err(ViewerError::InvalidUrl(_))));
    }

    #[test]
    fn pages_clamp_to_known_bounds() {
        assert_eq!(clamp_page(0, None), 1);
        assert_eq!(clamp_page(40, None), 40);
        assert_eq!(clamp_page(40, Some(12)), 12);
        assert_eq!(clamp_page(0, Some(12)), 1);
        assert_eq!(clamp_page(3, Some(0)), 1);
    }

    #[test]
    fn ten_increments_from_default_land_exactly_on_two_point_two() {
        let mut scale = DEFAULT_SCALE;
        for _ in 0..10 {
            scale = zoom_in(scale);
        }
        assert_eq!(scale, 2.2);
    }

    #[test]
    fn zoom_clamps_at_both_ends() {
        let mut scale = 2.9;
        for _ in 0..5 {
            scale = zoom_in(scale);
        }
        assert_eq!(scale, MAX_SCALE);

        let mut scale = 0.7;
        for _ in 0..5 {
            scale = zoom_out(scale);
        }
        assert_eq!(scale, MIN_SCALE);
        assert_eq!(clamp_scale(f64::NAN), DEFAULT_SCALE);
        assert_eq!(clamp_scale(1.234), 1.23);
    }

    #[test]
    fn progress_needs_a_page_count() {
        assert_eq!(progress_percent(3, None), None);
        assert_eq!(progress_percent(1, Some(3)), Some(33));
        assert_eq!(progress_percent(3, Some(3)), Some(100));
        assert_eq!(progress_percent(1, Some(0)), None);
    }
}
