//! Asset declaration markers.
//!
//! A component's source may open with marker comments listing the static
//! files it needs:
//!
//! ```text
//! {#css card.css shared/forms.css #}
//! {#js card.js #}
//! ```
//!
//! Each marker lists zero or more whitespace-separated relative paths.
//! Both markers are optional and independent; repeated markers accumulate
//! in source order. Parsing happens once, at component compile time.

use std::path::Path;

use crate::error::TemplateError;

/// Immutable pair of ordered CSS/JS path lists attached to a compiled
/// component definition.
///
/// Paths are stored exactly as authored (relative to a component root,
/// unvalidated). Uniqueness is not required here; the per-render collector
/// de-duplicates on report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetDeclaration {
    css: Vec<String>,
    js: Vec<String>,
}

impl AssetDeclaration {
    pub fn new(css: Vec<String>, js: Vec<String>) -> Self {
        Self { css, js }
    }

    /// Declared stylesheet paths, in authored order.
    pub fn css(&self) -> &[String] {
        &self.css
    }

    /// Declared script paths, in authored order.
    pub fn js(&self) -> &[String] {
        &self.js
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }
}

/// Extract asset markers from component source.
///
/// Returns the declaration and the source with all markers removed.
/// An opened marker without a closing `#}` aborts compilation with
/// [`TemplateError::UnterminatedMarker`] carrying the source line.
pub fn parse(file: &Path, source: &str) -> Result<(AssetDeclaration, String), TemplateError> {
    let mut css = Vec::new();
    let mut js = Vec::new();
    let mut body = String::with_capacity(source.len());

    let mut offset = 0;
    while let Some(open) = source[offset..].find("{#") {
        let open = offset + open;
        let after = &source[open + 2..];

        let Some(marker) = marker_keyword(after) else {
            // Not an asset marker; keep the text and continue scanning
            // after the brace so nested occurrences are still found.
            body.push_str(&source[offset..open + 2]);
            offset = open + 2;
            continue;
        };

        body.push_str(&source[offset..open]);

        let Some(close) = after.find("#}") else {
            return Err(TemplateError::UnterminatedMarker {
                file: file.display().to_string(),
                line: line_of(source, open),
                marker,
            });
        };

        // Paths are everything between the keyword and the closing brace.
        let inner = after[..close]
            .trim_start()
            .strip_prefix(marker)
            .unwrap_or("");
        let paths = inner.split_whitespace().map(str::to_string);
        match marker {
            "css" => css.extend(paths),
            _ => js.extend(paths),
        }

        offset = open + 2 + close + 2;
    }
    body.push_str(&source[offset..]);

    Ok((AssetDeclaration::new(css, js), body))
}

/// Recognize the marker keyword right after `{#`.
///
/// Only `css` and `js` followed by whitespace or the closing brace count;
/// any other `{#...` sequence is left in the body untouched.
fn marker_keyword(after: &str) -> Option<&'static str> {
    let trimmed = after.trim_start();
    for keyword in ["css", "js"] {
        if let Some(rest) = trimmed.strip_prefix(keyword) {
            if rest.is_empty()
                || rest.starts_with(char::is_whitespace)
                || rest.starts_with("#}")
            {
                return Some(keyword);
            }
        }
    }
    None
}

/// 1-based line number of a byte offset.
fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> (AssetDeclaration, String) {
        parse(Path::new("Test.html"), source).unwrap()
    }

    #[test]
    fn test_both_markers() {
        let (decl, body) = parse_ok("{#css a.css b.css #}\n{#js a.js #}\n<div/>");
        assert_eq!(decl.css(), ["a.css", "b.css"]);
        assert_eq!(decl.js(), ["a.js"]);
        assert_eq!(body.trim(), "<div/>");
    }

    #[test]
    fn test_markers_optional_and_independent() {
        let (decl, _) = parse_ok("{#js only.js #}<p/>");
        assert!(decl.css().is_empty());
        assert_eq!(decl.js(), ["only.js"]);

        let (decl, body) = parse_ok("<p>no markers</p>");
        assert!(decl.is_empty());
        assert_eq!(body, "<p>no markers</p>");
    }

    #[test]
    fn test_empty_marker() {
        let (decl, _) = parse_ok("{#css #}<p/>");
        assert!(decl.css().is_empty());
    }

    #[test]
    fn test_repeated_markers_accumulate_in_order() {
        let (decl, _) = parse_ok("{#css a.css #}\n{#css b.css #}");
        assert_eq!(decl.css(), ["a.css", "b.css"]);
    }

    #[test]
    fn test_paths_stored_verbatim() {
        // No existence check and no normalization at parse time.
        let (decl, _) = parse_ok("{#css ./nested/missing.css #}");
        assert_eq!(decl.css(), ["./nested/missing.css"]);
    }

    #[test]
    fn test_unterminated_marker_fails_with_line() {
        let err = parse(Path::new("Broken.html"), "<div/>\n{#css oops.css").unwrap_err();
        match err {
            TemplateError::UnterminatedMarker { file, line, marker } => {
                assert_eq!(file, "Broken.html");
                assert_eq!(line, 2);
                assert_eq!(marker, "css");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_asset_comment_left_in_body() {
        let (decl, body) = parse_ok("{# plain comment #}<p/>");
        assert!(decl.is_empty());
        assert_eq!(body, "{# plain comment #}<p/>");
    }

    #[test]
    fn test_keyword_prefix_is_not_a_marker() {
        // `cssx` must not be mistaken for the `css` marker.
        let (decl, body) = parse_ok("{#cssx a.css #}<p/>");
        assert!(decl.is_empty());
        assert_eq!(body, "{#cssx a.css #}<p/>");
    }
}
