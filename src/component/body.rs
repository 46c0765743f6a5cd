//! Compiled component bodies.
//!
//! The body of a component is compiled once into a flat segment list:
//! literal HTML, child-component references (`<Card/>` - capitalized,
//! self-closing), and the template-exposed asset values (`{{ assets }}`,
//! `{{ collected_css }}`, `{{ collected_js }}`).
//!
//! Full template parsing (attributes, expressions, control flow) belongs
//! to the host template engine; this representation is the minimal seam
//! the render tree needs.

use std::sync::LazyLock;

use regex::Regex;

/// Child tags and asset placeholders, matched in one pass.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<(?P<tag>[A-Z][A-Za-z0-9_]*)\s*/>|\{\{\s*(?P<var>assets|collected_css|collected_js)\s*\}\}",
    )
    .expect("valid token pattern")
});

/// One compiled body segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal HTML, emitted as-is.
    Text(String),
    /// Reference to another component by name; rendered recursively.
    Child(String),
    /// `{{ assets }}`: the collector's `<link>`/`<script>` markup helper.
    AssetMarkup,
    /// `{{ collected_css }}`: collected CSS paths, space-joined.
    CssList,
    /// `{{ collected_js }}`: collected JS paths, space-joined.
    JsList,
}

/// A compiled component body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    segments: Vec<Segment>,
}

impl Body {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Compile marker-stripped source into body segments.
pub fn compile(source: &str) -> Body {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in TOKEN.captures_iter(source) {
        let m = caps.get(0).expect("whole match");
        if m.start() > last {
            segments.push(Segment::Text(source[last..m.start()].to_string()));
        }

        if let Some(tag) = caps.name("tag") {
            segments.push(Segment::Child(tag.as_str().to_string()));
        } else {
            let segment = match caps.name("var").expect("var capture").as_str() {
                "assets" => Segment::AssetMarkup,
                "collected_css" => Segment::CssList,
                _ => Segment::JsList,
            };
            segments.push(segment);
        }
        last = m.end();
    }

    if last < source.len() {
        segments.push(Segment::Text(source[last..].to_string()));
    }

    Body { segments }
}
