//! Per-render asset collection.
//!
//! One [`AssetCollector`] exists per top-level render call. Every component
//! instance rendered during that call reports its declared assets here;
//! each distinct path is kept exactly once, in first-report order.

use rustc_hash::FxHashSet;

use crate::component::AssetDeclaration;
use crate::utils::html::escape_attr;

// ============================================================================
// OrderedPaths
// ============================================================================

/// Insertion-ordered sequence with duplicate suppression.
#[derive(Debug, Default)]
struct OrderedPaths {
    items: Vec<String>,
    seen: FxHashSet<String>,
}

impl OrderedPaths {
    /// Insert a path unless an equal path was inserted before.
    fn insert(&mut self, path: String) {
        if self.seen.insert(path.clone()) {
            self.items.push(path);
        }
    }

    fn as_slice(&self) -> &[String] {
        &self.items
    }
}

// ============================================================================
// AssetCollector
// ============================================================================

/// Render-scoped accumulator of declared CSS and JS paths.
///
/// Owned exclusively by one top-level render call; never shared or pooled
/// across calls. Collection is monotonic: reading mid-render is valid and
/// reflects partial progress.
#[derive(Debug, Default)]
pub struct AssetCollector {
    css: OrderedPaths,
    js: OrderedPaths,
}

impl AssetCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a component's declared assets.
    ///
    /// Appends each path not already present, in declaration order.
    /// Idempotent per path: the second report of `card.css` is a no-op,
    /// which absorbs sibling instances sharing a stylesheet.
    pub fn report(&mut self, declaration: &AssetDeclaration) {
        for path in declaration.css() {
            self.css.insert(normalize(path));
        }
        for path in declaration.js() {
            self.js.insert(normalize(path));
        }
    }

    /// Collected CSS paths, in first-report order.
    pub fn css_paths(&self) -> &[String] {
        self.css.as_slice()
    }

    /// Collected JS paths, in first-report order.
    pub fn js_paths(&self) -> &[String] {
        self.js.as_slice()
    }

    /// Serialize the collected paths as `<link>` and `<script>` markup.
    ///
    /// All stylesheet links come first, then all script tags, each group in
    /// collected order. Every href/src is the mount prefix joined with the
    /// declared path.
    ///
    /// The output reflects only what has been reported *so far*: a call
    /// placed before asset-declaring children render will miss their
    /// entries. Place it after all asset-declaring content, or inject the
    /// markup from the collector returned by the finished render.
    pub fn render_markup(&self, mount_prefix: &str) -> String {
        let mut out = String::new();
        for path in self.css_paths() {
            let href = join_url(mount_prefix, path);
            out.push_str(&format!(
                "<link rel=\"stylesheet\" href=\"{}\">\n",
                escape_attr(&href)
            ));
        }
        for path in self.js_paths() {
            let src = join_url(mount_prefix, path);
            out.push_str(&format!(
                "<script src=\"{}\" defer></script>\n",
                escape_attr(&src)
            ));
        }
        out
    }
}

/// Normalize a declared path for use as a dedup key and URL suffix.
///
/// Strips leading `./` and `/` so that `./card.css`, `/card.css` and
/// `card.css` collapse to one entry.
fn normalize(path: &str) -> String {
    let mut p = path.trim();
    loop {
        if let Some(rest) = p.strip_prefix("./") {
            p = rest;
        } else if let Some(rest) = p.strip_prefix('/') {
            p = rest;
        } else {
            break;
        }
    }
    p.to_string()
}

/// Join the static mount prefix with a relative asset path.
fn join_url(mount_prefix: &str, path: &str) -> String {
    if mount_prefix.ends_with('/') {
        format!("{mount_prefix}{path}")
    } else {
        format!("{mount_prefix}/{path}")
    }
}
