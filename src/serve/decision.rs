//! Request classification: servable asset vs pass-through.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

/// Extensions the router is allowed to serve, fixed at router
/// construction. Entries carry a leading dot and are compared
/// case-insensitively.
#[derive(Debug, Clone)]
pub struct AllowedExtensions {
    set: FxHashSet<String>,
}

impl AllowedExtensions {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let set = extensions
            .iter()
            .map(|ext| {
                let ext = ext.as_ref().to_ascii_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self { set }
    }

    /// Whether the relative path's extension is in the allowed set.
    pub fn allows(&self, relative: &str) -> bool {
        Path::new(relative)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.set.contains(&format!(".{}", ext.to_ascii_lowercase())))
    }
}

impl Default for AllowedExtensions {
    /// The default allowed set: `.css` and `.js`.
    fn default() -> Self {
        Self::new(&[".css", ".js"])
    }
}

/// A resolved, servable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServableFile {
    pub path: PathBuf,
    /// Response validator, precomputed in snapshot mode. `None` means the
    /// file server derives one from file metadata per request.
    pub etag: Option<String>,
}

/// Outcome of classifying one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// An allowed-extension file resolved under a registered root.
    Serve(ServableFile),
    /// Allowed extension, but no registered root contains the file.
    NotFound,
    /// Not ours: hand the request to the downstream application.
    PassThrough,
}

/// Extract the root-relative asset path from a request URL.
///
/// Decodes percent-escapes, drops the query string, and strips the mount
/// prefix. Returns `None` (pass-through) when the prefix does not match,
/// the remainder is empty, or the path climbs out of the roots via `..`.
pub fn request_rel_path(url: &str, mount: &str) -> Option<String> {
    let decoded = normalize_url(url);
    let rel = decoded.strip_prefix(mount)?.trim_start_matches('/');

    if rel.is_empty() || rel.split('/').any(|part| part == "..") {
        return None;
    }
    Some(rel.to_string())
}

/// Normalize URL: decode and strip query string.
fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;
    let decoded = percent_decode_str(url)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded
        .split('?')
        .next()
        .unwrap_or(&decoded)
        .to_string()
}
