//! Snapshot of servable files, computed once at router installation.
//!
//! Production mode: walking the roots and hashing file contents happens
//! exactly once, so request handling never re-checks the filesystem
//! layout. Files or roots added afterwards are not observed; install the
//! router only after all roots are final, or use autorefresh mode.

use std::path::Path;

use jwalk::WalkDir;
use rustc_hash::FxHashMap;

use crate::engine::Root;

use super::decision::AllowedExtensions;

/// One snapshot entry: resolved path plus content-hash validator.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub path: std::path::PathBuf,
    pub etag: String,
}

/// Walk the registered roots and build the response map.
///
/// Keys are slash-separated root-relative paths. Roots are walked in
/// registration order and an existing key is never overwritten, so the
/// first-registered root wins for same-named files.
pub fn scan_roots(
    roots: &[Root],
    allowed: &AllowedExtensions,
) -> FxHashMap<String, SnapshotEntry> {
    let mut map = FxHashMap::default();

    for root in roots {
        let files = WalkDir::new(&root.path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.path());

        for path in files {
            let Ok(rel) = path.strip_prefix(&root.path) else {
                continue;
            };
            let key = rel_key(rel);
            if !allowed.allows(&key) || map.contains_key(&key) {
                continue;
            }
            let Some(etag) = content_etag(&path) else {
                continue;
            };
            map.insert(key, SnapshotEntry { path, etag });
        }
    }

    map
}

/// Slash-separated map key for a root-relative path.
fn rel_key(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Content-hash validator: first 16 hex chars of the blake3 digest.
pub fn content_etag(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    let hash = blake3::hash(&bytes);
    Some(hex::encode(hash.as_bytes())[..16].to_string())
}
