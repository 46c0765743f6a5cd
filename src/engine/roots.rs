//! Registered component-root folders.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;

/// One registered component folder.
#[derive(Debug, Clone)]
pub struct Root {
    pub name: String,
    pub path: PathBuf,
}

/// Ordered, append-only sequence of component roots.
///
/// Registration order is resolution order: the first root containing a
/// requested file (or component source) wins. Re-adding a path is allowed
/// but order-sensitive. Shared by component lookup and the asset router.
#[derive(Debug, Default)]
pub struct RootRegistry {
    entries: RwLock<Vec<Root>>,
}

impl RootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a folder; the entry name is the folder's file name.
    pub fn add(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.add_named(name, path);
    }

    /// Register a folder under an explicit name.
    pub fn add_named(&self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.write().push(Root {
            name: name.into(),
            path: path.into(),
        });
    }

    /// Snapshot of the registered roots, in registration order.
    pub fn entries(&self) -> Vec<Root> {
        self.entries.read().clone()
    }

    /// Resolve a relative path against the roots, first existing file wins.
    pub fn resolve(&self, relative: &Path) -> Option<PathBuf> {
        for root in self.entries.read().iter() {
            let candidate = root.path.join(relative);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}
