//! Process-wide cache of compiled component definitions.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::ComponentDef;

/// Compiled-definition cache keyed by component name.
///
/// Compilation is a fixed one-time cost; concurrent renders share the
/// cached definitions read-only. A racing double-compile of the same
/// component is harmless: last insert wins, both results are equivalent.
#[derive(Debug, Default)]
pub struct ComponentStore {
    cache: RwLock<FxHashMap<String, Arc<ComponentDef>>>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<ComponentDef>> {
        self.cache.read().get(name).cloned()
    }

    pub fn insert(&self, def: ComponentDef) -> Arc<ComponentDef> {
        let def = Arc::new(def);
        self.cache
            .write()
            .insert(def.name().to_string(), Arc::clone(&def));
        def
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}
