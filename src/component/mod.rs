//! Compiled component definitions.
//!
//! # Module Structure
//!
//! ```text
//! component/
//! ├── declare    # `{#css ...#}` / `{#js ...#}` marker parsing
//! ├── body       # compiled body segments (text, children, placeholders)
//! └── store      # process-wide cache of compiled definitions
//! ```

mod body;
mod declare;
mod store;

pub use body::{Body, Segment};
pub use declare::AssetDeclaration;
pub use store::ComponentStore;

use std::path::{Path, PathBuf};

use crate::error::TemplateError;

/// A compiled component definition.
///
/// Created once, when the component's source file is first needed, and
/// cached process-wide for the lifetime of the [`ComponentStore`]. The
/// asset declaration is extracted from the source header at compile time
/// and never mutated afterwards.
#[derive(Debug)]
pub struct ComponentDef {
    name: String,
    source_path: PathBuf,
    declaration: AssetDeclaration,
    body: Body,
}

impl ComponentDef {
    /// Compile a component from its source text.
    ///
    /// Extracts the asset declaration markers, then compiles the remaining
    /// source into body segments. Declared paths are stored verbatim; a
    /// path pointing at a missing file is not an error here - it surfaces
    /// later as a 404 when the browser requests it.
    pub fn compile(
        name: impl Into<String>,
        source_path: &Path,
        source: &str,
    ) -> Result<Self, TemplateError> {
        let (declaration, stripped) = declare::parse(source_path, source)?;
        Ok(Self {
            name: name.into(),
            source_path: source_path.to_path_buf(),
            declaration,
            body: body::compile(&stripped),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn declaration(&self) -> &AssetDeclaration {
        &self.declaration
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}
