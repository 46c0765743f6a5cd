//! Render orchestration.
//!
//! The [`Engine`] owns the compiled-component cache, the component-root
//! registry, and the configuration. Each call to [`Engine::render`] binds
//! one fresh [`AssetCollector`] to the whole nested render tree and
//! returns it, populated, together with the HTML.

mod pass;
mod roots;

pub use roots::{Root, RootRegistry};

use std::path::PathBuf;
use std::sync::Arc;

use crate::collect::AssetCollector;
use crate::component::{ComponentDef, ComponentStore};
use crate::config::Config;
use crate::debug;
use crate::error::TemplateError;

use pass::RenderPass;

/// Result of one top-level render call.
#[derive(Debug)]
pub struct RenderOutput {
    /// The rendered HTML.
    pub html: String,
    /// The populated collector for this render pass.
    ///
    /// Useful when an outer shell is rendered separately from its content:
    /// render the content first, then inject
    /// [`AssetCollector::render_markup`] into the shell.
    pub assets: AssetCollector,
}

/// Component render engine.
pub struct Engine {
    config: Config,
    roots: RootRegistry,
    store: ComponentStore,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            roots: RootRegistry::new(),
            store: ComponentStore::new(),
        }
    }

    /// Engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Register a component-root folder.
    ///
    /// Both component sources and their declared assets resolve against
    /// the registered roots in registration order.
    pub fn add_folder(&self, path: impl Into<PathBuf>) {
        self.roots.add(path);
    }

    /// Register a component-root folder under an explicit name.
    pub fn add_folder_named(&self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.roots.add_named(name, path);
    }

    pub fn roots(&self) -> &RootRegistry {
        &self.roots
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The static mount prefix asset URLs are rooted at.
    pub fn mount(&self) -> &str {
        &self.config.assets.mount
    }

    /// Render a component tree from its root component.
    ///
    /// Creates one collector for this call, threads it through every
    /// nested component render, and returns it fully populated once the
    /// whole tree has executed. Concurrent renders are isolated: they
    /// share only the immutable compiled-definition cache.
    pub fn render(&self, name: &str) -> Result<RenderOutput, TemplateError> {
        let mut pass = RenderPass::new(self);
        let html = pass.render_component(name)?;
        Ok(RenderOutput {
            html,
            assets: pass.into_collector(),
        })
    }

    /// Look up a compiled component, compiling and caching it on first use.
    pub(crate) fn component(&self, name: &str) -> Result<Arc<ComponentDef>, TemplateError> {
        if !is_component_name(name) {
            return Err(TemplateError::UnknownComponent(name.to_string()));
        }
        if let Some(def) = self.store.get(name) {
            return Ok(def);
        }

        let file_name = format!("{name}{}", self.config.assets.component_ext);
        let source_path = self
            .roots
            .resolve(std::path::Path::new(&file_name))
            .ok_or_else(|| TemplateError::UnknownComponent(name.to_string()))?;

        let source = std::fs::read_to_string(&source_path)
            .map_err(|e| TemplateError::Io(source_path.clone(), e))?;
        let def = ComponentDef::compile(name, &source_path, &source)?;
        debug!("render"; "compiled {} from {}", name, source_path.display());
        Ok(self.store.insert(def))
    }
}

/// Component names start with an uppercase ASCII letter, followed by
/// alphanumerics or underscores. Rejecting anything else also keeps
/// request-derived names from reaching the filesystem as path fragments.
fn is_component_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    fn write_component(dir: &Path, name: &str, source: &str) {
        fs::write(dir.join(format!("{name}.html")), source).unwrap();
    }

    fn page_fixture() -> (TempDir, Engine) {
        let dir = TempDir::new().unwrap();
        write_component(
            dir.path(),
            "Page",
            "{#css mypage.css #}\n{#js mypage.js #}\n<main><Card/><Button/></main>",
        );
        write_component(
            dir.path(),
            "Card",
            "{#css card.css #}\n<div class=\"card\"></div>",
        );
        write_component(
            dir.path(),
            "Button",
            "{#css button.css #}\n<button>ok</button>",
        );

        let engine = Engine::with_defaults();
        engine.add_folder(dir.path());
        (dir, engine)
    }

    #[test]
    fn test_collects_across_render_tree_in_first_report_order() {
        let (_dir, engine) = page_fixture();
        let output = engine.render("Page").unwrap();

        assert_eq!(
            output.assets.css_paths(),
            ["mypage.css", "card.css", "button.css"]
        );
        assert_eq!(output.assets.js_paths(), ["mypage.js"]);
        assert!(output.html.contains("<div class=\"card\"></div>"));
        assert!(output.html.contains("<button>ok</button>"));
    }

    #[test]
    fn test_repeated_component_type_reports_once() {
        let dir = TempDir::new().unwrap();
        write_component(dir.path(), "Page", "<Card/><Card/>");
        write_component(dir.path(), "Card", "{#css card.css #}\n<div/>");

        let engine = Engine::with_defaults();
        engine.add_folder(dir.path());
        let output = engine.render("Page").unwrap();

        assert_eq!(output.assets.css_paths(), ["card.css"]);
        assert_eq!(output.html.matches("<div/>").count(), 2);
    }

    #[test]
    fn test_assets_placeholder_reflects_reports_so_far() {
        let dir = TempDir::new().unwrap();
        // The placeholder sits before the child renders: the child's
        // stylesheet is collected but absent from the emitted markup.
        write_component(dir.path(), "Page", "{#css page.css #}\n{{ assets }}<Card/>");
        write_component(dir.path(), "Card", "{#css card.css #}\n<div/>");

        let engine = Engine::with_defaults();
        engine.add_folder(dir.path());
        let output = engine.render("Page").unwrap();

        assert!(output.html.contains("page.css"));
        assert!(!output.html.contains("href=\"/static/components/card.css\""));
        // The returned collector still has the full list.
        assert_eq!(output.assets.css_paths(), ["page.css", "card.css"]);
    }

    #[test]
    fn test_assets_placeholder_after_children_is_complete() {
        let dir = TempDir::new().unwrap();
        write_component(dir.path(), "Page", "{#css page.css #}\n<Card/>{{ assets }}");
        write_component(dir.path(), "Card", "{#css card.css #}\n<div/>");

        let engine = Engine::with_defaults();
        engine.add_folder(dir.path());
        let output = engine.render("Page").unwrap();

        assert!(output.html.contains("/static/components/page.css"));
        assert!(output.html.contains("/static/components/card.css"));
    }

    #[test]
    fn test_collected_lists_placeholders() {
        let dir = TempDir::new().unwrap();
        write_component(
            dir.path(),
            "Page",
            "{#css a.css #}{#js a.js #}<Card/>[{{ collected_css }}][{{ collected_js }}]",
        );
        write_component(dir.path(), "Card", "{#css b.css #}x");

        let engine = Engine::with_defaults();
        engine.add_folder(dir.path());
        let output = engine.render("Page").unwrap();

        assert!(output.html.contains("[a.css b.css]"));
        assert!(output.html.contains("[a.js]"));
    }

    #[test]
    fn test_concurrent_renders_are_isolated() {
        let dir = TempDir::new().unwrap();
        write_component(dir.path(), "Alpha", "{#css alpha.css #}<p/>");
        write_component(dir.path(), "Beta", "{#css beta.css #}<p/>");

        let engine = Engine::with_defaults();
        engine.add_folder(dir.path());

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let engine = &engine;
                    scope.spawn(move || {
                        let name = if i % 2 == 0 { "Alpha" } else { "Beta" };
                        (name, engine.render(name).unwrap())
                    })
                })
                .collect();

            for handle in handles {
                let (name, output) = handle.join().unwrap();
                let expected = if name == "Alpha" {
                    ["alpha.css"]
                } else {
                    ["beta.css"]
                };
                assert_eq!(output.assets.css_paths(), expected);
            }
        });
    }

    #[test]
    fn test_unknown_component() {
        let engine = Engine::with_defaults();
        assert!(matches!(
            engine.render("Nope"),
            Err(TemplateError::UnknownComponent(_))
        ));
    }

    #[test]
    fn test_component_cycle_detected() {
        let dir = TempDir::new().unwrap();
        write_component(dir.path(), "Loop", "<Loop/>");

        let engine = Engine::with_defaults();
        engine.add_folder(dir.path());
        assert!(matches!(
            engine.render("Loop"),
            Err(TemplateError::Cycle(_))
        ));
    }

    #[test]
    fn test_component_source_first_root_precedence() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_component(first.path(), "Card", "first");
        write_component(second.path(), "Card", "second");

        let engine = Engine::with_defaults();
        engine.add_folder(first.path());
        engine.add_folder(second.path());

        assert_eq!(engine.render("Card").unwrap().html, "first");
    }

    #[test]
    fn test_invalid_names_rejected() {
        let engine = Engine::with_defaults();
        for name in ["lowercase", "../Escape", "With/Slash", ""] {
            assert!(matches!(
                engine.render(name),
                Err(TemplateError::UnknownComponent(_))
            ));
        }
    }
}
