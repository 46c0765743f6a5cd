//! A single top-level render pass.

use crate::collect::AssetCollector;
use crate::component::Segment;
use crate::error::TemplateError;

use super::Engine;

/// Render-call-scoped state: the collector plus the ancestor stack used
/// for cycle detection. Created fresh by [`Engine::render`] and dropped
/// (or handed back) when the top-level call returns - never shared
/// between concurrent renders.
pub(super) struct RenderPass<'e> {
    engine: &'e Engine,
    collector: AssetCollector,
    stack: Vec<String>,
}

impl<'e> RenderPass<'e> {
    pub(super) fn new(engine: &'e Engine) -> Self {
        Self {
            engine,
            collector: AssetCollector::new(),
            stack: Vec::new(),
        }
    }

    pub(super) fn into_collector(self) -> AssetCollector {
        self.collector
    }

    /// Render one component instance, depth-first.
    ///
    /// The instance reports its declaration before its body executes, so
    /// with declarations authored at the top of each component the natural
    /// order is pre-order: root first, then children in appearance order.
    pub(super) fn render_component(&mut self, name: &str) -> Result<String, TemplateError> {
        if self.stack.iter().any(|ancestor| ancestor == name) {
            let mut chain = self.stack.join(" -> ");
            chain.push_str(" -> ");
            chain.push_str(name);
            return Err(TemplateError::Cycle(chain));
        }

        let def = self.engine.component(name)?;
        self.stack.push(name.to_string());
        self.collector.report(def.declaration());

        let mut out = String::new();
        for segment in def.body().segments() {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Child(child) => out.push_str(&self.render_component(child)?),
                Segment::AssetMarkup => {
                    out.push_str(&self.collector.render_markup(self.engine.mount()));
                }
                Segment::CssList => out.push_str(&self.collector.css_paths().join(" ")),
                Segment::JsList => out.push_str(&self.collector.js_paths().join(" ")),
            }
        }

        self.stack.pop();
        Ok(out)
    }
}
