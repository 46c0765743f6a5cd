//! Telar - per-component asset collection for component-based HTML rendering.
//!
//! A page is composed of nested, reusable components. Each component may
//! declare the stylesheets and scripts it needs in a header marker:
//!
//! ```text
//! {#css card.css #}
//! {#js card.js #}
//! <div class="card"><Button/></div>
//! ```
//!
//! While a page renders, every component instance reports its declarations
//! into a render-scoped [`AssetCollector`]. The result is two ordered,
//! de-duplicated path lists, exposed to templates as `{{ collected_css }}`,
//! `{{ collected_js }}` and the `{{ assets }}` markup helper, and returned
//! to the caller alongside the HTML.
//!
//! A companion middleware, [`AssetRouter`], serves the declared files from
//! the registered component folders under a configurable mount prefix,
//! passing every other request through to the downstream application.

pub mod collect;
pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod logger;
pub mod serve;
pub mod utils;

pub use collect::AssetCollector;
pub use component::{AssetDeclaration, ComponentDef};
pub use config::Config;
pub use engine::{Engine, RenderOutput, Root};
pub use error::{ConfigError, TemplateError};
pub use serve::{AllowedExtensions, AssetRouter, Decision, Handler, ServableFile};
