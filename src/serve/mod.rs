//! Asset serving middleware.
//!
//! [`AssetRouter`] sits in front of the downstream application and
//! intercepts requests under the configured mount prefix whose extension
//! is in the allowed set. Matched requests are resolved against the
//! registered component roots (first-registered root wins) and answered
//! by the file-serving collaborator; everything else passes through
//! unmodified.

mod decision;
mod file;
mod snapshot;

pub use decision::{AllowedExtensions, Decision, ServableFile};
pub use file::{DiskServer, FileServer, respond_error, respond_html, respond_not_found};

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rustc_hash::FxHashMap;
use tiny_http::{Request, Server};

use crate::engine::Engine;
use crate::{debug, log};

use snapshot::SnapshotEntry;

// ============================================================================
// Handler
// ============================================================================

/// A request handler in the middleware chain.
pub trait Handler: Send + Sync {
    fn handle(&self, request: Request) -> Result<()>;
}

impl<F> Handler for F
where
    F: Fn(Request) -> Result<()> + Send + Sync,
{
    fn handle(&self, request: Request) -> Result<()> {
        self(request)
    }
}

// ============================================================================
// AssetRouter
// ============================================================================

/// Middleware serving declared component assets.
///
/// The allowed-extension set is fixed at construction. In snapshot mode
/// (`autorefresh = false`) the servable-file map is also fixed at
/// construction - install the router only after all roots are registered.
/// In autorefresh mode every request re-resolves against the live
/// registry, so files and roots added later are visible immediately.
pub struct AssetRouter {
    engine: Arc<Engine>,
    downstream: Box<dyn Handler>,
    allowed: AllowedExtensions,
    snapshot: Option<FxHashMap<String, SnapshotEntry>>,
    files: DiskServer,
}

impl AssetRouter {
    /// Build the middleware with the engine's configured extensions
    /// (default `.css` and `.js`).
    pub fn new(engine: Arc<Engine>, downstream: Box<dyn Handler>, autorefresh: bool) -> Self {
        let allowed = AllowedExtensions::new(&engine.config().assets.extensions);
        Self::with_allowed(engine, downstream, autorefresh, allowed)
    }

    /// Build the middleware with an explicit allowed-extension list.
    pub fn with_extensions<S: AsRef<str>>(
        engine: Arc<Engine>,
        downstream: Box<dyn Handler>,
        autorefresh: bool,
        extensions: &[S],
    ) -> Self {
        Self::with_allowed(
            engine,
            downstream,
            autorefresh,
            AllowedExtensions::new(extensions),
        )
    }

    fn with_allowed(
        engine: Arc<Engine>,
        downstream: Box<dyn Handler>,
        autorefresh: bool,
        allowed: AllowedExtensions,
    ) -> Self {
        let snapshot = (!autorefresh)
            .then(|| snapshot::scan_roots(&engine.roots().entries(), &allowed));
        if let Some(map) = &snapshot {
            debug!("serve"; "asset snapshot: {} files", map.len());
        }

        Self {
            engine,
            downstream,
            allowed,
            snapshot,
            files: DiskServer::new(autorefresh),
        }
    }

    /// Classify a request URL.
    fn decide(&self, url: &str) -> Decision {
        let Some(rel) = decision::request_rel_path(url, self.engine.mount()) else {
            return Decision::PassThrough;
        };
        if !self.allowed.allows(&rel) {
            return Decision::PassThrough;
        }

        match &self.snapshot {
            Some(map) => match map.get(&rel) {
                Some(entry) => Decision::Serve(ServableFile {
                    path: entry.path.clone(),
                    etag: Some(entry.etag.clone()),
                }),
                None => Decision::NotFound,
            },
            None => match self.engine.roots().resolve(Path::new(&rel)) {
                Some(path) => Decision::Serve(ServableFile { path, etag: None }),
                None => Decision::NotFound,
            },
        }
    }
}

impl Handler for AssetRouter {
    fn handle(&self, request: Request) -> Result<()> {
        match self.decide(request.url()) {
            Decision::PassThrough => self.downstream.handle(request),
            Decision::NotFound => {
                debug!("serve"; "404 {}", request.url());
                respond_not_found(request)
            }
            Decision::Serve(file) => self.files.respond(request, &file),
        }
    }
}

// ============================================================================
// Request loop
// ============================================================================

/// Run the blocking request loop.
///
/// Requests are dispatched on a small thread pool so one slow transfer
/// does not block the rest. Returns when the server is unblocked (e.g.
/// from a Ctrl+C handler).
pub fn run(server: &Server, handler: Arc<dyn Handler>) {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .expect("failed to create thread pool");

    for request in server.incoming_requests() {
        let handler = Arc::clone(&handler);
        pool.spawn(move || {
            if let Err(e) = handler.handle(request) {
                log!("serve"; "request error: {e}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::config::Config;

    fn noop_downstream() -> Box<dyn Handler> {
        Box::new(|_request: Request| -> Result<()> { Ok(()) })
    }

    fn engine_with_root(dir: &TempDir) -> Arc<Engine> {
        let engine = Arc::new(Engine::new(Config::default()));
        engine.add_folder(dir.path());
        engine
    }

    #[test]
    fn test_resolved_asset_is_served_with_file_bytes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("card.css"), ".card{}").unwrap();

        let router = AssetRouter::new(engine_with_root(&dir), noop_downstream(), false);
        match router.decide("/static/components/card.css") {
            Decision::Serve(file) => {
                assert_eq!(fs::read(&file.path).unwrap(), b".card{}");
                assert!(file.etag.is_some(), "snapshot entries carry a validator");
            }
            other => panic!("expected Serve, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_asset_is_not_found() {
        let dir = TempDir::new().unwrap();
        let router = AssetRouter::new(engine_with_root(&dir), noop_downstream(), false);
        assert_eq!(
            router.decide("/static/components/missing.css"),
            Decision::NotFound
        );
    }

    #[test]
    fn test_disallowed_extension_passes_through() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("card.svg"), "<svg/>").unwrap();

        let router = AssetRouter::new(engine_with_root(&dir), noop_downstream(), false);
        assert_eq!(
            router.decide("/static/components/card.svg"),
            Decision::PassThrough
        );
    }

    #[test]
    fn test_foreign_prefix_passes_through() {
        let dir = TempDir::new().unwrap();
        let router = AssetRouter::new(engine_with_root(&dir), noop_downstream(), false);
        assert_eq!(router.decide("/about.html"), Decision::PassThrough);
        assert_eq!(router.decide("/"), Decision::PassThrough);
    }

    #[test]
    fn test_first_root_precedence_for_same_named_file() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("shared.css"), "first").unwrap();
        fs::write(second.path().join("shared.css"), "second").unwrap();

        let engine = Arc::new(Engine::new(Config::default()));
        engine.add_folder(first.path());
        engine.add_folder(second.path());

        for autorefresh in [false, true] {
            let router = AssetRouter::new(Arc::clone(&engine), noop_downstream(), autorefresh);
            match router.decide("/static/components/shared.css") {
                Decision::Serve(file) => {
                    assert!(
                        file.path.starts_with(first.path()),
                        "first-registered root wins (autorefresh={autorefresh})"
                    );
                }
                other => panic!("expected Serve, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_snapshot_is_blind_to_late_files() {
        let dir = TempDir::new().unwrap();
        let snapshot_router = AssetRouter::new(engine_with_root(&dir), noop_downstream(), false);
        let live_router = AssetRouter::new(engine_with_root(&dir), noop_downstream(), true);

        fs::write(dir.path().join("late.css"), "late{}").unwrap();

        assert_eq!(
            snapshot_router.decide("/static/components/late.css"),
            Decision::NotFound
        );
        assert!(matches!(
            live_router.decide("/static/components/late.css"),
            Decision::Serve(_)
        ));
    }

    #[test]
    fn test_autorefresh_sees_roots_added_after_install() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(Engine::new(Config::default()));
        let router = AssetRouter::new(Arc::clone(&engine), noop_downstream(), true);

        assert_eq!(
            router.decide("/static/components/new.css"),
            Decision::NotFound
        );

        fs::write(dir.path().join("new.css"), "x").unwrap();
        engine.add_folder(dir.path());
        assert!(matches!(
            router.decide("/static/components/new.css"),
            Decision::Serve(_)
        ));
    }

    #[test]
    fn test_custom_extension_list() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("map.json"), "{}").unwrap();

        let router = AssetRouter::with_extensions(
            engine_with_root(&dir),
            noop_downstream(),
            false,
            &[".json"],
        );
        assert!(matches!(
            router.decide("/static/components/map.json"),
            Decision::Serve(_)
        ));
        assert_eq!(
            router.decide("/static/components/card.css"),
            Decision::PassThrough
        );
    }
}
