//! Telar development server CLI.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{ColorChoice, Parser, Subcommand};
use tiny_http::{Request, Server};

use telar::{Config, Engine, Handler, TemplateError, log, serve};

/// Telar component dev server CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (default: telar.toml)
    #[arg(short = 'C', long, default_value = "telar.toml", value_hint = clap::ValueHint::FilePath)]
    config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve components and their declared assets for development
    #[command(visible_alias = "s")]
    Serve {
        /// Component root folder(s); registration order is resolution order
        #[arg(short, long = "root", required = true, value_hint = clap::ValueHint::DirPath)]
        roots: Vec<PathBuf>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Re-check roots on every request instead of a startup snapshot
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        autorefresh: Option<bool>,
    },

    /// Render a single component tree to stdout
    #[command(visible_alias = "r")]
    Render {
        /// Root component name (e.g. Page)
        name: String,

        /// Component root folder(s); registration order is resolution order
        #[arg(short, long = "root", required = true, value_hint = clap::ValueHint::DirPath)]
        roots: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    telar::logger::set_verbose(cli.verbose);

    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Render { name, roots } => render_once(config, &roots, &name),
        Commands::Serve {
            roots,
            interface,
            port,
            autorefresh,
        } => {
            let interface = interface.unwrap_or(config.serve.interface);
            let port = port.unwrap_or(config.serve.port);
            let autorefresh = autorefresh.unwrap_or(config.serve.autorefresh);
            serve_components(config, &roots, SocketAddr::new(interface, port), autorefresh)
        }
    }
}

fn build_engine(config: Config, roots: &[PathBuf]) -> Arc<Engine> {
    let engine = Arc::new(Engine::new(config));
    for root in roots {
        engine.add_folder(root.clone());
    }
    engine
}

// =============================================================================
// Render Command
// =============================================================================

fn render_once(config: Config, roots: &[PathBuf], name: &str) -> Result<()> {
    let engine = build_engine(config, roots);
    let output = engine.render(name)?;

    println!("{}", output.html);
    log!("render"; "collected {} stylesheet(s), {} script(s)",
        output.assets.css_paths().len(), output.assets.js_paths().len());
    Ok(())
}

// =============================================================================
// Serve Command
// =============================================================================

fn serve_components(
    config: Config,
    roots: &[PathBuf],
    addr: SocketAddr,
    autorefresh: bool,
) -> Result<()> {
    let engine = build_engine(config, roots);

    let server =
        Arc::new(Server::http(addr).map_err(|e| anyhow!("failed to bind {addr}: {e}"))?);

    // Graceful shutdown: unblock the request loop on Ctrl+C
    {
        let server = Arc::clone(&server);
        ctrlc::set_handler(move || {
            log!("serve"; "shutting down...");
            server.unblock();
        })
        .map_err(|e| anyhow!("failed to set Ctrl+C handler: {e}"))?;
    }

    log!("serve"; "http://{addr}");
    if autorefresh {
        log!("serve"; "autorefresh on: roots are re-checked per request");
    }

    let pages = PageHandler {
        engine: Arc::clone(&engine),
    };
    let router = serve::AssetRouter::new(engine, Box::new(pages), autorefresh);
    serve::run(&server, Arc::new(router));
    Ok(())
}

/// Downstream application: renders `/<Name>` as component `Name`.
struct PageHandler {
    engine: Arc<Engine>,
}

impl Handler for PageHandler {
    fn handle(&self, request: Request) -> Result<()> {
        let name = page_name(request.url());
        match self.engine.render(&name) {
            Ok(output) => serve::respond_html(request, output.html),
            Err(TemplateError::UnknownComponent(_)) => serve::respond_not_found(request),
            Err(e) => {
                let e = anyhow::Error::new(e);
                log!("error"; "{e:#}");
                serve::respond_error(request, &e)
            }
        }
    }
}

/// Map a request path to a component name; `/` renders `Index`.
fn page_name(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url).trim_matches('/');
    if path.is_empty() {
        "Index".to_string()
    } else {
        path.to_string()
    }
}
