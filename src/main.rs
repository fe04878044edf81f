mod app;
mod cookies;
mod graph;
mod interaction;
mod logging;
mod physics;
mod sync;
mod util;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::info;

use crate::cookies::JsonCookieStore;
use crate::physics::SimulationConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON array of cookie records kept up to date by the browsing session.
    #[arg(long, default_value = "cookies.json")]
    cookies: PathBuf,

    /// How often the cookie file is checked for changes.
    #[arg(long, default_value_t = 500)]
    poll_interval_ms: u64,

    /// Start every rebuild from a fresh layout instead of the previous one.
    #[arg(long)]
    fresh_layout: bool,

    /// Open on the browser view instead of the cookie graph.
    #[arg(long)]
    start_in_browser: bool,

    #[arg(long)]
    verbose: bool,

    #[arg(long)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose, args.log_json)?;

    let store = JsonCookieStore::open(&args.cookies)
        .with_context(|| format!("failed to open cookie store {}", args.cookies.display()))?;
    store.spawn_watcher(Duration::from_millis(args.poll_interval_ms.max(50)));
    info!(path = %store.path().display(), "watching cookie store");

    let settings = app::AppSettings {
        simulation: SimulationConfig::default(),
        preserve_layout: !args.fresh_layout,
        start_in_graph: !args.start_in_browser,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 820.0]),
        ..Default::default()
    };

    eframe::run_native(
        "cookie-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::CookieGraphApp::new(cc, store, settings)))),
    )
    .map_err(|error| anyhow!("window system failed: {error}"))
}
