use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod backend_bridge;
mod config;
mod controller;
mod ui;

use backend_bridge::runtime::BackendRuntime;
use ui::{DashboardApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(about = "Panel de administración de la barbería")]
struct Cli {
    /// Base URL of the barbershop REST API.
    #[arg(long, env = "BARBERIA_API_URL")]
    api_url: Option<String>,
    /// Settings file; defaults to the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    let zone = settings.display_zone()?;
    let api = backend_bridge::connect_api(&settings)?;
    let backend = BackendRuntime::start()?;
    tracing::info!(offset = %settings.utc_offset, "starting dashboard");

    let startup = StartupConfig {
        api,
        api_url: settings.api_url.clone(),
        runtime: backend.handle(),
        zone,
        theme: settings.theme,
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("PeluMaster")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "PeluMaster",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, startup)))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
    .context("dashboard window failed")
}
