use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{
    config::DEFAULT_CONFIG_FILE, load_settings_from, RecordStore, SubmissionController,
    SubmissionSettings,
};
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod ui;

use ui::OrderFormApp;

#[derive(Parser, Debug)]
#[command(about = "Submit order returns to the automation workflow")]
struct Args {
    /// TOML file with submission settings.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    endpoint_url: Option<String>,
    /// Exact `message` the workflow returns on success.
    #[arg(long)]
    accepted_message: Option<String>,
    #[arg(long)]
    focus_after_error: bool,
}

impl Args {
    fn apply(&self, settings: &mut SubmissionSettings) {
        if let Some(url) = &self.endpoint_url {
            settings.endpoint_url = url.clone();
        }
        if let Some(message) = &self.accepted_message {
            settings.accepted_success_message = message.clone();
        }
        if self.focus_after_error {
            settings.focus_after_error = true;
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();

    let mut settings = load_settings_from(&args.config);
    args.apply(&mut settings);
    tracing::info!(
        endpoint = %settings.endpoint_url,
        accepted_message = %settings.accepted_success_message,
        focus_after_error = settings.focus_after_error,
        "starting order form"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to build submission runtime")?;
    let controller =
        SubmissionController::new(settings, RecordStore::new(), runtime.handle().clone())
            .context("invalid submission settings")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Order Return")
            .with_inner_size([420.0, 520.0])
            .with_min_inner_size([360.0, 460.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Order Return",
        options,
        Box::new(move |_cc| Ok(Box::new(OrderFormApp::new(controller)))),
    )
    .map_err(|err| anyhow!("order form window failed: {err}"))?;

    drop(runtime);
    Ok(())
}
