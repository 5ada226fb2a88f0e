//! Lumen binary entry point: configuration, logging, then the event loop.

mod app;
mod scene;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use lumen_config::{CliArgs, Config, SessionState};
use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::App;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config from {}: {err}", config_dir.display());
            return ExitCode::FAILURE;
        }
    };
    config.apply_cli_overrides(&args);

    lumen_log::init_logging(Some(&config_dir), cfg!(debug_assertions), Some(&config));
    tracing::info!(config_dir = %config_dir.display(), "starting lumen");

    // A corrupt session file is fatal; defaulting here would overwrite the
    // saved camera pose at the next clean shutdown.
    let session = match SessionState::load(&config_dir) {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(%err, "session.ron is unreadable; fix or delete it");
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            tracing::error!(%err, "failed to create event loop");
            return ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, session, config_dir);
    if let Err(err) = event_loop.run_app(&mut app) {
        tracing::error!(%err, "event loop error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lumen")
}
