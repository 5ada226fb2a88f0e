//! Configuration system for the Lumen renderer.
//!
//! Provides runtime-configurable settings that persist to disk as RON files,
//! CLI overrides via clap, and the per-session state (camera pose, overlay
//! visibility, background color) saved at shutdown and restored at startup.

mod cli;
mod config;
mod error;
mod session;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, InputConfig, RenderConfig, WindowConfig};
pub use error::ConfigError;
pub use session::SessionState;
