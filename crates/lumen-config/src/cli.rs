//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Lumen command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "lumen", about = "Lumen HDR/bloom renderer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Blur iteration count for the bloom pass.
    #[arg(long)]
    pub blur_iterations: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(iters) = args.blur_iterations {
            self.render.blur_iterations = iters;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1280),
            height: None,
            fullscreen: None,
            blur_iterations: Some(8),
            log_level: None,
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.render.blur_iterations, 8);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 600);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        let args = CliArgs {
            width: None,
            height: None,
            fullscreen: None,
            blur_iterations: None,
            log_level: None,
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config, original);
    }
}
