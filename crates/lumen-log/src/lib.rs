//! Structured logging for the Lumen renderer.
//!
//! Console output with uptime timestamps and module paths via the `tracing`
//! ecosystem, plus JSON file logging in debug builds for post-mortem
//! analysis. The filter respects `RUST_LOG` and falls back to the config
//! system's log level.

use lumen_config::Config;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// * `log_dir` - Optional directory for JSON log files (debug builds only)
/// * `debug_build` - Whether this is a debug build (enables file logging)
/// * `config` - Optional configuration used for a log level override
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => "info,wgpu=warn,naga=warn".to_string(),
    };

    // RUST_LOG wins over the config value
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("lumen.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Create an `EnvFilter` with the default filter string: `info` everywhere,
/// `warn` for the noisy `wgpu` and `naga` targets.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new("info,wgpu=warn,naga=warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        let filter_str = format!("{}", filter);
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_config_log_level_is_used() {
        let mut config = Config::default();
        config.debug.log_level = "debug,lumen_render=trace".to_string();
        let filter = EnvFilter::new(&config.debug.log_level);
        let filter_str = format!("{}", filter);
        assert!(filter_str.contains("lumen_render=trace"));
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,lumen_render=trace",
            "warn,lumen_app=debug",
            "error",
        ];
        for filter_str in &valid_filters {
            let result = EnvFilter::try_from(*filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {}", filter_str);
        }
    }

    #[test]
    fn test_log_file_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_file_path = temp_dir.path().join("lumen.log");
        assert_eq!(log_file_path.file_name().unwrap(), "lumen.log");
    }
}
