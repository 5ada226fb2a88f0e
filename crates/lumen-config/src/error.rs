//! Errors raised by the config and session persistence layer.
//!
//! Both `config.ron` and `session.ron` go through the same load/save flow,
//! so every variant names the file it failed on; the app surfaces these
//! messages directly at startup.

use std::path::PathBuf;

/// Errors that can occur when loading or saving `config.ron`/`session.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a persisted file from disk.
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a persisted file (or create its directory).
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A persisted file exists but is not valid RON.
    #[error("{} is not valid RON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },

    /// Failed to serialize state to RON.
    #[error("could not serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: ron::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_read_error_names_the_file() {
        let err = ConfigError::Read {
            path: Path::new("/cfg/lumen/session.ron").to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let msg = err.to_string();
        assert!(msg.contains("session.ron"), "message was: {msg}");
        assert!(msg.contains("could not read"));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let source = ron::from_str::<u32>("not a number").unwrap_err();
        let err = ConfigError::Parse {
            path: Path::new("config.ron").to_path_buf(),
            source,
        };
        assert!(err.to_string().contains("config.ron"));
    }
}
