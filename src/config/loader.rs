//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::FileConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Load configuration from a TOML file.
///
/// Semantic checks happen later, when the `Warden` is constructed.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [server]
            bindAddress = "127.0.0.1:9000"
            upstream = "http://app:8080"

            [maintenance]
            maintenanceContent = "<h1>Back soon</h1>"
            bypassPaths = ["/health", "/api/status"]
            bypassFavicon = false
            logLevel = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.server.upstream, "http://app:8080");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.maintenance.maintenance_content, "<h1>Back soon</h1>");
        assert_eq!(config.maintenance.bypass_paths.len(), 2);
        assert!(!config.maintenance.bypass_favicon);
        assert_eq!(config.maintenance.log_level, 3);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[maintenance]\nstatusCode = \"abc\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[maintenance]\nenabled = false").unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(!config.maintenance.enabled);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/warden.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
