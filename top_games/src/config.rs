use std::path::Path;

use network::ServiceConfig;
use serde::Deserialize;

use crate::SyncError;

/// Settings read from the YAML file given with `--config`.
///
/// ```yaml
/// database_url: cache/top_games.db
/// service:
///   client_id: abc123
///   page_size: 25
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub service: ServiceConfig,
}

impl AppConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, SyncError> {
        serde_yaml::from_str(yaml).map_err(|e| SyncError::Config(e.to_string()))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, SyncError> {
        match path {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .map_err(|e| SyncError::Config(format!("{}: {e}", path.display())))?;
                Self::from_yaml(&yaml)
            }
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml() {
        let config = AppConfig::from_yaml(
            "database_url: games.db\nservice:\n  client_id: abc\n  page_size: 25\n",
        )
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("games.db"));
        assert_eq!(config.service.client_id.as_deref(), Some("abc"));
        assert_eq!(config.service.page_size, 25);
        assert_eq!(config.service.base_url, network::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/top_games.yaml")));
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn test_no_file_means_defaults() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }
}
