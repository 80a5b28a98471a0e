//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ExplorerConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::secret::SecretString;

/// Environment variable holding the provider API key.
pub const API_KEY_ENV_VAR: &str = "ALCHEMY_API_KEY";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ExplorerConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: ExplorerConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;
    finalize(config)
}

/// Load from `path` when given, otherwise start from defaults.
///
/// Environment overrides are applied before validation in both cases.
pub fn load_or_default(path: Option<&Path>) -> Result<ExplorerConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => finalize(ExplorerConfig::default()),
    }
}

fn finalize(mut config: ExplorerConfig) -> Result<ExplorerConfig, ConfigError> {
    apply_env_overrides(&mut config, std::env::var(API_KEY_ENV_VAR).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut ExplorerConfig, api_key: Option<String>) {
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.provider.api_key = Some(SecretString::new(key.trim().to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [transfers]
            page_size = 10

            [pipeline]
            confirmation_timeout_secs = 30
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.transfers.page_size, 10);
        assert_eq!(config.pipeline.confirmation_timeout_secs, 30);
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transfers\npage_size = ").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transfers]\nmax_results = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("transfers.max_results"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_env_api_key_override() {
        let mut config = ExplorerConfig::default();
        apply_env_overrides(&mut config, Some("  demo-key ".to_string()));
        assert_eq!(
            config.provider.api_key.as_ref().map(|k| k.expose_secret()),
            Some("demo-key")
        );

        let mut config = ExplorerConfig::default();
        apply_env_overrides(&mut config, Some("   ".to_string()));
        assert!(config.provider.api_key.is_none());
    }
}
