use super::types::*;
use super::{expand_env_vars, unexpanded_env_vars};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML in '{}': {source}", path.display())]
    YamlParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid env pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse { source, .. } => ConfigError::YamlParse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Load the resolved config file, or fall back to the built-in defaults
/// when no file exists at any of the searched locations.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading configuration");
            load_config(path)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

/// Parse and validate config YAML held in memory.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml = expand_env_vars(yaml)?;
    check_unexpanded_vars(&yaml)?;

    // An empty document means "all defaults".
    let config: Config = if yaml.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(&yaml).map_err(|e| ConfigError::YamlParse {
            path: PathBuf::new(),
            source: e,
        })?
    };

    validate_config(&config)?;
    Ok(config)
}

fn check_unexpanded_vars(yaml: &str) -> Result<(), ConfigError> {
    let names = unexpanded_env_vars(yaml)?;
    if names.is_empty() {
        return Ok(());
    }

    Err(ConfigError::Validation(format!(
        "environment variables are not set: {}",
        names.join(", ")
    )))
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    let signup = &config.signup_delay;
    if signup.window_start > signup.window_end {
        errors.push(format!(
            "signup_delay: window_start {} is after window_end {}",
            signup.window_start, signup.window_end
        ));
    }
    if signup.indicator_start > signup.indicator_end {
        errors.push(format!(
            "signup_delay: indicator_start {} is after indicator_end {}",
            signup.indicator_start, signup.indicator_end
        ));
    }
    if signup.tick_interval.is_zero() {
        errors.push("signup_delay: tick_interval must be positive".to_string());
    }

    if config.schedule_delay.tick_interval.is_zero() {
        errors.push("schedule_delay: tick_interval must be positive".to_string());
    }

    let fetch = &config.fetch;
    if fetch.start >= fetch.end {
        errors.push(format!(
            "fetch: start {} must be before end {}",
            fetch.start, fetch.end
        ));
    }
    if fetch.page_size == 0 {
        errors.push("fetch: page_size must be positive".to_string());
    }
    if fetch.page_size > fetch.max_offset {
        errors.push(format!(
            "fetch: page_size {} exceeds max_offset {}",
            fetch.page_size, fetch.max_offset
        ));
    }
    if fetch.sample_interval.is_zero() {
        errors.push("fetch: sample_interval must be positive".to_string());
    }
    if fetch.sample_duration.is_zero() {
        errors.push("fetch: sample_duration must be positive".to_string());
    }
    if fetch.endpoint.trim().is_empty() {
        errors.push("fetch: endpoint must not be empty".to_string());
    }

    if config.companies.lookback.is_zero() {
        errors.push("companies: lookback must be positive".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(parse_config("").unwrap(), Config::default());
    }

    #[test]
    fn test_validation_collects_every_problem() {
        let err = parse_config(
            r#"
fetch:
  start: 2025-12-16T00:00:00Z
  end: 2025-12-15T00:00:00Z
  page_size: 0
companies:
  lookback: 0s
"#,
        )
        .unwrap_err();

        match err {
            ConfigError::ValidationList(errors) => {
                assert_eq!(errors.len(), 3);
                assert!(errors[0].contains("start"));
                assert!(errors[1].contains("page_size"));
                assert!(errors[2].contains("lookback"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_page_size_above_max_offset() {
        let err = parse_config("fetch:\n  page_size: 20000\n").unwrap_err();
        assert!(err.to_string().contains("exceeds max_offset"));
    }

    #[test]
    fn test_unset_env_var_rejected() {
        let err = parse_config("fetch:\n  endpoint: $env{DELAYLENS_UNSET_ENDPOINT}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("DELAYLENS_UNSET_ENDPOINT"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/no/such/delaylens.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_or_default_without_path() {
        assert_eq!(load_or_default(None).unwrap(), Config::default());
    }
}
