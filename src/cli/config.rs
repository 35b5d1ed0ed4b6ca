use super::CommandError;
use crate::config::generate::generate_default_config;
use crate::config::{load_config, user_config_path};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const SYSTEM_CONFIG: &str = "/etc/delaylens/config.yml";

pub fn init(stdout: bool) -> Result<(), CommandError> {
    let config_content = generate_default_config()?;

    if stdout {
        print!("{config_content}");
        return Ok(());
    }

    // Prefer the per-user location, falling back to the system one.
    let config_path = match user_config_path() {
        Some(user_config) => match user_config.parent().map(fs::create_dir_all) {
            Some(Err(e)) => {
                warn!(error = %e, fallback = SYSTEM_CONFIG, "Could not create user config directory");
                PathBuf::from(SYSTEM_CONFIG)
            }
            _ => user_config,
        },
        None => PathBuf::from(SYSTEM_CONFIG),
    };

    write_new_config(&config_path, &config_content)?;
    println!("Config file written to {}", config_path.display());
    Ok(())
}

/// Write `contents` to `path`, refusing to replace an existing file.
pub fn write_new_config(path: &Path, contents: &str) -> Result<(), CommandError> {
    if path.exists() {
        return Err(CommandError::ConfigExists(path.to_path_buf()));
    }

    let io_err = |source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)
}

pub fn validate(config_path: Option<&Path>) -> Result<(), CommandError> {
    let path = config_path.ok_or(CommandError::NoConfig)?;

    println!("Validating config file: {}", path.display());
    load_config(path)?;
    println!("✓ Config is valid");
    Ok(())
}
