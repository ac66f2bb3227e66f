use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::BoardConfig;

/// Name of the config file inside a board directory
pub const CONFIG_FILE: &str = "dealboard.toml";

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("could not parse dealboard.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize dealboard.toml: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub fn config_path(board_dir: &Path) -> PathBuf {
    board_dir.join(CONFIG_FILE)
}

/// Read the board config. A missing file yields the defaults.
pub fn read_config(board_dir: &Path) -> Result<BoardConfig, ConfigError> {
    let path = config_path(board_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BoardConfig::default()),
        Err(e) => return Err(ConfigError::Read { path, source: e }),
    };
    Ok(toml::from_str(&text)?)
}

/// Write the config file, replacing any existing one.
pub fn write_config(board_dir: &Path, config: &BoardConfig) -> Result<(), ConfigError> {
    let path = config_path(board_dir);
    let text = toml::to_string_pretty(config)?;
    fs::write(&path, text).map_err(|e| ConfigError::Write { path, source: e })
}

/// Absolute path of the board state file for this config.
pub fn state_path(board_dir: &Path, config: &BoardConfig) -> PathBuf {
    board_dir.join(&config.board.state_file)
}
