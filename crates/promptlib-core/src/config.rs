//! Config file location, TOML types, and settings loading.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store;

// ── TOML deserialization types ──

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TomlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<TomlSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal: Option<TomlNormalBindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert: Option<TomlInsertBindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<TomlEditBindings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<TomlSearchBindings>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TomlSettings {
    /// Overrides the directory holding `prompts.json` and `theme`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TomlNormalBindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quit: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_next: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select_prev: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_to_top: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_to_bottom: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_favourite: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_delete: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_delete: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_favourites_view: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toggle_theme: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_help: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TomlInsertBindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TomlEditBindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct TomlSearchBindings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear: Option<Vec<String>>,
}

// ── Paths ──

/// `$XDG_CONFIG_HOME/promptlib/config.toml`, falling back to `~/.config`.
pub fn config_path() -> Option<PathBuf> {
    config_path_from(env::var("XDG_CONFIG_HOME").ok(), env::var("HOME").ok())
}

fn config_path_from(xdg: Option<String>, home: Option<String>) -> Option<PathBuf> {
    let config_dir = xdg
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| PathBuf::from(h).join(".config")))?;
    Some(config_dir.join("promptlib").join("config.toml"))
}

/// Data directory: the `data_dir` setting if present, otherwise
/// `~/.local/share/promptlib/`.
pub fn data_dir(settings: &TomlSettings) -> Option<PathBuf> {
    settings.data_dir.clone().or_else(store::default_data_dir)
}

// ── Config file I/O ──

/// Load the raw TOML config. Returns Default if the file is missing or
/// unparsable.
pub fn load_toml_config() -> TomlConfig {
    match config_path() {
        Some(path) => load_toml_config_from(&path),
        None => TomlConfig::default(),
    }
}

pub fn load_toml_config_from(path: &Path) -> TomlConfig {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return TomlConfig::default(),
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unparsable config");
            TomlConfig::default()
        }
    }
}

pub fn load_settings() -> TomlSettings {
    load_toml_config().settings.unwrap_or_default()
}

/// Save a TomlConfig to the config file, creating parent dirs as needed.
pub fn save_toml_config(config: &TomlConfig) -> io::Result<()> {
    let path = config_path()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cannot determine config path"))?;
    save_toml_config_to(&path, config)
}

pub fn save_toml_config_to(path: &Path, config: &TomlConfig) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(io::Error::other)?;
    fs::write(path, content)
}
