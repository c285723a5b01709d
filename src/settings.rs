use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::fs::File;

use crate::constants::{DEFAULT_PORT, EARTHQUAKE_FEED_URL, FAULT_LINES_FEED_URL};

const CONFIG_FILE_NAME: &str = "quakemap.ini";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub earthquake_url: String,
    pub fault_lines_url: String,
    pub port: u16,
    #[serde(default)]
    pub mapbox_token: String,
    /// 0 disables background refresh
    #[serde(default)]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub export_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            earthquake_url: EARTHQUAKE_FEED_URL.to_string(),
            fault_lines_url: FAULT_LINES_FEED_URL.to_string(),
            port: DEFAULT_PORT,
            mapbox_token: String::new(),
            refresh_interval_secs: 0,
            export_path: None,
        }
    }
}

/// Drops one surrounding pair of quotes, leaving quotes inside the value alone
fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Missing file means defaults; values that do not parse keep their default.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut settings = Settings::default();
        if !config_path.exists() {
            return Ok(settings);
        }

        let file = File::open(config_path).context("Failed to open config file")?;
        let reader = BufReader::new(file);
        let mut config_map = HashMap::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from config")?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        if let Some(url) = config_map.get("earthquake_url") {
            settings.earthquake_url = unquote(url);
        }
        if let Some(url) = config_map.get("fault_lines_url") {
            settings.fault_lines_url = unquote(url);
        }
        if let Some(port_str) = config_map.get("port") {
            if let Ok(port) = port_str.parse::<u16>() {
                settings.port = port;
            }
        }
        if let Some(token) = config_map.get("mapbox_token") {
            settings.mapbox_token = unquote(token);
        }
        if let Some(interval_str) = config_map.get("refresh_interval_secs") {
            if let Ok(interval) = interval_str.parse::<u64>() {
                settings.refresh_interval_secs = interval;
            }
        }
        if let Some(export_path) = config_map.get("export_path") {
            let export_path = unquote(export_path);
            if !export_path.is_empty() {
                settings.export_path = Some(export_path);
            }
        }

        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Creating config directory")?;
        }

        let mut content = String::new();
        content.push_str("# QuakeMap Configuration File\n");
        content.push_str(&format!("earthquake_url = \"{}\"\n", self.earthquake_url));
        content.push_str(&format!("fault_lines_url = \"{}\"\n", self.fault_lines_url));
        content.push_str(&format!("port = {}\n", self.port));
        content.push_str(&format!("mapbox_token = \"{}\"\n", self.mapbox_token));
        content.push_str(&format!("refresh_interval_secs = {}\n", self.refresh_interval_secs));
        if let Some(ref export_path) = self.export_path {
            content.push_str(&format!("export_path = \"{}\"\n", export_path));
        }

        std::fs::write(config_path, content).context("Failed to write to config file")?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .unwrap_or_default()
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .to_path_buf();

        if path.ends_with("target/debug") || path.ends_with("target/release") {
            path.pop();
            path.pop();
        }
        path.push(CONFIG_FILE_NAME);
        path
    }
}
