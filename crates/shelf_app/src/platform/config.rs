use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shelf_core::{GridOptions, DEFAULT_ROW_WIDTH};
use shelf_engine::ClientSettings;
use shelf_logging::{shelf_info, shelf_warn};

pub(crate) const CONFIG_FILENAME: &str = "shelf.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ShelfConfig {
    pub base_url: String,
    pub row_width: usize,
    pub display_limit: Option<usize>,
    pub show_empty_state: bool,
    /// Ids installed on this device at startup.
    pub installed: Vec<String>,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            base_url: ClientSettings::default().base_url,
            row_width: DEFAULT_ROW_WIDTH,
            display_limit: None,
            show_empty_state: true,
            installed: Vec::new(),
        }
    }
}

impl ShelfConfig {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::with_base_url(self.base_url.clone())
    }

    pub fn grid_options(&self) -> GridOptions {
        GridOptions {
            row_width: self.row_width,
            display_limit: self.display_limit,
            show_empty_state: self.show_empty_state,
        }
    }

    pub fn installed_ids(&self) -> HashSet<String> {
        self.installed.iter().cloned().collect()
    }
}

/// Reads the config at `path`, falling back to defaults when it is missing or broken.
pub(crate) fn load_config(path: &Path) -> ShelfConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            shelf_info!("No config at {:?}, using defaults", path);
            return ShelfConfig::default();
        }
        Err(err) => {
            shelf_warn!("Failed to read config from {:?}: {}", path, err);
            return ShelfConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            shelf_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            shelf_warn!("Failed to parse config from {:?}: {}", path, err);
            ShelfConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::{load_config, ShelfConfig, CONFIG_FILENAME};

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join(CONFIG_FILENAME));
        assert_eq!(config, ShelfConfig::default());
        assert_eq!(config.grid_options().row_width, 4);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(base_url: "http://device.local:4200/", display_limit: Some(12), installed: ["a1", "b2"])"#,
        )
        .unwrap();

        let config = load_config(&path);
        assert_eq!(config.base_url, "http://device.local:4200/");
        assert_eq!(config.grid_options().display_limit, Some(12));
        assert!(config.grid_options().show_empty_state);
        assert!(config.installed_ids().contains("b2"));
        assert_eq!(config.client_settings().base_url, "http://device.local:4200/");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(row_width: \"wide\"").unwrap();
        assert_eq!(load_config(&path), ShelfConfig::default());
    }
}
