//! Add-on settings
//!
//! Read from an optional `settings.json` in the component's `PluginData`
//! directory. Any field left out of the file keeps its default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ANCHOR_MARKER, DEFAULT_COMPONENT_NAME, DEFAULT_LEDGER_FILE};

/// Add-on settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Game install root (the directory holding `GameData`)
    #[serde(skip)]
    pub data_root: PathBuf,

    /// Directory name under `GameData`
    pub component_name: String,
    /// Ledger file name inside `PluginData`
    pub ledger_file: String,
    /// Substring of a part's type name that marks it as an anchor
    pub anchor_marker: String,
    /// Write the ledger to disk after every save hook
    pub persist_on_save: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            component_name: DEFAULT_COMPONENT_NAME.to_string(),
            ledger_file: DEFAULT_LEDGER_FILE.to_string(),
            anchor_marker: DEFAULT_ANCHOR_MARKER.to_string(),
            persist_on_save: true,
        }
    }
}

impl Settings {
    /// Settings file name inside `PluginData`
    const FILE_NAME: &'static str = "settings.json";

    /// Defaults rooted at `data_root`
    pub fn with_root(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            ..Self::default()
        }
    }

    /// `<root>/GameData/<component>/PluginData`
    pub fn plugin_data_dir(&self) -> PathBuf {
        self.data_root
            .join("GameData")
            .join(&self.component_name)
            .join("PluginData")
    }

    /// Where the anchor ledger lives
    pub fn ledger_path(&self) -> PathBuf {
        self.plugin_data_dir().join(&self.ledger_file)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.plugin_data_dir().join(Self::FILE_NAME)
    }

    /// Load settings for the install at `data_root`
    ///
    /// A missing or unreadable settings file yields the defaults.
    pub fn load(data_root: impl AsRef<Path>) -> Self {
        let defaults = Self::with_root(data_root.as_ref());
        let path = defaults.settings_path();

        match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(mut settings) => {
                    settings.data_root = defaults.data_root;
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings file {}: {}", path.display(), e);
                    defaults
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                defaults
            }
            Err(e) => {
                log::warn!("Cannot read settings file {}: {}", path.display(), e);
                defaults
            }
        }
    }

    /// Write settings next to the ledger
    pub fn save(&self) -> std::io::Result<()> {
        let path = self.settings_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
