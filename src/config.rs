use crate::content::Content;
use crate::options::PanelOptions;
use crate::stylesheets::Stylesheets;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Get the config directory using platform-appropriate location.
///
/// - macOS: `~/Library/Application Support/mdpanel/`
/// - Linux: `~/.config/mdpanel/` (or `$XDG_CONFIG_HOME`)
/// - Windows: `%APPDATA%/mdpanel/`
///
/// Falls back to `~/.mdpanel/` if the platform dir is unavailable.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("mdpanel"))
        .unwrap_or_else(fallback_dotdir)
}

fn fallback_dotdir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mdpanel")
}

/// Load a JSON config file, returning Default if missing or corrupt.
/// Unreadable or corrupt files are logged instead of silently resetting state.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    let content = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Could not read config {}: {e}", path.display());
            return T::default();
        }
    };
    match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Corrupt config {}: {e}. Using defaults.", path.display());
            T::default()
        }
    }
}

/// Save a JSON config file atomically (temp file + rename).
pub fn save_json_config<T: Serialize>(path: &Path, config: &T) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create config directory: {e}"))?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {e}"))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Config path {} has no file name", path.display()))?;
    let temp = path.with_file_name(format!("{file_name}.tmp.{}", std::process::id()));

    std::fs::write(&temp, &json).map_err(|e| format!("Failed to write temp config: {e}"))?;

    // Atomic rename: either the old file or new file exists, never partial
    std::fs::rename(&temp, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp);
        format!("Failed to commit config: {e}")
    })?;

    Ok(())
}

// ---------------------------------------------------------------------------
// PanelConfig
// ---------------------------------------------------------------------------

/// Values applied to a panel while it is constructed.
///
/// Unset fields keep the panel defaults. Keys that are not panel properties are
/// collected into `host_properties` and written through to the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stylesheets: Option<Stylesheets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PanelOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_images: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
    #[serde(flatten)]
    pub host_properties: Map<String, Value>,
}

impl PanelConfig {
    /// Default location of the panel config file.
    pub fn default_path() -> PathBuf {
        config_dir().join("panel.json")
    }

    pub fn load(path: &Path) -> Self {
        load_json_config(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        save_json_config(path, self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
