use crate::app::OutputMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Per-directory override file name
pub const LOCAL_CONFIG_FILE: &str = ".pdiff.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdiffConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// [output] section configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub mode: OutputMode,
    #[serde(default = "default_true")]
    pub pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            pretty: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Global config location: `~/.config/pdiff/config.toml`
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdiff").join("config.toml"))
}

/// Load config by merging global defaults with per-directory overrides.
/// Priority: `<dir>/.pdiff.toml` > global `~/.config/pdiff/config.toml` > built-in defaults.
pub fn load_config(dir: &Path) -> PdiffConfig {
    load_config_from(
        global_config_path().as_deref(),
        &dir.join(LOCAL_CONFIG_FILE),
    )
}

/// Merging is deep: individual keys within a section (e.g. `[output]`) override independently.
pub fn load_config_from(global_path: Option<&Path>, local_path: &Path) -> PdiffConfig {
    let global_table = global_path.and_then(read_table);
    let local_table = read_table(local_path);

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            global
        }
        (Some(global), None) => global,
        (None, Some(local)) => local,
        (None, None) => return PdiffConfig::default(),
    };

    toml::Value::Table(merged).try_into().unwrap_or_else(|e| {
        log::warn!("Ignoring invalid config values: {}", e);
        PdiffConfig::default()
    })
}

fn read_table(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<toml::Table>(&content) {
        Ok(table) => Some(table),
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
