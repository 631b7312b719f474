//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
//! 3. Environment variables: `ORGCHART_*` prefix
//! 4. Command-line overrides (`--base-dir`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Unified configuration for orgchart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base directory for orgchart data (default: ~/.orgchart)
    pub base_dir: PathBuf,
    /// Name given to charts created without one
    pub default_chart_name: String,
    /// Name of the root node of a new chart
    pub root_name: String,
    /// Position of the root node of a new chart
    pub root_position: String,
    /// Name given to nodes added without one
    pub new_node_name: String,
    /// Position given to nodes added without one
    pub new_node_position: String,
    /// Fail edits that name a node id not present in the tree
    pub strict_node_ids: bool,
    /// Remove deleted nodes from all groups immediately
    pub prune_groups_on_delete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: dirs_default_base_dir(),
            default_chart_name: "New Org Chart".into(),
            root_name: "CEO".into(),
            root_position: "Management".into(),
            new_node_name: "New Member".into(),
            new_node_position: "Position".into(),
            strict_node_ids: false,
            prune_groups_on_delete: false,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, keep base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub base_dir: Option<PathBuf>,
    pub default_chart_name: Option<String>,
    pub root_name: Option<String>,
    pub root_position: Option<String>,
    pub new_node_name: Option<String>,
    pub new_node_position: Option<String>,
    pub strict_node_ids: Option<bool>,
    pub prune_groups_on_delete: Option<bool>,
}

/// Get the default base directory (~/.orgchart).
fn dirs_default_base_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".orgchart"))
        .unwrap_or_else(|| PathBuf::from("~/.orgchart"))
}

/// Get the XDG config directory for orgchart.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgchart").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgchart.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unexpandable input is returned as is.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Directory holding one JSON record per chart (base_dir/charts).
    pub fn charts_dir(&self) -> PathBuf {
        self.base_dir.join("charts")
    }

    /// Directory exports are written to by default (base_dir/exports).
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.base_dir.to_string_lossy().as_ref());
        self.base_dir = PathBuf::from(expanded);
    }

    /// Overlay specified values onto self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            base_dir: overlay
                .base_dir
                .clone()
                .unwrap_or_else(|| self.base_dir.clone()),
            default_chart_name: overlay
                .default_chart_name
                .clone()
                .unwrap_or_else(|| self.default_chart_name.clone()),
            root_name: overlay
                .root_name
                .clone()
                .unwrap_or_else(|| self.root_name.clone()),
            root_position: overlay
                .root_position
                .clone()
                .unwrap_or_else(|| self.root_position.clone()),
            new_node_name: overlay
                .new_node_name
                .clone()
                .unwrap_or_else(|| self.new_node_name.clone()),
            new_node_position: overlay
                .new_node_position
                .clone()
                .unwrap_or_else(|| self.new_node_position.clone()),
            strict_node_ids: overlay.strict_node_ids.unwrap_or(self.strict_node_ids),
            prune_groups_on_delete: overlay
                .prune_groups_on_delete
                .unwrap_or(self.prune_groups_on_delete),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
    /// 3. Environment variables: `ORGCHART_*` prefix
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings using `config_file` in place of the global config file.
    /// A missing file is skipped.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply ORGCHART_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("ORGCHART")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("base_dir") {
            settings.base_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("default_chart_name") {
            settings.default_chart_name = val;
        }
        if let Ok(val) = config.get_string("root_name") {
            settings.root_name = val;
        }
        if let Ok(val) = config.get_string("root_position") {
            settings.root_position = val;
        }
        if let Ok(val) = config.get_string("new_node_name") {
            settings.new_node_name = val;
        }
        if let Ok(val) = config.get_string("new_node_position") {
            settings.new_node_position = val;
        }
        if let Ok(val) = config.get_bool("strict_node_ids") {
            settings.strict_node_ids = val;
        }
        if let Ok(val) = config.get_bool("prune_groups_on_delete") {
            settings.prune_groups_on_delete = val;
        }

        Ok(settings)
    }

    /// Replace the base directory (command-line override), expanding `~`/`$VAR`.
    pub fn with_base_dir(mut self, base_dir: PathBuf) -> Self {
        self.base_dir = base_dir;
        self.expand_paths();
        self
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgchart configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgchart/orgchart.toml
#   Env:    ORGCHART_* environment variables (e.g. ORGCHART_STRICT_NODE_IDS=true)
#   CLI:    --base-dir

# Base directory (charts stored in base_dir/charts)
# base_dir = "~/.orgchart"

# Defaults for new charts
# default_chart_name = "New Org Chart"
# root_name = "CEO"
# root_position = "Management"

# Defaults for nodes added without name/position
# new_node_name = "New Member"
# new_node_position = "Position"

# Fail edits naming a node id that is not in the chart (default: ignore them)
# strict_node_ids = false

# Remove deleted nodes from all groups right away (default: keep, hide on display)
# prune_groups_on_delete = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
