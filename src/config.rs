//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/giftcircle/giftcircle.toml`
//! 3. Local config: `<roster_dir>/.giftcircle.toml`
//! 4. Environment variables: `GIFTCIRCLE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::NonLargestPick;

/// Report rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Print `[No one]` for circles without links
    pub show_empty: bool,
    /// Render circles as a tree instead of sections
    pub tree: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            show_empty: true,
            tree: false,
        }
    }
}

/// Raw output config for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub show_empty: Option<bool>,
    pub tree: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub pick: Option<NonLargestPick>,
    pub roster: Option<PathBuf>,
    #[serde(default)]
    pub output: RawOutputConfig,
}

impl OutputConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawOutputConfig) -> Self {
        Self {
            show_empty: overlay.show_empty.unwrap_or(self.show_empty),
            tree: overlay.tree.unwrap_or(self.tree),
        }
    }
}

/// Unified configuration for giftcircle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Tube to draw from when the largest would repeat a country
    pub pick: NonLargestPick,
    /// Roster used when none is given on the command line
    pub roster: Option<PathBuf>,
    /// Report rendering
    pub output: OutputConfig,
}

/// Get the XDG config directory for giftcircle.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "giftcircle").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("giftcircle.toml"))
}

/// Get the path to the local config file next to a roster.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".giftcircle.toml")
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

/// Expand `~`, `$VAR` and `${VAR}` in a path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    /// Overlay wins for every value it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            pick: overlay.pick.unwrap_or(self.pick),
            roster: overlay.roster.clone().or_else(|| self.roster.clone()),
            output: self.output.merge(&overlay.output),
        }
    }

    fn expand_paths(&mut self) {
        self.roster = self.roster.as_deref().map(expand_path);
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.giftcircle.toml`
    ///   (usually the roster's directory)
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply GIFTCIRCLE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("GIFTCIRCLE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("pick") {
            settings.pick = val
                .parse::<NonLargestPick>()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("roster") {
            settings.roster = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("output.show_empty") {
            settings.output.show_empty = val;
        }
        if let Ok(val) = config.get_bool("output.tree") {
            settings.output.tree = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# giftcircle configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/giftcircle/giftcircle.toml
#   Local:  <roster_dir>/.giftcircle.toml
#   Env:    GIFTCIRCLE_* environment variables (GIFTCIRCLE_OUTPUT__TREE=true)

# Tube to draw from when the largest country would sit next to itself:
#   "second-largest"  next-largest country (reproducible)
#   "first-available" first remaining country in roster order
# pick = "second-largest"

# Roster used when none is given on the command line
# roster = "~/gifts/roster.toml"

[output]
# Print "[No one]" for circles without links
# show_empty = true

# Render circles as a tree
# tree = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_second_largest_and_show_empty() {
        let settings = Settings::default();
        assert_eq!(settings.pick, NonLargestPick::SecondLargest);
        assert!(settings.roster.is_none());
        assert!(settings.output.show_empty);
        assert!(!settings.output.tree);
    }

    #[test]
    fn given_overlay_when_merging_then_specified_values_win() {
        let base = Settings::default();
        let overlay = RawSettings {
            pick: Some(NonLargestPick::FirstAvailable),
            roster: None,
            output: RawOutputConfig {
                show_empty: None,
                tree: Some(true),
            },
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.pick, NonLargestPick::FirstAvailable);
        assert!(merged.output.show_empty);
        assert!(merged.output.tree);
    }

    #[test]
    fn given_empty_overlay_when_merging_then_keeps_base() {
        let base = Settings {
            roster: Some(PathBuf::from("/srv/roster.toml")),
            ..Settings::default()
        };

        let merged = base.merge_with(&RawSettings::default());

        assert_eq!(merged, base);
    }

    #[test]
    fn given_tilde_in_roster_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            roster: Some(PathBuf::from("~/roster.toml")),
            ..Settings::default()
        };

        settings.expand_paths();

        let roster = settings.roster.unwrap();
        assert!(!roster.to_string_lossy().starts_with('~'));
        assert!(roster.ends_with("roster.toml"));
    }

    #[test]
    fn given_template_when_parsed_then_yields_defaults() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }

    #[test]
    fn given_settings_when_serialized_then_round_trips_through_raw() {
        let settings = Settings {
            pick: NonLargestPick::FirstAvailable,
            roster: Some(PathBuf::from("/tmp/r.toml")),
            output: OutputConfig {
                show_empty: false,
                tree: true,
            },
        };

        let raw: RawSettings = toml::from_str(&settings.to_toml().unwrap()).unwrap();

        assert_eq!(Settings::default().merge_with(&raw), settings);
    }
}
