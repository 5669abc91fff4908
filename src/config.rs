//! Configuration loader plus strongly typed settings structures.
//!
//! This module deserializes the TOML config (UI settings and the list of
//! bars to show), resolves where that file lives, and converts each bar
//! entry into validated [`ProgressOptions`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::template::{ProgressTemplate, SegmentTemplate};
use crate::core::widget::{DEFAULT_PROGRESS_LABEL, DEFAULT_SEGMENT_LABEL, DEFAULT_THRESHOLD};
use crate::core::{DurationTable, ProgressOptions, ProgressResult, TimeState, UnitLabels};

// Embed default configuration at compile time
const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TIME_PROGRESS_DIR";

/// Top-level configuration object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub bars: Vec<BarConfig>,
}

/// UI settings shared by every bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_idle_poll_ms")]
    pub idle_poll_ms: u64,
    #[serde(default)]
    pub exit_on_finish: bool,
    #[serde(default = "default_show_border")]
    pub show_border: bool,
    #[serde(default = "default_border_style")]
    pub border_style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_color: Option<String>, // Hex color code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            idle_poll_ms: default_idle_poll_ms(),
            exit_on_finish: false,
            show_border: default_show_border(),
            border_style: default_border_style(),
            bar_color: None,
            used_color: None,
            idle_color: None,
            text_color: None,
        }
    }
}

/// One bar to show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_progress_label")]
    pub progress_label_content: String,
    #[serde(default = "default_label")]
    pub label_content: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_timescale")]
    pub timescale: f64,
    #[serde(default)]
    pub time: TimeConfig,
    /// Unit table; the built-in seconds/minutes/hours table when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<UnitConfig>>,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            progress_label_content: default_progress_label(),
            label_content: default_label(),
            threshold: default_threshold(),
            timescale: default_timescale(),
            time: TimeConfig::default(),
            units: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    #[serde(default)]
    pub current: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub seconds: u64,
    pub singular: String,
    pub plural: String,
}

impl BarConfig {
    pub fn duration_table(&self) -> ProgressResult<DurationTable> {
        match &self.units {
            None => Ok(DurationTable::default()),
            Some(units) => DurationTable::new(
                units
                    .iter()
                    .map(|u| (u.seconds, UnitLabels::new(&u.singular, &u.plural))),
            ),
        }
    }

    /// Build construction options, running every validation
    pub fn to_options(&self) -> ProgressResult<ProgressOptions> {
        let options = ProgressOptions {
            progress_label_content: self.progress_label_content.clone(),
            label_content: self.label_content.clone(),
            threshold: self.threshold,
            time: TimeState::new(self.time.current, self.time.total),
            duration: self.duration_table()?,
            timescale: self.timescale,
        };
        options.validate()?;

        // Templates are parsed by the bar itself; parse here too so a bad
        // placeholder is reported while loading config
        ProgressTemplate::parse(&options.progress_label_content)?;
        SegmentTemplate::parse(&options.label_content)?;

        Ok(options)
    }
}

impl Config {
    /// Resolve and load the configuration.
    ///
    /// Lookup order:
    /// 1. `path`, when given (must exist)
    /// 2. `{data dir}/config.toml`
    /// 3. Embedded default
    pub fn load(path: Option<&Path>, data_dir: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        let config_path = Self::config_path(data_dir)?;
        if config_path.exists() {
            tracing::info!("Loading config from {:?}", config_path);
            return Self::load_from_file(&config_path);
        }

        tracing::info!("No config at {:?}, using embedded defaults", config_path);
        Self::embedded_default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&contents).context(format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        tracing::debug!("Parsed config with {} bars", config.bars.len());
        Ok(config)
    }

    pub fn embedded_default() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG).context("Embedded default config is invalid")
    }

    /// Write this config as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create config directory: {:?}", parent))?;
        }
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context(format!("Failed to write config file: {:?}", path))?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Get the base directory (~/.time-progress/)
    /// Overridden by `data_dir`, then by the TIME_PROGRESS_DIR environment variable
    pub fn base_dir(data_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = data_dir {
            return Ok(dir.to_path_buf());
        }

        if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".time-progress"))
    }

    /// Get path to config.toml
    pub fn config_path(data_dir: Option<&Path>) -> Result<PathBuf> {
        Ok(Self::base_dir(data_dir)?.join("config.toml"))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.ui.tick_interval_ms.max(1))
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.ui.idle_poll_ms.max(1))
    }
}

fn default_tick_interval_ms() -> u64 {
    250
}

fn default_idle_poll_ms() -> u64 {
    500
}

fn default_show_border() -> bool {
    true
}

fn default_border_style() -> String {
    "rounded".to_string()
}

fn default_title() -> String {
    "Progress".to_string()
}

fn default_progress_label() -> String {
    DEFAULT_PROGRESS_LABEL.to_string()
}

fn default_label() -> String {
    DEFAULT_SEGMENT_LABEL.to_string()
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_timescale() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProgressError;

    #[test]
    fn test_embedded_default_is_valid() {
        let config = Config::embedded_default().unwrap();
        assert_eq!(config.ui.tick_interval_ms, 250);
        assert_eq!(config.tick_interval(), Duration::from_millis(250));
        assert!(!config.bars.is_empty());

        for bar in &config.bars {
            assert!(bar.to_options().is_ok(), "bar '{}' should validate", bar.title);
        }
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = Config::from_toml("[[bars]]\n").unwrap();
        assert_eq!(config.ui.tick_interval_ms, 250);
        assert!(config.ui.show_border);
        assert_eq!(config.bars[0], BarConfig::default());

        let options = config.bars[0].to_options().unwrap();
        assert_eq!(options, ProgressOptions::default());
    }

    #[test]
    fn test_units_and_time_parse() {
        let toml = r#"
            [[bars]]
            title = "Bake"
            threshold = 3
            [bars.time]
            current = 30
            total = 5400
            [[bars.units]]
            seconds = 60
            singular = "min"
            plural = "mins"
        "#;
        let config = Config::from_toml(toml).unwrap();
        let options = config.bars[0].to_options().unwrap();

        assert_eq!(options.time, TimeState::new(30.0, 5400.0));
        assert_eq!(options.threshold, 3.0);
        assert_eq!(options.duration.len(), 1);
        assert_eq!(options.duration.largest_unit(5400.0), Some(60));
    }

    #[test]
    fn test_invalid_bars_reported() {
        let zero_unit = BarConfig {
            units: Some(vec![UnitConfig {
                seconds: 0,
                singular: "x".to_string(),
                plural: "xs".to_string(),
            }]),
            ..BarConfig::default()
        };
        assert_eq!(
            zero_unit.to_options(),
            Err(ProgressError::NonPositiveUnit { seconds: 0 })
        );

        let empty_units = BarConfig {
            units: Some(Vec::new()),
            ..BarConfig::default()
        };
        assert_eq!(empty_units.to_options(), Err(ProgressError::EmptyDurationTable));

        let typo = BarConfig {
            label_content: "__cnt__".to_string(),
            ..BarConfig::default()
        };
        assert!(matches!(
            typo.to_options(),
            Err(ProgressError::UnknownPlaceholder { .. })
        ));
    }

    #[test]
    fn test_load_from_data_dir_and_fallback() {
        let dir = tempfile::tempdir().unwrap();

        // Nothing on disk yet: embedded defaults
        let fallback = Config::load(None, Some(dir.path())).unwrap();
        assert_eq!(fallback.bars.len(), Config::embedded_default().unwrap().bars.len());

        let mut custom = Config::default();
        custom.ui.exit_on_finish = true;
        custom.bars.push(BarConfig {
            title: "Custom".to_string(),
            ..BarConfig::default()
        });
        custom.save(&Config::config_path(Some(dir.path())).unwrap()).unwrap();

        let loaded = Config::load(None, Some(dir.path())).unwrap();
        assert!(loaded.ui.exit_on_finish);
        assert_eq!(loaded.bars.len(), 1);
        assert_eq!(loaded.bars[0].title, "Custom");
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing), None).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }

    #[test]
    fn test_parse_error_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[[bars]]\nthreshold = \"wide\"\n").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
