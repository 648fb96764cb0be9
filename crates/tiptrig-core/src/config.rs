#![forbid(unsafe_code)]

//! Trigger and root configuration as data.
//!
//! Per-trigger settings ([`TriggerConfig`]) choose the activation mode and may
//! override the hover delays. Root-wide settings ([`RootConfig`]) carry the
//! default delays and the click exclusivity switch, and can be loaded from
//! TOML or JSON at startup.
//!
//! ```toml
//! # tiptrig.toml
//! exclusive_click = false
//!
//! [policy]
//! open_delay_ms = 300
//! close_delay_ms = 300
//! ```
//!
//! ```rust,ignore
//! let config = RootConfig::from_toml_file("tiptrig.toml")?;
//! let config = RootConfig::from_json_str(json)?;
//! ```
//!
//! Every field has a default, so partial files are accepted.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound accepted for any configured delay.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Default hover open delay.
pub const DEFAULT_OPEN_DELAY_MS: u64 = 300;

/// Default hover close delay.
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 300;

// ---------------------------------------------------------------------------
// TriggerMode
// ---------------------------------------------------------------------------

/// How a trigger activates its tooltip. Fixed for the life of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    /// Pointer hover with open/close debounce.
    #[default]
    Hover,
    /// Press toggles; Escape and Alt+Arrow dismiss.
    Click,
    /// Keyboard focus shows, blur hides.
    Focus,
}

impl TriggerMode {
    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hover => "hover",
            Self::Click => "click",
            Self::Focus => "focus",
        }
    }
}

impl std::fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hover" => Ok(Self::Hover),
            "click" => Ok(Self::Click),
            "focus" => Ok(Self::Focus),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy and per-trigger config
// ---------------------------------------------------------------------------

/// Default timing applied to triggers that do not set their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TooltipPolicy {
    /// Hover delay before a tooltip opens.
    pub open_delay_ms: u64,
    /// Hover delay before an open tooltip closes.
    pub close_delay_ms: u64,
}

impl Default for TooltipPolicy {
    fn default() -> Self {
        Self {
            open_delay_ms: DEFAULT_OPEN_DELAY_MS,
            close_delay_ms: DEFAULT_CLOSE_DELAY_MS,
        }
    }
}

/// Effective delays after merging a trigger's overrides with the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    pub open: Duration,
    pub close: Duration,
}

/// Configuration accepted per trigger instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Activation mode.
    pub mode: TriggerMode,
    /// Open delay override (hover only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_delay_ms: Option<u64>,
    /// Close delay override (hover only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_delay_ms: Option<u64>,
}

impl TriggerConfig {
    /// Config for the given mode with policy delays.
    #[must_use]
    pub const fn new(mode: TriggerMode) -> Self {
        Self {
            mode,
            open_delay_ms: None,
            close_delay_ms: None,
        }
    }

    /// Hover-mode trigger.
    #[must_use]
    pub const fn hover() -> Self {
        Self::new(TriggerMode::Hover)
    }

    /// Click-mode trigger.
    #[must_use]
    pub const fn click() -> Self {
        Self::new(TriggerMode::Click)
    }

    /// Focus-mode trigger.
    #[must_use]
    pub const fn focus() -> Self {
        Self::new(TriggerMode::Focus)
    }

    /// Override the open delay.
    #[must_use]
    pub const fn with_open_delay_ms(mut self, ms: u64) -> Self {
        self.open_delay_ms = Some(ms);
        self
    }

    /// Override the close delay.
    #[must_use]
    pub const fn with_close_delay_ms(mut self, ms: u64) -> Self {
        self.close_delay_ms = Some(ms);
        self
    }

    /// Merge overrides with `policy`.
    #[must_use]
    pub fn resolve(&self, policy: &TooltipPolicy) -> Delays {
        Delays {
            open: Duration::from_millis(self.open_delay_ms.unwrap_or(policy.open_delay_ms)),
            close: Duration::from_millis(self.close_delay_ms.unwrap_or(policy.close_delay_ms)),
        }
    }

    /// Validate override ranges. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(ms) = self.open_delay_ms
            && ms > MAX_DELAY_MS
        {
            errors.push(format!("open_delay_ms must be <= {MAX_DELAY_MS}, got {ms}"));
        }
        if let Some(ms) = self.close_delay_ms
            && ms > MAX_DELAY_MS
        {
            errors.push(format!("close_delay_ms must be <= {MAX_DELAY_MS}, got {ms}"));
        }
        errors
    }

    /// Return `self` if valid, or every violation as [`ConfigError::Validation`].
    pub fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// RootConfig
// ---------------------------------------------------------------------------

/// Settings shared by every trigger under one rendering root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Default delays.
    pub policy: TooltipPolicy,
    /// When set, opening a click tooltip closes every other open click tooltip.
    pub exclusive_click: bool,
}

impl RootConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.checked()
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.checked()
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Set click exclusivity.
    #[must_use]
    pub const fn with_exclusive_click(mut self, exclusive: bool) -> Self {
        self.exclusive_click = exclusive;
        self
    }

    /// Set the default delays.
    #[must_use]
    pub const fn with_policy(mut self, policy: TooltipPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate all parameters. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.policy.open_delay_ms > MAX_DELAY_MS {
            errors.push(format!(
                "policy.open_delay_ms must be <= {MAX_DELAY_MS}, got {}",
                self.policy.open_delay_ms
            ));
        }
        if self.policy.close_delay_ms > MAX_DELAY_MS {
            errors.push(format!(
                "policy.close_delay_ms must be <= {MAX_DELAY_MS}, got {}",
                self.policy.close_delay_ms
            ));
        }
        errors
    }

    fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Unrecognised trigger mode name.
    #[error("unknown trigger mode {0:?} (expected hover, click or focus)")]
    UnknownMode(String),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RootConfig::default();
        assert_eq!(config.policy.open_delay_ms, 300);
        assert_eq!(config.policy.close_delay_ms, 300);
        assert!(!config.exclusive_click);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn empty_toml_is_default() {
        let config = RootConfig::from_toml_str("").unwrap();
        assert_eq!(config, RootConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = RootConfig::from_toml_str("[policy]\nclose_delay_ms = 150\n").unwrap();
        assert_eq!(config.policy.open_delay_ms, 300);
        assert_eq!(config.policy.close_delay_ms, 150);
    }

    #[test]
    fn json_round_trip_of_exclusive_flag() {
        let config = RootConfig::from_json_str(r#"{"exclusive_click": true}"#).unwrap();
        assert!(config.exclusive_click);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(RootConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn oversized_delay_rejected() {
        let err = RootConfig::from_toml_str("[policy]\nopen_delay_ms = 600000\n").unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("open_delay_ms"));
            }
            other => panic!("expected validation error, got {other}"),
        }
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = RootConfig::from_toml_str("exclusive_click = [").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = RootConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RootConfig::from_toml_file("/nonexistent/tiptrig.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn trigger_overrides_win_over_policy() {
        let policy = TooltipPolicy::default();
        let delays = TriggerConfig::hover().with_open_delay_ms(50).resolve(&policy);
        assert_eq!(delays.open, Duration::from_millis(50));
        assert_eq!(delays.close, Duration::from_millis(300));
    }

    #[test]
    fn trigger_validation() {
        assert!(TriggerConfig::click().validate().is_empty());
        let bad = TriggerConfig::hover()
            .with_open_delay_ms(MAX_DELAY_MS + 1)
            .with_close_delay_ms(MAX_DELAY_MS + 1);
        assert_eq!(bad.validate().len(), 2);
        assert!(matches!(bad.checked(), Err(ConfigError::Validation(ref e)) if e.len() == 2));
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("hover".parse::<TriggerMode>().unwrap(), TriggerMode::Hover);
        assert_eq!("click".parse::<TriggerMode>().unwrap(), TriggerMode::Click);
        assert_eq!("focus".parse::<TriggerMode>().unwrap(), TriggerMode::Focus);
        let err = "longpress".parse::<TriggerMode>().unwrap_err();
        assert!(err.to_string().contains("longpress"));
    }

    #[test]
    fn trigger_config_from_toml() {
        let config: TriggerConfig =
            toml::from_str("mode = \"click\"\nclose_delay_ms = 10\n").unwrap();
        assert_eq!(config.mode, TriggerMode::Click);
        assert_eq!(config.open_delay_ms, None);
        assert_eq!(config.close_delay_ms, Some(10));
    }

    #[test]
    fn validation_error_display_joins_messages() {
        let err = ConfigError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "validation errors: a; b");
    }
}
