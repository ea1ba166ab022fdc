//! `blindedpath` configuration file.
//!
//! ```toml
//! [logging]
//! level = "warn"     # or a full filter directive, e.g. "shroud_sphinx=debug"
//! ansi = false
//!
//! [create]
//! session_key = "random"   # "fixed" needs a fixed-seed build
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SHROUD_CONFIG";

/// Complete tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub create: CreateConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for the `shroud` crates, or a full filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Colored output on stderr.
    #[serde(default)]
    pub ansi: bool,
}

/// Settings for `create`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateConfig {
    #[serde(default)]
    pub session_key: SessionKeyMode,
}

/// Where `create` gets the path's session key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKeyMode {
    /// Fresh from the OS RNG.
    #[default]
    Random,
    /// The fixed test key.
    Fixed,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            ansi: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directive for the subscriber.
    pub fn directive(&self) -> String {
        if self.level.contains('=') {
            self.level.clone()
        } else {
            format!("shroud={}", self.level)
        }
    }
}

impl ToolConfig {
    /// Load from `explicit`, else `$SHROUD_CONFIG`, else the default location.
    ///
    /// An explicitly named file must exist; a missing default file means
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let home = std::env::var_os("HOME").map(PathBuf::from);
        match resolve_path(explicit, env_path, home) {
            ConfigPath::Required(path) => Self::from_file(&path),
            ConfigPath::Optional(path) if path.exists() => Self::from_file(&path),
            ConfigPath::Optional(_) | ConfigPath::None => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ConfigPath {
    Required(PathBuf),
    Optional(PathBuf),
    None,
}

fn resolve_path(explicit: Option<&Path>, env_path: Option<PathBuf>, home: Option<PathBuf>) -> ConfigPath {
    if let Some(path) = explicit {
        return ConfigPath::Required(path.to_path_buf());
    }
    if let Some(path) = env_path {
        return ConfigPath::Required(path);
    }
    match home {
        Some(home) => ConfigPath::Optional(home.join(".shroud").join("blindedpath.toml")),
        None => ConfigPath::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ToolConfig::default();
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.ansi);
        assert_eq!(config.create.session_key, SessionKeyMode::Random);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ToolConfig = toml::from_str("[create]\nsession_key = \"fixed\"\n").expect("parse");
        assert_eq!(config.create.session_key, SessionKeyMode::Fixed);
        assert_eq!(config.logging, LoggingConfig::default());

        let empty: ToolConfig = toml::from_str("").expect("parse");
        assert_eq!(empty, ToolConfig::default());
    }

    #[test]
    fn test_unknown_session_key_mode_rejected() {
        assert!(toml::from_str::<ToolConfig>("[create]\nsession_key = \"dice\"\n").is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = ToolConfig::default();
        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed: ToolConfig = toml::from_str(&toml_str).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_directive() {
        let mut logging = LoggingConfig::default();
        assert_eq!(logging.directive(), "shroud=warn");
        logging.level = "shroud_sphinx=trace".into();
        assert_eq!(logging.directive(), "shroud_sphinx=trace");
    }

    #[test]
    fn test_path_precedence() {
        let explicit = PathBuf::from("/etc/a.toml");
        let env = PathBuf::from("/etc/b.toml");
        let home = PathBuf::from("/home/u");
        assert_eq!(
            resolve_path(Some(&explicit), Some(env.clone()), Some(home.clone())),
            ConfigPath::Required(explicit)
        );
        assert_eq!(
            resolve_path(None, Some(env.clone()), Some(home.clone())),
            ConfigPath::Required(env)
        );
        assert_eq!(
            resolve_path(None, None, Some(home)),
            ConfigPath::Optional(PathBuf::from("/home/u/.shroud/blindedpath.toml"))
        );
        assert_eq!(resolve_path(None, None, None), ConfigPath::None);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        assert!(ToolConfig::load(Some(Path::new("/nonexistent/blindedpath.toml"))).is_err());
    }
}
