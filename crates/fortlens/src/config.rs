//! Configuration schema for fortlens
//!
//! Config lives at `.config/fortlens/config.yaml` relative to the working
//! directory. Every field is optional:
//!
//! ```yaml
//! ignore: [557, 675]
//! legacy: false
//! strict: false
//! debug_copy: build/forcheck_listfile.debug
//! verbosity: verbose
//! ```

use eyre::{Result, WrapErr};
use facet::Facet;
use std::path::Path;

/// Config location relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/fortlens/config.yaml";

/// How much the CLI logs to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Facet)]
#[facet(rename_all = "lowercase")]
#[repr(u8)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings, including parse anomalies
    #[default]
    Normal,
    /// Progress through the listfile
    Verbose,
    /// Every decoded inconsistency as it is found
    Debug,
}

impl Verbosity {
    /// `EnvFilter` directive for this level.
    pub fn filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Debug => "debug",
        }
    }
}

/// Root configuration for fortlens
#[derive(Debug, Clone, Default, Facet)]
pub struct Config {
    /// Numeric event codes to drop, whatever their severity
    #[facet(default)]
    pub ignore: Vec<u32>,

    /// Read listfiles written by Forcheck releases before 14.1
    #[facet(default)]
    pub legacy: bool,

    /// Fail on file events without a location tag
    #[facet(default)]
    pub strict: bool,

    /// Where to keep the raw listfile when the parse raises an anomaly
    #[facet(default)]
    pub debug_copy: Option<String>,

    #[facet(default)]
    pub verbosity: Option<Verbosity>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        eyre::bail!(
            "Config file not found at {}\n\n\
             Create a config file, for example:\n\n\
             ignore: [557, 675]\n\
             verbosity: verbose",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = facet_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Load config if it exists, otherwise return the default config.
///
/// A config file that exists but cannot be parsed is still an error.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(&dir.path().join("config.yaml")).unwrap();
        assert!(config.ignore.is_empty());
        assert!(!config.legacy);
        assert!(!config.strict);
        assert_eq!(config.debug_copy, None);
        assert_eq!(config.verbosity, None);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("config.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn reads_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "ignore: [557, 675]\nlegacy: true\nstrict: true\ndebug_copy: keep.debug\nverbosity: debug\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.ignore, [557, 675]);
        assert!(config.legacy);
        assert!(config.strict);
        assert_eq!(config.debug_copy.as_deref(), Some("keep.debug"));
        assert_eq!(config.verbosity, Some(Verbosity::Debug));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "ignore: [1]\n").unwrap();

        let config = load_config_or_default(&path).unwrap();
        assert_eq!(config.ignore, [1]);
        assert!(!config.legacy);
        assert_eq!(config.verbosity, None);
    }

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(Verbosity::default().filter(), "warn");
        assert_eq!(Verbosity::Quiet.filter(), "error");
        assert_eq!(Verbosity::Debug.filter(), "debug");
    }
}
