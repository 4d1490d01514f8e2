//! Layered configuration
//!
//! Precedence, lowest first: built-in defaults, the TOML config file,
//! `TALLY_*` environment variables (a `.env` file is honoured), then
//! command-line flags.

use anyhow::Context;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tally_calc::Settings;

const ENV_PREFIX: &str = "TALLY";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliConfig {
    pub precision: usize,
    pub fuzzy: bool,
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

/// Values given on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub precision: Option<usize>,
    pub no_fuzzy: bool,
    pub quiet: bool,
    pub log_level: Option<String>,
    pub log_json: bool,
}

impl CliConfig {
    /// Load from file and environment.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => Some((path.to_path_buf(), true)),
            None => default_config_path().map(|path| (path, false)),
        };

        let mut builder = defaults().context("Failed to set configuration defaults")?;
        if let Some((path, required)) = file {
            tracing::debug!(path = %path.display(), required, "reading config file");
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(required),
            );
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize::<CliConfig>()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document layered over the defaults.
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config = defaults()?
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?
            .try_deserialize::<CliConfig>()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.precision > Settings::MAX_PRECISION {
            anyhow::bail!(
                "precision must be between 0 and {}, got {}",
                Settings::MAX_PRECISION,
                self.precision
            );
        }
        Ok(())
    }

    pub fn apply(&mut self, overrides: &Overrides) -> anyhow::Result<()> {
        if let Some(precision) = overrides.precision {
            self.precision = precision;
        }
        if overrides.no_fuzzy {
            self.fuzzy = false;
        }
        if overrides.quiet {
            self.quiet = true;
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
        if overrides.log_json {
            self.log_json = true;
        }
        self.validate()
    }

    /// Calculator settings carried by this configuration.
    pub fn settings(&self) -> Settings {
        Settings {
            precision: self.precision,
            fuzzy: self.fuzzy,
            quiet: self.quiet,
        }
    }
}

fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    let settings = Settings::default();
    Config::builder()
        .set_default("precision", settings.precision as i64)?
        .set_default("fuzzy", settings.fuzzy)?
        .set_default("quiet", settings.quiet)?
        .set_default("log_level", "warn")?
        .set_default("log_json", false)
}

/// `<config dir>/tally/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tally").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::from_toml("").unwrap();
        assert_eq!(config.settings(), Settings::default());
        assert_eq!(config.log_level, "warn");
        assert!(!config.log_json);
    }

    #[test]
    fn test_file_values() {
        let config = CliConfig::from_toml("precision = 4\nfuzzy = false\nlog_level = \"debug\"").unwrap();
        assert_eq!(config.precision, 4);
        assert!(!config.fuzzy);
        assert!(!config.quiet);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_precision_out_of_range() {
        assert!(CliConfig::from_toml("precision = 40").is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = CliConfig::from_toml("precision = 4").unwrap();
        config
            .apply(&Overrides {
                precision: Some(0),
                no_fuzzy: true,
                quiet: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(
            config.settings(),
            Settings {
                precision: 0,
                fuzzy: false,
                quiet: true
            }
        );
        assert!(config
            .apply(&Overrides {
                precision: Some(13),
                ..Default::default()
            })
            .is_err());
    }
}
