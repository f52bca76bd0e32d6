//! Runtime settings for the sizer.
//!
//! Load order: `~/.solar-kit-sizer/config.toml` → environment variables →
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::PanelPower;
use crate::sizing::MIN_DAILY_IRRADIATION;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".solar-kit-sizer";
const CONFIG_FILE_NAME: &str = "config.toml";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "relatorios.db";
const LOG_FILE_NAME: &str = "solar-kit.log";
const REPORTS_DIR_NAME: &str = "reports";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the config file, the log and the default database.
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub storage: StorageConfig,
    pub report: ReportConfig,
    pub defaults: FormDefaults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides `<data dir>/relatorios.db`.
    pub database_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Overrides `<data dir>/reports`.
    pub output_dir: Option<PathBuf>,
    /// Launch the system viewer after writing an HTML report.
    pub open_after_export: bool,
}

/// Values pre-filled in a fresh project form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDefaults {
    pub daily_irradiation: f64,
    pub panel_power_watts: u32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            open_after_export: true,
        }
    }
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            daily_irradiation: 5.0,
            panel_power_watts: 330,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var) {
        apply_override(var, &v, target);
    }
}

/// Parse `raw` into `target`. An unparsable value keeps the current setting
/// and is logged; returns whether the override took effect.
fn apply_override<T: std::str::FromStr>(var: &str, raw: &str, target: &mut T) -> bool {
    match raw.trim().parse() {
        Ok(value) => {
            *target = value;
            true
        }
        Err(_) => {
            warn!(var, value = raw, "ignoring unparsable environment override");
            false
        }
    }
}

impl AppConfig {
    /// Load the configuration from the user's data directory.
    pub fn load() -> Result<Self> {
        Self::load_from(&default_data_dir()?)
    }

    /// Load `config.toml` from `data_dir`, falling back to defaults when the
    /// file does not exist, then apply environment overrides.
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(CONFIG_FILE_NAME);

        let mut config: AppConfig = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };
        config.data_dir = data_dir.to_path_buf();

        if let Ok(path) = std::env::var("SOLAR_KIT_DB") {
            config.storage.database_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("SOLAR_KIT_REPORTS") {
            config.report.output_dir = Some(PathBuf::from(path));
        }
        env_override(
            "SOLAR_KIT_OPEN_REPORTS",
            &mut config.report.open_after_export,
        );

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let irradiation = self.defaults.daily_irradiation;
        if !irradiation.is_finite() || irradiation < MIN_DAILY_IRRADIATION {
            bail!("defaults.daily_irradiation ({irradiation}) must be at least {MIN_DAILY_IRRADIATION}");
        }
        PanelPower::try_from(self.defaults.panel_power_watts)
            .context("defaults.panel_power_watts is not an offered panel")?;
        Ok(())
    }

    /// Panel pre-selected in the form; validated at load time.
    pub fn default_panel(&self) -> PanelPower {
        PanelPower::try_from(self.defaults.panel_power_watts).unwrap_or_default()
    }

    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DB_FILE_NAME))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.report
            .output_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(REPORTS_DIR_NAME))
    }

    pub fn log_path(&self) -> PathBuf {
        log_path_in(&self.data_dir)
    }
}

/// Log file inside `data_dir`.
pub fn log_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE_NAME)
}

/// Create the data directory so the log file and database can be opened.
pub fn ensure_data_dir(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))
}

/// Resolve `~/.solar-kit-sizer`.
pub fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
