use crate::constants::*;
use crate::error::{PrepError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Every knob a job needs. Defaults reproduce the layout the data files have
/// always been prepared with; a TOML file only needs to name what differs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub icons: IconConfig,
    pub actions: ActionSourceConfig,
    pub statuses: StatusSourceConfig,
    pub triggers: TriggerConfig,
    pub catalog: CatalogConfig,
    pub recompile: RecompileConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub cache_dir: PathBuf,
    /// `{bucket}` and `{id}` are substituted zero-padded to six digits.
    pub url_template: String,
    pub extension: String,
    /// Path prefix written into records, e.g. `/icons/2001.png`.
    pub public_prefix: String,
    pub fetch_delay_ms: u64,
}

impl IconConfig {
    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(ICON_CACHE_DIR),
            url_template: ICON_URL_TEMPLATE.to_string(),
            extension: ICON_EXTENSION.to_string(),
            public_prefix: ICON_PUBLIC_PREFIX.to_string(),
            fetch_delay_ms: ICON_FETCH_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActionSourceConfig {
    pub input: PathBuf,
    pub descriptions: PathBuf,
    pub output: PathBuf,
    pub columns: ActionColumns,
    pub description_columns: DescriptionColumns,
}

impl Default for ActionSourceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("action.csv"),
            descriptions: PathBuf::from("action_desc.csv"),
            output: PathBuf::from("actions.json"),
            columns: ActionColumns::default(),
            description_columns: DescriptionColumns::default(),
        }
    }
}

/// Positions in the action export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActionColumns {
    pub id: usize,
    pub name: usize,
    pub icon: usize,
    pub cast: usize,
    pub recast: usize,
}

impl Default for ActionColumns {
    fn default() -> Self {
        Self {
            id: 0,
            name: 1,
            icon: 3,
            cast: 38,
            recast: 39,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DescriptionColumns {
    pub id: usize,
    pub text: usize,
}

impl Default for DescriptionColumns {
    fn default() -> Self {
        Self { id: 0, text: 1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusSourceConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Leading rows dropped before any other filtering.
    pub header_rows: usize,
    pub truthy: String,
    pub columns: StatusColumns,
}

impl Default for StatusSourceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("status.csv"),
            output: PathBuf::from("status_effects.json"),
            header_rows: STATUS_HEADER_ROWS,
            truthy: TRUTHY_LITERAL.to_string(),
            columns: StatusColumns::default(),
        }
    }
}

/// Positions in the status export.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatusColumns {
    pub id: usize,
    pub name: usize,
    pub description: usize,
    pub icon: usize,
    pub max_stacks: usize,
    pub category: usize,
    pub hit_effect: usize,
    pub vfx: usize,
    pub lock_movement: usize,
    pub lock_actions: usize,
    pub lock_control: usize,
    pub transfiguration: usize,
    pub can_dispel: usize,
    pub inflicted_by_actor: usize,
    pub is_permanent: usize,
    pub is_fc_buff: usize,
    pub invisibility: usize,
}

impl Default for StatusColumns {
    fn default() -> Self {
        Self {
            id: 0,
            name: 1,
            description: 2,
            icon: 3,
            max_stacks: 4,
            category: 5,
            hit_effect: 6,
            vfx: 7,
            lock_movement: 8,
            lock_actions: 10,
            lock_control: 11,
            transfiguration: 12,
            can_dispel: 14,
            inflicted_by_actor: 15,
            is_permanent: 16,
            is_fc_buff: 22,
            invisibility: 23,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub source_dir: PathBuf,
    pub extension: String,
    pub output: PathBuf,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("cactbot/ui/raidboss/data/triggers"),
            extension: "js".to_string(),
            output: PathBuf::from("static/data/cactbot.triggers.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_url: String,
    pub icon_url_template: String,
    pub output: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: CATALOG_API_URL.to_string(),
            icon_url_template: CATALOG_ICON_URL_TEMPLATE.to_string(),
            output: PathBuf::from("actions_full.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecompileConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub data_dir: PathBuf,
    /// Keys copied from each catalog entry into the compact index.
    pub keys: Vec<String>,
}

impl Default for RecompileConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("actions_full.json"),
            output: PathBuf::from("actions.json"),
            data_dir: PathBuf::from("data"),
            keys: vec!["name_en".to_string(), "help_en".to_string()],
        }
    }
}

impl Config {
    /// Load from an explicit path, or from `xivprep.toml` when it exists, or
    /// fall back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default_path.exists() {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let config_content = fs::read_to_string(&config_path).map_err(|e| {
            PrepError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        info!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for template in [&self.icons.url_template, &self.catalog.icon_url_template] {
            if !template.contains("{id}") {
                return Err(PrepError::Config(format!(
                    "icon url template '{}' has no {{id}} placeholder",
                    template
                )));
            }
        }
        if self.triggers.extension.is_empty() {
            return Err(PrepError::Config("trigger extension must not be empty".into()));
        }
        Ok(())
    }
}
