use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use building_hints_rendering::Palette;
use building_hints_system_overlay::DEFAULT_DEBOUNCE;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;
const DEFAULT_STORAGE_PATH: &str = "building_templates.json";

/// Effective settings after merging the config file with defaults.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Config {
    /// Location of the template storage file.
    pub(crate) storage: PathBuf,
    /// Quiet period applied to snapshot change notifications.
    pub(crate) debounce: Duration,
    /// Colours used for highlighted cells.
    pub(crate) palette: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: PathBuf::from(DEFAULT_STORAGE_PATH),
            debounce: DEFAULT_DEBOUNCE,
            palette: Palette::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    storage: Option<PathBuf>,
    debounce_ms: Option<u64>,
    palette: Option<Palette>,
}

impl Config {
    /// Loads the config file when a path is provided, defaults otherwise.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config file at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).context("failed to parse config toml contents")?;
        if file.version != SUPPORTED_CONFIG_VERSION {
            bail!(
                "unsupported config version {}; expected {}",
                file.version,
                SUPPORTED_CONFIG_VERSION
            );
        }

        let defaults = Self::default();
        Ok(Self {
            storage: file.storage.unwrap_or(defaults.storage),
            debounce: file
                .debounce_ms
                .map_or(defaults.debounce, Duration::from_millis),
            palette: file.palette.unwrap_or(defaults.palette),
        })
    }
}
