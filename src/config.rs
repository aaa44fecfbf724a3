use std::path::Path;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::parser::labels::SectionKind;
use crate::parser::validate::NumeralPolicy;

const DEFAULT_CONFIG_FILE: &str = "recipe_scraper.toml";
const ENV_PREFIX: &str = "RECIPE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub labels: LabelSettings,
    pub extract: ExtractSettings,
    pub fetch: FetchSettings,
}

/// Section headings recognised per kind, compared case-insensitively.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl Default for LabelSettings {
    fn default() -> Self {
        LabelSettings {
            ingredients: vec!["ingredients".into()],
            instructions: vec!["instructions".into(), "directions".into()],
        }
    }
}

impl LabelSettings {
    pub fn for_kind(&self, kind: SectionKind) -> &[String] {
        match kind {
            SectionKind::Ingredients => &self.ingredients,
            SectionKind::Instructions => &self.instructions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractSettings {
    /// Tags whose whole subtree is skipped when reading item text.
    pub excluded_tags: Vec<String>,
    pub numerals: NumeralPolicy,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        ExtractSettings {
            excluded_tags: vec!["noscript".into(), "figcaption".into()],
            numerals: NumeralPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub concurrency: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            concurrency: 4,
            timeout_secs: 30,
            max_retries: 2,
            user_agent: concat!("recipe_scraper/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// Defaults, then the TOML file (explicit path, or `recipe_scraper.toml`
/// if present), then `RECIPE_*` environment variables.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let file = match path {
        Some(p) => File::from(p).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    let builder = Config::builder()
        .add_source(file)
        .add_source(env_source());
    from_builder(builder)
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("labels.ingredients")
        .with_list_parse_key("labels.instructions")
        .with_list_parse_key("extract.excluded_tags")
}

fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder
        .build()
        .context("failed to read configuration")?
        .try_deserialize()
        .context("invalid configuration")?;
    if settings.fetch.concurrency == 0 {
        anyhow::bail!("fetch.concurrency must be at least 1");
    }
    Ok(settings)
}
