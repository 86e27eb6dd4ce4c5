use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::matcher::ScoringWeights;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Recipe site scraping settings
    #[serde(default)]
    pub site: SiteConfig,
    /// Nutrition calculation settings
    #[serde(default)]
    pub nutrition: NutritionConfig,
    /// Ingredient matcher scoring constants
    #[serde(default)]
    pub matcher: ScoringWeights,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Configuration for the remote recipe site
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Base URL recipe and search paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum number of search results returned
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_results: default_max_results(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Configuration for nutrition aggregation
#[derive(Debug, Deserialize, Clone)]
pub struct NutritionConfig {
    /// CSV file with nutrient values per 100 g
    pub products_path: Option<PathBuf>,
    /// JSON file used to persist recipes and nutrition results
    pub store_path: Option<PathBuf>,
    /// Maximum number of candidates a product search returns
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// Maximum number of ingredient lookups in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            products_path: None,
            store_path: None,
            search_limit: default_search_limit(),
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "https://www.tudogostoso.com.br".to_string()
}

fn default_max_results() -> usize {
    5
}

fn default_timeout() -> u64 {
    30
}

fn default_search_limit() -> usize {
    20
}

fn default_concurrency() -> usize {
    8
}

fn default_bind() -> String {
    "0.0.0.0:4000".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECEITAS__ prefix
    /// 2. receitas.toml file in current directory (or the given path)
    /// 3. Default values
    ///
    /// Environment variable format: RECEITAS__NUTRITION__PRODUCTS_PATH
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        load_config(path)
    }
}

/// Load configuration from an optional file and environment variables
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => File::with_name(path).required(true),
        None => File::with_name("receitas").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore for nested: RECEITAS__SITE__BASE_URL
        .add_source(
            Environment::with_prefix("RECEITAS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
