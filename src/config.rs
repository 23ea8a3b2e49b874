//! Configuration management for the `dishcast` service
//!
//! Handles loading configuration from files and environment variables,
//! resolving the credentials of the external collaborators, and validating
//! all settings before the server starts.

use crate::DishcastError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable holding the completion endpoint key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the business directory key
pub const YELP_API_KEY_VAR: &str = "YELP_API_KEY";
/// Environment variable holding the places key
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Root configuration structure for the `dishcast` service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DishcastConfig {
    /// API keys of the external collaborators
    pub credentials: CredentialsConfig,
    /// Text-completion endpoint settings
    pub llm: LlmConfig,
    /// Business directory search settings
    pub directory: DirectoryConfig,
    /// Place details / review settings
    pub places: PlacesConfig,
    /// Search-interest trend settings
    pub trends: TrendsConfig,
    /// Optional translation/trend cache
    pub cache: CacheConfig,
    /// HTTP server settings
    pub web: WebConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Credentials as configured; unset values fall back to the plain
/// `OPENAI_API_KEY` / `YELP_API_KEY` / `GOOGLE_API_KEY` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub openai_api_key: Option<String>,
    pub yelp_api_key: Option<String>,
    pub google_api_key: Option<String>,
}

/// Credentials that are known to be present
#[derive(Debug, Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub yelp_api_key: String,
    pub google_api_key: String,
}

/// Text-completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Business directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub base_url: String,
    /// Search term sent with every directory query
    pub term: String,
    /// Maximum number of listings requested
    pub limit: u32,
    pub timeout_seconds: u32,
}

/// Place search and details configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub base_url: String,
    /// Number of listings whose reviews are fetched
    pub max_listings: u32,
    /// Number of reviews kept per listing
    pub max_reviews_per_listing: u32,
    pub timeout_seconds: u32,
}

/// Search-interest trend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendsConfig {
    pub base_url: String,
    /// Home page fetched once per client for the session cookie
    pub home_url: String,
    /// Region code for the interest series (ISO 3166-1 alpha-2)
    pub region: String,
    /// Trend timeframe expression
    pub timeframe: String,
    /// Host language sent to the trends service
    pub language: String,
    /// Timezone offset in minutes sent to the trends service
    pub timezone_offset: i32,
    /// Dish names scored for every request
    pub candidates: Vec<String>,
    pub timeout_seconds: u32,
}

/// Bounded cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether translations and trend scores are cached between requests
    pub enabled: bool,
    /// Maximum number of entries kept
    pub capacity: u32,
    /// Entry time-to-live in minutes
    pub ttl_minutes: u32,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_llm_timeout() -> u32 {
    60
}

fn default_directory_base_url() -> String {
    "https://api.yelp.com/v3".to_string()
}

fn default_directory_term() -> String {
    "restaurants".to_string()
}

fn default_directory_limit() -> u32 {
    20
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api/place".to_string()
}

fn default_places_max_listings() -> u32 {
    3
}

fn default_places_max_reviews() -> u32 {
    5
}

fn default_trends_base_url() -> String {
    "https://trends.google.com/trends/api".to_string()
}

fn default_trends_home_url() -> String {
    "https://trends.google.com/".to_string()
}

fn default_trends_region() -> String {
    "US".to_string()
}

fn default_trends_timeframe() -> String {
    "today 12-m".to_string()
}

fn default_trends_language() -> String {
    "en-US".to_string()
}

fn default_trends_timezone_offset() -> i32 {
    360
}

fn default_trend_candidates() -> Vec<String> {
    vec!["麻辣烫".to_string(), "云吞面".to_string(), "冰粉".to_string()]
}

fn default_http_timeout() -> u32 {
    30
}

fn default_cache_capacity() -> u32 {
    256
}

fn default_cache_ttl() -> u32 {
    60
}

fn default_web_host() -> String {
    "0.0.0.0".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_seconds: default_llm_timeout(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_base_url(),
            term: default_directory_term(),
            limit: default_directory_limit(),
            timeout_seconds: default_http_timeout(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: default_places_base_url(),
            max_listings: default_places_max_listings(),
            max_reviews_per_listing: default_places_max_reviews(),
            timeout_seconds: default_http_timeout(),
        }
    }
}

impl Default for TrendsConfig {
    fn default() -> Self {
        Self {
            base_url: default_trends_base_url(),
            home_url: default_trends_home_url(),
            region: default_trends_region(),
            timeframe: default_trends_timeframe(),
            language: default_trends_language(),
            timezone_offset: default_trends_timezone_offset(),
            candidates: default_trend_candidates(),
            timeout_seconds: default_http_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: default_cache_capacity(),
            ttl_minutes: default_cache_ttl(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl DishcastConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // DISHCAST_WEB__PORT=9000 overrides web.port
        builder = builder.add_source(
            Environment::with_prefix("DISHCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: DishcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.credentials.fill_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dishcast").join("config.toml"))
    }

    /// Apply default values to empty or zeroed configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.timeout_seconds == 0 {
            self.llm.timeout_seconds = default_llm_timeout();
        }
        if self.directory.base_url.is_empty() {
            self.directory.base_url = default_directory_base_url();
        }
        if self.directory.term.is_empty() {
            self.directory.term = default_directory_term();
        }
        if self.directory.limit == 0 {
            self.directory.limit = default_directory_limit();
        }
        if self.directory.timeout_seconds == 0 {
            self.directory.timeout_seconds = default_http_timeout();
        }
        if self.places.base_url.is_empty() {
            self.places.base_url = default_places_base_url();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_http_timeout();
        }
        if self.trends.base_url.is_empty() {
            self.trends.base_url = default_trends_base_url();
        }
        if self.trends.home_url.is_empty() {
            self.trends.home_url = default_trends_home_url();
        }
        if self.trends.region.is_empty() {
            self.trends.region = default_trends_region();
        }
        if self.trends.timeframe.is_empty() {
            self.trends.timeframe = default_trends_timeframe();
        }
        if self.trends.language.is_empty() {
            self.trends.language = default_trends_language();
        }
        if self.trends.candidates.is_empty() {
            self.trends.candidates = default_trend_candidates();
        }
        if self.trends.timeout_seconds == 0 {
            self.trends.timeout_seconds = default_http_timeout();
        }
        if self.cache.capacity == 0 {
            self.cache.capacity = default_cache_capacity();
        }
        if self.cache.ttl_minutes == 0 {
            self.cache.ttl_minutes = default_cache_ttl();
        }
        if self.web.host.is_empty() {
            self.web.host = default_web_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("llm", self.llm.timeout_seconds),
            ("directory", self.directory.timeout_seconds),
            ("places", self.places.timeout_seconds),
            ("trends", self.trends.timeout_seconds),
        ];
        for (section, timeout) in timeouts {
            if timeout > 300 {
                return Err(DishcastError::config(format!(
                    "{section} timeout cannot exceed 300 seconds"
                ))
                .into());
            }
        }

        if self.directory.limit > 50 {
            return Err(DishcastError::config("Directory limit cannot exceed 50").into());
        }

        if self.places.max_listings > 10 {
            return Err(
                DishcastError::config("Places max_listings cannot exceed 10").into(),
            );
        }

        if self.places.max_reviews_per_listing > 20 {
            return Err(DishcastError::config(
                "Places max_reviews_per_listing cannot exceed 20",
            )
            .into());
        }

        if self.cache.ttl_minutes > 7 * 24 * 60 {
            return Err(DishcastError::config("Cache TTL cannot exceed one week").into());
        }

        if self.cache.capacity > 100_000 {
            return Err(DishcastError::config("Cache capacity cannot exceed 100000").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(DishcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(DishcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("llm", &self.llm.base_url),
            ("directory", &self.directory.base_url),
            ("places", &self.places.base_url),
            ("trends", &self.trends.base_url),
            ("trends home", &self.trends.home_url),
        ];
        for (section, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DishcastError::config(format!(
                    "{section} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.trends.region.len() != 2 {
            return Err(DishcastError::config(
                "Trends region must be a two-letter country code",
            )
            .into());
        }

        Ok(())
    }
}

impl CredentialsConfig {
    /// Fill unset keys from the conventional environment variables
    pub fn fill_from_env(&mut self) {
        fill(&mut self.openai_api_key, OPENAI_API_KEY_VAR);
        fill(&mut self.yelp_api_key, YELP_API_KEY_VAR);
        fill(&mut self.google_api_key, GOOGLE_API_KEY_VAR);
    }

    /// Resolve every credential, or fail naming all the missing ones
    pub fn require(&self) -> crate::Result<Credentials> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let openai = present(&self.openai_api_key);
        let yelp = present(&self.yelp_api_key);
        let google = present(&self.google_api_key);

        match (openai, yelp, google) {
            (Some(openai_api_key), Some(yelp_api_key), Some(google_api_key)) => Ok(Credentials {
                openai_api_key,
                yelp_api_key,
                google_api_key,
            }),
            (openai, yelp, google) => {
                let missing: Vec<&str> = [
                    (openai.is_none(), OPENAI_API_KEY_VAR),
                    (yelp.is_none(), YELP_API_KEY_VAR),
                    (google.is_none(), GOOGLE_API_KEY_VAR),
                ]
                .into_iter()
                .filter_map(|(missing, name)| missing.then_some(name))
                .collect();
                Err(DishcastError::config(format!(
                    "Please set {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

fn fill(slot: &mut Option<String>, var: &str) {
    if slot.is_none() {
        *slot = env::var(var).ok();
    }
}
