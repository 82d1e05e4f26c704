//! Configuration management for the branch finder
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::BranchFinderError;
use crate::branch_search::SearchSettings;
use crate::location_resolver::ResolverSettings;
use crate::models::{Coordinate, ServiceRegion};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the branch finder
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BranchFinderConfig {
    /// Place search API configuration
    #[serde(default)]
    pub places: PlacesConfig,
    /// Branch filtering and ranking
    #[serde(default)]
    pub search: SearchConfig,
    /// Device location handling
    #[serde(default)]
    pub location: LocationConfig,
    /// Serviced region bounds
    #[serde(default)]
    pub region: ServiceRegion,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Local preference storage
    #[serde(default)]
    pub preferences: PreferencesConfig,
}

/// Place search API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Places API key
    pub api_key: Option<String>,
    /// Base URL for the places API
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_places_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_places_max_retries")]
    pub max_retries: u32,
}

/// Branch search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Institution name used in the text query
    #[serde(default = "default_institution")]
    pub institution: String,
    /// Tokens that must all appear in a branch name (case-insensitive)
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
    /// Number of candidates requested from the place search
    #[serde(default = "default_max_candidates")]
    pub max_candidates: u32,
    /// Maximum number of ranked branches returned
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
}

/// Device location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Oldest acceptable cached position, in milliseconds
    #[serde(default = "default_max_cached_age_ms")]
    pub max_cached_age_ms: u64,
    /// Time allowed for a fresh position, in milliseconds
    #[serde(default = "default_fresh_timeout_ms")]
    pub fresh_timeout_ms: u64,
    #[serde(default = "default_fallback_latitude")]
    pub fallback_latitude: f64,
    #[serde(default = "default_fallback_longitude")]
    pub fallback_longitude: f64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Preference store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesConfig {
    /// Preference file location
    #[serde(default = "default_preferences_path")]
    pub path: String,
}

// Default value functions
fn default_places_base_url() -> String {
    "https://places.googleapis.com/v1".to_string()
}

fn default_places_timeout() -> u32 {
    15
}

fn default_places_max_retries() -> u32 {
    2
}

fn default_institution() -> String {
    "People's Bank".to_string()
}

fn default_keywords() -> Vec<String> {
    vec!["people".to_string(), "bank".to_string()]
}

fn default_max_candidates() -> u32 {
    30
}

fn default_result_limit() -> u32 {
    10
}

fn default_max_cached_age_ms() -> u64 {
    300_000
}

fn default_fresh_timeout_ms() -> u64 {
    10_000
}

fn default_fallback_latitude() -> f64 {
    7.8731
}

fn default_fallback_longitude() -> f64 {
    80.7718
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_preferences_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("branch-finder").join("preferences.json"))
        .unwrap_or_else(|| PathBuf::from("preferences.json"))
        .to_string_lossy()
        .into_owned()
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
            timeout_seconds: default_places_timeout(),
            max_retries: default_places_max_retries(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            institution: default_institution(),
            keywords: default_keywords(),
            max_candidates: default_max_candidates(),
            result_limit: default_result_limit(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            max_cached_age_ms: default_max_cached_age_ms(),
            fresh_timeout_ms: default_fresh_timeout_ms(),
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
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

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
        }
    }
}

impl BranchFinderConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
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

        // BRANCH_FINDER_PLACES__API_KEY -> places.api_key
        builder = builder.add_source(
            Environment::with_prefix("BRANCH_FINDER")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("search.keywords")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: BranchFinderConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("branch-finder").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.places.base_url.is_empty() {
            self.places.base_url = default_places_base_url();
        }
        if self.places.timeout_seconds == 0 {
            self.places.timeout_seconds = default_places_timeout();
        }
        if self.search.institution.trim().is_empty() {
            self.search.institution = default_institution();
        }
        self.search.keywords.retain(|k| !k.trim().is_empty());
        if self.search.keywords.is_empty() {
            self.search.keywords = default_keywords();
        }
        if self.search.max_candidates == 0 {
            self.search.max_candidates = default_max_candidates();
        }
        if self.search.result_limit == 0 {
            self.search.result_limit = default_result_limit();
        }
        if self.location.max_cached_age_ms == 0 {
            self.location.max_cached_age_ms = default_max_cached_age_ms();
        }
        if self.location.fresh_timeout_ms == 0 {
            self.location.fresh_timeout_ms = default_fresh_timeout_ms();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.preferences.path.is_empty() {
            self.preferences.path = default_preferences_path();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_region()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the places API key if one is set
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.places.api_key {
            if api_key.trim().is_empty() {
                return Err(BranchFinderError::config(
                    "Places API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() > 200 {
                return Err(BranchFinderError::config(
                    "Places API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.places.timeout_seconds > 120 {
            return Err(
                BranchFinderError::config("Places API timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.places.max_retries > 10 {
            return Err(BranchFinderError::config("Places API max retries cannot exceed 10").into());
        }

        if self.search.max_candidates > 60 {
            return Err(BranchFinderError::config("Search candidates cannot exceed 60").into());
        }

        if self.search.result_limit > self.search.max_candidates {
            return Err(BranchFinderError::config(
                "Search result limit cannot exceed the number of requested candidates",
            )
            .into());
        }

        if self.location.fresh_timeout_ms > 60_000 {
            return Err(BranchFinderError::config(
                "Fresh location timeout cannot exceed 60000 ms",
            )
            .into());
        }

        Ok(())
    }

    /// Validate region bounds and that the fallback point lies inside them
    fn validate_region(&self) -> Result<()> {
        let region = &self.region;
        if !(region.min_latitude < region.max_latitude
            && region.min_longitude < region.max_longitude)
        {
            return Err(BranchFinderError::config(
                "Region minimum bounds must be below maximum bounds",
            )
            .into());
        }

        if !region.contains_coordinate(&self.location.fallback()) {
            return Err(BranchFinderError::config(
                "Fallback location must lie inside the service region",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(BranchFinderError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(BranchFinderError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.places.base_url.starts_with("http://")
            && !self.places.base_url.starts_with("https://")
        {
            return Err(BranchFinderError::config(
                "Places API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Settings for [`crate::LocationResolver`]
    #[must_use]
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            region: self.region,
            fallback: self.location.fallback(),
            max_cached_age: Duration::from_millis(self.location.max_cached_age_ms),
            fresh_timeout: Duration::from_millis(self.location.fresh_timeout_ms),
        }
    }

    /// Settings for [`crate::BranchSearchRanker`]
    #[must_use]
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            region: self.region,
            institution: self.search.institution.clone(),
            keywords: self.search.keywords.clone(),
            max_candidates: self.search.max_candidates,
            result_limit: self.search.result_limit as usize,
        }
    }
}

impl LocationConfig {
    #[must_use]
    pub fn fallback(&self) -> Coordinate {
        Coordinate::new(self.fallback_latitude, self.fallback_longitude)
    }
}
