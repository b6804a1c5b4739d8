//! Configuration management for the `TripPlanner` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripPlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripPlanner` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripPlannerConfig {
    /// OpenStreetMap service endpoints and HTTP settings
    pub services: ServicesConfig,
    /// Cost estimation settings
    pub costs: CostsConfig,
    /// Point of interest search settings
    pub poi: PoiConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Output file settings
    pub output: OutputConfig,
}

/// External service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Base URL of the Nominatim geocoder
    pub nominatim_url: String,
    /// Base URL of the OSRM router
    pub osrm_url: String,
    /// Overpass interpreter endpoint
    pub overpass_url: String,
    /// User agent sent with every request (Nominatim rejects anonymous clients)
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
}

/// Cost estimation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CostsConfig {
    /// Average fuel price in USD per gallon
    pub fuel_price_per_gallon: f64,
}

/// Point of interest search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiConfig {
    /// Search radius around each sampled route point, in meters
    pub search_radius_m: u32,
    /// Number of route points sampled for the search
    pub max_samples: usize,
    /// Server-side Overpass timeout in seconds
    pub overpass_timeout_seconds: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether geocoding and routing responses are cached
    pub enabled: bool,
    /// Cache TTL in hours
    pub ttl_hours: u32,
    /// Cache directory location
    pub location: String,
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

/// Output file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the map and itinerary files are written to
    pub directory: String,
}

// Default value functions
fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_osrm_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_user_agent() -> String {
    format!("TripPlanner/{}", crate::VERSION)
}

fn default_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_fuel_price() -> f64 {
    3.5
}

fn default_search_radius() -> u32 {
    5000
}

fn default_max_samples() -> usize {
    5
}

fn default_overpass_timeout() -> u32 {
    25
}

fn default_cache_ttl() -> u32 {
    24 * 7
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("tripplanner").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".tripplanner-cache".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_output_directory() -> String {
    ".".to_string()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            osrm_url: default_osrm_url(),
            overpass_url: default_overpass_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for CostsConfig {
    fn default() -> Self {
        Self {
            fuel_price_per_gallon: default_fuel_price(),
        }
    }
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            search_radius_m: default_search_radius(),
            max_samples: default_max_samples(),
            overpass_timeout_seconds: default_overpass_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
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

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

impl TripPlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path.
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(TripPlannerError::config(format!(
                    "Config file {} does not exist",
                    path.display()
                ))
                .into());
            }
            Some(path) => Some(path),
            None => Some(
                Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml")),
            )
            .filter(|path| path.exists()),
        };

        if let Some(config_file) = config_file {
            builder = builder.add_source(
                File::from(config_file)
                    .required(true)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPPLANNER_SERVICES__OSRM_URL=... style overrides
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripPlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplanner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.services.nominatim_url.is_empty() {
            self.services.nominatim_url = default_nominatim_url();
        }
        if self.services.osrm_url.is_empty() {
            self.services.osrm_url = default_osrm_url();
        }
        if self.services.overpass_url.is_empty() {
            self.services.overpass_url = default_overpass_url();
        }
        if self.services.user_agent.is_empty() {
            self.services.user_agent = default_user_agent();
        }
        if self.services.timeout_seconds == 0 {
            self.services.timeout_seconds = default_timeout();
        }
        if self.costs.fuel_price_per_gallon <= 0.0 {
            self.costs.fuel_price_per_gallon = default_fuel_price();
        }
        if self.poi.search_radius_m == 0 {
            self.poi.search_radius_m = default_search_radius();
        }
        if self.poi.max_samples == 0 {
            self.poi.max_samples = default_max_samples();
        }
        if self.poi.overpass_timeout_seconds == 0 {
            self.poi.overpass_timeout_seconds = default_overpass_timeout();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.output.directory.is_empty() {
            self.output.directory = default_output_directory();
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
        if self.services.timeout_seconds > 300 {
            return Err(
                TripPlannerError::config("Service timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.services.max_retries > 10 {
            return Err(TripPlannerError::config("Service max retries cannot exceed 10").into());
        }

        if self.cache.ttl_hours > 24 * 90 {
            return Err(
                TripPlannerError::config("Cache TTL cannot exceed 2160 hours (90 days)").into(),
            );
        }

        if self.poi.search_radius_m > 50_000 {
            return Err(TripPlannerError::config("POI search radius cannot exceed 50000 m").into());
        }

        if self.poi.max_samples > 25 {
            return Err(
                TripPlannerError::config("POI route samples cannot exceed 25").into(),
            );
        }

        if !self.costs.fuel_price_per_gallon.is_finite() {
            return Err(TripPlannerError::config("Fuel price must be a finite number").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Nominatim", &self.services.nominatim_url),
            ("OSRM", &self.services.osrm_url),
            ("Overpass", &self.services.overpass_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripPlannerError::config(format!(
                    "{name} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TripPlannerConfig::default();
        assert_eq!(
            config.services.nominatim_url,
            "https://nominatim.openstreetmap.org"
        );
        assert_eq!(config.services.osrm_url, "https://router.project-osrm.org");
        assert_eq!(config.costs.fuel_price_per_gallon, 3.5);
        assert_eq!(config.poi.search_radius_m, 5000);
        assert_eq!(config.poi.max_samples, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripPlannerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripPlannerConfig::default();
        config.services.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = TripPlannerConfig::default();
        config.services.osrm_url = "router.project-osrm.org".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("OSRM URL"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = TripPlannerConfig::default();
        config.services.overpass_url.clear();
        config.costs.fuel_price_per_gallon = 0.0;
        config.poi.max_samples = 0;
        config.apply_defaults();
        assert_eq!(
            config.services.overpass_url,
            "https://overpass-api.de/api/interpreter"
        );
        assert_eq!(config.costs.fuel_price_per_gallon, 3.5);
        assert_eq!(config.poi.max_samples, 5);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[costs]\nfuel_price_per_gallon = 4.25\n\n[poi]\nsearch_radius_m = 2000\n"
        )
        .unwrap();

        let config = TripPlannerConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.costs.fuel_price_per_gallon, 4.25);
        assert_eq!(config.poi.search_radius_m, 2000);
        // untouched sections keep their defaults
        assert_eq!(config.poi.max_samples, 5);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = TripPlannerConfig::load_from_path(Some(missing)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TripPlannerError>(),
            Some(TripPlannerError::Config { .. })
        ));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_config_path_generation() {
        let path = TripPlannerConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("tripplanner"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
