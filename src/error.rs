//! Error types and handling for the `TripPlanner` application

use thiserror::Error;

/// Main error type for the `TripPlanner` application
#[derive(Error, Debug)]
pub enum TripPlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// An address that the geocoder could not resolve
    #[error("Unable to geocode address: {address}")]
    Geocoding { address: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripPlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new geocoding error for an unresolved address
    pub fn geocoding<S: Into<String>>(address: S) -> Self {
        Self::Geocoding {
            address: address.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripPlannerError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TripPlannerError::Api { .. } => {
                "Unable to reach the map services. Please check your internet connection."
                    .to_string()
            }
            TripPlannerError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripPlannerError::Geocoding { address } => {
                format!("Could not find '{address}'. Try a more specific address.")
            }
            TripPlannerError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            TripPlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
