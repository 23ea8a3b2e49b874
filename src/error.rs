//! Error types and handling for the `dishcast` service

use thiserror::Error;

/// Main error type for the `dishcast` service
#[derive(Error, Debug)]
pub enum DishcastError {
    /// Configuration-related errors, including missing credentials
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// External API communication errors
    #[error("API error ({service}): {message}")]
    Api { service: String, message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A response arrived but could not be understood
    #[error("Parse error ({service}): {message}")]
    Parse { service: String, message: String },

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

impl DishcastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error for the named external service
    pub fn api<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Api {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new parse error for the named external service
    pub fn parse<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::Parse {
            service: service.into(),
            message: message.into(),
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
            DishcastError::Config { message } => {
                format!("Configuration error: {message}")
            }
            DishcastError::Api { service, .. } => {
                format!("Unable to reach {service}. Please try again later.")
            }
            DishcastError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            DishcastError::Parse { service, .. } => {
                format!("Received an unexpected response from {service}.")
            }
            DishcastError::Cache { .. } => "Cache operation failed.".to_string(),
            DishcastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for DishcastError {
    fn from(err: reqwest::Error) -> Self {
        let service = err
            .url()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "external service".to_string());
        // Query strings may carry API keys
        DishcastError::api(service, err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = DishcastError::config("missing OPENAI_API_KEY");
        assert!(matches!(config_err, DishcastError::Config { .. }));

        let api_err = DishcastError::api("yelp", "connection failed");
        assert!(matches!(api_err, DishcastError::Api { .. }));

        let validation_err = DishcastError::validation("empty request");
        assert!(matches!(validation_err, DishcastError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = DishcastError::config("set YELP_API_KEY");
        assert!(config_err.user_message().contains("YELP_API_KEY"));

        let api_err = DishcastError::api("google places", "timeout");
        assert!(api_err.user_message().contains("Unable to reach google places"));

        let validation_err = DishcastError::validation("please enter a location");
        assert!(validation_err.user_message().contains("please enter a location"));
    }

    #[test]
    fn test_display_includes_service() {
        let err = DishcastError::parse("openai", "missing choices");
        assert_eq!(err.to_string(), "Parse error (openai): missing choices");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DishcastError = io_err.into();
        assert!(matches!(err, DishcastError::Io { .. }));
    }
}
