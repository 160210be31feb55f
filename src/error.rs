//! Error types for the SINMAM monitoring service
//!
//! Empty data is never an error here: absent readings surface as `None`
//! from the aggregation functions. Errors only cover input that must not
//! reach the store and failures of the surrounding service.

use thiserror::Error;

/// Main error type for SINMAM operations
#[derive(Error, Debug)]
pub enum SinmamError {
    /// Reading values outside their physiological domain
    #[error("Invalid reading: {0}")]
    InvalidReading(String),

    /// Malformed query parameters (limit, since)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl SinmamError {
    /// True for errors caused by caller-supplied data
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SinmamError::InvalidReading(_) | SinmamError::InvalidQuery(_)
        )
    }
}

/// Result type alias for SINMAM operations
pub type Result<T> = std::result::Result<T, SinmamError>;

/// Convert anyhow::Error to SinmamError
impl From<anyhow::Error> for SinmamError {
    fn from(err: anyhow::Error) -> Self {
        SinmamError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SinmamError::InvalidReading("Heart rate cannot be less than 30 BPM".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid reading: Heart rate cannot be less than 30 BPM"
        );
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ not json");
        assert!(json_err.is_err());

        let err: SinmamError = json_err.unwrap_err().into();
        assert!(matches!(err, SinmamError::Serialization(_)));
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_client_errors() {
        assert!(SinmamError::InvalidQuery("limit".into()).is_client_error());
        assert!(!SinmamError::Other("boom".into()).is_client_error());
    }
}
