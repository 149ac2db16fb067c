//! Error types for the log shipper

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShipperError>;

#[derive(Debug, Error)]
pub enum ShipperError {
    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Endpoint answered with a non-success status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Background worker could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShipperError::Config("max_batch_size must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: max_batch_size must be greater than 0"
        );

        let err = ShipperError::Transport("status 500".to_string());
        assert_eq!(err.to_string(), "Transport error: status 500");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ShipperError = json_err.into();
        assert!(matches!(err, ShipperError::Json(_)));
    }
}
