use thiserror::Error;

/// Result type alias for egress policy operations
pub type Result<T> = std::result::Result<T, EgressError>;

/// Errors that can occur when building or evaluating an egress policy
#[derive(Error, Debug)]
pub enum EgressError {
    /// Policy or engine configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Address block could not be parsed
    #[error("invalid CIDR: {0}")]
    InvalidCidr(String),

    /// Port specification is out of range or malformed
    #[error("invalid port: {0}")]
    InvalidPort(String),

    /// Unknown address family selector
    #[error("invalid network type: {0}")]
    InvalidNetworkType(String),

    /// Reading or writing persisted state failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EgressError {
    /// Returns true if the error stems from invalid configuration
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::InvalidPort(_) | Self::InvalidNetworkType(_)
        )
    }

    /// Shorthand for building a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_flagged() {
        assert!(EgressError::config("bad").is_config_error());
        assert!(EgressError::InvalidPort("0".into()).is_config_error());
        assert!(!EgressError::InvalidCidr("x".into()).is_config_error());
    }

    #[test]
    fn test_display() {
        let err = EgressError::config("maxConcurrent must be greater than zero");
        assert_eq!(
            err.to_string(),
            "configuration error: maxConcurrent must be greater than zero"
        );
    }
}
