use egress_core::ResolveStatus;
use thiserror::Error;

/// Result type alias for single-domain lookups
pub type LookupResult<T> = std::result::Result<T, LookupError>;

/// Why a domain could not be resolved.
///
/// Lookup failures are per-domain data, never fatal to a resolution run.
/// The `Display` text is the human-readable message persisted alongside
/// the status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The name failed validation and was never sent to DNS
    #[error("Received invalid FQDN '{0}'")]
    InvalidDomain(String),

    /// Authoritative negative answer (NXDOMAIN or no records)
    #[error("Domain not found")]
    NotFound,

    /// The lookup did not finish before its deadline
    #[error("Timeout waiting for DNS response")]
    Timeout,

    /// Recoverable failure such as SERVFAIL or a socket error
    #[error("Temporary failure in name resolution")]
    Temporary(String),

    /// Anything the lookup layer could not classify
    #[error("{0}")]
    Other(String),
}

impl LookupError {
    /// Map onto the resolve status taxonomy
    #[must_use]
    pub const fn status(&self) -> ResolveStatus {
        match self {
            Self::InvalidDomain(_) => ResolveStatus::InvalidDomain,
            Self::NotFound => ResolveStatus::DomainNotFound,
            Self::Timeout => ResolveStatus::Timeout,
            Self::Temporary(_) => ResolveStatus::TemporaryError,
            Self::Other(_) => ResolveStatus::OtherError,
        }
    }

    /// Human-readable message stored alongside the status
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            LookupError::InvalidDomain("x".into()).status(),
            ResolveStatus::InvalidDomain
        );
        assert_eq!(LookupError::NotFound.status(), ResolveStatus::DomainNotFound);
        assert_eq!(LookupError::Timeout.status(), ResolveStatus::Timeout);
        assert_eq!(
            LookupError::Temporary("servfail".into()).status(),
            ResolveStatus::TemporaryError
        );
        assert_eq!(
            LookupError::Other("boom".into()).status(),
            ResolveStatus::OtherError
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            LookupError::InvalidDomain("not a domain".into()).to_string(),
            "Received invalid FQDN 'not a domain'"
        );
        assert_eq!(LookupError::NotFound.to_string(), "Domain not found");
        assert_eq!(
            LookupError::Temporary("io".into()).to_string(),
            "Temporary failure in name resolution"
        );
        assert_eq!(LookupError::Other("boom".into()).to_string(), "boom");
    }
}
