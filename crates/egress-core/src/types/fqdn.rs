use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a single DNS label
const MAX_LABEL_LEN: usize = 63;

/// A fully qualified domain name as written in an egress rule.
///
/// Construction never fails; validity is checked with [`Fqdn::is_valid`]
/// so that malformed names can still be carried through the pipeline and
/// reported as `InvalidDomain` instead of being silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fqdn(String);

impl Fqdn {
    /// Wrap a domain name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The domain as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the name has at least two labels and every label
    /// is 1-63 alphanumeric characters with optional interior hyphens.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let labels: Vec<&str> = self.0.split('.').collect();
        labels.len() >= 2 && labels.iter().all(|label| is_valid_label(label))
    }
}

fn is_valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_LABEL_LEN
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}

impl fmt::Display for Fqdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fqdn {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Fqdn {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Fqdn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
