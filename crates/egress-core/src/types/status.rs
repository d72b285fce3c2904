use super::{sort_cidrs, Cidr, Fqdn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

/// Outcome of resolving one domain.
///
/// Variants carry a strict priority used when reducing many outcomes to a
/// single worst case; see [`ResolveStatus::priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResolveStatus {
    /// Unclassified failure from the lookup layer
    #[serde(rename = "OTHER_ERROR")]
    OtherError,
    /// Malformed domain name, never sent to DNS
    #[serde(rename = "INVALID_DOMAIN")]
    InvalidDomain,
    /// Authoritative negative answer
    #[serde(rename = "NXDOMAIN")]
    DomainNotFound,
    /// Lookup did not finish before its deadline
    #[serde(rename = "TIMEOUT")]
    Timeout,
    /// Recoverable failure, worth retrying later
    #[serde(rename = "TEMPORARY")]
    TemporaryError,
    /// No information yet
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// Addresses were resolved
    #[serde(rename = "SUCCESS")]
    Success,
}

impl ResolveStatus {
    /// Aggregation priority, higher is worse
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::OtherError => 6,
            Self::InvalidDomain => 5,
            Self::DomainNotFound => 4,
            Self::Timeout => 3,
            Self::TemporaryError => 2,
            Self::Unknown => 1,
            Self::Success => 0,
        }
    }

    /// Transient failures are retried on later cycles and subject to the
    /// retry grace window. `Success` also reports true here; callers check
    /// for success first.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        !matches!(self, Self::InvalidDomain | Self::DomainNotFound)
    }

    /// Returns true for `Success`
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OtherError => "OTHER_ERROR",
            Self::InvalidDomain => "INVALID_DOMAIN",
            Self::DomainNotFound => "NXDOMAIN",
            Self::Timeout => "TIMEOUT",
            Self::TemporaryError => "TEMPORARY",
            Self::Unknown => "UNKNOWN",
            Self::Success => "SUCCESS",
        }
    }
}

impl std::fmt::Display for ResolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted per-domain resolution state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FqdnStatus {
    /// Domain this status refers to
    pub fqdn: Fqdn,

    /// Last time the domain resolved successfully
    pub last_successful_time: DateTime<Utc>,

    /// Last time `resolve_reason` changed
    pub last_transition_time: DateTime<Utc>,

    /// Status of the latest resolution
    #[serde(default)]
    pub resolve_reason: ResolveStatus,

    /// Message describing the latest status
    #[serde(default)]
    pub resolve_message: String,

    /// Addresses currently granted for this domain, sorted
    #[serde(default)]
    pub addresses: Vec<Cidr>,
}

impl FqdnStatus {
    /// Create the status for a domain seen for the first time.
    ///
    /// Both timestamps start at `now`, so a domain whose first lookup fails
    /// transiently starts its grace window immediately.
    pub fn new(
        fqdn: Fqdn,
        cidrs: &[Cidr],
        status: ResolveStatus,
        message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut addresses = cidrs.to_vec();
        sort_cidrs(&mut addresses);
        Self {
            fqdn,
            last_successful_time: now,
            last_transition_time: now,
            resolve_reason: status,
            resolve_message: message.into(),
            addresses,
        }
    }

    /// Merge a new resolution outcome into this status.
    ///
    /// Returns true if the stored addresses were cleared during this update,
    /// either because a permanent failure was reported or because transient
    /// failures outlasted `retry_timeout` since the last success.
    pub fn update(
        &mut self,
        cidrs: &[Cidr],
        status: ResolveStatus,
        message: impl Into<String>,
        retry_timeout: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        let mut cleared = false;

        if status.is_success() {
            self.last_successful_time = now;
            self.addresses = cidrs.to_vec();
            sort_cidrs(&mut self.addresses);
        } else if status.is_transient() {
            // A success timestamp in the future counts as zero elapsed
            let elapsed = (now - self.last_successful_time)
                .to_std()
                .unwrap_or_default();
            if elapsed > retry_timeout {
                self.addresses.clear();
                cleared = true;
            }
        } else {
            self.addresses.clear();
            cleared = true;
        }

        if self.resolve_reason != status {
            debug!(
                domain = %self.fqdn,
                from = %self.resolve_reason,
                to = %status,
                "resolve status transition"
            );
            self.last_transition_time = now;
        }
        self.resolve_reason = status;
        self.resolve_message = message.into();
        cleared
    }

    /// Time since the last successful resolution
    #[must_use]
    pub fn since_success(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_successful_time).to_std().unwrap_or_default()
    }

    /// Time since the status last changed
    #[must_use]
    pub fn since_transition(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_transition_time).to_std().unwrap_or_default()
    }
}

/// Read a persisted status table (a JSON array)
pub fn read_statuses<R: Read>(reader: R) -> crate::Result<Vec<FqdnStatus>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Write a status table as pretty JSON
pub fn write_statuses<W: Write>(mut writer: W, statuses: &[FqdnStatus]) -> crate::Result<()> {
    serde_json::to_writer_pretty(&mut writer, statuses)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
