//! # Unseal Outcomes
//!
//! Per-instance results and the ordered per-cycle reports built from them.

use crate::error::ProtocolError;
use crate::vault::{HealthStatus, SealStatus};
use serde::ser::{Serialize, Serializer};

/// What a seal status query told us about an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealProbe {
    /// Instance is unlocked, nothing to do
    Unsealed,
    /// Instance is locked, with the reported threshold and progress
    Sealed(SealStatus),
    /// Status could not be determined; keys must not be submitted
    Unreachable,
}

impl From<Result<SealStatus, ProtocolError>> for SealProbe {
    fn from(result: Result<SealStatus, ProtocolError>) -> Self {
        match result {
            Ok(status) if !status.sealed => Self::Unsealed,
            Ok(status) => Self::Sealed(status),
            Err(_) => Self::Unreachable,
        }
    }
}

/// Why an unseal attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Seal status could not be queried
    Unreachable,
    /// Vault rejected or failed the submission of key `key_index` (1-based)
    SubmitFailed { key_index: usize },
    /// Every configured key was applied and the instance is still sealed
    InsufficientKeys,
    /// The attempt aborted unexpectedly
    Internal(String),
}

impl FailureReason {
    /// Label value for metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::SubmitFailed { .. } => "submit_failed",
            Self::InsufficientKeys => "insufficient_keys",
            Self::Internal(_) => "internal",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreachable => f.write_str("unreachable"),
            Self::SubmitFailed { key_index } => write!(f, "submit failed at key {key_index}"),
            Self::InsufficientKeys => f.write_str("insufficient keys"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of one unseal attempt against one instance
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnsealOutcome {
    succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<FailureReason>,
    keys_submitted: usize,
}

impl UnsealOutcome {
    pub fn success(keys_submitted: usize) -> Self {
        Self {
            succeeded: true,
            reason: None,
            keys_submitted,
        }
    }

    pub fn failure(reason: FailureReason, keys_submitted: usize) -> Self {
        Self {
            succeeded: false,
            reason: Some(reason),
            keys_submitted,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        self.reason.as_ref()
    }

    /// Key submissions made during the attempt, including a failed one
    pub fn keys_submitted(&self) -> usize {
        self.keys_submitted
    }
}

/// Results keyed by instance name, in discovery order
#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    entries: Vec<(String, T)>,
}

/// Outcome of one unseal cycle
pub type CycleReport = Report<UnsealOutcome>;

/// Outcome of one health check pass
pub type HealthReport = Report<HealthStatus>;

impl<T> Default for Report<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Report<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl<T> FromIterator<(String, T)> for Report<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T: Serialize> Serialize for Report<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(name, value)| (name, value)))
    }
}

impl CycleReport {
    pub fn successful(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.successful()
    }

    /// True when at least one instance was processed and every one was unsealed
    pub fn all_succeeded(&self) -> bool {
        !self.is_empty() && self.failed() == 0
    }
}

impl HealthReport {
    /// True when no instance is unhealthy (vacuously true for an empty report)
    pub fn all_healthy(&self) -> bool {
        self.entries.iter().all(|(_, health)| health.healthy)
    }
}
