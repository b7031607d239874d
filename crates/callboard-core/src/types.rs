//! Call record types and payload normalization

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};

/// Identifier of a call record
pub type CallId = i64;

/// Status value the dashboard counts as a live call
pub const ACTIVE_STATUS: &str = "active";

/// One exchange in a call transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionExchange {
    /// Human utterance
    pub user: String,

    /// System (agent) utterance
    pub ai: String,

    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

/// One captured phone interaction as delivered by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Unique identifier within a fetched batch
    pub id: CallId,

    /// Free-form status tag, e.g. `"active"`
    pub status: String,

    /// Duration in seconds, absent while the call is ongoing
    #[serde(default)]
    pub duration: Option<f64>,

    /// Transcript in delivery order
    #[serde(default)]
    pub interaction_log: Vec<InteractionExchange>,

    /// Caller phone number
    pub user_phone: String,

    /// Start time as ISO-like text
    #[serde(default)]
    pub start_time: Option<String>,

    /// Opaque telephony session identifier
    pub call_sid: String,

    /// Detected intent
    #[serde(default)]
    pub user_intent: Option<String>,
}

impl CallRecord {
    /// Whether the status is exactly `"active"`
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }

    /// Number of exchanges in the transcript
    #[must_use]
    pub fn interaction_count(&self) -> usize {
        self.interaction_log.len()
    }

    /// Whether the transcript has at least one exchange
    #[must_use]
    pub fn has_interactions(&self) -> bool {
        !self.interaction_log.is_empty()
    }
}

/// Shape of the calls endpoint response the client accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseContract {
    /// Accept either a bare array or the `{calls, total}` envelope
    #[default]
    Auto,
    /// Bare JSON array of calls
    Array,
    /// `{ "calls": [...], "total": n }`
    Envelope,
}

impl ResponseContract {
    /// Human readable description used in error messages
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Auto => "a call array or a {calls, total} envelope",
            Self::Array => "a bare call array",
            Self::Envelope => "a {calls, total} envelope",
        }
    }
}

impl fmt::Display for ResponseContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Array => "array",
            Self::Envelope => "envelope",
        };
        f.write_str(name)
    }
}

impl FromStr for ResponseContract {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "array" => Ok(Self::Array),
            "envelope" => Ok(Self::Envelope),
            other => Err(Error::Validation {
                field: "contract".to_string(),
                message: format!("unknown response contract '{other}'"),
            }),
        }
    }
}

/// Wrapped response shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallsEnvelope {
    /// Calls in the batch
    pub calls: Vec<CallRecord>,

    /// Total reported by the backend
    pub total: u64,
}

/// Decoded body of the calls endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallsPayload {
    /// Bare array
    List(Vec<CallRecord>),
    /// Array wrapped with a total count
    Envelope(CallsEnvelope),
}

impl CallsPayload {
    /// Decode a response body under the given contract
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedPayload`] when the body does not match the contract.
    pub fn parse(body: &[u8], contract: ResponseContract) -> Result<Self> {
        let decoded = match contract {
            ResponseContract::Auto => serde_json::from_slice::<Self>(body),
            ResponseContract::Array => serde_json::from_slice(body).map(Self::List),
            ResponseContract::Envelope => serde_json::from_slice(body).map(Self::Envelope),
        };

        decoded.map_err(|e| Error::UnexpectedPayload {
            expected: contract.describe().to_string(),
            detail: e.to_string(),
        })
    }

    /// Normalize to a list of calls, rejecting duplicate identifiers
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if two records share an identifier.
    pub fn into_calls(self) -> Result<Vec<CallRecord>> {
        let calls = match self {
            Self::List(calls) => calls,
            Self::Envelope(envelope) => {
                if usize::try_from(envelope.total).ok() != Some(envelope.calls.len()) {
                    tracing::debug!(
                        total = envelope.total,
                        received = envelope.calls.len(),
                        "Envelope total differs from number of calls received"
                    );
                }
                envelope.calls
            }
        };

        ensure_unique_ids(&calls)?;
        Ok(calls)
    }
}

/// Check that no identifier appears twice in a batch
///
/// # Errors
///
/// Returns [`Error::Validation`] naming the first repeated identifier.
pub fn ensure_unique_ids(calls: &[CallRecord]) -> Result<()> {
    let mut seen = HashSet::with_capacity(calls.len());
    for call in calls {
        if !seen.insert(call.id) {
            return Err(Error::Validation {
                field: "id".to_string(),
                message: format!("duplicate identifier {}", call.id),
            });
        }
    }
    Ok(())
}
