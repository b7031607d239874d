//! Status filter input

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{convert::Infallible, fmt, str::FromStr};

/// Sentinel meaning "do not filter by status"
pub const ALL_STATUSES: &str = "all";

/// Status restriction applied before the search text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    /// Keep every call
    #[default]
    All,
    /// Keep calls whose status equals this value exactly
    Only(String),
}

impl StatusFilter {
    /// Whether `status` passes the filter (case-sensitive)
    #[must_use]
    pub fn matches(&self, status: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }

    /// Wire value, `"all"` for the sentinel
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_STATUSES,
            Self::Only(status) => status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for StatusFilter {
    fn from(value: &str) -> Self {
        if value == ALL_STATUSES {
            Self::All
        } else {
            Self::Only(value.to_string())
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StatusFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from(value.as_str()))
    }
}
