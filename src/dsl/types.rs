//! Shared value types for job configuration

#![allow(clippy::must_use_candidate)]

use serde::{Serialize, Serializer};
use std::fmt;

/// Number of agents a job runs on
///
/// Built from an integer or from a string; `"all"` selects every agent.
/// Anything else is kept verbatim so finalize can report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunInstanceCount {
    /// Run on this many agents
    Count(i64),
    /// Run on all agents
    All,
    /// Unrecognised token, rejected at finalize
    Other(String),
}

impl RunInstanceCount {
    /// Literal token selecting every agent.
    pub const ALL_TOKEN: &'static str = "all";

    /// Returns true if the value is a non-negative count or `"all"`
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Count(n) => *n >= 0,
            Self::All => true,
            Self::Other(_) => false,
        }
    }
}

impl From<i64> for RunInstanceCount {
    fn from(count: i64) -> Self {
        Self::Count(count)
    }
}

impl From<i32> for RunInstanceCount {
    fn from(count: i32) -> Self {
        Self::Count(i64::from(count))
    }
}

impl From<u32> for RunInstanceCount {
    fn from(count: u32) -> Self {
        Self::Count(i64::from(count))
    }
}

impl From<u64> for RunInstanceCount {
    fn from(count: u64) -> Self {
        i64::try_from(count).map_or_else(|_| Self::Other(count.to_string()), Self::Count)
    }
}

impl From<usize> for RunInstanceCount {
    fn from(count: usize) -> Self {
        i64::try_from(count).map_or_else(|_| Self::Other(count.to_string()), Self::Count)
    }
}

impl From<&str> for RunInstanceCount {
    fn from(token: &str) -> Self {
        if token == Self::ALL_TOKEN {
            Self::All
        } else {
            Self::Other(token.to_string())
        }
    }
}

impl From<String> for RunInstanceCount {
    fn from(token: String) -> Self {
        Self::from(token.as_str())
    }
}

impl Serialize for RunInstanceCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_i64(*n),
            Self::All => serializer.serialize_str(Self::ALL_TOKEN),
            Self::Other(token) => serializer.serialize_str(token),
        }
    }
}

impl fmt::Display for RunInstanceCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::All => f.write_str(Self::ALL_TOKEN),
            Self::Other(token) => f.write_str(token),
        }
    }
}

/// Condition under which a task runs, relative to the previous tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunIf {
    /// Run when every previous task passed
    #[default]
    Passed,
    /// Run when a previous task failed
    Failed,
    /// Run regardless of previous outcomes
    Any,
}

impl RunIf {
    /// Returns true for the default condition
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for RunIf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Any => write!(f, "any"),
        }
    }
}
