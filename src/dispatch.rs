//! Dispatch keys and interception modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of the member being intercepted (a selector name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DispatchKey(String);

impl DispatchKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DispatchKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DispatchKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// When the interceptor runs relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Interceptor runs, then the target. Interceptor returns `void`.
    Before,
    /// Target runs, then the interceptor. Interceptor returns `void`.
    After,
    /// Interceptor replaces the target and receives an `original` callable.
    Instead,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Before, Mode::After, Mode::Instead];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Before => "before",
            Mode::After => "after",
            Mode::Instead => "instead",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown mode '{0}', expected one of: before, after, instead")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "before" => Ok(Mode::Before),
            "after" => Ok(Mode::After),
            "instead" => Ok(Mode::Instead),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}
