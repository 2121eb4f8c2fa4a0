//! Raw state of the observed binary signal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Last raw value reported by the observed signal source.
///
/// Hosts report states as strings; anything other than the recognised
/// values is kept as `Unknown` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalState {
    On,
    Off,
    Unavailable,
    Unknown,
}

impl SignalState {
    /// Whether this state counts as "active" for the current block.
    pub fn is_active(&self) -> bool {
        matches!(self, SignalState::On)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalState::On => "on",
            SignalState::Off => "off",
            SignalState::Unavailable => "unavailable",
            SignalState::Unknown => "unknown",
        }
    }
}

impl From<bool> for SignalState {
    fn from(active: bool) -> Self {
        if active {
            SignalState::On
        } else {
            SignalState::Off
        }
    }
}

impl FromStr for SignalState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => SignalState::On,
            "off" | "false" | "0" => SignalState::Off,
            "unavailable" => SignalState::Unavailable,
            _ => SignalState::Unknown,
        })
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
