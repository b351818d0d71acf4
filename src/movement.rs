//! The four movements of 4'33"
//!
//! Each recording session captures exactly one movement. Durations are fixed
//! and mirror the structure of the piece.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A fixed recording duration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    /// First movement, 30 seconds
    #[serde(rename = "I")]
    I,
    /// Second movement, 2'23"
    #[serde(rename = "II")]
    II,
    /// Third movement, 1'40"
    #[serde(rename = "III")]
    III,
    /// The whole piece, 4'33"
    #[serde(rename = "FULL")]
    Full,
}

impl Movement {
    /// All movements in display order
    pub const ALL: [Movement; 4] = [Movement::I, Movement::II, Movement::III, Movement::Full];

    /// Length of the movement in whole seconds
    pub fn duration_seconds(&self) -> u32 {
        match self {
            Movement::I => 30,
            Movement::II => 143,
            Movement::III => 100,
            Movement::Full => 273,
        }
    }

    /// Length of the movement as fractional seconds, for elapsed arithmetic
    pub fn duration_secs_f64(&self) -> f64 {
        f64::from(self.duration_seconds())
    }

    /// Short display label
    pub fn label(&self) -> &'static str {
        match self {
            Movement::I => "I",
            Movement::II => "II",
            Movement::III => "III",
            Movement::Full => "Full piece",
        }
    }

    /// One-line display description
    pub fn description(&self) -> &'static str {
        match self {
            Movement::I => "Thirty seconds of listening",
            Movement::II => "Two minutes twenty-three",
            Movement::III => "One minute forty",
            Movement::Full => "All three movements, four thirty-three",
        }
    }

    /// Wire name used by the recording API
    pub fn as_str(&self) -> &'static str {
        match self {
            Movement::I => "I",
            Movement::II => "II",
            Movement::III => "III",
            Movement::Full => "FULL",
        }
    }
}

impl fmt::Display for Movement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Movement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" | "1" => Ok(Movement::I),
            "II" | "2" => Ok(Movement::II),
            "III" | "3" => Ok(Movement::III),
            "FULL" => Ok(Movement::Full),
            other => Err(format!("Unknown movement: {}", other)),
        }
    }
}
