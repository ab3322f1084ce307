//! Score domain: validated values and qualitative feedback bands.
//!
//! # Invariants
//! - A `Score` always holds an integer in `0..=100`.
//! - Banding is monotonic and covers the whole score domain without gaps.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Score construction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    /// Value outside the `0..=100` score domain.
    OutOfRange(i64),
}

impl Display for ScoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange(value) => write!(f, "score must be in 0..=100, got {value}"),
        }
    }
}

impl Error for ScoreError {}

/// Validated self- or parent-score in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Score(u8);

impl Score {
    /// Validates a raw integer into a score.
    pub fn new(value: i64) -> Result<Self, ScoreError> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ScoreError::OutOfRange(value))
        }
    }

    /// Raw score value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Qualitative feedback band for this score.
    pub fn band(self) -> ScoreBand {
        match self.0 {
            76..=100 => ScoreBand::High,
            51..=75 => ScoreBand::Medium,
            26..=50 => ScoreBand::Low,
            _ => ScoreBand::Minimal,
        }
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for i64 {
    fn from(value: Score) -> Self {
        i64::from(value.0)
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Qualitative label derived from a numeric score range.
///
/// Consumed by presentation layers; defined here because it is a pure
/// function of the score domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    /// 76..=100.
    High,
    /// 51..=75.
    Medium,
    /// 26..=50.
    Low,
    /// 0..=25.
    Minimal,
}
