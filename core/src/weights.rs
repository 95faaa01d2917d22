//! Per-skill outcome weighting table.
//!
//! The effect rate of a skill is the weighted average of its outcomes. The
//! table is total over `Skill × Outcome`: every row is a [`WeightRow`] with
//! all four outcome fields, so a partially filled table cannot be built or
//! deserialized.
//!
//! # Example YAML
//!
//! ```yaml
//! spike:   { point: 1.0, effective: 0.6, continue: 0.3, miss: 0.0 }
//! serve:   { point: 1.0, effective: 0.6, continue: 0.3, miss: 0.0 }
//! block:   { point: 1.0, effective: 0.6, continue: 0.4, miss: 0.0 }
//! receive: { point: 1.0, effective: 0.75, continue: 0.5, miss: 0.0 }
//! set:     { point: 1.0, effective: 0.75, continue: 0.5, miss: 0.0 }
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Outcome, Skill};

/// Errors raised while loading or validating a weights table.
#[derive(Debug, Error)]
pub enum WeightsError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML/JSON parsing failure, including missing rows or fields.
    #[error("invalid weights file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A weight is not a finite number in `[0, 1]`.
    #[error("weight for {skill}/{outcome} must be within 0.0..=1.0, got {value}")]
    OutOfRange {
        skill: Skill,
        outcome: Outcome,
        value: f64,
    },
}

/// Weights for the four outcomes of one skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightRow {
    pub point: f64,
    pub effective: f64,
    #[serde(rename = "continue")]
    pub continued: f64,
    pub miss: f64,
}

impl WeightRow {
    /// Creates a row from the four outcome weights in display order.
    pub const fn new(point: f64, effective: f64, continued: f64, miss: f64) -> Self {
        Self {
            point,
            effective,
            continued,
            miss,
        }
    }

    /// Returns the weight of one outcome.
    pub fn weight(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Point => self.point,
            Outcome::Effective => self.effective,
            Outcome::Continue => self.continued,
            Outcome::Miss => self.miss,
        }
    }
}

/// Total `Skill × Outcome → [0, 1]` weighting table.
///
/// # Examples
///
/// ```
/// use rally_stats_core::{Outcome, Skill, Weights};
///
/// let weights = Weights::default();
/// assert_eq!(weights.get(Skill::Spike, Outcome::Point), 1.0);
/// assert_eq!(weights.get(Skill::Spike, Outcome::Miss), 0.0);
/// assert!(weights.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub spike: WeightRow,
    pub serve: WeightRow,
    pub block: WeightRow,
    pub receive: WeightRow,
    pub set: WeightRow,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            spike: WeightRow::new(1.0, 0.6, 0.3, 0.0),
            serve: WeightRow::new(1.0, 0.6, 0.3, 0.0),
            block: WeightRow::new(1.0, 0.6, 0.4, 0.0),
            receive: WeightRow::new(1.0, 0.75, 0.5, 0.0),
            set: WeightRow::new(1.0, 0.75, 0.5, 0.0),
        }
    }
}

impl Weights {
    /// Builds a table with the same row for every skill.
    pub fn uniform(row: WeightRow) -> Self {
        Self {
            spike: row,
            serve: row,
            block: row,
            receive: row,
            set: row,
        }
    }

    /// Returns the row for one skill.
    pub fn row(&self, skill: Skill) -> &WeightRow {
        match skill {
            Skill::Spike => &self.spike,
            Skill::Serve => &self.serve,
            Skill::Block => &self.block,
            Skill::Receive => &self.receive,
            Skill::Set => &self.set,
        }
    }

    /// Returns the weight of one `(skill, outcome)` pair.
    pub fn get(&self, skill: Skill, outcome: Outcome) -> f64 {
        self.row(skill).weight(outcome)
    }

    /// Checks that every weight is finite and within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError::OutOfRange`] for the first offending pair in
    /// display order.
    pub fn validate(&self) -> Result<(), WeightsError> {
        for skill in Skill::ALL {
            for outcome in Outcome::ALL {
                let value = self.get(skill, outcome);
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(WeightsError::OutOfRange {
                        skill,
                        outcome,
                        value,
                    });
                }
            }
        }
        Ok(())
    }

    /// Parses and validates a table from YAML or JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError::Parse`] when a row or field is missing or
    /// unknown, and [`WeightsError::OutOfRange`] for invalid values.
    pub fn from_yaml_str(raw: &str) -> Result<Self, WeightsError> {
        let weights: Self = serde_yaml::from_str(raw)?;
        weights.validate()?;
        Ok(weights)
    }

    /// Loads and validates a table from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError::Io`] if the file cannot be read, plus the
    /// errors of [`Weights::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WeightsError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let weights: Self = serde_yaml::from_reader(BufReader::new(file))?;
        weights.validate()?;
        tracing::debug!(path = %path.display(), "Loaded weights table");
        Ok(weights)
    }

    /// Serializes the table as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError::Parse`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, WeightsError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
