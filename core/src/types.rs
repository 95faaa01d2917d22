//! Canonical rally-event domain types.
//!
//! These are the strongly-typed facts recovered from loosely-shaped export
//! documents. Everything here is serializable with [`serde`] using the
//! camelCase field names of the exporting application, so the canonical
//! records can be written back out as JSON for inspection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Player identifier as observed in the source data.
pub type PlayerId = String;

/// Match identifier: either explicit, or a pseudo-id derived from the name.
pub type MatchId = String;

/// Display name used when a record carries no resolvable match name.
pub const UNNAMED_MATCH: &str = "unnamed";

/// Volleyball skill an attempt was recorded for.
///
/// The declaration order is the display order used by reports.
///
/// # Examples
///
/// ```
/// use rally_stats_core::Skill;
///
/// assert_eq!(Skill::Spike.as_str(), "spike");
/// assert_eq!(Skill::ALL.len(), 5);
/// let json = serde_json::to_string(&Skill::Receive).unwrap();
/// assert_eq!(json, "\"receive\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    /// Attack hit.
    Spike,
    /// Serve.
    Serve,
    /// Block at the net.
    Block,
    /// Reception or dig.
    Receive,
    /// Set (toss).
    Set,
}

impl Skill {
    /// Every skill, in display order.
    pub const ALL: [Skill; 5] = [
        Skill::Spike,
        Skill::Serve,
        Skill::Block,
        Skill::Receive,
        Skill::Set,
    ];

    /// Returns the canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spike => "spike",
            Self::Serve => "serve",
            Self::Block => "block",
            Self::Receive => "receive",
            Self::Set => "set",
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single attempt.
///
/// Named `Outcome` so it does not shadow [`std::result::Result`]; the
/// serialized labels are `point`, `effective`, `continue` and `miss`.
///
/// # Examples
///
/// ```
/// use rally_stats_core::Outcome;
///
/// let json = serde_json::to_string(&Outcome::Continue).unwrap();
/// assert_eq!(json, "\"continue\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The attempt scored (kill, ace, stuff block).
    Point,
    /// Not a point, but put the opponent under pressure.
    Effective,
    /// The rally went on without advantage.
    Continue,
    /// Error or point lost.
    Miss,
}

impl Outcome {
    /// Every outcome, in display order.
    pub const ALL: [Outcome; 4] = [
        Outcome::Point,
        Outcome::Effective,
        Outcome::Continue,
        Outcome::Miss,
    ];

    /// Returns the canonical lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Effective => "effective",
            Self::Continue => "continue",
            Self::Miss => "miss",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical rally event.
///
/// `skill` and `outcome` are always valid; records that cannot be mapped
/// never become a `RallyEvent`. `player_id == None` means the attempt was
/// not assigned to anyone, which is distinct from any concrete id string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RallyEvent {
    pub id: String,
    pub match_id: MatchId,
    pub skill: Skill,
    #[serde(rename = "result")]
    pub outcome: Outcome,
    pub player_id: Option<PlayerId>,
}

/// A match that at least one event was recorded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "dateISO")]
    pub date_iso: Option<String>,
}

/// A player observed in the source data. Id and name coincide because
/// exports carry no separate player directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

impl Player {
    /// Creates a player whose display name is its identifier.
    pub fn from_label(label: impl Into<String>) -> Self {
        let id = label.into();
        Self {
            name: id.clone(),
            id,
        }
    }
}

/// Per-outcome attempt counts.
///
/// # Examples
///
/// ```
/// use rally_stats_core::{Counts, Outcome};
///
/// let mut counts = Counts::default();
/// counts.record(Outcome::Point);
/// counts.record(Outcome::Miss);
/// assert_eq!(counts.total(), 2);
/// assert_eq!(counts.get(Outcome::Point), 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub point: u32,
    pub effective: u32,
    #[serde(rename = "continue")]
    pub continued: u32,
    pub miss: u32,
}

impl Counts {
    /// Returns the count for one outcome.
    pub fn get(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Point => self.point,
            Outcome::Effective => self.effective,
            Outcome::Continue => self.continued,
            Outcome::Miss => self.miss,
        }
    }

    /// Adds one attempt with the given outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Point => self.point += 1,
            Outcome::Effective => self.effective += 1,
            Outcome::Continue => self.continued += 1,
            Outcome::Miss => self.miss += 1,
        }
    }

    /// Adds every count of `other` into `self`.
    pub fn absorb(&mut self, other: &Counts) {
        self.point += other.point;
        self.effective += other.effective;
        self.continued += other.continued;
        self.miss += other.miss;
    }

    /// Total attempts across all outcomes.
    pub fn total(&self) -> u32 {
        Outcome::ALL.iter().map(|o| self.get(*o)).sum()
    }
}
