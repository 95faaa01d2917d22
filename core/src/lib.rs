//! Core domain types and statistics for volleyball rally exports.
//!
//! This crate holds the strongly-typed side of the pipeline:
//!
//! - [`Skill`] and [`Outcome`]: the closed vocabularies every canonical
//!   record is mapped onto.
//! - [`RallyEvent`], [`Match`], [`Player`]: canonical records recovered
//!   from export documents.
//! - [`Weights`]: the total `Skill × Outcome` weighting table, loadable
//!   from YAML or JSON.
//! - [`build_player_match_stats`]: per-match, per-skill decision and
//!   effect rates for one player (or for unassigned attempts).
//!
//! # Example
//!
//! ```
//! use rally_stats_core::*;
//!
//! let matches = vec![Match { id: "m1".into(), name: "Spring Cup".into(), date_iso: None }];
//! let events = vec![RallyEvent {
//!     id: "ev-0".into(),
//!     match_id: "m1".into(),
//!     skill: Skill::Serve,
//!     outcome: Outcome::Point,
//!     player_id: None,
//! }];
//!
//! let stats = build_player_match_stats(None, &matches, &events, &Weights::default());
//! assert_eq!(stats[0].match_name, "Spring Cup");
//! assert_eq!(format_pct(stats[0].decision_rate), "100.0%");
//! ```

mod stats;
mod types;
mod weights;

pub use stats::{
    PerSkillStat, PlayerFilter, PlayerMatchStat, build_player_match_stats, clamp01,
    decision_rate, effect_rate, format_pct, locale_cmp, weighted_score,
};
pub use types::*;
pub use weights::{WeightRow, Weights, WeightsError};
