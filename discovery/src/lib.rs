//! Schema-agnostic discovery of rally events in arbitrary JSON exports.
//!
//! This crate recovers canonical [`RallyEvent`]s from a JSON document whose
//! shape is not known in advance. It unwraps the export envelope, picks the
//! application database root, walks the value graph breadth-first looking
//! for arrays of event-like objects, summarizes what it found, and maps the
//! loosely typed records onto the closed [`Skill`] and [`Outcome`]
//! vocabularies.
//!
//! # Main entry points
//!
//! - [`analysis::analyze_document`] runs the whole pipeline on a parsed
//!   document.
//! - [`discover::discover_events`] runs only the graph walk, over any
//!   [`node::KeyValueNode`] graph.
//! - [`load::read_document`] and [`load::parse_document`] turn bytes into a
//!   document.
//!
//! # Example
//!
//! ```
//! use rally_stats_core::{Outcome, Skill, Weights};
//! use rally_stats_discovery::analysis::analyze_document;
//! use rally_stats_discovery::discover::DiscoveryConfig;
//! use rally_stats_discovery::load::parse_document;
//!
//! let doc = parse_document(br#"{
//!     "keys": {"volleyPwa.db.v2": {"log": [
//!         {"type": "atk", "result": "kill", "player": "7", "matchName": "Cup"},
//!         {"type": "serve", "result": "error", "player": "7", "matchName": "Cup"}
//!     ]}}
//! }"#).unwrap();
//!
//! let analysis = analyze_document(&doc, &DiscoveryConfig::default());
//! assert_eq!(analysis.events[0].skill, Skill::Spike);
//! assert_eq!(analysis.events[1].outcome, Outcome::Miss);
//!
//! let stats = analysis.player_stats(Some("7"), &Weights::default());
//! assert_eq!(stats[0].total, 2);
//! assert_eq!(stats[0].decision_rate, 0.5);
//! ```
//!
//! Only [`load`] can fail. Every later stage tolerates unknown shapes and
//! degrades to empty results.
//!
//! [`RallyEvent`]: rally_stats_core::RallyEvent
//! [`Skill`]: rally_stats_core::Skill
//! [`Outcome`]: rally_stats_core::Outcome

pub mod analysis;
pub mod canonical;
pub mod discover;
pub mod envelope;
pub mod load;
pub mod node;
pub mod output;
pub mod probe;
pub mod summary;
pub mod vocab;

pub use analysis::{Analysis, analyze_document};
pub use discover::DiscoveryConfig;
pub use load::LoadError;
