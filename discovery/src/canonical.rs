//! Canonicalization of raw records into [`RallyEvent`]s and [`Match`]es.
//!
//! Each raw record is probed field by field with ordered [`FieldProbe`]s.
//! Skill and result labels go through the [`vocab`](crate::vocab) tables;
//! a record whose skill or result cannot be mapped is dropped silently.
//! Matches are identified by an explicit id when the record carries one,
//! otherwise by a pseudo-id hashed from the match name, so records that
//! only share a name still fold into one match. A pseudo-id never folds a
//! named record into a match whose explicit id happens to equal it.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};
use rally_stats_core::{Match, MatchId, RallyEvent, UNNAMED_MATCH};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::node::KeyValueNode;
use crate::probe::FieldProbe;
use crate::vocab::{outcome_from_label, skill_from_label};

pub const SKILL_PROBE: FieldProbe = FieldProbe::new(
    "skill",
    &[
        "skill",
        "type",
        "label",
        "action",
        "play",
        "event.skill",
        "event.type",
    ],
);

pub const OUTCOME_PROBE: FieldProbe = FieldProbe::new(
    "result",
    &[
        "result",
        "outcome",
        "evaluation",
        "grade",
        "event.result",
        "event.outcome",
    ],
);

pub const MATCH_NAME_PROBE: FieldProbe = FieldProbe::new(
    "match name",
    &[
        "matchName",
        "match_name",
        "match.name",
        "match.title",
        "gameName",
        "game.name",
    ],
);

pub const MATCH_ID_PROBE: FieldProbe = FieldProbe::new(
    "match id",
    &["matchId", "match_id", "match.id", "gameId", "game_id", "game.id"],
);

pub const MATCH_DATE_PROBE: FieldProbe = FieldProbe::new(
    "match date",
    &["matchDate", "match.date", "match.dateISO", "dateISO", "date"],
);

pub const PLAYER_PROBE: FieldProbe = FieldProbe::new(
    "player",
    &[
        "playerId",
        "player_id",
        "player.id",
        "player",
        "playerName",
        "player.name",
    ],
);

pub const RECORD_ID_PROBE: FieldProbe = FieldProbe::new("id", &["id", "eventId", "event_id"]);

/// Prefix of synthesized match ids.
pub const PSEUDO_ID_PREFIX: &str = "name-";

/// Canonical output: deduplicated matches and mapped events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Canonical {
    /// Matches in first-seen order.
    pub matches: Vec<Match>,
    pub events: Vec<RallyEvent>,
    /// Raw records dropped because skill or result did not map.
    pub dropped: usize,
}

/// Deterministic match id derived from a display name.
///
/// # Examples
///
/// ```
/// use rally_stats_discovery::canonical::pseudo_match_id;
///
/// assert_eq!(pseudo_match_id("Spring Cup"), pseudo_match_id("Spring Cup"));
/// assert_ne!(pseudo_match_id("Spring Cup"), pseudo_match_id("Autumn Cup"));
/// assert!(pseudo_match_id("Spring Cup").starts_with("name-"));
/// ```
pub fn pseudo_match_id(name: &str) -> MatchId {
    let digest = Sha256::digest(name.as_bytes());
    let hex = format!("{digest:x}");
    format!("{PSEUDO_ID_PREFIX}{}", &hex[..16])
}

/// [`pseudo_match_id`], lengthened to the full digest when the short form
/// is already taken by an explicit id.
fn unreserved_pseudo_id(name: &str, reserved: &HashSet<MatchId>) -> MatchId {
    let id = pseudo_match_id(name);
    if !reserved.contains(&id) {
        return id;
    }
    let digest = Sha256::digest(name.as_bytes());
    debug!(%id, "Pseudo match id collides with an explicit id");
    format!("{PSEUDO_ID_PREFIX}{digest:x}")
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
fn parse_match_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let valid = DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok();
    valid.then(|| raw.to_string())
}

/// Match fields resolved from one record.
struct MatchRef {
    id: MatchId,
    name: String,
    date_iso: Option<String>,
}

fn resolve_match<N: KeyValueNode + ?Sized>(
    record: &N,
    reserved: &HashSet<MatchId>,
) -> MatchRef {
    let name = MATCH_NAME_PROBE
        .text(record)
        .unwrap_or_else(|| UNNAMED_MATCH.to_string());
    let id = MATCH_ID_PROBE
        .identifier(record)
        .unwrap_or_else(|| unreserved_pseudo_id(&name, reserved));
    let date_iso = MATCH_DATE_PROBE.first(record, |node| {
        node.as_text().and_then(parse_match_date)
    });
    MatchRef { id, name, date_iso }
}

/// Maps one raw record, or returns `None` when skill or result is
/// unresolvable.
pub fn canonicalize_record<N: KeyValueNode + ?Sized>(
    record: &N,
    index: usize,
) -> Option<(RallyEvent, Match)> {
    map_record(record, index, &HashSet::new())
}

/// `reserved` holds the explicit match ids of the whole record set.
fn map_record<N: KeyValueNode + ?Sized>(
    record: &N,
    index: usize,
    reserved: &HashSet<MatchId>,
) -> Option<(RallyEvent, Match)> {
    let skill = SKILL_PROBE
        .scalar(record)
        .and_then(|s| skill_from_label(&s.into_label()));
    let Some(skill) = skill else {
        debug!(index, field = SKILL_PROBE.name, "Dropping record");
        return None;
    };
    let outcome = OUTCOME_PROBE
        .scalar(record)
        .and_then(|s| outcome_from_label(&s.into_label()));
    let Some(outcome) = outcome else {
        debug!(index, field = OUTCOME_PROBE.name, "Dropping record");
        return None;
    };

    let MatchRef { id, name, date_iso } = resolve_match(record, reserved);
    let player_id = PLAYER_PROBE.identifier(record);
    let event_id = RECORD_ID_PROBE
        .identifier(record)
        .unwrap_or_else(|| format!("ev-{index}"));

    let event = RallyEvent {
        id: event_id,
        match_id: id.clone(),
        skill,
        outcome,
        player_id,
    };
    let m = Match {
        id,
        name,
        date_iso,
    };
    Some((event, m))
}

/// Canonicalizes records in order, folding duplicate match ids into the
/// first-seen [`Match`].
///
/// # Examples
///
/// ```
/// use rally_stats_core::{Outcome, Skill};
/// use rally_stats_discovery::canonical::canonicalize;
/// use serde_json::json;
///
/// let raw = [
///     json!({"type": "atk", "result": "inplay", "matchName": "Cup"}),
///     json!({"type": "serve", "note": "no result"}),
/// ];
/// let refs: Vec<_> = raw.iter().collect();
/// let out = canonicalize(&refs);
/// assert_eq!(out.events.len(), 1);
/// assert_eq!(out.events[0].skill, Skill::Spike);
/// assert_eq!(out.events[0].outcome, Outcome::Continue);
/// assert_eq!(out.matches[0].name, "Cup");
/// assert_eq!(out.dropped, 1);
/// ```
pub fn canonicalize<N: KeyValueNode + ?Sized>(records: &[&N]) -> Canonical {
    let explicit: HashSet<MatchId> = records
        .iter()
        .filter_map(|record| MATCH_ID_PROBE.identifier(*record))
        .collect();
    let mut seen: HashSet<MatchId> = HashSet::new();
    let mut out = Canonical::default();

    for (index, record) in records.iter().enumerate() {
        match map_record(*record, index, &explicit) {
            Some((event, m)) => {
                if seen.insert(m.id.clone()) {
                    out.matches.push(m);
                }
                out.events.push(event);
            }
            None => out.dropped += 1,
        }
    }

    debug!(
        events = out.events.len(),
        matches = out.matches.len(),
        dropped = out.dropped,
        "Canonicalized records"
    );
    out
}
