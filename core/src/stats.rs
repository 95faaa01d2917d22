//! Per-player, per-match performance aggregation.
//!
//! Two rates are derived from outcome counts:
//!
//! - **decision rate**: share of attempts that ended in [`Outcome::Point`].
//! - **effect rate**: weighted average of outcomes using the skill's
//!   [`WeightRow`](crate::WeightRow), clamped to `[0, 1]`.
//!
//! Both are `0.0` when there are no attempts.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{Counts, Match, MatchId, Outcome, RallyEvent, Skill, UNNAMED_MATCH};
use crate::weights::{WeightRow, Weights};

/// Clamps to `[0, 1]`, mapping NaN to `0.0`.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

/// Share of attempts that scored.
///
/// # Examples
///
/// ```
/// use rally_stats_core::{Counts, Outcome, decision_rate};
///
/// let mut counts = Counts::default();
/// assert_eq!(decision_rate(&counts), 0.0);
/// counts.record(Outcome::Point);
/// counts.record(Outcome::Miss);
/// assert_eq!(decision_rate(&counts), 0.5);
/// ```
pub fn decision_rate(counts: &Counts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    f64::from(counts.point) / f64::from(total)
}

/// Weighted score of the counts under one weight row (not normalized).
pub fn weighted_score(counts: &Counts, row: &WeightRow) -> f64 {
    Outcome::ALL
        .iter()
        .map(|o| f64::from(counts.get(*o)) * row.weight(*o))
        .sum()
}

/// Weighted average outcome score, clamped to `[0, 1]`.
pub fn effect_rate(counts: &Counts, row: &WeightRow) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    clamp01(weighted_score(counts, row) / f64::from(total))
}

/// Renders a `[0, 1]` rate as a percentage with one decimal, e.g. `50.0%`.
pub fn format_pct(x01: f64) -> String {
    let v = (clamp01(x01) * 1000.0).round() / 10.0;
    format!("{v:.1}%")
}

/// Counts and rates for one skill in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerSkillStat {
    pub total: u32,
    pub counts: Counts,
    pub decision_rate: f64,
    pub effect_rate: f64,
}

/// One player's performance in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMatchStat {
    pub match_id: MatchId,
    pub match_name: String,
    pub total: u32,
    pub decision_rate: f64,
    pub effect_rate: f64,
    pub by_skill: BTreeMap<Skill, PerSkillStat>,
}

/// Player selector: a concrete id, or `None` for unassigned attempts.
pub type PlayerFilter<'a> = Option<&'a str>;

/// Accumulator threaded through the event fold: per match, per skill
/// counts, with match first-seen order preserved.
#[derive(Debug, Default)]
struct MatchTally {
    order: Vec<MatchId>,
    per_match: HashMap<MatchId, BTreeMap<Skill, Counts>>,
}

impl MatchTally {
    fn record(mut self, event: &RallyEvent) -> Self {
        if !self.per_match.contains_key(&event.match_id) {
            self.order.push(event.match_id.clone());
        }
        self.per_match
            .entry(event.match_id.clone())
            .or_default()
            .entry(event.skill)
            .or_default()
            .record(event.outcome);
        self
    }

    fn into_entries(mut self) -> Vec<(MatchId, BTreeMap<Skill, Counts>)> {
        self.order
            .into_iter()
            .filter_map(|id| self.per_match.remove(&id).map(|skills| (id, skills)))
            .collect()
    }
}

/// Builds one [`PlayerMatchStat`] per match in which the selected player
/// has at least one attempt, sorted by match name.
///
/// Filtering is strict equality on `player_id`: `None` selects exactly the
/// unassigned attempts. Matches without attempts are omitted, not
/// zero-filled.
///
/// # Examples
///
/// ```
/// use rally_stats_core::*;
///
/// let matches = vec![Match { id: "m1".into(), name: "Final".into(), date_iso: None }];
/// let events = vec![
///     RallyEvent { id: "1".into(), match_id: "m1".into(), skill: Skill::Spike,
///                  outcome: Outcome::Point, player_id: Some("A".into()) },
///     RallyEvent { id: "2".into(), match_id: "m1".into(), skill: Skill::Spike,
///                  outcome: Outcome::Miss, player_id: Some("A".into()) },
/// ];
/// let stats = build_player_match_stats(Some("A"), &matches, &events, &Weights::default());
/// assert_eq!(stats.len(), 1);
/// assert_eq!(stats[0].decision_rate, 0.5);
/// assert_eq!(stats[0].by_skill[&Skill::Spike].effect_rate, 0.5);
/// ```
pub fn build_player_match_stats(
    player: PlayerFilter<'_>,
    matches: &[Match],
    events: &[RallyEvent],
    weights: &Weights,
) -> Vec<PlayerMatchStat> {
    let names: HashMap<&str, &str> = matches
        .iter()
        .map(|m| (m.id.as_str(), m.name.as_str()))
        .collect();

    let tally = events
        .iter()
        .filter(|e| e.player_id.as_deref() == player)
        .fold(MatchTally::default(), MatchTally::record);

    let mut out: Vec<PlayerMatchStat> = tally
        .into_entries()
        .into_iter()
        .map(|(match_id, per_skill)| {
            let match_name = names
                .get(match_id.as_str())
                .copied()
                .unwrap_or(UNNAMED_MATCH)
                .to_string();
            summarize_match(match_id, match_name, per_skill, weights)
        })
        .collect();

    out.sort_by(|a, b| locale_cmp(&a.match_name, &b.match_name));

    tracing::debug!(
        player = ?player,
        matches = out.len(),
        "Built player match stats"
    );
    out
}

fn summarize_match(
    match_id: MatchId,
    match_name: String,
    per_skill: BTreeMap<Skill, Counts>,
    weights: &Weights,
) -> PlayerMatchStat {
    let mut total_counts = Counts::default();
    let mut total_score = 0.0;
    for (skill, counts) in &per_skill {
        total_counts.absorb(counts);
        total_score += weighted_score(counts, weights.row(*skill));
    }

    let total = total_counts.total();
    let (decision, effect) = if total == 0 {
        (0.0, 0.0)
    } else {
        (
            decision_rate(&total_counts),
            clamp01(total_score / f64::from(total)),
        )
    };

    let by_skill = per_skill
        .into_iter()
        .map(|(skill, counts)| {
            let stat = PerSkillStat {
                total: counts.total(),
                counts,
                decision_rate: decision_rate(&counts),
                effect_rate: effect_rate(&counts, weights.row(skill)),
            };
            (skill, stat)
        })
        .collect();

    PlayerMatchStat {
        match_id,
        match_name,
        total,
        decision_rate: decision,
        effect_rate: effect,
        by_skill,
    }
}

/// Case-folded ordering used for match names; ties fall back to the raw
/// strings so the order stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}
