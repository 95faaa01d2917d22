//! Quick-look frequency tallies over raw event records.
//!
//! Labels are taken verbatim from the raw fields, before any vocabulary
//! mapping, so the summary shows what the export actually contains.

use std::collections::HashMap;

use rally_stats_core::Player;
use serde::{Deserialize, Serialize};

use crate::discover::{RESULT_KEYS, TYPE_KEYS};
use crate::node::{KeyValueNode, first_present, number_label};

/// Bucket for missing or unusable labels.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Maximum number of rows kept in the player table.
pub const PLAYER_TABLE_LIMIT: usize = 30;

/// Keys that may carry the player label in raw records.
pub const PLAYER_KEYS: &[&str] = &["playerId", "player"];

/// Frequency tables over raw records, each sorted by descending count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub total: usize,
    pub by_type: Vec<(String, usize)>,
    pub by_result: Vec<(String, usize)>,
    /// Top [`PLAYER_TABLE_LIMIT`] players.
    pub by_player: Vec<(String, usize)>,
}

/// Insertion-ordered counter.
#[derive(Debug, Default)]
struct Tally {
    rows: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    fn bump(&mut self, label: String) {
        match self.index.get(&label) {
            Some(&slot) => self.rows[slot].1 += 1,
            None => {
                self.index.insert(label.clone(), self.rows.len());
                self.rows.push((label, 1));
            }
        }
    }

    /// Rows by descending count; ties keep first-seen order.
    fn into_sorted(self) -> Vec<(String, usize)> {
        let mut rows = self.rows;
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        rows
    }
}

#[derive(Debug, Default)]
struct SummaryAcc {
    total: usize,
    by_type: Tally,
    by_result: Tally,
    by_player: Tally,
}

fn scalar_label<N: KeyValueNode + ?Sized>(node: Option<&N>) -> String {
    let Some(node) = node else {
        return UNKNOWN_LABEL.to_string();
    };
    if let Some(text) = node.as_text() {
        return text.to_string();
    }
    if let Some(n) = node.as_finite() {
        return number_label(n);
    }
    if let Some(flag) = node.as_flag() {
        return flag.to_string();
    }
    UNKNOWN_LABEL.to_string()
}

/// Falsy player values (empty string, zero, `false`) fold into `unknown`.
fn player_label<N: KeyValueNode + ?Sized>(record: &N) -> String {
    let Some(node) = first_present(record, PLAYER_KEYS) else {
        return UNKNOWN_LABEL.to_string();
    };
    let falsy = node.as_text().is_some_and(str::is_empty)
        || node.as_finite().is_some_and(|n| n == 0.0)
        || node.as_flag() == Some(false);
    if falsy {
        return UNKNOWN_LABEL.to_string();
    }
    scalar_label(Some(node))
}

/// Tallies raw records by type, result and player label.
///
/// Never fails: malformed records land in the `unknown` buckets.
///
/// # Examples
///
/// ```
/// use rally_stats_discovery::summary::summarize_events;
/// use serde_json::json;
///
/// let records = [
///     json!({"type": "spike", "result": "point", "player": "A"}),
///     json!({"type": "spike", "result": "miss"}),
/// ];
/// let refs: Vec<_> = records.iter().collect();
/// let summary = summarize_events(&refs);
/// assert_eq!(summary.total, 2);
/// assert_eq!(summary.by_type, vec![("spike".to_string(), 2)]);
/// ```
pub fn summarize_events<N: KeyValueNode + ?Sized>(records: &[&N]) -> EventSummary {
    let acc = records.iter().fold(SummaryAcc::default(), |mut acc, record| {
        acc.total += 1;
        acc.by_type.bump(scalar_label(first_present(*record, TYPE_KEYS)));
        acc.by_result
            .bump(scalar_label(first_present(*record, RESULT_KEYS)));
        acc.by_player.bump(player_label(*record));
        acc
    });

    let mut by_player = acc.by_player.into_sorted();
    by_player.truncate(PLAYER_TABLE_LIMIT);

    EventSummary {
        total: acc.total,
        by_type: acc.by_type.into_sorted(),
        by_result: acc.by_result.into_sorted(),
        by_player,
    }
}

/// Players observed in the summary, excluding the `unknown` bucket.
pub fn players_from_summary(summary: &EventSummary) -> Vec<Player> {
    summary
        .by_player
        .iter()
        .filter(|(label, _)| label != UNKNOWN_LABEL)
        .map(|(label, _)| Player::from_label(label.clone()))
        .collect()
}
