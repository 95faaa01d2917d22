//! End-to-end analysis of one loaded document.

use rally_stats_core::{
    Match, Player, PlayerFilter, PlayerMatchStat, RallyEvent, Weights, build_player_match_stats,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::canonical::canonicalize;
use crate::discover::{DiscoveryConfig, DiscoveryStats, discover_events};
use crate::envelope::{KeyEntry, export_timestamp, normalize_to_key_bag, pick_db_root};
use crate::summary::{EventSummary, players_from_summary, summarize_events};

/// Everything derived from one document, independent of player selection
/// and weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Key bag listing for diagnostics.
    pub keys: Vec<KeyEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    pub discovery: DiscoveryStats,
    pub summary: EventSummary,
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    pub events: Vec<RallyEvent>,
    /// Raw records dropped during canonicalization.
    pub dropped: usize,
}

impl Analysis {
    /// Per-match stats for one player (`None` = unassigned attempts).
    pub fn player_stats(&self, player: PlayerFilter<'_>, weights: &Weights) -> Vec<PlayerMatchStat> {
        build_player_match_stats(player, &self.matches, &self.events, weights)
    }

    /// Whether discovery found no event-like records at all.
    pub fn is_empty(&self) -> bool {
        self.summary.total == 0
    }
}

/// Runs envelope normalization, root selection, discovery, summary and
/// canonicalization on a parsed document.
///
/// Never fails; an unexpected shape yields an empty analysis.
///
/// # Examples
///
/// ```
/// use rally_stats_discovery::analysis::analyze_document;
/// use rally_stats_discovery::discover::DiscoveryConfig;
/// use serde_json::json;
///
/// let doc = json!({
///     "exportedAt": "2024-05-01T10:00:00Z",
///     "keys": {"volleyPwa.db.v2": {"events": [
///         {"type": "spike", "result": "point", "player": "A", "matchName": "Cup"},
///         {"type": "spike", "result": "miss", "player": "A", "matchName": "Cup"}
///     ]}}
/// });
/// let analysis = analyze_document(&doc, &DiscoveryConfig::default());
/// assert_eq!(analysis.summary.total, 2);
/// assert_eq!(analysis.matches.len(), 1);
/// assert_eq!(analysis.players[0].id, "A");
/// ```
pub fn analyze_document(root: &Value, config: &DiscoveryConfig) -> Analysis {
    let bag = normalize_to_key_bag(root);
    let db_root = pick_db_root(&bag);
    let discovery = discover_events(db_root, config);
    let summary = summarize_events(&discovery.records);
    let canonical = canonicalize(&discovery.records);
    let players = players_from_summary(&summary);

    info!(
        keys = bag.len(),
        records = discovery.records.len(),
        events = canonical.events.len(),
        matches = canonical.matches.len(),
        "Analyzed document"
    );

    Analysis {
        keys: bag.listing(),
        exported_at: export_timestamp(root),
        discovery: discovery.stats(),
        summary,
        players,
        matches: canonical.matches,
        events: canonical.events,
        dropped: canonical.dropped,
    }
}
