//! Breadth-first discovery of event collections in an unknown graph.
//!
//! The traversal looks for arrays whose elements are mostly "event-like":
//! objects whose type-like field and result-like field are both strings.
//! A qualifying array contributes its event-like elements and is not
//! descended into; any other container has its children queued.
//!
//! Termination is guaranteed by two guards: a visited set keyed on node
//! identity (shared or cyclic references are expanded once) and a hard
//! budget on the number of dequeued nodes.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::node::{KeyValueNode, first_present};

/// Default number of dequeues before discovery gives up.
pub const DEFAULT_STEP_LIMIT: usize = 50_000;

/// Default minimum share of event-like elements for an array to qualify.
pub const DEFAULT_EVENT_RATIO: f64 = 0.5;

/// Keys that may carry the event type, in precedence order.
pub const TYPE_KEYS: &[&str] = &["type", "skill", "label"];

/// Keys that may carry the event result, in precedence order.
pub const RESULT_KEYS: &[&str] = &["result", "outcome"];

/// Tuning knobs for [`discover_events`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoveryConfig {
    /// Maximum number of dequeued nodes.
    pub step_limit: usize,
    /// Minimum event-like share (inclusive) for an array to qualify.
    pub event_ratio: f64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            step_limit: DEFAULT_STEP_LIMIT,
            event_ratio: DEFAULT_EVENT_RATIO,
        }
    }
}

/// Discovered raw records plus traversal diagnostics.
#[derive(Debug)]
pub struct Discovery<'a, N: ?Sized> {
    /// Event-like records, in discovery order.
    pub records: Vec<&'a N>,
    /// Nodes dequeued.
    pub steps: usize,
    /// Whether traversal stopped because the step budget ran out.
    pub budget_exhausted: bool,
    /// Number of arrays classified as event collections.
    pub collections: usize,
}

/// Serializable traversal diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryStats {
    pub steps: usize,
    pub budget_exhausted: bool,
    pub collections: usize,
    pub records: usize,
}

impl<N: ?Sized> Discovery<'_, N> {
    /// Diagnostics without the borrowed records.
    pub fn stats(&self) -> DiscoveryStats {
        DiscoveryStats {
            steps: self.steps,
            budget_exhausted: self.budget_exhausted,
            collections: self.collections,
            records: self.records.len(),
        }
    }
}

/// Whether `node` looks like a raw event record.
///
/// The first non-null type-like value and the first non-null result-like
/// value must both be strings.
///
/// # Examples
///
/// ```
/// use rally_stats_discovery::discover::is_event_like;
/// use serde_json::json;
///
/// assert!(is_event_like(&json!({"type": "spike", "result": "point"})));
/// assert!(is_event_like(&json!({"label": "serve", "outcome": "miss"})));
/// assert!(!is_event_like(&json!({"type": "spike"})));
/// assert!(!is_event_like(&json!({"type": 3, "skill": "spike", "result": "point"})));
/// ```
pub fn is_event_like<N: KeyValueNode + ?Sized>(node: &N) -> bool {
    if !node.is_object() {
        return false;
    }
    let has_type = first_present(node, TYPE_KEYS).is_some_and(|v| v.as_text().is_some());
    let has_result = first_present(node, RESULT_KEYS).is_some_and(|v| v.as_text().is_some());
    has_type && has_result
}

/// Convenience wrapper returning only the records.
pub fn find_event_records<N: KeyValueNode + ?Sized>(root: &N) -> Vec<&N> {
    discover_events(root, &DiscoveryConfig::default()).records
}

/// Runs the breadth-first search from `root`.
pub fn discover_events<'a, N: KeyValueNode + ?Sized>(
    root: &'a N,
    config: &DiscoveryConfig,
) -> Discovery<'a, N> {
    let mut records: Vec<&'a N> = Vec::new();
    let mut seen: HashSet<usize> = HashSet::new();
    let mut queue: VecDeque<&'a N> = VecDeque::from([root]);
    let mut steps = 0usize;
    let mut collections = 0usize;

    while steps < config.step_limit {
        let Some(current) = queue.pop_front() else {
            break;
        };
        steps += 1;

        if !current.is_container() {
            continue;
        }
        if !seen.insert(current.identity()) {
            continue;
        }

        if let Some(items) = current.array_items() {
            if !items.is_empty() {
                let event_count = items.iter().filter(|item| is_event_like(**item)).count();
                let ratio = event_count as f64 / items.len() as f64;
                if ratio >= config.event_ratio {
                    collections += 1;
                    debug!(
                        len = items.len(),
                        events = event_count,
                        "Found event collection"
                    );
                    records.extend(items.into_iter().filter(|item| is_event_like(*item)));
                    continue;
                }
            }
            queue.extend(items);
            continue;
        }

        if let Some(values) = current.object_values() {
            queue.extend(values);
        }
    }

    let budget_exhausted = !queue.is_empty() && steps >= config.step_limit;
    if budget_exhausted {
        warn!(
            steps,
            pending = queue.len(),
            "Event discovery stopped at step budget"
        );
    }
    debug!(
        steps,
        collections,
        records = records.len(),
        "Event discovery finished"
    );

    Discovery {
        records,
        steps,
        budget_exhausted,
        collections,
    }
}
