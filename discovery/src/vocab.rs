//! Synonym tables mapping free-form labels onto [`Skill`] and [`Outcome`].
//!
//! Exports mix English abbreviations, full words, scorer shorthand symbols
//! and Japanese terms. A label is matched verbatim (trimmed, lowercased)
//! first, then again with separators removed, so `in_play`, `in-play` and
//! `In Play` all resolve like `inplay`.

use std::sync::LazyLock;

use rally_stats_core::{Outcome, Skill};
use regex::Regex;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_\-.・]+").expect("separator pattern is valid"));

const SKILL_SYNONYMS: &[(&str, Skill)] = &[
    ("spike", Skill::Spike),
    ("spk", Skill::Spike),
    ("attack", Skill::Spike),
    ("atk", Skill::Spike),
    ("att", Skill::Spike),
    ("hit", Skill::Spike),
    ("hitting", Skill::Spike),
    ("スパイク", Skill::Spike),
    ("アタック", Skill::Spike),
    ("攻撃", Skill::Spike),
    ("serve", Skill::Serve),
    ("service", Skill::Serve),
    ("srv", Skill::Serve),
    ("sv", Skill::Serve),
    ("サーブ", Skill::Serve),
    ("block", Skill::Block),
    ("blk", Skill::Block),
    ("blocking", Skill::Block),
    ("ブロック", Skill::Block),
    ("receive", Skill::Receive),
    ("reception", Skill::Receive),
    ("rec", Skill::Receive),
    ("rcv", Skill::Receive),
    ("recv", Skill::Receive),
    ("dig", Skill::Receive),
    ("pass", Skill::Receive),
    ("レシーブ", Skill::Receive),
    ("サーブレシーブ", Skill::Receive),
    ("サーブカット", Skill::Receive),
    ("set", Skill::Set),
    ("setting", Skill::Set),
    ("toss", Skill::Set),
    ("トス", Skill::Set),
    ("セット", Skill::Set),
];

const OUTCOME_SYNONYMS: &[(&str, Outcome)] = &[
    ("point", Outcome::Point),
    ("pt", Outcome::Point),
    ("pts", Outcome::Point),
    ("kill", Outcome::Point),
    ("ace", Outcome::Point),
    ("score", Outcome::Point),
    ("win", Outcome::Point),
    ("won", Outcome::Point),
    ("#", Outcome::Point),
    ("得点", Outcome::Point),
    ("決定", Outcome::Point),
    ("effective", Outcome::Effective),
    ("eff", Outcome::Effective),
    ("good", Outcome::Effective),
    ("positive", Outcome::Effective),
    ("+", Outcome::Effective),
    ("効果", Outcome::Effective),
    ("効果あり", Outcome::Effective),
    ("有効", Outcome::Effective),
    ("continue", Outcome::Continue),
    ("cont", Outcome::Continue),
    ("inplay", Outcome::Continue),
    ("rally", Outcome::Continue),
    ("neutral", Outcome::Continue),
    ("!", Outcome::Continue),
    ("継続", Outcome::Continue),
    ("つなぎ", Outcome::Continue),
    ("miss", Outcome::Miss),
    ("error", Outcome::Miss),
    ("err", Outcome::Miss),
    ("fault", Outcome::Miss),
    ("out", Outcome::Miss),
    ("lost", Outcome::Miss),
    ("-", Outcome::Miss),
    ("=", Outcome::Miss),
    ("ミス", Outcome::Miss),
    ("失点", Outcome::Miss),
];

fn lookup<T: Copy>(table: &[(&str, T)], label: &str) -> Option<T> {
    table
        .iter()
        .find(|(synonym, _)| *synonym == label)
        .map(|(_, value)| *value)
}

fn resolve<T: Copy>(table: &[(&str, T)], raw: &str) -> Option<T> {
    let label = raw.trim().to_lowercase();
    if label.is_empty() {
        return None;
    }
    lookup(table, &label).or_else(|| {
        let compact = SEPARATORS.replace_all(&label, "");
        lookup(table, &compact)
    })
}

/// Maps a free-form skill label onto a [`Skill`].
///
/// # Examples
///
/// ```
/// use rally_stats_core::Skill;
/// use rally_stats_discovery::vocab::skill_from_label;
///
/// assert_eq!(skill_from_label("atk"), Some(Skill::Spike));
/// assert_eq!(skill_from_label(" Reception "), Some(Skill::Receive));
/// assert_eq!(skill_from_label("timeout"), None);
/// ```
pub fn skill_from_label(raw: &str) -> Option<Skill> {
    resolve(SKILL_SYNONYMS, raw)
}

/// Maps a free-form result label onto an [`Outcome`].
///
/// # Examples
///
/// ```
/// use rally_stats_core::Outcome;
/// use rally_stats_discovery::vocab::outcome_from_label;
///
/// assert_eq!(outcome_from_label("inplay"), Some(Outcome::Continue));
/// assert_eq!(outcome_from_label("In-Play"), Some(Outcome::Continue));
/// assert_eq!(outcome_from_label("#"), Some(Outcome::Point));
/// ```
pub fn outcome_from_label(raw: &str) -> Option<Outcome> {
    resolve(OUTCOME_SYNONYMS, raw)
}
