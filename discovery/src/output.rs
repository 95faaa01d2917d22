//! Output formatting for analysis summaries and player stats.

use rally_stats_core::{PlayerMatchStat, RallyEvent, Skill, format_pct};
use serde::Serialize;

use crate::analysis::Analysis;
use crate::discover::DiscoveryStats;
use crate::envelope::KeyEntry;
use crate::summary::EventSummary;

/// Rows shown per type/result table in text formats.
pub const TOP_ROWS: usize = 20;

/// Supported output formats.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// Quick-look view of an [`Analysis`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<&'a str>,
    pub key_count: usize,
    pub discovery: &'a DiscoveryStats,
    pub summary: &'a EventSummary,
}

impl<'a> SummaryView<'a> {
    pub fn new(analysis: &'a Analysis, source: Option<&'a str>) -> Self {
        Self {
            source,
            exported_at: analysis.exported_at.as_deref(),
            key_count: analysis.keys.len(),
            discovery: &analysis.discovery,
            summary: &analysis.summary,
        }
    }
}

/// Per-match stats of one player selection.
#[derive(Debug, Serialize)]
pub struct StatsReport<'a> {
    /// Selected player; `None` means unassigned attempts.
    pub player: Option<&'a str>,
    pub matches: &'a [PlayerMatchStat],
}

/// Formats an analysis summary in the requested output format.
pub fn format_summary(view: &SummaryView<'_>, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(view)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(view).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(summary_to_markdown(view)),
        OutputFormat::Table => Ok(summary_to_table(view)),
    }
}

/// Formats a stats report in the requested output format.
pub fn format_stats(report: &StatsReport<'_>, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(report).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(stats_to_markdown(report)),
        OutputFormat::Table => Ok(stats_to_table(report)),
    }
}

/// Formats the diagnostic key listing.
pub fn format_keys(keys: &[KeyEntry], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(keys)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(keys).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => {
            let mut out = String::from("| Key | Kind |\n|-----|------|\n");
            for entry in keys {
                out.push_str(&format!("| `{}` | {} |\n", entry.key, entry.kind));
            }
            Ok(out)
        }
        OutputFormat::Table => {
            let width = keys.iter().map(|e| e.key.chars().count()).max().unwrap_or(0);
            Ok(keys
                .iter()
                .map(|e| format!("{:<width$}  {}\n", e.key, e.kind))
                .collect())
        }
    }
}

/// Formats canonical events, one row per event in text formats.
pub fn format_events(events: &[RallyEvent], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(events)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(events).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => {
            let mut out = String::from(
                "| Id | Match | Skill | Result | Player |\n|----|-------|-------|--------|--------|\n",
            );
            for e in events {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    e.id,
                    e.match_id,
                    e.skill,
                    e.outcome,
                    player_caption(e.player_id.as_deref())
                ));
            }
            Ok(out)
        }
        OutputFormat::Table => Ok(events
            .iter()
            .map(|e| {
                format!(
                    "{}\t{}\t{}\t{}\t{}\n",
                    e.id,
                    e.match_id,
                    e.skill,
                    e.outcome,
                    e.player_id.as_deref().unwrap_or("-")
                )
            })
            .collect()),
    }
}

fn player_caption(player: Option<&str>) -> &str {
    player.unwrap_or("(unassigned)")
}

fn markdown_counts(out: &mut String, title: &str, rows: &[(String, usize)], limit: usize) {
    out.push_str(&format!("## {title}\n\n"));
    out.push_str("| Label | Count |\n");
    out.push_str("|-------|-------|\n");
    for (label, count) in rows.iter().take(limit) {
        out.push_str(&format!("| {label} | {count} |\n"));
    }
    out.push('\n');
}

fn summary_to_markdown(view: &SummaryView<'_>) -> String {
    let mut out = String::new();

    out.push_str("# Export Summary\n\n");
    if let Some(source) = view.source {
        out.push_str(&format!("- **Source:** {source}\n"));
    }
    out.push_str(&format!(
        "- **Exported at:** {}\n",
        view.exported_at.unwrap_or("-")
    ));
    out.push_str(&format!("- **Events:** {}\n", view.summary.total));
    out.push_str(&format!("- **Keys:** {}\n", view.key_count));
    out.push_str(&format!("- **Types:** {}\n\n", view.summary.by_type.len()));

    if view.summary.total == 0 {
        out.push_str("> No event-like records were detected. ");
        out.push_str("The export structure or field names may differ from what is expected.\n");
        return out;
    }

    markdown_counts(&mut out, "Types", &view.summary.by_type, TOP_ROWS);
    markdown_counts(&mut out, "Results", &view.summary.by_result, TOP_ROWS);
    markdown_counts(
        &mut out,
        "Players",
        &view.summary.by_player,
        view.summary.by_player.len(),
    );
    out
}

fn table_counts(out: &mut String, title: &str, rows: &[(String, usize)], limit: usize) {
    out.push_str(&format!("\n{title}:\n"));
    let width = rows
        .iter()
        .take(limit)
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(4);
    for (label, count) in rows.iter().take(limit) {
        out.push_str(&format!("  {label:<width$}  {count}\n"));
    }
}

fn summary_to_table(view: &SummaryView<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Events: {}  Keys: {}  Types: {}",
        view.summary.total,
        view.key_count,
        view.summary.by_type.len()
    ));
    if let Some(at) = view.exported_at {
        out.push_str(&format!("  Exported: {at}"));
    }
    out.push('\n');

    if view.discovery.budget_exhausted {
        out.push_str(&format!(
            "  warning: discovery stopped after {} steps\n",
            view.discovery.steps
        ));
    }
    if view.summary.total == 0 {
        out.push_str("  no event-like records detected\n");
        return out;
    }

    table_counts(&mut out, "Types", &view.summary.by_type, TOP_ROWS);
    table_counts(&mut out, "Results", &view.summary.by_result, TOP_ROWS);
    table_counts(
        &mut out,
        "Players",
        &view.summary.by_player,
        view.summary.by_player.len(),
    );
    out
}

fn stats_to_markdown(report: &StatsReport<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "# Player: {}\n\n",
        player_caption(report.player)
    ));
    if report.matches.is_empty() {
        out.push_str("No events recorded for this player yet.\n");
        return out;
    }

    for m in report.matches {
        out.push_str(&format!("## {}\n\n", m.match_name));
        out.push_str(&format!(
            "Attempts {} / decision {} / effect {}\n\n",
            m.total,
            format_pct(m.decision_rate),
            format_pct(m.effect_rate)
        ));
        out.push_str("| Skill | Attempts | Decision | Effect |\n");
        out.push_str("|-------|----------|----------|--------|\n");
        for skill in Skill::ALL {
            let Some(stat) = m.by_skill.get(&skill) else {
                continue;
            };
            if stat.total == 0 {
                continue;
            }
            out.push_str(&format!(
                "| {skill} | {} | {} | {} |\n",
                stat.total,
                format_pct(stat.decision_rate),
                format_pct(stat.effect_rate)
            ));
        }
        out.push('\n');
    }
    out
}

fn stats_to_table(report: &StatsReport<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!("Player: {}\n", player_caption(report.player)));
    if report.matches.is_empty() {
        out.push_str("  no events\n");
        return out;
    }

    for m in report.matches {
        out.push_str(&format!(
            "\n{}  attempts={} decision={} effect={}\n",
            m.match_name,
            m.total,
            format_pct(m.decision_rate),
            format_pct(m.effect_rate)
        ));
        for (skill, stat) in &m.by_skill {
            if stat.total == 0 {
                continue;
            }
            out.push_str(&format!(
                "  {:<8} {:>5} {:>7} {:>7}\n",
                skill.as_str(),
                stat.total,
                format_pct(stat.decision_rate),
                format_pct(stat.effect_rate)
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use rally_stats_core::Weights;
    use serde_json::json;

    use super::*;
    use crate::analysis::analyze_document;
    use crate::discover::DiscoveryConfig;

    fn sample_analysis() -> Analysis {
        let doc = json!({
            "exportedAt": "2024-05-01T10:00:00Z",
            "keys": {"volleyPwa.db.v2": {"events": [
                {"type": "spike", "result": "point", "player": "A", "matchName": "Cup"},
                {"type": "spike", "result": "miss", "player": "A", "matchName": "Cup"},
                {"type": "serve", "result": "ace", "player": "B", "matchName": "League"}
            ]}}
        });
        analyze_document(&doc, &DiscoveryConfig::default())
    }

    #[test]
    fn test_format_summary_json() {
        let analysis = sample_analysis();
        let view = SummaryView::new(&analysis, Some("file"));
        let json = format_summary(&view, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["summary"]["total"], 3);
        assert_eq!(parsed["keyCount"], 1);
        assert_eq!(parsed["exportedAt"], "2024-05-01T10:00:00Z");
    }

    #[test]
    fn test_format_summary_yaml() {
        let analysis = sample_analysis();
        let view = SummaryView::new(&analysis, None);
        let yaml = format_summary(&view, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("keyCount: 1"));
    }

    #[test]
    fn test_format_summary_markdown() {
        let analysis = sample_analysis();
        let md = format_summary(&SummaryView::new(&analysis, None), OutputFormat::Markdown).unwrap();
        assert!(md.contains("# Export Summary"));
        assert!(md.contains("| spike | 2 |"));
        assert!(md.contains("## Players"));
    }

    #[test]
    fn test_format_summary_empty_warns() {
        let analysis = analyze_document(&json!({"settings": {}}), &DiscoveryConfig::default());
        let view = SummaryView::new(&analysis, None);
        let md = format_summary(&view, OutputFormat::Markdown).unwrap();
        assert!(md.contains("No event-like records"));
        let table = format_summary(&view, OutputFormat::Table).unwrap();
        assert!(table.contains("no event-like records detected"));
    }

    #[test]
    fn test_format_stats_markdown() {
        let analysis = sample_analysis();
        let stats = analysis.player_stats(Some("A"), &Weights::default());
        let report = StatsReport {
            player: Some("A"),
            matches: &stats,
        };
        let md = format_stats(&report, OutputFormat::Markdown).unwrap();
        assert!(md.contains("# Player: A"));
        assert!(md.contains("## Cup"));
        assert!(md.contains("| spike | 2 | 50.0% | 50.0% |"));
        assert!(!md.contains("League"));
    }

    #[test]
    fn test_format_stats_json_uses_camel_case() {
        let analysis = sample_analysis();
        let stats = analysis.player_stats(Some("B"), &Weights::default());
        let report = StatsReport {
            player: Some("B"),
            matches: &stats,
        };
        let json = format_stats(&report, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["matches"][0]["matchName"], "League");
        assert_eq!(parsed["matches"][0]["bySkill"]["serve"]["decisionRate"], 1.0);
    }

    #[test]
    fn test_format_stats_table_for_unassigned_without_events() {
        let report = StatsReport {
            player: None,
            matches: &[],
        };
        let table = format_stats(&report, OutputFormat::Table).unwrap();
        assert!(table.contains("Player: (unassigned)"));
        assert!(table.contains("no events"));
    }

    #[test]
    fn test_format_keys_table_aligns_kinds() {
        let analysis = sample_analysis();
        let table = format_keys(&analysis.keys, OutputFormat::Table).unwrap();
        assert_eq!(table, "volleyPwa.db.v2  object\n");
    }

    #[test]
    fn test_format_events_rows() {
        let analysis = sample_analysis();
        let table = format_events(&analysis.events, OutputFormat::Table).unwrap();
        let first = table.lines().next().unwrap();
        assert!(first.starts_with("ev-0\t"));
        assert!(first.ends_with("\tspike\tpoint\tA"));

        let json = format_events(&analysis.events, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[2]["result"], "point");
        assert_eq!(parsed[2]["playerId"], "B");
    }
}
