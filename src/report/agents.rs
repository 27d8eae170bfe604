//! Agent section splitting.
//!
//! A report from the backend crew interleaves the output of up to five
//! agents. Each agent is located by its name token or glyph; its section
//! runs from the line after that marker to the first marker of any agent
//! that comes *later* in the canonical pipeline, or to the end of the text.
//!
//! Sections are always emitted in canonical order. When markers appear out
//! of order in the text, a section may come out empty or swallow content
//! that belongs to another agent; this mirrors how the backend reports are
//! consumed elsewhere and is kept as-is.

use serde::{Deserialize, Serialize};

use super::patterns::{AGENT_HEADER_LINE, AGENT_MARKERS, AGENT_TOKEN};

/// One stage of the backend analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Monitor,
    Sentiment,
    Priority,
    Context,
    Response,
}

impl AgentKind {
    /// All agents in canonical pipeline order.
    pub const ALL: [AgentKind; 5] = [
        AgentKind::Monitor,
        AgentKind::Sentiment,
        AgentKind::Priority,
        AgentKind::Context,
        AgentKind::Response,
    ];

    /// Position in the canonical pipeline.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Monitor => "Monitor Agent",
            Self::Sentiment => "Sentiment Analyzer",
            Self::Priority => "Priority Ranker",
            Self::Context => "Context Investigator",
            Self::Response => "Response Coordinator",
        }
    }

    /// Glyph the backend prints next to the agent's output.
    pub fn icon(self) -> &'static str {
        AGENT_MARKERS[self.ordinal()].1
    }

    pub fn color(self) -> ColorTag {
        match self {
            Self::Monitor => ColorTag::Blue,
            Self::Sentiment => ColorTag::Green,
            Self::Priority => ColorTag::Orange,
            Self::Context => ColorTag::Purple,
            Self::Response => ColorTag::Pink,
        }
    }

    /// Whether the agent runs in the fast (three-agent) workflow.
    pub fn in_fast_workflow(self) -> bool {
        matches!(self, Self::Monitor | Self::Sentiment | Self::Response)
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Display color attached to a section or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTag {
    Blue,
    Green,
    Orange,
    Purple,
    Pink,
    Red,
    Yellow,
}

impl std::fmt::Display for ColorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Red => "red",
            Self::Yellow => "yellow",
        };
        f.write_str(s)
    }
}

/// Name of the catch-all section used when no agent marker is found.
pub const FALLBACK_SECTION_NAME: &str = "Analysis Results";

const FALLBACK_ICON: &str = "📊";

/// A contiguous span of the report attributed to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSection {
    /// `None` for the catch-all section.
    pub agent: Option<AgentKind>,
    pub name: String,
    pub icon: String,
    pub color: ColorTag,
    pub body: String,
}

impl AgentSection {
    fn for_agent(kind: AgentKind, body: &str) -> Self {
        Self {
            agent: Some(kind),
            name: kind.name().to_string(),
            icon: kind.icon().to_string(),
            color: kind.color(),
            body: body.trim().to_string(),
        }
    }

    fn fallback(report: &str) -> Self {
        Self {
            agent: None,
            name: FALLBACK_SECTION_NAME.to_string(),
            icon: FALLBACK_ICON.to_string(),
            color: ColorTag::Blue,
            body: report.to_string(),
        }
    }

    /// Whether this is the catch-all section.
    pub fn is_fallback(&self) -> bool {
        self.agent.is_none()
    }
}

/// Whether the agent's name token or glyph occurs verbatim in the report.
fn agent_present(report: &str, kind: AgentKind) -> bool {
    let (token, glyph) = AGENT_MARKERS[kind.ordinal()];
    report.contains(token) || report.contains(glyph)
}

/// Split a report into per-agent sections in canonical order.
///
/// A report without any agent marker, the empty one included, yields a
/// single [`FALLBACK_SECTION_NAME`] section holding the entire input.
pub fn parse_agent_sections(report: &str) -> Vec<AgentSection> {
    let mut sections = Vec::new();
    for kind in AgentKind::ALL {
        if !agent_present(report, kind) {
            continue;
        }
        let Some(header) = AGENT_HEADER_LINE[kind.ordinal()].find(report) else {
            continue;
        };
        let start = header.end();
        let end = AGENT_TOKEN[kind.ordinal() + 1..]
            .iter()
            .filter_map(|stop| stop.find_at(report, start).map(|m| m.start()))
            .min()
            .unwrap_or(report.len());
        tracing::trace!(agent = %kind, start, end, "agent section located");
        sections.push(AgentSection::for_agent(kind, &report[start..end]));
    }

    if sections.is_empty() {
        sections.push(AgentSection::fallback(report));
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEEP_REPORT: &str = "\
📡 Monitor Agent results
Found 42 mentions across Reddit and X.

😊 Sentiment Analyzer results
Overall tone is negative.

🎯 Priority Ranker results
Outage ranked first.

🔍 Context Investigator results
Systemic billing issue.

📧 Response Coordinator results
Drafted three emails.";

    #[test]
    fn no_marker_yields_fallback_with_entire_input() {
        let report = "  plain text with no markers\n";
        let sections = parse_agent_sections(report);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, FALLBACK_SECTION_NAME);
        assert_eq!(sections[0].body, report);
        assert!(sections[0].is_fallback());
    }

    #[test]
    fn empty_report_yields_empty_fallback() {
        let sections = parse_agent_sections("");
        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_fallback());
        assert_eq!(sections[0].body, "");
    }

    #[test]
    fn all_five_agents_in_order() {
        let sections = parse_agent_sections(DEEP_REPORT);
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Monitor Agent",
                "Sentiment Analyzer",
                "Priority Ranker",
                "Context Investigator",
                "Response Coordinator",
            ]
        );
        assert_eq!(sections[0].body, "Found 42 mentions across Reddit and X.");
        assert_eq!(sections[1].body, "Overall tone is negative.");
        assert_eq!(sections[4].body, "Drafted three emails.");
        assert_eq!(sections[2].color, ColorTag::Orange);
    }

    #[test]
    fn out_of_order_markers_still_come_out_canonical() {
        let report = "Response plan\nsend emails\nMonitor Agent log\nscan done\n";
        let sections = parse_agent_sections(report);
        let kinds: Vec<_> = sections.iter().filter_map(|s| s.agent).collect();
        assert_eq!(kinds, vec![AgentKind::Monitor, AgentKind::Response]);
        assert_eq!(sections[0].body, "scan done");
        // Response capture starts after its own line and runs to the end.
        assert_eq!(sections[1].body, "send emails\nMonitor Agent log\nscan done");
    }

    #[test]
    fn later_marker_before_anchor_yields_truncated_capture() {
        // Sentiment's body stops at the earliest later-agent token after it,
        // which here is the word "priority" on its own header line.
        let report = "Sentiment summary\npriority is low\nmore text";
        let sections = parse_agent_sections(report);
        let sentiment = sections
            .iter()
            .find(|s| s.agent == Some(AgentKind::Sentiment))
            .unwrap();
        assert_eq!(sentiment.body, "");
    }

    #[test]
    fn marker_on_last_line_without_newline_is_skipped() {
        let sections = parse_agent_sections("intro\n📡 Monitor Agent");
        assert_eq!(sections.len(), 1);
        assert!(sections[0].is_fallback());
    }

    #[test]
    fn fast_workflow_membership() {
        let fast: Vec<_> = AgentKind::ALL
            .into_iter()
            .filter(|k| k.in_fast_workflow())
            .collect();
        assert_eq!(
            fast,
            vec![AgentKind::Monitor, AgentKind::Sentiment, AgentKind::Response]
        );
    }
}
