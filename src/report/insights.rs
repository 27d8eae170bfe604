//! Executive insights extraction.
//!
//! Deep runs end with a six-part executive briefing. Locating it is a
//! two-step affair: [`extract_executive_insights`] finds the briefing block
//! using a list of anchors, then [`parse_insight_sections`] splits the block
//! into its numbered sections.

use serde::{Deserialize, Serialize};

use super::patterns::{
    INSIGHT_SECTIONS, RE_BLANK_LINE, RE_INSIGHTS_BREAK, RE_INSIGHTS_FILE, RE_INSIGHTS_FULL,
    RE_INSIGHTS_HEADER, RE_LIST_MARKER, RE_OUTPUTS_MARKER,
};

/// The six sections of an executive briefing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveInsights {
    pub summary: String,
    pub actions: Vec<String>,
    pub trends: Vec<String>,
    pub recommendations: Vec<String>,
    pub risk: String,
    pub opportunities: Vec<String>,
}

impl ExecutiveInsights {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::classify(&self.risk)
    }

    /// True when no section carried any content.
    pub fn is_blank(&self) -> bool {
        self.summary.is_empty()
            && self.actions.is_empty()
            && self.trends.is_empty()
            && self.recommendations.is_empty()
            && self.risk.is_empty()
            && self.opportunities.is_empty()
    }
}

/// Overall risk rating stated in the risk assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Case-sensitive keyword containment; anything unrated is low.
    pub fn classify(risk: &str) -> Self {
        if risk.contains("CRITICAL") {
            Self::Critical
        } else if risk.contains("HIGH") {
            Self::High
        } else if risk.contains("MEDIUM") {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

type AnchorFn = fn(&str) -> Option<String>;

/// Block anchors, tried in order.
const INSIGHT_ANCHORS: [(&str, AnchorFn); 3] = [
    ("insights-file", insights_file_block),
    ("direct-header", direct_header_block),
    ("full-span", full_span_block),
];

/// Locate the executive briefing in a report.
///
/// Returns `None` when none of the anchors match; callers should then show
/// no insights at all rather than an empty dashboard.
pub fn extract_executive_insights(report: &str) -> Option<String> {
    if report.is_empty() {
        return None;
    }
    INSIGHT_ANCHORS.iter().find_map(|(name, anchor)| {
        let block = anchor(report).filter(|b| !b.is_empty())?;
        tracing::debug!(anchor = name, len = block.len(), "executive insights located");
        Some(block)
    })
}

/// Span after an `outputs/insights_*.txt` marker up to the next virtual file.
fn insights_file_block(report: &str) -> Option<String> {
    let marker = RE_INSIGHTS_FILE.find(report)?;
    let end = RE_OUTPUTS_MARKER
        .find_at(report, marker.end())
        .map_or(report.len(), |m| m.start());
    Some(report[marker.end()..end].trim().to_string())
}

/// Header line through the first paragraph break that starts a new topic.
fn direct_header_block(report: &str) -> Option<String> {
    let header = RE_INSIGHTS_HEADER.find(report)?;
    let end = RE_INSIGHTS_BREAK
        .find_at(report, header.end())
        .map_or(report.len(), |m| m.start());
    Some(report[header.start()..end].trim().to_string())
}

/// Everything from section one through section six's first paragraph.
fn full_span_block(report: &str) -> Option<String> {
    let span = RE_INSIGHTS_FULL.find(report)?;
    let end = RE_BLANK_LINE
        .find_at(report, span.end())
        .map_or(report.len(), |m| m.start());
    Some(report[span.start()..end].trim().to_string())
}

/// Split a briefing block into its six sections.
///
/// Missing sections come back empty; this never fails.
pub fn parse_insight_sections(insights: &str) -> ExecutiveInsights {
    let mut raw: [String; 6] = Default::default();
    for (slot, (header, stop)) in raw.iter_mut().zip(INSIGHT_SECTIONS.iter()) {
        let Some(m) = header.find(insights) else {
            continue;
        };
        let rest = &insights[m.end()..];
        let end = stop.and_then(|s| rest.find(s)).unwrap_or(rest.len());
        *slot = rest[..end].to_string();
    }
    let [summary, actions, trends, recommendations, risk, opportunities] = raw;

    ExecutiveInsights {
        summary: summary.trim().to_string(),
        actions: parse_list_items(&actions),
        trends: parse_list_items(&trends),
        recommendations: parse_list_items(&recommendations),
        risk: risk.trim().to_string(),
        opportunities: parse_list_items(&opportunities),
    }
}

/// Split a section on bullet or numbered-list markers.
pub fn parse_list_items(text: &str) -> Vec<String> {
    RE_LIST_MARKER
        .split(text)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
