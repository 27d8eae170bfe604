//! Result normalization: wire result in, structured report out.

use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::agents::{AgentSection, parse_agent_sections};
use super::emails::{EmailRecord, EmailTier, parse_email_records_with_tier};
use super::filter::FilterCriteria;
use super::insights::{ExecutiveInsights, extract_executive_insights, parse_insight_sections};
use super::metrics::{ScalarMetrics, parse_mentions_count, parse_sentiment_score};
use crate::error::UnknownVariant;

/// Backend analysis pipeline variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Workflow {
    #[default]
    Fast,
    Deep,
}

impl Workflow {
    /// Number of agents the backend runs for this workflow.
    pub fn agent_count(self) -> u32 {
        match self {
            Self::Fast => 3,
            Self::Deep => 5,
        }
    }

    /// Path segment used by the backend (`/analyze/{workflow}`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Deep => "deep",
        }
    }

    /// Human label, e.g. `Fast (3 agents)`.
    pub fn label(self) -> String {
        let name = match self {
            Self::Fast => "Fast",
            Self::Deep => "Deep",
        };
        format!("{name} ({} agents)", self.agent_count())
    }
}

impl std::fmt::Display for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Workflow {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "deep" => Ok(Self::Deep),
            _ => Err(UnknownVariant::new("workflow", s)),
        }
    }
}

/// Processing time as reported by the backend: seconds, or preformatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProcessingTime {
    Seconds(f64),
    Text(String),
}

impl ProcessingTime {
    /// Duration in seconds. Text is read by its digits and dots alone, so
    /// `"12.5 seconds"` is 12.5.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Seconds(s) => Some(*s),
            Self::Text(t) => t
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect::<String>()
                .parse()
                .ok(),
        }
    }
}

impl std::fmt::Display for ProcessingTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Seconds(s) => write!(f, "{s}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}

/// One analysis result as returned by the backend. Unknown fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub status: Option<String>,
    pub company: String,
    #[serde(default)]
    pub workflow: Workflow,
    #[serde(default)]
    pub agents_used: Option<u32>,
    #[serde(default)]
    pub processing_time: Option<ProcessingTime>,
    #[serde(default)]
    pub execution_timestamp: Option<String>,
    #[serde(default)]
    pub search_platforms: Vec<String>,
    #[serde(default)]
    pub data_source: Option<String>,
    /// The free-form report all extraction runs on.
    #[serde(default)]
    pub crew_output: Option<String>,
    /// Set on copies produced by [`filter_result`](super::filter::filter_result).
    #[serde(default)]
    pub filtered: bool,
    #[serde(default, alias = "activeFilters")]
    pub active_filters: Option<FilterCriteria>,
}

impl AnalysisResult {
    /// Minimal successful result around a report.
    pub fn new(company: impl Into<String>, workflow: Workflow, crew_output: impl Into<String>) -> Self {
        Self {
            status: Some("success".to_string()),
            company: company.into(),
            workflow,
            agents_used: Some(workflow.agent_count()),
            processing_time: None,
            execution_timestamp: None,
            search_platforms: Vec::new(),
            data_source: None,
            crew_output: Some(crew_output.into()),
            filtered: false,
            active_filters: None,
        }
    }

    /// The report text, empty when the backend sent none.
    pub fn report(&self) -> &str {
        self.crew_output.as_deref().unwrap_or("")
    }
}

/// Everything extracted from one analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedReport {
    pub company: String,
    pub workflow: Workflow,
    pub processing_time: Option<ProcessingTime>,
    pub agents: Vec<AgentSection>,
    pub emails: Vec<EmailRecord>,
    /// Strategy that produced `emails`, `None` when there are none.
    pub email_tier: Option<EmailTier>,
    pub insights: Option<ExecutiveInsights>,
    pub metrics: ScalarMetrics,
    pub filtered: bool,
}

impl NormalizedReport {
    /// Whether the report carried any text at all.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Run every extractor over the result's report.
///
/// A missing or empty report produces the empty result: no sections, no
/// emails, no insights and default metrics.
pub fn normalize(result: &AnalysisResult) -> NormalizedReport {
    let report = result.report();
    if report.is_empty() {
        tracing::debug!(company = %result.company, "no report text to normalize");
    }

    let (email_tier, emails) = match parse_email_records_with_tier(report) {
        Some((tier, records)) => (Some(tier), records),
        None => (None, Vec::new()),
    };
    let insights = extract_executive_insights(report).map(|block| parse_insight_sections(&block));

    let metrics = ScalarMetrics::from_report(report);

    NormalizedReport {
        company: result.company.clone(),
        workflow: result.workflow,
        processing_time: result.processing_time.clone(),
        agents: if report.is_empty() {
            Vec::new()
        } else {
            parse_agent_sections(report)
        },
        emails,
        email_tier,
        insights,
        metrics,
        filtered: result.filtered,
    }
}

/// Per-company row of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub company: String,
    pub sentiment_score: u8,
    pub mentions: Option<u64>,
    pub processing_time: Option<ProcessingTime>,
}

/// Side-by-side metrics for two or three companies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub workflow: Workflow,
    pub entries: Vec<ComparisonEntry>,
    /// Index of the best performer, `None` when every score is zero.
    pub best: Option<usize>,
}

impl ComparisonSummary {
    pub fn best_entry(&self) -> Option<&ComparisonEntry> {
        self.best.and_then(|i| self.entries.get(i))
    }
}

/// Score each result and pick the best performer.
///
/// The best performer is the first entry whose sentiment score is strictly
/// higher than every earlier one, starting from zero.
pub fn compare(results: &[AnalysisResult], workflow: Workflow) -> ComparisonSummary {
    let entries: Vec<ComparisonEntry> = results
        .par_iter()
        .map(|r| {
            let report = r.report();
            ComparisonEntry {
                company: r.company.clone(),
                sentiment_score: parse_sentiment_score(report),
                mentions: parse_mentions_count(report),
                processing_time: r.processing_time.clone(),
            }
        })
        .collect();

    let mut best = None;
    let mut best_score = 0;
    for (i, entry) in entries.iter().enumerate() {
        if entry.sentiment_score > best_score {
            best_score = entry.sentiment_score;
            best = Some(i);
        }
    }

    ComparisonSummary {
        workflow,
        entries,
        best,
    }
}
