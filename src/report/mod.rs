//! Report extraction and normalization.
//!
//! Everything under this module is pure: it takes report text (or a wire
//! [`AnalysisResult`]) and returns structured records. Extraction is
//! best-effort and never fails; missing data degrades to defaults.
//!
//! - [`agents`]: per-agent section splitting
//! - [`emails`]: draft email records, via an ordered list of strategies
//! - [`insights`]: executive briefing location and section parsing
//! - [`metrics`]: mentions, critical issues, sentiment and urgency scores
//! - [`filter`]: line filters and item sorting
//! - [`normalize`]: the composition of all of the above, plus comparisons

pub mod agents;
pub mod emails;
pub mod filter;
pub mod insights;
pub mod metrics;
pub mod normalize;
pub(crate) mod patterns;

pub use agents::{AgentKind, AgentSection, ColorTag, parse_agent_sections};
pub use emails::{EmailRecord, EmailTier, PriorityLevel, parse_email_records};
pub use filter::{
    FilterCriteria, Severity, SentimentFilter, SortBy, filter_report, filter_result, sort_items,
};
pub use insights::{
    ExecutiveInsights, RiskLevel, extract_executive_insights, parse_insight_sections,
};
pub use metrics::{
    IssueDistribution, ScalarMetrics, parse_critical_count, parse_high_count,
    parse_medium_count, parse_mentions_count, parse_sentiment_score,
};
pub use normalize::{
    AnalysisResult, ComparisonEntry, ComparisonSummary, NormalizedReport, ProcessingTime,
    Workflow, compare, normalize,
};
