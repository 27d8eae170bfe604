//! Line-granular report filtering and item sorting.
//!
//! Filters run in a fixed order (keyword, then severity, then sentiment),
//! each keeping only the lines it matches. Inactive criteria are no-ops.

use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::emails::{EmailRecord, PriorityLevel};
use super::normalize::{AnalysisResult, ComparisonEntry};
use super::patterns::{
    RE_SEVERITY_CRITICAL, RE_SEVERITY_HIGH, RE_SEVERITY_LOW, RE_SEVERITY_MEDIUM,
    RE_TONE_NEGATIVE, RE_TONE_NEUTRAL, RE_TONE_POSITIVE,
};
use crate::error::UnknownVariant;

/// Severity a line must mention to survive the severity filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    #[default]
    All,
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    fn pattern(self) -> Option<&'static Regex> {
        match self {
            Self::All => None,
            Self::Critical => Some(&*RE_SEVERITY_CRITICAL),
            Self::High => Some(&*RE_SEVERITY_HIGH),
            Self::Medium => Some(&*RE_SEVERITY_MEDIUM),
            Self::Low => Some(&*RE_SEVERITY_LOW),
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(UnknownVariant::new("severity", s)),
        }
    }
}

/// Tone a line must carry to survive the sentiment filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentFilter {
    #[default]
    All,
    Negative,
    Neutral,
    Positive,
}

impl SentimentFilter {
    fn pattern(self) -> Option<&'static Regex> {
        match self {
            Self::All => None,
            Self::Negative => Some(&*RE_TONE_NEGATIVE),
            Self::Neutral => Some(&*RE_TONE_NEUTRAL),
            Self::Positive => Some(&*RE_TONE_POSITIVE),
        }
    }
}

impl FromStr for SentimentFilter {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            "positive" => Ok(Self::Positive),
            _ => Err(UnknownVariant::new("sentiment", s)),
        }
    }
}

/// Ordering applied to extracted items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    #[default]
    Default,
    /// Most severe first.
    Priority,
    /// Least severe first.
    PriorityAsc,
    /// Reverse of the extraction order.
    Recent,
    /// Most mentions first.
    Mentions,
}

impl FromStr for SortBy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "priority" => Ok(Self::Priority),
            "priority-asc" => Ok(Self::PriorityAsc),
            "recent" => Ok(Self::Recent),
            "mentions" => Ok(Self::Mentions),
            _ => Err(UnknownVariant::new("sort order", s)),
        }
    }
}

impl SortBy {
    /// Parse an order that applies to draft emails. Emails carry no mention
    /// counts, so `mentions` is rejected.
    pub fn for_emails(s: &str) -> Result<Self, UnknownVariant> {
        match s.parse()? {
            Self::Mentions => Err(UnknownVariant::new("email sort order", s)),
            order => Ok(order),
        }
    }
}

/// User-selected filter and sort options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Whitespace-separated keywords; a line matching any of them is kept.
    pub keyword: String,
    pub severity: Severity,
    pub sentiment: SentimentFilter,
    pub sort_by: SortBy,
}

impl FilterCriteria {
    fn keywords(&self) -> Vec<String> {
        self.keyword
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }

    /// Whether any line filter would change the report.
    pub fn is_active(&self) -> bool {
        !self.keyword.trim().is_empty()
            || self.severity != Severity::All
            || self.sentiment != SentimentFilter::All
    }
}

fn retain_lines(text: &str, keep: impl Fn(&str) -> bool) -> String {
    text.split('\n').filter(|line| keep(line)).collect::<Vec<_>>().join("\n")
}

/// Keep only the lines of `report` that satisfy every active criterion.
pub fn filter_report(report: &str, criteria: &FilterCriteria) -> String {
    if !criteria.is_active() {
        return report.to_string();
    }

    let mut out = report.to_string();

    let keywords = criteria.keywords();
    if !keywords.is_empty() {
        out = retain_lines(&out, |line| {
            let line = line.to_lowercase();
            keywords.iter().any(|k| line.contains(k.as_str()))
        });
    }
    if let Some(re) = criteria.severity.pattern() {
        out = retain_lines(&out, |line| re.is_match(line));
    }
    if let Some(re) = criteria.sentiment.pattern() {
        out = retain_lines(&out, |line| re.is_match(line));
    }

    tracing::debug!(
        before = report.lines().count(),
        after = out.lines().count(),
        "report filtered"
    );
    out
}

/// Copy of `result` whose report has been filtered.
///
/// Results without a report are returned untouched; otherwise the copy is
/// marked as filtered and remembers the criteria that produced it.
pub fn filter_result(result: &AnalysisResult, criteria: &FilterCriteria) -> AnalysisResult {
    let Some(report) = result.crew_output.as_deref().filter(|r| !r.is_empty()) else {
        return result.clone();
    };
    AnalysisResult {
        crew_output: Some(filter_report(report, criteria)),
        filtered: true,
        active_filters: Some(criteria.clone()),
        ..result.clone()
    }
}

/// Items that can be ordered by [`sort_items`].
pub trait Sortable {
    /// Priority bucket, if the item has one.
    fn priority(&self) -> Option<PriorityLevel> {
        None
    }

    /// Mention count, zero when unknown.
    fn mentions(&self) -> u64 {
        0
    }
}

impl Sortable for EmailRecord {
    fn priority(&self) -> Option<PriorityLevel> {
        Some(self.priority_level())
    }
}

impl Sortable for ComparisonEntry {
    fn mentions(&self) -> u64 {
        self.mentions.unwrap_or(0)
    }
}

/// Sorted copy of `items`. Sorting is stable; items without a recognized
/// priority stay after the ranked ones in both priority orders.
pub fn sort_items<T: Sortable + Clone>(items: &[T], sort_by: SortBy) -> Vec<T> {
    let mut sorted = items.to_vec();
    let rank = |item: &T| match item.priority() {
        Some(PriorityLevel::Other) | None => None,
        Some(level) => Some(level.rank()),
    };
    match sort_by {
        SortBy::Default => {}
        SortBy::Priority => sorted.sort_by_key(|item| (rank(item).is_none(), rank(item))),
        SortBy::PriorityAsc => sorted.sort_by_key(|item| {
            let r = rank(item);
            (r.is_none(), r.map(std::cmp::Reverse))
        }),
        SortBy::Recent => sorted.reverse(),
        SortBy::Mentions => sorted.sort_by_key(|item| std::cmp::Reverse(item.mentions())),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Outage is CRITICAL and customers show anger
Billing issue is HIGH priority, mixed reactions
Minor typo on LOW traffic page, customers pleased
Shipping delays are moderate, tone negative";

    fn criteria(keyword: &str, severity: Severity, sentiment: SentimentFilter) -> FilterCriteria {
        FilterCriteria {
            keyword: keyword.to_string(),
            severity,
            sentiment,
            sort_by: SortBy::Default,
        }
    }

    fn email(priority: &str, subject: &str) -> EmailRecord {
        EmailRecord {
            priority: priority.to_string(),
            department: "General".to_string(),
            to: "Team".to_string(),
            subject: subject.to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn inactive_criteria_are_identity() {
        let out = filter_report(REPORT, &FilterCriteria::default());
        assert_eq!(out, REPORT);
        let out = filter_report(REPORT, &criteria("   ", Severity::All, SentimentFilter::All));
        assert_eq!(out, REPORT);
    }

    #[test]
    fn keyword_matches_any_token_case_insensitively() {
        let out = filter_report(REPORT, &criteria("billing SHIPPING", Severity::All, SentimentFilter::All));
        assert_eq!(
            out,
            "Billing issue is HIGH priority, mixed reactions\n\
             Shipping delays are moderate, tone negative"
        );
    }

    #[test]
    fn severity_table() {
        let out = filter_report(REPORT, &criteria("", Severity::Medium, SentimentFilter::All));
        assert_eq!(out, "Shipping delays are moderate, tone negative");
        let out = filter_report(REPORT, &criteria("", Severity::Low, SentimentFilter::All));
        assert_eq!(out, "Minor typo on LOW traffic page, customers pleased");
    }

    #[test]
    fn filters_compose_in_order() {
        let out = filter_report(
            REPORT,
            &criteria("customers", Severity::Critical, SentimentFilter::Negative),
        );
        assert_eq!(out, "Outage is CRITICAL and customers show anger");
    }

    #[test]
    fn no_matching_line_gives_empty_report() {
        let out = filter_report(REPORT, &criteria("refund", Severity::All, SentimentFilter::All));
        assert_eq!(out, "");
    }

    #[test]
    fn filter_result_marks_copy() {
        let result = AnalysisResult::new("Acme", super::super::normalize::Workflow::Fast, REPORT);
        let c = criteria("", Severity::High, SentimentFilter::All);
        let filtered = filter_result(&result, &c);
        assert!(filtered.filtered);
        assert_eq!(filtered.active_filters.as_ref(), Some(&c));
        assert_eq!(
            filtered.crew_output.as_deref(),
            Some("Billing issue is HIGH priority, mixed reactions")
        );
        assert!(!result.filtered);
    }

    #[test]
    fn filter_result_without_report_is_untouched() {
        let mut result = AnalysisResult::new("Acme", super::super::normalize::Workflow::Deep, "");
        result.crew_output = None;
        let filtered = filter_result(&result, &criteria("x", Severity::All, SentimentFilter::All));
        assert_eq!(filtered, result);
    }

    #[test]
    fn sort_by_priority_both_ways() {
        let items = vec![
            email("LOW", "a"),
            email("whenever", "b"),
            email("CRITICAL", "c"),
            email("MEDIUM", "d"),
            email("HIGH", "e"),
        ];
        let subjects = |v: Vec<EmailRecord>| v.into_iter().map(|e| e.subject).collect::<String>();
        assert_eq!(subjects(sort_items(&items, SortBy::Priority)), "cedab");
        assert_eq!(subjects(sort_items(&items, SortBy::PriorityAsc)), "adecb");
        assert_eq!(subjects(sort_items(&items, SortBy::Recent)), "edcba");
        assert_eq!(subjects(sort_items(&items, SortBy::Default)), "abcde");
    }

    #[test]
    fn sort_by_mentions_descending() {
        let entry = |company: &str, mentions| ComparisonEntry {
            company: company.to_string(),
            sentiment_score: 50,
            mentions,
            processing_time: None,
        };
        let items = vec![entry("a", Some(3)), entry("b", None), entry("c", Some(9))];
        let sorted = sort_items(&items, SortBy::Mentions);
        let order: Vec<_> = sorted.iter().map(|e| e.company.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn criteria_values_parse() {
        assert_eq!("priority-asc".parse::<SortBy>().unwrap(), SortBy::PriorityAsc);
        assert_eq!("CRITICAL".parse::<Severity>().unwrap(), Severity::Critical);
        assert!("furious".parse::<SentimentFilter>().is_err());
    }

    #[test]
    fn email_sort_rejects_mentions() {
        assert_eq!(SortBy::for_emails("recent").unwrap(), SortBy::Recent);
        assert_eq!(SortBy::for_emails("Priority").unwrap(), SortBy::Priority);
        let err = SortBy::for_emails("mentions").unwrap_err();
        assert_eq!(err.to_string(), "unknown email sort order: \"mentions\"");
        assert!(SortBy::for_emails("loudest").is_err());
    }
}
