//! Scalar metric extraction.
//!
//! Each metric is a list of candidate patterns tried in order; the first
//! numeric capture wins and total failure falls back to a fixed default.

use serde::{Deserialize, Serialize};

use super::agents::ColorTag;
use super::patterns::{
    RE_CRITICAL, RE_HIGH, RE_MEDIUM, RE_MENTIONS, RE_NEGATIVE_WORDS, RE_POSITIVE_WORDS,
    RE_URGENCY, SENTIMENT_SCORE_PATTERNS,
};

/// Score reported when the text carries no sentiment signal at all.
pub const NEUTRAL_SENTIMENT: u8 = 50;

/// Scalars pulled out of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarMetrics {
    /// `None` is rendered as "N/A".
    pub mentions_count: Option<u64>,
    pub critical_count: u64,
    pub sentiment_score: u8,
    pub urgency_score: Option<u64>,
    pub data_source: DataSource,
    #[serde(default)]
    pub issues: IssueDistribution,
}

impl Default for ScalarMetrics {
    fn default() -> Self {
        Self {
            mentions_count: None,
            critical_count: 0,
            sentiment_score: NEUTRAL_SENTIMENT,
            urgency_score: None,
            data_source: DataSource::Fallback,
            issues: IssueDistribution::default(),
        }
    }
}

impl ScalarMetrics {
    pub fn from_report(report: &str) -> Self {
        Self {
            mentions_count: parse_mentions_count(report),
            critical_count: parse_critical_count(report),
            sentiment_score: parse_sentiment_score(report),
            urgency_score: parse_urgency_score(report),
            data_source: DataSource::detect(report),
            issues: IssueDistribution::from_report(report),
        }
    }

    pub fn sentiment_band(&self) -> SentimentBand {
        SentimentBand::from_score(self.sentiment_score)
    }

    pub fn urgency_level(&self) -> Option<UrgencyLevel> {
        self.urgency_score.map(UrgencyLevel::from_score)
    }
}

fn first_number(re: &regex::Regex, text: &str) -> Option<u64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Number of mentions the monitor reported, if any.
pub fn parse_mentions_count(report: &str) -> Option<u64> {
    first_number(&RE_MENTIONS, report)
}

/// Number of critical issues; zero when not stated.
pub fn parse_critical_count(report: &str) -> u64 {
    first_number(&RE_CRITICAL, report).unwrap_or(0)
}

/// Number of high-priority issues; zero when not stated.
pub fn parse_high_count(report: &str) -> u64 {
    first_number(&RE_HIGH, report).unwrap_or(0)
}

/// Number of medium-priority issues; zero when not stated.
pub fn parse_medium_count(report: &str) -> u64 {
    first_number(&RE_MEDIUM, report).unwrap_or(0)
}

/// Issue counts per priority bucket, as charted next to the sentiment score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDistribution {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
}

impl IssueDistribution {
    pub fn from_report(report: &str) -> Self {
        Self {
            critical: parse_critical_count(report),
            high: parse_high_count(report),
            medium: parse_medium_count(report),
        }
    }

    pub fn total(&self) -> u64 {
        self.critical + self.high + self.medium
    }
}

/// Urgency score as stated by the priority ranker (`Urgency: 8`).
pub fn parse_urgency_score(report: &str) -> Option<u64> {
    first_number(&RE_URGENCY, report)
}

/// Sentiment on a 0..=100 scale.
///
/// Literal scores win. Without one, the score is the share of positive
/// keywords among all sentiment keywords, rounded half up, or
/// [`NEUTRAL_SENTIMENT`] when neither kind occurs.
pub fn parse_sentiment_score(report: &str) -> u8 {
    if let Some(score) = SENTIMENT_SCORE_PATTERNS
        .iter()
        .find_map(|re| first_number(re, report))
    {
        return score.min(100) as u8;
    }

    let negative = RE_NEGATIVE_WORDS.find_iter(report).count() as u64;
    let positive = RE_POSITIVE_WORDS.find_iter(report).count() as u64;
    let total = negative + positive;
    if total == 0 {
        return NEUTRAL_SENTIMENT;
    }
    ((200 * positive + total) / (2 * total)) as u8
}

/// Coarse reading of a 0..=100 sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentBand {
    Favorable,
    Mixed,
    Unfavorable,
}

impl SentimentBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => Self::Favorable,
            50..=69 => Self::Mixed,
            _ => Self::Unfavorable,
        }
    }

    pub fn color(self) -> ColorTag {
        match self {
            Self::Favorable => ColorTag::Green,
            Self::Mixed => ColorTag::Yellow,
            Self::Unfavorable => ColorTag::Red,
        }
    }
}

impl std::fmt::Display for SentimentBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Favorable => write!(f, "favorable"),
            Self::Mixed => write!(f, "mixed"),
            Self::Unfavorable => write!(f, "unfavorable"),
        }
    }
}

/// Urgency bucket for a 1..=10 urgency score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl UrgencyLevel {
    pub fn from_score(score: u64) -> Self {
        match score {
            8.. => Self::Critical,
            6..=7 => Self::High,
            4..=5 => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl std::fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "Critical"),
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Where the monitor's mentions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Live web search through Tavily.
    LiveSearch,
    Fallback,
}

impl DataSource {
    pub fn detect(report: &str) -> Self {
        if report.to_lowercase().contains("tavily") {
            Self::LiveSearch
        } else {
            Self::Fallback
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LiveSearch => write!(f, "Tavily Real Internet Search"),
            Self::Fallback => write!(f, "Fallback Data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_and_critical_counts() {
        let text = "We found 42 mentions and 7 critical issues";
        assert_eq!(parse_mentions_count(text), Some(42));
        assert_eq!(parse_critical_count(text), 7);
    }

    #[test]
    fn issue_distribution_counts_each_bucket() {
        let issues = IssueDistribution::from_report(
            "Triage: 2 critical issues, 5 HIGH priority items and 11 medium concerns",
        );
        assert_eq!(
            issues,
            IssueDistribution {
                critical: 2,
                high: 5,
                medium: 11,
            }
        );
        assert_eq!(issues.total(), 18);
    }

    #[test]
    fn issue_distribution_defaults_to_zero() {
        assert_eq!(parse_high_count("high volume of posts"), 0);
        assert_eq!(parse_medium_count("medium term outlook"), 0);
        assert_eq!(IssueDistribution::from_report("").total(), 0);
    }

    #[test]
    fn real_mentions_and_singular_form() {
        assert_eq!(parse_mentions_count("Collected 12 real mentions"), Some(12));
        assert_eq!(parse_mentions_count("only 1 mention"), Some(1));
    }

    #[test]
    fn missing_counts_use_defaults() {
        assert_eq!(parse_mentions_count("nothing here"), None);
        assert_eq!(parse_critical_count("nothing here"), 0);
    }

    #[test]
    fn literal_sentiment_score() {
        assert_eq!(parse_sentiment_score("sentiment: 73/100"), 73);
        assert_eq!(parse_sentiment_score("Overall score of 64%"), 64);
        assert_eq!(parse_sentiment_score("81/100 overall sentiment"), 81);
    }

    #[test]
    fn literal_scores_above_range_are_clamped() {
        assert_eq!(parse_sentiment_score("sentiment: 250/100"), 100);
    }

    #[test]
    fn sentiment_patterns_do_not_cross_lines() {
        // "sentiment" and "/100" on different lines: the keyword fallback
        // applies and sees one positive word.
        assert_eq!(parse_sentiment_score("sentiment is\n40/100 good"), 100);
    }

    #[test]
    fn keyword_ratio_fallback() {
        assert_eq!(parse_sentiment_score("negative negative positive"), 33);
        assert_eq!(parse_sentiment_score("good excellent crisis"), 67);
        assert_eq!(parse_sentiment_score("positive critical"), 50);
        assert_eq!(parse_sentiment_score("no signal"), NEUTRAL_SENTIMENT);
    }

    #[test]
    fn urgency_and_bands() {
        assert_eq!(parse_urgency_score("Urgency: 9/10"), Some(9));
        assert_eq!(UrgencyLevel::from_score(9), UrgencyLevel::Critical);
        assert_eq!(UrgencyLevel::from_score(6), UrgencyLevel::High);
        assert_eq!(UrgencyLevel::from_score(4), UrgencyLevel::Medium);
        assert_eq!(UrgencyLevel::from_score(1), UrgencyLevel::Low);
        assert_eq!(SentimentBand::from_score(70), SentimentBand::Favorable);
        assert_eq!(SentimentBand::from_score(50), SentimentBand::Mixed);
        assert_eq!(SentimentBand::from_score(49).color(), ColorTag::Red);
    }

    #[test]
    fn data_source_detection() {
        assert_eq!(DataSource::detect("via Tavily search"), DataSource::LiveSearch);
        assert_eq!(DataSource::detect("cached sample"), DataSource::Fallback);
        assert_eq!(
            DataSource::LiveSearch.to_string(),
            "Tavily Real Internet Search"
        );
    }

    #[test]
    fn empty_report_gives_default_metrics() {
        assert_eq!(ScalarMetrics::from_report(""), ScalarMetrics::default());
    }
}
