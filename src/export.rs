//! Export renderings of analysis results.
//!
//! Text exports follow the fixed layouts the alert system has always
//! produced; JSON exports are serde types so downstream tooling can read
//! them back.

use serde::{Deserialize, Serialize};

use crate::report::{
    AnalysisResult, ComparisonSummary, EmailRecord, ExecutiveInsights, ProcessingTime,
};

const RULE_WIDTH: usize = 70;
const SYSTEM_TITLE: &str = "CUSTOMER SENTIMENT ALERT SYSTEM";

fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

/// Executive insights with the company they describe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsExport {
    pub company: String,
    pub insights: ExecutiveInsights,
}

/// One company's row in a comparison export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyExport {
    pub name: String,
    pub sentiment_score: u8,
    pub mentions: Option<u64>,
    pub processing_time: Option<ProcessingTime>,
}

/// Comparison export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonExport {
    /// ISO-8601 date of the export.
    pub comparison_date: String,
    pub companies: Vec<CompanyExport>,
}

impl ComparisonExport {
    pub fn new(summary: &ComparisonSummary, comparison_date: impl Into<String>) -> Self {
        Self {
            comparison_date: comparison_date.into(),
            companies: summary
                .entries
                .iter()
                .map(|e| CompanyExport {
                    name: e.company.clone(),
                    sentiment_score: e.sentiment_score,
                    mentions: e.mentions,
                    processing_time: e.processing_time.clone(),
                })
                .collect(),
        }
    }
}

/// Email previews as a plain-text document, one ruled block per email.
pub fn render_email_previews(emails: &[EmailRecord], generated: &str) -> String {
    let header = [
        SYSTEM_TITLE.to_string(),
        "Email Previews Export".to_string(),
        format!("Generated: {generated}"),
        String::new(),
        "NOTE: These are AI-generated email PREVIEWS only.".to_string(),
        "Review and customize before sending to your team.".to_string(),
        String::new(),
        String::new(),
    ]
    .join("\n");

    let total = emails.len();
    let blocks: Vec<String> = emails
        .iter()
        .enumerate()
        .map(|(i, email)| {
            [
                rule('='),
                format!("EMAIL PREVIEW {}/{total}", i + 1),
                rule('='),
                String::new(),
                format!("PRIORITY: {}", email.priority),
                format!("DEPARTMENT: {}", email.department),
                format!("TO: {}", email.to),
                format!("SUBJECT: {}", email.subject),
                String::new(),
                "MESSAGE:".to_string(),
                rule('-'),
                email.body.clone(),
                String::new(),
                String::new(),
            ]
            .join("\n")
        })
        .collect();

    header + &blocks.join("\n")
}

/// The raw report framed with its metadata.
///
/// `now` stands in for the execution timestamp when the backend sent none.
pub fn render_analysis_report(result: &AnalysisResult, now: &str) -> String {
    let processing_time = result
        .processing_time
        .as_ref()
        .map_or_else(|| crate::format::NOT_AVAILABLE.to_string(), |t| t.to_string());
    let timestamp = result.execution_timestamp.as_deref().unwrap_or(now);

    [
        rule('='),
        format!("{SYSTEM_TITLE} - ANALYSIS REPORT"),
        rule('='),
        String::new(),
        format!("Company: {}", result.company),
        format!("Workflow: {}", result.workflow.label()),
        format!("Processing Time: {processing_time}"),
        format!("Timestamp: {timestamp}"),
        String::new(),
        rule('='),
        "ANALYSIS RESULTS".to_string(),
        rule('='),
        String::new(),
        result.report().to_string(),
        String::new(),
        rule('='),
        "END OF REPORT".to_string(),
        rule('='),
    ]
    .join("\n")
}

pub fn insights_json(company: &str, insights: &ExecutiveInsights) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&InsightsExport {
        company: company.to_string(),
        insights: insights.clone(),
    })
}

pub fn comparison_json(
    summary: &ComparisonSummary,
    comparison_date: &str,
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ComparisonExport::new(summary, comparison_date))
}

/// CSV with every value quoted and inner quotes doubled.
///
/// Returns `None` when there are no rows to write.
pub fn to_csv(headers: &[&str], rows: &[Vec<String>]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }
    let quote = |v: &str| format!("\"{}\"", v.replace('"', "\"\""));
    let mut lines = vec![headers.join(",")];
    lines.extend(
        rows.iter()
            .map(|row| row.iter().map(|v| quote(v)).collect::<Vec<_>>().join(",")),
    );
    Some(lines.join("\n"))
}

pub fn emails_csv(emails: &[EmailRecord]) -> Option<String> {
    let rows: Vec<Vec<String>> = emails
        .iter()
        .map(|e| {
            vec![
                e.priority.clone(),
                e.department.clone(),
                e.to.clone(),
                e.subject.clone(),
                e.body.clone(),
            ]
        })
        .collect();
    to_csv(&["priority", "department", "to", "subject", "body"], &rows)
}

/// Lowercased, whitespace runs replaced by `-`.
pub fn slug(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Workflow, compare};

    fn email(subject: &str, body: &str) -> EmailRecord {
        EmailRecord {
            priority: "HIGH".into(),
            department: "Support".into(),
            to: "support@acme.com".into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    #[test]
    fn email_preview_layout() {
        let text = render_email_previews(&[email("Outage", "Please respond.")], "now");
        let expected_start = "CUSTOMER SENTIMENT ALERT SYSTEM\nEmail Previews Export\nGenerated: now\n\n\
                              NOTE: These are AI-generated email PREVIEWS only.\n\
                              Review and customize before sending to your team.\n\n";
        assert!(text.starts_with(expected_start));
        assert!(text.contains("EMAIL PREVIEW 1/1\n"));
        assert!(text.contains("SUBJECT: Outage\n\nMESSAGE:\n"));
        assert!(text.contains(&format!("{}\nPlease respond.\n\n", "-".repeat(70))));
    }

    #[test]
    fn analysis_report_layout() {
        let mut result = AnalysisResult::new("Acme", Workflow::Deep, "body text");
        result.processing_time = Some(ProcessingTime::Seconds(12.5));
        let text = render_analysis_report(&result, "fallback-time");
        assert!(text.contains("Company: Acme\nWorkflow: Deep (5 agents)\nProcessing Time: 12.5\n"));
        assert!(text.contains("Timestamp: fallback-time"));
        assert!(text.contains("ANALYSIS RESULTS\n"));
        assert!(text.ends_with(&format!("END OF REPORT\n{}", "=".repeat(70))));
    }

    #[test]
    fn csv_quotes_everything() {
        let csv = emails_csv(&[email("Say \"hi\"", "a, b")]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("priority,department,to,subject,body"));
        assert_eq!(
            lines.next(),
            Some(r#""HIGH","Support","support@acme.com","Say ""hi""","a, b""#)
        );
        assert!(emails_csv(&[]).is_none());
    }

    #[test]
    fn comparison_export_uses_names() {
        let results = vec![
            AnalysisResult::new("A", Workflow::Fast, "sentiment: 40/100"),
            AnalysisResult::new("B", Workflow::Fast, "12 mentions, sentiment: 90/100"),
        ];
        let json = comparison_json(&compare(&results, Workflow::Fast), "2026-10-18").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["comparison_date"], "2026-10-18");
        assert_eq!(value["companies"][1]["name"], "B");
        assert_eq!(value["companies"][1]["mentions"], 12);
        assert_eq!(value["companies"][0]["sentiment_score"], 40);
    }

    #[test]
    fn insights_export_and_slug() {
        let json = insights_json("Acme Corp", &ExecutiveInsights::default()).unwrap();
        assert!(json.contains("\"company\": \"Acme Corp\""));
        assert_eq!(slug("Acme  Corp Inc"), "acme-corp-inc");
    }
}
