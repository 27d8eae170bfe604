//! Email preview extraction.
//!
//! The response coordinator writes draft emails into the report in a few
//! different shapes. Extraction tries an ordered list of strategies and
//! commits to the first one that yields at least one record:
//!
//! 1. **Strict**: `EMAIL n:` header lines followed by labelled fields.
//! 2. **Loose**: labelled fields without headers, one block per
//!    `Department:` line.
//! 3. **Embedded file**: the contents of an `outputs/emails_*.txt:` block,
//!    split on inline `EMAIL n:` markers.
//! 4. **Generic**: any `Subject:` line followed by a salutation and a body
//!    of meaningful length.

use serde::{Deserialize, Serialize};

use super::agents::ColorTag;
use super::patterns::{
    RE_EMAIL_HEADER_LINE, RE_EMAIL_MARKER, RE_EMAILS_FILE, RE_FIELD_BODY, RE_FIELD_DEPARTMENT,
    RE_FIELD_PRIORITY, RE_FIELD_SUBJECT, RE_FIELD_TO, RE_GREETING, RE_MD_HEADING,
    RE_OUTPUTS_MARKER, RE_SUBJECT_ANY,
};

pub const DEFAULT_DEPARTMENT: &str = "General";
pub const DEFAULT_RECIPIENT: &str = "Team";
pub const DEFAULT_PRIORITY: &str = "MEDIUM";

/// Generic matches with a body this short (in characters) are noise.
const MIN_GENERIC_BODY_CHARS: usize = 50;

const WORDS_PER_MINUTE: usize = 200;

// ── Types ───────────────────────────────────────────────────────────────

/// A draft email found in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    /// Free-text priority as written by the backend.
    pub priority: String,
    pub department: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailRecord {
    pub fn priority_level(&self) -> PriorityLevel {
        PriorityLevel::classify(&self.priority)
    }

    pub fn color(&self) -> ColorTag {
        self.priority_level().color()
    }

    /// Estimated reading time in whole minutes, never less than one.
    pub fn read_time_minutes(&self) -> usize {
        let words = self.body.split_whitespace().count();
        words.div_ceil(WORDS_PER_MINUTE).max(1)
    }

    /// Recipient, subject and body as they would be pasted into a mail client.
    pub fn to_plain_text(&self) -> String {
        format!("To: {}\nSubject: {}\n\n{}", self.to, self.subject, self.body)
    }
}

/// Priority bucket derived from the free-text priority field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Critical,
    High,
    Medium,
    Low,
    Other,
}

impl PriorityLevel {
    /// Case-insensitive keyword containment, most severe keyword first.
    pub fn classify(priority: &str) -> Self {
        let p = priority.to_uppercase();
        if p.contains("CRITICAL") {
            Self::Critical
        } else if p.contains("HIGH") {
            Self::High
        } else if p.contains("MEDIUM") {
            Self::Medium
        } else if p.contains("LOW") {
            Self::Low
        } else {
            Self::Other
        }
    }

    /// Display color; low and unrecognized priorities share blue.
    pub fn color(self) -> ColorTag {
        match self {
            Self::Critical => ColorTag::Red,
            Self::High => ColorTag::Orange,
            Self::Medium => ColorTag::Yellow,
            Self::Low | Self::Other => ColorTag::Blue,
        }
    }

    /// Sort rank, most severe first.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
            Self::Other => write!(f, "OTHER"),
        }
    }
}

/// Which extraction strategy produced the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTier {
    Strict,
    Loose,
    EmbeddedFile,
    Generic,
}

impl std::fmt::Display for EmailTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Loose => write!(f, "loose"),
            Self::EmbeddedFile => write!(f, "embedded-file"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

type TierFn = fn(&str) -> Option<Vec<EmailRecord>>;

/// Strategies in priority order.
const EMAIL_TIERS: [(EmailTier, TierFn); 4] = [
    (EmailTier::Strict, strict_tier),
    (EmailTier::Loose, loose_tier),
    (EmailTier::EmbeddedFile, embedded_file_tier),
    (EmailTier::Generic, generic_tier),
];

// ── Entry points ────────────────────────────────────────────────────────

/// Extract draft emails from a report, in order of appearance.
pub fn parse_email_records(report: &str) -> Vec<EmailRecord> {
    parse_email_records_with_tier(report)
        .map(|(_, records)| records)
        .unwrap_or_default()
}

/// Like [`parse_email_records`], also reporting which strategy matched.
///
/// Returns `None` when no strategy finds anything.
pub fn parse_email_records_with_tier(report: &str) -> Option<(EmailTier, Vec<EmailRecord>)> {
    if report.is_empty() {
        return None;
    }
    EMAIL_TIERS.iter().find_map(|(tier, strategy)| {
        let records = strategy(report)?;
        tracing::debug!(%tier, count = records.len(), "email extraction tier matched");
        Some((*tier, records))
    })
}

// ── Field extraction ────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct FieldHits {
    department: Option<String>,
    to: Option<String>,
    subject: Option<String>,
    priority: Option<String>,
    body: Option<String>,
}

impl FieldHits {
    fn is_empty(&self) -> bool {
        self.department.is_none()
            && self.to.is_none()
            && self.subject.is_none()
            && self.priority.is_none()
            && self.body.is_none()
    }

    /// Carries something beyond routing metadata.
    fn has_message(&self) -> bool {
        self.to.is_some() || self.subject.is_some() || self.body.is_some()
    }

    fn into_record(self) -> EmailRecord {
        EmailRecord {
            priority: self.priority.unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
            department: self
                .department
                .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string()),
            to: self.to.unwrap_or_else(|| DEFAULT_RECIPIENT.to_string()),
            subject: self.subject.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
        }
    }
}

/// Read the labelled fields of one block in their fixed order.
///
/// Each label is searched from the end of the previous hit, so a field that
/// appears out of order counts as missing. The body runs from its label to
/// the end of the block.
fn extract_fields(block: &str) -> FieldHits {
    let mut pos = 0;
    let mut next_line = |re: &regex::Regex| -> Option<String> {
        let caps = re.captures_at(block, pos)?;
        pos = caps.get(0).map_or(pos, |m| m.end());
        caps.get(1).map(|m| m.as_str().trim().to_string())
    };

    let department = next_line(&RE_FIELD_DEPARTMENT);
    let to = next_line(&RE_FIELD_TO);
    let subject = next_line(&RE_FIELD_SUBJECT);
    let priority = next_line(&RE_FIELD_PRIORITY);
    let body = RE_FIELD_BODY
        .captures_at(block, pos)
        .and_then(|caps| caps.get(1))
        .map(|m| block[m.start()..].trim().to_string());

    FieldHits {
        department,
        to,
        subject,
        priority,
        body,
    }
}

/// Split on `Department:` lines; each block runs to the next one.
fn department_blocks(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = RE_FIELD_DEPARTMENT
        .find_iter(text)
        .map(|m| m.start())
        .collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}

fn non_empty(records: Vec<EmailRecord>) -> Option<Vec<EmailRecord>> {
    if records.is_empty() { None } else { Some(records) }
}

// ── Tiers ───────────────────────────────────────────────────────────────

fn strict_tier(report: &str) -> Option<Vec<EmailRecord>> {
    let headers: Vec<regex::Match<'_>> = RE_EMAIL_HEADER_LINE.find_iter(report).collect();
    let mut records = Vec::new();

    for (i, header) in headers.iter().enumerate() {
        let start = header.end();
        let next_header = headers.get(i + 1).map_or(report.len(), |h| h.start());
        let heading = RE_MD_HEADING
            .find_at(report, start)
            .map_or(report.len(), |m| m.start());
        let end = next_header.min(heading);

        let hits = extract_fields(&report[start..end]);
        if !hits.is_empty() {
            records.push(hits.into_record());
        }
    }
    non_empty(records)
}

fn loose_tier(report: &str) -> Option<Vec<EmailRecord>> {
    let records = department_blocks(report)
        .into_iter()
        .map(extract_fields)
        .filter(FieldHits::has_message)
        .map(FieldHits::into_record)
        .collect();
    non_empty(records)
}

fn embedded_file_tier(report: &str) -> Option<Vec<EmailRecord>> {
    let mut records = Vec::new();

    for file in RE_EMAILS_FILE.find_iter(report) {
        let start = file.end();
        let end = RE_OUTPUTS_MARKER
            .find_at(report, start)
            .map_or(report.len(), |m| m.start());
        let span = &report[start..end];

        let markers: Vec<regex::Match<'_>> = RE_EMAIL_MARKER.find_iter(span).collect();
        let blocks: Vec<&str> = if markers.is_empty() {
            department_blocks(span)
        } else {
            markers
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    let block_end = markers.get(i + 1).map_or(span.len(), |n| n.start());
                    &span[m.end()..block_end]
                })
                .collect()
        };

        records.extend(
            blocks
                .into_iter()
                .map(extract_fields)
                .filter(FieldHits::has_message)
                .map(FieldHits::into_record),
        );
    }
    non_empty(records)
}

fn generic_tier(report: &str) -> Option<Vec<EmailRecord>> {
    let subjects: Vec<regex::Captures<'_>> = RE_SUBJECT_ANY.captures_iter(report).collect();
    let mut records = Vec::new();

    for (i, caps) in subjects.iter().enumerate() {
        let (Some(whole), Some(subject)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let segment_end = subjects
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(report.len(), |m| m.start());

        let Some(greeting) = RE_GREETING
            .find_at(report, whole.end())
            .filter(|m| m.start() < segment_end)
        else {
            continue;
        };

        let body = report[greeting.start()..segment_end].trim();
        if body.chars().count() <= MIN_GENERIC_BODY_CHARS {
            continue;
        }
        records.push(EmailRecord {
            priority: DEFAULT_PRIORITY.to_string(),
            department: DEFAULT_DEPARTMENT.to_string(),
            to: DEFAULT_RECIPIENT.to_string(),
            subject: subject.as_str().trim().to_string(),
            body: body.to_string(),
        });
    }
    non_empty(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRICT_REPORT: &str = "\
Response Coordinator output

EMAIL 1:
Department: Sales
To: sales@x.com
Subject: Re: pricing
Priority: HIGH
Body: Please respond.

## Notes
Department: Engineering
To: eng@x.com
Subject: Should not be read
Body: Loose tier must not run.
";

    #[test]
    fn strict_tier_reads_fields_verbatim() {
        let (tier, emails) = parse_email_records_with_tier(STRICT_REPORT).unwrap();
        assert_eq!(tier, EmailTier::Strict);
        assert_eq!(emails.len(), 1);
        let email = &emails[0];
        assert_eq!(email.department, "Sales");
        assert_eq!(email.to, "sales@x.com");
        assert_eq!(email.subject, "Re: pricing");
        assert_eq!(email.priority, "HIGH");
        assert_eq!(email.body, "Please respond.");
    }

    #[test]
    fn strict_blocks_split_on_next_header() {
        let report = "\
EMAIL 1:
Department: PR
To: pr@acme.com
Subject: Statement
Priority: CRITICAL
Body: Draft a holding statement.
EMAIL 2:
Department: Support
To: support@acme.com
Subject: Macro update
Priority: LOW
Body: Update the refund macro.
";
        let emails = parse_email_records(report);
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].body, "Draft a holding statement.");
        assert_eq!(emails[1].department, "Support");
        assert_eq!(emails[1].priority_level(), PriorityLevel::Low);
    }

    #[test]
    fn partial_strict_block_gets_defaults() {
        let report = "EMAIL 1:\nSubject: Heads up\nBody: Short note.\n";
        let emails = parse_email_records(report);
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].department, DEFAULT_DEPARTMENT);
        assert_eq!(emails[0].to, DEFAULT_RECIPIENT);
        assert_eq!(emails[0].priority, DEFAULT_PRIORITY);
        assert_eq!(emails[0].subject, "Heads up");
    }

    #[test]
    fn out_of_order_field_counts_as_missing() {
        let report = "EMAIL 1:\nPriority: HIGH\nDepartment: PR\nTo: pr@acme.com\nSubject: S\nBody: B\n";
        let emails = parse_email_records(report);
        assert_eq!(emails[0].priority, DEFAULT_PRIORITY);
        assert_eq!(emails[0].department, "PR");
    }

    #[test]
    fn loose_tier_without_headers() {
        let report = "\
Department: Engineering
To: eng@acme.com
Subject: Login failures
Priority: HIGH
Body: Investigate the auth service.
Department: PR
To: pr@acme.com
Subject: Press inquiry
Priority: MEDIUM
Body: Prepare a reply.
";
        let (tier, emails) = parse_email_records_with_tier(report).unwrap();
        assert_eq!(tier, EmailTier::Loose);
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].body, "Investigate the auth service.");
        assert_eq!(emails[1].subject, "Press inquiry");
    }

    #[test]
    fn lone_department_mention_is_not_an_email() {
        assert!(parse_email_records("Department: Finance\nnothing else here").is_empty());
    }

    #[test]
    fn embedded_file_tier_splits_inline_markers() {
        let report = "\
Saved drafts to outputs/emails_acme.txt: EMAIL 1:
To: pr@acme.com
Subject: Outage statement
Priority: HIGH
Body: We are aware of the outage. EMAIL 2:
To: support@acme.com
Subject: Refund macro
Body: Update the macro.
outputs/insights_acme.txt: ignored";
        let (tier, emails) = parse_email_records_with_tier(report).unwrap();
        assert_eq!(tier, EmailTier::EmbeddedFile);
        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].department, DEFAULT_DEPARTMENT);
        assert_eq!(emails[0].body, "We are aware of the outage.");
        assert_eq!(emails[1].body, "Update the macro.");
    }

    #[test]
    fn generic_tier_needs_greeting_and_long_body() {
        let report = "\
Subject: Service outage
Dear Team,
We are seeing widespread complaints about login failures today.
Subject: Too short
Hi all, ok.";
        let (tier, emails) = parse_email_records_with_tier(report).unwrap();
        assert_eq!(tier, EmailTier::Generic);
        assert_eq!(emails.len(), 1);
        assert_eq!(emails[0].subject, "Service outage");
        assert!(emails[0].body.starts_with("Dear Team,"));
        assert_eq!(emails[0].department, "General");
        assert_eq!(emails[0].to, "Team");
        assert_eq!(emails[0].priority, "MEDIUM");
    }

    #[test]
    fn nothing_found_is_empty() {
        assert!(parse_email_records("no drafts in this report").is_empty());
        assert!(parse_email_records("").is_empty());
        assert!(parse_email_records_with_tier("no drafts").is_none());
    }

    #[test]
    fn priority_classification_and_color() {
        assert_eq!(PriorityLevel::classify("P0 - critical"), PriorityLevel::Critical);
        assert_eq!(PriorityLevel::classify("High"), PriorityLevel::High);
        assert_eq!(PriorityLevel::classify("medium-ish"), PriorityLevel::Medium);
        assert_eq!(PriorityLevel::classify("low"), PriorityLevel::Low);
        assert_eq!(PriorityLevel::classify("urgent"), PriorityLevel::Other);
        assert_eq!(PriorityLevel::Critical.color(), ColorTag::Red);
        assert_eq!(PriorityLevel::High.color(), ColorTag::Orange);
        assert_eq!(PriorityLevel::Medium.color(), ColorTag::Yellow);
        assert_eq!(PriorityLevel::Low.color(), ColorTag::Blue);
        assert_eq!(PriorityLevel::Other.color(), ColorTag::Blue);
    }

    #[test]
    fn read_time_rounds_up_with_floor_of_one() {
        let mut email = EmailRecord {
            priority: "LOW".into(),
            department: "PR".into(),
            to: "pr@acme.com".into(),
            subject: "s".into(),
            body: String::new(),
        };
        assert_eq!(email.read_time_minutes(), 1);
        email.body = vec!["word"; 450].join(" ");
        assert_eq!(email.read_time_minutes(), 3);
        email.body = vec!["word"; 200].join(" ");
        assert_eq!(email.read_time_minutes(), 1);
    }
}
