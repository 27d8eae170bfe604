//! Pattern library for report extraction.
//!
//! Every regex the extractors use lives here, compiled once on first use.
//! The `regex` crate has no lookahead, so "capture until the next anchor"
//! rules are expressed as an anchor pattern plus a separate stop pattern and
//! resolved by the splitters with `find_at`.

use std::sync::LazyLock;

use regex::Regex;

// ── Agent markers ───────────────────────────────────────────────────────

/// Name token and glyph per agent, in canonical pipeline order.
pub(crate) const AGENT_MARKERS: [(&str, &str); 5] = [
    ("Monitor Agent", "📡"),
    ("Sentiment", "😊"),
    ("Priority", "🎯"),
    ("Context", "🔍"),
    ("Response", "📧"),
];

/// Case-insensitive token-or-glyph matcher per agent (used as stop marker).
pub(crate) static AGENT_TOKEN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    AGENT_MARKERS
        .iter()
        .map(|(name, glyph)| {
            Regex::new(&format!(
                "(?i)(?:{}|{})",
                regex::escape(name),
                regex::escape(glyph)
            ))
            .unwrap()
        })
        .collect()
});

/// Token-or-glyph followed by the rest of its line and the newline.
pub(crate) static AGENT_HEADER_LINE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    AGENT_MARKERS
        .iter()
        .map(|(name, glyph)| {
            Regex::new(&format!(
                "(?i)(?:{}|{})[^\\n]*\\n",
                regex::escape(name),
                regex::escape(glyph)
            ))
            .unwrap()
        })
        .collect()
});

// ── Email previews ──────────────────────────────────────────────────────

/// `EMAIL 3:` at the start of a line, optionally after the mail glyph.
pub(crate) static RE_EMAIL_HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:📧[ \t]*)?(?:\*\*)?EMAIL[ \t]+\d+[ \t]*:").unwrap()
});

/// `EMAIL 3:` anywhere in the text.
pub(crate) static RE_EMAIL_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)EMAIL[ \t]+\d+[ \t]*:").unwrap());

/// Markdown heading of level two or deeper.
pub(crate) static RE_MD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{2,}").unwrap());

/// Virtual email file emitted by the response coordinator.
pub(crate) static RE_EMAILS_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)outputs/emails_[^\s:]*\.txt[ \t]*:").unwrap());

/// Start of any virtual output file.
pub(crate) static RE_OUTPUTS_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)outputs/").unwrap());

fn field_line(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?im)^[ \t]*(?:[-*][ \t]+)?\**(?:{label})\**[ \t]*:\**[ \t]*([^\n]*)"
    ))
    .unwrap()
}

pub(crate) static RE_FIELD_DEPARTMENT: LazyLock<Regex> =
    LazyLock::new(|| field_line("Department"));
pub(crate) static RE_FIELD_TO: LazyLock<Regex> = LazyLock::new(|| field_line("To"));
pub(crate) static RE_FIELD_SUBJECT: LazyLock<Regex> = LazyLock::new(|| field_line("Subject"));
pub(crate) static RE_FIELD_PRIORITY: LazyLock<Regex> = LazyLock::new(|| field_line("Priority"));
pub(crate) static RE_FIELD_BODY: LazyLock<Regex> =
    LazyLock::new(|| field_line("Message Body|Body"));

/// `Subject:` anywhere, capturing the rest of the line.
pub(crate) static RE_SUBJECT_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Subject:[ \t]*([^\n]+)").unwrap());

/// Salutation that opens a generated email body.
pub(crate) static RE_GREETING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:Dear|Hello|Hi|Team)\b").unwrap());

// ── Executive insights ──────────────────────────────────────────────────

pub(crate) static RE_INSIGHTS_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)outputs/insights_.*?\.txt[:\s]+").unwrap());

pub(crate) static RE_INSIGHTS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)EXECUTIVE INSIGHTS|1\.\s*EXECUTIVE SUMMARY").unwrap()
});

/// Blank line followed by a `##` heading or a word of three or more letters.
pub(crate) static RE_INSIGHTS_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\n\n(?:#{2,}|[A-Z]{3,})").unwrap());

pub(crate) static RE_INSIGHTS_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)1\.\s*EXECUTIVE SUMMARY.*?6\.\s*OPPORTUNITIES").unwrap()
});

pub(crate) static RE_BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n").unwrap());

/// Numbered insight section headers, in order, with the literal that ends
/// each section (`None` for the last one).
pub(crate) static INSIGHT_SECTIONS: LazyLock<Vec<(Regex, Option<&'static str>)>> =
    LazyLock::new(|| {
        [
            (r"(?is)1\.\s*EXECUTIVE SUMMARY[:\s]+", Some("2.")),
            (r"(?is)2\.\s*IMMEDIATE ACTION ITEMS[:\s]+", Some("3.")),
            (r"(?is)3\.\s*KEY TRENDS[:\s]+", Some("4.")),
            (r"(?is)4\.\s*STRATEGIC RECOMMENDATIONS[:\s]+", Some("5.")),
            (r"(?is)5\.\s*(?:COMPREHENSIVE )?RISK ASSESSMENT[:\s]+", Some("6.")),
            (r"(?is)6\.\s*OPPORTUNITIES[:\s]+", None),
        ]
        .into_iter()
        .map(|(pattern, stop)| (Regex::new(pattern).unwrap(), stop))
        .collect()
    });

/// Bullet (`-`, `•`) or `n.` marker at the start of the text or of a line.
pub(crate) static RE_LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\n)\s*(?:[-•]|\d+\.)[ \t]*").unwrap());

// ── Scalar metrics ──────────────────────────────────────────────────────

pub(crate) static RE_MENTIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+(?:real\s+)?mentions?").unwrap());

pub(crate) static RE_CRITICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+critical").unwrap());

pub(crate) static RE_HIGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+high").unwrap());

pub(crate) static RE_MEDIUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+medium").unwrap());

pub(crate) static RE_URGENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)urgency[:\s]+(\d+)").unwrap());

/// Literal score patterns, tried in order. Each stays on a single line.
pub(crate) static SENTIMENT_SCORE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)sentiment.*?(\d+)/100",
        r"(?i)score.*?(\d+)%",
        r"(?i)(\d+)/100.*?sentiment",
        r"(?i)sentiment.*?(\d+)%",
    ]
    .into_iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

pub(crate) static RE_NEGATIVE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)negative|critical|urgent|crisis").unwrap());

pub(crate) static RE_POSITIVE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)positive|good|excellent|satisfied").unwrap());

// ── Filter tables ───────────────────────────────────────────────────────

pub(crate) static RE_SEVERITY_CRITICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CRITICAL|URGENT|IMMEDIATE").unwrap());
pub(crate) static RE_SEVERITY_HIGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)HIGH|IMPORTANT").unwrap());
pub(crate) static RE_SEVERITY_MEDIUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)MEDIUM|MODERATE").unwrap());
pub(crate) static RE_SEVERITY_LOW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)LOW|MINOR").unwrap());

pub(crate) static RE_TONE_NEGATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)negative|anger|frustration|disappointed").unwrap());
pub(crate) static RE_TONE_NEUTRAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)neutral|mixed").unwrap());
pub(crate) static RE_TONE_POSITIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)positive|satisfied|happy|pleased").unwrap());
