//! HTTP client for the analysis backend.
//!
//! [`AnalysisClient`] wraps a blocking `ureq` agent. Analyses can be run as
//! a single request or streamed as server-sent events; the streaming variant
//! reports progress through a callback and honors a cancellation flag
//! checked between events.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::LensConfig;
use crate::error::{ClientError, ClientResult};
use crate::report::{AnalysisResult, Workflow};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Companies shown when the backend cannot be asked.
pub const FALLBACK_COMPANIES: [&str; 5] = ["Apple", "Google", "Microsoft", "Tesla", "Amazon"];
const FALLBACK_NOTE: &str = "System can analyze any company - these are just examples";

/// Comparisons take this many companies.
pub const COMPARISON_SIZE: std::ops::RangeInclusive<usize> = 2..=3;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub system: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub capabilities: Option<serde_json::Value>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub system: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The backend answers either with a list or with a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Supported {
    List(Vec<String>),
    Text(String),
}

/// `GET /supported-companies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedCompanies {
    #[serde(default)]
    pub supported: Option<Supported>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub usage_tips: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl SupportedCompanies {
    /// The built-in list used when the backend is unreachable.
    pub fn fallback() -> Self {
        Self {
            supported: Some(Supported::List(
                FALLBACK_COMPANIES.iter().map(|c| c.to_string()).collect(),
            )),
            examples: Vec::new(),
            usage_tips: Vec::new(),
            note: Some(FALLBACK_NOTE.to_string()),
        }
    }

    /// Example company names, wherever the backend put them.
    pub fn companies(&self) -> Vec<String> {
        if !self.examples.is_empty() {
            return self.examples.clone();
        }
        match &self.supported {
            Some(Supported::List(list)) => list.clone(),
            _ => Vec::new(),
        }
    }
}

/// `POST /analyze/compare`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResponse {
    #[serde(default)]
    pub workflow: Option<Workflow>,
    pub results: Vec<AnalysisResult>,
    #[serde(default)]
    pub comparison_metrics: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    company_name: &'a str,
}

#[derive(Serialize)]
struct CompareRequest<'a> {
    company_names: &'a [String],
    workflow: Workflow,
}

// ---------------------------------------------------------------------------
// Streaming events
// ---------------------------------------------------------------------------

/// Intermediate progress reported while the agents run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
}

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Progress(ProgressUpdate),
    Complete(Box<AnalysisResult>),
    Error(String),
}

/// Decode the JSON payload of one `data:` event.
///
/// Events other than `complete` and `error` are progress updates.
pub fn parse_sse_event(data: &str) -> ClientResult<StreamEvent> {
    let decode = |e: serde_json::Error| ClientError::Decode {
        message: e.to_string(),
    };
    let value: serde_json::Value = serde_json::from_str(data).map_err(decode)?;
    match value.get("type").and_then(serde_json::Value::as_str) {
        Some("complete") => {
            let results = value.get("results").cloned().unwrap_or_default();
            let result: AnalysisResult = serde_json::from_value(results).map_err(decode)?;
            Ok(StreamEvent::Complete(Box::new(result)))
        }
        Some("error") => {
            let message = value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("Analysis failed")
                .to_string();
            Ok(StreamEvent::Error(message))
        }
        _ => Ok(StreamEvent::Progress(
            serde_json::from_value(value).map_err(decode)?,
        )),
    }
}

/// Read an event stream until it completes, fails, ends or is cancelled.
pub fn read_event_stream<R: BufRead>(
    reader: R,
    mut on_progress: impl FnMut(&ProgressUpdate),
    cancel: &AtomicBool,
) -> ClientResult<AnalysisResult> {
    let mut data = String::new();
    for line in reader.lines() {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!("analysis stream cancelled");
            return Err(ClientError::Cancelled);
        }
        let line = line.map_err(|e| ClientError::StreamLost {
            message: e.to_string(),
        })?;

        if let Some(payload) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(payload.strip_prefix(' ').unwrap_or(payload));
            continue;
        }
        if !line.is_empty() || data.is_empty() {
            // Comments, `event:`/`id:` fields and stray blank lines.
            continue;
        }

        match parse_sse_event(&std::mem::take(&mut data))? {
            StreamEvent::Progress(update) => on_progress(&update),
            StreamEvent::Complete(result) => return Ok(*result),
            StreamEvent::Error(message) => return Err(ClientError::StreamFailed { message }),
        }
    }
    Err(ClientError::StreamLost {
        message: "connection closed before the analysis completed".to_string(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Trimmed company name, if it has at least two characters.
pub fn validate_company(name: &str) -> ClientResult<&str> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Err(ClientError::InvalidInput {
            message: format!("company name \"{trimmed}\" is too short"),
        });
    }
    Ok(trimmed)
}

/// Trimmed company names for a comparison.
pub fn validate_comparison(names: &[String]) -> ClientResult<Vec<String>> {
    if !COMPARISON_SIZE.contains(&names.len()) {
        return Err(ClientError::InvalidInput {
            message: format!("comparison needs 2 or 3 companies, got {}", names.len()),
        });
    }
    names
        .iter()
        .map(|n| validate_company(n).map(str::to_string))
        .collect()
}

// ---------------------------------------------------------------------------
// AnalysisClient
// ---------------------------------------------------------------------------

/// Blocking client for one backend.
pub struct AnalysisClient {
    base_url: String,
    http: ureq::Agent,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let http = ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(timeout)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn from_config(config: &LensConfig) -> Self {
        Self::new(&config.api_base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request_error(&self, e: ureq::Error) -> ClientError {
        match e {
            ureq::Error::Status(status, resp) => {
                let detail = resp
                    .into_json::<serde_json::Value>()
                    .ok()
                    .and_then(|body| body.get("detail").cloned())
                    .map(|d| match d {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .unwrap_or_else(|| format!("request failed with status {status}"));
                ClientError::Status { status, detail }
            }
            ureq::Error::Transport(t) => ClientError::Unreachable {
                url: self.base_url.clone(),
                message: t.to_string(),
            },
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(resp: ureq::Response) -> ClientResult<T> {
        resp.into_json().map_err(|e| ClientError::Decode {
            message: format!("failed to parse JSON: {e}"),
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let resp = self
            .http
            .get(&self.url(path))
            .call()
            .map_err(|e| self.request_error(e))?;
        Self::decode(resp)
    }

    fn post_json<B: Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let resp = self
            .http
            .post(&self.url(path))
            .send_json(body)
            .map_err(|e| self.request_error(e))?;
        Self::decode(resp)
    }

    pub fn health(&self) -> ClientResult<HealthStatus> {
        self.get_json("/health")
    }

    pub fn system_info(&self) -> ClientResult<SystemInfo> {
        self.get_json("/")
    }

    /// Example companies; never fails, falling back to a built-in list.
    pub fn supported_companies(&self) -> SupportedCompanies {
        match self.get_json("/supported-companies") {
            Ok(companies) => companies,
            Err(e) => {
                tracing::warn!(error = %e, "supported companies unavailable, using built-in list");
                SupportedCompanies::fallback()
            }
        }
    }

    /// Run an analysis and wait for the full result.
    pub fn analyze(&self, company: &str, workflow: Workflow) -> ClientResult<AnalysisResult> {
        let company = validate_company(company)?;
        tracing::info!(company, %workflow, "analysis requested");
        self.post_json(
            &format!("/analyze/{workflow}"),
            &AnalyzeRequest {
                company_name: company,
            },
        )
    }

    /// Run an analysis over server-sent events.
    pub fn analyze_stream(
        &self,
        company: &str,
        workflow: Workflow,
        on_progress: impl FnMut(&ProgressUpdate),
        cancel: Arc<AtomicBool>,
    ) -> ClientResult<AnalysisResult> {
        let company = validate_company(company)?;
        tracing::info!(company, %workflow, "streaming analysis requested");
        let resp = self
            .http
            .get(&self.url(&format!("/analyze/{workflow}/stream")))
            .query("company_name", company)
            .set("Accept", "text/event-stream")
            .call()
            .map_err(|e| self.request_error(e))?;
        let reader = std::io::BufReader::new(resp.into_reader());
        read_event_stream(reader, on_progress, &cancel)
    }

    /// Analyze two or three companies with the same workflow.
    pub fn compare(&self, companies: &[String], workflow: Workflow) -> ClientResult<ComparisonResponse> {
        let names = validate_comparison(companies)?;
        tracing::info!(companies = ?names, %workflow, "comparison requested");
        self.post_json(
            "/analyze/compare",
            &CompareRequest {
                company_names: &names,
                workflow,
            },
        )
    }
}

impl std::fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Cancellation flag raised by the first Ctrl-C. A second Ctrl-C while the
/// flag is already set exits the process with status 130.
pub fn cancel_on_interrupt() -> std::io::Result<Arc<AtomicBool>> {
    use signal_hook::consts::SIGINT;

    let cancel = Arc::new(AtomicBool::new(false));
    // Order matters: the shutdown check must see the flag before this
    // interrupt sets it.
    signal_hook::flag::register_conditional_shutdown(SIGINT, 130, Arc::clone(&cancel))?;
    signal_hook::flag::register(SIGINT, Arc::clone(&cancel))?;
    Ok(cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(body: &str) -> (ClientResult<AnalysisResult>, Vec<ProgressUpdate>) {
        let mut seen = Vec::new();
        let cancel = AtomicBool::new(false);
        let result = read_event_stream(body.as_bytes(), |u| seen.push(u.clone()), &cancel);
        (result, seen)
    }

    #[test]
    fn progress_then_complete() {
        let body = "\
data: {\"type\": \"progress\", \"agent\": \"Monitor Agent\", \"progress\": 30}

: keep-alive

data: {\"type\": \"complete\", \"results\": {\"company\": \"Acme\", \"workflow\": \"fast\", \"crew_output\": \"done\"}}

";
        let (result, seen) = stream(body);
        let result = result.unwrap();
        assert_eq!(result.company, "Acme");
        assert_eq!(result.crew_output.as_deref(), Some("done"));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].agent.as_deref(), Some("Monitor Agent"));
        assert_eq!(seen[0].progress, Some(30.0));
    }

    #[test]
    fn error_event_fails_with_message() {
        let (result, _) = stream("data: {\"type\": \"error\", \"message\": \"quota exceeded\"}\n\n");
        match result {
            Err(ClientError::StreamFailed { message }) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn stream_ending_early_is_lost() {
        let (result, seen) = stream("data: {\"type\": \"progress\"}\n\n");
        assert!(matches!(result, Err(ClientError::StreamLost { .. })));
        assert_eq!(seen, vec![ProgressUpdate::default()]);
    }

    #[test]
    fn cancellation_is_checked_between_events() {
        let cancel = AtomicBool::new(true);
        let result = read_event_stream("data: {}\n\n".as_bytes(), |_| {}, &cancel);
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[test]
    fn malformed_event_is_a_decode_error() {
        assert!(matches!(
            parse_sse_event("not json"),
            Err(ClientError::Decode { .. })
        ));
    }

    #[test]
    fn unknown_event_types_are_progress() {
        let event = parse_sse_event(r#"{"type": "agent_started", "agent": "Priority Ranker"}"#).unwrap();
        assert!(matches!(event, StreamEvent::Progress(ref u) if u.agent.as_deref() == Some("Priority Ranker")));
    }

    #[test]
    fn company_validation() {
        assert_eq!(validate_company("  Acme ").unwrap(), "Acme");
        assert!(validate_company(" A ").is_err());
        assert!(validate_comparison(&["Acme".into()]).is_err());
        assert!(validate_comparison(&["Acme".into(), "X".into()]).is_err());
        assert_eq!(
            validate_comparison(&["Acme ".into(), "Globex".into()]).unwrap(),
            vec!["Acme", "Globex"]
        );
    }

    #[test]
    fn supported_companies_shapes() {
        let backend: SupportedCompanies = serde_json::from_str(
            r#"{"supported": "ANY COMPANY", "examples": ["Apple", "Meta"], "note": "real data"}"#,
        )
        .unwrap();
        assert_eq!(backend.companies(), vec!["Apple", "Meta"]);

        let fallback = SupportedCompanies::fallback();
        assert_eq!(fallback.companies().len(), 5);
        assert_eq!(fallback.note.as_deref(), Some(FALLBACK_NOTE));
    }

    #[test]
    fn system_info_decodes_with_missing_fields() {
        let info: SystemInfo = serde_json::from_str(
            r#"{"system": "Customer Sentiment Alert System", "version": "2.0",
                "endpoints": {"analyze": "/analyze", "health": "/health"}}"#,
        )
        .unwrap();
        assert_eq!(info.system, "Customer Sentiment Alert System");
        assert_eq!(info.endpoints.get("analyze").map(String::as_str), Some("/analyze"));
        assert!(info.features.is_empty());
        assert!(info.description.is_none());
    }

    #[test]
    fn first_interrupt_only_raises_the_cancel_flag() {
        let cancel = cancel_on_interrupt().unwrap();
        assert!(!cancel.load(Ordering::Relaxed));
        signal_hook::low_level::raise(signal_hook::consts::SIGINT).unwrap();
        assert!(cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn unreachable_backend_is_reported() {
        // Port 9 (discard) on localhost is almost never listening.
        let client = AnalysisClient::new("http://127.0.0.1:9", Duration::from_secs(1));
        assert!(matches!(
            client.health(),
            Err(ClientError::Unreachable { .. })
        ));
        assert!(matches!(
            client.system_info(),
            Err(ClientError::Unreachable { .. })
        ));
        assert_eq!(client.supported_companies(), SupportedCompanies::fallback());
    }
}
