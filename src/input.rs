//! Report input for the CLI.
//!
//! A report arrives either as a saved analysis result (JSON, as the backend
//! returns it) or as raw report text. Both end up as an [`AnalysisResult`].

use std::io::Read;
use std::path::Path;

use crate::error::{LensError, LensResult};
use crate::report::{AnalysisResult, Workflow};

/// Company used for raw-text reports when none is given.
pub const UNKNOWN_COMPANY: &str = "Unknown";

/// Interpret input text. JSON analysis results are used as they are; anything
/// else is treated as raw report text. `company` overrides the stored name.
pub fn parse_input(text: String, company: Option<&str>) -> AnalysisResult {
    if text.trim_start().starts_with('{') {
        if let Ok(mut result) = serde_json::from_str::<AnalysisResult>(&text) {
            if let Some(company) = company {
                result.company = company.to_string();
            }
            return result;
        }
        tracing::debug!("input looks like JSON but is not an analysis result, reading as text");
    }
    AnalysisResult::new(
        company.unwrap_or(UNKNOWN_COMPANY),
        Workflow::default(),
        text,
    )
}

/// Read a report from a file, or from stdin when no path is given.
pub fn read_result(path: Option<&Path>, company: Option<&str>) -> LensResult<AnalysisResult> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| LensError::Input {
            origin: path.display().to_string(),
            source,
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| LensError::Input {
                    origin: "stdin".to_string(),
                    source,
                })?;
            buf
        }
    };
    Ok(parse_input(text, company))
}
