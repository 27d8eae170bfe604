// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # sentiment-lens
//!
//! Client and text-extraction layer for a multi-agent customer sentiment
//! monitor. The backend runs a crew of AI agents over live search results
//! and returns one free-form report; this crate turns that report into
//! structured data and talks to the backend.
//!
//! ## Architecture
//!
//! - **Report extraction** (`report`): agent sections, draft emails,
//!   executive insights, scalar metrics, line filters and comparison. Pure
//!   functions over `&str`; malformed input degrades to defaults.
//! - **Backend client** (`client`): blocking HTTP over `ureq`, with an SSE
//!   streaming mode.
//! - **History** (`history`): capped, most-recent-first store of saved
//!   analyses, in memory or in redb.
//! - **Exports** (`export`, `format`): text, CSV and JSON renderings.
//! - **Input** (`input`): report files or stdin, as result JSON or raw text.
//!
//! ## Library usage
//!
//! ```
//! use sentiment_lens::report::{AnalysisResult, Workflow, normalize};
//!
//! let result = AnalysisResult::new(
//!     "Acme",
//!     Workflow::Fast,
//!     "Monitor Agent: 42 mentions found. Overall sentiment: 61/100",
//! );
//! let report = normalize(&result);
//! assert_eq!(report.metrics.mentions_count, Some(42));
//! assert_eq!(report.metrics.sentiment_score, 61);
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod history;
pub mod input;
pub mod paths;
pub mod report;
