//! Analysis history.
//!
//! Saved analyses are kept most recent first and capped at a fixed number of
//! entries; saving beyond the cap evicts the oldest. Two backends implement
//! the [`HistoryStore`] port:
//!
//! - [`MemoryHistoryStore`]: in-process only, for dry runs that must not
//!   touch the saved history
//! - [`DurableHistoryStore`]: persisted in a redb database

pub mod durable;
pub mod mem;

pub use durable::DurableHistoryStore;
pub use mem::MemoryHistoryStore;

use serde::{Deserialize, Serialize};

use crate::config::LensConfig;
use crate::error::{HistoryError, HistoryResult, LensResult};
use crate::paths::LensPaths;
use crate::report::metrics::ScalarMetrics;
use crate::report::{AnalysisResult, ProcessingTime, Workflow};

/// Entries kept when no other limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One saved analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Assigned by the store on save; increases with every save.
    pub id: u64,
    pub company: String,
    pub workflow: Workflow,
    pub processing_time: Option<ProcessingTime>,
    pub mentions_count: Option<u64>,
    pub critical_count: u64,
    pub sentiment_score: u8,
    /// Unix seconds.
    pub saved_at: i64,
    pub result: AnalysisResult,
}

impl HistoryEntry {
    /// Summarize a result for saving. The id is filled in by the store.
    pub fn from_result(result: &AnalysisResult, saved_at: i64) -> Self {
        let metrics = ScalarMetrics::from_report(result.report());
        Self {
            id: 0,
            company: result.company.clone(),
            workflow: result.workflow,
            processing_time: result.processing_time.clone(),
            mentions_count: metrics.mentions_count,
            critical_count: metrics.critical_count,
            sentiment_score: metrics.sentiment_score,
            saved_at,
            result: result.clone(),
        }
    }
}

/// Persistence port for saved analyses.
pub trait HistoryStore {
    /// All entries, most recent first.
    fn load(&self) -> HistoryResult<Vec<HistoryEntry>>;

    /// Save an entry as the most recent one and return it with its id.
    fn save(&self, entry: HistoryEntry) -> HistoryResult<HistoryEntry>;

    /// Remove every entry.
    fn clear(&self) -> HistoryResult<()>;

    /// Look up one entry by id.
    fn get(&self, id: u64) -> HistoryResult<HistoryEntry> {
        self.load()?
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| HistoryError::NotFound { id: id.to_string() })
    }
}

/// Open the configured history store. A dry run gets an empty in-memory
/// store so nothing is written to disk.
pub fn open_history(
    paths: &LensPaths,
    config: &LensConfig,
    dry_run: bool,
) -> LensResult<Box<dyn HistoryStore>> {
    if dry_run {
        return Ok(Box::new(MemoryHistoryStore::new(config.history_limit)));
    }
    let store = DurableHistoryStore::open(&paths.history_db(), config.history_limit)?;
    Ok(Box::new(store))
}
