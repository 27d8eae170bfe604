//! History persisted in a redb database.
//!
//! Entries are keyed by their id, so key order is save order and the most
//! recent entry is the last key. Values are bincode records; the analysis
//! result itself is embedded as JSON because its processing time is an
//! untagged union that bincode cannot decode.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};

use super::{HistoryEntry, HistoryStore};
use crate::error::{HistoryError, HistoryResult};
use crate::report::AnalysisResult;

const HISTORY_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("history");

fn redb_err<E: std::fmt::Display>(op: &'static str) -> impl FnOnce(E) -> HistoryError {
    move |e| HistoryError::Redb {
        message: format!("{op} failed: {e}"),
    }
}

fn serde_err<E: std::fmt::Display>(e: E) -> HistoryError {
    HistoryError::Serialization {
        message: e.to_string(),
    }
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    saved_at: i64,
    mentions_count: Option<u64>,
    critical_count: u64,
    sentiment_score: u8,
    result_json: String,
}

impl StoredEntry {
    fn encode(entry: &HistoryEntry) -> HistoryResult<Vec<u8>> {
        let stored = StoredEntry {
            saved_at: entry.saved_at,
            mentions_count: entry.mentions_count,
            critical_count: entry.critical_count,
            sentiment_score: entry.sentiment_score,
            result_json: serde_json::to_string(&entry.result).map_err(serde_err)?,
        };
        bincode::serialize(&stored).map_err(serde_err)
    }

    fn decode(id: u64, bytes: &[u8]) -> HistoryResult<HistoryEntry> {
        let stored: StoredEntry = bincode::deserialize(bytes).map_err(serde_err)?;
        let result: AnalysisResult =
            serde_json::from_str(&stored.result_json).map_err(serde_err)?;
        Ok(HistoryEntry {
            id,
            company: result.company.clone(),
            workflow: result.workflow,
            processing_time: result.processing_time.clone(),
            mentions_count: stored.mentions_count,
            critical_count: stored.critical_count,
            sentiment_score: stored.sentiment_score,
            saved_at: stored.saved_at,
            result,
        })
    }
}

/// ACID-durable history. Writes go through redb transactions.
pub struct DurableHistoryStore {
    db: Arc<Database>,
    limit: usize,
}

impl DurableHistoryStore {
    /// Open or create the history database at `path`.
    pub fn open(path: &Path, limit: usize) -> HistoryResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::Io { source: e })?;
        }
        let db = Database::create(path).map_err(|e| HistoryError::Redb {
            message: format!("failed to open redb at {}: {e}", path.display()),
        })?;

        // Create the table up front so read transactions never miss it.
        let txn = db.begin_write().map_err(redb_err("begin_write"))?;
        txn.open_table(HISTORY_TABLE)
            .map_err(redb_err("open_table"))?;
        txn.commit().map_err(redb_err("commit"))?;

        tracing::debug!(path = %path.display(), limit, "history store opened");
        Ok(Self {
            db: Arc::new(db),
            limit,
        })
    }
}

impl HistoryStore for DurableHistoryStore {
    fn load(&self) -> HistoryResult<Vec<HistoryEntry>> {
        let txn = self.db.begin_read().map_err(redb_err("begin_read"))?;
        let table = txn
            .open_table(HISTORY_TABLE)
            .map_err(redb_err("open_table"))?;
        let mut entries = Vec::new();
        for item in table.iter().map_err(redb_err("iter"))?.rev() {
            let (key, value) = item.map_err(redb_err("read"))?;
            entries.push(StoredEntry::decode(key.value(), value.value())?);
        }
        Ok(entries)
    }

    fn save(&self, mut entry: HistoryEntry) -> HistoryResult<HistoryEntry> {
        let txn = self.db.begin_write().map_err(redb_err("begin_write"))?;
        {
            let mut table = txn
                .open_table(HISTORY_TABLE)
                .map_err(redb_err("open_table"))?;
            let last = table
                .last()
                .map_err(redb_err("last"))?
                .map(|(key, _)| key.value());
            entry.id = last.map_or(1, |id| id + 1);

            let bytes = StoredEntry::encode(&entry)?;
            table
                .insert(entry.id, bytes.as_slice())
                .map_err(redb_err("insert"))?;

            while table.len().map_err(redb_err("len"))? > self.limit as u64 {
                table.pop_first().map_err(redb_err("pop_first"))?;
            }
        }
        txn.commit().map_err(redb_err("commit"))?;
        tracing::info!(id = entry.id, company = %entry.company, "analysis saved to history");
        Ok(entry)
    }

    fn clear(&self) -> HistoryResult<()> {
        let txn = self.db.begin_write().map_err(redb_err("begin_write"))?;
        {
            let mut table = txn
                .open_table(HISTORY_TABLE)
                .map_err(redb_err("open_table"))?;
            while table.pop_first().map_err(redb_err("pop_first"))?.is_some() {}
        }
        txn.commit().map_err(redb_err("commit"))?;
        Ok(())
    }
}

impl std::fmt::Debug for DurableHistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableHistoryStore")
            .field("limit", &self.limit)
            .finish()
    }
}
