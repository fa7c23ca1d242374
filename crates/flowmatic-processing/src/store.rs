//! In-memory store for cleaned tables.
//!
//! Front ends keep each cleaning result under a generated id so it can be
//! downloaded or exported later. The store is owned by the caller; nothing
//! in the pipeline touches it.

use crate::quality::QualitySummary;
use crate::table::TimeSeriesTable;
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Default number of results kept before the oldest is evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 32;

/// A cleaned table and the report taken before cleaning.
#[derive(Debug, Clone)]
pub struct StoredTable {
    pub id: String,
    pub table: TimeSeriesTable,
    pub report: QualitySummary,
    /// Unix timestamp (milliseconds) when the entry was inserted
    pub created_at: i64,
}

/// Metadata about a stored entry, without the table itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredSummary {
    pub id: String,
    pub rows: usize,
    pub columns: Vec<String>,
    pub report: QualitySummary,
    pub created_at: i64,
}

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<String, StoredTable>,
    order: VecDeque<String>,
}

/// Thread-safe map from generated id to cleaned table.
///
/// Holds at most `max_entries` results; inserting past the limit evicts the
/// oldest entry first.
#[derive(Debug)]
pub struct TableStore {
    entries: RwLock<Entries>,
    max_entries: usize,
}

static_assertions::assert_impl_all!(TableStore: Send, Sync);

impl Default for TableStore {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_entries: max_entries.max(1),
        }
    }

    /// Store a cleaned table and return its new id.
    pub fn insert(&self, table: TimeSeriesTable, report: QualitySummary) -> String {
        let id = generate_id();
        let entry = StoredTable {
            id: id.clone(),
            table,
            report,
            created_at: Utc::now().timestamp_millis(),
        };

        let mut entries = self.entries.write();
        entries.by_id.insert(id.clone(), entry);
        entries.order.push_back(id.clone());

        while entries.order.len() > self.max_entries {
            if let Some(oldest) = entries.order.pop_front() {
                entries.by_id.remove(&oldest);
                debug!("Evicted stored table {}", oldest);
            }
        }

        id
    }

    /// A copy of the stored entry for `id`.
    pub fn get(&self, id: &str) -> Option<StoredTable> {
        self.entries.read().by_id.get(id).cloned()
    }

    /// Metadata for `id` without cloning the table.
    pub fn summary(&self, id: &str) -> Option<StoredSummary> {
        self.entries.read().by_id.get(id).map(|entry| StoredSummary {
            id: entry.id.clone(),
            rows: entry.table.height(),
            columns: entry.table.column_names(),
            report: entry.report.clone(),
            created_at: entry.created_at,
        })
    }

    /// Remove and return the entry for `id`.
    pub fn evict(&self, id: &str) -> Option<StoredTable> {
        let mut entries = self.entries.write();
        let removed = entries.by_id.remove(id)?;
        entries.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Ids in insertion order, oldest first.
    pub fn ids(&self) -> Vec<String> {
        self.entries.read().order.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.by_id.clear();
        entries.order.clear();
    }
}

fn generate_id() -> String {
    format!("clean_{:016x}", rand::random::<u64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::quality_report;
    use crate::table::datetime_index;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    fn entry() -> (TimeSeriesTable, QualitySummary) {
        let index = datetime_index("timestamp", vec![0, 1_000]).unwrap();
        let table = TimeSeriesTable::new(index, df!["v" => [1.0, 2.0]].unwrap()).unwrap();
        let report = quality_report(&table).unwrap().summary();
        (table, report)
    }

    #[test]
    fn test_insert_get_evict() {
        let store = TableStore::new();
        let (table, report) = entry();
        let id = store.insert(table.clone(), report);

        assert!(id.starts_with("clean_"));
        assert_eq!(store.len(), 1);
        assert!(store.get(&id).unwrap().table == table);

        let summary = store.summary(&id).unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.columns, vec!["v".to_string()]);

        assert!(store.evict(&id).is_some());
        assert!(store.get(&id).is_none());
        assert!(store.evict(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_oldest_entry_evicted_at_capacity() {
        let store = TableStore::with_max_entries(2);
        let ids: Vec<String> = (0..3)
            .map(|_| {
                let (table, report) = entry();
                store.insert(table, report)
            })
            .collect();

        assert_eq!(store.len(), 2);
        assert!(store.get(&ids[0]).is_none());
        assert_eq!(store.ids(), ids[1..].to_vec());
    }

    #[test]
    fn test_concurrent_inserts() {
        let store = Arc::new(TableStore::with_max_entries(100));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..5 {
                        let (table, report) = entry();
                        store.insert(table, report);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 20);
    }
}
