//! In-memory index behind both staging backends
//!
//! Items are keyed by `(kind, key)` and remember the sequence number of their
//! first insertion. Re-staging a key replaces the record but keeps its place
//! in the read order, which is what makes repeated staging of a page safe.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::{EntityKind, StagedRecord, UserId};

/// A staged record together with its position in the read order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    pub seq: u64,
    pub record: StagedRecord,
}

/// All staged records of one kind
#[derive(Debug, Default, Clone)]
pub struct KindTable {
    next_seq: u64,
    by_seq: BTreeMap<u64, StagedRecord>,
    by_key: HashMap<String, u64>,
    by_reference: HashMap<UserId, BTreeSet<u64>>,
}

impl KindTable {
    /// Rebuild a table from its persisted items
    pub fn from_items(items: Vec<StoredItem>) -> Self {
        let mut table = Self::default();
        for item in items {
            table.next_seq = table.next_seq.max(item.seq + 1);
            table.place(item.seq, item.record);
        }
        table
    }

    pub fn to_items(&self) -> Vec<StoredItem> {
        self.by_seq
            .iter()
            .map(|(seq, record)| StoredItem {
                seq: *seq,
                record: record.clone(),
            })
            .collect()
    }

    pub fn upsert(&mut self, record: StagedRecord) {
        let seq = match self.by_key.get(&record.key()) {
            Some(seq) => *seq,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                seq
            }
        };
        self.place(seq, record);
    }

    pub fn len(&self) -> usize {
        self.by_seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_seq.is_empty()
    }

    pub fn page(&self, skip: usize, take: usize) -> Vec<StagedRecord> {
        self.by_seq.values().skip(skip).take(take).cloned().collect()
    }

    pub fn related(&self, parent: UserId) -> Vec<StagedRecord> {
        self.by_reference
            .get(&parent)
            .map(|seqs| {
                seqs.iter()
                    .filter_map(|seq| self.by_seq.get(seq))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    fn place(&mut self, seq: u64, record: StagedRecord) {
        if let Some(previous) = self.by_seq.get(&seq) {
            let old_ref = previous.reference_id();
            if let Some(seqs) = self.by_reference.get_mut(&old_ref) {
                seqs.remove(&seq);
            }
        }
        self.by_key.insert(record.key(), seq);
        self.by_reference
            .entry(record.reference_id())
            .or_default()
            .insert(seq);
        self.by_seq.insert(seq, record);
    }
}

/// Staged records of every kind
#[derive(Debug, Default, Clone)]
pub struct StagingIndex {
    tables: HashMap<EntityKind, KindTable>,
}

impl StagingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_table(&mut self, kind: EntityKind, table: KindTable) {
        self.tables.insert(kind, table);
    }

    pub fn table(&self, kind: EntityKind) -> Option<&KindTable> {
        self.tables.get(&kind)
    }

    /// Upsert all records, returning the kinds that changed
    pub fn insert_all(&mut self, items: Vec<StagedRecord>) -> BTreeSet<EntityKind> {
        let mut touched = BTreeSet::new();
        for record in items {
            let kind = record.kind();
            touched.insert(kind);
            self.tables.entry(kind).or_default().upsert(record);
        }
        touched
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.table(kind).map(KindTable::len).unwrap_or(0)
    }

    pub fn page(&self, kind: EntityKind, skip: usize, take: usize) -> Vec<StagedRecord> {
        self.table(kind)
            .map(|t| t.page(skip, take))
            .unwrap_or_default()
    }

    pub fn related(&self, kind: EntityKind, parent: UserId) -> Vec<StagedRecord> {
        self.table(kind)
            .map(|t| t.related(parent))
            .unwrap_or_default()
    }

    pub fn contains(&self, kind: EntityKind, key: &str) -> bool {
        self.table(kind).is_some_and(|t| t.contains(key))
    }
}
