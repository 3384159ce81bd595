//! Result summary of a job run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::checkpoint::{JobId, JobStatus};
use crate::model::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub name: String,
    pub value: String,
    pub created_on: DateTime<Utc>,
}

/// Counters and log lines describing what a run did
///
/// Entries can only be appended; the summary is handed to the caller once the
/// run has ended, whichever way it ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    job_id: JobId,
    status: JobStatus,
    summary: Vec<SummaryItem>,
    log: Vec<LogEntry>,
}

impl ResultSummary {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            status: JobStatus::Running,
            summary: Vec::new(),
            log: Vec::new(),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn add_summary(&mut self, name: impl Into<String>, value: impl ToString) {
        self.summary.push(SummaryItem {
            name: name.into(),
            value: value.to_string(),
        });
    }

    pub fn add_log_entry(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.log.push(LogEntry {
            name: name.into(),
            value: value.into(),
            created_on: Utc::now(),
        });
    }

    pub fn summary(&self) -> &[SummaryItem] {
        &self.summary
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        &self.log
    }

    /// Value of a summary line parsed as a count
    pub fn count(&self, name: &str) -> Option<u64> {
        self.summary
            .iter()
            .find(|item| item.name == name)
            .and_then(|item| item.value.parse().ok())
    }

    /// Log entries whose value is exactly `value`
    pub fn log_entries_for<'a>(&'a self, value: &'a str) -> impl Iterator<Item = &'a LogEntry> {
        self.log.iter().filter(move |entry| entry.value == value)
    }

    pub(crate) fn finish(&mut self, status: JobStatus) {
        self.status = status;
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Job {} ({})", self.job_id, self.status)?;
        for item in &self.summary {
            writeln!(f, "  {:<32} {}", item.name, item.value)?;
        }
        if !self.log.is_empty() {
            writeln!(f, "  Log:")?;
            for entry in &self.log {
                writeln!(f, "    {}: {}", entry.name, entry.value)?;
            }
        }
        Ok(())
    }
}

/// Per-kind counters accumulated during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityCounts {
    counts: BTreeMap<EntityKind, u64>,
    pub ignored_users: u64,
    pub skipped: u64,
}

impl EntityCounts {
    pub fn add(&mut self, kind: EntityKind, n: usize) {
        *self.counts.entry(kind).or_default() += n as u64;
    }

    pub fn get(&self, kind: EntityKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Append one `"<verb> <label>"` line per kind
    pub fn write_to(&self, summary: &mut ResultSummary, verb: &str, kinds: &[EntityKind]) {
        for kind in kinds {
            summary.add_summary(format!("{} {}", verb, kind.label()), self.get(*kind));
        }
    }
}
