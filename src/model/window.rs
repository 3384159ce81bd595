use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Modification-time window a job reads from the source
///
/// `from` is exclusive and optional (a full export has none); `to` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: Option<DateTime<Utc>>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Everything modified up to `to`
    pub fn until(to: DateTime<Utc>) -> Self {
        Self { from: None, to }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at > from) && at <= self.to
    }
}
