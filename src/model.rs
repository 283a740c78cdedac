use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Per-file churn accumulator, keyed in the aggregator by `current_path`.
///
/// `current_path` tracks the file's name as of the most recently processed
/// record and is rewritten when a rename resolves onto this entry.
/// `original_path` is the name the entry was first created under; it is kept
/// for diagnostics only and never consulted for lookups or emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChurn {
    #[serde(rename = "name")]
    pub current_path: String,
    #[serde(skip)]
    pub original_path: String,
    pub updates: u64,
    pub additions: u64,
    pub deletions: u64,
}

impl FileChurn {
    pub fn new(path: String) -> Self {
        Self {
            current_path: path.clone(),
            original_path: path,
            updates: 0,
            additions: 0,
            deletions: 0,
        }
    }

    pub fn add_record(&mut self, additions: u64, deletions: u64) {
        self.additions += additions;
        self.deletions += deletions;
        self.updates += 1;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<String>,
    pub until: Option<String>,
    pub depth: Option<u32>,
    pub entries: Vec<FileChurn>,
}

#[derive(Debug, Clone)]
pub struct DateWindow {
    pub since: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}
