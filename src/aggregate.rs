use crate::error::{GchurnError, Result};
use crate::model::FileChurn;
use crate::parse::Rename;
use std::collections::HashMap;

/// Owns every [`FileChurn`] record, keyed by its `current_path`.
///
/// The map key and the entry's `current_path` never diverge: a resolved
/// rename removes the old key and re-inserts the same record under the new
/// one. Entries are never deleted during processing; a file removed from the
/// tree keeps whatever counts it accumulated.
#[derive(Debug, Default)]
pub struct Aggregator {
    files: HashMap<String, FileChurn>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one non-rename record into the entry for `path`, creating it on
    /// first sight.
    pub fn record(&mut self, path: &str, additions: u64, deletions: u64) {
        self.files
            .entry(path.to_string())
            .or_insert_with(|| FileChurn::new(path.to_string()))
            .add_record(additions, deletions);
    }

    /// Re-key the entry denoting the rename's old name to its new name.
    ///
    /// Matching is exact on the composed from-path, or by strict
    /// path-component prefix with the common suffix required on the
    /// remainder. An unmatched rename is dropped silently (the file's earlier
    /// history fell outside the window). More than one match means the prefix
    /// rule would merge unrelated files, which fails the run rather than
    /// resolving implicitly.
    pub fn resolve_rename(&mut self, rename: &Rename) -> Result<()> {
        let from = rename.from_path();

        let mut matched: Vec<String> = self
            .files
            .keys()
            .filter(|key| denotes_same_file(key, &from, &rename.suffix))
            .cloned()
            .collect();

        match matched.len() {
            0 => Ok(()),
            1 => {
                let key = matched.remove(0);
                if let Some(mut entry) = self.files.remove(&key) {
                    let to = rename.to_path();
                    entry.current_path = to.clone();
                    self.files.insert(to, entry);
                }
                Ok(())
            }
            n => Err(GchurnError::AmbiguousRename { from, matches: n }),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_entries(self) -> Vec<FileChurn> {
        self.files.into_values().collect()
    }
}

/// Whether an entry keyed `current` denotes the same file as `from`.
fn denotes_same_file(current: &str, from: &str, suffix: &str) -> bool {
    if current == from {
        return true;
    }
    match from.strip_prefix(current) {
        Some(rest) => rest.starts_with('/') && rest.ends_with(suffix),
        None => false,
    }
}

/// Report ordering: updates descending, path ascending on ties. The
/// secondary key exists only to make output deterministic.
pub fn sort_report(entries: &mut [FileChurn]) {
    entries.sort_by(|a, b| {
        b.updates
            .cmp(&a.updates)
            .then_with(|| a.current_path.cmp(&b.current_path))
    });
}
