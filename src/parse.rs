use crate::error::{GchurnError, Result};
use regex::Regex;
use std::sync::LazyLock;

static PARTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap_or_else(|_| panic!("Invalid Regex")));
static RENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*)\{(.+)=>(.+)\}(.*)").unwrap_or_else(|_| panic!("Invalid Regex")));

/// One classified line of `git log --numstat` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Blank line or binary marker (`-` in the numeric fields); carries no stats.
    Skip,
    Stat {
        additions: u64,
        deletions: u64,
        path: String,
    },
    /// Rename notation in the path field. The numeric fields of a rename line
    /// are discarded; renames only re-key existing entries.
    Rename(Rename),
}

/// Decomposed `<prefix>{<old>=><new>}<suffix>` rename notation.
///
/// Prefix and suffix are path segments common to both names and may be empty.
/// Fragments are stored trimmed, since git pads the `=>` with spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub prefix: String,
    pub old_fragment: String,
    pub new_fragment: String,
    pub suffix: String,
}

impl Rename {
    /// Decompose a path field, or `None` if it carries no brace notation.
    ///
    /// Braceless renames (`old => new`, emitted when the two paths share
    /// nothing) are not recognized and flow through as ordinary paths.
    pub fn decompose(path: &str) -> Option<Self> {
        let caps = RENAME_RE.captures(path)?;
        Some(Self {
            prefix: caps[1].to_string(),
            old_fragment: caps[2].trim().to_string(),
            new_fragment: caps[3].trim().to_string(),
            suffix: caps[4].to_string(),
        })
    }

    pub fn from_path(&self) -> String {
        format!("{}{}{}", self.prefix, self.old_fragment, self.suffix)
    }

    pub fn to_path(&self) -> String {
        format!("{}{}{}", self.prefix, self.new_fragment, self.suffix)
    }
}

/// Classify one numstat line.
///
/// The stream comes from git itself, so a numeric field that is neither an
/// integer nor the binary marker is a contract violation and fails the run.
pub fn classify(line: &str) -> Result<Record> {
    if line.trim().is_empty() {
        return Ok(Record::Skip);
    }

    // The path field may contain internal whitespace from the rename
    // notation, so the split is capped at three fields.
    let parts: Vec<&str> = PARTS_RE.splitn(line.trim_start(), 3).collect();

    if parts[0] == "-" {
        return Ok(Record::Skip);
    }
    if parts.len() < 3 {
        return Err(GchurnError::Parse(line.to_string()));
    }

    let additions: u64 = parts[0]
        .parse()
        .map_err(|_| GchurnError::Parse(line.to_string()))?;
    let deletions: u64 = parts[1]
        .parse()
        .map_err(|_| GchurnError::Parse(line.to_string()))?;
    let path = parts[2].trim();

    match Rename::decompose(path) {
        Some(rename) => Ok(Record::Rename(rename)),
        None => Ok(Record::Stat {
            additions,
            deletions,
            path: path.to_string(),
        }),
    }
}
