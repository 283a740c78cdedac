use thiserror::Error;

pub type Result<T> = std::result::Result<T, GchurnError>;

#[derive(Error, Debug)]
pub enum GchurnError {
    #[error("Malformed numstat record: {0}")]
    Parse(String),
    #[error("Ambiguous rename: '{from}' matches {matches} existing entries")]
    AmbiguousRename { from: String, matches: usize },
    #[error("Git error: {0}")]
    Git(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
