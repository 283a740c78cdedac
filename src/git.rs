use crate::error::{GchurnError, Result};
use crate::model::DateWindow;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Handle on a repository directory for spawning `git log`.
pub struct GitLog {
    path: PathBuf,
}

impl GitLog {
    /// Use the repository at `path`, or the current dir if `None`. Whether
    /// the directory actually is a repository is left for git to decide.
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => std::env::current_dir()?,
        };
        if !path.is_dir() {
            return Err(GchurnError::Git(format!(
                "Not a directory: {}",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve `--since`/`--until` into a concrete window. The since side
    /// defaults to yesterday, matching the tool's original one-day horizon.
    pub fn resolve_window(&self, since: Option<&str>, until: Option<&str>) -> Result<DateWindow> {
        let since = match since {
            Some(s) => parse_date(s)?,
            None => Utc::now() - Duration::days(1),
        };

        let until = until.map(parse_date).transpose()?;

        if let Some(u) = until {
            if since > u {
                return Err(GchurnError::InvalidDate(format!(
                    "Invalid range: since ({since}) is after until ({u})"
                )));
            }
        }

        Ok(DateWindow { since, until })
    }

    /// Spawn `git log --numstat` for the window and expose its stdout as a
    /// line source.
    ///
    /// `--reverse` makes the stream chronological, so rename records are seen
    /// after the records carrying the old name and resolution lands on each
    /// file's current name. `--pretty=format:` reduces each commit header to
    /// a blank line, which the classifier skips.
    pub fn stream(&self, window: &DateWindow) -> Result<LogStream> {
        let mut cmd = Command::new("git");
        cmd.args([
            "log",
            "--numstat",
            "--pretty=format:",
            "--diff-filter=AMRCD",
            "--find-renames",
            "--reverse",
        ]);
        cmd.arg("--since").arg(window.since.to_rfc3339());
        if let Some(until) = &window.until {
            cmd.arg("--until").arg(until.to_rfc3339());
        }
        cmd.current_dir(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| GchurnError::Git(format!("Failed to run git: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GchurnError::Git("Failed to capture git stdout".to_string()))?;

        Ok(LogStream {
            child,
            lines: BufReader::new(stdout).lines(),
        })
    }
}

/// A running `git log` child whose stdout is consumed line by line,
/// forward-only and exactly once.
pub struct LogStream {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
}

impl LogStream {
    /// Reap the child after the stream is exhausted. A non-zero exit is a
    /// fatal git error carrying whatever the child wrote to stderr.
    pub fn finish(mut self) -> Result<()> {
        let mut stderr = String::new();
        if let Some(mut err) = self.child.stderr.take() {
            err.read_to_string(&mut stderr).ok();
        }
        let status = self.child.wait()?;
        if !status.success() {
            let detail = if stderr.trim().is_empty() {
                format!("git log exited with {status}")
            } else {
                stderr.trim().to_string()
            };
            return Err(GchurnError::Git(detail));
        }
        Ok(())
    }
}

impl Iterator for LogStream {
    type Item = std::io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next()
    }
}

fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    // YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    // Duration ago (e.g. "2weeks", "90days")
    if let Ok(duration) = humantime::parse_duration(input) {
        let duration = Duration::from_std(duration)
            .map_err(|_| GchurnError::InvalidDate(format!("Duration overflow for '{input}'")))?;
        return Ok(Utc::now() - duration);
    }

    Err(GchurnError::InvalidDate(format!(
        "Not a date or duration: '{input}'"
    )))
}
