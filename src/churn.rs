use crate::aggregate::{sort_report, Aggregator};
use crate::cli::CommonArgs;
use crate::error::Result;
use crate::git::GitLog;
use crate::model::{ChurnOutput, FileChurn, SCHEMA_VERSION};
use crate::parse::{classify, Record};
use anyhow::Context;
use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

pub fn exec(
    common: CommonArgs,
    depth: Option<u32>,
    json: bool,
    ndjson: bool,
    path: Option<String>,
) -> anyhow::Result<()> {
    let log = GitLog::open(common.repo.as_ref()).context("Failed to open git repository")?;

    let window = log
        .resolve_window(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date window")?;

    let mut stream = log.stream(&window).context("Failed to start git log")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Reading git log...");

    let aggregator = consume_stream(&mut stream, Some(&pb))
        .context("Failed to aggregate churn from git log")?;

    stream.finish().context("git log failed")?;
    pb.finish_and_clear();

    let entries = report(aggregator, depth, path.as_deref());

    if json {
        output_json(&entries, &log, &common, depth)?;
    } else if ndjson {
        output_ndjson(&entries)?;
    } else {
        output_table(&entries)?;
    }

    Ok(())
}

/// Drive the classifier over the line source, one record at a time.
///
/// Rename records go to the resolver and never touch the counters; every
/// other surviving record folds into the aggregate for its path. The first
/// malformed record or read failure aborts with no partial result.
pub fn consume_stream(
    lines: &mut dyn Iterator<Item = std::io::Result<String>>,
    progress: Option<&ProgressBar>,
) -> Result<Aggregator> {
    let mut aggregator = Aggregator::new();

    for line in lines {
        let line = line?;
        match classify(&line)? {
            Record::Skip => {}
            Record::Stat {
                additions,
                deletions,
                path,
            } => aggregator.record(&path, additions, deletions),
            Record::Rename(rename) => aggregator.resolve_rename(&rename)?,
        }
        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    Ok(aggregator)
}

/// Materialize the aggregate into the emitted ordering, applying the
/// report-time path filter and optional directory folding.
pub fn report(aggregator: Aggregator, depth: Option<u32>, path_prefix: Option<&str>) -> Vec<FileChurn> {
    let mut entries: Vec<FileChurn> = aggregator
        .into_entries()
        .into_iter()
        .filter(|e| path_prefix.map_or(true, |p| e.current_path.starts_with(p)))
        .collect();

    if let Some(d) = depth {
        entries = fold_depth(entries, d);
    }

    sort_report(&mut entries);
    entries
}

fn aggregate_path(path: &str, depth: u32) -> String {
    let parts: Vec<&str> = path.split('/').collect();
    if depth == 0 || parts.len() <= depth as usize {
        path.to_string()
    } else {
        parts[..depth as usize].join("/")
    }
}

/// Collapse entries into directory buckets of at most `depth` components.
/// Folding runs after rename resolution, so it never perturbs identity.
fn fold_depth(entries: Vec<FileChurn>, depth: u32) -> Vec<FileChurn> {
    let mut map: HashMap<String, FileChurn> = HashMap::new();
    for e in entries {
        let key = aggregate_path(&e.current_path, depth);
        let bucket = map
            .entry(key.clone())
            .or_insert_with(|| FileChurn::new(key));
        bucket.updates += e.updates;
        bucket.additions += e.additions;
        bucket.deletions += e.deletions;
    }
    map.into_values().collect()
}

fn output_json(
    entries: &[FileChurn],
    log: &GitLog,
    common: &CommonArgs,
    depth: Option<u32>,
) -> anyhow::Result<()> {
    let output = ChurnOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: log.path().to_string_lossy().to_string(),
        since: common.since.clone(),
        until: common.until.clone(),
        depth,
        entries: entries.to_vec(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn output_ndjson(entries: &[FileChurn]) -> anyhow::Result<()> {
    for e in entries {
        println!("{}", serde_json::to_string(e)?);
    }
    Ok(())
}

fn output_table(entries: &[FileChurn]) -> anyhow::Result<()> {
    println!(
        "{:<60} {:>8} {:>8} {:>8}",
        style("Name").bold(),
        style("Updates").bold(),
        style("Added").bold(),
        style("Deleted").bold()
    );
    println!("{}", "─".repeat(88));
    for e in entries.iter().take(50) {
        println!(
            "{:<60} {:>8} {:>8} {:>8}",
            e.current_path, e.updates, e.additions, e.deletions
        );
    }
    if entries.len() > 50 {
        println!("\n... and {} more entries", entries.len() - 50);
    }
    Ok(())
}
