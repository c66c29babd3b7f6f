//! Transition-table builder
//!
//! CSV play-by-play feeds → validated transitions → probability tables →
//! JSON artifacts for the simulator. Three pipelines share the shape:
//!
//! - `batting`: the pitch-level feed, presence-encoded states, stolen
//!   bases still embedded in the data (`baserunner_transitions.json`);
//! - `batting-no-sb`: the play-level feed with baserunning-only plays
//!   screened out and runner identity tracked through the play
//!   (`baserunner_transitions_no_sb.json`);
//! - `steals`: stolen-base attempt combinations and success rates per
//!   base-out state (`stolen_base_transitions.json`).
//!
//! Every pipeline verifies its finished table before anything is
//! written: either the full artifact lands on disk or nothing does.

pub mod retrosheet;
pub mod statcast;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

use tt_core::{StealTable, TransitionTable};

/// Which artifact a pipeline run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Batting,
    BattingNoSb,
    Steals,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Batting => "batting",
            TableKind::BattingNoSb => "batting_no_sb",
            TableKind::Steals => "steals",
        }
    }
}

/// Per-pipeline row accounting, reported after every build.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DeriveStats {
    /// Rows that entered derivation.
    pub rows: usize,
    /// Baserunning-only plays screened out before classification.
    pub non_batting: usize,
    /// Events with no mapping onto the outcome vocabulary.
    pub unclassified: usize,
    /// Records starting from an impossible three-out state.
    pub invalid_pre_outs: usize,
    /// Records whose runner arithmetic could not balance.
    pub impossible: usize,
    /// Transitions that reached aggregation.
    pub kept: usize,
}

/// What a pipeline run did, for the console summary and the metadata
/// sidecar.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub table: TableKind,
    pub rows_read: usize,
    pub stats: DeriveStats,
    /// Distinct start states in the emitted table.
    pub states: usize,
    pub output_size: u64,
    pub checksum: String,
}

/// Metadata sidecar written next to an artifact on request.
#[derive(Debug, Clone, Serialize)]
pub struct TableMetadata {
    pub table: TableKind,
    /// Creation time (RFC3339).
    pub created_at: String,
    /// SHA256 of the artifact (hex).
    pub checksum: String,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub impossible_dropped: usize,
    pub output_size: u64,
}

/// Build the pitch-feed batting table.
pub fn build_batting_table(input: &Path, output: &Path) -> Result<BuildReport> {
    println!("Reading Statcast feed: {}", input.display());
    let rows = statcast::read_plate_appearances(input)?;
    println!("Deriving transitions from {} plate appearances...", rows.len());

    let (transitions, stats) = statcast::derive_transitions(&rows)?;
    let table = tt_core::build_transition_table(&transitions)?;
    tt_core::verify_table(&table)?;

    let states = distinct_start_states(&table);
    let (output_size, checksum) = write_json(output, &table)?;
    Ok(BuildReport {
        table: TableKind::Batting,
        rows_read: rows.len(),
        stats,
        states,
        output_size,
        checksum,
    })
}

/// Build the play-feed batting table with stolen-base noise excluded.
pub fn build_batting_table_no_sb(inputs: &[PathBuf], output: &Path) -> Result<BuildReport> {
    let rows = read_play_files(inputs)?;
    let (transitions, stats) = retrosheet::derive_batting_transitions(&rows)?;
    println!(
        "Removed {} impossible transitions out of {} classified plays",
        stats.impossible,
        stats.impossible + stats.invalid_pre_outs + stats.kept
    );

    let table = tt_core::build_transition_table(&transitions)?;
    tt_core::verify_table(&table)?;

    let states = distinct_start_states(&table);
    let (output_size, checksum) = write_json(output, &table)?;
    Ok(BuildReport {
        table: TableKind::BattingNoSb,
        rows_read: rows.len(),
        stats,
        states,
        output_size,
        checksum,
    })
}

/// Build the stolen-base opportunity table.
pub fn build_stolen_base_table(inputs: &[PathBuf], output: &Path) -> Result<BuildReport> {
    let rows = read_play_files(inputs)?;
    let opportunities = retrosheet::derive_steal_opportunities(&rows);

    let table = tt_core::build_steal_table(&opportunities)?;
    tt_core::verify_steal_table(&table)?;

    let stats = DeriveStats {
        rows: rows.len(),
        kept: opportunities.len(),
        ..DeriveStats::default()
    };
    let states = table.len();
    let (output_size, checksum) = write_json(output, &table)?;
    Ok(BuildReport {
        table: TableKind::Steals,
        rows_read: rows.len(),
        stats,
        states,
        output_size,
        checksum,
    })
}

/// Re-read an emitted artifact and re-check its invariants.
pub fn verify_artifact(path: &Path, kind: TableKind) -> Result<()> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact: {}", path.display()))?;
    match kind {
        TableKind::Batting | TableKind::BattingNoSb => {
            let table: TransitionTable = serde_json::from_str(&json)
                .with_context(|| format!("Artifact is not a transition table: {}", path.display()))?;
            tt_core::verify_table(&table)?;
        }
        TableKind::Steals => {
            let table: StealTable = serde_json::from_str(&json)
                .with_context(|| format!("Artifact is not a steal table: {}", path.display()))?;
            tt_core::verify_steal_table(&table)?;
        }
    }
    Ok(())
}

/// Write the metadata sidecar for a finished build.
pub fn write_metadata(path: &Path, report: &BuildReport) -> Result<()> {
    let metadata = TableMetadata {
        table: report.table,
        created_at: chrono::Utc::now().to_rfc3339(),
        checksum: report.checksum.clone(),
        rows_read: report.rows_read,
        rows_kept: report.stats.kept,
        impossible_dropped: report.stats.impossible,
        output_size: report.output_size,
    };
    let json = serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write metadata file: {}", path.display()))?;
    Ok(())
}

fn read_play_files(inputs: &[PathBuf]) -> Result<Vec<retrosheet::PlayRow>> {
    for input in inputs {
        println!("Reading play file: {}", input.display());
    }
    let rows = retrosheet::read_plays(inputs)?;
    println!("Loaded {} plays from {} file(s)", rows.len(), inputs.len());
    Ok(rows)
}

fn distinct_start_states(table: &TransitionTable) -> usize {
    table
        .values()
        .flat_map(|states| states.keys())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Serialize a table as pretty-printed JSON (the artifact format the
/// simulator reads), creating parent directories on demand. Returns the
/// artifact size and its SHA256 checksum.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(u64, String)> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize table")?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, &json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let checksum = format!("{:x}", hasher.finalize());

    Ok((json.len() as u64, checksum))
}
