//! Retrosheet play-file ingest.
//!
//! One row per play with explicit pre/post runner identities, which makes
//! two derivations possible that the pitch feed cannot support: batting
//! transitions with stolen-base noise excluded (the play code says which
//! rows are baserunning-only), and stolen-base opportunity extraction
//! from the per-play steal flags.
//!
//! Seasons ship as separate files; the pipelines read and concatenate
//! however many they are given.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use tt_core::state::{self, BaseOutState, StateEncoding};
use tt_core::steal::{StealFlags, StealOpportunity};
use tt_core::validate;
use tt_core::{is_batting_play, Outcome, Transition};

use crate::DeriveStats;

/// The play-file columns this pipeline consumes; the feed's other columns
/// are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayRow {
    pub gid: String,
    pub batter: Option<String>,
    pub event: Option<String>,
    pub outs_pre: u8,
    pub outs_post: u8,
    pub br1_pre: Option<String>,
    pub br2_pre: Option<String>,
    pub br3_pre: Option<String>,
    pub br1_post: Option<String>,
    pub br2_post: Option<String>,
    pub br3_post: Option<String>,
    pub runs: i64,
    pub sb2: Option<u8>,
    pub sb3: Option<u8>,
    pub sbh: Option<u8>,
    pub cs2: Option<u8>,
    pub cs3: Option<u8>,
    pub csh: Option<u8>,
}

fn flag(value: Option<u8>) -> bool {
    matches!(value, Some(v) if v != 0)
}

impl PlayRow {
    fn pre_state(&self) -> BaseOutState {
        BaseOutState::new(
            self.br1_pre.is_some(),
            self.br2_pre.is_some(),
            self.br3_pre.is_some(),
            self.outs_pre,
        )
    }

    fn runners_before(&self) -> u8 {
        self.pre_state().runners_on()
    }

    fn runners_after(&self) -> u8 {
        u8::from(self.br1_post.is_some())
            + u8::from(self.br2_post.is_some())
            + u8::from(self.br3_post.is_some())
    }

    fn pre_ids(&self) -> [Option<&str>; 3] {
        [
            self.br1_pre.as_deref(),
            self.br2_pre.as_deref(),
            self.br3_pre.as_deref(),
        ]
    }

    fn post_ids(&self) -> [Option<&str>; 3] {
        [
            self.br1_post.as_deref(),
            self.br2_post.as_deref(),
            self.br3_post.as_deref(),
        ]
    }

    fn steal_flags(&self) -> StealFlags {
        StealFlags {
            sb2: flag(self.sb2),
            sb3: flag(self.sb3),
            sbh: flag(self.sbh),
            cs2: flag(self.cs2),
            cs3: flag(self.cs3),
            csh: flag(self.csh),
        }
    }
}

/// Read and concatenate one or more season play files.
pub fn read_plays(paths: &[PathBuf]) -> Result<Vec<PlayRow>> {
    let mut rows = Vec::new();
    for path in paths {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .with_context(|| format!("Failed to open play file: {}", path.display()))?;
        for (idx, result) in reader.deserialize::<PlayRow>().enumerate() {
            let row: PlayRow = result
                .with_context(|| format!("Bad play record at {}:{}", path.display(), idx + 2))?;
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Derive batting transitions with stolen-base noise excluded.
///
/// Non-batting plays and unclassifiable events drop first; every
/// surviving row is range-checked (a violation aborts) before the
/// per-record impossibility filter runs.
pub fn derive_batting_transitions(rows: &[PlayRow]) -> Result<(Vec<Transition>, DeriveStats)> {
    let mut stats = DeriveStats::default();
    stats.rows = rows.len();

    let mut classified = Vec::with_capacity(rows.len());
    for row in rows {
        let event = match row.event.as_deref() {
            Some(event) if !event.is_empty() => event,
            _ => {
                stats.non_batting += 1;
                continue;
            }
        };
        if !is_batting_play(event) {
            stats.non_batting += 1;
            continue;
        }
        match Outcome::from_retrosheet_play(event) {
            Some(outcome) => classified.push((row, outcome)),
            None => stats.unclassified += 1,
        }
    }

    for (row, _) in &classified {
        let outs_made = i64::from(row.outs_post) - i64::from(row.outs_pre);
        validate::check_outcome_ranges(outs_made, row.runs)?;
    }

    let mut transitions = Vec::with_capacity(classified.len());
    for (row, outcome) in classified {
        if !validate::pre_outs_is_valid(row.outs_pre) {
            stats.invalid_pre_outs += 1;
            continue;
        }
        let outs_made = i64::from(row.outs_post) - i64::from(row.outs_pre);
        let inning_ends = row.outs_post >= 3;
        let possible = if inning_ends {
            // The post-state encoder clears the bases itself; the only
            // thing left to check is that outs and runs fit the people
            // who were available.
            validate::outs_and_runs_bounded(row.runners_before(), outs_made, row.runs)
        } else {
            validate::conservation_holds(
                row.runners_before(),
                row.runners_after(),
                outs_made,
                row.runs,
            )
        };
        if !possible {
            log::debug!("dropping impossible transition: game {}", row.gid);
            stats.impossible += 1;
            continue;
        }
        transitions.push(Transition {
            outcome,
            start_state: StateEncoding::Positional.encode(&row.pre_state()),
            end_state: state::encode_retrosheet_post(
                row.batter.as_deref(),
                &row.pre_ids(),
                &row.post_ids(),
                row.outs_post,
            ),
            runs_scored: row.runs as u8,
            outs_made: outs_made as u8,
        });
    }
    stats.kept = transitions.len();
    Ok((transitions, stats))
}

/// Every play row is a steal opportunity, attempt or not.
pub fn derive_steal_opportunities(rows: &[PlayRow]) -> Vec<StealOpportunity> {
    rows.iter()
        .map(|row| StealOpportunity {
            state: StateEncoding::Positional.encode(&row.pre_state()),
            flags: row.steal_flags(),
        })
        .collect()
}
