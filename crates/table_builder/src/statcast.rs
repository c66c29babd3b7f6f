//! Statcast pitch-feed ingest and transition derivation.
//!
//! The feed carries one row per pitch; only the pitch that ends a plate
//! appearance has an `events` value, so filtering on `events` leaves one
//! row per plate appearance. The post-play situation is not on the row -
//! it is the pre-play situation of the *next* row in (game, at-bat,
//! pitch) order. A change of game, inning, or half between consecutive
//! rows marks an inning boundary: the half-inning ended with three outs
//! and the next situation is bases empty, nobody out.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use tt_core::state::{BaseOutState, StateEncoding};
use tt_core::validate;
use tt_core::{Outcome, Transition};

use crate::DeriveStats;

/// `game_type` value marking spring-training games, which are excluded.
const SPRING_TRAINING: &str = "S";

/// The Statcast columns this pipeline consumes. The feed carries close to
/// a hundred columns; everything not listed here is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StatcastRow {
    pub game_pk: i64,
    pub game_type: String,
    pub at_bat_number: u32,
    pub pitch_number: u32,
    pub inning: u32,
    pub inning_topbot: String,
    pub outs_when_up: u8,
    pub on_1b: Option<String>,
    pub on_2b: Option<String>,
    pub on_3b: Option<String>,
    pub bat_score: i64,
    pub post_bat_score: i64,
    pub events: Option<String>,
}

impl StatcastRow {
    fn pre_state(&self) -> BaseOutState {
        BaseOutState::new(
            self.on_1b.is_some(),
            self.on_2b.is_some(),
            self.on_3b.is_some(),
            self.outs_when_up,
        )
    }

    fn runners_on(&self) -> u8 {
        self.pre_state().runners_on()
    }

    fn same_half_inning(&self, next: &StatcastRow) -> bool {
        self.game_pk == next.game_pk
            && self.inning == next.inning
            && self.inning_topbot == next.inning_topbot
    }
}

/// Read the feed, keeping only regular-season-shaped rows that ended a
/// plate appearance, sorted into (game, at-bat, pitch) order.
pub fn read_plate_appearances(path: &Path) -> Result<Vec<StatcastRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open Statcast file: {}", path.display()))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<StatcastRow>().enumerate() {
        let row: StatcastRow = result
            .with_context(|| format!("Bad Statcast record at {}:{}", path.display(), idx + 2))?;
        if row.game_type == SPRING_TRAINING {
            continue;
        }
        match row.events.as_deref() {
            Some(event) if !event.is_empty() => rows.push(row),
            _ => {}
        }
    }
    rows.sort_by_key(|row| (row.game_pk, row.at_bat_number, row.pitch_number));
    Ok(rows)
}

/// Derive validated, classified transitions from the ordered rows.
///
/// Out-of-range outs or runs abort (they indicate a derivation bug, and
/// the check runs before any per-record filtering, so even rows whose
/// event never classifies can trip it). Conservation violations and
/// unclassifiable events drop the row and bump a counter. The final row
/// of the dataset has no successor and is discarded.
pub fn derive_transitions(rows: &[StatcastRow]) -> Result<(Vec<Transition>, DeriveStats)> {
    let mut stats = DeriveStats::default();

    struct Raw<'a> {
        row: &'a StatcastRow,
        end_state: String,
        runs_scored: i64,
        outs_made: i64,
        new_inning: bool,
        runners_after: u8,
    }

    // Pass 1: derive every transition and range-check it.
    let mut raws = Vec::with_capacity(rows.len().saturating_sub(1));
    for pair in rows.windows(2) {
        let (cur, next) = (&pair[0], &pair[1]);
        let same = cur.same_half_inning(next);
        let (end_state, outs_made, runners_after) = if same {
            (
                StateEncoding::Presence.encode(&next.pre_state()),
                i64::from(next.outs_when_up) - i64::from(cur.outs_when_up),
                next.runners_on(),
            )
        } else {
            (
                StateEncoding::Presence.empty_state().to_string(),
                3 - i64::from(cur.outs_when_up),
                0,
            )
        };
        let runs_scored = cur.post_bat_score - cur.bat_score;
        validate::check_outcome_ranges(outs_made, runs_scored)?;
        raws.push(Raw {
            row: cur,
            end_state,
            runs_scored,
            outs_made,
            new_inning: !same,
            runners_after,
        });
    }
    stats.rows = raws.len();

    // Pass 2: filter physically impossible records, then classify.
    let mut transitions = Vec::with_capacity(raws.len());
    for raw in raws {
        let cur = raw.row;
        if !validate::pre_outs_is_valid(cur.outs_when_up) {
            stats.invalid_pre_outs += 1;
            continue;
        }
        let possible = if raw.new_inning {
            validate::boundary_is_valid(
                cur.outs_when_up,
                raw.outs_made,
                &raw.end_state,
                StateEncoding::Presence,
            )
        } else {
            validate::conservation_holds(
                cur.runners_on(),
                raw.runners_after,
                raw.outs_made,
                raw.runs_scored,
            )
        };
        if !possible {
            log::debug!(
                "dropping impossible transition: game {} at-bat {}",
                cur.game_pk,
                cur.at_bat_number
            );
            stats.impossible += 1;
            continue;
        }
        let outcome = match cur.events.as_deref().and_then(Outcome::from_statcast_event) {
            Some(outcome) => outcome,
            None => {
                stats.unclassified += 1;
                continue;
            }
        };
        transitions.push(Transition {
            outcome,
            start_state: StateEncoding::Presence.encode(&cur.pre_state()),
            end_state: raw.end_state,
            runs_scored: raw.runs_scored as u8,
            outs_made: raw.outs_made as u8,
        });
    }
    stats.kept = transitions.len();
    Ok((transitions, stats))
}
