//! Physical-consistency checks on derived transitions.
//!
//! Two tiers, matching how upstream data problems present themselves:
//! out-of-range outs or runs point at a systemic derivation bug and abort
//! the whole run, while a single record whose runner arithmetic cannot
//! balance is ordinary source noise and is dropped on its own.
//!
//! The conservation rules are closed-form bookkeeping over a fixed
//! population (three bases plus the batter); they hold no matter how the
//! runners actually moved.

use crate::error::TableError;
use crate::state::{StateEncoding, MAX_PRE_OUTS};

/// Most outs a single plate appearance can record (triple play).
pub const MAX_OUTS_MADE: i64 = 3;
/// Most runs a single plate appearance can score (grand slam).
pub const MAX_RUNS_SCORED: i64 = 4;

/// Reject out-of-range outs/runs. A violation is systemic, not row noise.
pub fn check_outcome_ranges(outs_made: i64, runs_scored: i64) -> Result<(), TableError> {
    if !(0..=MAX_OUTS_MADE).contains(&outs_made) {
        return Err(TableError::OutsOutOfRange { outs: outs_made });
    }
    if !(0..=MAX_RUNS_SCORED).contains(&runs_scored) {
        return Err(TableError::RunsOutOfRange { runs: runs_scored });
    }
    Ok(())
}

/// Three outs never start a plate appearance.
pub fn pre_outs_is_valid(outs_before: u8) -> bool {
    outs_before <= MAX_PRE_OUTS
}

/// An inning-boundary transition must burn exactly three outs and land on
/// the feed's empty sentinel.
pub fn boundary_is_valid(
    outs_before: u8,
    outs_made: i64,
    end_state: &str,
    encoding: StateEncoding,
) -> bool {
    i64::from(outs_before) + outs_made == 3 && end_state == encoding.empty_state()
}

/// The batter is the only runner a plate appearance can add, so outs and
/// runs together can consume at most `runners_on + 1` people.
pub fn outs_and_runs_bounded(runners_before: u8, outs_made: i64, runs_scored: i64) -> bool {
    outs_made + runs_scored <= i64::from(runners_before) + 1
}

/// Same-inning conservation: every pre-play runner and the batter ends up
/// out, scored, or still on base - no more, no fewer.
pub fn conservation_holds(
    runners_before: u8,
    runners_after: u8,
    outs_made: i64,
    runs_scored: i64,
) -> bool {
    let before = i64::from(runners_before);
    let after = i64::from(runners_after);
    outs_and_runs_bounded(runners_before, outs_made, runs_scored)
        && after <= before + 1
        && after == before + 1 - outs_made - runs_scored
}
