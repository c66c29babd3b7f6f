//! # tt_core - Transition-table derivation for the baseball simulator
//!
//! Turns historical play-by-play records into the empirical
//! state-transition probability tables the game simulator samples at
//! runtime. The crate covers the deterministic middle of the pipeline:
//!
//! - base-occupancy/outs state encoding for both source feeds,
//! - classification of raw event codes onto the seven-way outcome
//!   vocabulary (`1B 2B 3B HR BB K OUT`),
//! - physical-consistency validation of derived transitions,
//! - the count-and-normalize aggregation for batting transitions and
//!   stolen-base opportunities.
//!
//! Everything here is pure data transformation: no I/O, no clock, no
//! randomness. Feed parsing and artifact emission live in
//! `table_builder`.

pub mod error;
pub mod outcome;
pub mod state;
pub mod steal;
pub mod table;
pub mod validate;

pub use error::TableError;
pub use outcome::{basic_play, is_batting_play, Outcome};
pub use state::{Base, BaseOutState, StateEncoding};
pub use steal::{
    build_steal_table, verify_steal_table, StealEntry, StealFlags, StealOpportunity, StealOutcome,
    StealTable,
};
pub use table::{
    build_transition_table, verify_table, Transition, TransitionOutcome, TransitionTable,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    /// The textbook case end to end at the library level: runner on
    /// first, nobody out, batter singles, runner advances to second.
    #[test]
    fn test_single_with_runner_on_first() {
        let outcome = Outcome::from_statcast_event("single").unwrap();
        assert_eq!(outcome.code(), "1B");

        let start = BaseOutState::new(true, false, false, 0);
        let end = BaseOutState::new(true, true, false, 0);
        assert_eq!(start.encode_presence(), "XOO-0");
        assert_eq!(end.encode_presence(), "XXO-0");

        // Nobody out, nobody scored, one runner became two.
        assert!(validate::conservation_holds(
            start.runners_on(),
            end.runners_on(),
            0,
            0
        ));

        let table = build_transition_table(&[Transition {
            outcome,
            start_state: start.encode_presence(),
            end_state: end.encode_presence(),
            runs_scored: 0,
            outs_made: 0,
        }])
        .unwrap();
        assert_eq!(table["1B"]["XOO-0"][0].end_state, "XXO-0");
        verify_table(&table).unwrap();
    }
}
