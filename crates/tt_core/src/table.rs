//! Transition tables: grouping, normalization, and verification.
//!
//! The aggregation is a straight count-and-normalize: transitions group by
//! `(outcome, start state, end state, runs, outs)`, and each count divides
//! by its `(outcome, start state)` group total to give a conditional
//! probability. No smoothing and no minimum sample size - a start state
//! seen once emits a single-outcome distribution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::outcome::Outcome;
use crate::validate::check_outcome_ranges;

/// Tolerance when checking that a group's probabilities sum to 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// A classified, validated plate-appearance transition - one input row of
/// the aggregation. States are already rendered in the feed's encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub outcome: Outcome,
    pub start_state: String,
    pub end_state: String,
    pub runs_scored: u8,
    pub outs_made: u8,
}

/// One aggregated way a plate appearance can resolve from a start state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub end_state: String,
    pub probability: f64,
    pub runs_scored: u8,
    pub outs_made: u8,
}

/// Outcome code → start state → possible resolutions.
///
/// Ordered maps keep the emission deterministic: outcome codes, then start
/// states, then `(end state, runs, outs)` within each list.
pub type TransitionTable = BTreeMap<String, BTreeMap<String, Vec<TransitionOutcome>>>;

/// Count transitions and normalize each `(outcome, start state)` group
/// into a conditional probability distribution.
pub fn build_transition_table(transitions: &[Transition]) -> Result<TransitionTable, TableError> {
    if transitions.is_empty() {
        return Err(TableError::EmptyTable);
    }

    let mut counts: BTreeMap<(&str, &str, &str, u8, u8), u64> = BTreeMap::new();
    for t in transitions {
        let key = (
            t.outcome.code(),
            t.start_state.as_str(),
            t.end_state.as_str(),
            t.runs_scored,
            t.outs_made,
        );
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut group_totals: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for (&(outcome, start, _, _, _), n) in &counts {
        *group_totals.entry((outcome, start)).or_insert(0) += n;
    }

    let mut table = TransitionTable::new();
    for ((outcome, start, end, runs, outs), n) in &counts {
        let total = group_totals[&(*outcome, *start)];
        table
            .entry((*outcome).to_string())
            .or_default()
            .entry((*start).to_string())
            .or_default()
            .push(TransitionOutcome {
                end_state: (*end).to_string(),
                probability: *n as f64 / total as f64,
                runs_scored: *runs,
                outs_made: *outs,
            });
    }
    Ok(table)
}

/// Re-check the published invariants on a finished table: probabilities
/// sum to 1 within every group and all outs/runs are in range.
pub fn verify_table(table: &TransitionTable) -> Result<(), TableError> {
    for (outcome, states) in table {
        for (start, outcomes) in states {
            let sum: f64 = outcomes.iter().map(|o| o.probability).sum();
            if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
                return Err(TableError::ProbabilitySum {
                    outcome: outcome.clone(),
                    start_state: start.clone(),
                    sum,
                });
            }
            for o in outcomes {
                check_outcome_ranges(i64::from(o.outs_made), i64::from(o.runs_scored))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(
        outcome: Outcome,
        start: &str,
        end: &str,
        runs: u8,
        outs: u8,
    ) -> Transition {
        Transition {
            outcome,
            start_state: start.to_string(),
            end_state: end.to_string(),
            runs_scored: runs,
            outs_made: outs,
        }
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(matches!(
            build_transition_table(&[]),
            Err(TableError::EmptyTable)
        ));
    }

    #[test]
    fn test_counts_normalize_within_groups() {
        let transitions = vec![
            transition(Outcome::Single, "OOO-0", "XOO-0", 0, 0),
            transition(Outcome::Single, "OOO-0", "XOO-0", 0, 0),
            transition(Outcome::Single, "OOO-0", "OXO-0", 0, 0),
            transition(Outcome::Single, "XOO-0", "XXO-0", 0, 0),
            transition(Outcome::Strikeout, "OOO-0", "OOO-1", 0, 1),
        ];
        let table = build_transition_table(&transitions).unwrap();

        let from_empty = &table["1B"]["OOO-0"];
        assert_eq!(from_empty.len(), 2);
        // Sorted by end state: "OXO-0" before "XOO-0".
        assert_eq!(from_empty[0].end_state, "OXO-0");
        assert!((from_empty[0].probability - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(from_empty[1].end_state, "XOO-0");
        assert!((from_empty[1].probability - 2.0 / 3.0).abs() < 1e-12);

        // Groups normalize independently.
        let from_first = &table["1B"]["XOO-0"];
        assert_eq!(from_first.len(), 1);
        assert_eq!(from_first[0].probability, 1.0);

        assert_eq!(table["K"]["OOO-0"][0].outs_made, 1);
        verify_table(&table).unwrap();
    }

    #[test]
    fn test_distinct_runs_outs_split_outcomes() {
        // Same end state reached with different runs scored stays two
        // entries, exactly as the grouping key demands.
        let transitions = vec![
            transition(Outcome::Double, "OXO-1", "OXO-1", 1, 0),
            transition(Outcome::Double, "OXO-1", "OXO-1", 0, 0),
        ];
        let table = build_transition_table(&transitions).unwrap();
        let outcomes = &table["2B"]["OXO-1"];
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].runs_scored, 0);
        assert_eq!(outcomes[1].runs_scored, 1);
        assert!((outcomes[0].probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_verify_rejects_bad_sums() {
        let mut table = TransitionTable::new();
        table.entry("1B".to_string()).or_default().insert(
            "OOO-0".to_string(),
            vec![TransitionOutcome {
                end_state: "XOO-0".to_string(),
                probability: 0.5,
                runs_scored: 0,
                outs_made: 0,
            }],
        );
        assert!(matches!(
            verify_table(&table),
            Err(TableError::ProbabilitySum { .. })
        ));
    }

    #[test]
    fn test_verify_rejects_out_of_range_outs() {
        let mut table = TransitionTable::new();
        table.entry("OUT".to_string()).or_default().insert(
            "OOO-0".to_string(),
            vec![TransitionOutcome {
                end_state: "OOO-0".to_string(),
                probability: 1.0,
                runs_scored: 0,
                outs_made: 4,
            }],
        );
        assert!(matches!(
            verify_table(&table),
            Err(TableError::OutsOutOfRange { outs: 4 })
        ));
    }

    #[test]
    fn test_json_shape_matches_consumer() {
        // The simulator reads {event: {state: [{end_state, probability,
        // runs_scored, outs_made}]}} - field names are load-bearing.
        let transitions = vec![transition(Outcome::HomeRun, "OOO-2", "OOO-2", 1, 0)];
        let table = build_transition_table(&transitions).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["HR"]["OOO-2"][0]["end_state"], "OOO-2");
        assert_eq!(json["HR"]["OOO-2"][0]["probability"], 1.0);
        assert_eq!(json["HR"]["OOO-2"][0]["runs_scored"], 1);
        assert_eq!(json["HR"]["OOO-2"][0]["outs_made"], 0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_transition() -> impl Strategy<Value = Transition> {
            let outcomes = prop_oneof![
                Just(Outcome::Single),
                Just(Outcome::Double),
                Just(Outcome::Walk),
                Just(Outcome::Strikeout),
                Just(Outcome::Out),
            ];
            let states = prop_oneof![
                Just("OOO-0"),
                Just("XOO-0"),
                Just("OXO-1"),
                Just("XXX-2"),
            ];
            (outcomes, states.clone(), states, 0u8..=4, 0u8..=3).prop_map(
                |(outcome, start, end, runs, outs)| Transition {
                    outcome,
                    start_state: start.to_string(),
                    end_state: end.to_string(),
                    runs_scored: runs,
                    outs_made: outs,
                },
            )
        }

        proptest! {
            /// Property: any non-empty batch of in-range transitions
            /// aggregates into a table that passes verification.
            #[test]
            fn prop_built_tables_always_verify(
                transitions in proptest::collection::vec(arb_transition(), 1..200)
            ) {
                let table = build_transition_table(&transitions).unwrap();
                prop_assert!(verify_table(&table).is_ok());
            }
        }
    }
}
