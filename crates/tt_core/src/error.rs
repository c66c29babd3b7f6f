use thiserror::Error;

/// Systemic failures that abort a table build.
///
/// Ordinary source noise (a single row whose runner arithmetic cannot
/// balance) is filtered per record and never raised. These errors mean the
/// derivation itself produced something no baseball play can, or that a
/// finished table violates its published invariants; the run stops rather
/// than emitting a bad artifact.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("outs made out of range: {outs} (expected 0..=3)")]
    OutsOutOfRange { outs: i64 },

    #[error("runs scored out of range: {runs} (expected 0..=4)")]
    RunsOutOfRange { runs: i64 },

    #[error("probabilities for {outcome} from {start_state} sum to {sum}, not 1")]
    ProbabilitySum {
        outcome: String,
        start_state: String,
        sum: f64,
    },

    #[error("steal combination probabilities for {state} sum to {sum}, not 1")]
    StealProbabilitySum { state: String, sum: f64 },

    #[error("steal success rate for {base} in {state} is {rate}, outside [{lo}, {hi}]")]
    SuccessRateOutOfRange {
        base: String,
        state: String,
        rate: f64,
        lo: f64,
        hi: f64,
    },

    #[error("no transitions survived filtering; refusing to emit an empty table")]
    EmptyTable,
}
