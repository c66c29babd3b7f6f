//! Stolen-base opportunity tables.
//!
//! Every play row is an opportunity: either some subset of the runners
//! took off (a combination like `["1B"]` or `["1B", "2B"]`) or nobody did
//! (the `"none"` combination, which carries most of the probability
//! mass). Per base-out state the table records how likely each
//! combination is, and for each attempting base an empirical success rate
//! pooled across every combination in that state the base attempted in.
//!
//! Success rates are clamped to keep degenerate small samples from
//! pinning the simulator at 0% or 100%.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TableError;
use crate::state::Base;
use crate::table::PROBABILITY_TOLERANCE;

/// Lower clamp on empirical steal success rates.
pub const SUCCESS_RATE_FLOOR: f64 = 0.10;
/// Upper clamp on empirical steal success rates.
pub const SUCCESS_RATE_CEILING: f64 = 0.90;

/// Steal / caught-stealing flags for one play, straight off the feed:
/// `sb2` is a steal of second (so an attempt by the runner on first),
/// `cs2` the matching caught-stealing, and so on through `sbh`/`csh` for
/// steals of home.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StealFlags {
    pub sb2: bool,
    pub sb3: bool,
    pub sbh: bool,
    pub cs2: bool,
    pub cs3: bool,
    pub csh: bool,
}

impl StealFlags {
    /// Whether the runner on `base` attempted a steal on this play.
    pub fn attempted(&self, base: Base) -> bool {
        match base {
            Base::First => self.sb2 || self.cs2,
            Base::Second => self.sb3 || self.cs3,
            Base::Third => self.sbh || self.csh,
        }
    }

    /// Whether the runner on `base` stole successfully.
    pub fn succeeded(&self, base: Base) -> bool {
        match base {
            Base::First => self.sb2,
            Base::Second => self.sb3,
            Base::Third => self.sbh,
        }
    }

    /// Attempting bases in 1B → 3B order.
    pub fn attempting(&self) -> Vec<Base> {
        Base::ALL
            .iter()
            .copied()
            .filter(|base| self.attempted(*base))
            .collect()
    }

    /// True when at least one runner took off.
    pub fn is_attempt(&self) -> bool {
        Base::ALL.iter().any(|base| self.attempted(*base))
    }
}

/// One play's worth of steal context: the positional base-out state and
/// the play's flags.
#[derive(Debug, Clone)]
pub struct StealOpportunity {
    pub state: String,
    pub flags: StealFlags,
}

/// One attempting-runner combination within a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StealOutcome {
    /// Attempting bases by wire label, 1B → 3B order; empty for "none".
    pub runners: Vec<String>,
    /// Share of this combination among all opportunities in the state.
    pub probability: f64,
    /// Clamped success rate per attempting base.
    pub success_rates: BTreeMap<String, f64>,
}

/// All combinations observed from one base-out state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StealEntry {
    pub outcomes: Vec<StealOutcome>,
}

/// Base-out state → observed steal combinations.
pub type StealTable = BTreeMap<String, StealEntry>;

fn base_index(base: Base) -> usize {
    match base {
        Base::First => 0,
        Base::Second => 1,
        Base::Third => 2,
    }
}

/// Sort key for a combination; the no-attempt combination renders as
/// `"none"`, which sorts after every base list and matches the emitted
/// artifact's ordering.
fn combo_key(bases: &[Base]) -> String {
    if bases.is_empty() {
        "none".to_string()
    } else {
        bases
            .iter()
            .map(|base| base.label())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Aggregate opportunities into the steal table.
pub fn build_steal_table(opportunities: &[StealOpportunity]) -> Result<StealTable, TableError> {
    if opportunities.is_empty() {
        return Err(TableError::EmptyTable);
    }

    #[derive(Default)]
    struct StateAccum {
        total: u64,
        combos: BTreeMap<String, (Vec<Base>, u64)>,
        attempts: [u64; 3],
        successes: [u64; 3],
    }

    let mut states: BTreeMap<&str, StateAccum> = BTreeMap::new();
    for opp in opportunities {
        let acc = states.entry(opp.state.as_str()).or_default();
        acc.total += 1;
        let bases = opp.flags.attempting();
        acc.combos
            .entry(combo_key(&bases))
            .or_insert_with(|| (bases.clone(), 0))
            .1 += 1;
        for base in bases {
            let i = base_index(base);
            acc.attempts[i] += 1;
            if opp.flags.succeeded(base) {
                acc.successes[i] += 1;
            }
        }
    }

    let mut table = StealTable::new();
    for (state, acc) in states {
        let mut outcomes = Vec::with_capacity(acc.combos.len());
        for (bases, count) in acc.combos.into_values() {
            let mut success_rates = BTreeMap::new();
            for base in &bases {
                let i = base_index(*base);
                // A base listed in a combination attempted at least once,
                // so the pooled attempt count is never zero.
                let rate = acc.successes[i] as f64 / acc.attempts[i] as f64;
                success_rates.insert(
                    base.label().to_string(),
                    rate.clamp(SUCCESS_RATE_FLOOR, SUCCESS_RATE_CEILING),
                );
            }
            outcomes.push(StealOutcome {
                runners: bases.iter().map(|base| base.label().to_string()).collect(),
                probability: count as f64 / acc.total as f64,
                success_rates,
            });
        }
        table.insert(state.to_string(), StealEntry { outcomes });
    }
    Ok(table)
}

/// Re-check a finished steal table: combination probabilities sum to 1
/// per state and every success rate sits inside the clamp interval.
pub fn verify_steal_table(table: &StealTable) -> Result<(), TableError> {
    for (state, entry) in table {
        let sum: f64 = entry.outcomes.iter().map(|o| o.probability).sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(TableError::StealProbabilitySum {
                state: state.clone(),
                sum,
            });
        }
        for outcome in &entry.outcomes {
            for (base, rate) in &outcome.success_rates {
                if !(SUCCESS_RATE_FLOOR..=SUCCESS_RATE_CEILING).contains(rate) {
                    return Err(TableError::SuccessRateOutOfRange {
                        base: base.clone(),
                        state: state.clone(),
                        rate: *rate,
                        lo: SUCCESS_RATE_FLOOR,
                        hi: SUCCESS_RATE_CEILING,
                    });
                }
            }
        }
    }
    Ok(())
}
