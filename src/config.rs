/// Crate `config` provides solver's configuration.
use std::{fmt, time::Duration};

/// Restart schedules, counted in conflicts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RestartPolicy {
    /// restart after `unit * luby(i)` conflicts.
    Luby { unit: usize },
    /// restart after `first * factor^i` conflicts.
    Geometric { first: usize, factor: f64 },
    /// never restart.
    Never,
}

/// Precision/performance trade-offs of the cutting-planes conflict analysis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnalysisMode {
    /// resolve with arbitrary precision coefficients all the way.
    CuttingPlanes,
    /// collapse the working constraint to a cardinality constraint
    /// once a coefficient doesn't fit in a machine word.
    ReduceToCardinality,
    /// fall back to clausal resolution once a coefficient
    /// needs more than `bound_bits` bits.
    Cautious { bound_bits: u64 },
}

/// Simplification policies of the normalizer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SimplificationPolicy {
    /// saturate coefficients and divide equal coefficients eagerly.
    ForCompetition,
    /// keep an exact mapping to the given constraint where possible.
    NoCompetition,
}

/// Activity bumping policies of the learned constraint database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LearnedPolicy {
    /// bump by one for each participation in a conflict analysis.
    Activity,
    /// bump by one if all the vars of the constraint occur in the objective,
    /// otherwise by the size of the constraint.
    ObjectiveDriven,
}

/// Configuration of every solver module
#[derive(Clone, Debug)]
pub struct Config {
    //
    //## resource limits
    //
    /// Wall-clock limit of a call
    pub timeout: Option<Duration>,

    /// Conflict limit of a call
    pub conflict_budget: Option<usize>,

    //
    //## constraint DB
    //
    /// Normalizer mode
    pub simplification: SimplificationPolicy,

    /// Register the clause implied by each new PB constraint
    pub implied_clauses: bool,

    /// Activity policy of learnt constraints
    pub learned_policy: LearnedPolicy,

    /// #conflicts before the first reduction
    pub first_reduction: usize,

    /// Growth rate of the reduction interval
    pub reduce_inc: f64,

    /// Disable learnt constraint reduction
    pub without_reduce: bool,

    /// Remove learnts satisfied at the root level
    pub root_cleanup: bool,

    //
    //## conflict analysis
    //
    /// Cutting-planes variant
    pub analysis_mode: AnalysisMode,

    //
    //## var selection
    //
    /// Var activity decay rate
    pub var_decay: f64,

    //
    //## restarter
    //
    /// Restart schedule
    pub restart: RestartPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timeout: None,
            conflict_budget: None,
            simplification: SimplificationPolicy::ForCompetition,
            implied_clauses: false,
            learned_policy: LearnedPolicy::Activity,
            first_reduction: 2000,
            reduce_inc: 1.1,
            without_reduce: false,
            root_cleanup: true,
            analysis_mode: AnalysisMode::CuttingPlanes,
            var_decay: 0.95,
            restart: RestartPolicy::Luby { unit: 100 },
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Config(timeout: {:?}, budget: {:?}, analysis: {:?}, normalizer: {:?}, learnts: {:?}, restart: {:?})",
            self.timeout,
            self.conflict_budget,
            self.analysis_mode,
            self.simplification,
            self.learned_policy,
            self.restart,
        )
    }
}

impl Config {
    /// return a config with an analysis mode.
    ///
    /// ```
    /// use cplane::config::{AnalysisMode, Config};
    /// let config = Config::default().with_analysis(AnalysisMode::Cautious { bound_bits: 32 });
    /// assert_eq!(config.analysis_mode, AnalysisMode::Cautious { bound_bits: 32 });
    /// ```
    pub fn with_analysis(mut self, mode: AnalysisMode) -> Self {
        self.analysis_mode = mode;
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
    pub fn with_conflict_budget(mut self, budget: usize) -> Self {
        self.conflict_budget = Some(budget);
        self
    }
    pub fn with_restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }
}
