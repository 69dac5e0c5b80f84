/// Module `state` is a collection of internal data about the running search.
use {
    crate::{solver::SolverEvent, types::*},
    std::{
        fmt,
        ops::{Index, IndexMut},
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::{Duration, Instant},
    },
};

/// stat index.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stat {
    /// the number of conflicts
    Conflict = 0,
    /// the number of decisions
    Decision,
    /// the number of propagations
    Propagation,
    /// the number of restarts
    Restart,
    /// the number of learned constraint DB reductions
    Reduction,
    /// the number of learned constraints
    Learned,
    /// the number of learned clauses
    LearnedClause,
    /// the number of learned cardinality constraints
    LearnedCardinality,
    /// the number of learned general PB constraints
    LearnedPb,
    /// the number of deleted learned constraints
    Deleted,
    /// the number of root level cleanups
    RootCleanup,
    /// the number of fallbacks to weaker reasoning in conflict analysis
    AnalysisFallback,
    /// the number of calls aborted by the deadline or the conflict budget
    Timeout,
    /// don't use this dummy (sentinel at the tail).
    EndOfStatIndex,
}

const STAT_NAMES: [(Stat, &str); Stat::EndOfStatIndex as usize] = [
    (Stat::Conflict, "conflicts"),
    (Stat::Decision, "decisions"),
    (Stat::Propagation, "propagations"),
    (Stat::Restart, "restarts"),
    (Stat::Reduction, "reductions"),
    (Stat::Learned, "learned"),
    (Stat::LearnedClause, "learned_clauses"),
    (Stat::LearnedCardinality, "learned_cardinalities"),
    (Stat::LearnedPb, "learned_pbs"),
    (Stat::Deleted, "deleted"),
    (Stat::RootCleanup, "root_cleanups"),
    (Stat::AnalysisFallback, "analysis_fallbacks"),
    (Stat::Timeout, "timeouts"),
];

impl Index<Stat> for [usize] {
    type Output = usize;
    #[inline]
    fn index(&self, i: Stat) -> &usize {
        &self[i as usize]
    }
}

impl IndexMut<Stat> for [usize] {
    #[inline]
    fn index_mut(&mut self, i: Stat) -> &mut usize {
        &mut self[i as usize]
    }
}

/// Data storage for `Solver`.
#[derive(Clone, Debug)]
pub struct State {
    /// solver configuration
    pub config: Config,
    /// collection of statistics data
    pub stats: [usize; Stat::EndOfStatIndex as usize],
    /// problem description
    pub target: ProblemDescription,
    /// `false` after the constraint set is found unsatisfiable
    pub ok: bool,
    /// the failed assumptions of the last call
    pub conflicts: Vec<Lit>,
    /// the model of the last satisfiable call, in DIMACS form
    pub model: Vec<i32>,
    /// the wall-clock deadline of the current call
    deadline: Option<Instant>,
    /// the conflict count at which the current call gives up
    conflict_limit: Option<usize>,
    /// cross-thread expiry flag
    expired: Arc<AtomicBool>,
    /// the start time of the current call
    pub start: Instant,
}

impl Default for State {
    fn default() -> State {
        State {
            config: Config::default(),
            stats: [0; Stat::EndOfStatIndex as usize],
            target: ProblemDescription::default(),
            ok: true,
            conflicts: Vec::new(),
            model: Vec::new(),
            deadline: None,
            conflict_limit: None,
            expired: Arc::new(AtomicBool::new(false)),
            start: Instant::now(),
        }
    }
}

impl Index<Stat> for State {
    type Output = usize;
    #[inline]
    fn index(&self, i: Stat) -> &usize {
        &self.stats[i as usize]
    }
}

impl IndexMut<Stat> for State {
    #[inline]
    fn index_mut(&mut self, i: Stat) -> &mut usize {
        &mut self.stats[i as usize]
    }
}

impl Instantiate for State {
    fn instantiate(config: &Config, desc: &ProblemDescription) -> State {
        State {
            config: config.clone(),
            target: desc.clone(),
            ..State::default()
        }
    }
    fn handle(&mut self, e: SolverEvent) {
        match e {
            SolverEvent::NewVar => self.target.num_of_variables += 1,
            SolverEvent::Restart => self[Stat::Restart] += 1,
            SolverEvent::Reinitialize => {
                self.ok = true;
                self.conflicts.clear();
            }
            _ => (),
        }
    }
}

/// API for resource limits of a search.
pub trait TimeoutIF {
    /// arm the deadline and the conflict budget for a new call.
    fn start_call(&mut self, num_conflict: usize);
    /// return `true` if the current call should give up.
    fn is_timeout(&self, num_conflict: usize) -> bool;
    /// make the running (or next) check point fail.
    fn expire(&self);
    /// return the flag another thread can set to stop the search.
    fn timeout_handle(&self) -> Arc<AtomicBool>;
}

impl TimeoutIF for State {
    fn start_call(&mut self, num_conflict: usize) {
        self.start = Instant::now();
        self.expired.store(false, Ordering::Relaxed);
        self.deadline = self.config.timeout.map(|d| self.start + d);
        self.conflict_limit = self.config.conflict_budget.map(|n| num_conflict + n);
    }
    fn is_timeout(&self, num_conflict: usize) -> bool {
        self.expired.load(Ordering::Relaxed)
            || self.conflict_limit.map_or(false, |n| n <= num_conflict)
            || self.deadline.map_or(false, |t| t <= Instant::now())
    }
    fn expire(&self) {
        self.expired.store(true, Ordering::Relaxed);
    }
    fn timeout_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.expired)
    }
}

impl State {
    /// return the elapsed time of the current (or last) call.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
    /// return all the counters as a deterministic list of name/value pairs.
    ///
    /// ```
    /// use cplane::state::State;
    /// let state = State::default();
    /// let stats = state.stats();
    /// assert_eq!(stats[0], ("conflicts", 0));
    /// assert!(stats.iter().any(|(name, _)| *name == "learned_pbs"));
    /// ```
    pub fn stats(&self) -> Vec<(&'static str, usize)> {
        STAT_NAMES
            .iter()
            .map(|(key, name)| (*name, self.stats[*key]))
            .collect::<Vec<_>>()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, time: {:.3}s", self.target, self.elapsed().as_secs_f64())?;
        for (name, val) in self.stats() {
            write!(f, "\n  {name:>22}: {val:>12}")?;
        }
        Ok(())
    }
}
