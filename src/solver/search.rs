//! Conflict-Driven Clause Learning Search engine
use {
    super::{
        conflict::handle_conflict, Certificate, RestartIF, Restarter, Solver, SolverEvent,
        SolverResult, State, WorkingConstraint,
    },
    crate::{
        assign::{AssignIF, AssignStack, PropagateIF, VarSelectIF},
        cdb::{property::Tusize, ConstraintDB, ConstraintDBIF, ReductionIF},
        state::{Stat, TimeoutIF},
        types::*,
    },
    num_bigint::BigInt,
    std::{
        sync::{atomic::AtomicBool, Arc},
        time::Duration,
    },
};

/// API to [`solve`](`crate::solver::SolveIF::solve`) the constraint set.
pub trait SolveIF {
    /// search an assignment.
    ///
    /// # Errors
    ///
    /// * `SolverError::TimeOut` if the deadline or the conflict budget was exhausted.
    /// * `SolverError::SolverBug` if the found model falsifies a constraint.
    fn solve(&mut self) -> SolverResult;
    /// return `Ok(true)` if the constraint set is satisfiable under the assumptions,
    /// which are given as DIMACS literals and decided in order.
    /// The model is available through [`model`](`Solver::model`) afterward.
    ///
    /// # Errors
    ///
    /// * `SolverError::OutOfRange` for an illegal assumption.
    /// * the others as [`solve`](`SolveIF::solve`).
    ///
    /// # Example
    ///
    /// ```
    /// use cplane::*;
    ///
    /// let mut s = Solver::instantiate(&Config::default(), &ProblemDescription::with_vars(3));
    /// s.add_at_most(&[1, 2, 3], 1).unwrap();
    /// s.add_clause([-3, 2]).unwrap();
    /// assert_eq!(s.is_satisfiable(&[1, 3]), Ok(false));
    /// assert_eq!(s.unsat_explanation(), vec![1, 3]);
    /// assert_eq!(s.is_satisfiable(&[3]), Ok(false));
    /// assert_eq!(s.is_satisfiable(&[2]), Ok(true));
    /// assert_eq!(s.model(), &[-1, 2, -3]);
    /// ```
    fn is_satisfiable(&mut self, assumptions: &[i32]) -> Result<bool, SolverError>;
    /// return the assumptions responsible for the last `Ok(false)`, in DIMACS form.
    /// It's empty if the constraint set is unsatisfiable by itself.
    fn unsat_explanation(&self) -> Vec<i32>;
}

impl SolveIF for Solver {
    fn solve(&mut self) -> SolverResult {
        match self.is_satisfiable(&[]) {
            Ok(true) => Ok(Certificate::SAT(self.state.model.clone())),
            Ok(false) => Ok(Certificate::UNSAT),
            Err(e) => Err(e),
        }
    }
    fn is_satisfiable(&mut self, assumptions: &[i32]) -> Result<bool, SolverError> {
        self.state.conflicts.clear();
        self.state.model.clear();
        if !self.state.ok {
            return Ok(false);
        }
        let assumptions = self.import_lits(assumptions)?;
        let Solver {
            ref mut asg,
            ref mut cdb,
            ref mut rst,
            ref mut state,
            ref mut cut,
            ..
        } = self;
        asg.cancel_until(0);
        state.start_call(asg.num_conflict);
        log::info!(
            "search with {} assumptions: {}",
            assumptions.len(),
            state.target
        );
        let result = search(asg, cdb, rst, state, cut, &assumptions);
        asg.cancel_until(0);
        state[Stat::Decision] = asg.num_decision;
        state[Stat::Propagation] = asg.num_propagation;
        match result {
            Ok(true) => log::info!("satisfiable in {:.3}s", state.elapsed().as_secs_f64()),
            Ok(false) => log::info!("unsatisfiable in {:.3}s", state.elapsed().as_secs_f64()),
            Err(SolverError::TimeOut) => {
                state[Stat::Timeout] += 1;
                log::debug!("time out after {} conflicts", state[Stat::Conflict]);
            }
            Err(ref e) => log::error!("search failed: {e}"),
        }
        result
    }
    fn unsat_explanation(&self) -> Vec<i32> {
        i32s(&self.state.conflicts)
    }
}

/// the CDCL loop. Return `Ok(true)` with a model in `state.model`.
fn search(
    asg: &mut AssignStack,
    cdb: &mut ConstraintDB,
    rst: &mut Restarter,
    state: &mut State,
    cut: &mut WorkingConstraint,
    assumptions: &[Lit],
) -> Result<bool, SolverError> {
    let mut num_asserted = asg.num_asserted_vars;
    loop {
        if let Some(ci) = asg.propagate(cdb) {
            state[Stat::Conflict] += 1;
            asg.handle(SolverEvent::Conflict);
            if asg.decision_level() == 0 || !handle_conflict(asg, cdb, state, cut, ci)? {
                state.ok = false;
                return Ok(false);
            }
            if rst.restart() {
                asg.cancel_until(0);
                cdb.rewatch(asg);
                asg.handle(SolverEvent::Restart);
                rst.handle(SolverEvent::Restart);
                state.handle(SolverEvent::Restart);
                log::debug!(
                    "restart #{} at {} conflicts",
                    state[Stat::Restart],
                    asg.num_conflict
                );
            }
            if cdb.should_reduce(asg.num_conflict) {
                state[Stat::Reduction] += 1;
                state[Stat::Deleted] += cdb.reduce(asg, asg.num_conflict);
            }
            continue;
        }
        if asg.decision_level() == 0
            && state.config.root_cleanup
            && num_asserted < asg.num_asserted_vars
        {
            num_asserted = asg.num_asserted_vars;
            state[Stat::RootCleanup] += 1;
            state[Stat::Deleted] += cdb.root_cleanup(asg);
        }
        if state.is_timeout(asg.num_conflict) {
            return Err(SolverError::TimeOut);
        }
        if let Some(&a) = assumptions.get(asg.decision_level() as usize) {
            match asg.assigned(a) {
                Some(true) => asg.level_up(),
                Some(false) => {
                    state.conflicts = analyze_final(asg, cdb, !a);
                    log::debug!("assumption {a} failed");
                    return Ok(false);
                }
                None => asg.assign_by_decision(a),
            }
            continue;
        }
        let Some(l) = asg.select_decision_literal() else {
            if let Some(cid) = cdb.validate(asg.assign_ref()) {
                log::error!("the model falsifies {cid}");
                return Err(SolverError::SolverBug);
            }
            state.model = (1..=asg.num_vars)
                .map(|vi| {
                    let v = vi as i32;
                    if asg.assign(vi) == Some(true) {
                        v
                    } else {
                        -v
                    }
                })
                .collect();
            return Ok(true);
        };
        asg.assign_by_decision(l);
    }
}

/// return the assumptions which imply the literal `p`.
fn analyze_final(asg: &AssignStack, cdb: &ConstraintDB, p: Lit) -> Vec<Lit> {
    let mut seen = vec![false; asg.num_vars + 1];
    let mut conflicts = vec![!p];
    seen[p.vi()] = true;
    let end = asg.len_upto(0);
    for i in (end..asg.stack_len()).rev() {
        let l = asg.stack(i);
        let vi = l.vi();
        if !seen[vi] {
            continue;
        }
        match asg.reason(vi) {
            AssignReason::Decision(_) => conflicts.push(l),
            AssignReason::Implication(cid) => {
                for q in cdb.reason_lits(cid, l, asg) {
                    if 0 < asg.level(q.vi()) {
                        seen[q.vi()] = true;
                    }
                }
            }
            AssignReason::Asserted | AssignReason::None => (),
        }
    }
    conflicts.sort_unstable();
    conflicts
}

impl Solver {
    /// return the model found by the last satisfiable call, in DIMACS form.
    pub fn model(&self) -> &[i32] {
        &self.state.model
    }
    /// return the value of a var in the last model.
    pub fn model_value(&self, vi: VarId) -> Option<bool> {
        vi.checked_sub(1)
            .and_then(|i| self.state.model.get(i))
            .map(|l| 0 < *l)
    }
    /// return the cost of the last model under the objective function.
    pub fn objective_value(&self) -> Option<BigInt> {
        if self.state.model.is_empty() {
            return None;
        }
        self.objective
            .as_ref()
            .map(|obj| obj.evaluate(&self.state.model))
    }
    pub fn num_vars(&self) -> usize {
        self.asg.num_vars()
    }
    /// return the number of original constraints.
    pub fn num_constraints(&self) -> usize {
        self.cdb.derefer(Tusize::NumOriginal)
    }
    /// return all the counters as a list of name/value pairs.
    pub fn stats(&self) -> Vec<(&'static str, usize)> {
        self.state.stats()
    }
    /// make the running search (or the next check point) time out.
    pub fn expire_timeout(&self) {
        self.state.expire();
    }
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.state.config.timeout = Some(timeout);
    }
    pub fn set_conflict_budget(&mut self, budget: usize) {
        self.state.config.conflict_budget = Some(budget);
    }
    /// return a flag which another thread can set to stop the search.
    pub fn timeout_handle(&self) -> Arc<AtomicBool> {
        self.state.timeout_handle()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::solver::SolverBuildIF};

    fn solver(n: usize, config: &Config) -> Solver {
        Solver::instantiate(config, &ProblemDescription::with_vars(n))
    }

    /// at least 5 of 8 vars in a chain where no two neighbors are true
    fn build_hard(s: &mut Solver) {
        for i in 1..=7 {
            s.add_clause([-i, -(i + 1)]).unwrap();
        }
        s.add_at_least(&[1, 2, 3, 4, 5, 6, 7, 8], 5).unwrap();
    }

    #[test]
    fn test_unsat_by_search() {
        let mut s = solver(8, &Config::default());
        build_hard(&mut s);
        assert_eq!(s.solve(), Ok(Certificate::UNSAT));
        assert!(!s.state.ok);
        assert!(0 < s.state[Stat::Conflict]);
        assert!(s.unsat_explanation().is_empty());
        // every later call answers UNSAT.
        assert_eq!(s.is_satisfiable(&[1]), Ok(false));
    }

    #[test]
    fn test_model_validation_and_objective() {
        let mut s = solver(4, &Config::default());
        let coefs = [2, 3, 4].map(BigInt::from);
        s.add_pseudo_boolean(&[1, 2, 3], &coefs, true, &BigInt::from(5))
            .unwrap();
        s.add_clause([-2, -3]).unwrap();
        s.set_objective_function(&[1, 2, 3], &[1, 1, 1].map(BigInt::from))
            .unwrap();
        assert_eq!(s.objective_value(), None);
        let Ok(Certificate::SAT(model)) = s.solve() else {
            panic!("it should be satisfiable");
        };
        assert_eq!(model.len(), 4);
        assert_eq!(s.model_value(1), Some(true));
        assert_eq!(s.model_value(0), None);
        assert_eq!(s.objective_value(), Some(BigInt::from(2)));
    }

    #[test]
    fn test_conflict_budget() {
        let config = Config::default().with_conflict_budget(0);
        let mut s = solver(8, &config);
        build_hard(&mut s);
        assert_eq!(s.solve(), Err(SolverError::TimeOut));
        assert_eq!(s.state[Stat::Timeout], 1);
        assert!(s.state.ok);
        s.set_conflict_budget(1_000_000);
        assert_eq!(s.solve(), Ok(Certificate::UNSAT));
    }

    #[test]
    fn test_expire_timeout() {
        let mut s = solver(8, &Config::default());
        build_hard(&mut s);
        let handle = s.timeout_handle();
        s.expire_timeout();
        assert!(handle.load(std::sync::atomic::Ordering::Relaxed));
        // a new call rearms the limits.
        assert_eq!(s.solve(), Ok(Certificate::UNSAT));
        let mut s = solver(8, &Config::default());
        build_hard(&mut s);
        s.set_timeout(Duration::from_secs(0));
        assert_eq!(s.solve(), Err(SolverError::TimeOut));
    }
}
