//! Conflict Analysis
use {
    super::{cutting::WorkingConstraint, State},
    crate::{
        assign::{AssignIF, AssignStack, PropagateIF},
        cdb::{normalize, ConstraintDB, ConstraintDBIF, Normalized, ReductionIF, Visit},
        config::AnalysisMode,
        state::{Stat, TimeoutIF},
        types::*,
    },
    num_bigint::BigUint,
    num_traits::One,
};

/// coefficients wider than this are reduced in `AnalysisMode::ReduceToCardinality`.
const MACHINE_WORD_BITS: u64 = 62;

/// derive an assertive constraint from the conflicting constraint `ci`, backjump,
/// and register it as learned. Return `Ok(false)` if the conflict proves unsatisfiability.
///
/// # Errors
///
/// * `SolverError::TimeOut` if the search ran out of time in the analysis.
/// * `SolverError::SolverBug` if the learned constraint was falsified after backjumping.
pub fn handle_conflict(
    asg: &mut AssignStack,
    cdb: &mut ConstraintDB,
    state: &mut State,
    wc: &mut WorkingConstraint,
    ci: ConstraintId,
) -> Result<bool, SolverError> {
    let (terms, degree) = cdb.terms(ci);
    wc.load(&terms, &degree);
    cdb.on_conflict_analysis(ci);
    let mut clausal = false;
    check_precision(asg, state, wc, &mut clausal);
    let mut modified = true;
    let mut last_level = asg.decision_level();
    loop {
        let dl = asg.decision_level();
        if dl == 0 || wc.is_empty() {
            return Ok(false);
        }
        if (modified || dl != last_level) && wc.is_assertive(asg) {
            break;
        }
        modified = false;
        last_level = dl;
        if state.is_timeout(asg.num_conflict) {
            return Err(SolverError::TimeOut);
        }
        let p = asg.stack(asg.stack_len() - 1);
        if let AssignReason::Implication(cid) = asg.reason(p.vi()) {
            if wc.coef(!p).is_some() {
                let (terms, degree) = if clausal {
                    let mut terms = vec![(p, BigUint::one())];
                    terms.extend(
                        cdb.reason_lits(cid, p, asg)
                            .into_iter()
                            .map(|l| (l, BigUint::one())),
                    );
                    (terms, BigUint::one())
                } else {
                    cdb.terms(cid)
                };
                let weakened = wc.resolve(p, &terms, &degree, asg);
                if cfg!(feature = "reason_side_rewarding") {
                    for vi in weakened {
                        asg.reward_at_analysis(vi);
                    }
                }
                cdb.on_conflict_analysis(cid);
                #[cfg(feature = "trace_analysis")]
                log::trace!(
                    "resolved on {p} with {cid}: {} literals, degree {}",
                    wc.iter().count(),
                    wc.degree(),
                );
                check_precision(asg, state, wc, &mut clausal);
                modified = true;
            }
        }
        asg.undo_one();
    }
    let bl = wc.backtrack_level(asg);
    for vi in wc.touched() {
        asg.reward_at_analysis(*vi);
    }
    asg.update_activity_tick();
    cdb.update_activity_tick();
    let (lits, coefs, degree) = wc.to_terms();
    let learnt = match normalize(
        asg,
        &lits,
        &coefs,
        true,
        &degree,
        state.config.simplification,
    ) {
        Ok(n) => n,
        Err(SolverError::Contradiction(_)) => return Ok(false),
        Err(e) => return Err(e),
    };
    match learnt.kind() {
        Some(ConstraintKind::Unit | ConstraintKind::Binary | ConstraintKind::Clause) => {
            state[Stat::LearnedClause] += 1
        }
        Some(ConstraintKind::Cardinality) => state[Stat::LearnedCardinality] += 1,
        Some(ConstraintKind::Pb) => state[Stat::LearnedPb] += 1,
        None => {
            log::error!("learned a trivial constraint at level {}", asg.decision_level());
            return Err(SolverError::SolverBug);
        }
    }
    state[Stat::Learned] += 1;
    log::trace!("learned {learnt:?}, backjump to {bl}");
    if let Normalized::Unit(l) = learnt {
        asg.cancel_until(0);
        return Ok(asg.assign_at_root_level(l).is_ok());
    }
    asg.cancel_until(bl);
    let Some(cid) = cdb.new_constraint(asg, learnt, true) else {
        return Err(SolverError::SolverBug);
    };
    cdb.on_constraint_learned(cid);
    let mut implied = Vec::new();
    if cdb.check(cid, asg, &mut implied) == Visit::Conflict {
        log::error!("learned constraint {cid} is falsified at level {bl}");
        return Err(SolverError::SolverBug);
    }
    for l in implied {
        asg.assign_by_implication(l, AssignReason::Implication(cid));
    }
    Ok(true)
}

/// weaken the working constraint if its coefficients got wider than the analysis mode allows.
fn check_precision(
    asg: &AssignStack,
    state: &mut State,
    wc: &mut WorkingConstraint,
    clausal: &mut bool,
) {
    match state.config.analysis_mode {
        AnalysisMode::CuttingPlanes => (),
        AnalysisMode::ReduceToCardinality if MACHINE_WORD_BITS < wc.max_bits() => {
            log::debug!("reduce to a cardinality constraint at {} bits", wc.max_bits());
            wc.reduce_to_cardinality(asg);
            state[Stat::AnalysisFallback] += 1;
        }
        AnalysisMode::Cautious { bound_bits } if !*clausal && bound_bits < wc.max_bits() => {
            log::debug!("fall back to clausal analysis at {} bits", wc.max_bits());
            wc.reduce_to_clause(asg);
            *clausal = true;
            state[Stat::AnalysisFallback] += 1;
        }
        _ => (),
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::config::SimplificationPolicy,
        num_bigint::BigInt,
    };

    fn lit(i: i32) -> Lit {
        Lit::from(i)
    }

    struct Env {
        asg: AssignStack,
        cdb: ConstraintDB,
        state: State,
        wc: WorkingConstraint,
    }

    impl Env {
        fn new(n: usize, config: Config) -> Env {
            let desc = ProblemDescription::with_vars(n);
            Env {
                asg: AssignStack::instantiate(&config, &desc),
                cdb: ConstraintDB::instantiate(&config, &desc),
                state: State::instantiate(&config, &desc),
                wc: WorkingConstraint::instantiate(&config, &desc),
            }
        }
        fn add(&mut self, lits: &[i32], coefs: &[i64], degree: i64) -> ConstraintId {
            let lits = lits.iter().map(|i| lit(*i)).collect::<Vec<_>>();
            let coefs = coefs.iter().map(|c| BigInt::from(*c)).collect::<Vec<_>>();
            let n = normalize(
                &self.asg,
                &lits,
                &coefs,
                true,
                &BigInt::from(degree),
                SimplificationPolicy::ForCompetition,
            )
            .unwrap();
            self.cdb.new_constraint(&self.asg, n, false).unwrap()
        }
        fn analyze(&mut self, ci: ConstraintId) -> Result<bool, SolverError> {
            handle_conflict(&mut self.asg, &mut self.cdb, &mut self.state, &mut self.wc, ci)
        }
    }

    #[test]
    fn test_clausal_conflict() {
        let mut env = Env::new(3, Config::default());
        env.add(&[1, 2], &[1, 1], 1);
        env.add(&[1, -2], &[1, 1], 1);
        env.asg.assign_by_decision(lit(-1));
        let ci = env.asg.propagate(&mut env.cdb).unwrap();
        assert_eq!(env.analyze(ci), Ok(true));
        // the learned unit x1 sits at the root
        assert_eq!(env.asg.decision_level(), 0);
        assert_eq!(env.asg.root_value(lit(1)), Some(true));
        assert_eq!(env.state[Stat::Learned], 1);
        assert_eq!(env.state[Stat::LearnedClause], 1);
    }

    #[test]
    fn test_pb_conflict_learns_assertive_constraint() {
        let mut env = Env::new(4, Config::default());
        // 2x1 + x2 + x3 >= 2, 2¬x1 + x2 + x4 >= 2
        env.add(&[1, 2, 3], &[2, 1, 1], 2);
        env.add(&[-1, 2, 4], &[2, 1, 1], 2);
        env.asg.assign_by_decision(lit(-2));
        let ci = env.asg.propagate(&mut env.cdb).unwrap();
        assert_eq!(env.analyze(ci), Ok(true));
        // 2x2 + x3 >= 2 or 2x2 + x4 >= 2 is learned, and asserts x2 at the root.
        assert_eq!(env.asg.decision_level(), 0);
        assert_eq!(env.asg.assigned(lit(2)), Some(true));
        assert_eq!(env.state[Stat::Learned], 1);
        assert_eq!(env.state[Stat::LearnedPb], 1);
        assert_eq!(env.asg.propagate(&mut env.cdb), None);
    }

    #[test]
    fn test_root_level_conflict_is_unsat() {
        let mut env = Env::new(2, Config::default());
        env.add(&[1, 2], &[1, 1], 1);
        env.add(&[-1, 2], &[1, 1], 1);
        env.add(&[1, -2], &[1, 1], 1);
        env.add(&[-1, -2], &[1, 1], 1);
        env.asg.assign_by_decision(lit(-1));
        let ci = env.asg.propagate(&mut env.cdb).unwrap();
        assert_eq!(env.analyze(ci), Ok(true));
        assert_eq!(env.asg.root_value(lit(1)), Some(true));
        let ci = env.asg.propagate(&mut env.cdb).unwrap();
        assert_eq!(env.asg.decision_level(), 0);
        assert_eq!(env.analyze(ci), Ok(false));
    }

    #[test]
    fn test_cautious_fallback() {
        let config = Config::default().with_analysis(AnalysisMode::Cautious { bound_bits: 1 });
        let mut env = Env::new(4, config);
        env.add(&[1, 2, 3], &[2, 1, 1], 2);
        env.add(&[-1, 2, 4], &[2, 1, 1], 2);
        env.asg.assign_by_decision(lit(-2));
        let ci = env.asg.propagate(&mut env.cdb).unwrap();
        assert_eq!(env.analyze(ci), Ok(true));
        assert_eq!(env.state[Stat::AnalysisFallback], 1);
        assert_eq!(env.state[Stat::LearnedClause], 1);
        assert_eq!(env.asg.root_value(lit(2)), Some(true));
    }
}
