//! Solver Builder
use {
    super::{Solver, SolverEvent},
    crate::{
        assign::{AssignIF, PropagateIF, VarSelectIF},
        cdb::{normalize, normalize_as_given, ConstraintDBIF, Normalized, ReductionIF, Visit},
        types::*,
    },
    num_bigint::{BigInt, BigUint},
    num_traits::One,
};

/// API for building and modifying the constraint set of a [`Solver`].
///
/// Literals are given in DIMACS form. Each `add_*` returns the handle of the
/// stored constraint, or `Ok(None)` if it is trivially satisfied.
pub trait SolverBuildIF: Instantiate {
    /// add a new var, and return its id.
    fn add_var(&mut self) -> VarId;
    /// add a clause.
    ///
    /// # Errors
    ///
    /// * `SolverError::OutOfRange` if a literal is `0` or beyond the number of vars.
    /// * `SolverError::Contradiction` if it conflicts with the root assignment;
    ///   it isn't stored, and the solver is inconsistent until an original
    ///   constraint is removed.
    ///
    /// # Example
    ///
    /// ```
    /// use cplane::*;
    ///
    /// let mut s = Solver::instantiate(&Config::default(), &ProblemDescription::with_vars(3));
    /// assert!(s.add_clause([1, -2]).unwrap().is_some());
    /// assert!(s.add_clause([1, -1]).unwrap().is_none());
    /// assert!(matches!(s.add_clause([4]), Err(SolverError::OutOfRange)));
    /// assert!(s.add_clause([-1]).is_ok());
    /// assert!(matches!(s.add_clause([2]), Err(SolverError::Contradiction(_))));
    /// ```
    fn add_clause<V>(&mut self, lits: V) -> Result<Option<ConstraintId>, SolverError>
    where
        V: AsRef<[i32]>;
    /// add 'at least `degree` of `lits`'.
    ///
    /// # Errors
    ///
    /// As [`add_clause`](`SolverBuildIF::add_clause`).
    fn add_at_least(
        &mut self,
        lits: &[i32],
        degree: usize,
    ) -> Result<Option<ConstraintId>, SolverError>;
    /// add 'at most `degree` of `lits`'.
    ///
    /// # Errors
    ///
    /// As [`add_clause`](`SolverBuildIF::add_clause`).
    fn add_at_most(
        &mut self,
        lits: &[i32],
        degree: usize,
    ) -> Result<Option<ConstraintId>, SolverError>;
    /// add 'exactly `degree` of `lits`' as a pair of 'at least' and 'at most' constraints.
    ///
    /// # Errors
    ///
    /// As [`add_clause`](`SolverBuildIF::add_clause`).
    #[allow(clippy::type_complexity)]
    fn add_exactly(
        &mut self,
        lits: &[i32],
        degree: usize,
    ) -> Result<(Option<ConstraintId>, Option<ConstraintId>), SolverError>;
    /// add `Σ coefs·lits ≥ degree` if `at_least`, `Σ coefs·lits ≤ degree` otherwise.
    /// Coefficients may be negative.
    ///
    /// # Errors
    ///
    /// * `SolverError::IllegalState` if `lits` and `coefs` differ in length.
    /// * the others as [`add_clause`](`SolverBuildIF::add_clause`).
    ///
    /// # Example
    ///
    /// ```
    /// use cplane::*;
    /// use num_bigint::BigInt;
    ///
    /// let mut s = Solver::instantiate(&Config::default(), &ProblemDescription::with_vars(3));
    /// let coefs = [3, 2, 1].map(BigInt::from);
    /// assert!(s.add_clause([-1]).is_ok());
    /// assert!(matches!(
    ///     s.add_pseudo_boolean(&[1, 2, 3], &coefs, true, &BigInt::from(4)),
    ///     Err(SolverError::Contradiction(ContradictionKind::Unsatisfiable))
    /// ));
    /// assert_eq!(s.is_satisfiable(&[]), Ok(false));
    /// ```
    fn add_pseudo_boolean(
        &mut self,
        lits: &[i32],
        coefs: &[BigInt],
        at_least: bool,
        degree: &BigInt,
    ) -> Result<Option<ConstraintId>, SolverError>;
    /// register the objective function, which biases the decision order and phases.
    ///
    /// # Errors
    ///
    /// * `SolverError::IllegalState` if `lits` and `coefs` differ in length.
    /// * `SolverError::OutOfRange` for an illegal literal.
    fn set_objective_function(&mut self, lits: &[i32], coefs: &[BigInt]) -> MaybeInconsistent;
    /// remove a constraint. Removing an original constraint discards all the learned
    /// constraints, and re-derives the root assignment from the remaining ones.
    /// Return `false` if `cid` isn't alive.
    fn remove_constraint(&mut self, cid: ConstraintId) -> bool;
}

impl SolverBuildIF for Solver {
    fn add_var(&mut self) -> VarId {
        let Solver {
            ref mut asg,
            ref mut cdb,
            ref mut rst,
            ref mut state,
            ref mut cut,
            ..
        } = self;
        asg.handle(SolverEvent::NewVar);
        cdb.handle(SolverEvent::NewVar);
        rst.handle(SolverEvent::NewVar);
        state.handle(SolverEvent::NewVar);
        cut.handle(SolverEvent::NewVar);
        asg.num_vars
    }
    fn add_clause<V>(&mut self, lits: V) -> Result<Option<ConstraintId>, SolverError>
    where
        V: AsRef<[i32]>,
    {
        let lits = lits.as_ref();
        let coefs = vec![BigInt::one(); lits.len()];
        self.add_constraint(lits, &coefs, true, &BigInt::one())
    }
    fn add_at_least(
        &mut self,
        lits: &[i32],
        degree: usize,
    ) -> Result<Option<ConstraintId>, SolverError> {
        let coefs = vec![BigInt::one(); lits.len()];
        self.add_constraint(lits, &coefs, true, &BigInt::from(degree))
    }
    fn add_at_most(
        &mut self,
        lits: &[i32],
        degree: usize,
    ) -> Result<Option<ConstraintId>, SolverError> {
        let coefs = vec![BigInt::one(); lits.len()];
        self.add_constraint(lits, &coefs, false, &BigInt::from(degree))
    }
    fn add_exactly(
        &mut self,
        lits: &[i32],
        degree: usize,
    ) -> Result<(Option<ConstraintId>, Option<ConstraintId>), SolverError> {
        let at_least = self.add_at_least(lits, degree)?;
        let at_most = self.add_at_most(lits, degree)?;
        Ok((at_least, at_most))
    }
    fn add_pseudo_boolean(
        &mut self,
        lits: &[i32],
        coefs: &[BigInt],
        at_least: bool,
        degree: &BigInt,
    ) -> Result<Option<ConstraintId>, SolverError> {
        self.add_constraint(lits, coefs, at_least, degree)
    }
    fn set_objective_function(&mut self, lits: &[i32], coefs: &[BigInt]) -> MaybeInconsistent {
        let lits = self.import_lits(lits)?;
        let objective = ObjectiveFunction::new(lits, coefs.to_vec())?;
        self.asg.set_objective_hints(&objective.phase_hints());
        self.cdb
            .set_objective_vars(&objective.vars().collect::<Vec<_>>());
        log::debug!("objective: {objective}");
        self.objective = Some(objective);
        Ok(())
    }
    fn remove_constraint(&mut self, cid: ConstraintId) -> bool {
        if !self.cdb.is_alive(cid) {
            return false;
        }
        if self.cdb[cid].is_learnt() {
            self.asg.cancel_until(0);
            self.cdb.remove_constraint(cid);
            return true;
        }
        let Solver {
            ref mut asg,
            ref mut cdb,
            ref mut rst,
            ref mut state,
            ..
        } = self;
        cdb.remove_constraint(cid);
        let num_learnt = cdb.remove_learnts();
        asg.handle(SolverEvent::Reinitialize);
        cdb.handle(SolverEvent::Reinitialize);
        rst.handle(SolverEvent::Reinitialize);
        state.handle(SolverEvent::Reinitialize);
        log::debug!("removed {cid} and {num_learnt} learned constraints");
        cdb.rewatch(asg);
        // rebuild the root assignment from scratch.
        let mut implied = Vec::new();
        for i in 1..cdb.len() {
            let cid = ConstraintId::from(i);
            if !cdb.is_alive(cid) {
                continue;
            }
            if cdb.check(cid, asg, &mut implied) == Visit::Conflict {
                state.ok = false;
                break;
            }
            for l in implied.drain(..) {
                if asg.assign_at_root_level(l).is_err() {
                    state.ok = false;
                }
            }
        }
        if state.ok && asg.propagate(cdb).is_some() {
            state.ok = false;
        }
        asg.rebuild_order();
        true
    }
}

impl Solver {
    /// convert DIMACS literals into `Lit`s.
    pub(super) fn import_lits(&self, lits: &[i32]) -> Result<Vec<Lit>, SolverError> {
        let nv = self.asg.num_vars();
        lits.iter()
            .map(|i| {
                if *i == 0 || nv < i.unsigned_abs() as usize {
                    Err(SolverError::OutOfRange)
                } else {
                    Ok(Lit::from(*i))
                }
            })
            .collect()
    }
    fn add_constraint(
        &mut self,
        lits: &[i32],
        coefs: &[BigInt],
        at_least: bool,
        degree: &BigInt,
    ) -> Result<Option<ConstraintId>, SolverError> {
        if !self.state.ok {
            return Err(SolverError::Contradiction(ContradictionKind::RootConflict));
        }
        let lits = self.import_lits(lits)?;
        let Solver {
            ref mut asg,
            ref mut cdb,
            ref mut state,
            ..
        } = self;
        asg.cancel_until(0);
        let policy = state.config.simplification;
        if let Err(e) = normalize(asg, &lits, coefs, at_least, degree, policy) {
            if matches!(e, SolverError::Contradiction(_)) {
                state.ok = false;
            }
            return Err(e);
        }
        // Store it as given. The root assignment may be rebuilt without the facts
        // which would simplify it now.
        let normalized = normalize_as_given(&lits, coefs, at_least, degree, policy)?;
        let implied_clause = if state.config.implied_clauses {
            implied_clause(&normalized)
        } else {
            None
        };
        let Some(cid) = cdb.new_constraint(asg, normalized, false) else {
            return Ok(None);
        };
        let mut targets = vec![cid];
        if let Some(clause) = implied_clause {
            if let Some(ci) = cdb.new_constraint(asg, clause, true) {
                targets.push(ci);
            }
        }
        let mut consistent = true;
        let mut implied = Vec::new();
        for ci in targets.iter() {
            if cdb.check(*ci, asg, &mut implied) == Visit::Conflict {
                consistent = false;
                break;
            }
            for l in implied.drain(..) {
                if asg.assign_at_root_level(l).is_err() {
                    consistent = false;
                }
            }
            if !consistent {
                break;
            }
        }
        if consistent && asg.propagate(cdb).is_some() {
            consistent = false;
        }
        if !consistent {
            // the caller gets no handle, so it can't stay.
            for ci in targets {
                cdb.remove_constraint(ci);
            }
            state.ok = false;
            return Err(SolverError::Contradiction(ContradictionKind::RootConflict));
        }
        Ok(Some(cid))
    }
}

/// return the clause over the largest coefficients of a general PB constraint,
/// such that the others can't reach the degree without one of them.
fn implied_clause(n: &Normalized) -> Option<Normalized> {
    let Normalized::Pb {
        lits,
        coefs,
        degree,
    } = n
    else {
        return None;
    };
    // coefficients are sorted in descending order.
    let mut rest: BigUint = coefs.iter().sum();
    let mut clause = Vec::new();
    for (l, c) in lits.iter().zip(coefs.iter()) {
        if rest < *degree {
            break;
        }
        rest -= c;
        clause.push(*l);
    }
    if clause.len() < 2 || clause.len() == lits.len() {
        return None;
    }
    clause.sort_unstable();
    Some(Normalized::Clause(clause))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{cdb::property::Tusize, solver::SolveIF},
    };

    fn solver(n: usize) -> Solver {
        Solver::instantiate(&Config::default(), &ProblemDescription::with_vars(n))
    }

    #[test]
    fn test_add_var() {
        let mut s = solver(2);
        assert!(matches!(s.add_clause([3]), Err(SolverError::OutOfRange)));
        assert_eq!(s.add_var(), 3);
        assert!(s.add_clause([3]).is_ok());
        assert_eq!(s.asg.assigned(Lit::from(3i32)), Some(true));
        assert_eq!(s.num_vars(), 3);
    }

    #[test]
    fn test_mismatched_lengths() {
        let mut s = solver(2);
        assert!(matches!(
            s.add_pseudo_boolean(&[1, 2], &[BigInt::one()], true, &BigInt::one()),
            Err(SolverError::IllegalState(_))
        ));
        assert!(s.state.ok);
    }

    #[test]
    fn test_root_propagation_on_addition() {
        let mut s = solver(4);
        assert!(s.add_at_least(&[1, 2, 3, 4], 3).unwrap().is_some());
        assert!(s.add_clause([-1]).is_ok());
        for v in 2..=4 {
            assert_eq!(s.asg.root_value(Lit::from(v)), Some(true));
        }
        assert!(matches!(
            s.add_clause([-2]),
            Err(SolverError::Contradiction(ContradictionKind::Unsatisfiable))
        ));
        assert!(!s.state.ok);
        assert!(matches!(s.add_clause([1, 2]), Err(SolverError::Contradiction(_))));
        assert_eq!(s.is_satisfiable(&[]), Ok(false));
    }

    #[test]
    fn test_implied_clause() {
        let config = Config {
            implied_clauses: true,
            ..Config::default()
        };
        let mut s = Solver::instantiate(&config, &ProblemDescription::with_vars(4));
        // 3x1 + 3x2 + x3 + x4 >= 5: one of x1 and x2 is needed.
        let coefs = [3, 3, 1, 1].map(BigInt::from);
        assert!(s
            .add_pseudo_boolean(&[1, 2, 3, 4], &coefs, true, &BigInt::from(5))
            .unwrap()
            .is_some());
        assert_eq!(s.cdb.derefer(Tusize::NumOriginal), 1);
        assert_eq!(s.cdb.derefer(Tusize::NumLearnt), 1);
        let clause = s.cdb.iter().last().unwrap();
        assert_eq!(clause.lits(), &[Lit::from(1i32), Lit::from(2i32)]);
    }

    #[test]
    fn test_remove_original_constraint() {
        let mut s = solver(3);
        let c1 = s.add_clause([1, 2]).unwrap().unwrap();
        let c2 = s.add_clause([-1, 3]).unwrap().unwrap();
        let c3 = s.add_clause([-2]).unwrap().unwrap();
        assert_eq!(s.asg.root_value(Lit::from(3i32)), Some(true));
        assert!(s.remove_constraint(c3));
        assert!(!s.remove_constraint(c3));
        for v in 1..=3 {
            assert_eq!(s.asg.assigned(Lit::from(v)), None);
        }
        assert!(s.cdb.is_alive(c1) && s.cdb.is_alive(c2));
        assert_eq!(s.is_satisfiable(&[-1]), Ok(true));
        assert_eq!(s.model_value(2), Some(true));
        assert_eq!(s.num_constraints(), 2);
    }

    #[test]
    fn test_remove_a_root_fact() {
        // x1 + x2 >= 1 is stored as it is, though ¬x2 held when it was added.
        let mut s = solver(2);
        let unit = s.add_clause([-2]).unwrap().unwrap();
        assert!(s.add_clause([1, 2]).unwrap().is_some());
        assert_eq!(s.asg.root_value(Lit::from(1i32)), Some(true));
        assert!(s.remove_constraint(unit));
        assert_eq!(s.is_satisfiable(&[-1]), Ok(true));
        assert_eq!(s.model(), &[-1, 2]);

        // satisfied by the root assignment, but kept for later.
        let mut s = solver(2);
        let unit = s.add_clause([2]).unwrap().unwrap();
        let ones = [1, 1].map(BigInt::from);
        assert!(s
            .add_pseudo_boolean(&[1, 2], &ones, true, &BigInt::one())
            .unwrap()
            .is_some());
        assert_eq!(s.num_constraints(), 2);
        assert!(s.remove_constraint(unit));
        assert_eq!(s.is_satisfiable(&[-1, -2]), Ok(false));
        assert_eq!(s.is_satisfiable(&[-1]), Ok(true));
    }

    #[test]
    fn test_rejected_constraint_is_not_kept() {
        let mut s = solver(3);
        let handles = [[-1, 2], [-1, 3], [-2, -3]]
            .iter()
            .map(|c| s.add_clause(c).unwrap().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(
            s.add_clause([1]),
            Err(SolverError::Contradiction(ContradictionKind::RootConflict))
        );
        assert_eq!(s.num_constraints(), 3);
        assert_eq!(s.is_satisfiable(&[]), Ok(false));
        assert!(s.remove_constraint(handles[2]));
        assert_eq!(s.is_satisfiable(&[1]), Ok(true));
        assert_eq!(s.model(), &[1, 2, 3]);
    }
}
