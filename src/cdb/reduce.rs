/// Learned constraint management: rewarding, reduction and root level cleanup
use {
    super::{ConstraintDB, ConstraintDBIF, ConstraintId},
    crate::{assign::AssignIF, config::LearnedPolicy, types::*},
    num_bigint::BigUint,
};

/// the decay rate of constraint activities
const ACTIVITY_DECAY: f64 = 0.999;
/// the threshold to rescale constraint activities
const ACTIVITY_SCALE: f64 = 1e20;

/// API for learned constraint management like
/// [`reduce`](`crate::cdb::ReductionIF::reduce`),
/// [`root_cleanup`](`crate::cdb::ReductionIF::root_cleanup`), and so on.
pub trait ReductionIF {
    /// return `true` if the number of conflicts passed the next reduction point.
    fn should_reduce(&self, num_conflict: usize) -> bool;
    /// delete the less active half of the unlocked learned constraints,
    /// and return the number of deleted ones. Binary clauses are kept.
    fn reduce<A>(&mut self, asg: &A, num_conflict: usize) -> usize
    where
        A: AssignIF;
    /// delete the learned constraints satisfied by root level assignments.
    ///
    /// # CAVEAT
    /// *precondition*: decision level == 0.
    fn root_cleanup<A>(&mut self, asg: &A) -> usize
    where
        A: AssignIF;
    /// reward a constraint just learned.
    fn on_constraint_learned(&mut self, cid: ConstraintId);
    /// reward a learned constraint used in conflict analysis.
    fn on_conflict_analysis(&mut self, cid: ConstraintId);
    /// register the vars of the objective function for `LearnedPolicy::ObjectiveDriven`.
    fn set_objective_vars(&mut self, vars: &[VarId]);
    /// delete all the learned constraints.
    fn remove_learnts(&mut self) -> usize;
}

impl ActivityIF<ConstraintId> for ConstraintDB {
    fn activity(&self, cid: ConstraintId) -> f64 {
        self[cid].activity
    }
    fn set_activity(&mut self, cid: ConstraintId, val: f64) {
        self[cid].activity = val;
    }
    fn reward_at_analysis(&mut self, cid: ConstraintId) {
        let weight = match self.learned_policy {
            LearnedPolicy::Activity => 1.0,
            LearnedPolicy::ObjectiveDriven => {
                let c = &self[cid];
                if c.lits().iter().all(|l| self.objective_vars.contains(&l.vi())) {
                    1.0
                } else {
                    c.len() as f64
                }
            }
        };
        let inc = weight * self.activity_inc;
        let c = &mut self[cid];
        c.activity += inc;
        if ACTIVITY_SCALE < c.activity {
            for c in self.constraint.iter_mut().skip(1) {
                c.activity /= ACTIVITY_SCALE;
            }
            self.activity_inc /= ACTIVITY_SCALE;
        }
    }
    fn update_activity_tick(&mut self) {
        self.activity_inc /= ACTIVITY_DECAY;
    }
}

impl ReductionIF for ConstraintDB {
    fn should_reduce(&self, num_conflict: usize) -> bool {
        !self.without_reduce && self.next_reduction <= num_conflict
    }
    fn reduce<A>(&mut self, asg: &A, num_conflict: usize) -> usize
    where
        A: AssignIF,
    {
        let mut candidates: Vec<(f64, ConstraintId)> = Vec::new();
        for (i, c) in self.constraint.iter().enumerate().skip(1) {
            if c.is_dead()
                || !c.is_learnt()
                || matches!(c.kind(), ConstraintKind::Unit | ConstraintKind::Binary)
            {
                continue;
            }
            let cid = ConstraintId::from(i);
            if !self.is_locked(cid, asg) {
                candidates.push((c.activity, cid));
            }
        }
        candidates.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let num_delete = candidates.len() / 2;
        for (_, cid) in candidates.iter().take(num_delete) {
            self.kill(*cid);
        }
        for c in self.constraint.iter_mut().skip(1) {
            if c.is_learnt() && !c.is_dead() {
                c.activity *= 0.5;
            }
        }
        self.num_reduction += 1;
        self.num_deleted += num_delete;
        self.next_reduction = num_conflict + self.reduce_step as usize;
        self.reduce_step *= self.reduce_inc;
        log::debug!(
            "reduction #{}: deleted {num_delete} of {} candidates, next at {}",
            self.num_reduction,
            candidates.len(),
            self.next_reduction,
        );
        num_delete
    }
    fn root_cleanup<A>(&mut self, asg: &A) -> usize
    where
        A: AssignIF,
    {
        debug_assert_eq!(asg.decision_level(), 0);
        let mut targets: Vec<ConstraintId> = Vec::new();
        for (i, c) in self.constraint.iter().enumerate().skip(1) {
            if c.is_dead() || !c.is_learnt() {
                continue;
            }
            let satisfied: BigUint = c
                .terms()
                .into_iter()
                .filter(|(l, _)| asg.root_value(*l) == Some(true))
                .map(|(_, coef)| coef)
                .sum();
            if c.degree() <= satisfied {
                targets.push(ConstraintId::from(i));
            }
        }
        for cid in targets.iter() {
            self.kill(*cid);
        }
        self.num_deleted += targets.len();
        if !targets.is_empty() {
            log::debug!("root cleanup: deleted {} learned constraints", targets.len());
        }
        targets.len()
    }
    fn on_constraint_learned(&mut self, cid: ConstraintId) {
        self.reward_at_analysis(cid);
    }
    fn on_conflict_analysis(&mut self, cid: ConstraintId) {
        if self[cid].is_learnt() {
            self.reward_at_analysis(cid);
        }
    }
    fn set_objective_vars(&mut self, vars: &[VarId]) {
        self.objective_vars = vars.iter().copied().collect();
    }
    fn remove_learnts(&mut self) -> usize {
        let targets = self
            .constraint
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, c)| c.is_learnt() && !c.is_dead())
            .map(|(i, _)| ConstraintId::from(i))
            .collect::<Vec<_>>();
        for cid in targets.iter() {
            self.remove_constraint(*cid);
        }
        targets.len()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            assign::{AssignStack, PropagateIF},
            cdb::{Normalized, Tusize},
        },
    };

    fn lits(v: &[i32]) -> Vec<Lit> {
        v.iter().map(|i| Lit::from(*i)).collect()
    }

    fn setup(n: usize, config: &Config) -> (AssignStack, ConstraintDB) {
        let desc = ProblemDescription::with_vars(n);
        (
            AssignStack::instantiate(config, &desc),
            ConstraintDB::instantiate(config, &desc),
        )
    }

    #[test]
    fn test_reduce_keeps_active_half() {
        let config = Config {
            first_reduction: 10,
            ..Config::default()
        };
        let (asg, mut cdb) = setup(6, &config);
        assert!(!cdb.should_reduce(9));
        assert!(cdb.should_reduce(10));
        let c1 = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[1, 2, 3])), true)
            .unwrap();
        let c2 = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[2, 3, 4])), true)
            .unwrap();
        let c3 = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[3, 4, 5])), true)
            .unwrap();
        let c4 = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[4, 5, 6])), true)
            .unwrap();
        let bin = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[5, 6])), true)
            .unwrap();
        cdb.set_activity(c1, 4.0);
        cdb.set_activity(c2, 1.0);
        cdb.set_activity(c3, 3.0);
        cdb.set_activity(c4, 2.0);
        assert_eq!(cdb.reduce(&asg, 10), 2);
        assert!(cdb.is_alive(c1) && cdb.is_alive(c3) && cdb.is_alive(bin));
        assert!(!cdb.is_alive(c2) && !cdb.is_alive(c4));
        assert_eq!(cdb.activity(c1), 2.0);
        assert_eq!(cdb.derefer(Tusize::NumLearnt), 3);
        assert_eq!(cdb.derefer(Tusize::NumDeleted), 2);
        // 10 + 10, then the step grows.
        assert!(!cdb.should_reduce(19));
        assert!(cdb.should_reduce(20));
    }

    #[test]
    fn test_locked_constraint_survives() {
        let config = Config::default();
        let (mut asg, mut cdb) = setup(3, &config);
        let c1 = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[1, 2, 3])), true)
            .unwrap();
        let c2 = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[-1, -2, 3])), true)
            .unwrap();
        cdb.set_activity(c1, 0.0);
        cdb.set_activity(c2, 1.0);
        asg.assign_by_decision(Lit::from(-1i32));
        asg.assign_by_decision(Lit::from(-2i32));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.reason(3), AssignReason::Implication(c1));
        assert_eq!(cdb.reduce(&asg, 0), 0);
        assert!(cdb.is_alive(c1));
    }

    #[test]
    fn test_root_cleanup() {
        let config = Config::default();
        let (mut asg, mut cdb) = setup(4, &config);
        let c1 = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[1, 2, 3])), true)
            .unwrap();
        let c2 = cdb
            .new_constraint(
                &asg,
                Normalized::Cardinality {
                    lits: lits(&[1, 2, 4]),
                    degree: 2,
                },
                true,
            )
            .unwrap();
        let orig = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[1, 3, 4])), false)
            .unwrap();
        asg.assign_at_root_level(Lit::from(1i32)).unwrap();
        assert_eq!(cdb.root_cleanup(&asg), 1);
        assert!(!cdb.is_alive(c1));
        assert!(cdb.is_alive(c2));
        assert!(cdb.is_alive(orig));
        assert_eq!(cdb.remove_learnts(), 1);
        assert!(!cdb.is_alive(c2));
        assert_eq!(cdb.derefer(Tusize::NumLearnt), 0);
    }

    #[test]
    fn test_objective_driven_reward() {
        let config = Config {
            learned_policy: LearnedPolicy::ObjectiveDriven,
            ..Config::default()
        };
        let (asg, mut cdb) = setup(4, &config);
        cdb.set_objective_vars(&[1, 2]);
        let inside = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[1, -2])), true)
            .unwrap();
        let outside = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[1, 3, 4])), true)
            .unwrap();
        cdb.on_constraint_learned(inside);
        cdb.on_constraint_learned(outside);
        assert_eq!(cdb.activity(inside), 1.0);
        assert_eq!(cdb.activity(outside), 3.0);
        cdb.update_activity_tick();
        cdb.on_conflict_analysis(inside);
        assert!(2.0 < cdb.activity(inside));
    }
}
