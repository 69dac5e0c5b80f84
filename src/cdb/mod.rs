/// methods on `ConstraintId`
mod cid;
/// methods on `Constraint`
mod constraint;
/// methods on `ConstraintDB`
mod db;
/// constraint normalization
mod normalize;
/// learned constraint management
mod reduce;
/// methods on `Watch` and `WatchDB`
mod watch;
/// numeric back-ends of PB constraints
mod weight;

pub use self::{
    constraint::Constraint,
    normalize::{normalize, normalize_as_given, Normalized},
    property::*,
    reduce::ReductionIF,
    watch::{Visit, Watch},
    weight::{PbConstraint, Weight},
};

use {
    self::constraint::Body,
    crate::{assign::AssignIF, config::LearnedPolicy, types::*},
    ahash::AHashSet,
    num_bigint::{BigInt, BigUint},
    std::{
        num::NonZeroU32,
        ops::{Index, IndexMut},
        slice::Iter,
    },
};

/// API for constraint management like
/// [`new_constraint`](`crate::cdb::ConstraintDBIF::new_constraint`),
/// [`visit`](`crate::cdb::ConstraintDBIF::visit`),
/// [`reason_lits`](`crate::cdb::ConstraintDBIF::reason_lits`), and so on.
pub trait ConstraintDBIF:
    IndexMut<ConstraintId, Output = Constraint>
    + Instantiate
    + PropertyDereference<property::Tusize, usize>
{
    /// return the number of slots including dead constraints.
    fn len(&self) -> usize;
    /// return `true` if no constraint was registered.
    fn is_empty(&self) -> bool;
    /// return an iterator over all slots.
    fn iter(&self) -> Iter<'_, Constraint>;
    /// return `true` if `cid` refers to a registered, not deleted constraint.
    fn is_alive(&self, cid: ConstraintId) -> bool;
    /// register a normalized constraint, attach its watches, and return its id.
    /// `Normalized::Trivial` makes no constraint.
    /// Learned literals are reordered so that the watches fall on the latest falsified ones.
    fn new_constraint<A>(&mut self, asg: &A, n: Normalized, learnt: bool) -> Option<ConstraintId>
    where
        A: AssignIF;
    /// collect the literals implied by `cid` under the current assignment,
    /// or return `Visit::Conflict` if it is falsified.
    fn check<A>(&self, cid: ConstraintId, asg: &A, implied: &mut Vec<Lit>) -> Visit
    where
        A: AssignIF;
    /// take out the watcher list of a literal which became false.
    fn take_watches(&mut self, l: Lit) -> Vec<Watch>;
    /// put back a watcher list taken by `take_watches`.
    fn restore_watches(&mut self, l: Lit, watches: Vec<Watch>);
    /// update the watches of `cid` after `false_lit` became false.
    fn visit<A>(
        &mut self,
        cid: ConstraintId,
        false_lit: Lit,
        asg: &A,
        implied: &mut Vec<Lit>,
    ) -> Visit
    where
        A: AssignIF;
    /// return the literals of `cid` with their coefficients and its degree.
    fn terms(&self, cid: ConstraintId) -> (Vec<(Lit, BigUint)>, BigUint);
    /// return the literals of the reason of `p` which are false under the current assignment.
    fn reason_lits<A>(&self, cid: ConstraintId, p: Lit, asg: &A) -> Vec<Lit>
    where
        A: AssignIF;
    /// return the coefficient sum of non-false literals minus the degree.
    fn slack<A>(&self, cid: ConstraintId, asg: &A) -> BigInt
    where
        A: AssignIF;
    /// unregister the watches of `cid` now, and make it dead.
    fn remove_constraint(&mut self, cid: ConstraintId);
    /// make `cid` dead; its watches are dropped when they are visited.
    fn kill(&mut self, cid: ConstraintId);
    /// return `true` if `cid` is the reason of an assignment.
    fn is_locked<A>(&self, cid: ConstraintId, asg: &A) -> bool
    where
        A: AssignIF;
    /// reduce the watches of general PB constraints which watch every literal.
    /// Call it at the root level. Return the number of such constraints.
    fn rewatch<A>(&mut self, asg: &A) -> usize
    where
        A: AssignIF;
    /// return `None` if the given assignment satisfies all the alive constraints.
    /// Otherwise return a falsified one.
    fn validate(&self, model: &[Option<bool>]) -> Option<ConstraintId>;
}

/// Constraint identifier, or constraint index, starting with one.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConstraintId {
    /// a sequence number.
    ordinal: NonZeroU32,
}

/// The closed set of constraint representations.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConstraintKind {
    Unit,
    Binary,
    Clause,
    Cardinality,
    Pb,
}

/// Constraint database
///
///```
/// use cplane::{config::Config, types::*};
/// use cplane::cdb::ConstraintDB;
/// let cdb = ConstraintDB::instantiate(&Config::default(), &ProblemDescription::default());
///```
#[derive(Clone, Debug)]
pub struct ConstraintDB {
    /// container of constraints; the first slot is a dummy.
    constraint: Vec<Constraint>,
    /// container of watch literals, indexed by the literal to be falsified
    watcher: Vec<Vec<Watch>>,
    /// a working buffer for newly watched literals
    newly: Vec<Lit>,

    //
    //## learned constraint rewarding
    //
    activity_inc: f64,
    learned_policy: LearnedPolicy,
    objective_vars: AHashSet<VarId>,

    //
    //## reduction
    //
    first_reduction: usize,
    next_reduction: usize,
    reduce_step: f64,
    reduce_inc: f64,
    without_reduce: bool,

    //
    //## statistics
    //
    /// the number of alive original constraints.
    num_original: usize,
    /// the number of alive learned constraints.
    num_learnt: usize,
    /// the number of reductions.
    num_reduction: usize,
    /// the number of deleted learned constraints.
    num_deleted: usize,
}

impl Default for ConstraintDB {
    fn default() -> ConstraintDB {
        let mut dummy = Constraint::new(Body::Clause(Vec::new()), false);
        dummy.flags.insert(FlagConstraint::DEAD);
        ConstraintDB {
            constraint: vec![dummy],
            watcher: vec![Vec::new(); 2],
            newly: Vec::new(),
            activity_inc: 1.0,
            learned_policy: LearnedPolicy::Activity,
            objective_vars: AHashSet::new(),
            first_reduction: 2000,
            next_reduction: 2000,
            reduce_step: 2000.0,
            reduce_inc: 1.1,
            without_reduce: false,
            num_original: 0,
            num_learnt: 0,
            num_reduction: 0,
            num_deleted: 0,
        }
    }
}

impl Index<ConstraintId> for ConstraintDB {
    type Output = Constraint;
    #[inline]
    fn index(&self, cid: ConstraintId) -> &Constraint {
        &self.constraint[usize::from(cid)]
    }
}

impl IndexMut<ConstraintId> for ConstraintDB {
    #[inline]
    fn index_mut(&mut self, cid: ConstraintId) -> &mut Constraint {
        &mut self.constraint[usize::from(cid)]
    }
}

impl Instantiate for ConstraintDB {
    fn instantiate(config: &Config, desc: &ProblemDescription) -> ConstraintDB {
        let nv = desc.num_of_variables;
        ConstraintDB {
            watcher: vec![Vec::new(); 2 * (nv + 1)],
            learned_policy: config.learned_policy,
            first_reduction: config.first_reduction,
            next_reduction: config.first_reduction,
            reduce_step: config.first_reduction as f64,
            reduce_inc: config.reduce_inc,
            without_reduce: config.without_reduce,
            ..ConstraintDB::default()
        }
    }
    fn handle(&mut self, e: SolverEvent) {
        match e {
            SolverEvent::NewVar => {
                self.watcher.push(Vec::new());
                self.watcher.push(Vec::new());
            }
            SolverEvent::Reinitialize => {
                self.next_reduction = self.first_reduction;
                self.reduce_step = self.first_reduction as f64;
            }
            SolverEvent::Assert(_) | SolverEvent::Conflict | SolverEvent::Restart => (),
        }
    }
}

pub mod property {
    use super::ConstraintDB;
    use crate::types::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    pub enum Tusize {
        NumOriginal,
        NumLearnt,
        NumReduction,
        NumDeleted,
    }

    pub const USIZES: [Tusize; 4] = [
        Tusize::NumOriginal,
        Tusize::NumLearnt,
        Tusize::NumReduction,
        Tusize::NumDeleted,
    ];

    impl PropertyDereference<Tusize, usize> for ConstraintDB {
        #[inline]
        fn derefer(&self, k: Tusize) -> usize {
            match k {
                Tusize::NumOriginal => self.num_original,
                Tusize::NumLearnt => self.num_learnt,
                Tusize::NumReduction => self.num_reduction,
                Tusize::NumDeleted => self.num_deleted,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assign::{AssignStack, PropagateIF},
        config::SimplificationPolicy,
    };

    fn lit(i: i32) -> Lit {
        Lit::from(i)
    }

    fn setup(n: usize) -> (AssignStack, ConstraintDB) {
        let config = Config::default();
        let desc = ProblemDescription::with_vars(n);
        (
            AssignStack::instantiate(&config, &desc),
            ConstraintDB::instantiate(&config, &desc),
        )
    }

    fn add(asg: &AssignStack, cdb: &mut ConstraintDB, lits: &[i32], coefs: &[i64], d: i64) -> ConstraintId {
        let lits = lits.iter().map(|i| lit(*i)).collect::<Vec<_>>();
        let coefs = coefs.iter().map(|c| BigInt::from(*c)).collect::<Vec<_>>();
        let n = normalize(
            asg,
            &lits,
            &coefs,
            true,
            &BigInt::from(d),
            SimplificationPolicy::ForCompetition,
        )
        .unwrap();
        cdb.new_constraint(asg, n, false).unwrap()
    }

    #[test]
    fn test_constraint_instantiation() {
        let (asg, mut cdb) = setup(4);
        let c1 = add(&asg, &mut cdb, &[1, 2, 3], &[1, 1, 1], 1);
        let c2 = add(&asg, &mut cdb, &[-1, 4], &[1, 1], 1);
        let c3 = add(&asg, &mut cdb, &[1, 2, 3, 4], &[3, 2, 2, 1], 4);
        assert_eq!(cdb[c1].kind(), ConstraintKind::Clause);
        assert_eq!(cdb[c2].kind(), ConstraintKind::Binary);
        assert_eq!(cdb[c3].kind(), ConstraintKind::Pb);
        assert!(!cdb[c1].is_learnt() && !cdb[c1].is_dead());
        assert_eq!(cdb.derefer(Tusize::NumOriginal), 3);
        assert_eq!(cdb.len(), 4);
        assert!(cdb.is_alive(c2));
        assert!(!cdb.is_alive(ConstraintId::default()));
    }

    #[test]
    fn test_clause_propagation() {
        let (mut asg, mut cdb) = setup(4);
        add(&asg, &mut cdb, &[1, 2, 3], &[1, 1, 1], 1);
        asg.assign_by_decision(lit(-1));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.assigned(lit(3)), None);
        asg.assign_by_decision(lit(-3));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.assigned(lit(2)), Some(true));
        asg.cancel_until(0);
        asg.assign_by_decision(lit(-2));
        asg.assign_by_decision(lit(-3));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.assigned(lit(1)), Some(true));
    }

    #[test]
    fn test_cardinality_propagation() {
        let (mut asg, mut cdb) = setup(5);
        let cid = add(&asg, &mut cdb, &[1, 2, 3, 4, 5], &[1, 1, 1, 1, 1], 3);
        assert_eq!(cdb[cid].kind(), ConstraintKind::Cardinality);
        asg.assign_by_decision(lit(-1));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert!((2..=5).all(|v| asg.assign(v).is_none()));
        asg.assign_by_decision(lit(-5));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.assigned(lit(2)), Some(true));
        assert_eq!(asg.assigned(lit(3)), Some(true));
        assert_eq!(asg.assigned(lit(4)), Some(true));
        assert_eq!(asg.reason(2), AssignReason::Implication(cid));
        let mut reason = cdb.reason_lits(cid, lit(2), &asg);
        reason.sort();
        assert_eq!(reason, vec![lit(1), lit(5)]);
        assert!(cdb.is_locked(cid, &asg));
        asg.cancel_until(0);
        assert!(!cdb.is_locked(cid, &asg));
    }

    #[test]
    fn test_pb_conflict() {
        let (mut asg, mut cdb) = setup(4);
        // 3x1 + 2x2 + 2x3 + x4 >= 5
        let cid = add(&asg, &mut cdb, &[1, 2, 3, 4], &[3, 2, 2, 1], 5);
        asg.assign_by_decision(lit(-2));
        assert_eq!(asg.propagate(&mut cdb), None);
        // 3 + 2 + 1 - 5 = 1: x1 and x3 are implied
        assert_eq!(asg.assigned(lit(1)), Some(true));
        assert_eq!(asg.assigned(lit(3)), Some(true));
        assert_eq!(cdb.slack(cid, &asg), BigInt::from(1));
        asg.cancel_until(0);
        asg.assign_by_decision(lit(-4));
        asg.assign_by_decision(lit(-3));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.assigned(lit(1)), Some(true));
        assert_eq!(asg.assigned(lit(2)), Some(true));
        asg.cancel_until(0);
        asg.assign_by_decision(lit(-1));
        asg.assign_by_decision(lit(-2));
        assert_eq!(asg.propagate(&mut cdb), Some(cid));
    }

    #[test]
    fn test_removal_and_validation() {
        let (asg, mut cdb) = setup(3);
        let c1 = add(&asg, &mut cdb, &[1, 2], &[1, 1], 1);
        let c2 = add(&asg, &mut cdb, &[-1, 3], &[1, 1], 1);
        let model = [None, Some(false), Some(false), Some(false)];
        assert_eq!(cdb.validate(&model), Some(c1));
        cdb.remove_constraint(c1);
        assert!(!cdb.is_alive(c1));
        assert_eq!(cdb.validate(&model), None);
        assert!(cdb.watcher.iter().all(|ws| ws.iter().all(|w| w.cid != c1)));
        assert_eq!(cdb.derefer(Tusize::NumOriginal), 1);
        assert!(cdb.is_alive(c2));
    }
}
