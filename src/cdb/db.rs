use {
    super::{
        constraint::Body, watch::WatchDBIF, Constraint, ConstraintDB, ConstraintDBIF, ConstraintId,
        Normalized, PbConstraint, Visit, Watch,
    },
    crate::{assign::AssignIF, types::*},
    num_bigint::{BigInt, BigUint},
    std::{cmp::Reverse, slice::Iter},
};

impl ConstraintDBIF for ConstraintDB {
    fn len(&self) -> usize {
        self.constraint.len()
    }
    fn is_empty(&self) -> bool {
        self.constraint.len() <= 1
    }
    fn iter(&self) -> Iter<'_, Constraint> {
        self.constraint.iter()
    }
    fn is_alive(&self, cid: ConstraintId) -> bool {
        self.constraint
            .get(usize::from(cid))
            .map_or(false, |c| !c.is_dead())
    }
    fn new_constraint<A>(&mut self, asg: &A, n: Normalized, learnt: bool) -> Option<ConstraintId>
    where
        A: AssignIF,
    {
        let body = match n {
            Normalized::Trivial => return None,
            Normalized::Unit(l) => Body::Unit(l),
            Normalized::Clause(mut lits) => {
                sort_for_watch(asg, &mut lits);
                if lits.len() == 2 {
                    Body::Binary([lits[0], lits[1]])
                } else {
                    Body::Clause(lits)
                }
            }
            Normalized::Cardinality { mut lits, degree } => {
                sort_for_watch(asg, &mut lits);
                Body::Cardinality { lits, degree }
            }
            Normalized::Pb {
                lits,
                coefs,
                degree,
            } => {
                let sum: BigUint = coefs.iter().sum();
                if sum.bits() < 63 {
                    PbConstraint::<u64>::new(lits, &coefs, &degree).map(Body::Pb)?
                } else {
                    PbConstraint::<BigUint>::new(lits, &coefs, &degree).map(Body::BigPb)?
                }
            }
        };
        let cid = ConstraintId::from(self.constraint.len());
        let mut c = Constraint::new(body, learnt);
        match &mut c.body {
            Body::Unit(_) => (),
            Body::Binary([l0, l1]) => {
                self.watcher[*l0].register(*l1, cid);
                self.watcher[*l1].register(*l0, cid);
            }
            Body::Clause(lits) => {
                self.watcher[lits[0]].register(lits[1], cid);
                self.watcher[lits[1]].register(lits[0], cid);
            }
            Body::Cardinality { lits, degree } => {
                for l in lits.iter().take(*degree + 1) {
                    self.watcher[*l].register(NULL_LIT, cid);
                }
            }
            Body::Pb(pb) => {
                for l in pb.attach(asg) {
                    self.watcher[l].register(NULL_LIT, cid);
                }
            }
            Body::BigPb(pb) => {
                for l in pb.attach(asg) {
                    self.watcher[l].register(NULL_LIT, cid);
                }
            }
        }
        #[cfg(feature = "boundary_check")]
        {
            let mut vars = c.lits().iter().map(|l| l.vi()).collect::<Vec<_>>();
            vars.sort_unstable();
            vars.dedup();
            assert_eq!(vars.len(), c.len(), "a var occurs twice in {c}");
        }
        if learnt {
            self.num_learnt += 1;
        } else {
            self.num_original += 1;
        }
        self.constraint.push(c);
        Some(cid)
    }
    fn check<A>(&self, cid: ConstraintId, asg: &A, implied: &mut Vec<Lit>) -> Visit
    where
        A: AssignIF,
    {
        let c = &self[cid];
        if c.is_dead() {
            return Visit::Keep;
        }
        c.check(asg, implied)
    }
    fn take_watches(&mut self, l: Lit) -> Vec<Watch> {
        std::mem::take(&mut self.watcher[l])
    }
    fn restore_watches(&mut self, l: Lit, mut watches: Vec<Watch>) {
        let list = &mut self.watcher[l];
        if !list.is_empty() {
            watches.append(list);
        }
        *list = watches;
    }
    fn visit<A>(
        &mut self,
        cid: ConstraintId,
        false_lit: Lit,
        asg: &A,
        implied: &mut Vec<Lit>,
    ) -> Visit
    where
        A: AssignIF,
    {
        if self[cid].is_dead() {
            return Visit::Moved;
        }
        let mut newly = std::mem::take(&mut self.newly);
        let c = &mut self.constraint[usize::from(cid)];
        let result = match &mut c.body {
            Body::Unit(_) => Visit::Moved,
            Body::Binary(lits) => {
                let other = if lits[0] == false_lit { lits[1] } else { lits[0] };
                match asg.assigned(other) {
                    Some(true) => Visit::Keep,
                    Some(false) => Visit::Conflict,
                    None => {
                        implied.push(other);
                        Visit::Keep
                    }
                }
            }
            Body::Clause(lits) => visit_clause(lits, false_lit, asg, implied, &mut newly),
            Body::Cardinality { lits, degree } => {
                visit_cardinality(lits, *degree, false_lit, asg, implied, &mut newly)
            }
            Body::Pb(pb) => pb.visit(false_lit, asg, implied, &mut newly),
            Body::BigPb(pb) => pb.visit(false_lit, asg, implied, &mut newly),
        };
        let blocker = match &c.body {
            Body::Clause(lits) => lits[0],
            _ => NULL_LIT,
        };
        for l in newly.drain(..) {
            self.watcher[l].register(blocker, cid);
        }
        self.newly = newly;
        result
    }
    fn terms(&self, cid: ConstraintId) -> (Vec<(Lit, BigUint)>, BigUint) {
        let c = &self[cid];
        (c.terms(), c.degree())
    }
    fn reason_lits<A>(&self, cid: ConstraintId, p: Lit, asg: &A) -> Vec<Lit>
    where
        A: AssignIF,
    {
        self[cid]
            .lits()
            .iter()
            .filter(|l| **l != p && asg.assigned(**l) == Some(false))
            .copied()
            .collect::<Vec<_>>()
    }
    fn slack<A>(&self, cid: ConstraintId, asg: &A) -> BigInt
    where
        A: AssignIF,
    {
        self[cid].slack(asg)
    }
    fn remove_constraint(&mut self, cid: ConstraintId) {
        if !self.is_alive(cid) {
            return;
        }
        for l in self[cid].watched_lits() {
            self.watcher[l].detach_with(cid);
        }
        self.kill(cid);
    }
    fn kill(&mut self, cid: ConstraintId) {
        let c = &mut self[cid];
        if c.is_dead() {
            return;
        }
        c.turn_on(FlagConstraint::DEAD);
        let learnt = c.is_learnt();
        // watch lists may still refer to it; keep the shape, drop the storage.
        c.body = Body::Clause(Vec::new());
        if learnt {
            self.num_learnt -= 1;
        } else {
            self.num_original -= 1;
        }
    }
    fn is_locked<A>(&self, cid: ConstraintId, asg: &A) -> bool
    where
        A: AssignIF,
    {
        self[cid]
            .lits()
            .iter()
            .any(|l| asg.reason(l.vi()) == AssignReason::Implication(cid))
    }
    fn rewatch<A>(&mut self, asg: &A) -> usize
    where
        A: AssignIF,
    {
        debug_assert_eq!(asg.decision_level(), 0);
        let mut num_rewatched = 0;
        for i in 1..self.constraint.len() {
            let cid = ConstraintId::from(i);
            let c = &self.constraint[i];
            let overwatched = match &c.body {
                _ if c.is_dead() => false,
                Body::Pb(pb) => pb.is_overwatched(asg),
                Body::BigPb(pb) => pb.is_overwatched(asg),
                _ => false,
            };
            if !overwatched {
                continue;
            }
            for l in c.watched_lits() {
                self.watcher[l].detach_with(cid);
            }
            let watches = match &mut self.constraint[i].body {
                Body::Pb(pb) => pb.attach(asg),
                Body::BigPb(pb) => pb.attach(asg),
                _ => continue,
            };
            for l in watches {
                self.watcher[l].register(NULL_LIT, cid);
            }
            num_rewatched += 1;
        }
        num_rewatched
    }
    fn validate(&self, model: &[Option<bool>]) -> Option<ConstraintId> {
        self.constraint
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, c)| !c.is_dead() && !c.is_satisfied_under(model))
            .map(|(i, _)| ConstraintId::from(i))
    }
}

/// move non-false literals to the front, then false ones by their levels in descending order.
fn sort_for_watch<A>(asg: &A, lits: &mut [Lit])
where
    A: AssignIF,
{
    lits.sort_by_key(|l| {
        if asg.is_non_false(*l) {
            (false, Reverse(0))
        } else {
            (true, Reverse(asg.level(l.vi())))
        }
    });
}

/// update the watches of a clause, of which the first two literals are watched.
fn visit_clause<A>(
    lits: &mut [Lit],
    false_lit: Lit,
    asg: &A,
    implied: &mut Vec<Lit>,
    newly: &mut Vec<Lit>,
) -> Visit
where
    A: AssignIF,
{
    if lits[0] == false_lit {
        lits.swap(0, 1);
    }
    if lits[1] != false_lit {
        return Visit::Moved;
    }
    let other = asg.assigned(lits[0]);
    if other == Some(true) {
        return Visit::Keep;
    }
    if let Some(k) = (2..lits.len()).find(|k| asg.is_non_false(lits[*k])) {
        lits.swap(1, k);
        newly.push(lits[1]);
        return Visit::Moved;
    }
    if other == Some(false) {
        return Visit::Conflict;
    }
    implied.push(lits[0]);
    Visit::Keep
}

/// update the watches of an 'at least `degree`' constraint, of which the first
/// `degree + 1` literals are watched.
fn visit_cardinality<A>(
    lits: &mut [Lit],
    degree: usize,
    false_lit: Lit,
    asg: &A,
    implied: &mut Vec<Lit>,
    newly: &mut Vec<Lit>,
) -> Visit
where
    A: AssignIF,
{
    let w = (degree + 1).min(lits.len());
    let Some(i) = lits[..w].iter().position(|l| *l == false_lit) else {
        return Visit::Moved;
    };
    if let Some(j) = (w..lits.len()).find(|j| asg.is_non_false(lits[*j])) {
        lits.swap(i, j);
        newly.push(lits[i]);
        return Visit::Moved;
    }
    // all the unwatched literals are false.
    let num_non_false = lits[..w].iter().filter(|l| asg.is_non_false(**l)).count();
    if num_non_false < degree {
        return Visit::Conflict;
    }
    if num_non_false == degree {
        implied.extend(lits[..w].iter().filter(|l| asg.assigned(**l).is_none()));
    }
    Visit::Keep
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::assign::{AssignStack, PropagateIF},
    };

    fn lit(i: i32) -> Lit {
        Lit::from(i)
    }

    fn lits(v: &[i32]) -> Vec<Lit> {
        v.iter().map(|i| lit(*i)).collect()
    }

    #[test]
    fn test_learnt_watch_order() {
        let config = Config::default();
        let desc = ProblemDescription::with_vars(4);
        let mut asg = AssignStack::instantiate(&config, &desc);
        let mut cdb = ConstraintDB::instantiate(&config, &desc);
        asg.assign_by_decision(lit(-1));
        asg.assign_by_decision(lit(-2));
        asg.assign_by_decision(lit(-3));
        asg.cancel_until(2);
        // a learnt clause asserting x3 at level 2
        let cid = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[1, 2, 3])), true)
            .unwrap();
        assert_eq!(cdb[cid].lits(), &lits(&[3, 2, 1])[..]);
        assert!(cdb[cid].is_learnt());
        let mut implied = Vec::new();
        assert_eq!(cdb.check(cid, &asg, &mut implied), Visit::Keep);
        assert_eq!(implied, vec![lit(3)]);
        assert!(cdb.watcher[lit(3)].iter().any(|w| w.cid == cid && w.blocker == lit(2)));
        assert!(cdb.watcher[lit(2)].iter().any(|w| w.cid == cid && w.blocker == lit(3)));
        assert_eq!(cdb.reason_lits(cid, lit(3), &asg), lits(&[2, 1]));
    }

    #[test]
    fn test_binary_and_unit() {
        let config = Config::default();
        let desc = ProblemDescription::with_vars(2);
        let mut asg = AssignStack::instantiate(&config, &desc);
        let mut cdb = ConstraintDB::instantiate(&config, &desc);
        let unit = cdb
            .new_constraint(&asg, Normalized::Unit(lit(2)), false)
            .unwrap();
        assert_eq!(cdb[unit].kind(), ConstraintKind::Unit);
        assert!(cdb.watcher.iter().all(|ws| ws.is_empty()));
        let bin = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[-1, -2])), false)
            .unwrap();
        assert_eq!(cdb[bin].kind(), ConstraintKind::Binary);
        assert_eq!(cdb.new_constraint(&asg, Normalized::Trivial, false), None);
        asg.assign_by_decision(lit(1));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.assigned(lit(2)), Some(false));
        let mut implied = Vec::new();
        assert_eq!(cdb.check(unit, &asg, &mut implied), Visit::Conflict);
    }

    #[test]
    fn test_lazy_kill() {
        let config = Config::default();
        let desc = ProblemDescription::with_vars(3);
        let mut asg = AssignStack::instantiate(&config, &desc);
        let mut cdb = ConstraintDB::instantiate(&config, &desc);
        let cid = cdb
            .new_constraint(&asg, Normalized::Clause(lits(&[1, 2, 3])), true)
            .unwrap();
        cdb.kill(cid);
        assert!(!cdb.is_alive(cid));
        assert_eq!(cdb.watcher[lit(1)].len(), 1);
        asg.assign_by_decision(lit(-1));
        assert_eq!(asg.propagate(&mut cdb), None);
        // the dead watch was dropped by the visit.
        assert!(cdb.watcher[lit(1)].is_empty());
        assert_eq!(asg.assigned(lit(2)), None);
    }

    #[test]
    fn test_rewatch_at_root() {
        let config = Config::default();
        let desc = ProblemDescription::with_vars(5);
        let mut asg = AssignStack::instantiate(&config, &desc);
        let mut cdb = ConstraintDB::instantiate(&config, &desc);
        // 5x1 + 3x2 + 2x3 + x4 + x5 >= 6
        let pb = Normalized::Pb {
            lits: lits(&[1, 2, 3, 4, 5]),
            coefs: [5u32, 3, 2, 1, 1].iter().map(|c| BigUint::from(*c)).collect(),
            degree: BigUint::from(6u32),
        };
        let cid = cdb.new_constraint(&asg, pb, false).unwrap();
        let watching = |cdb: &ConstraintDB, l: i32| cdb.watcher[lit(l)].iter().any(|w| w.cid == cid);
        assert!(!watching(&cdb, 5));
        asg.assign_by_decision(lit(-2));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.assigned(lit(1)), Some(true));
        assert!(watching(&cdb, 5));
        asg.cancel_until(0);
        assert_eq!(cdb.rewatch(&asg), 1);
        assert!(!watching(&cdb, 5));
        assert_eq!(cdb.watcher[lit(1)].len(), 1);
        assert_eq!(cdb.rewatch(&asg), 0);
        asg.assign_by_decision(lit(-2));
        assert_eq!(asg.propagate(&mut cdb), None);
        assert_eq!(asg.assigned(lit(1)), Some(true));
    }
}

