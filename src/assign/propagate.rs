/// implement boolean constraint propagation, backjump
use {
    super::{heap::VarHeapIF, AssignIF, AssignStack},
    crate::{
        cdb::{ConstraintDBIF, Visit},
        types::*,
    },
};

/// API for Boolean Constraint Propagation like
/// [`propagate`](`crate::assign::PropagateIF::propagate`),
/// [`assign_by_decision`](`crate::assign::PropagateIF::assign_by_decision`),
/// [`cancel_until`](`crate::assign::PropagateIF::cancel_until`), and so on.
pub trait PropagateIF {
    /// add an assignment at root level as a precondition.
    ///
    /// # Errors
    ///
    /// emit `SolverError::Contradiction` if the literal is already falsified.
    fn assign_at_root_level(&mut self, l: Lit) -> MaybeInconsistent;
    /// unsafe enqueue (assign by implication) at the current level; doesn't emit an exception.
    ///
    /// ## Warning
    /// Callers must assure the consistency after this assignment.
    fn assign_by_implication(&mut self, l: Lit, reason: AssignReason);
    /// unsafe assume (assign by decision); doesn't emit an exception.
    /// ## Caveat
    /// Callers have to assure the consistency after this assignment.
    fn assign_by_decision(&mut self, l: Lit);
    /// execute *backjump*.
    fn cancel_until(&mut self, lv: DecisionLevel);
    /// revert the last assignment; a decision level closes with its first literal.
    fn undo_one(&mut self) -> Option<Lit>;
    /// revert all the assignments including those at the root level.
    fn reset_trail(&mut self);
    /// execute *boolean constraint propagation* or *unit propagation*.
    /// Return the conflicting constraint if any.
    fn propagate<C>(&mut self, cdb: &mut C) -> Option<ConstraintId>
    where
        C: ConstraintDBIF;
}

macro_rules! set_assign {
    ($asg: expr, $lit: expr) => {
        match $lit {
            l => {
                let vi = l.vi();
                $asg.assign[vi] = Some(bool::from(l));
            }
        }
    };
}

impl PropagateIF for AssignStack {
    fn assign_at_root_level(&mut self, l: Lit) -> MaybeInconsistent {
        self.cancel_until(0);
        let vi = l.vi();
        debug_assert!(vi < self.assign.len());
        match self.assign[vi] {
            None => {
                set_assign!(self, l);
                self.level[vi] = 0;
                debug_assert!(!self.trail.contains(&!l));
                self.trail.push(l);
                self.make_var_asserted(vi);
                Ok(())
            }
            Some(x) if x == bool::from(l) => Ok(()),
            _ => Err(SolverError::Contradiction(ContradictionKind::RootConflict)),
        }
    }
    fn assign_by_implication(&mut self, l: Lit, reason: AssignReason) {
        debug_assert!(usize::from(l) != 0, "Null literal is about to be enqueued");
        let vi = l.vi();
        debug_assert!(self.assign[vi].is_none());
        let lv = self.decision_level();
        set_assign!(self, l);
        self.level[vi] = lv;
        self.reason[vi] = reason;
        debug_assert!(!self.trail.contains(&!l));
        self.trail.push(l);
        if lv == 0 {
            self.make_var_asserted(vi);
        }
    }
    fn assign_by_decision(&mut self, l: Lit) {
        debug_assert!(self.assign[l.vi()].is_none());
        debug_assert!(
            !self.trail.contains(&!l),
            "asg.trail contains a strange literal",
        );
        self.level_up();
        let dl = self.decision_level();
        let vi = l.vi();
        self.level[vi] = dl;
        set_assign!(self, l);
        self.reason[vi] = AssignReason::Decision(dl);
        self.trail.push(l);
        self.num_decision += 1;
        debug_assert!(self.q_head < self.trail.len());
    }
    fn cancel_until(&mut self, lv: DecisionLevel) {
        if self.trail_lim.len() as DecisionLevel <= lv {
            return;
        }
        let lim = self.trail_lim[lv as usize];
        for i in lim..self.trail.len() {
            let vi = self.trail[i].vi();
            self.unassign(vi);
        }
        self.trail.truncate(lim);
        self.trail_lim.truncate(lv as usize);
        self.q_head = self.q_head.min(lim);
    }
    fn undo_one(&mut self) -> Option<Lit> {
        let l = self.trail.pop()?;
        self.unassign(l.vi());
        while self.trail_lim.last() == Some(&self.trail.len()) {
            self.trail_lim.pop();
        }
        self.q_head = self.q_head.min(self.trail.len());
        Some(l)
    }
    fn reset_trail(&mut self) {
        for i in 0..self.trail.len() {
            let vi = self.trail[i].vi();
            self.unassign(vi);
        }
        self.trail.clear();
        self.trail_lim.clear();
        self.q_head = 0;
        self.num_asserted_vars = 0;
    }
    fn propagate<C>(&mut self, cdb: &mut C) -> Option<ConstraintId>
    where
        C: ConstraintDBIF,
    {
        let mut implied: Vec<Lit> = Vec::new();
        while let Some(&p) = self.trail.get(self.q_head) {
            self.q_head += 1;
            self.num_propagation += 1;
            let false_lit = !p;
            let mut watches = cdb.take_watches(false_lit);
            let mut conflict = None;
            let mut n = 0;
            while n < watches.len() {
                let w = watches[n];
                if self.assigned(w.blocker) == Some(true) {
                    n += 1;
                    continue;
                }
                match cdb.visit(w.cid, false_lit, &*self, &mut implied) {
                    Visit::Keep => {
                        n += 1;
                        for l in implied.drain(..) {
                            self.assign_by_implication(l, AssignReason::Implication(w.cid));
                        }
                    }
                    Visit::Moved => {
                        watches.swap_remove(n);
                    }
                    Visit::Conflict => {
                        implied.clear();
                        conflict = Some(w.cid);
                        break;
                    }
                }
            }
            cdb.restore_watches(false_lit, watches);
            if conflict.is_some() {
                return conflict;
            }
        }
        None
    }
}

impl AssignStack {
    fn unassign(&mut self, vi: VarId) {
        if let Some(b) = self.assign[vi] {
            self.flags[vi].set(FlagVar::PHASE, b);
        }
        self.assign[vi] = None;
        self.reason[vi] = AssignReason::None;
        self.insert_heap(vi);
    }
}
