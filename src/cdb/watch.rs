use {super::ConstraintId, crate::types::*};

/// 'Watch literal' structure
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Watch {
    /// a literal of a clause; a true blocker means the clause is satisfied.
    /// `NULL_LIT` for constraints which a single true literal can't satisfy.
    pub blocker: Lit,
    /// ConstraintId
    pub cid: ConstraintId,
}

impl Default for Watch {
    fn default() -> Watch {
        Watch {
            blocker: NULL_LIT,
            cid: ConstraintId::default(),
        }
    }
}

/// The outcome of visiting a constraint whose watched literal became false.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visit {
    /// the constraint keeps watching the literal; implied literals may follow.
    Keep,
    /// the constraint stopped watching the literal.
    Moved,
    /// the constraint is falsified.
    Conflict,
}

/// API for 'watcher list' like `register`, `detach_with` and so on.
pub trait WatchDBIF {
    /// make a new 'watch', and add it to this watcher list.
    fn register(&mut self, blocker: Lit, cid: ConstraintId);
    /// remove a constraint which id is `cid` from the watcher list. *O(n)* operation.
    fn detach_with(&mut self, cid: ConstraintId);
}

impl WatchDBIF for Vec<Watch> {
    fn register(&mut self, blocker: Lit, cid: ConstraintId) {
        self.push(Watch { blocker, cid });
    }
    fn detach_with(&mut self, cid: ConstraintId) {
        self.delete_unstable(|w| w.cid == cid);
    }
}
