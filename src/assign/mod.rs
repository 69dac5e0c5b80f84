// Module `assign` implements Boolean Constraint Propagation and decision var selection.

/// var activity (VSIDS)
mod activity;
/// heap of decision vars
mod heap;
/// Boolean constraint propagation
mod propagate;
/// decision var selection
mod select;
/// assignment management
mod stack;

pub use self::{propagate::PropagateIF, select::VarSelectIF, stack::AssignStack};

use {crate::types::*, std::fmt};

/// API about assignment like
/// [`decision_level`](`crate::assign::AssignIF::decision_level`),
/// [`stack`](`crate::assign::AssignIF::stack`),
/// [`assigned`](`crate::assign::AssignIF::assigned`) and so on.
pub trait AssignIF {
    /// return the value of a literal.
    fn assigned(&self, l: Lit) -> Option<bool>;
    /// return the value of a var.
    fn assign(&self, vi: VarId) -> Option<bool>;
    /// return the assigned level of a var.
    fn level(&self, vi: VarId) -> DecisionLevel;
    /// return the reason of the assignment of a var.
    fn reason(&self, vi: VarId) -> AssignReason;
    /// return the current decision level.
    fn decision_level(&self) -> DecisionLevel;
    /// return the `i`-th element in the stack.
    fn stack(&self, i: usize) -> Lit;
    /// return the number of assigned vars.
    fn stack_len(&self) -> usize;
    /// return the length of the stack up to the decision level `lv`.
    fn len_upto(&self, lv: DecisionLevel) -> usize;
    /// return an iterator over the assignment stack.
    fn stack_iter(&self) -> std::slice::Iter<'_, Lit>;
    /// return `true` if there are un-propagated assignments.
    fn remains(&self) -> bool;
    /// return the number of vars.
    fn num_vars(&self) -> usize;
    /// return the value of a literal if it was assigned at the root level.
    fn root_value(&self, l: Lit) -> Option<bool> {
        self.assigned(l).filter(|_| self.level(l.vi()) == 0)
    }
    /// return `true` if the literal is unassigned or true.
    fn is_non_false(&self, l: Lit) -> bool {
        self.assigned(l) != Some(false)
    }
}

/// Reasons of assignments
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum AssignReason {
    /// Assigned at the root level and detached from any constraint.
    Asserted,
    /// Assigned by decision
    Decision(DecisionLevel),
    /// Assigned by propagation of a constraint.
    Implication(ConstraintId),
    /// None of the above.
    None,
}

impl fmt::Display for AssignReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssignReason::Asserted => write!(f, "Asserted"),
            AssignReason::Decision(lvl) => write!(f, "Decided at level {lvl}"),
            AssignReason::Implication(cid) => write!(f, "Implied by {cid}"),
            AssignReason::None => write!(f, "Not assigned"),
        }
    }
}
