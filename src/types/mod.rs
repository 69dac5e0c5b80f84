//! Module `types' provides various building blocks, including
//! some common traits.

/// methods on the size of a problem
pub mod description;
/// methods on flags used in vars and constraints
pub mod flags;
/// methods on literals
pub mod lit;
/// methods on the objective function
pub mod objective;

pub use self::{description::*, flags::*, lit::*, objective::*};

pub use crate::{
    assign::AssignReason,
    cdb::{ConstraintId, ConstraintKind},
    config::Config,
    solver::SolverEvent,
};

use thiserror::Error;

/// Var index type; vars are numbered from one.
pub type VarId = usize;

/// Decision Level Representation.
pub type DecisionLevel = u32;

/// API for accessing internal data in a module.
/// For example, `State::stats` needs to access counters defined in other modules,
/// which, however, should be used locally in the defining modules.
/// To avoid to make them public, we define a generic accessor or exporter here.
pub trait PropertyDereference<I, O: Sized> {
    fn derefer(&self, key: I) -> O;
}

/// API for reward based activity management.
pub trait ActivityIF<Ix> {
    /// return one's activity.
    fn activity(&self, ix: Ix) -> f64;
    /// set activity
    fn set_activity(&mut self, ix: Ix, val: f64);
    /// modify one's activity at conflict analysis in `conflict_analyze` in [`solver`](`crate::solver`).
    fn reward_at_analysis(&mut self, ix: Ix);
    /// update internal counter.
    fn update_activity_tick(&mut self);
}

/// API for object instantiation based on `Config` and `ProblemDescription`.
/// This is implemented by *all the modules* except `Config` and `ProblemDescription`.
///
/// # Example
///
/// ```
/// use cplane::{config::Config, types::*};
/// use cplane::{cdb::ConstraintDB, solver::Solver};
/// let _ = ConstraintDB::instantiate(&Config::default(), &ProblemDescription::default());
/// let _ = Solver::instantiate(&Config::default(), &ProblemDescription::default());
///```
pub trait Instantiate {
    /// make and return an object from `Config` and `ProblemDescription`.
    fn instantiate(conf: &Config, desc: &ProblemDescription) -> Self;
    /// update by a solver event.
    fn handle(&mut self, _e: SolverEvent) {}
}

/// API for O(n) deletion from a list, providing `delete_unstable`.
pub trait Delete<T> {
    /// *O(n)* item deletion protocol.
    fn delete_unstable<F>(&mut self, filter: F)
    where
        F: FnMut(&T) -> bool;
}

impl<T> Delete<T> for Vec<T> {
    fn delete_unstable<F>(&mut self, filter: F)
    where
        F: FnMut(&T) -> bool,
    {
        if let Some(i) = self.iter().position(filter) {
            self.swap_remove(i);
        }
    }
}

/// The way a constraint is found to be unsatisfiable at construction time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContradictionKind {
    /// the coefficient sum of the remaining literals can't reach the degree.
    Unsatisfiable,
    /// propagation at the root level falsified a constraint.
    RootConflict,
}

/// Errors raised by the solver.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SolverError {
    /// A constraint is trivially unsatisfiable under the root assignment.
    #[error("contradiction: {0:?}")]
    Contradiction(ContradictionKind),
    /// The deadline or the conflict budget was exhausted.
    #[error("time out")]
    TimeOut,
    /// A literal is out of the range defined by the number of vars.
    /// '0' is an example.
    #[error("a literal is out of range")]
    OutOfRange,
    /// A caller bug like mismatched literal and coefficient lists.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),
    /// A generated model falsifies a constraint.
    #[error("solver bug")]
    SolverBug,
}

/// A Return type used by solver functions.
pub type MaybeInconsistent = Result<(), SolverError>;
