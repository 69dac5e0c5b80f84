/// Module `solver` provides the top-level API as a PB solver.
/// API to instantiate
mod build;
/// Module 'conflict' handles conflicts.
mod conflict;
/// Module 'cutting' implements cutting-planes arithmetic.
pub mod cutting;
/// Module `restart` provides restart schedules.
pub mod restart;
/// CDCL search engine
mod search;

pub use self::{
    build::SolverBuildIF,
    cutting::WorkingConstraint,
    restart::{RestartIF, Restarter},
    search::SolveIF,
};

use crate::{assign::AssignStack, cdb::ConstraintDB, state::*, types::*};

/// Normal results returned by Solver.
#[derive(Debug, Eq, PartialEq)]
pub enum Certificate {
    /// It is satisfiable; `vec` is such an assignment sorted by var order.
    SAT(Vec<i32>),
    /// It is unsatisfiable.
    UNSAT,
}

/// The return type of `Solver::solve`.
/// This captures the following three cases:
/// * `Certificate::SAT` -- solved with a satisfiable assignment set,
/// * `Certificate::UNSAT` -- proved that it's an unsatisfiable problem, and
/// * `SolverError::*` -- caused by a time out or a bug
pub type SolverResult = Result<Certificate, SolverError>;

/// define sub-modules' responsibilities
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolverEvent {
    /// asserting a var.
    Assert(VarId),
    /// conflict by propagation.
    Conflict,
    /// increment the number of vars.
    NewVar,
    /// re-initialization after removing an original constraint.
    Reinitialize,
    /// restart
    Restart,
}

/// The PB solver object consisting of 4 sub modules and an optional objective.
/// ```
/// use cplane::*;
///
/// let mut s = Solver::instantiate(&Config::default(), &ProblemDescription::with_vars(3));
/// s.add_at_most(&[1, 2, 3], 1).unwrap();
/// s.add_clause([1]).unwrap();
/// assert_eq!(s.solve(), Ok(Certificate::SAT(vec![1, -2, -3])));
/// ```
#[derive(Clone, Debug)]
pub struct Solver {
    /// assignment management
    pub asg: AssignStack,
    /// constraint container
    pub cdb: ConstraintDB,
    /// restart management
    pub rst: Restarter,
    /// misc data holder
    pub state: State,
    /// the working constraint of conflict analysis
    cut: WorkingConstraint,
    /// the cost function registered by an external optimizer
    objective: Option<ObjectiveFunction>,
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::instantiate(&Config::default(), &ProblemDescription::default())
    }
}

impl Instantiate for Solver {
    /// ```
    /// use cplane::*;
    ///
    /// let s = Solver::instantiate(&Config::default(), &ProblemDescription::with_vars(4));
    /// assert_eq!(s.num_vars(), 4);
    /// assert_eq!(s.num_constraints(), 0);
    /// ```
    fn instantiate(config: &Config, desc: &ProblemDescription) -> Solver {
        Solver {
            asg: AssignStack::instantiate(config, desc),
            cdb: ConstraintDB::instantiate(config, desc),
            rst: Restarter::instantiate(config, desc),
            state: State::instantiate(config, desc),
            cut: WorkingConstraint::instantiate(config, desc),
            objective: None,
        }
    }
}

/// Build a solver from a list of DIMACS clauses.
/// A constraint set found unsatisfiable at construction is returned as `Err(Ok(Certificate::UNSAT))`.
///
/// # Example
///
/// ```
/// use cplane::*;
///
/// let v: Vec<Vec<i32>> = vec![vec![1, 2], vec![-1, 2], vec![1, -2]];
/// let mut s = Solver::try_from((Config::default(), v.as_ref())).unwrap();
/// assert_eq!(s.solve(), Ok(Certificate::SAT(vec![1, 2])));
/// assert!(matches!(
///     Solver::try_from((Config::default(), vec![vec![0_i32]].as_ref())),
///     Err(Err(SolverError::OutOfRange))
/// ));
/// ```
impl<V: AsRef<[i32]>> TryFrom<(Config, &[V])> for Solver {
    type Error = SolverResult;
    fn try_from((config, vec): (Config, &[V])) -> Result<Self, Self::Error> {
        let desc = ProblemDescription::from(vec);
        let mut s = Solver::instantiate(&config, &desc);
        for lits in vec.iter() {
            match s.add_clause(lits) {
                Ok(_) => (),
                Err(SolverError::Contradiction(_)) => return Err(Ok(Certificate::UNSAT)),
                Err(e) => return Err(Err(e)),
            }
        }
        Ok(s)
    }
}

/// Example
///```
/// use cplane::*;
///
/// let v: Vec<Vec<i32>> = vec![];
/// assert!(matches!(
///     Certificate::try_from(v),
///     Ok(Certificate::SAT(_))
/// ));
/// assert_eq!(
///     Certificate::try_from(vec![vec![1], vec![-1]]),
///     Ok(Certificate::UNSAT)
/// );
/// assert!(matches!(
///     Certificate::try_from(vec![vec![0_i32]]),
///     Err(SolverError::OutOfRange)
/// ));
///```
impl<V: AsRef<[i32]>> TryFrom<Vec<V>> for Certificate {
    type Error = SolverError;
    fn try_from(vec: Vec<V>) -> SolverResult {
        Solver::try_from((Config::default(), vec.as_ref())).map_or_else(
            |e: SolverResult| e,
            |mut solver| solver.solve(),
        )
    }
}
