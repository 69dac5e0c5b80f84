//! A cutting-planes pseudo-Boolean CDCL solver.
//!
//! Constraints are linear inequalities `Σ cᵢ·lᵢ ≥ d` over literals with integer
//! coefficients. They are normalized on addition, stored as units, clauses,
//! cardinality or general PB constraints, and learned by cutting-planes
//! conflict analysis.
//!
//! # Examples
//!
//! ```
//! use cplane::*;
//! use num_bigint::BigInt;
//!
//! // the pigeonhole problem of 3 pigeons and 2 holes
//! let mut s = Solver::instantiate(&Config::default(), &ProblemDescription::with_vars(6));
//! for p in 0..3 {
//!     s.add_at_least(&[2 * p + 1, 2 * p + 2], 1).unwrap();
//! }
//! for h in 1..=2 {
//!     s.add_at_most(&[h, h + 2, h + 4], 1).unwrap();
//! }
//! assert_eq!(s.solve(), Ok(Certificate::UNSAT));
//!
//! let mut s = Solver::instantiate(&Config::default(), &ProblemDescription::with_vars(3));
//! let coefs = [3, 2, 1].map(BigInt::from);
//! s.add_pseudo_boolean(&[1, 2, 3], &coefs, true, &BigInt::from(4)).unwrap();
//! assert_eq!(s.is_satisfiable(&[-1]), Ok(false));
//! assert_eq!(s.is_satisfiable(&[-2]), Ok(true));
//! assert_eq!(s.model(), &[1, -2, 3]);
//! ```

/// Module `assign` implements Boolean Constraint Propagation and decision var selection.
pub mod assign;
/// Module `cdb` provides [`ConstraintDB`](`crate::cdb::ConstraintDB`).
pub mod cdb;
/// Module `config` provides solver's configuration.
pub mod config;
/// Module `primitive` provides the Luby series.
pub mod primitive;
/// Module `solver` provides the top-level API as a PB solver.
pub mod solver;
/// Module `state` is a collection of internal data.
pub mod state;
/// Module `types` provides various building blocks, including some common traits.
pub mod types;

pub use {
    config::{AnalysisMode, Config, LearnedPolicy, RestartPolicy, SimplificationPolicy},
    solver::{Certificate, SolveIF, Solver, SolverBuildIF, SolverResult},
    types::{
        ConstraintId, ContradictionKind, Instantiate, ObjectiveFunction, ProblemDescription,
        PropertyDereference, SolverError,
    },
};
