//! Normalization of weighted linear constraints over literals.
use {
    crate::{assign::AssignIF, config::SimplificationPolicy, types::*},
    num_bigint::{BigInt, BigUint, Sign},
    num_integer::Integer,
    num_traits::{One, Signed, ToPrimitive, Zero},
    std::collections::BTreeMap,
};

/// The tightest representation of a constraint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Normalized {
    /// satisfied by the root assignment or by any assignment
    Trivial,
    /// a literal to be asserted
    Unit(Lit),
    /// a clause of two or more literals in ascending order
    Clause(Vec<Lit>),
    /// 'at least `degree` of `lits`' with `1 < degree`, literals in ascending order
    Cardinality { lits: Vec<Lit>, degree: usize },
    /// `Σ coefs·lits ≥ degree`, sorted by coefficient (descending) then literal
    Pb {
        lits: Vec<Lit>,
        coefs: Vec<BigUint>,
        degree: BigUint,
    },
}

impl Normalized {
    /// return the kind of the constraint to be stored.
    pub fn kind(&self) -> Option<ConstraintKind> {
        match self {
            Normalized::Trivial => None,
            Normalized::Unit(_) => Some(ConstraintKind::Unit),
            Normalized::Clause(v) if v.len() == 2 => Some(ConstraintKind::Binary),
            Normalized::Clause(_) => Some(ConstraintKind::Clause),
            Normalized::Cardinality { .. } => Some(ConstraintKind::Cardinality),
            Normalized::Pb { .. } => Some(ConstraintKind::Pb),
        }
    }
    /// return the 'at least' form as literals, coefficients and a degree.
    pub fn terms(&self) -> (Vec<Lit>, Vec<BigInt>, BigInt) {
        let ones = |v: &[Lit]| vec![BigInt::one(); v.len()];
        match self {
            Normalized::Trivial => (Vec::new(), Vec::new(), BigInt::zero()),
            Normalized::Unit(l) => (vec![*l], vec![BigInt::one()], BigInt::one()),
            Normalized::Clause(v) => (v.clone(), ones(v), BigInt::one()),
            Normalized::Cardinality { lits, degree } => {
                (lits.clone(), ones(lits), BigInt::from(*degree))
            }
            Normalized::Pb {
                lits,
                coefs,
                degree,
            } => (
                lits.clone(),
                coefs.iter().map(|c| BigInt::from(c.clone())).collect(),
                BigInt::from(degree.clone()),
            ),
        }
    }
}

/// Turn `Σ coefs·lits ≥ degree` (or `≤ degree` if `at_least` is false) into its tightest form.
///
/// Coefficients may be negative; duplicated literals are merged and complementary
/// literals cancel each other. Literals assigned at the root level are eliminated.
///
/// # Errors
///
/// * `SolverError::IllegalState` if the lengths of `lits` and `coefs` differ.
/// * `SolverError::Contradiction(ContradictionKind::Unsatisfiable)` if no assignment can
///   reach the degree.
///
/// # Example
///
/// ```
/// use cplane::{assign::AssignStack, cdb::{normalize, Normalized}, config::*, types::*};
/// use num_bigint::BigInt;
/// let asg = AssignStack::instantiate(&Config::default(), &ProblemDescription::with_vars(3));
/// let lits = [Lit::from(1i32), Lit::from(2i32), Lit::from(3i32)];
/// let coefs = [BigInt::from(4), BigInt::from(4), BigInt::from(4)];
/// assert_eq!(
///     normalize(&asg, &lits, &coefs, true, &BigInt::from(5), SimplificationPolicy::ForCompetition),
///     Ok(Normalized::Cardinality { lits: lits.to_vec(), degree: 2 }),
/// );
/// ```
pub fn normalize<A>(
    asg: &A,
    lits: &[Lit],
    coefs: &[BigInt],
    at_least: bool,
    degree: &BigInt,
    policy: SimplificationPolicy,
) -> Result<Normalized, SolverError>
where
    A: AssignIF,
{
    normalize_by(|l| asg.root_value(l), lits, coefs, at_least, degree, policy)
}

/// Turn a constraint into its tightest form without the root assignment.
///
/// The result holds under any root assignment, so that it can be stored as an
/// original constraint and checked again after the root assignment is rebuilt.
///
/// # Errors
///
/// As [`normalize`].
pub fn normalize_as_given(
    lits: &[Lit],
    coefs: &[BigInt],
    at_least: bool,
    degree: &BigInt,
    policy: SimplificationPolicy,
) -> Result<Normalized, SolverError> {
    normalize_by(|_| None, lits, coefs, at_least, degree, policy)
}

fn normalize_by<F>(
    root_value: F,
    lits: &[Lit],
    coefs: &[BigInt],
    at_least: bool,
    degree: &BigInt,
    policy: SimplificationPolicy,
) -> Result<Normalized, SolverError>
where
    F: Fn(Lit) -> Option<bool>,
{
    if lits.len() != coefs.len() {
        return Err(SolverError::IllegalState(
            "literals and coefficients differ in length",
        ));
    }
    // Keep a signed coefficient on the positive literal of each var:
    // `c·¬x` is `c - c·x`, so the degree absorbs the constant part.
    let mut degree = if at_least { degree.clone() } else { -degree };
    let mut on_var: BTreeMap<VarId, BigInt> = BTreeMap::new();
    for (l, c) in lits.iter().zip(coefs.iter()) {
        let c = if at_least { c.clone() } else { -c };
        let entry = on_var.entry(l.vi()).or_insert_with(BigInt::zero);
        if bool::from(*l) {
            *entry += c;
        } else {
            degree -= &c;
            *entry -= c;
        }
    }
    let mut terms: Vec<(Lit, BigUint)> = Vec::with_capacity(on_var.len());
    for (vi, c) in on_var {
        let (l, c) = match c.sign() {
            Sign::NoSign => continue,
            Sign::Plus => (Lit::from((vi, true)), c),
            Sign::Minus => {
                // -c·x = c·¬x - c
                degree -= &c;
                (Lit::from((vi, false)), -c)
            }
        };
        match root_value(l) {
            Some(true) => degree -= &c,
            Some(false) => (),
            None => terms.push((l, c.magnitude().clone())),
        }
    }
    if !degree.is_positive() {
        return Ok(Normalized::Trivial);
    }
    let Some(mut degree) = degree.to_biguint() else {
        return Ok(Normalized::Trivial);
    };
    let sum: BigUint = terms.iter().map(|(_, c)| c).sum();
    if sum < degree {
        return Err(SolverError::Contradiction(ContradictionKind::Unsatisfiable));
    }
    if policy == SimplificationPolicy::ForCompetition {
        for (_, c) in terms.iter_mut() {
            if degree < *c {
                *c = degree.clone();
            }
        }
        // all coefficients are equal: divide them.
        if terms.windows(2).all(|w| w[0].1 == w[1].1) {
            let c = terms[0].1.clone();
            degree = degree.div_ceil(&c);
            terms.iter_mut().for_each(|t| t.1 = BigUint::one());
        }
    }
    if terms.len() == 1 {
        return Ok(Normalized::Unit(terms[0].0));
    }
    if terms.iter().all(|(_, c)| c.is_one()) {
        let mut lits = terms.into_iter().map(|(l, _)| l).collect::<Vec<_>>();
        lits.sort_unstable();
        if degree.is_one() {
            return Ok(Normalized::Clause(lits));
        }
        if let Some(degree) = degree.to_usize() {
            return Ok(Normalized::Cardinality { lits, degree });
        }
        unreachable!("the degree of a cardinality constraint is bounded by its length");
    }
    terms.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    let (lits, coefs) = terms.into_iter().unzip();
    Ok(Normalized::Pb {
        lits,
        coefs,
        degree,
    })
}
