use {
    super::{weight::PbConstraint, ConstraintKind, Visit},
    crate::{assign::AssignIF, types::*},
    num_bigint::BigUint,
    num_traits::One,
    std::fmt,
};

/// The body of a constraint.
#[derive(Clone, Debug)]
pub(super) enum Body {
    Unit(Lit),
    Binary([Lit; 2]),
    /// the first two literals are watched.
    Clause(Vec<Lit>),
    /// 'at least `degree` of `lits`'; the first `degree + 1` literals are watched.
    Cardinality { lits: Vec<Lit>, degree: usize },
    Pb(PbConstraint<u64>),
    BigPb(PbConstraint<BigUint>),
}

/// A representation of a unit, a clause, a cardinality or a general PB constraint.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub(super) body: Body,
    /// Flags (8 bits)
    pub(super) flags: FlagConstraint,
    /// the activity used by the learned constraint DB
    pub(super) activity: f64,
}

impl Constraint {
    pub(super) fn new(body: Body, learnt: bool) -> Self {
        let mut flags = FlagConstraint::default();
        flags.set(FlagConstraint::LEARNT, learnt);
        Constraint {
            body,
            flags,
            activity: 0.0,
        }
    }
    /// return the kind of the constraint.
    pub fn kind(&self) -> ConstraintKind {
        match self.body {
            Body::Unit(_) => ConstraintKind::Unit,
            Body::Binary(_) => ConstraintKind::Binary,
            Body::Clause(_) => ConstraintKind::Clause,
            Body::Cardinality { .. } => ConstraintKind::Cardinality,
            Body::Pb(_) | Body::BigPb(_) => ConstraintKind::Pb,
        }
    }
    /// return the literals.
    pub fn lits(&self) -> &[Lit] {
        match &self.body {
            Body::Unit(l) => std::slice::from_ref(l),
            Body::Binary(lits) => lits,
            Body::Clause(lits) => lits,
            Body::Cardinality { lits, .. } => lits,
            Body::Pb(pb) => &pb.lits,
            Body::BigPb(pb) => &pb.lits,
        }
    }
    /// return the number of literals.
    pub fn len(&self) -> usize {
        self.lits().len()
    }
    pub fn is_empty(&self) -> bool {
        self.lits().is_empty()
    }
    pub fn is_learnt(&self) -> bool {
        self.flags.contains(FlagConstraint::LEARNT)
    }
    pub fn is_dead(&self) -> bool {
        self.flags.contains(FlagConstraint::DEAD)
    }
    /// return the degree.
    pub fn degree(&self) -> BigUint {
        match &self.body {
            Body::Cardinality { degree, .. } => BigUint::from(*degree),
            Body::Pb(pb) => BigUint::from(pb.degree),
            Body::BigPb(pb) => pb.degree.clone(),
            _ => BigUint::one(),
        }
    }
    /// return the linear form: literals with their coefficients.
    pub fn terms(&self) -> Vec<(Lit, BigUint)> {
        match &self.body {
            Body::Pb(pb) => pb.iter().map(|(l, c)| (l, BigUint::from(*c))).collect(),
            Body::BigPb(pb) => pb.iter().map(|(l, c)| (l, c.clone())).collect(),
            _ => self.lits().iter().map(|l| (*l, BigUint::one())).collect(),
        }
    }
    /// return the coefficient sum of literals which aren't false minus the degree.
    pub fn slack<A>(&self, asg: &A) -> num_bigint::BigInt
    where
        A: AssignIF,
    {
        let sum: BigUint = self
            .terms()
            .into_iter()
            .filter(|(l, _)| asg.is_non_false(*l))
            .map(|(_, c)| c)
            .sum();
        num_bigint::BigInt::from(sum) - num_bigint::BigInt::from(self.degree())
    }
    /// return `true` if the true literals reach the degree under `assign`,
    /// a vector indexed by `VarId`.
    pub fn is_satisfied_under(&self, assign: &[Option<bool>]) -> bool {
        let value = |l: Lit| assign.get(l.vi()).copied().flatten() == Some(bool::from(l));
        match &self.body {
            Body::Pb(pb) => {
                let mut sum = 0u64;
                for (l, c) in pb.iter() {
                    if value(l) {
                        sum += c;
                    }
                }
                pb.degree <= sum
            }
            Body::BigPb(pb) => {
                let sum: BigUint = pb.iter().filter(|(l, _)| value(*l)).map(|(_, c)| c).sum();
                pb.degree <= sum
            }
            Body::Cardinality { lits, degree } => {
                *degree <= lits.iter().filter(|l| value(**l)).count()
            }
            _ => self.lits().iter().any(|l| value(*l)),
        }
    }
    /// return the literals which are currently watched.
    pub(super) fn watched_lits(&self) -> Vec<Lit> {
        match &self.body {
            Body::Unit(_) => Vec::new(),
            Body::Binary(lits) => lits.to_vec(),
            Body::Clause(lits) => lits[..2.min(lits.len())].to_vec(),
            Body::Cardinality { lits, degree } => lits[..(degree + 1).min(lits.len())].to_vec(),
            Body::Pb(pb) => pb.watched_lits(),
            Body::BigPb(pb) => pb.watched_lits(),
        }
    }
    /// collect the literals implied under the current assignment,
    /// or return `Visit::Conflict` if the constraint is falsified.
    pub(super) fn check<A>(&self, asg: &A, implied: &mut Vec<Lit>) -> Visit
    where
        A: AssignIF,
    {
        let (lits, degree) = match &self.body {
            Body::Pb(pb) => return pb.check(asg, implied),
            Body::BigPb(pb) => return pb.check(asg, implied),
            Body::Cardinality { lits, degree } => (&lits[..], *degree),
            _ => (self.lits(), 1),
        };
        let num_non_false = lits.iter().filter(|l| asg.is_non_false(**l)).count();
        if num_non_false < degree {
            return Visit::Conflict;
        }
        if num_non_false == degree {
            implied.extend(lits.iter().filter(|l| asg.assigned(**l).is_none()));
        }
        Visit::Keep
    }
}

impl FlagIF for Constraint {
    type FlagType = FlagConstraint;
    #[inline]
    fn is(&self, flag: Self::FlagType) -> bool {
        self.flags.contains(flag)
    }
    #[inline]
    fn set(&mut self, f: Self::FlagType, b: bool) {
        self.flags.set(f, b);
    }
    #[inline]
    fn turn_off(&mut self, flag: Self::FlagType) {
        self.flags.remove(flag);
    }
    #[inline]
    fn turn_on(&mut self, flag: Self::FlagType) {
        self.flags.insert(flag);
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let st = |flag, mes| if self.is(flag) { mes } else { "" };
        match &self.body {
            Body::Pb(pb) => write!(f, "{{{pb}}}")?,
            Body::BigPb(pb) => write!(f, "{{{pb}}}")?,
            Body::Cardinality { lits, degree } => {
                write!(f, "{{{:?} >= {degree}}}", i32s(lits))?
            }
            _ => write!(f, "{{{:?}}}", i32s(self.lits()))?,
        }
        write!(
            f,
            "{}{}, act: {:.2}",
            st(FlagConstraint::LEARNT, ", learnt"),
            st(FlagConstraint::DEAD, ", dead"),
            self.activity,
        )
    }
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

    #[test]
    fn test_cardinality_check() {
        let config = Config::default();
        let mut asg = AssignStack::instantiate(&config, &ProblemDescription::with_vars(4));
        let c = Constraint::new(
            Body::Cardinality {
                lits: vec![lit(1), lit(2), lit(3), lit(4)],
                degree: 2,
            },
            false,
        );
        let mut implied = Vec::new();
        assert_eq!(c.check(&asg, &mut implied), Visit::Keep);
        assert!(implied.is_empty());
        asg.assign_by_decision(lit(-1));
        asg.assign_by_decision(lit(-2));
        assert_eq!(c.check(&asg, &mut implied), Visit::Keep);
        assert_eq!(implied, vec![lit(3), lit(4)]);
        asg.assign_by_decision(lit(-3));
        assert_eq!(c.check(&asg, &mut implied), Visit::Conflict);
        assert_eq!(c.kind(), ConstraintKind::Cardinality);
        assert_eq!(c.slack(&asg), num_bigint::BigInt::from(-1));
    }

    #[test]
    fn test_satisfaction() {
        let c = Constraint::new(Body::Binary([lit(1), lit(-2)]), true);
        assert!(c.is_learnt());
        assert!(c.is_satisfied_under(&[None, Some(false), Some(false)]));
        assert!(!c.is_satisfied_under(&[None, Some(false), Some(true)]));
        assert!(!c.is_satisfied_under(&[None, None, None]));
        assert_eq!(c.terms(), vec![(lit(1), BigUint::one()), (lit(-2), BigUint::one())]);
    }
}
