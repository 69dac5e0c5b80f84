/// Numeric back-ends of general PB constraints
use {
    super::Visit,
    crate::{assign::AssignIF, types::*},
    num_bigint::BigUint,
    num_traits::{ToPrimitive, Zero},
    std::{
        fmt,
        ops::{AddAssign, SubAssign},
    },
};

/// API for coefficient arithmetic.
/// `u64` is used when the coefficient sum fits in 63 bits, `BigUint` otherwise.
pub trait Weight:
    Clone
    + fmt::Debug
    + fmt::Display
    + Ord
    + Zero
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
{
    /// convert from an arbitrary precision integer if it fits.
    fn from_big(n: &BigUint) -> Option<Self>;
    /// convert to an arbitrary precision integer.
    fn to_big(&self) -> BigUint;
}

impl Weight for u64 {
    fn from_big(n: &BigUint) -> Option<Self> {
        n.to_u64()
    }
    fn to_big(&self) -> BigUint {
        BigUint::from(*self)
    }
}

impl Weight for BigUint {
    fn from_big(n: &BigUint) -> Option<Self> {
        Some(n.clone())
    }
    fn to_big(&self) -> BigUint {
        self.clone()
    }
}

/// A general PB constraint `Σ cᵢ·lᵢ ≥ d` with literals sorted by coefficient in descending order.
///
/// Watch invariant: either the watched literals which are not false have a coefficient sum
/// of at least `d + max cᵢ`, or every literal is watched.
#[derive(Clone, Debug)]
pub struct PbConstraint<W: Weight> {
    pub(super) lits: Vec<Lit>,
    pub(super) coefs: Vec<W>,
    pub(super) degree: W,
    watched: Vec<bool>,
}

impl<W: Weight> fmt::Display for PbConstraint<W> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, (l, c)) in self.lits.iter().zip(self.coefs.iter()).enumerate() {
            if 0 < i {
                write!(f, " + ")?;
            }
            write!(f, "{c}*{}", i32::from(l))?;
        }
        write!(f, " >= {}", self.degree)
    }
}

impl<W: Weight> PbConstraint<W> {
    /// return `None` if a number doesn't fit in `W`.
    pub fn new(lits: Vec<Lit>, coefs: &[BigUint], degree: &BigUint) -> Option<Self> {
        debug_assert_eq!(lits.len(), coefs.len());
        debug_assert!(coefs.windows(2).all(|w| w[1] <= w[0]));
        let coefs = coefs.iter().map(W::from_big).collect::<Option<Vec<W>>>()?;
        let degree = W::from_big(degree)?;
        let watched = vec![false; lits.len()];
        Some(PbConstraint {
            lits,
            coefs,
            degree,
            watched,
        })
    }
    pub fn len(&self) -> usize {
        self.lits.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (Lit, &W)> + '_ {
        self.lits.iter().copied().zip(self.coefs.iter())
    }
    /// return the literals being watched.
    pub fn watched_lits(&self) -> Vec<Lit> {
        self.lits
            .iter()
            .zip(self.watched.iter())
            .filter_map(|(l, w)| w.then_some(*l))
            .collect::<Vec<_>>()
    }
    fn watch_target(&self) -> W {
        let mut target = self.degree.clone();
        if let Some(c) = self.coefs.first() {
            target += c;
        }
        target
    }
    /// return the coefficient sum of literals which aren't false.
    pub fn non_false_sum<A>(&self, asg: &A) -> W
    where
        A: AssignIF,
    {
        let mut sum = W::zero();
        for (l, c) in self.iter() {
            if asg.is_non_false(l) {
                sum += c;
            }
        }
        sum
    }
    /// choose the initial watches under the current assignment, and return them.
    pub fn attach<A>(&mut self, asg: &A) -> Vec<Lit>
    where
        A: AssignIF,
    {
        self.watched.iter_mut().for_each(|w| *w = false);
        let target = self.watch_target();
        let mut sum = W::zero();
        for i in 0..self.lits.len() {
            if asg.is_non_false(self.lits[i]) {
                self.watched[i] = true;
                sum += &self.coefs[i];
                if target <= sum {
                    return self.watched_lits();
                }
            }
        }
        self.watched.iter_mut().for_each(|w| *w = true);
        self.lits.clone()
    }
    /// return `true` if every literal is watched while fewer would do.
    pub fn is_overwatched<A>(&self, asg: &A) -> bool
    where
        A: AssignIF,
    {
        self.watched.iter().all(|w| *w) && self.watch_target() <= self.non_false_sum(asg)
    }
    /// update watches after `false_lit` became false.
    /// Newly watched literals are appended to `newly`.
    pub fn visit<A>(
        &mut self,
        false_lit: Lit,
        asg: &A,
        implied: &mut Vec<Lit>,
        newly: &mut Vec<Lit>,
    ) -> Visit
    where
        A: AssignIF,
    {
        let Some(i) = self.lits.iter().position(|l| *l == false_lit) else {
            return Visit::Moved;
        };
        if !self.watched[i] {
            return Visit::Moved;
        }
        let target = self.watch_target();
        let mut sum = W::zero();
        for j in 0..self.lits.len() {
            if self.watched[j] && j != i && asg.is_non_false(self.lits[j]) {
                sum += &self.coefs[j];
            }
        }
        for j in 0..self.lits.len() {
            if target <= sum {
                break;
            }
            if !self.watched[j] && asg.is_non_false(self.lits[j]) {
                self.watched[j] = true;
                newly.push(self.lits[j]);
                sum += &self.coefs[j];
            }
        }
        if target <= sum {
            self.watched[i] = false;
            return Visit::Moved;
        }
        // watch everything, then it's safe under any backtracking.
        for j in 0..self.lits.len() {
            if !self.watched[j] {
                self.watched[j] = true;
                newly.push(self.lits[j]);
            }
        }
        self.check(asg, implied)
    }
    /// collect the literals implied under the current assignment,
    /// or return `Visit::Conflict` if the slack is negative.
    pub fn check<A>(&self, asg: &A, implied: &mut Vec<Lit>) -> Visit
    where
        A: AssignIF,
    {
        let mut slack = self.non_false_sum(asg);
        if slack < self.degree {
            return Visit::Conflict;
        }
        slack -= &self.degree;
        for (l, c) in self.iter() {
            if *c <= slack {
                break;
            }
            if asg.assigned(l).is_none() {
                implied.push(l);
            }
        }
        Visit::Keep
    }
}
