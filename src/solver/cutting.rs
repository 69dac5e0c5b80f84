//! Cutting-planes arithmetic on a working constraint
use {
    crate::{assign::AssignIF, solver::SolverEvent, types::*},
    num_bigint::{BigInt, BigUint},
    num_integer::Integer,
    num_traits::{CheckedSub, One, Zero},
};

/// A linear constraint `Σ cᵢ·lᵢ ≥ d` under construction in conflict analysis.
/// Each var occurs in at most one literal.
#[derive(Clone, Debug)]
pub struct WorkingConstraint {
    /// the polarity of each var; meaningful while the coefficient is positive
    lit: Vec<Lit>,
    coef: Vec<BigUint>,
    /// vars which have ever occurred since the last `load`
    vars: Vec<VarId>,
    present: Vec<bool>,
    degree: BigUint,
}

impl Instantiate for WorkingConstraint {
    fn instantiate(_config: &Config, desc: &ProblemDescription) -> Self {
        WorkingConstraint::new(desc.num_of_variables)
    }
    fn handle(&mut self, e: SolverEvent) {
        if let SolverEvent::NewVar = e {
            self.lit.push(NULL_LIT);
            self.coef.push(BigUint::zero());
            self.present.push(false);
        }
    }
}

impl WorkingConstraint {
    pub fn new(num_vars: usize) -> Self {
        WorkingConstraint {
            lit: vec![NULL_LIT; num_vars + 1],
            coef: vec![BigUint::zero(); num_vars + 1],
            vars: Vec::new(),
            present: vec![false; num_vars + 1],
            degree: BigUint::zero(),
        }
    }
    /// replace the content with `Σ terms ≥ degree`.
    pub fn load(&mut self, terms: &[(Lit, BigUint)], degree: &BigUint) {
        for vi in self.vars.drain(..) {
            self.coef[vi] = BigUint::zero();
            self.present[vi] = false;
        }
        self.degree = degree.clone();
        for (l, c) in terms.iter() {
            self.add_term(*l, c.clone());
        }
    }
    pub fn degree(&self) -> &BigUint {
        &self.degree
    }
    /// return the coefficient of a literal if it occurs.
    pub fn coef(&self, l: Lit) -> Option<&BigUint> {
        let vi = l.vi();
        (!self.coef[vi].is_zero() && self.lit[vi] == l).then(|| &self.coef[vi])
    }
    /// return `true` if no literal has a positive coefficient.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
    pub fn iter(&self) -> impl Iterator<Item = (Lit, &BigUint)> + '_ {
        self.vars
            .iter()
            .filter(|vi| !self.coef[**vi].is_zero())
            .map(|vi| (self.lit[*vi], &self.coef[*vi]))
    }
    /// return the vars which occurred in the analysis.
    pub fn touched(&self) -> &[VarId] {
        &self.vars
    }
    /// return the bit length of the largest number.
    pub fn max_bits(&self) -> u64 {
        self.iter()
            .map(|(_, c)| c.bits())
            .max()
            .unwrap_or(0)
            .max(self.degree.bits())
    }
    /// add `c·l`; a complementary pair `a·l + b·¬l` turns into `(a - b)·l + min(a, b)`.
    fn add_term(&mut self, l: Lit, c: BigUint) {
        if c.is_zero() {
            return;
        }
        let vi = l.vi();
        if !self.present[vi] {
            self.present[vi] = true;
            self.vars.push(vi);
        }
        if self.coef[vi].is_zero() {
            self.lit[vi] = l;
            self.coef[vi] = c;
        } else if self.lit[vi] == l {
            self.coef[vi] += c;
        } else if c < self.coef[vi] {
            self.coef[vi] -= &c;
            self.sub_degree(&c);
        } else {
            let common = std::mem::take(&mut self.coef[vi]);
            self.sub_degree(&common);
            self.lit[vi] = l;
            self.coef[vi] = c - common;
        }
    }
    fn sub_degree(&mut self, c: &BigUint) {
        if *c < self.degree {
            self.degree -= c;
        } else {
            self.degree = BigUint::zero();
        }
    }
    /// clamp every coefficient to the degree.
    pub fn saturate(&mut self) {
        for vi in self.vars.iter() {
            if self.degree < self.coef[*vi] {
                self.coef[*vi] = self.degree.clone();
            }
        }
    }
    /// return the coefficient sum of literals which aren't false at level `lv` minus the degree.
    pub fn slack_at<A>(&self, asg: &A, lv: DecisionLevel) -> BigInt
    where
        A: AssignIF,
    {
        let sum: BigUint = self
            .iter()
            .filter(|(l, _)| !is_false_at(asg, *l, lv))
            .map(|(_, c)| c)
            .sum();
        BigInt::from(sum) - BigInt::from(self.degree.clone())
    }
    /// return `true` if it is satisfiable at the previous decision level and
    /// propagates a literal falsified at the current one.
    pub fn is_assertive<A>(&self, asg: &A) -> bool
    where
        A: AssignIF,
    {
        let dl = asg.decision_level();
        if dl == 0 {
            return false;
        }
        let slack = self.slack_at(asg, dl - 1);
        if slack.sign() == num_bigint::Sign::Minus {
            return false;
        }
        self.iter().any(|(l, c)| {
            asg.assigned(l) == Some(false)
                && asg.level(l.vi()) == dl
                && slack < BigInt::from(c.clone())
        })
    }
    /// return the lowest level at which it propagates a literal.
    pub fn backtrack_level<A>(&self, asg: &A) -> DecisionLevel
    where
        A: AssignIF,
    {
        let dl = asg.decision_level();
        let mut levels = self
            .iter()
            .filter(|(l, _)| asg.assigned(*l).is_some())
            .map(|(l, _)| asg.level(l.vi()))
            .filter(|lv| *lv < dl)
            .collect::<Vec<_>>();
        levels.push(0);
        levels.sort_unstable();
        levels.dedup();
        for lv in levels {
            let slack = self.slack_at(asg, lv);
            if slack.sign() == num_bigint::Sign::Minus {
                continue;
            }
            let propagates = self.iter().any(|(l, c)| {
                (asg.assigned(l).is_none() || lv < asg.level(l.vi()))
                    && slack < BigInt::from(c.clone())
            });
            if propagates {
                return lv;
            }
        }
        dl.saturating_sub(1)
    }
    /// add the reason of `p`, scaled to cancel `¬p` out.
    /// Non-false literals of the reason whose coefficients aren't divisible by
    /// the coefficient of `p` are weakened away first; their vars are returned.
    pub fn resolve<A>(
        &mut self,
        p: Lit,
        reason: &[(Lit, BigUint)],
        degree: &BigUint,
        asg: &A,
    ) -> Vec<VarId>
    where
        A: AssignIF,
    {
        let Some(a) = self.coef(!p).cloned() else {
            return Vec::new();
        };
        let Some(b) = reason.iter().find(|(l, _)| *l == p).map(|(_, c)| c.clone()) else {
            return Vec::new();
        };
        let mut weakened = Vec::new();
        let mut kept = Vec::with_capacity(reason.len());
        let mut reason_degree = BigInt::from(degree.clone());
        for (l, c) in reason.iter() {
            if *l != p && asg.is_non_false(*l) && !(c % &b).is_zero() {
                reason_degree -= BigInt::from(c.clone());
                weakened.push(l.vi());
            } else {
                kept.push((*l, c.div_ceil(&b)));
            }
        }
        let reason_degree = reason_degree.to_biguint().unwrap_or_default().div_ceil(&b);
        self.degree += &a * reason_degree;
        for (l, c) in kept {
            self.add_term(l, &a * c);
        }
        self.saturate();
        weakened
    }
    /// replace it with 'at least `k` of the falsified literals', where `k` is the least
    /// number of the largest falsified coefficients reaching the degree minus the
    /// coefficients of the others.
    pub fn reduce_to_cardinality<A>(&mut self, asg: &A)
    where
        A: AssignIF,
    {
        let (mut falsified, rest) = self.split_falsified(asg);
        let Some(delta) = self.degree.clone().checked_sub(&rest) else {
            return;
        };
        falsified.sort_unstable_by(|a, b| b.1.cmp(&a.1));
        let mut sum = BigUint::zero();
        let mut k = None;
        for (i, (_, c)) in falsified.iter().enumerate() {
            sum += c;
            if delta <= sum {
                k = Some(i + 1);
                break;
            }
        }
        let lits = falsified.into_iter().map(|(l, _)| l).collect::<Vec<_>>();
        match k {
            Some(k) => self.replace_with(&lits, BigUint::from(k)),
            // no assignment can reach the degree.
            None => self.replace_with(&[], BigUint::one()),
        }
    }
    /// replace it with the clause of the falsified literals.
    pub fn reduce_to_clause<A>(&mut self, asg: &A)
    where
        A: AssignIF,
    {
        let (falsified, _) = self.split_falsified(asg);
        let lits = falsified.into_iter().map(|(l, _)| l).collect::<Vec<_>>();
        self.replace_with(&lits, BigUint::one());
    }
    fn split_falsified<A>(&self, asg: &A) -> (Vec<(Lit, BigUint)>, BigUint)
    where
        A: AssignIF,
    {
        let mut falsified = Vec::new();
        let mut rest = BigUint::zero();
        for (l, c) in self.iter() {
            if asg.assigned(l) == Some(false) {
                falsified.push((l, c.clone()));
            } else {
                rest += c;
            }
        }
        (falsified, rest)
    }
    fn replace_with(&mut self, lits: &[Lit], degree: BigUint) {
        for vi in self.vars.iter() {
            self.coef[*vi] = BigUint::zero();
        }
        self.degree = degree;
        for l in lits.iter() {
            self.add_term(*l, BigUint::one());
        }
    }
    /// return the literals, the coefficients and the degree.
    pub fn to_terms(&self) -> (Vec<Lit>, Vec<BigInt>, BigInt) {
        let (lits, coefs) = self
            .iter()
            .map(|(l, c)| (l, BigInt::from(c.clone())))
            .unzip();
        (lits, coefs, BigInt::from(self.degree.clone()))
    }
}

fn is_false_at<A>(asg: &A, l: Lit, lv: DecisionLevel) -> bool
where
    A: AssignIF,
{
    asg.assigned(l) == Some(false) && asg.level(l.vi()) <= lv
}
