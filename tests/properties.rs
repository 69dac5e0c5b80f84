//! Property-based tests of the normalizer and the whole solver.
//!
//! Every instance is small enough to be checked by enumerating all assignments.
use {
    cplane::{
        assign::AssignStack,
        cdb::{normalize, ConstraintDBIF, Normalized},
        types::{Lit, LitIF},
        *,
    },
    num_bigint::BigInt,
    proptest::prelude::*,
};

const NUM_VARS: usize = 5;

/// a linear constraint in DIMACS form with signed coefficients
#[derive(Clone, Debug)]
struct Linear {
    lits: Vec<i32>,
    coefs: Vec<i64>,
    at_least: bool,
    degree: i64,
}

impl Linear {
    fn holds(&self, bits: u32) -> bool {
        let sum: i64 = self
            .lits
            .iter()
            .zip(self.coefs.iter())
            .filter(|(l, _)| is_true(bits, **l))
            .map(|(_, c)| *c)
            .sum();
        if self.at_least {
            self.degree <= sum
        } else {
            sum <= self.degree
        }
    }
    fn big_coefs(&self) -> Vec<BigInt> {
        self.coefs.iter().map(|c| BigInt::from(*c)).collect()
    }
}

fn is_true(bits: u32, l: i32) -> bool {
    let on = bits & (1 << (l.unsigned_abs() - 1)) != 0;
    on == (0 < l)
}

fn assignments() -> impl Iterator<Item = u32> {
    0..(1 << NUM_VARS)
}

fn brute_force_sat(cs: &[Linear]) -> bool {
    assignments().any(|bits| cs.iter().all(|c| c.holds(bits)))
}

fn model_bits(model: &[i32]) -> u32 {
    model
        .iter()
        .filter(|l| 0 < **l)
        .fold(0u32, |acc, l| acc | (1 << (*l - 1)))
}

fn normalized_holds(n: &Normalized, bits: u32) -> bool {
    let (lits, coefs, degree) = n.terms();
    let sum: BigInt = lits
        .iter()
        .zip(coefs.iter())
        .filter(|(l, _)| is_true(bits, i32::from(**l)))
        .map(|(_, c)| c)
        .sum();
    degree <= sum
}

fn fresh_assign() -> AssignStack {
    AssignStack::instantiate(
        &Config::default(),
        &ProblemDescription::with_vars(NUM_VARS),
    )
}

fn run_normalize(
    asg: &AssignStack,
    c: &Linear,
    policy: SimplificationPolicy,
) -> Result<Normalized, SolverError> {
    let lits = c.lits.iter().map(|l| Lit::from(*l)).collect::<Vec<_>>();
    normalize(
        asg,
        &lits,
        &c.big_coefs(),
        c.at_least,
        &BigInt::from(c.degree),
        policy,
    )
}

fn literal() -> impl Strategy<Value = i32> {
    (1..=NUM_VARS as i32, any::<bool>()).prop_map(|(v, positive)| if positive { v } else { -v })
}

fn linear() -> impl Strategy<Value = Linear> {
    prop::collection::vec((literal(), -3i64..=3), 1..=4)
        .prop_flat_map(|terms| {
            let (lits, coefs): (Vec<i32>, Vec<i64>) = terms.into_iter().unzip();
            (Just(lits), Just(coefs), any::<bool>(), -2i64..=6)
        })
        .prop_map(|(lits, coefs, at_least, degree)| Linear {
            lits,
            coefs,
            at_least,
            degree,
        })
}

fn policy() -> impl Strategy<Value = SimplificationPolicy> {
    prop_oneof![
        Just(SimplificationPolicy::ForCompetition),
        Just(SimplificationPolicy::NoCompetition),
    ]
}

fn analysis() -> impl Strategy<Value = AnalysisMode> {
    prop_oneof![
        Just(AnalysisMode::CuttingPlanes),
        Just(AnalysisMode::ReduceToCardinality),
        Just(AnalysisMode::Cautious { bound_bits: 2 }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn normalization_keeps_the_solutions(c in linear(), policy in policy()) {
        let asg = fresh_assign();
        match run_normalize(&asg, &c, policy) {
            Ok(n) => {
                for bits in assignments() {
                    prop_assert_eq!(c.holds(bits), normalized_holds(&n, bits), "{:?} -> {:?}", c, n);
                }
                if n == Normalized::Trivial {
                    prop_assert!(assignments().all(|bits| c.holds(bits)));
                }
            }
            Err(SolverError::Contradiction(_)) => {
                prop_assert!(!assignments().any(|bits| c.holds(bits)));
            }
            Err(e) => prop_assert!(false, "unexpected {e:?}"),
        }
    }

    #[test]
    fn normalization_is_idempotent(c in linear(), policy in policy()) {
        let asg = fresh_assign();
        if let Ok(n) = run_normalize(&asg, &c, policy) {
            let (lits, coefs, degree) = n.terms();
            prop_assert_eq!(normalize(&asg, &lits, &coefs, true, &degree, policy), Ok(n));
        }
    }

    #[test]
    fn at_most_is_at_least_over_complements(c in linear()) {
        let asg = fresh_assign();
        let at_most = Linear { at_least: false, ..c.clone() };
        let total: i64 = c.coefs.iter().sum();
        let complement = Linear {
            lits: c.lits.iter().map(|l| -l).collect(),
            coefs: c.coefs.clone(),
            at_least: true,
            degree: total - c.degree,
        };
        for policy in [SimplificationPolicy::ForCompetition, SimplificationPolicy::NoCompetition] {
            prop_assert_eq!(
                run_normalize(&asg, &at_most, policy),
                run_normalize(&asg, &complement, policy)
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn solver_agrees_with_enumeration(
        cs in prop::collection::vec(linear(), 1..=8),
        mode in analysis(),
    ) {
        let config = Config::default().with_analysis(mode);
        let mut s = Solver::instantiate(&config, &ProblemDescription::with_vars(NUM_VARS));
        for (i, c) in cs.iter().enumerate() {
            match s.add_pseudo_boolean(&c.lits, &c.big_coefs(), c.at_least, &BigInt::from(c.degree)) {
                Ok(_) => (),
                Err(SolverError::Contradiction(_)) => {
                    prop_assert!(!brute_force_sat(&cs[..=i]));
                    return Ok(());
                }
                Err(e) => prop_assert!(false, "unexpected {e:?}"),
            }
        }
        match s.solve() {
            Ok(Certificate::SAT(model)) => {
                prop_assert_eq!(model.len(), NUM_VARS);
                let bits = model_bits(&model);
                for c in cs.iter() {
                    prop_assert!(c.holds(bits), "the model {:?} falsifies {:?}", model, c);
                }
            }
            Ok(Certificate::UNSAT) => prop_assert!(!brute_force_sat(&cs)),
            Err(e) => prop_assert!(false, "unexpected {e:?}"),
        }
        // learned constraints are implied by the original ones.
        for bits in assignments().filter(|bits| cs.iter().all(|c| c.holds(*bits))) {
            let assign = (0..=NUM_VARS)
                .map(|vi| (0 < vi).then(|| is_true(bits, vi as i32)))
                .collect::<Vec<_>>();
            for c in s.cdb.iter().filter(|c| c.is_learnt() && !c.is_dead()) {
                prop_assert!(
                    c.is_satisfied_under(&assign),
                    "{:?} is violated by a model",
                    c.lits().iter().map(|l| l.vi()).collect::<Vec<_>>()
                );
            }
        }
    }

    #[test]
    fn removal_agrees_with_enumeration(
        cs in prop::collection::vec(linear(), 2..=8),
        pick in any::<prop::sample::Index>(),
        mode in analysis(),
    ) {
        let config = Config::default().with_analysis(mode);
        let mut s = Solver::instantiate(&config, &ProblemDescription::with_vars(NUM_VARS));
        let mut handles = Vec::new();
        for c in cs.iter() {
            match s.add_pseudo_boolean(&c.lits, &c.big_coefs(), c.at_least, &BigInt::from(c.degree)) {
                Ok(h) => handles.push(h),
                Err(SolverError::Contradiction(_)) => return Ok(()),
                Err(e) => prop_assert!(false, "unexpected {e:?}"),
            }
        }
        // learn something before the removal.
        prop_assert!(s.solve().is_ok());
        let target = pick.index(cs.len());
        // `None` is a tautology, which changes nothing.
        if let Some(cid) = handles[target] {
            prop_assert!(s.remove_constraint(cid));
            prop_assert!(!s.remove_constraint(cid));
        }
        let rest = cs
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target)
            .map(|(_, c)| c.clone())
            .collect::<Vec<_>>();
        match s.solve() {
            Ok(Certificate::SAT(model)) => {
                let bits = model_bits(&model);
                for c in rest.iter() {
                    prop_assert!(c.holds(bits), "the model {:?} falsifies {:?}", model, c);
                }
            }
            Ok(Certificate::UNSAT) => prop_assert!(!brute_force_sat(&rest)),
            Err(e) => prop_assert!(false, "unexpected {e:?}"),
        }
    }
}
