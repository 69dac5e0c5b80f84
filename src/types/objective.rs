use {
    super::{Lit, LitIF, SolverError, VarId},
    num_bigint::BigInt,
    num_traits::{Signed, ToPrimitive, Zero},
    std::fmt,
};

/// A linear cost `Σ cᵢ·lᵢ` to be minimized by an external optimizer.
/// The search core only reads it to bias its decision order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ObjectiveFunction {
    lits: Vec<Lit>,
    coefs: Vec<BigInt>,
}

impl fmt::Display for ObjectiveFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "min:")?;
        for (l, c) in self.lits.iter().zip(self.coefs.iter()) {
            write!(f, " {c:+}*{}", i32::from(l))?;
        }
        Ok(())
    }
}

impl ObjectiveFunction {
    /// # Errors
    ///
    /// `SolverError::IllegalState` if the lengths of `lits` and `coefs` differ.
    pub fn new(lits: Vec<Lit>, coefs: Vec<BigInt>) -> Result<Self, SolverError> {
        if lits.len() != coefs.len() {
            return Err(SolverError::IllegalState(
                "objective literals and coefficients differ in length",
            ));
        }
        Ok(ObjectiveFunction { lits, coefs })
    }
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }
    pub fn len(&self) -> usize {
        self.lits.len()
    }
    pub fn iter(&self) -> impl Iterator<Item = (Lit, &BigInt)> + '_ {
        self.lits.iter().copied().zip(self.coefs.iter())
    }
    /// return the vars used in the objective.
    pub fn vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.lits.iter().map(|l| l.vi())
    }
    /// return the value of the objective under a model given as a list of DIMACS literals.
    /// Unassigned vars don't contribute.
    ///
    /// # Example
    ///
    /// ```
    /// use cplane::types::*;
    /// use num_bigint::BigInt;
    /// let obj = ObjectiveFunction::new(
    ///     vec![Lit::from(1i32), Lit::from(-2i32)],
    ///     vec![BigInt::from(3), BigInt::from(-2)],
    /// ).unwrap();
    /// assert_eq!(obj.evaluate(&[1, 2]), BigInt::from(3));
    /// assert_eq!(obj.evaluate(&[1, -2]), BigInt::from(1));
    /// ```
    pub fn evaluate(&self, model: &[i32]) -> BigInt {
        let mut value = BigInt::zero();
        for (l, c) in self.iter() {
            let vi = l.vi();
            if let Some(&x) = model.get(vi - 1) {
                debug_assert_eq!(x.unsigned_abs() as usize, vi);
                if (0 < x) == l.as_bool() {
                    value += c;
                }
            }
        }
        value
    }
    /// return a polarity hint and a weight in (0, 1] for each objective var.
    /// The hint is the polarity which doesn't increase the cost.
    pub fn phase_hints(&self) -> Vec<(VarId, bool, f64)> {
        let max = self
            .coefs
            .iter()
            .map(|c| c.abs())
            .max()
            .and_then(|m| m.to_f64())
            .filter(|m| 0.0 < *m)
            .unwrap_or(1.0);
        self.iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(l, c)| {
                let weight = c.abs().to_f64().map_or(1.0, |a| (a / max).max(f64::MIN_POSITIVE));
                // a positive cost on `l` is avoided by falsifying `l`.
                let phase = if c.is_positive() {
                    !l.as_bool()
                } else {
                    l.as_bool()
                };
                (l.vi(), phase, weight)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_hints() {
        let obj = ObjectiveFunction::new(
            vec![Lit::from(1i32), Lit::from(-2i32), Lit::from(3i32)],
            vec![BigInt::from(4), BigInt::from(2), BigInt::from(-1)],
        )
        .unwrap();
        let hints = obj.phase_hints();
        assert_eq!(hints[0], (1, false, 1.0));
        assert_eq!(hints[1], (2, true, 0.5));
        assert_eq!(hints[2], (3, true, 0.25));
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(matches!(
            ObjectiveFunction::new(vec![Lit::from(1i32)], vec![]),
            Err(SolverError::IllegalState(_))
        ));
    }
}
