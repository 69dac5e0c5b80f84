use {
    super::ConstraintId,
    std::{fmt, num::NonZeroU32},
};

impl Default for ConstraintId {
    #[inline]
    /// return the dummy id, which never refers to a live constraint.
    fn default() -> Self {
        ConstraintId {
            ordinal: NonZeroU32::MAX,
        }
    }
}

impl From<usize> for ConstraintId {
    #[inline]
    fn from(u: usize) -> ConstraintId {
        ConstraintId {
            ordinal: NonZeroU32::new(u as u32).unwrap_or(NonZeroU32::MAX),
        }
    }
}

impl From<ConstraintId> for usize {
    #[inline]
    fn from(cid: ConstraintId) -> usize {
        cid.ordinal.get() as usize
    }
}

impl fmt::Debug for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}C", self.ordinal)
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}C", self.ordinal)
    }
}
