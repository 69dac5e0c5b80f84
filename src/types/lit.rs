use {
    super::VarId,
    std::{
        fmt,
        num::NonZeroU32,
        ops::{Index, IndexMut, Not},
    },
};

/// Literal encoded on `u32` as:
///
/// - the Literal corresponding to a positive occurrence of *variable `n` is `2 * n + 1` and
/// - that for the negative one is `2 * n`.
///
/// So a literal and its negation always occupy adjacent slots in a literal-indexed vector.
///
/// # Examples
///
/// ```
/// use cplane::types::*;
/// assert_eq!(2usize, Lit::from(-1i32).into());
/// assert_eq!(3usize, Lit::from( 1i32).into());
/// assert_eq!(4usize, Lit::from(-2i32).into());
/// assert_eq!(5usize, Lit::from( 2i32).into());
/// assert_eq!( 1i32, Lit::from( 1i32).into());
/// assert_eq!(-1i32, Lit::from(-1i32).into());
/// assert_eq!( 2i32, Lit::from( 2i32).into());
/// assert_eq!(-2i32, Lit::from(-2i32).into());
/// ```
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Lit {
    /// literal encoded into folded u32
    ordinal: NonZeroU32,
}

/// a dummy literal used as an unset blocker or a placeholder.
pub const NULL_LIT: Lit = Lit {
    ordinal: match NonZeroU32::new(1) {
        Some(n) => n,
        None => unreachable!(),
    },
};

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}L", i32::from(self))
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}L", i32::from(self))
    }
}

/// convert literals to `[i32]` (for debug).
pub fn i32s(v: &[Lit]) -> Vec<i32> {
    v.iter().map(|l| i32::from(*l)).collect::<Vec<_>>()
}

impl From<(VarId, bool)> for Lit {
    /// make a literal from a var and its polarity (`true` for positive).
    #[inline]
    fn from((vi, positive): (VarId, bool)) -> Self {
        debug_assert!(0 < vi);
        Lit {
            ordinal: NonZeroU32::new(((vi as u32) << 1) | (positive as u32))
                .unwrap_or(NULL_LIT.ordinal),
        }
    }
}

impl From<i32> for Lit {
    #[inline]
    fn from(x: i32) -> Self {
        debug_assert!(x != 0);
        let ordinal = if x < 0 {
            (x.unsigned_abs()) << 1
        } else {
            ((x as u32) << 1) + 1
        };
        Lit {
            ordinal: NonZeroU32::new(ordinal).unwrap_or(NULL_LIT.ordinal),
        }
    }
}

impl From<Lit> for bool {
    /// - positive Lit (= odd u32) => true
    /// - negative Lit (= even u32) => false
    #[inline]
    fn from(l: Lit) -> bool {
        (l.ordinal.get() & 1) != 0
    }
}

impl From<Lit> for usize {
    #[inline]
    fn from(l: Lit) -> usize {
        l.ordinal.get() as usize
    }
}

impl From<Lit> for i32 {
    #[inline]
    fn from(l: Lit) -> i32 {
        i32::from(&l)
    }
}

impl From<&Lit> for i32 {
    #[inline]
    fn from(l: &Lit) -> i32 {
        let n = (l.ordinal.get() >> 1) as i32;
        if l.ordinal.get() % 2 == 0 {
            -n
        } else {
            n
        }
    }
}

impl Not for Lit {
    type Output = Lit;
    #[inline]
    fn not(self) -> Self {
        Lit {
            ordinal: NonZeroU32::new(self.ordinal.get() ^ 1).unwrap_or(NULL_LIT.ordinal),
        }
    }
}

impl<T> Index<Lit> for [T] {
    type Output = T;
    #[inline]
    fn index(&self, l: Lit) -> &Self::Output {
        &self[usize::from(l)]
    }
}

impl<T> IndexMut<Lit> for [T] {
    #[inline]
    fn index_mut(&mut self, l: Lit) -> &mut Self::Output {
        &mut self[usize::from(l)]
    }
}

impl<T> Index<Lit> for Vec<T> {
    type Output = T;
    #[inline]
    fn index(&self, l: Lit) -> &Self::Output {
        &self[usize::from(l)]
    }
}

impl<T> IndexMut<Lit> for Vec<T> {
    #[inline]
    fn index_mut(&mut self, l: Lit) -> &mut Self::Output {
        &mut self[usize::from(l)]
    }
}

/// API for Literal like `vi`, `as_bool` and so on.
pub trait LitIF {
    /// convert to bool.
    fn as_bool(&self) -> bool;
    /// convert to `VarId`.
    fn vi(self) -> VarId;
}

/// # Examples
///
/// ```
/// use cplane::types::*;
/// assert_eq!(Lit::from(1i32), Lit::from((1 as VarId, true)));
/// assert_eq!(Lit::from(-2i32), Lit::from((2 as VarId, false)));
/// assert_eq!(1, Lit::from((1usize, true)).vi());
/// assert_eq!(1, Lit::from((1usize, false)).vi());
/// assert_eq!(Lit::from( 1i32), !Lit::from(-1i32));
/// assert_eq!(Lit::from(-2i32), !Lit::from( 2i32));
/// ```
impl LitIF for Lit {
    #[inline]
    fn as_bool(&self) -> bool {
        self.ordinal.get() & 1 == 1
    }
    #[inline]
    fn vi(self) -> VarId {
        (self.ordinal.get() >> 1) as VarId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lit_encoding() {
        for x in [1i32, -1, 2, -2, 1000, -1000] {
            let l = Lit::from(x);
            assert_eq!(i32::from(l), x);
            assert_eq!(l.vi(), x.unsigned_abs() as usize);
            assert_eq!(bool::from(l), 0 < x);
            assert_eq!(usize::from(l) ^ 1, usize::from(!l));
            assert_eq!(!!l, l);
        }
        assert_eq!(i32::from(NULL_LIT), 0);
    }

    #[test]
    fn test_lit_indexing() {
        let mut v = vec![0u8; 8];
        v[Lit::from(3i32)] = 1;
        v[Lit::from(-3i32)] = 2;
        assert_eq!(v[7], 1);
        assert_eq!(v[6], 2);
    }
}
