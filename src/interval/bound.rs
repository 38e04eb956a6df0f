use std::fmt;
use std::ops::{Mul, Neg};

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use thiserror::Error;

/// Errors raised by arithmetic on the extended integer line.
///
/// Every variant signals a precondition violation in the caller (typically a
/// transfer-function bug in a client domain); none is recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumError {
    #[error("undefined operation -oo + +oo")]
    UndefinedArithmetic,

    #[error("division by zero")]
    DivisionByZero,
}

/// A point on the extended integer line: `-oo`, a finite integer, or `+oo`.
///
/// The variant order makes the derived `Ord` the total order
/// `-oo < finite < +oo`, with finite values compared as integers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bound {
    MinusInfinity,
    Finite(BigInt),
    PlusInfinity,
}

impl Bound {
    pub fn finite(n: impl Into<BigInt>) -> Self {
        Bound::Finite(n.into())
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Bound::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    pub fn is_plus_infinity(&self) -> bool {
        matches!(self, Bound::PlusInfinity)
    }

    pub fn is_minus_infinity(&self) -> bool {
        matches!(self, Bound::MinusInfinity)
    }

    /// The finite value, or `None` for an infinity.
    pub fn number(&self) -> Option<&BigInt> {
        match self {
            Bound::Finite(n) => Some(n),
            _ => None,
        }
    }

    pub fn abs(&self) -> Bound {
        match self {
            Bound::MinusInfinity | Bound::PlusInfinity => Bound::PlusInfinity,
            Bound::Finite(n) => Bound::Finite(n.abs()),
        }
    }

    fn sign_negative(&self) -> bool {
        match self {
            Bound::MinusInfinity => true,
            Bound::Finite(n) => n.is_negative(),
            Bound::PlusInfinity => false,
        }
    }

    /// Addition on the extended line. Infinite operands absorb finite ones
    /// and same-signed infinities; `+oo + -oo` is undefined.
    pub fn checked_add(&self, other: &Bound) -> Result<Bound, NumError> {
        match (self, other) {
            (Bound::Finite(a), Bound::Finite(b)) => Ok(Bound::Finite(a + b)),
            (Bound::PlusInfinity, Bound::MinusInfinity)
            | (Bound::MinusInfinity, Bound::PlusInfinity) => Err(NumError::UndefinedArithmetic),
            (Bound::PlusInfinity, _) | (_, Bound::PlusInfinity) => Ok(Bound::PlusInfinity),
            (Bound::MinusInfinity, _) | (_, Bound::MinusInfinity) => Ok(Bound::MinusInfinity),
        }
    }

    pub fn checked_sub(&self, other: &Bound) -> Result<Bound, NumError> {
        self.checked_add(&-other)
    }

    /// Division on the extended line. Truncates toward zero for finite
    /// operands; `finite / oo` is 0; an infinite dividend keeps its
    /// magnitude with the sign given by the operand signs.
    pub fn checked_div(&self, other: &Bound) -> Result<Bound, NumError> {
        if other.number().is_some_and(|n| n.is_zero()) {
            return Err(NumError::DivisionByZero);
        }
        Ok(self.div_nonzero(other))
    }

    /// Division with a divisor already known to be nonzero.
    pub(crate) fn div_nonzero(&self, other: &Bound) -> Bound {
        match (self, other) {
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a / b),
            (Bound::Finite(_), _) => Bound::Finite(BigInt::zero()),
            _ => {
                if self.sign_negative() ^ other.sign_negative() {
                    Bound::MinusInfinity
                } else {
                    Bound::PlusInfinity
                }
            }
        }
    }
}

impl From<i64> for Bound {
    fn from(n: i64) -> Self {
        Bound::Finite(n.into())
    }
}

impl From<BigInt> for Bound {
    fn from(n: BigInt) -> Self {
        Bound::Finite(n)
    }
}

impl Neg for Bound {
    type Output = Bound;

    fn neg(self) -> Bound {
        match self {
            Bound::MinusInfinity => Bound::PlusInfinity,
            Bound::Finite(n) => Bound::Finite(-n),
            Bound::PlusInfinity => Bound::MinusInfinity,
        }
    }
}

impl Neg for &Bound {
    type Output = Bound;

    fn neg(self) -> Bound {
        -self.clone()
    }
}

impl Mul for &Bound {
    type Output = Bound;

    /// `0 * oo` is 0; otherwise infiniteness absorbs and the sign is the
    /// XOR of the operand signs.
    fn mul(self, rhs: &Bound) -> Bound {
        match (self, rhs) {
            (Bound::Finite(a), _) if a.is_zero() => Bound::Finite(BigInt::zero()),
            (_, Bound::Finite(b)) if b.is_zero() => Bound::Finite(BigInt::zero()),
            (Bound::Finite(a), Bound::Finite(b)) => Bound::Finite(a * b),
            _ => {
                if self.sign_negative() ^ rhs.sign_negative() {
                    Bound::MinusInfinity
                } else {
                    Bound::PlusInfinity
                }
            }
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::MinusInfinity => write!(f, "-oo"),
            Bound::Finite(n) => write!(f, "{n}"),
            Bound::PlusInfinity => write!(f, "+oo"),
        }
    }
}
