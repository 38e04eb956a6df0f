//! Interval domain over the extended integer line.
//!
//! [`Bound`] is a point on the extended line (`-oo`, a finite
//! arbitrary-precision integer, or `+oo`); [`Interval`] is a closed range of
//! bounds forming the classic interval lattice. Besides the lattice
//! operations this module supplies the widening and narrowing operators a
//! fixpoint iterator needs to terminate over loops, plus sound
//! approximations of the arithmetic, bitwise and modular operations an eBPF
//! program can perform on scalars.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::BigInt;
use num_traits::One;

mod bitwise;
mod bound;
mod thresholds;

pub use bound::{Bound, NumError};
pub use thresholds::{ThresholdSet, Thresholds};


/// A closed interval `[lb, ub]` of [`Bound`]s.
///
/// The empty interval (bottom) is canonically `[0, -1]`; every constructor
/// normalizes to it, so derived equality is exact. Non-bottom intervals
/// keep the invariant `lb <= ub` with `lb != +oo` and `ub != -oo`, which
/// makes the endpoint-wise arithmetic below total.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    lb: Bound,
    ub: Bound,
}

impl Interval {
    pub fn new(lb: Bound, ub: Bound) -> Self {
        if lb > ub || lb.is_plus_infinity() || ub.is_minus_infinity() {
            Self::bottom()
        } else {
            Interval { lb, ub }
        }
    }

    /// The interval containing exactly `b`. An infinite bound alone denotes
    /// no integer, so the result is bottom.
    pub fn singleton_of(b: Bound) -> Self {
        Self::new(b.clone(), b)
    }

    pub fn finite(n: impl Into<BigInt>) -> Self {
        let b = Bound::Finite(n.into());
        Interval { lb: b.clone(), ub: b }
    }

    pub fn top() -> Self {
        Interval {
            lb: Bound::MinusInfinity,
            ub: Bound::PlusInfinity,
        }
    }

    pub fn bottom() -> Self {
        Interval {
            lb: Bound::finite(0),
            ub: Bound::finite(-1),
        }
    }

    pub fn lb(&self) -> &Bound {
        &self.lb
    }

    pub fn ub(&self) -> &Bound {
        &self.ub
    }

    pub fn is_bottom(&self) -> bool {
        self.lb > self.ub
    }

    pub fn is_top(&self) -> bool {
        self.lb.is_infinite() && self.ub.is_infinite()
    }

    /// `(-oo, ub]`.
    pub fn lower_half_line(&self) -> Interval {
        if self.is_bottom() {
            Self::bottom()
        } else {
            Interval::new(Bound::MinusInfinity, self.ub.clone())
        }
    }

    /// `[lb, +oo)`.
    pub fn upper_half_line(&self) -> Interval {
        if self.is_bottom() {
            Self::bottom()
        } else {
            Interval::new(self.lb.clone(), Bound::PlusInfinity)
        }
    }

    /// Least upper bound: the smallest interval containing both operands.
    pub fn join(&self, x: &Interval) -> Interval {
        if self.is_bottom() {
            x.clone()
        } else if x.is_bottom() {
            self.clone()
        } else {
            Interval::new(
                self.lb.clone().min(x.lb.clone()),
                self.ub.clone().max(x.ub.clone()),
            )
        }
    }

    /// Greatest lower bound: the intersection, normalized to bottom when
    /// the operands are disjoint.
    pub fn meet(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            Self::bottom()
        } else {
            Interval::new(
                self.lb.clone().max(x.lb.clone()),
                self.ub.clone().min(x.ub.clone()),
            )
        }
    }

    /// Partial order by containment: `self` is included in `other`.
    pub fn leq(&self, other: &Interval) -> bool {
        if self.is_bottom() {
            true
        } else if other.is_bottom() {
            false
        } else {
            other.lb <= self.lb && self.ub <= other.ub
        }
    }

    /// Widening: any endpoint that grew between `self` and `next` jumps
    /// straight to the corresponding infinity, so every ascending chain
    /// stabilizes after at most one widening step per endpoint.
    pub fn widen(&self, next: &Interval) -> Interval {
        if self.is_bottom() {
            next.clone()
        } else if next.is_bottom() {
            self.clone()
        } else {
            Interval::new(
                if next.lb < self.lb {
                    Bound::MinusInfinity
                } else {
                    self.lb.clone()
                },
                if self.ub < next.ub {
                    Bound::PlusInfinity
                } else {
                    self.ub.clone()
                },
            )
        }
    }

    /// Widening with a caller-supplied set of candidate stopping points: a
    /// grown endpoint jumps to the nearest threshold instead of straight to
    /// infinity, trading some precision back for the same termination
    /// guarantee.
    pub fn widen_with_thresholds<T: Thresholds>(&self, next: &Interval, ts: &T) -> Interval {
        if self.is_bottom() {
            next.clone()
        } else if next.is_bottom() {
            self.clone()
        } else {
            Interval::new(
                if next.lb < self.lb {
                    ts.get_prev(&next.lb)
                } else {
                    self.lb.clone()
                },
                if self.ub < next.ub {
                    ts.get_next(&next.ub)
                } else {
                    self.ub.clone()
                },
            )
        }
    }

    /// Narrowing: reclaim a finite endpoint from `x` wherever widening left
    /// an infinity. The result is always included in `self`.
    pub fn narrow(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            Self::bottom()
        } else {
            Interval::new(
                if self.lb.is_infinite() && x.lb.is_finite() {
                    x.lb.clone()
                } else {
                    self.lb.clone()
                },
                if self.ub.is_infinite() && x.ub.is_finite() {
                    x.ub.clone()
                } else {
                    self.ub.clone()
                },
            )
        }
    }

    /// The single finite value of this interval, if it has exactly one.
    pub fn singleton(&self) -> Option<&BigInt> {
        if !self.is_bottom() && self.lb == self.ub {
            self.lb.number()
        } else {
            None
        }
    }

    pub fn contains(&self, n: impl Into<BigInt>) -> bool {
        if self.is_bottom() {
            return false;
        }
        let b = Bound::Finite(n.into());
        self.lb <= b && b <= self.ub
    }

    fn contains_zero(&self) -> bool {
        self.contains(0)
    }

    /// Remove the value of the singleton `j` from whichever endpoint of
    /// `self` it equals; interior or absent values leave `self` unchanged.
    /// Used to refine an interval after a disequality.
    pub fn trim(&self, j: &Interval) -> Interval {
        if let Some(c) = j.singleton() {
            if self.lb.number() == Some(c) {
                return Interval::new(Bound::Finite(c + BigInt::one()), self.ub.clone());
            }
            if self.ub.number() == Some(c) {
                return Interval::new(self.lb.clone(), Bound::Finite(c - BigInt::one()));
            }
        }
        self.clone()
    }
}

impl PartialOrd for Interval {
    /// Lattice containment order; unrelated intervals compare as `None`.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.leq(other), other.leq(self)) {
            (true, true) => Some(Ordering::Equal),
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => None,
        }
    }
}

// Endpoint-wise sums. Normalized non-bottom intervals never carry +oo in a
// lower endpoint or -oo in an upper endpoint, so the undefined mixed case
// cannot arise here.
fn sum_low(a: &Bound, b: &Bound) -> Bound {
    match (a, b) {
        (Bound::MinusInfinity, _) | (_, Bound::MinusInfinity) => Bound::MinusInfinity,
        (Bound::Finite(x), Bound::Finite(y)) => Bound::Finite(x + y),
        _ => Bound::PlusInfinity,
    }
}

fn sum_high(a: &Bound, b: &Bound) -> Bound {
    match (a, b) {
        (Bound::PlusInfinity, _) | (_, Bound::PlusInfinity) => Bound::PlusInfinity,
        (Bound::Finite(x), Bound::Finite(y)) => Bound::Finite(x + y),
        _ => Bound::MinusInfinity,
    }
}

impl Add for &Interval {
    type Output = Interval;

    fn add(self, rhs: &Interval) -> Interval {
        if self.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        Interval::new(sum_low(&self.lb, &rhs.lb), sum_high(&self.ub, &rhs.ub))
    }
}

impl Sub for &Interval {
    type Output = Interval;

    fn sub(self, rhs: &Interval) -> Interval {
        if self.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        Interval::new(
            sum_low(&self.lb, &-&rhs.ub),
            sum_high(&self.ub, &-&rhs.lb),
        )
    }
}

impl Neg for &Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        if self.is_bottom() {
            return Interval::bottom();
        }
        Interval::new(-&self.ub, -&self.lb)
    }
}

impl Mul for &Interval {
    type Output = Interval;

    fn mul(self, rhs: &Interval) -> Interval {
        if self.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        let ll = &self.lb * &rhs.lb;
        let lu = &self.lb * &rhs.ub;
        let ul = &self.ub * &rhs.lb;
        let uu = &self.ub * &rhs.ub;
        let lo = ll.clone().min(lu.clone()).min(ul.clone()).min(uu.clone());
        let hi = ll.max(lu).max(ul).max(uu);
        Interval::new(lo, hi)
    }
}

impl Div for &Interval {
    type Output = Interval;

    /// Interval division splits zero-spanning operands and rejoins. A
    /// divisor of exactly `[0, 0]` yields bottom; the interval layer never
    /// raises `DivisionByZero`.
    fn div(self, rhs: &Interval) -> Interval {
        if self.is_bottom() || rhs.is_bottom() {
            return Interval::bottom();
        }
        if rhs.contains_zero() {
            let neg = rhs.meet(&Interval::new(Bound::MinusInfinity, Bound::finite(-1)));
            let pos = rhs.meet(&Interval::new(Bound::finite(1), Bound::PlusInfinity));
            return (self / &neg).join(&(self / &pos));
        }
        if self.contains_zero() {
            let neg = self.meet(&Interval::new(Bound::MinusInfinity, Bound::finite(-1)));
            let pos = self.meet(&Interval::new(Bound::finite(1), Bound::PlusInfinity));
            return (&neg / rhs)
                .join(&(&pos / rhs))
                .join(&Interval::finite(0));
        }
        // Neither operand contains zero, so the divisor's bounds are
        // nonzero and division applies endpoint-wise.
        let ll = self.lb.div_nonzero(&rhs.lb);
        let lu = self.lb.div_nonzero(&rhs.ub);
        let ul = self.ub.div_nonzero(&rhs.lb);
        let uu = self.ub.div_nonzero(&rhs.ub);
        let lo = ll.clone().min(lu.clone()).min(ul.clone()).min(uu.clone());
        let hi = ll.max(lu).max(ul).max(uu);
        Interval::new(lo, hi)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            write!(f, "_|_")
        } else {
            write!(f, "[{}, {}]", self.lb, self.ub)
        }
    }
}
