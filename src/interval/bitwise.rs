//! Bitwise and modular approximations on intervals.
//!
//! Singleton operands are evaluated exactly; non-negative operands tighten
//! `and`/`or`/`xor` through a power-of-two mask; everything else falls back
//! to top. The approximations are deliberately coarse but sound.

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::{Bound, Interval};

/// Smallest mask of the form `2^k - 1` covering `n` (`n >= 0`).
fn pow2_mask(n: &BigInt) -> BigInt {
    (BigInt::one() << n.bits()) - 1
}

impl Interval {
    fn is_nonneg(&self) -> bool {
        match &self.lb {
            Bound::Finite(n) => !self.is_bottom() && !n.is_negative(),
            _ => false,
        }
    }

    /// Shift amount usable for exact 64-bit shifts.
    fn shift_amount(&self) -> Option<u64> {
        let k = self.singleton()?.to_u64()?;
        (k <= 63).then_some(k)
    }

    pub fn and(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(a), Some(b)) = (self.singleton(), x.singleton()) {
            return Interval::finite(a & b);
        }
        if self.is_nonneg() && x.is_nonneg() {
            // x & y can exceed neither operand
            let ub = self.ub.clone().min(x.ub.clone());
            return Interval::new(Bound::finite(0), ub);
        }
        Interval::top()
    }

    pub fn or(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(a), Some(b)) = (self.singleton(), x.singleton()) {
            return Interval::finite(a | b);
        }
        self.mask_capped(x)
    }

    pub fn xor(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(a), Some(b)) = (self.singleton(), x.singleton()) {
            return Interval::finite(a ^ b);
        }
        self.mask_capped(x)
    }

    // Shared upper bound for or/xor on non-negative operands: the result
    // fits in the wider operand's power-of-two mask and cannot exceed the
    // sum of the upper bounds.
    fn mask_capped(&self, x: &Interval) -> Interval {
        if !(self.is_nonneg() && x.is_nonneg()) {
            return Interval::top();
        }
        match (self.ub.number(), x.ub.number()) {
            (Some(a), Some(b)) => {
                let mask = pow2_mask(a.max(b));
                let ub = mask.min(a + b);
                Interval::new(Bound::finite(0), Bound::Finite(ub))
            }
            _ => Interval::new(Bound::finite(0), Bound::PlusInfinity),
        }
    }

    /// Left shift: a singleton in-range shift amount multiplies by `2^k`;
    /// anything else is top.
    pub fn shl(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            return Interval::bottom();
        }
        match x.shift_amount() {
            Some(k) => self * &Interval::finite(BigInt::one() << k),
            None => Interval::top(),
        }
    }

    /// Logical right shift: exact only for a non-negative singleton value
    /// (a negative needs a fixed width this layer does not have).
    pub fn lshr(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            return Interval::bottom();
        }
        match (self.singleton(), x.shift_amount()) {
            (Some(a), Some(k)) if !a.is_negative() => Interval::finite(a >> k),
            _ => Interval::top(),
        }
    }

    /// Arithmetic right shift: exact on singletons.
    pub fn ashr(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            return Interval::bottom();
        }
        match (self.singleton(), x.shift_amount()) {
            (Some(a), Some(k)) => Interval::finite(a >> k),
            _ => Interval::top(),
        }
    }

    /// Unsigned division coincides with signed division when both operands
    /// are non-negative; otherwise nothing useful is known.
    pub fn udiv(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            return Interval::bottom();
        }
        if self.is_nonneg() && x.is_nonneg() {
            return self / x;
        }
        Interval::top()
    }

    pub fn urem(&self, x: &Interval) -> Interval {
        self.rem_nonneg(x)
    }

    pub fn srem(&self, x: &Interval) -> Interval {
        if let (Some(a), Some(b)) = (self.singleton(), x.singleton()) {
            if b.is_zero() {
                return Interval::bottom();
            }
            return Interval::finite(a % b);
        }
        self.rem_nonneg(x)
    }

    // Remainder bound for a non-negative dividend and strictly positive
    // divisor: [0, min(lhs.ub, rhs.ub - 1)].
    fn rem_nonneg(&self, x: &Interval) -> Interval {
        if self.is_bottom() || x.is_bottom() {
            return Interval::bottom();
        }
        if let (Some(a), Some(b)) = (self.singleton(), x.singleton()) {
            if b.is_zero() {
                return Interval::bottom();
            }
            if !a.is_negative() && b.is_positive() {
                return Interval::finite(a % b);
            }
        }
        if self.is_nonneg() && x.lb.number().is_some_and(|n| n.is_positive()) {
            let cap = match x.ub.number() {
                Some(b) => Bound::Finite(b - BigInt::one()),
                None => Bound::PlusInfinity,
            };
            return Interval::new(Bound::finite(0), self.ub.clone().min(cap));
        }
        Interval::top()
    }
}
