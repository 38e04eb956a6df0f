use std::collections::BTreeSet;

use super::Bound;

/// Candidate stopping points for [`Interval::widen_with_thresholds`].
///
/// The core hardcodes no threshold policy; callers supply any sorted set
/// answering floor/ceiling queries on bounds. Both infinities are implicit
/// members, returned when no stored threshold qualifies.
///
/// [`Interval::widen_with_thresholds`]: super::Interval::widen_with_thresholds
pub trait Thresholds {
    /// Greatest threshold `<= b`, or `-oo` when none exists.
    fn get_prev(&self, b: &Bound) -> Bound;

    /// Smallest threshold `>= b`, or `+oo` when none exists.
    fn get_next(&self, b: &Bound) -> Bound;
}

/// An ordered set of finite widening thresholds.
#[derive(Debug, Clone, Default)]
pub struct ThresholdSet {
    points: BTreeSet<Bound>,
}

impl ThresholdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Infinite bounds are implicit members and are not stored.
    pub fn insert(&mut self, b: Bound) {
        if b.is_finite() {
            self.points.insert(b);
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl FromIterator<Bound> for ThresholdSet {
    fn from_iter<I: IntoIterator<Item = Bound>>(iter: I) -> Self {
        let mut set = ThresholdSet::new();
        for b in iter {
            set.insert(b);
        }
        set
    }
}

impl Thresholds for ThresholdSet {
    fn get_prev(&self, b: &Bound) -> Bound {
        self.points
            .range(..=b)
            .next_back()
            .cloned()
            .unwrap_or(Bound::MinusInfinity)
    }

    fn get_next(&self, b: &Bound) -> Bound {
        self.points
            .range(b..)
            .next()
            .cloned()
            .unwrap_or(Bound::PlusInfinity)
    }
}
