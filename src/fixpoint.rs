//! Contracts between the CFG, the numeric substrate, and a fixpoint
//! iterator.
//!
//! The worklist iterator that propagates abstract states over a graph is
//! supplied by the caller; this module pins down what it may assume of the
//! two structures it drives:
//!
//! - [`FixpointGraph`]: stable node identity (labels are `Copy + Eq +
//!   Hash` and never reused within a graph's lifetime), deterministic
//!   successor/predecessor enumeration (adjacency preserves insertion
//!   order), and idempotent traversal (enumerating edges mutates nothing).
//! - [`AbstractDomain`]: the lattice laws. `join`/`meet` are idempotent,
//!   commutative and associative with the absorption identities; `leq` is
//!   the induced partial order with `bottom` least and `top` greatest;
//!   `widen` stabilizes every ascending chain in finitely many steps;
//!   `narrow` of a pair returns a value included in the first operand.
//!
//! Both traits are implemented here for the crate's own types, so a
//! forward analysis over a [`Cfg`] and a backward analysis over a
//! [`RevCfg`] drive the same iterator code. The reference client in this
//! module's tests exercises the contract end to end.

use crate::cfg::{Cfg, CfgRef, Label, RevCfg};
use crate::interval::Interval;

#[cfg(test)]
mod tests;

/// Graph shape as seen by a worklist fixpoint iterator.
///
/// Implementations return an empty slice for a label that is not in the
/// graph; presenting unknown labels is a caller bug and is surfaced by
/// [`Cfg::get`], not here.
pub trait FixpointGraph {
    fn entry(&self) -> Label;

    fn exit(&self) -> Option<Label>;

    /// Deterministic, duplicate-free successor enumeration.
    fn successors(&self, label: Label) -> &[Label];

    /// Deterministic, duplicate-free predecessor enumeration.
    fn predecessors(&self, label: Label) -> &[Label];

    fn contains(&self, label: Label) -> bool;
}

impl<S> FixpointGraph for Cfg<S> {
    fn entry(&self) -> Label {
        Cfg::entry(self)
    }

    fn exit(&self) -> Option<Label> {
        Cfg::exit(self).ok()
    }

    fn successors(&self, label: Label) -> &[Label] {
        Cfg::successors(self, label)
    }

    fn predecessors(&self, label: Label) -> &[Label] {
        Cfg::predecessors(self, label)
    }

    fn contains(&self, label: Label) -> bool {
        Cfg::contains(self, label)
    }
}

impl<S> FixpointGraph for CfgRef<'_, S> {
    fn entry(&self) -> Label {
        CfgRef::entry(self)
    }

    fn exit(&self) -> Option<Label> {
        CfgRef::exit(self).ok()
    }

    fn successors(&self, label: Label) -> &[Label] {
        CfgRef::successors(self, label)
    }

    fn predecessors(&self, label: Label) -> &[Label] {
        CfgRef::predecessors(self, label)
    }

    fn contains(&self, label: Label) -> bool {
        CfgRef::contains(self, label)
    }
}

impl<S> FixpointGraph for RevCfg<'_, S> {
    fn entry(&self) -> Label {
        RevCfg::entry(self)
    }

    fn exit(&self) -> Option<Label> {
        Some(RevCfg::exit(self))
    }

    fn successors(&self, label: Label) -> &[Label] {
        RevCfg::successors(self, label)
    }

    fn predecessors(&self, label: Label) -> &[Label] {
        RevCfg::predecessors(self, label)
    }

    fn contains(&self, label: Label) -> bool {
        RevCfg::contains(self, label)
    }
}

/// Lattice operations a numeric domain must supply to the iterator.
pub trait AbstractDomain: Clone + PartialEq {
    fn bottom() -> Self;

    fn top() -> Self;

    /// Least upper bound.
    fn join(&self, other: &Self) -> Self;

    /// Greatest lower bound.
    fn meet(&self, other: &Self) -> Self;

    /// Partial order: `self` is included in `other`.
    fn leq(&self, other: &Self) -> bool;

    /// Extrapolate a growing sequence; guarantees termination over
    /// infinite-height lattices.
    fn widen(&self, next: &Self) -> Self;

    /// Reclaim precision lost to widening; the result is included in
    /// `self`.
    fn narrow(&self, other: &Self) -> Self;
}

impl AbstractDomain for Interval {
    fn bottom() -> Self {
        Interval::bottom()
    }

    fn top() -> Self {
        Interval::top()
    }

    fn join(&self, other: &Self) -> Self {
        Interval::join(self, other)
    }

    fn meet(&self, other: &Self) -> Self {
        Interval::meet(self, other)
    }

    fn leq(&self, other: &Self) -> bool {
        Interval::leq(self, other)
    }

    fn widen(&self, next: &Self) -> Self {
        Interval::widen(self, next)
    }

    fn narrow(&self, other: &Self) -> Self {
        Interval::narrow(self, other)
    }
}
