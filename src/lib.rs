//! Analysis core for an eBPF bytecode verifier.
//!
//! This crate provides the substrate on which an abstract-interpretation
//! based verifier is built:
//!
//! - [`interval`]: an extended integer line ([`Bound`]) and closed intervals
//!   over it ([`Interval`]), with the lattice operations, widening and
//!   narrowing needed to reach a fixpoint over loops.
//! - [`cfg`]: a control-flow graph of labelled basic blocks, generic over
//!   the statement type, with structural simplification and non-owning
//!   forward/backward views.
//! - [`fixpoint`]: the trait contracts a caller-supplied worklist iterator
//!   relies on, implemented by the CFG views and the interval domain.
//!
//! Instruction decoding, ELF reading, the concrete per-instruction transfer
//! functions and the verifier front-end live in other crates; this one only
//! answers structural and numeric questions.

pub mod cfg;
pub mod fixpoint;
pub mod interval;

pub use cfg::{BasicBlock, Cfg, CfgError, CfgRef, Label, RevBlock, RevCfg};
pub use fixpoint::{AbstractDomain, FixpointGraph};
pub use interval::{Bound, Interval, NumError, ThresholdSet, Thresholds};
