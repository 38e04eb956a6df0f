//! Control-flow graph container.
//!
//! A [`Cfg`] maps [`Label`]s to exclusively owned [`BasicBlock`]s and keeps
//! a designated entry (and optional exit) label. The statement type is a
//! generic parameter: the container assigns no semantics to block contents,
//! so the same graph serves decoded eBPF instructions and any intermediate
//! form.
//!
//! Graphs are move-only. Copyable handles for pass plumbing ([`CfgRef`])
//! and a reversed view for backward analyses ([`RevCfg`]) are re-exported
//! here.
//!
//! Adjacency is kept as a small insertion-ordered, duplicate-free sequence
//! rather than a hash set: blocks rarely have more than two neighbors, and
//! the stable order makes every traversal in this module deterministic for
//! a given construction sequence.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

mod simplify;
mod view;

pub use view::{CfgRef, RevBlock, RevCfg};


/// Basic block identifier. Assigned by the graph owner and never reused
/// within a graph's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// Errors raised by CFG operations. Each one indicates a precondition
/// violation by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfgError {
    #[error("basic block {0} not found in the CFG")]
    UnknownLabel(Label),

    #[error("basic block {0} already exists in the CFG")]
    DuplicateLabel(Label),

    #[error("CFG does not have an exit block")]
    NoExit,
}

type AdjacencySet = SmallVec<[Label; 2]>;

fn insert_adjacent(set: &mut AdjacencySet, l: Label) {
    if !set.contains(&l) {
        set.push(l);
    }
}

fn remove_adjacent(set: &mut AdjacencySet, l: Label) {
    set.retain(|x| *x != l);
}

/// An ordered list of statements plus the two mirrored adjacency sets.
///
/// Blocks are created by [`Cfg::insert`] and owned by exactly one graph;
/// edges are mutated through [`Cfg::connect`] / [`Cfg::disconnect`] so the
/// mirror invariant (`A -> B` iff `B` in `succ(A)` iff `A` in `pred(B)`)
/// can be maintained on both endpoints.
#[derive(Debug)]
pub struct BasicBlock<S> {
    label: Label,
    stmts: Vec<S>,
    prev: AdjacencySet,
    next: AdjacencySet,
}

impl<S> BasicBlock<S> {
    fn new(label: Label) -> Self {
        BasicBlock {
            label,
            stmts: Vec::new(),
            prev: AdjacencySet::new(),
            next: AdjacencySet::new(),
        }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Append one statement at the tail.
    pub fn push(&mut self, stmt: S) {
        self.stmts.push(stmt);
    }

    /// Append all statements of `other` at the tail, leaving `other` empty.
    pub fn move_back_from(&mut self, other: &mut BasicBlock<S>) {
        self.stmts.append(&mut other.stmts);
    }

    pub fn statements(&self) -> &[S] {
        &self.stmts
    }

    /// Forward statement iteration; reverse with the standard `.rev()`.
    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.stmts.iter()
    }

    pub fn successors(&self) -> &[Label] {
        &self.next
    }

    pub fn predecessors(&self) -> &[Label] {
        &self.prev
    }
}

impl<S: fmt::Display> fmt::Display for BasicBlock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for stmt in &self.stmts {
            writeln!(f, "  {stmt};")?;
        }
        if !self.next.is_empty() {
            let targets: Vec<String> = self.next.iter().map(Label::to_string).collect();
            writeln!(f, "  goto {};", targets.join(","))?;
        }
        Ok(())
    }
}

/// A move-only graph of basic blocks keyed by label.
#[derive(Debug)]
pub struct Cfg<S> {
    entry: Label,
    exit: Option<Label>,
    blocks: HashMap<Label, BasicBlock<S>>,
}

impl<S> Cfg<S> {
    /// Construct with a pre-inserted empty entry block.
    pub fn new(entry: Label) -> Self {
        let mut blocks = HashMap::new();
        blocks.insert(entry, BasicBlock::new(entry));
        Cfg {
            entry,
            exit: None,
            blocks,
        }
    }

    /// Construct with pre-inserted entry and exit blocks.
    pub fn with_exit(entry: Label, exit: Label) -> Self {
        let mut cfg = Cfg::new(entry);
        if exit != entry {
            cfg.blocks.insert(exit, BasicBlock::new(exit));
        }
        cfg.exit = Some(exit);
        cfg
    }

    pub fn entry(&self) -> Label {
        self.entry
    }

    pub fn has_exit(&self) -> bool {
        self.exit.is_some()
    }

    pub fn exit(&self) -> Result<Label, CfgError> {
        self.exit.ok_or(CfgError::NoExit)
    }

    /// Mark an existing block as the exit after construction.
    pub fn set_exit(&mut self, exit: Label) -> Result<(), CfgError> {
        if !self.blocks.contains_key(&exit) {
            return Err(CfgError::UnknownLabel(exit));
        }
        self.exit = Some(exit);
        Ok(())
    }

    /// Insert a new empty block and return it.
    pub fn insert(&mut self, label: Label) -> Result<&mut BasicBlock<S>, CfgError> {
        match self.blocks.entry(label) {
            Entry::Occupied(_) => Err(CfgError::DuplicateLabel(label)),
            Entry::Vacant(slot) => Ok(slot.insert(BasicBlock::new(label))),
        }
    }

    /// Remove a block and every edge incident to it. Absent labels are
    /// ignored; the entry block is never removed. Removing the block
    /// currently designated as the exit clears the designation.
    pub fn remove(&mut self, label: Label) {
        if label == self.entry {
            return;
        }
        let Some(block) = self.blocks.remove(&label) else {
            return;
        };
        for p in &block.prev {
            if let Some(pred) = self.blocks.get_mut(p) {
                remove_adjacent(&mut pred.next, label);
            }
        }
        for n in &block.next {
            if let Some(succ) = self.blocks.get_mut(n) {
                remove_adjacent(&mut succ.prev, label);
            }
        }
        if self.exit == Some(label) {
            self.exit = None;
        }
    }

    pub fn get(&self, label: Label) -> Result<&BasicBlock<S>, CfgError> {
        self.blocks.get(&label).ok_or(CfgError::UnknownLabel(label))
    }

    pub fn get_mut(&mut self, label: Label) -> Result<&mut BasicBlock<S>, CfgError> {
        self.blocks
            .get_mut(&label)
            .ok_or(CfgError::UnknownLabel(label))
    }

    pub fn contains(&self, label: Label) -> bool {
        self.blocks.contains_key(&label)
    }

    /// Add the edge `from -> to`, updating both mirrored adjacency sets.
    /// Idempotent: a duplicate edge leaves the sets unchanged.
    pub fn connect(&mut self, from: Label, to: Label) -> Result<(), CfgError> {
        if !self.blocks.contains_key(&to) {
            return Err(CfgError::UnknownLabel(to));
        }
        let source = self
            .blocks
            .get_mut(&from)
            .ok_or(CfgError::UnknownLabel(from))?;
        insert_adjacent(&mut source.next, to);
        if let Some(target) = self.blocks.get_mut(&to) {
            insert_adjacent(&mut target.prev, from);
        }
        Ok(())
    }

    /// Remove the edge `from -> to`; idempotent on absence.
    pub fn disconnect(&mut self, from: Label, to: Label) -> Result<(), CfgError> {
        if !self.blocks.contains_key(&to) {
            return Err(CfgError::UnknownLabel(to));
        }
        let source = self
            .blocks
            .get_mut(&from)
            .ok_or(CfgError::UnknownLabel(from))?;
        remove_adjacent(&mut source.next, to);
        if let Some(target) = self.blocks.get_mut(&to) {
            remove_adjacent(&mut target.prev, from);
        }
        Ok(())
    }

    /// Successor labels of `label`, empty for an unknown label.
    pub fn successors(&self, label: Label) -> &[Label] {
        self.blocks
            .get(&label)
            .map(|b| b.successors())
            .unwrap_or(&[])
    }

    /// Predecessor labels of `label`, empty for an unknown label.
    pub fn predecessors(&self, label: Label) -> &[Label] {
        self.blocks
            .get(&label)
            .map(|b| b.predecessors())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock<S>> {
        self.blocks.values()
    }

    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.blocks.keys().copied()
    }

    /// Visit every block reachable from the entry exactly once, in
    /// depth-first preorder. Sibling order follows each block's successor
    /// insertion order, so two identically constructed graphs visit in the
    /// same sequence.
    pub fn for_each_reachable(&self, mut f: impl FnMut(&BasicBlock<S>)) {
        let mut visited = HashSet::new();
        let mut stack = vec![self.entry];
        while let Some(label) = stack.pop() {
            if !visited.insert(label) {
                continue;
            }
            if let Some(block) = self.blocks.get(&label) {
                f(block);
                for &succ in block.successors().iter().rev() {
                    if !visited.contains(&succ) {
                        stack.push(succ);
                    }
                }
            }
        }
    }
}

impl<S: fmt::Display> fmt::Display for Cfg<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.for_each_reachable(|block| {
            if result.is_ok() {
                result = write!(f, "{block}");
            }
        });
        result
    }
}
