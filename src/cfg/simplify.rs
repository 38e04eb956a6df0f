//! Structural CFG simplification.
//!
//! Three behavior-preserving rewrites, iterated to a fixpoint: merge
//! straight-line chains, drop blocks unreachable from the entry, and drop
//! blocks that cannot reach the exit. A statement-local dataflow analysis
//! observes the same results on the simplified graph as on the original.

use tracing::debug;

use super::*;

impl<S> Cfg<S> {
    /// Apply the three rewrites until none of them changes the graph.
    pub fn simplify(&mut self) {
        loop {
            let mut changed = self.merge_chains();
            changed |= self.remove_unreachable_blocks();
            changed |= self.remove_useless_blocks();
            if !changed {
                break;
            }
        }
    }

    // A block B is merged into its predecessor A when pred(B) == {A},
    // succ(A) == {B} and B has exactly one successor. The entry block
    // participates in no merge; an exit merged away moves its designation
    // to A.
    fn merge_chains(&mut self) -> bool {
        let mut merged = 0usize;
        while let Some((pred, label)) = self.find_mergeable() {
            self.merge_into(pred, label);
            merged += 1;
        }
        if merged > 0 {
            debug!(merged, "merged straight-line chains");
        }
        merged > 0
    }

    fn find_mergeable(&self) -> Option<(Label, Label)> {
        for block in self.blocks.values() {
            let label = block.label();
            if label == self.entry {
                continue;
            }
            let &[pred] = block.predecessors() else {
                continue;
            };
            if pred == label || pred == self.entry {
                continue;
            }
            if block.successors().len() != 1 {
                continue;
            }
            if self.successors(pred) != [label] {
                continue;
            }
            return Some((pred, label));
        }
        None
    }

    fn merge_into(&mut self, pred: Label, label: Label) {
        let Some(mut removed) = self.blocks.remove(&label) else {
            return;
        };
        let succs = removed.next.clone();
        if let Some(parent) = self.blocks.get_mut(&pred) {
            parent.move_back_from(&mut removed);
            parent.next = succs.clone();
        }
        // Rewrite the successors' mirrored predecessor entries in place so
        // their order is preserved.
        for s in succs {
            if let Some(succ) = self.blocks.get_mut(&s) {
                for p in succ.prev.iter_mut() {
                    if *p == label {
                        *p = pred;
                    }
                }
            }
        }
        if self.exit == Some(label) {
            self.exit = Some(pred);
        }
    }

    fn remove_unreachable_blocks(&mut self) -> bool {
        let alive = self.reachable_from(self.entry);
        self.retain_blocks(&alive)
    }

    // Only applicable when an exit is set; the entry is never removed even
    // when it cannot reach the exit.
    fn remove_useless_blocks(&mut self) -> bool {
        let Some(exit) = self.exit else {
            return false;
        };
        let alive = self.reaching(exit);
        self.retain_blocks(&alive)
    }

    fn retain_blocks(&mut self, alive: &HashSet<Label>) -> bool {
        let dead: Vec<Label> = self
            .blocks
            .keys()
            .copied()
            .filter(|l| !alive.contains(l) && *l != self.entry)
            .collect();
        for &l in &dead {
            self.remove(l);
        }
        if !dead.is_empty() {
            debug!(removed = dead.len(), "dropped dead blocks");
        }
        !dead.is_empty()
    }

    /// Labels reachable from `start` along forward edges.
    fn reachable_from(&self, start: Label) -> HashSet<Label> {
        self.close_over(start, |b| b.successors())
    }

    /// Labels from which `target` is reachable along forward edges.
    fn reaching(&self, target: Label) -> HashSet<Label> {
        self.close_over(target, |b| b.predecessors())
    }

    fn close_over<'a>(
        &'a self,
        start: Label,
        edges: impl Fn(&'a BasicBlock<S>) -> &'a [Label],
    ) -> HashSet<Label> {
        let mut visited = HashSet::new();
        let mut stack = vec![start];
        while let Some(label) = stack.pop() {
            if !visited.insert(label) {
                continue;
            }
            if let Some(block) = self.blocks.get(&label) {
                for &n in edges(block) {
                    if !visited.contains(&n) {
                        stack.push(n);
                    }
                }
            }
        }
        visited
    }
}
