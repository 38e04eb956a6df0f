//! Reference worklist client for the fixpoint contract.
//!
//! The iterator below is deliberately small: it only uses what
//! [`FixpointGraph`] and [`AbstractDomain`] promise, which is the point —
//! the same code drives a forward analysis over a `Cfg` and a structural
//! walk over a `RevCfg`.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use super::*;
use crate::interval::{Bound, ThresholdSet};

/// Toy statement language over a single scalar.
#[derive(Debug, Clone)]
enum Stmt {
    Set(i64),
    Add(i64),
    AssumeLe(i64),
    AssumeGt(i64),
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Set(n) => write!(f, "r = {n}"),
            Stmt::Add(n) => write!(f, "r += {n}"),
            Stmt::AssumeLe(n) => write!(f, "assume r <= {n}"),
            Stmt::AssumeGt(n) => write!(f, "assume r > {n}"),
        }
    }
}

fn transfer(stmt: &Stmt, inv: &Interval) -> Interval {
    match stmt {
        Stmt::Set(n) => Interval::finite(*n),
        Stmt::Add(n) => inv + &Interval::finite(*n),
        Stmt::AssumeLe(n) => inv.meet(&Interval::new(Bound::MinusInfinity, Bound::finite(*n))),
        Stmt::AssumeGt(n) => inv.meet(&Interval::new(Bound::finite(*n + 1), Bound::PlusInfinity)),
    }
}

/// Chaotic worklist iteration with threshold widening at revisits.
fn analyze(cfg: &Cfg<Stmt>, thresholds: &ThresholdSet) -> HashMap<Label, Interval> {
    let mut input: HashMap<Label, Interval> = HashMap::new();
    input.insert(FixpointGraph::entry(cfg), Interval::top());

    let mut revisits: HashMap<Label, usize> = HashMap::new();
    let mut work = VecDeque::from([FixpointGraph::entry(cfg)]);

    while let Some(label) = work.pop_front() {
        let pre = input.get(&label).cloned().unwrap_or_else(Interval::bottom);
        let mut post = pre;
        for stmt in cfg.get(label).unwrap().iter() {
            post = transfer(stmt, &post);
        }

        for &succ in FixpointGraph::successors(cfg, label) {
            let old = input.get(&succ).cloned().unwrap_or_else(Interval::bottom);
            let joined = old.join(&post);
            if joined.leq(&old) {
                continue;
            }
            let visits = revisits.entry(succ).or_insert(0);
            *visits += 1;
            let next = if *visits > 2 {
                old.widen_with_thresholds(&joined, thresholds)
            } else {
                joined
            };
            input.insert(succ, next);
            work.push_back(succ);
        }
    }
    input
}

// entry(bb0): r = 0
// head(bb1):  <- bb0, bb2
// body(bb2):  assume r <= 9; r += 1  -> bb1
// exit(bb3):  assume r > 9
fn make_counting_loop() -> Cfg<Stmt> {
    let mut cfg = Cfg::with_exit(Label(0), Label(3));
    cfg.get_mut(Label(0)).unwrap().push(Stmt::Set(0));
    cfg.insert(Label(1)).unwrap();
    let body = cfg.insert(Label(2)).unwrap();
    body.push(Stmt::AssumeLe(9));
    body.push(Stmt::Add(1));
    cfg.get_mut(Label(3)).unwrap().push(Stmt::AssumeGt(9));

    cfg.connect(Label(0), Label(1)).unwrap();
    cfg.connect(Label(1), Label(2)).unwrap();
    cfg.connect(Label(2), Label(1)).unwrap();
    cfg.connect(Label(1), Label(3)).unwrap();
    cfg
}

#[test]
fn test_loop_invariant_with_thresholds() {
    let cfg = make_counting_loop();
    let thresholds: ThresholdSet =
        [Bound::finite(0), Bound::finite(10), Bound::finite(100)]
            .into_iter()
            .collect();
    let states = analyze(&cfg, &thresholds);

    // the threshold stops the head invariant at [0, 10]
    assert_eq!(states[&Label(1)], Interval::new(Bound::finite(0), Bound::finite(10)));
    assert_eq!(states[&Label(3)], Interval::new(Bound::finite(0), Bound::finite(10)));
    // which makes the state after the exit guard exactly [10, 10]
    let after_guard = transfer(&Stmt::AssumeGt(9), &states[&Label(3)]);
    assert_eq!(after_guard, Interval::finite(10));
}

#[test]
fn test_loop_terminates_without_thresholds() {
    let cfg = make_counting_loop();
    let states = analyze(&cfg, &ThresholdSet::new());

    // plain widening jumps to +oo but the iteration still stabilizes
    let head = &states[&Label(1)];
    assert_eq!(*head.lb(), Bound::finite(0));
    assert!(head.ub().is_plus_infinity());
    let after_guard = transfer(&Stmt::AssumeGt(9), &states[&Label(3)]);
    assert_eq!(*after_guard.lb(), Bound::finite(10));
}

/// Count the nodes reachable from a graph's entry using only the trait
/// surface, so the same function serves forward and reversed views.
fn count_reachable<G: FixpointGraph>(graph: &G) -> usize {
    let mut visited = vec![graph.entry()];
    let mut stack = vec![graph.entry()];
    while let Some(label) = stack.pop() {
        for &succ in graph.successors(label) {
            if !visited.contains(&succ) {
                visited.push(succ);
                stack.push(succ);
            }
        }
    }
    visited.len()
}

#[test]
fn test_contract_is_view_agnostic() {
    let mut cfg = make_counting_loop();
    // dead branch off the loop body: reachable forward, not backward
    cfg.insert(Label(7)).unwrap();
    cfg.connect(Label(2), Label(7)).unwrap();

    assert_eq!(count_reachable(&cfg), 5);
    assert_eq!(count_reachable(&CfgRef::new(&cfg)), 5);

    let rev = RevCfg::new(&cfg).unwrap();
    assert_eq!(FixpointGraph::entry(&rev), Label(3));
    assert_eq!(FixpointGraph::exit(&rev), Some(Label(0)));
    assert_eq!(count_reachable(&rev), 4);
}

#[test]
fn test_interval_satisfies_domain_laws() {
    let bot = <Interval as AbstractDomain>::bottom();
    let top = <Interval as AbstractDomain>::top();
    let x = Interval::finite(3);

    assert!(AbstractDomain::leq(&bot, &x));
    assert!(AbstractDomain::leq(&x, &top));
    assert_eq!(AbstractDomain::join(&bot, &x), x);
    assert_eq!(AbstractDomain::meet(&top, &x), x);
    assert!(AbstractDomain::leq(&AbstractDomain::narrow(&top, &x), &top));
}
