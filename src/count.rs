//! Path counter (C3): for every node reachable from the output edge,
//! computes `(odd, even)` — the number of root-to-`ONE` paths through that
//! node's sub-DAG that traverse an odd, respectively even, number of
//! complement edges — in extended precision.

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bdd::{Edge, Manager};

/// `(odd, even)` path-count pair for a single regular (untagged) node.
pub type Pair = (BigUint, BigUint);

/// Memoised odd/even counts for every regular node reachable from a root.
pub struct PathCounts {
    memo: HashMap<Edge, Pair>,
}

impl PathCounts {
    /// Build the full count table for `root` by post-order traversal of the
    /// untagged sub-DAG.
    pub fn build(manager: &Manager, root: Edge) -> PathCounts {
        let mut memo = HashMap::new();
        count_node(manager, manager.regular(root), &mut memo);
        log::debug!("path counter memoised {} nodes", memo.len());
        PathCounts { memo }
    }

    /// `(odd, even)` path counts through `edge`, folding in `edge`'s own
    /// complement tag (the pair swaps under complementation).
    pub fn edge_counts(&self, manager: &Manager, edge: Edge) -> Pair {
        let (o, e) = self
            .memo
            .get(&manager.regular(edge))
            .expect("edge_counts called on a node outside the built table")
            .clone();
        if manager.is_complemented(edge) {
            (e, o)
        } else {
            (o, e)
        }
    }
}

fn count_node(manager: &Manager, n: Edge, memo: &mut HashMap<Edge, Pair>) -> Pair {
    debug_assert!(!manager.is_complemented(n), "count_node expects a regular edge");
    if let Some(pair) = memo.get(&n) {
        return pair.clone();
    }
    if manager.is_constant(n) {
        let pair = (BigUint::zero(), BigUint::one());
        memo.insert(n, pair.clone());
        return pair;
    }
    let hi = manager.hi(n); // hi is never complemented by invariant
    let lo = manager.lo(n);
    let (o_hi, e_hi) = count_edge(manager, hi, memo);
    let (o_lo, e_lo) = count_edge(manager, lo, memo);
    let pair = (o_hi + o_lo, e_hi + e_lo);
    memo.insert(n, pair.clone());
    pair
}

fn count_edge(manager: &Manager, e: Edge, memo: &mut HashMap<Edge, Pair>) -> Pair {
    let (o, ev) = count_node(manager, manager.regular(e), memo);
    if manager.is_complemented(e) {
        (ev, o)
    } else {
        (o, ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bdd::Manager;

    #[test]
    fn constant_one_counts() {
        let manager = Manager::new();
        let counts = PathCounts::build(&manager, Edge::ONE);
        let (o, e) = counts.edge_counts(&manager, Edge::ONE);
        assert_eq!(o, BigUint::zero());
        assert_eq!(e, BigUint::one());
    }

    #[test]
    fn constant_zero_counts() {
        let manager = Manager::new();
        let counts = PathCounts::build(&manager, Edge::ZERO);
        let (o, e) = counts.edge_counts(&manager, Edge::ZERO);
        assert_eq!(o, BigUint::one());
        assert_eq!(e, BigUint::zero());
    }

    #[test]
    fn single_var_node_splits_evenly() {
        // One node, two children (ONE directly, ZERO via one complement edge):
        // exactly one odd-parity and one even-parity path.
        let mut manager = Manager::new();
        let a = manager.mk_var(0);
        let counts = PathCounts::build(&manager, a);
        let (o, e) = counts.edge_counts(&manager, a);
        assert_eq!(o, BigUint::one());
        assert_eq!(e, BigUint::one());
    }

    #[test]
    fn and_of_two_vars_counts_match_the_reduced_dag() {
        // f = a & b reduces to a node (var a, hi=b, lo=ZERO). These raw counts
        // are per-edge through the reduced DAG, not full minterm counts: the
        // lo branch folds two assignments of b into a single ZERO edge, so
        // scaling by the variables skipped along that branch (not performed
        // here) is left to the sampler, per the odd/even contract.
        let mut manager = Manager::new();
        let a = manager.mk_var(0);
        let b = manager.mk_var(1);
        let f = manager.and(a, b);
        let counts = PathCounts::build(&manager, f);
        let (o, e) = counts.edge_counts(&manager, f);
        assert_eq!(o, BigUint::from(2u32));
        assert_eq!(e, BigUint::one());
    }

    #[test]
    fn or_of_two_vars_counts_match_the_reduced_dag() {
        // f = a | b reduces to a node (var a, hi=ONE, lo=b). Even-parity
        // paths to ONE are a=1 and (a=0, b=1): two of them. The only
        // odd-parity path is a=0 via the complemented lo edge to b, then
        // b=0 reaching ONE through one more complement: one of them.
        let mut manager = Manager::new();
        let a = manager.mk_var(0);
        let b = manager.mk_var(1);
        let f = manager.or(a, b);
        let counts = PathCounts::build(&manager, f);
        let (o, e) = counts.edge_counts(&manager, f);
        assert_eq!(o, BigUint::one());
        assert_eq!(e, BigUint::from(2u32));
    }
}
