use std::collections::HashMap;

mod dot_printer;

pub use dot_printer::print_bdd_as_dot;

/// Index of a primary input variable, as assigned by the AAG loader.
pub type VarId = u32;

/// Identifier of a node in the manager's arena. `NodeId(0)` is always the
/// constant `ONE` node; there is no separately allocated `ZERO` node, since
/// `ZERO` is represented as the complemented edge to `ONE`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// A pointer into the BDD manager, tagged with a complement bit in the low
/// bit: `node() << 1 | complemented as u32`. Two edges compare equal iff they
/// denote the same function, which is what makes the arena strongly
/// canonical (one node per `(var, hi, lo)` triple, up to the tag).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(u32);

impl Edge {
    const COMPLEMENT_BIT: u32 = 1;

    /// The constant `true` leaf.
    pub const ONE: Edge = Edge(0);
    /// The constant `false` leaf — the complement of `ONE`, not a distinct node.
    pub const ZERO: Edge = Edge(Self::COMPLEMENT_BIT);

    fn of(node: NodeId, complemented: bool) -> Edge {
        Edge((node.0 << 1) | (complemented as u32))
    }

    fn node(self) -> NodeId {
        NodeId(self.0 >> 1)
    }

    /// True if the tag bit is set, i.e. this edge denotes the negation of
    /// the function rooted at `self.regular()`.
    pub fn is_complemented(self) -> bool {
        self.0 & Self::COMPLEMENT_BIT != 0
    }

    /// Strip the complement tag.
    pub fn regular(self) -> Edge {
        Edge(self.0 & !Self::COMPLEMENT_BIT)
    }

    /// Toggle the complement tag. O(1), no allocation.
    pub fn not(self) -> Edge {
        Edge(self.0 ^ Self::COMPLEMENT_BIT)
    }
}

/// One decision node: a variable and its two (unique, reduced) children.
/// `hi` is never complemented — the sole complement tag lives on `lo` and/or
/// on the edge pointing at this node. This is the canonical complement
/// placement rule that keeps the representation strongly canonical.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct BddNode {
    var: VarId,
    hi: Edge,
    lo: Edge,
}

/// The BDD manager: a shared arena of nodes plus the unique table, computed
/// cache and reference counts needed to keep the DAG reduced and alive.
/// Holds process-wide state for as long as it is alive; the driver owns
/// exactly one instance for the whole run.
pub struct Manager {
    nodes: Vec<BddNode>,
    refs: Vec<u32>,
    free_list: Vec<u32>,
    unique: HashMap<(VarId, Edge, Edge), u32>,
    and_cache: HashMap<(Edge, Edge), Edge>,
    /// `level_of[v]` is the current position of variable `v` in the order;
    /// `var_at_level[p]` is its inverse. Reordering permutes these two
    /// tables without changing any externally held `Edge`/`NodeId` value,
    /// which is what keeps a node's variable identity stable across a reorder.
    level_of: Vec<u32>,
    var_at_level: Vec<VarId>,
    autoreorder: bool,
    reorder_threshold: usize,
}

impl Manager {
    pub fn new() -> Manager {
        // Node 0 is the immortal ONE terminal: a self-loop with no variable.
        let one = BddNode {
            var: VarId::MAX,
            hi: Edge::ONE,
            lo: Edge::ONE,
        };
        Manager {
            nodes: vec![one],
            refs: vec![u32::MAX], // terminal is never freed
            free_list: Vec::new(),
            unique: HashMap::new(),
            and_cache: HashMap::new(),
            level_of: Vec::new(),
            var_at_level: Vec::new(),
            autoreorder: false,
            reorder_threshold: 50_000,
        }
    }

    /// Authorise sifting-style reordering once the live node count exceeds
    /// the internal threshold. The recommended policy is to enable this
    /// while folding AND gates and disable it again before path counting,
    /// so counting and sampling see a stable variable order.
    pub fn enable_autoreorder(&mut self) {
        self.autoreorder = true;
    }

    pub fn disable_autoreorder(&mut self) {
        self.autoreorder = false;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free_list.len()
    }

    pub fn num_vars(&self) -> usize {
        self.level_of.len()
    }

    fn ensure_var(&mut self, v: VarId) {
        let v = v as usize;
        if v >= self.level_of.len() {
            let old_len = self.level_of.len();
            self.level_of.resize(v + 1, 0);
            self.var_at_level.resize(v + 1, 0);
            for i in old_len..=v {
                self.level_of[i] = i as u32;
                self.var_at_level[i] = i as u32;
            }
        }
    }

    fn level_of_var(&self, v: VarId) -> u32 {
        if v == VarId::MAX {
            u32::MAX
        } else {
            self.level_of[v as usize]
        }
    }

    /// Allocate (or find) the node for `(var, hi, lo)`, taking ownership of
    /// the `hi`/`lo` references passed in. Enforces reducedness (no node
    /// with `hi == lo`) and canonical complement placement (`hi` never
    /// tagged).
    fn make_node(&mut self, var: VarId, hi: Edge, lo: Edge) -> Edge {
        if hi == lo {
            // Redundant node: the caller's reference to hi is reused as the result,
            // and the now-unused lo reference is released.
            self.deref_edge(lo);
            return hi;
        }
        let (hi, lo, complement_result) = if hi.is_complemented() {
            (hi.not(), lo.not(), true)
        } else {
            (hi, lo, false)
        };
        let key = (var, hi, lo);
        if let Some(&id) = self.unique.get(&key) {
            self.deref_edge(hi);
            self.deref_edge(lo);
            self.ref_node(NodeId(id));
            return Edge::of(NodeId(id), complement_result);
        }
        let id = if let Some(id) = self.free_list.pop() {
            self.nodes[id as usize] = BddNode { var, hi, lo };
            self.refs[id as usize] = 0;
            id
        } else {
            self.nodes.push(BddNode { var, hi, lo });
            self.refs.push(0);
            (self.nodes.len() - 1) as u32
        };
        self.unique.insert(key, id);
        self.ref_node(NodeId(id));
        Edge::of(NodeId(id), complement_result)
    }

    /// Return the positive-phase edge for input `i`, allocating `(i, ONE, ZERO)`
    /// if it does not exist yet. Returns a referenced edge.
    pub fn mk_var(&mut self, i: VarId) -> Edge {
        self.ensure_var(i);
        self.ref_edge(Edge::ONE);
        self.make_node(i, Edge::ONE, Edge::ZERO)
    }

    #[inline]
    pub fn not(&self, e: Edge) -> Edge {
        e.not()
    }

    #[inline]
    pub fn is_constant(&self, e: Edge) -> bool {
        e.regular() == Edge::ONE
    }

    #[inline]
    pub fn regular(&self, e: Edge) -> Edge {
        e.regular()
    }

    #[inline]
    pub fn is_complemented(&self, e: Edge) -> bool {
        e.is_complemented()
    }

    pub fn var(&self, e: Edge) -> VarId {
        self.nodes[e.node().0 as usize].var
    }

    /// The `hi` child, with `e`'s own complement tag folded in.
    pub fn hi(&self, e: Edge) -> Edge {
        let n = &self.nodes[e.regular().node().0 as usize];
        if e.is_complemented() {
            n.hi.not()
        } else {
            n.hi
        }
    }

    pub fn lo(&self, e: Edge) -> Edge {
        let n = &self.nodes[e.regular().node().0 as usize];
        if e.is_complemented() {
            n.lo.not()
        } else {
            n.lo
        }
    }

    fn ref_node(&mut self, n: NodeId) {
        if n == Edge::ONE.node() {
            return;
        }
        self.refs[n.0 as usize] += 1;
    }

    /// Bump the reference count of the underlying node (the tag is irrelevant
    /// to ownership — both polarities of an edge keep the same node alive).
    pub fn ref_edge(&mut self, e: Edge) {
        self.ref_node(e.regular().node());
    }

    /// Drop a reference; once a node's count reaches zero it is evicted from
    /// the unique table, its slot is recycled, and its children are
    /// recursively dereferenced. Clears the computed cache whenever a node is
    /// actually freed, since a recycled slot could otherwise alias a stale
    /// cache entry (see DESIGN.md for why this is conservative rather than
    /// generation-tagged).
    pub fn deref_edge(&mut self, e: Edge) {
        let node = e.regular().node();
        if node == Edge::ONE.node() {
            return;
        }
        let idx = node.0 as usize;
        debug_assert!(self.refs[idx] > 0, "deref of a node with zero references");
        self.refs[idx] -= 1;
        if self.refs[idx] == 0 {
            let BddNode { var, hi, lo } = self.nodes[idx];
            self.unique.remove(&(var, hi, lo));
            self.free_list.push(idx as u32);
            self.clear_and_cache();
            self.deref_edge(hi);
            self.deref_edge(lo);
        }
    }

    /// Drop every entry from the computed cache, releasing the reference
    /// each entry held on its result edge (every insert at the end of
    /// `and_rec` refs the edge it caches). Draining into a local `Vec` first
    /// means the nested `deref_edge` calls below — which may themselves
    /// free nodes and recurse back into `clear_and_cache` — see an already
    /// empty `self.and_cache` rather than one we are still iterating.
    fn clear_and_cache(&mut self) {
        let entries: Vec<Edge> = std::mem::take(&mut self.and_cache).into_values().collect();
        for cached in entries {
            self.deref_edge(cached);
        }
    }

    /// Standard Bryant AND: short-circuits on constants and (anti-)equal
    /// operands, consults the computed cache, otherwise splits on the
    /// topmost variable (by current level, not raw index) and recurses.
    /// Returns a referenced edge; does not consume references to `a`/`b`.
    pub fn and(&mut self, a: Edge, b: Edge) -> Edge {
        self.ref_edge(a);
        self.ref_edge(b);
        let result = self.and_rec(a, b);
        self.deref_edge(a);
        self.deref_edge(b);
        if self.autoreorder && self.node_count() > self.reorder_threshold {
            self.sift();
        }
        result
    }

    fn and_rec(&mut self, a: Edge, b: Edge) -> Edge {
        if a == Edge::ZERO || b == Edge::ZERO {
            return Edge::ZERO;
        }
        if a == Edge::ONE {
            self.ref_edge(b);
            return b;
        }
        if b == Edge::ONE {
            self.ref_edge(a);
            return a;
        }
        if a == b {
            self.ref_edge(a);
            return a;
        }
        if a == b.not() {
            return Edge::ZERO;
        }

        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&cached) = self.and_cache.get(&key) {
            self.ref_edge(cached);
            return cached;
        }

        let va = self.var(a.regular());
        let vb = self.var(b.regular());
        let level_a = self.level_of_var(va);
        let level_b = self.level_of_var(vb);
        let top_level = level_a.min(level_b);
        let top = if level_a == top_level { va } else { vb };

        let (a_hi, a_lo) = if level_a == top_level {
            (self.hi(a), self.lo(a))
        } else {
            (a, a)
        };
        let (b_hi, b_lo) = if level_b == top_level {
            (self.hi(b), self.lo(b))
        } else {
            (b, b)
        };

        let new_hi = self.and_rec(a_hi, b_hi);
        let new_lo = self.and_rec(a_lo, b_lo);
        let result = self.make_node(top, new_hi, new_lo);

        self.ref_edge(result);
        self.and_cache.insert(key, result);
        result
    }

    /// Logical OR, defined via De Morgan so the kernel carries a single
    /// recursive primitive (`and`); both operands' tags are flipped going in
    /// and the whole result is flipped coming out.
    pub fn or(&mut self, a: Edge, b: Edge) -> Edge {
        let r = self.and(a.not(), b.not());
        let result = r.not();
        self.ref_edge(result);
        self.deref_edge(r);
        result
    }

    fn cofactor(&self, e: Edge, y: VarId, branch_hi: bool) -> Edge {
        if self.is_constant(e) {
            return e;
        }
        let n = &self.nodes[e.regular().node().0 as usize];
        if n.var != y {
            return e;
        }
        let raw = if branch_hi { n.hi } else { n.lo };
        if e.is_complemented() {
            raw.not()
        } else {
            raw
        }
    }

    /// Swap the variables at two adjacent levels in place, preserving every
    /// externally held `Edge`/`NodeId`: nodes whose variable is the upper of
    /// the pair are rewritten in place to depend on the lower one, so a
    /// client holding one of those `Edge` values keeps pointing at the same
    /// (now relabeled) node. This never changes what function any root
    /// evaluates to.
    fn swap_adjacent(&mut self, level: u32) {
        let x = self.var_at_level[level as usize];
        let y = self.var_at_level[level as usize + 1];

        let targets: Vec<u32> = self
            .nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(idx, n)| self.refs[*idx] > 0 && n.var == x)
            .map(|(idx, _)| idx as u32)
            .collect();

        for idx in targets {
            let BddNode { hi, lo, .. } = self.nodes[idx as usize];
            let f11 = self.cofactor(hi, y, true);
            let f10 = self.cofactor(hi, y, false);
            let f01 = self.cofactor(lo, y, true);
            let f00 = self.cofactor(lo, y, false);

            self.ref_edge(f11);
            self.ref_edge(f01);
            let new_hi = self.make_node(x, f11, f01);
            self.ref_edge(f10);
            self.ref_edge(f00);
            let new_lo = self.make_node(x, f10, f00);

            let old_key = (x, hi, lo);
            self.unique.remove(&old_key);
            self.nodes[idx as usize] = BddNode {
                var: y,
                hi: new_hi,
                lo: new_lo,
            };
            self.unique.insert((y, new_hi, new_lo), idx);
            // Ownership of the old (hi, lo) pair was transferred into the
            // freshly built x-subnodes above; release the node's own hold on them.
            self.deref_edge(hi);
            self.deref_edge(lo);
        }

        self.var_at_level[level as usize] = y;
        self.var_at_level[level as usize + 1] = x;
        self.level_of[x as usize] = level + 1;
        self.level_of[y as usize] = level;
        self.clear_and_cache();
    }

    /// A lightweight sifting pass: for each adjacent pair of levels, swap
    /// them and keep the swap only if it does not increase the live node
    /// count. Not a full Rudell sift (no multi-level probing), but it is a
    /// real, in-place reduction that never changes the function represented
    /// by any root.
    fn sift(&mut self) {
        let var_count = self.var_at_level.len();
        if var_count < 2 {
            return;
        }
        let before = self.node_count();
        log::debug!("autoreorder: sifting {} live nodes", before);

        for level in 0..(var_count as u32 - 1) {
            let baseline = self.node_count();
            self.swap_adjacent(level);
            if self.node_count() > baseline {
                self.swap_adjacent(level);
            }
        }

        log::debug!("autoreorder: {} -> {} live nodes", before, self.node_count());
    }

    /// Render `root` (and everything reachable from it) as a Graphviz dot
    /// string, using `var_names` to label decision nodes and dashed edges
    /// for complemented children.
    pub fn as_dot_string(&self, root: Edge, var_names: &[String]) -> String {
        let mut buffer: Vec<u8> = Vec::new();
        dot_printer::print_bdd_as_dot(&mut buffer, self, root, var_names)
            .expect("cannot write BDD to .dot string");
        String::from_utf8(buffer).expect("invalid UTF-8 in .dot string")
    }
}

impl Default for Manager {
    fn default() -> Self {
        Manager::new()
    }
}
