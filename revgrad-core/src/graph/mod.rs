// The computation-graph arena and the iterative backward propagator.

pub mod grad_check;

use log::{debug, trace};

/// Stable handle to a scalar node inside a [`Graph`].
///
/// A `NodeId` is an index into the graph's arena. Handles are `Copy` and
/// compare by identity: two ids are equal iff they address the same node
/// storage. A handle is invalidated by [`Graph::clear`] or by a
/// [`Graph::reset`] to a mark taken before the node was created; using an
/// invalidated handle panics on the out-of-bounds arena access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// A backward edge: (operand node, local derivative weight).
///
/// The weight is the partial derivative of the owning node's value with
/// respect to the operand, evaluated at construction time. Edges never store
/// a deferred derivative function.
#[derive(Debug, Clone, Copy)]
struct Edge {
    target: NodeId,
    weight: f32,
}

/// An atomic differentiable value.
#[derive(Debug)]
struct Node {
    value: f32,
    grad: f32,
    /// Number of gradient contributions still expected before this node's
    /// accumulated gradient is final. Incremented once per use as an operand.
    unresolved: u32,
    edges: Vec<Edge>,
}

impl Node {
    fn leaf(value: f32) -> Self {
        Node {
            value,
            grad: 0.0,
            unresolved: 0,
            edges: Vec::new(),
        }
    }
}

/// Arena of scalar nodes forming one computation-graph generation.
///
/// Every node created by an operation is retained here until the caller
/// explicitly releases it via [`Graph::reset`] or [`Graph::clear`]; nothing
/// is reclaimed during forward construction. The graph is a single-writer,
/// single-threaded structure: forward construction appends nodes, backward
/// mutates `grad`/`unresolved` in place.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Graph { nodes: Vec::new() }
    }

    /// Number of live nodes in the current generation.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Creates a leaf node (no backward edges) holding `value`.
    pub fn leaf(&mut self, value: f32) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::leaf(value));
        id
    }

    pub fn value(&self, id: NodeId) -> f32 {
        self.nodes[id.0].value
    }

    pub fn grad(&self, id: NodeId) -> f32 {
        self.nodes[id.0].grad
    }

    /// Overwrites a node's value in place. Edge weights recorded by earlier
    /// operations are not recomputed; this is intended for leaf nodes
    /// (parameter updates) at generation boundaries.
    pub fn set_value(&mut self, id: NodeId, value: f32) {
        self.nodes[id.0].value = value;
    }

    pub fn set_grad(&mut self, id: NodeId, grad: f32) {
        self.nodes[id.0].grad = grad;
    }

    /// Pending gradient contributions for `id` (introspection, mainly tests).
    pub fn unresolved(&self, id: NodeId) -> u32 {
        self.nodes[id.0].unresolved
    }

    /// Number of backward edges recorded on `id`.
    pub fn edge_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].edges.len()
    }

    /// Records a backward edge from `result` to `operand` and reserves one
    /// gradient contribution on the operand.
    fn attach(&mut self, result: NodeId, operand: NodeId, weight: f32) {
        self.nodes[result.0].edges.push(Edge {
            target: operand,
            weight,
        });
        self.nodes[operand.0].unresolved += 1;
    }

    fn binary(&mut self, a: NodeId, b: NodeId, value: f32, wa: f32, wb: f32) -> NodeId {
        let c = self.leaf(value);
        self.attach(c, a, wa);
        self.attach(c, b, wb);
        c
    }

    fn unary(&mut self, x: NodeId, value: f32, weight: f32) -> NodeId {
        let y = self.leaf(value);
        self.attach(y, x, weight);
        y
    }

    // --- Scalar operations ---

    /// c = a + b; dc/da = 1, dc/db = 1.
    pub fn add(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (va, vb) = (self.value(a), self.value(b));
        self.binary(a, b, va + vb, 1.0, 1.0)
    }

    /// c = a - b; dc/da = 1, dc/db = -1.
    pub fn sub(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (va, vb) = (self.value(a), self.value(b));
        self.binary(a, b, va - vb, 1.0, -1.0)
    }

    /// c = a * b; dc/da = b, dc/db = a.
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (va, vb) = (self.value(a), self.value(b));
        self.binary(a, b, va * vb, vb, va)
    }

    /// c = a / b; dc/da = 1/b, dc/db = -a/b².
    pub fn div(&mut self, a: NodeId, b: NodeId) -> NodeId {
        let (va, vb) = (self.value(a), self.value(b));
        self.binary(a, b, va / vb, 1.0 / vb, -va / (vb * vb))
    }

    /// Negation, expressed as 0 - x.
    pub fn neg(&mut self, x: NodeId) -> NodeId {
        let zero = self.leaf(0.0);
        self.sub(zero, x)
    }

    /// y = e^x; dy/dx = e^x (reuses the output value).
    pub fn exp(&mut self, x: NodeId) -> NodeId {
        let v = self.value(x).exp();
        self.unary(x, v, v)
    }

    /// y = max(0, x); dy/dx = 1 if x > 0 else 0 (subgradient at 0 is 0).
    pub fn relu(&mut self, x: NodeId) -> NodeId {
        let vx = self.value(x);
        let v = if vx > 0.0 { vx } else { 0.0 };
        let w = if vx > 0.0 { 1.0 } else { 0.0 };
        self.unary(x, v, w)
    }

    /// y = ln(x); dy/dx = 1/x. A non-positive input yields NaN/-inf, which
    /// propagates unguarded.
    pub fn ln(&mut self, x: NodeId) -> NodeId {
        let vx = self.value(x);
        self.unary(x, vx.ln(), 1.0 / vx)
    }

    /// Fan-in sum: y = Σ xs, one edge of weight 1 per addend.
    pub fn sum_of(&mut self, xs: &[NodeId]) -> NodeId {
        let value = xs.iter().map(|&x| self.value(x)).sum();
        let y = self.leaf(value);
        for &x in xs {
            self.attach(y, x, 1.0);
        }
        y
    }

    /// Fan-in maximum over a non-empty slice: y = max(xs).
    ///
    /// Each of the k inputs tied at the maximum receives an edge of weight
    /// 1/k, so ties split the incoming gradient equally; non-maximal inputs
    /// receive no edge at all.
    pub fn max_of(&mut self, xs: &[NodeId]) -> NodeId {
        let m = xs
            .iter()
            .map(|&x| self.value(x))
            .fold(f32::NEG_INFINITY, f32::max);
        let tied = xs.iter().filter(|&&x| self.value(x) == m).count();
        let w = 1.0 / tied as f32;
        let y = self.leaf(m);
        for &x in xs {
            if self.value(x) == m {
                self.attach(y, x, w);
            }
        }
        y
    }

    // --- Backward propagation ---

    /// Backward pass seeded with gradient 1 (root is a loss).
    pub fn backward(&mut self, root: NodeId) {
        self.backward_seeded(root, 1.0);
    }

    /// Distributes `seed` from `root` toward the leaves.
    ///
    /// Uses an explicit worklist, never recursion: graphs built by sequential
    /// accumulation can be tens of thousands of nodes deep. A popped node
    /// accumulates the incoming gradient and consumes one reservation from
    /// its `unresolved` count (floored at 0); only once every reservation has
    /// been consumed does it forward `grad * weight` along each backward
    /// edge. Because each use as an operand reserved exactly one
    /// contribution, a node's gradient is final before it propagates, with no
    /// separate topological sort.
    ///
    /// Must not be invoked twice on the same generation without an
    /// intervening gradient reset, or gradients double-accumulate.
    pub fn backward_seeded(&mut self, root: NodeId, seed: f32) {
        trace!("backward: seeding node {} with {}", root.0, seed);
        let mut stack = vec![(root, seed)];
        while let Some((id, incoming)) = stack.pop() {
            let (resolved, grad) = {
                let node = &mut self.nodes[id.0];
                node.grad += incoming;
                node.unresolved = node.unresolved.saturating_sub(1);
                (node.unresolved == 0, node.grad)
            };
            if resolved {
                for edge in &self.nodes[id.0].edges {
                    stack.push((edge.target, grad * edge.weight));
                }
            }
        }
    }

    // --- Generation management ---

    /// Returns a boundary for [`Graph::reset`]: everything created after this
    /// call belongs to the next generation.
    pub fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Releases every node created after `mark` and returns the survivors to
    /// leaf state: edges cleared, unresolved counts zeroed, values and
    /// gradients kept. Handles to post-mark nodes are invalidated. Only safe
    /// at a generation boundary, before any new nodes are built.
    pub fn reset(&mut self, mark: usize) {
        debug!(
            "graph reset: retaining {} nodes, dropping {}",
            mark,
            self.nodes.len().saturating_sub(mark)
        );
        self.nodes.truncate(mark);
        for node in &mut self.nodes {
            node.unresolved = 0;
            node.edges.clear();
        }
    }

    /// Drops the entire arena, invalidating every outstanding handle.
    pub fn clear(&mut self) {
        debug!("graph clear: dropping {} nodes", self.nodes.len());
        self.nodes.clear();
    }
}

// --- Tests ---
