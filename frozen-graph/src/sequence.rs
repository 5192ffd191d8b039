//! Deterministic execution ordering over a frozen graph.
//!
//! [`execution_order`] computes an iterative depth-first postorder suitable
//! for a directed acyclic graph with multiple independent entry nodes sharing
//! parts of the graph. Nodes are interned into an arena indexed by name, and
//! the traversal runs on two index-based stacks, so a deep graph never grows
//! the call stack.

use std::collections::HashMap;

use tracing::debug;

use crate::graph::{Graph, GraphError, Node};

/// Per-traversal arena mapping node names to dense indices.
///
/// Outbound edges are resolved to indices lazily, on the first visit of their
/// producer, so a dangling reference in an unreachable part of the graph never
/// trips the traversal.
struct Arena<'a> {
    names: Vec<&'a str>,
    nodes: Vec<&'a Node>,
    ids: HashMap<&'a str, usize>,
    seen: Vec<bool>,
    // outbound ids of a node, filled in when the node is first visited
    outbounds: Vec<Vec<usize>>,
}

impl<'a> Arena<'a> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            names: Vec::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            ids: HashMap::with_capacity(capacity),
            seen: Vec::with_capacity(capacity),
            outbounds: Vec::with_capacity(capacity),
        }
    }

    fn intern(&mut self, graph: &'a Graph, name: &str) -> Result<usize, GraphError> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }
        let (key, node) = graph
            .get_entry(name)
            .ok_or_else(|| GraphError::MissingNode(name.to_string()))?;
        let id = self.names.len();
        self.names.push(key);
        self.nodes.push(node);
        self.ids.insert(key, id);
        self.seen.push(false);
        self.outbounds.push(Vec::new());
        Ok(id)
    }
}

/// Computes a linear execution order covering every node reachable from
/// `heads`, each node exactly once, with every node appearing after all of its
/// producers.
///
/// Heads are processed in the given order and share one `seen` set, so a node
/// reachable from several heads (or via several paths) is emitted only once.
/// Cycles are neither detected nor rejected; on a cyclic input the output
/// order is unspecified but the traversal still terminates. A head or
/// traversal target absent from the graph fails with
/// [`GraphError::MissingNode`].
pub fn execution_order<'a>(
    graph: &'a Graph,
    heads: &[impl AsRef<str>],
) -> Result<Vec<&'a str>, GraphError> {
    let mut arena = Arena::with_capacity(graph.len());
    // pending visits
    let mut work: Vec<usize> = Vec::new();
    // current dependency path; the top is the deepest node still waiting for
    // one of its consumers to be emitted
    let mut open: Vec<usize> = Vec::new();
    // branches whose dependency chain has ended, last-resolved-first
    let mut finished: Vec<usize> = Vec::new();

    for head in heads {
        work.push(arena.intern(graph, head.as_ref())?);
        while let Some(v) = work.pop() {
            if arena.seen[v] {
                continue;
            }
            arena.seen[v] = true;
            let node = arena.nodes[v];
            let outs = node
                .outbounds
                .iter()
                .map(|name| arena.intern(graph, name))
                .collect::<Result<Vec<_>, _>>()?;
            work.extend(&outs);
            // close every open branch that does not feed the node being
            // visited; otherwise the open stack would keep growing across
            // disjoint paths
            while let Some(&top) = open.last() {
                if arena.outbounds[top].contains(&v) {
                    break;
                }
                open.pop();
                finished.push(top);
            }
            arena.outbounds[v] = outs;
            open.push(v);
        }
    }

    let order: Vec<&str> = open
        .iter()
        .chain(finished.iter().rev())
        .map(|&id| arena.names[id])
        .collect();
    debug!(
        heads = heads.len(),
        nodes = order.len(),
        "computed execution order"
    );
    Ok(order)
}
