//! In-memory representation of a frozen computation graph.
//!
//! The graph is a flat map from node name to [`Node`]. Edges are stored on the
//! producer side only: a node lists the names of its consumers in `outbounds`.
//! Inbound lists are carried through (de)serialization for fidelity with the
//! on-disk IR but are never consulted here, since they can always be recovered
//! by scanning the other nodes' `outbounds`.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("node '{0}' is not present in the graph")]
    MissingNode(String),
}

/// Attributes attached to a node in the graph description.
///
/// `name` is the canonical identifier of the node and must equal the key under
/// which the node is stored in the owning [`Graph`]; weight-root derivation
/// rewrites this name.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeAttr {
    pub name: String,
    #[serde(rename = "type")]
    pub op_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_shape: Vec<Vec<i64>>,
}

/// A single operator or parameter node.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub attr: NodeAttr,
    #[serde(default)]
    pub inbounds: Vec<String>,
    #[serde(default)]
    pub outbounds: Vec<String>,
}

impl Node {
    pub fn new(name: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            attr: NodeAttr {
                name: name.into(),
                op_type: op_type.into(),
                output_shape: Vec::new(),
            },
            inbounds: Vec::new(),
            outbounds: Vec::new(),
        }
    }

    pub fn with_outbounds<I, S>(mut self, outbounds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outbounds = outbounds.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.attr.name
    }

    pub fn op_type(&self) -> &str {
        &self.attr.op_type
    }

    /// Identity nodes alias another node's value without transformation and
    /// never hold weights themselves.
    pub fn is_identity(&self) -> bool {
        self.attr.op_type == "Identity"
    }
}

/// A frozen computation graph, keyed by node name.
///
/// Deserializes directly from an IR-shaped JSON object of the form
/// `{"node_name": {"attr": {...}, "outbounds": [...]}, ...}`. Insertion order
/// is not meaningful; all lookups are by name.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Graph {
    nodes: HashMap<String, Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node under its canonical name, replacing any previous node
    /// stored under that name.
    pub fn insert(&mut self, node: Node) -> Option<Node> {
        self.nodes.insert(node.attr.name.clone(), node)
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Like [`Graph::get`] but also yields the stored key, which outlives the
    /// lookup name.
    pub fn get_entry(&self, name: &str) -> Option<(&str, &Node)> {
        self.nodes.get_key_value(name).map(|(k, v)| (k.as_str(), v))
    }

    /// Fails with [`GraphError::MissingNode`] when `name` is absent.
    pub fn node(&self, name: &str) -> Result<&Node, GraphError> {
        self.get(name)
            .ok_or_else(|| GraphError::MissingNode(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Names of nodes that no other node feeds into, sorted by name.
    ///
    /// These are the natural graph heads when the caller does not designate
    /// any. Derived by scanning `outbounds` rather than trusting the inbound
    /// lists.
    pub fn source_nodes(&self) -> Vec<&str> {
        let consumed: HashSet<&str> = self
            .nodes
            .values()
            .flat_map(|node| node.outbounds.iter().map(String::as_str))
            .collect();
        self.nodes
            .keys()
            .map(String::as_str)
            .filter(|name| !consumed.contains(name))
            .sorted()
            .collect()
    }
}

impl FromIterator<Node> for Graph {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut graph = Graph::new();
        for node in iter {
            graph.insert(node);
        }
        graph
    }
}
