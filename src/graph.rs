//! Target-graph adjacency.
//!
//! The target graph is fixed infrastructure: the hardware topology a sampler
//! can natively couple. Only node membership and edge existence matter to the
//! transforms; nothing here validates the topology beyond that.

use alloc::vec::Vec;

use crate::{Map, Set, Variable};

/// Undirected graph stored as node → neighbour set.
///
/// Self-loops are ignored. Nodes and neighbours iterate in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetGraph<T: Variable> {
    adjacency: Map<T, Set<T>>,
}

impl<T: Variable> TargetGraph<T> {
    /// Empty graph.
    pub fn new() -> Self {
        Self {
            adjacency: Map::default(),
        }
    }

    /// Graph containing exactly the endpoints of `edges`.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (T, T)>,
    {
        let mut graph = Self::new();
        for (u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    /// Graph from an adjacency listing. Edges are symmetrised.
    pub fn from_adjacency<I, N>(adjacency: I) -> Self
    where
        I: IntoIterator<Item = (T, N)>,
        N: IntoIterator<Item = T>,
    {
        let mut graph = Self::new();
        for (u, neighbours) in adjacency {
            graph.add_node(u.clone());
            for v in neighbours {
                graph.add_edge(u.clone(), v);
            }
        }
        graph
    }

    /// Add an isolated node (no-op if present).
    pub fn add_node(&mut self, node: T) {
        self.adjacency.entry(node).or_default();
    }

    /// Add the undirected edge `u — v`. Both nodes are created if needed.
    pub fn add_edge(&mut self, u: T, v: T) {
        if u == v {
            self.add_node(u);
            return;
        }
        self.adjacency.entry(u.clone()).or_default().insert(v.clone());
        self.adjacency.entry(v).or_default().insert(u);
    }

    /// Whether `node` is in the graph.
    pub fn contains_node(&self, node: &T) -> bool {
        self.adjacency.contains_key(node)
    }

    /// Whether the edge `u — v` exists.
    pub fn contains_edge(&self, u: &T, v: &T) -> bool {
        self.adjacency.get(u).is_some_and(|n| n.contains(v))
    }

    /// Neighbours of `node`, empty if the node is absent.
    pub fn neighbors<'a>(&'a self, node: &T) -> impl Iterator<Item = &'a T> + 'a {
        self.adjacency.get(node).into_iter().flat_map(|n| n.iter())
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &T> + '_ {
        self.adjacency.keys()
    }

    /// Every undirected edge exactly once.
    ///
    /// An edge is reported from the endpoint that was inserted first, so the
    /// sequence is a deterministic function of construction order.
    pub fn edges(&self) -> impl Iterator<Item = (&T, &T)> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(i, (u, neighbours))| {
            neighbours.iter().filter_map(move |v| match self.adjacency.get_index_of(v) {
                Some(j) if j > i => Some((u, v)),
                _ => None,
            })
        })
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    pub fn num_edges(&self) -> usize {
        self.adjacency.values().map(|n| n.len()).sum::<usize>() / 2
    }

    /// Owned copy of [`TargetGraph::edges`].
    pub fn edge_list(&self) -> Vec<(T, T)> {
        self.edges().map(|(u, v)| (u.clone(), v.clone())).collect()
    }
}

impl<T: Variable> Default for TargetGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}
