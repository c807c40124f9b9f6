/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Embedded structure: the target graph's edges sorted by the chains they touch.
//!
//! Given the target edges and an [`Embedding`], every target edge falls in one
//! of three buckets:
//!
//! - **intra-chain**: both endpoints belong to the same chain. These edges
//!   carry the chain penalty and must connect the whole chain.
//! - **inter-chain**: the endpoints belong to two different chains. These
//!   edges realise the source interactions between the two variables.
//! - **unused**: at least one endpoint is outside every chain.
//!
//! The structure is built with one pass over the edges and is immutable
//! afterwards, so one instance can be shared across any number of embedding
//! calls (and threads).
//!
//! # Storage
//!
//! Nodes are stored as positions into their chain. For an ordered pair of
//! chains `(x, y)` the index keeps one position list per direction, appended
//! in lockstep: entry `k` of list `(x, y)` and entry `k` of list `(y, x)` are
//! the two endpoints of the same target edge, whichever direction the edge
//! was listed in.
//!
//! # Invariants
//!
//! - Every chain with more than one node is a single connected component of
//!   its intra-chain edges (checked with union-find over chain positions).
//! - No chain is empty.

use alloc::format;
use alloc::vec::Vec;
use core::iter::Zip;
use core::slice;

use hashbrown::{HashMap, HashSet};

use crate::embedding::Embedding;
use crate::error::EmbeddingError;
use crate::graph::TargetGraph;
use crate::{Map, Variable};

// ─── Union-find over chain positions ──────────────────────────────────────────

#[derive(Debug, Clone)]
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
    components: usize,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: alloc::vec![0; n],
            components: n,
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression.
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            core::cmp::Ordering::Less => self.parent[ra] = rb,
            core::cmp::Ordering::Greater => self.parent[rb] = ra,
            core::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        self.components -= 1;
    }
}

// ─── EmbeddedStructure ────────────────────────────────────────────────────────

/// Read-only index of intra-chain and inter-chain target edges.
#[derive(Clone, Debug)]
pub struct EmbeddedStructure<V: Variable, T: Variable> {
    /// Chains in embedding order; the map index is the chain's id.
    chains: Map<V, Vec<T>>,
    /// `chain_edges[x]`: position pairs of chain `x` joined by a target edge.
    chain_edges: Vec<Vec<(usize, usize)>>,
    /// `(x, y)` → positions in chain `x`, parallel with the `(y, x)` list.
    interactions: HashMap<(usize, usize), Vec<usize>>,
}

impl<V: Variable, T: Variable> EmbeddedStructure<V, T> {
    /// Index `target_edges` against `embedding`.
    ///
    /// Edges are scanned exactly once and in order. The edges form a set: a
    /// repeat of an edge, in either orientation, is skipped. Fails with [`EmbeddingError::MissingChain`] for an
    /// empty chain and [`EmbeddingError::DisconnectedChain`] for a chain the
    /// edges do not connect.
    pub fn new<I>(target_edges: I, embedding: &Embedding<V, T>) -> Result<Self, EmbeddingError>
    where
        I: IntoIterator<Item = (T, T)>,
    {
        let mut chains: Map<V, Vec<T>> = Map::default();
        let mut label: HashMap<T, (usize, usize)> = HashMap::new();
        for (x, (v, chain)) in embedding.iter().enumerate() {
            if chain.is_empty() {
                return Err(EmbeddingError::MissingChain(format!("{v:?}")));
            }
            for (i, q) in chain.iter().enumerate() {
                label.insert(q.clone(), (x, i));
            }
            chains.insert(v.clone(), chain.to_vec());
        }

        let mut forests: Vec<UnionFind> = chains.values().map(|c| UnionFind::new(c.len())).collect();
        let mut chain_edges: Vec<Vec<(usize, usize)>> = alloc::vec![Vec::new(); chains.len()];
        let mut interactions: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        let mut seen: HashSet<((usize, usize), (usize, usize))> = HashSet::new();

        for (s, t) in target_edges {
            let (Some(&(sx, si)), Some(&(ty, tj))) = (label.get(&s), label.get(&t)) else {
                continue;
            };
            if (sx, si) == (ty, tj) {
                continue;
            }
            let key = if (sx, si) < (ty, tj) { ((sx, si), (ty, tj)) } else { ((ty, tj), (sx, si)) };
            if !seen.insert(key) {
                continue;
            }
            if sx == ty {
                chain_edges[sx].push((si, tj));
                forests[sx].union(si, tj);
            } else {
                interactions.entry((sx, ty)).or_default().push(si);
                interactions.entry((ty, sx)).or_default().push(tj);
            }
        }

        for (x, (v, chain)) in chains.iter().enumerate() {
            if chain.len() > 1 && forests[x].components != 1 {
                return Err(EmbeddingError::DisconnectedChain(format!("{v:?}")));
            }
        }

        tracing::debug!(
            chains = chains.len(),
            chain_edges = chain_edges.iter().map(Vec::len).sum::<usize>(),
            interaction_edges = interactions.values().map(Vec::len).sum::<usize>() / 2,
            "built embedded structure"
        );

        Ok(Self {
            chains,
            chain_edges,
            interactions,
        })
    }

    /// Index the edges of `graph` against `embedding`.
    ///
    /// Unlike [`EmbeddedStructure::new`], every chain node must be a node of
    /// the graph; otherwise [`EmbeddingError::InvalidNode`] is returned.
    /// Each undirected edge is used once.
    pub fn from_graph(graph: &TargetGraph<T>, embedding: &Embedding<V, T>) -> Result<Self, EmbeddingError> {
        for (v, chain) in embedding.iter() {
            if let Some(node) = chain.iter().find(|q| !graph.contains_node(q)) {
                return Err(EmbeddingError::InvalidNode {
                    variable: format!("{v:?}"),
                    node: format!("{node:?}"),
                });
            }
        }
        Self::new(graph.edges().map(|(u, v)| (u.clone(), v.clone())), embedding)
    }

    // ── Chains ─────────────────────────────────────────────────────────────

    /// Chain of `v`.
    pub fn chain(&self, v: &V) -> Option<&[T]> {
        self.chains.get(v).map(Vec::as_slice)
    }

    /// `(variable, chain)` pairs in embedding order.
    pub fn chains(&self) -> impl Iterator<Item = (&V, &[T])> + '_ {
        self.chains.iter().map(|(v, c)| (v, c.as_slice()))
    }

    /// Whether `v` has a chain.
    pub fn contains(&self, v: &V) -> bool {
        self.chains.contains_key(v)
    }

    /// Number of chains.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether there are no chains.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    // ── Edge iterators ─────────────────────────────────────────────────────

    /// Target edges inside the chain of `v`, empty if `v` has no chain.
    ///
    /// Each call returns a fresh iterator; iterating never consumes the index.
    pub fn chain_edges(&self, v: &V) -> ChainEdges<'_, T> {
        match self.chains.get_full(v) {
            Some((x, _, chain)) => ChainEdges {
                chain: chain.as_slice(),
                edges: self.chain_edges[x].iter(),
            },
            None => {
                let none: &[(usize, usize)] = &[];
                ChainEdges {
                    chain: &[],
                    edges: none.iter(),
                }
            }
        }
    }

    /// Target edges joining the chains of `u` and `v`, as `(node of u, node of v)`.
    ///
    /// Empty if either variable has no chain or the chains never touch. Each
    /// call returns a fresh iterator.
    pub fn interaction_edges(&self, u: &V, v: &V) -> InteractionEdges<'_, T> {
        let found = self.chains.get_full(u).zip(self.chains.get_full(v)).and_then(|((x, _, cu), (y, _, cv))| {
            let forward = self.interactions.get(&(x, y))?;
            let backward = self.interactions.get(&(y, x))?;
            Some((cu.as_slice(), cv.as_slice(), forward, backward))
        });
        match found {
            Some((u_chain, v_chain, forward, backward)) => InteractionEdges {
                u_chain,
                v_chain,
                pairs: forward.iter().zip(backward.iter()),
            },
            None => {
                let none: &[usize] = &[];
                InteractionEdges {
                    u_chain: &[],
                    v_chain: &[],
                    pairs: none.iter().zip(none.iter()),
                }
            }
        }
    }
}

/// Build an [`EmbeddedStructure`] from raw target edges.
///
/// Shorthand for [`EmbeddedStructure::new`].
pub fn build_structure<V, T, I>(target_edges: I, embedding: &Embedding<V, T>) -> Result<EmbeddedStructure<V, T>, EmbeddingError>
where
    V: Variable,
    T: Variable,
    I: IntoIterator<Item = (T, T)>,
{
    EmbeddedStructure::new(target_edges, embedding)
}

// ─── Iterators ────────────────────────────────────────────────────────────────

/// Iterator over the target edges inside one chain.
#[derive(Clone, Debug)]
pub struct ChainEdges<'a, T> {
    chain: &'a [T],
    edges: slice::Iter<'a, (usize, usize)>,
}

impl<'a, T> Iterator for ChainEdges<'a, T> {
    type Item = (&'a T, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let &(i, j) = self.edges.next()?;
        Some((&self.chain[i], &self.chain[j]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.edges.size_hint()
    }
}

impl<T> ExactSizeIterator for ChainEdges<'_, T> {}

/// Iterator over the target edges joining two chains.
#[derive(Clone, Debug)]
pub struct InteractionEdges<'a, T> {
    u_chain: &'a [T],
    v_chain: &'a [T],
    pairs: Zip<slice::Iter<'a, usize>, slice::Iter<'a, usize>>,
}

impl<'a, T> Iterator for InteractionEdges<'a, T> {
    type Item = (&'a T, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let (&i, &j) = self.pairs.next()?;
        Some((&self.u_chain[i], &self.v_chain[j]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pairs.size_hint()
    }
}

impl<T> ExactSizeIterator for InteractionEdges<'_, T> {}

// ─── Tests ────────────────────────────────────────────────────────────────
