//! Source variable → chain mapping.

use alloc::vec::Vec;

use crate::{Map, Variable};

/// Mapping from each source variable to its chain of target nodes.
///
/// Chains are ordered sequences; the position of a node in its chain is what
/// the [`EmbeddedStructure`](crate::EmbeddedStructure) index records. Chains
/// of different variables must not share nodes. That is caller error and is
/// not checked.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Embedding<V: Variable, T: Variable> {
    chains: Map<V, Vec<T>>,
}

impl<V: Variable, T: Variable> Embedding<V, T> {
    /// Empty embedding.
    pub fn new() -> Self {
        Self {
            chains: Map::default(),
        }
    }

    /// Set the chain of `v`, returning the previous one.
    pub fn insert(&mut self, v: V, chain: Vec<T>) -> Option<Vec<T>> {
        self.chains.insert(v, chain)
    }

    /// Chain of `v`.
    pub fn chain(&self, v: &V) -> Option<&[T]> {
        self.chains.get(v).map(Vec::as_slice)
    }

    /// Whether `v` has a chain.
    pub fn contains(&self, v: &V) -> bool {
        self.chains.contains_key(v)
    }

    /// `(variable, chain)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&V, &[T])> + '_ {
        self.chains.iter().map(|(v, c)| (v, c.as_slice()))
    }

    /// Number of embedded variables.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether no variable is embedded.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Length of the longest chain, 0 for an empty embedding.
    pub fn max_chain_length(&self) -> usize {
        self.chains.values().map(Vec::len).max().unwrap_or(0)
    }
}

impl<V: Variable, T: Variable> Default for Embedding<V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Variable, T: Variable> FromIterator<(V, Vec<T>)> for Embedding<V, T> {
    fn from_iter<I: IntoIterator<Item = (V, Vec<T>)>>(iter: I) -> Self {
        Self {
            chains: iter.into_iter().collect(),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
