/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Forward transform: source model → target model.
//!
//! # Algorithm
//!
//! 1. **Offset** — carried over unchanged.
//! 2. **Linear smearing** — a source bias `b` on a chain of `n` nodes becomes
//!    `b / n` on every node of the chain.
//! 3. **Quadratic smearing** — a source coupling `b` between two chains joined
//!    by `k` target edges becomes `b / k` on each of those edges.
//! 4. **Chain penalties** — every intra-chain edge gets a ferromagnetic
//!    coupling of magnitude `chain_strength` (in spin units). The offset (spin)
//!    or the endpoint biases (binary) are shifted so that a chain whose nodes
//!    agree contributes exactly zero energy; every disagreeing edge costs
//!    `2 · chain_strength`.
//!
//! ```text
//! spin   :  −c · s_u · s_v  + c                      (offset)
//! binary :  −4c · x_u · x_v + 2c · x_u + 2c · x_v     (no offset)
//! ```
//!
//! All terms are visited in the model's insertion order, so the output is a
//! deterministic function of the inputs.
//!
//! # Errors
//!
//! Every failure is detected before the target model is returned:
//! [`EmbeddingError::MissingChain`], [`EmbeddingError::InvalidNode`] (mapping
//! source only), [`EmbeddingError::MissingEdge`] and
//! [`EmbeddingError::DisconnectedChain`].

use alloc::format;

use crate::embedding::Embedding;
use crate::error::EmbeddingError;
use crate::graph::TargetGraph;
use crate::model::{QuadraticModel, Vartype};
use crate::structure::EmbeddedStructure;
use crate::Variable;

// ─── Config ───────────────────────────────────────────────────────────────────

/// Tuning of the forward transform.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmbedConfig {
    /// Magnitude of the chain coupling, in spin units.
    ///
    /// A broken intra-chain edge costs `2 × chain_strength`. Default: 1.0.
    pub chain_strength: f64,

    /// Domain in which biases are smeared across chains.
    ///
    /// `None` smears in the source model's own vartype. Smearing a binary bias
    /// in spin space (or vice versa) gives a different, equally valid target
    /// model. Default: `None`.
    pub smear_domain: Option<Vartype>,
}

impl EmbedConfig {
    /// Replace the chain strength.
    pub fn with_chain_strength(mut self, chain_strength: f64) -> Self {
        self.chain_strength = chain_strength;
        self
    }

    /// Replace the smearing domain.
    pub fn with_smear_domain(mut self, smear_domain: Option<Vartype>) -> Self {
        self.smear_domain = smear_domain;
        self
    }
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            chain_strength: 1.0,
            smear_domain: None,
        }
    }
}

// ─── EmbeddingSource ──────────────────────────────────────────────────────────

/// Where the chains and their edges come from.
///
/// Either a structure indexed ahead of time (cheap to reuse across many
/// models) or a raw mapping plus the target graph, indexed per call.
#[derive(Debug)]
pub enum EmbeddingSource<'a, V: Variable, T: Variable> {
    /// A prebuilt [`EmbeddedStructure`].
    Structure(&'a EmbeddedStructure<V, T>),
    /// A raw embedding and the target graph it lives in.
    Mapping {
        /// Source variable → chain.
        embedding: &'a Embedding<V, T>,
        /// Target adjacency.
        target: &'a TargetGraph<T>,
    },
}

impl<'a, V: Variable, T: Variable> EmbeddingSource<'a, V, T> {
    /// Use a prebuilt structure.
    pub fn structure(structure: &'a EmbeddedStructure<V, T>) -> Self {
        Self::Structure(structure)
    }

    /// Index `embedding` against `target` on the fly.
    pub fn mapping(embedding: &'a Embedding<V, T>, target: &'a TargetGraph<T>) -> Self {
        Self::Mapping { embedding, target }
    }
}

impl<V: Variable, T: Variable> Clone for EmbeddingSource<'_, V, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: Variable, T: Variable> Copy for EmbeddingSource<'_, V, T> {}

impl<'a, V: Variable, T: Variable> From<&'a EmbeddedStructure<V, T>> for EmbeddingSource<'a, V, T> {
    fn from(structure: &'a EmbeddedStructure<V, T>) -> Self {
        Self::Structure(structure)
    }
}

// ─── embed ────────────────────────────────────────────────────────────────────

/// Embed `source` onto the target graph described by `embedding`.
///
/// The returned model has the source model's vartype. See the module
/// documentation for the transform and its errors.
pub fn embed<V, T>(
    source: &QuadraticModel<V>,
    embedding: EmbeddingSource<'_, V, T>,
    config: &EmbedConfig,
) -> Result<QuadraticModel<T>, EmbeddingError>
where
    V: Variable,
    T: Variable,
{
    match embedding {
        EmbeddingSource::Structure(structure) => embed_structure(source, structure, config),
        EmbeddingSource::Mapping { embedding, target } => {
            let structure = EmbeddedStructure::from_graph(target, embedding)?;
            embed_structure(source, &structure, config)
        }
    }
}

fn embed_structure<V, T>(
    source: &QuadraticModel<V>,
    structure: &EmbeddedStructure<V, T>,
    config: &EmbedConfig,
) -> Result<QuadraticModel<T>, EmbeddingError>
where
    V: Variable,
    T: Variable,
{
    if let Some(domain) = config.smear_domain {
        if domain != source.vartype() {
            let inner = config.clone().with_smear_domain(None);
            let converted = source.change_vartype(domain);
            let embedded = embed_structure(&converted, structure, &inner)?;
            return Ok(embedded.change_vartype(source.vartype()));
        }
    }

    let mut target: QuadraticModel<T> = source.empty();
    target.add_offset(source.offset());

    for (v, bias) in source.linear_terms() {
        let chain = structure
            .chain(v)
            .ok_or_else(|| EmbeddingError::MissingChain(format!("{v:?}")))?;
        let share = bias / chain.len() as f64;
        for node in chain {
            target.add_variable(node.clone(), share);
        }
    }

    for (u, v, bias) in source.quadratic_terms() {
        let edges = structure.interaction_edges(u, v);
        let count = edges.len();
        if count == 0 {
            return Err(EmbeddingError::MissingEdge(format!("{u:?}"), format!("{v:?}")));
        }
        let share = bias / count as f64;
        for (s, t) in edges {
            target.add_interaction(s.clone(), t.clone(), share);
        }
    }

    let strength = config.chain_strength;
    for (v, chain) in structure.chains() {
        // Singleton chains carry no penalty but must still appear.
        if let [node] = chain {
            target.add_variable(node.clone(), 0.0);
            continue;
        }
        tracing::trace!(variable = ?v, nodes = chain.len(), "adding chain penalty");
        for (p, q) in structure.chain_edges(v) {
            match target.vartype() {
                Vartype::Spin => {
                    target.add_interaction(p.clone(), q.clone(), -strength);
                    target.add_offset(strength);
                }
                Vartype::Binary => {
                    target.add_interaction(p.clone(), q.clone(), -4.0 * strength);
                    target.add_variable(p.clone(), 2.0 * strength);
                    target.add_variable(q.clone(), 2.0 * strength);
                }
            }
        }
    }

    tracing::debug!(
        vartype = target.vartype().name(),
        chain_strength = strength,
        source_variables = source.num_variables(),
        target_variables = target.num_variables(),
        target_interactions = target.num_interactions(),
        "embedded model"
    );

    Ok(target)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
