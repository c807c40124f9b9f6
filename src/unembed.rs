//! Backward transform: target samples → source samples.
//!
//! [`unembed`] runs one chain-break policy; [`unembed_many`] runs several
//! over the same batch and stacks the results, tagging each row with the
//! position of the policy that produced it.
//!
//! Per run:
//!
//! 1. Collect each source variable's chain, in model order, as column indices
//!    of the target batch.
//! 2. Hand the whole sample matrix to the policy once.
//! 3. Recompute every retained row's energy against the source model
//!    (converted to the batch vartype when they differ).
//! 4. Re-align the target batch's per-row columns to the retained rows and
//!    copy its info.
//!
//! A policy that keeps no rows yields an empty batch with the same column
//! names and types as a non-empty result.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::chain_breaks::{broken_chains, ChainBreakMethod};
use crate::embedding::Embedding;
use crate::error::{BatchError, EmbeddingError, UnembedError};
use crate::model::QuadraticModel;
use crate::sampleset::{Column, InfoValue, SampleBatch};
use crate::{Map, Variable};

/// Per-row column holding the fraction of chains broken in the target row.
pub const CHAIN_BREAK_FRACTION: &str = "chain_break_fraction";

/// Per-row column holding the index of the policy that produced the row.
pub const CHAIN_BREAK_METHOD: &str = "chain_break_method";

/// Info key under which the embedding and the policy name are recorded.
pub const EMBEDDING_CONTEXT: &str = "embedding_context";

// ─── Config ───────────────────────────────────────────────────────────────────

/// Optional annotations added to unembedded batches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnembedConfig {
    /// Add the [`CHAIN_BREAK_FRACTION`] float column. Default: false.
    pub include_break_fraction: bool,

    /// Add the [`EMBEDDING_CONTEXT`] info entry. Default: false.
    pub include_embedding: bool,
}

impl UnembedConfig {
    /// Toggle the chain-break fraction column.
    pub fn with_break_fraction(mut self, on: bool) -> Self {
        self.include_break_fraction = on;
        self
    }

    /// Toggle the embedding context annotation.
    pub fn with_embedding(mut self, on: bool) -> Self {
        self.include_embedding = on;
        self
    }
}

// ─── unembed ──────────────────────────────────────────────────────────────────

/// Unembed `target` with a single chain-break policy.
///
/// The result ranges over the variables of `source`, in model order, and
/// carries the target batch's vartype.
///
/// # Errors
///
/// - [`EmbeddingError::Mismatch`] if a source variable has no (or an empty)
///   chain, or a chain node is not a variable of `target`.
/// - [`UnembedError::ChainBreak`] if the policy fails.
/// - [`UnembedError::Batch`] if the policy returns rows of the wrong width or
///   out-of-range row indices.
pub fn unembed<V, T, P>(
    target: &SampleBatch<T>,
    embedding: &Embedding<V, T>,
    source: &QuadraticModel<V>,
    policy: &P,
    config: &UnembedConfig,
) -> Result<SampleBatch<V>, UnembedError<P::Error>>
where
    V: Variable,
    T: Variable,
    P: ChainBreakMethod + ?Sized,
{
    let variables: Vec<V> = source.variables().cloned().collect();
    let chains = chain_columns(target, embedding, &variables)?;

    let resolution = policy
        .resolve(target.samples(), target.vartype(), &chains)
        .map_err(UnembedError::ChainBreak)?;
    if let Some((row, values)) = resolution
        .samples
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != variables.len())
    {
        return Err(BatchError::RowWidth {
            row,
            expected: variables.len(),
            found: values.len(),
        }
        .into());
    }

    let converted;
    let model = if source.vartype() == target.vartype() {
        source
    } else {
        converted = source.change_vartype(target.vartype());
        &converted
    };
    let energies = model.energies(&variables, &resolution.samples)?;

    let mut out = target.remap(variables, resolution.samples, energies, &resolution.retained)?;

    if config.include_break_fraction {
        let broken = broken_chains(target.samples(), &chains);
        let fractions = resolution
            .retained
            .iter()
            .map(|&r| break_fraction(&broken[r]))
            .collect();
        out.insert_column(CHAIN_BREAK_FRACTION, Column::Float(fractions))?;
    }

    if config.include_embedding {
        let context = embedding_context(out.variables(), embedding, InfoValue::Text(policy.name().into()));
        out.insert_info(EMBEDDING_CONTEXT, context);
    }

    tracing::debug!(
        policy = policy.name(),
        chains = chains.len(),
        longest_chain = embedding.max_chain_length(),
        rows_in = target.len(),
        rows_out = out.len(),
        "unembedded sample batch"
    );

    Ok(out)
}

/// Unembed `target` once per policy and stack the results in policy order.
///
/// Every row gets an integer [`CHAIN_BREAK_METHOD`] entry holding the index
/// of its policy in `policies`. With `include_embedding`, the recorded
/// policy name is the list of every policy name. The first failing run
/// aborts the whole call with its error unchanged; an empty `policies`
/// slice is a [`BatchError::Incompatible`].
pub fn unembed_many<V, T, P>(
    target: &SampleBatch<T>,
    embedding: &Embedding<V, T>,
    source: &QuadraticModel<V>,
    policies: &[P],
    config: &UnembedConfig,
) -> Result<SampleBatch<V>, UnembedError<P::Error>>
where
    V: Variable,
    T: Variable,
    P: ChainBreakMethod,
{
    let mut runs = Vec::with_capacity(policies.len());
    for (index, policy) in policies.iter().enumerate() {
        let mut run = unembed(target, embedding, source, policy, config)?;
        let tag = Column::Int(vec![index as i64; run.len()]);
        run.insert_column(CHAIN_BREAK_METHOD, tag)?;
        runs.push(run);
    }

    let mut out = SampleBatch::concatenate(runs)?;
    if config.include_embedding {
        let names = policies.iter().map(|p| InfoValue::Text(p.name().into())).collect();
        let context = embedding_context(out.variables(), embedding, InfoValue::List(names));
        out.insert_info(EMBEDDING_CONTEXT, context);
    }
    Ok(out)
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Column indices in `target` of each variable's chain.
fn chain_columns<V, T>(
    target: &SampleBatch<T>,
    embedding: &Embedding<V, T>,
    variables: &[V],
) -> Result<Vec<Vec<usize>>, EmbeddingError>
where
    V: Variable,
    T: Variable,
{
    let index: HashMap<&T, usize> = target.variables().iter().enumerate().map(|(i, q)| (q, i)).collect();
    variables
        .iter()
        .map(|v| -> Result<Vec<usize>, EmbeddingError> {
            let chain = embedding
                .chain(v)
                .filter(|chain| !chain.is_empty())
                .ok_or_else(|| EmbeddingError::Mismatch(format!("source variable {v:?} has no chain")))?;
            chain
                .iter()
                .map(|q| {
                    index.get(q).copied().ok_or_else(|| {
                        EmbeddingError::Mismatch(format!("chain node {q:?} of {v:?} is not a sampled variable"))
                    })
                })
                .collect()
        })
        .collect()
}

fn break_fraction(broken: &[bool]) -> f64 {
    if broken.is_empty() {
        return 0.0;
    }
    broken.iter().filter(|&&b| b).count() as f64 / broken.len() as f64
}

fn embedding_context<V, T>(variables: &[V], embedding: &Embedding<V, T>, method: InfoValue) -> InfoValue
where
    V: Variable,
    T: Variable,
{
    let chains: Map<String, InfoValue> = variables
        .iter()
        .filter_map(|v| {
            let chain = embedding.chain(v)?;
            let nodes = chain.iter().map(|q| InfoValue::Text(format!("{q:?}"))).collect();
            Some((format!("{v:?}"), InfoValue::List(nodes)))
        })
        .collect();
    let mut context = Map::default();
    context.insert(String::from("embedding"), InfoValue::Map(chains));
    context.insert(String::from("chain_break_method"), method);
    InfoValue::Map(context)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
