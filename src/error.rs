//! Error types for the embedding transforms.
//!
//! Construction and embedding errors are fatal: the whole transform aborts
//! and no partial target model is returned. Chain breaks found while
//! unembedding are never errors; they are resolved by the configured
//! [`ChainBreakMethod`](crate::ChainBreakMethod).
//!
//! Variable and node labels are captured with their `Debug` rendering so the
//! error enums stay free of the label type parameters.

use alloc::string::String;

use thiserror::Error;

/// Failure to build an embedded structure or to embed a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmbeddingError {
    /// A model variable has no chain in the embedding, or its chain is empty.
    #[error("source variable {0} has no chain in the embedding")]
    MissingChain(String),

    /// A chain references a node that is not part of the target graph.
    #[error("chain for {variable} contains node {node}, which is not in the target graph")]
    InvalidNode {
        /// Source variable owning the chain.
        variable: String,
        /// Offending target node.
        node: String,
    },

    /// No target edge joins the chains of two interacting source variables.
    #[error("no target edge connects the chains of {0} and {1}")]
    MissingEdge(String, String),

    /// A chain's nodes are not joined into one component by target edges.
    #[error("chain for {0} is not connected in the target graph")]
    DisconnectedChain(String),

    /// The embedding does not cover the variables being unembedded.
    #[error("embedding does not match the source model: {0}")]
    Mismatch(String),
}

/// Shape violation while assembling a [`SampleBatch`](crate::SampleBatch).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// A sample row does not have one value per variable.
    #[error("row {row} has {found} values, expected {expected}")]
    RowWidth {
        /// Index of the offending row.
        row: usize,
        /// Number of variables in the batch.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// The energy vector does not have one entry per row.
    #[error("expected {expected} energies, found {found}")]
    EnergyCount {
        /// Number of rows.
        expected: usize,
        /// Number of energies supplied.
        found: usize,
    },

    /// A per-row column does not have one entry per row.
    #[error("column {name} has {found} entries, expected {expected}")]
    ColumnLength {
        /// Column name.
        name: String,
        /// Number of rows.
        expected: usize,
        /// Number of entries in the column.
        found: usize,
    },

    /// A row index is out of range.
    #[error("row index {index} is out of range for {len} rows")]
    RowIndex {
        /// Offending index.
        index: usize,
        /// Number of rows.
        len: usize,
    },

    /// `sample` and `energy` are stored natively and cannot be columns.
    #[error("column name {0} is reserved")]
    ReservedColumn(String),

    /// Batches being concatenated disagree on variables, vartype or columns.
    #[error("cannot concatenate batches: {0}")]
    Incompatible(String),
}

/// Failure of an unembedding run.
///
/// `E` is the error type of the chain-break policy; it is passed through
/// untouched in [`UnembedError::ChainBreak`].
#[derive(Debug, Error)]
pub enum UnembedError<E> {
    /// The embedding does not match the source model or the target batch.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// The resolved samples could not be assembled into a batch.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// The chain-break policy itself failed.
    #[error("chain-break resolution failed: {0}")]
    ChainBreak(E),
}
