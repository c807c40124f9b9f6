//! # chain-embed
//!
//! Minor-embedding transforms for quadratic models.
//!
//! ---
//!
//! A quadratic model defined over a handful of *source* variables rarely fits
//! the sparse, fixed topology of the hardware graph that will sample it. The
//! usual remedy is a minor embedding: every source variable is represented by
//! a connected *chain* of target nodes, and the chain is held together by
//! strong ferromagnetic couplings.
//!
//! Finding the embedding is somebody else's job. This crate does the two
//! transforms around it:
//!
//! **Forward** — spread each source bias evenly over its chain, spread each
//! source interaction evenly over the target edges joining the two chains, and
//! add chain penalties whose net energy is exactly zero when a chain agrees.
//!
//! **Backward** — take samples from the target graph, resolve chains whose
//! nodes disagree with a pluggable policy, and recompute exact source-model
//! energies.
//!
//! ## The pipeline
//!
//! ```text
//! Embedding + TargetGraph → EmbeddedStructure → embed() → target model → sampler
//!                                                                           ↓
//!           source SampleBatch ← unembed() ← ChainBreakMethod ← target SampleBatch
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`model`] | [`QuadraticModel`], [`Vartype`] | Linear/quadratic/offset storage, vartype conversion, energies |
//! | [`graph`] | [`TargetGraph`] | Target adjacency with unique edge iteration |
//! | [`embedding`] | [`Embedding`] | Source variable → chain of target nodes |
//! | [`structure`] | [`EmbeddedStructure`] | Intra-chain / inter-chain edge index with connectivity check |
//! | [`embed`] | [`EmbeddingSource`], [`EmbedConfig`] | Forward transform with chain penalties |
//! | [`adapters`] | [`embed_ising`], [`embed_qubo`] | Plain coefficient-map bridges |
//! | [`chain_breaks`] | [`ChainBreakMethod`], [`MajorityVote`], [`Discard`] | Chain-break resolution policies |
//! | [`sampleset`] | [`SampleBatch`], [`Column`] | Samples, energies and per-row metadata |
//! | [`unembed`] | [`UnembedConfig`] | Backward transform, single- and multi-policy |
//!
//! ## Example
//!
//! ```rust
//! use chain_embed::{embed, EmbedConfig, Embedding, EmbeddingSource, QuadraticModel, TargetGraph};
//!
//! let source = QuadraticModel::from_ising(
//!     [("a", 0.0), ("b", 0.0), ("c", 0.0)],
//!     [(("a", "b"), 1.0), (("b", "c"), 1.0), (("a", "c"), 1.0)],
//! );
//!
//! let target = TargetGraph::from_edges([(0u32, 1), (1, 2), (2, 3), (3, 0)]);
//! let embedding: Embedding<&str, u32> =
//!     [("a", vec![0]), ("b", vec![1]), ("c", vec![2, 3])].into_iter().collect();
//!
//! let embedded = embed(
//!     &source,
//!     EmbeddingSource::mapping(&embedding, &target),
//!     &EmbedConfig::default(),
//! )
//! .unwrap();
//! assert_eq!(embedded.quadratic(&2, &3), Some(-1.0));
//! ```
//!
//! ## `no_std`
//!
//! The crate is `#![no_std]` with `alloc`. Enable `std` for std-only
//! conveniences, `serde` for serialisation of the public data types, and
//! `python-ffi` for the PyO3 bindings.
//!
//! ## License
//!
//! Business Source License 1.1.

#![cfg_attr(not(any(test, feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::hash_map::DefaultHashBuilder;

pub mod adapters;
pub mod chain_breaks;
pub mod embed;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod model;
pub mod sampleset;
pub mod structure;
pub mod unembed;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use adapters::{embed_ising, embed_qubo};
pub use chain_breaks::{broken_chains, ChainBreakMethod, ChainBreakStrategy, Discard, MajorityVote, Resolution};
pub use embed::{embed, EmbedConfig, EmbeddingSource};
pub use embedding::Embedding;
pub use error::{BatchError, EmbeddingError, UnembedError};
pub use graph::TargetGraph;
pub use model::{QuadraticModel, Vartype};
pub use sampleset::{Column, InfoValue, SampleBatch};
pub use structure::{build_structure, EmbeddedStructure};
pub use unembed::{unembed, unembed_many, UnembedConfig};

/// Insertion-ordered map used for every public collection.
///
/// Iteration order is what makes bias smearing and unembedding reproducible,
/// so nothing user-visible is keyed by an unordered map.
pub type Map<K, V> = indexmap::IndexMap<K, V, DefaultHashBuilder>;

/// Insertion-ordered set, the companion of [`Map`].
pub type Set<K> = indexmap::IndexSet<K, DefaultHashBuilder>;

/// Label of a source variable or target node.
///
/// Anything hashable, cloneable and printable qualifies: integers, strings,
/// tuples of those. Implemented automatically.
pub trait Variable: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Variable for T {}
