//! Python FFI bindings via PyO3.
//!
//! Exposes the coefficient-map entry points and single-policy unembedding to
//! Python. Labels may be Python `int` or `str`; dicts keep insertion order in
//! both directions.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! import chain_embed
//!
//! J = {("a", "b"): 1.0, ("b", "c"): 1.0, ("a", "c"): 1.0}
//! embedding = {"a": [0], "b": [1], "c": [2, 3]}
//! edges = [(0, 1), (1, 2), (2, 3), (3, 0)]
//!
//! th, tJ = chain_embed.embed_ising({}, J, embedding, edges, chain_strength=1.0)
//! print(tJ[(2, 3)])  # -1.0
//!
//! out = chain_embed.unembed(
//!     [[-1, -1, -1, -1], [-1, 1, 1, 1]], [0, 1, 2, 3], "SPIN",
//!     {}, J, embedding, chain_break_fraction=True,
//! )
//! print(out["samples"], out["chain_break_fraction"])
//! ```

#![allow(non_snake_case)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::adapters;
use crate::chain_breaks::ChainBreakStrategy;
use crate::embedding::Embedding;
use crate::graph::TargetGraph;
use crate::model::{QuadraticModel, Vartype};
use crate::sampleset::{Column, SampleBatch};
use crate::unembed::{unembed as unembed_batch, UnembedConfig, CHAIN_BREAK_FRACTION};
use crate::Map;

// ── Labels ───────────────────────────────────────────────────────────────────

/// Python-side variable label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, FromPyObject)]
enum Label {
    Int(i64),
    Str(String),
}

impl IntoPy<PyObject> for Label {
    fn into_py(self, py: Python<'_>) -> PyObject {
        match self {
            Label::Int(i) => i.into_py(py),
            Label::Str(s) => s.into_py(py),
        }
    }
}

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_vartype(name: &str) -> PyResult<Vartype> {
    match name.to_ascii_uppercase().as_str() {
        "SPIN" => Ok(Vartype::Spin),
        "BINARY" => Ok(Vartype::Binary),
        other => Err(PyValueError::new_err(format!(
            "vartype must be 'SPIN' or 'BINARY', got {other:?}"
        ))),
    }
}

fn parse_method(name: &str) -> PyResult<ChainBreakStrategy> {
    match name {
        "majority_vote" => Ok(ChainBreakStrategy::MajorityVote),
        "discard" => Ok(ChainBreakStrategy::Discard),
        other => Err(PyValueError::new_err(format!(
            "unknown chain_break_method {other:?}; expected 'majority_vote' or 'discard'"
        ))),
    }
}

fn to_embedding(chains: Map<Label, Vec<Label>>) -> Embedding<Label, Label> {
    chains.into_iter().collect()
}

// ── Functions ────────────────────────────────────────────────────────────────

/// Embed an Ising problem onto a target graph.
///
/// Args:
///     h:              dict label → linear bias
///     J:              dict (label, label) → coupling
///     embedding:      dict label → list of target nodes
///     edges:          list of (node, node) target edges
///     chain_strength: magnitude of the chain coupling (default 1.0)
///
/// Returns:
///     (target_h, target_J)
///
/// Raises:
///     ValueError: missing chain, node outside the target, missing edge or
///     disconnected chain.
#[pyfunction]
#[pyo3(signature = (h, J, embedding, edges, chain_strength=1.0))]
fn embed_ising(
    h: Map<Label, f64>,
    J: Map<(Label, Label), f64>,
    embedding: Map<Label, Vec<Label>>,
    edges: Vec<(Label, Label)>,
    chain_strength: f64,
) -> PyResult<(Map<Label, f64>, Map<(Label, Label), f64>)> {
    let target = TargetGraph::from_edges(edges);
    adapters::embed_ising(&h, &J, &to_embedding(embedding), &target, chain_strength).map_err(value_error)
}

/// Embed a QUBO onto a target graph.
///
/// Args:
///     Q:              dict (label, label) → coefficient, diagonal = linear
///     embedding:      dict label → list of target nodes
///     edges:          list of (node, node) target edges
///     chain_strength: magnitude of the chain coupling (default 1.0)
///
/// Returns:
///     target_Q
#[pyfunction]
#[pyo3(signature = (Q, embedding, edges, chain_strength=1.0))]
fn embed_qubo(
    Q: Map<(Label, Label), f64>,
    embedding: Map<Label, Vec<Label>>,
    edges: Vec<(Label, Label)>,
    chain_strength: f64,
) -> PyResult<Map<(Label, Label), f64>> {
    let target = TargetGraph::from_edges(edges);
    adapters::embed_qubo(&Q, &to_embedding(embedding), &target, chain_strength).map_err(value_error)
}

/// Unembed target samples onto the source variables.
///
/// The source model is given as linear biases, couplings and an offset in
/// `source_vartype`. Energies are recomputed in the samples' vartype.
///
/// Args:
///     samples:              list of rows, one value per target variable
///     variables:            target variable of each column
///     vartype:              'SPIN' or 'BINARY', domain of `samples`
///     linear:               dict label → linear bias of the source model
///     quadratic:            dict (label, label) → coupling of the source model
///     embedding:            dict label → list of target nodes
///     chain_break_method:   'majority_vote' (default) or 'discard'
///     chain_break_fraction: add the per-row broken fraction (default False)
///     offset:               source model offset (default 0.0)
///     source_vartype:       domain of the source coefficients (default 'SPIN')
///
/// Returns:
///     dict with keys 'variables', 'samples', 'energies' and, if requested,
///     'chain_break_fraction'.
#[pyfunction]
#[pyo3(signature = (
    samples,
    variables,
    vartype,
    linear,
    quadratic,
    embedding,
    chain_break_method="majority_vote",
    chain_break_fraction=false,
    offset=0.0,
    source_vartype="SPIN"
))]
#[allow(clippy::too_many_arguments)]
fn unembed(
    py: Python<'_>,
    samples: Vec<Vec<i8>>,
    variables: Vec<Label>,
    vartype: &str,
    linear: Map<Label, f64>,
    quadratic: Map<(Label, Label), f64>,
    embedding: Map<Label, Vec<Label>>,
    chain_break_method: &str,
    chain_break_fraction: bool,
    offset: f64,
    source_vartype: &str,
) -> PyResult<PyObject> {
    let vartype = parse_vartype(vartype)?;
    let policy = parse_method(chain_break_method)?;

    let mut source = QuadraticModel::new(parse_vartype(source_vartype)?);
    for (v, bias) in linear {
        source.add_variable(v, bias);
    }
    for ((u, v), bias) in quadratic {
        source.add_interaction(u, v, bias);
    }
    source.add_offset(offset);

    let energies = vec![0.0; samples.len()];
    let target = SampleBatch::from_samples(variables, samples, vartype, energies).map_err(value_error)?;
    let config = UnembedConfig::default().with_break_fraction(chain_break_fraction);
    let out = unembed_batch(&target, &to_embedding(embedding), &source, &policy, &config).map_err(value_error)?;

    let result = PyDict::new_bound(py);
    result.set_item("variables", out.variables().to_vec().into_py(py))?;
    result.set_item("samples", out.samples().to_vec())?;
    result.set_item("energies", out.energies().to_vec())?;
    if let Some(Column::Float(fractions)) = out.column(CHAIN_BREAK_FRACTION) {
        result.set_item(CHAIN_BREAK_FRACTION, fractions.clone())?;
    }
    Ok(result.into_py(py))
}

// ── Module entry point ────────────────────────────────────────────────────────

/// chain-embed Python bindings.
///
/// Minor-embedding transforms for Ising and QUBO problems: spread a problem
/// over chains of a target graph and map target samples back.
#[pymodule]
pub fn chain_embed(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(embed_ising, m)?)?;
    m.add_function(wrap_pyfunction!(embed_qubo, m)?)?;
    m.add_function(wrap_pyfunction!(unembed, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("CHAIN_BREAK_METHODS", vec!["majority_vote", "discard"])?;
    Ok(())
}
