//! Plain coefficient-map entry points.
//!
//! For callers that hold Ising `(h, J)` or QUBO `Q` maps rather than a
//! [`QuadraticModel`]. Each adapter builds the model, runs [`embed`] with the
//! given chain strength and exports the result. The target offset is
//! dropped, so the returned maps reproduce target energies only up to a
//! constant.

use crate::embed::{embed, EmbedConfig, EmbeddingSource};
use crate::embedding::Embedding;
use crate::error::EmbeddingError;
use crate::graph::TargetGraph;
use crate::model::QuadraticModel;
use crate::{Map, Variable};

/// Embed an Ising problem.
///
/// Returns the target linear biases and couplings. Every chain node appears
/// in the linear map, with zero bias if nothing was smeared onto it.
pub fn embed_ising<V, T>(
    h: &Map<V, f64>,
    j: &Map<(V, V), f64>,
    embedding: &Embedding<V, T>,
    target: &TargetGraph<T>,
    chain_strength: f64,
) -> Result<(Map<T, f64>, Map<(T, T), f64>), EmbeddingError>
where
    V: Variable,
    T: Variable,
{
    let source = QuadraticModel::from_ising(
        h.iter().map(|(v, &b)| (v.clone(), b)),
        j.iter().map(|((u, v), &b)| ((u.clone(), v.clone()), b)),
    );
    let config = EmbedConfig::default().with_chain_strength(chain_strength);
    let embedded = embed(&source, EmbeddingSource::mapping(embedding, target), &config)?;
    let (th, tj, _offset) = embedded.to_ising();
    Ok((th, tj))
}

/// Embed a QUBO.
///
/// Returns the target coefficients with linear biases on the diagonal.
pub fn embed_qubo<V, T>(
    q: &Map<(V, V), f64>,
    embedding: &Embedding<V, T>,
    target: &TargetGraph<T>,
    chain_strength: f64,
) -> Result<Map<(T, T), f64>, EmbeddingError>
where
    V: Variable,
    T: Variable,
{
    let source = QuadraticModel::from_qubo(q.iter().map(|((u, v), &b)| ((u.clone(), v.clone()), b)));
    let config = EmbedConfig::default().with_chain_strength(chain_strength);
    let embedded = embed(&source, EmbeddingSource::mapping(embedding, target), &config)?;
    let (tq, _offset) = embedded.to_qubo();
    Ok(tq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> TargetGraph<u32> {
        TargetGraph::from_edges([(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    fn embedding() -> Embedding<&'static str, u32> {
        [("a", vec![0]), ("b", vec![1]), ("c", vec![2, 3])].into_iter().collect()
    }

    #[test]
    fn test_embed_ising_triangle() {
        let h: Map<&str, f64> = Map::default();
        let j: Map<(&str, &str), f64> = [(("a", "b"), 1.0), (("b", "c"), 1.0), (("a", "c"), 1.0)]
            .into_iter()
            .collect();
        let (th, tj) = embed_ising(&h, &j, &embedding(), &square(), 1.0).unwrap();

        assert_eq!(th.len(), 4);
        assert!(th.values().all(|&b| b == 0.0));
        let expected: Map<(u32, u32), f64> = [((0, 1), 1.0), ((0, 3), 1.0), ((1, 2), 1.0), ((2, 3), -1.0)]
            .into_iter()
            .collect();
        assert_eq!(tj.len(), expected.len());
        for ((u, v), b) in &expected {
            let found = tj.get(&(*u, *v)).or_else(|| tj.get(&(*v, *u)));
            assert_eq!(found, Some(b), "coupling ({u}, {v})");
        }
    }

    #[test]
    fn test_embed_qubo_triangle() {
        let q: Map<(&str, &str), f64> = [(("a", "b"), 1.0), (("b", "c"), 1.0), (("a", "c"), 1.0)]
            .into_iter()
            .collect();
        let tq = embed_qubo(&q, &embedding(), &square(), 1.0).unwrap();

        assert_eq!(tq[&(0, 1)], 1.0);
        assert_eq!(tq[&(1, 2)], 1.0);
        assert_eq!(tq[&(0, 3)], 1.0);
        assert_eq!(tq[&(2, 3)], -4.0);
        assert_eq!(tq[&(0, 0)], 0.0);
        assert_eq!(tq[&(1, 1)], 0.0);
        assert_eq!(tq[&(2, 2)], 2.0);
        assert_eq!(tq[&(3, 3)], 2.0);
        assert_eq!(tq.len(), 8);
    }

    #[test]
    fn test_adapters_propagate_errors() {
        let q: Map<(&str, &str), f64> = [(("a", "z"), 1.0)].into_iter().collect();
        assert_eq!(
            embed_qubo(&q, &embedding(), &square(), 1.0),
            Err(EmbeddingError::MissingChain("\"z\"".into()))
        );
    }
}
