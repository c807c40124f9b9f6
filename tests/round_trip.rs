//! End-to-end embed → sample → unembed properties.
//!
//! Instances are complete source graphs whose variables sit on path chains;
//! every pair of chains touches at its first node, so any coupling can be
//! embedded.

use chain_embed::unembed::{CHAIN_BREAK_FRACTION, CHAIN_BREAK_METHOD};
use chain_embed::{
    embed, unembed, unembed_many, ChainBreakStrategy, Column, Discard, EmbedConfig, Embedding, EmbeddingSource,
    MajorityVote, QuadraticModel, SampleBatch, TargetGraph, UnembedConfig, Vartype,
};
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn instance(lengths: &[usize]) -> (Embedding<usize, usize>, TargetGraph<usize>) {
    let mut embedding = Embedding::new();
    let mut graph = TargetGraph::new();
    let mut next = 0;
    let mut heads = Vec::new();
    for (v, &len) in lengths.iter().enumerate() {
        let chain: Vec<usize> = (next..next + len).collect();
        next += len;
        graph.add_node(chain[0]);
        for pair in chain.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        heads.push(chain[0]);
        embedding.insert(v, chain);
    }
    for (i, &u) in heads.iter().enumerate() {
        for &w in &heads[i + 1..] {
            graph.add_edge(u, w);
        }
    }
    (embedding, graph)
}

fn complete_model(n: usize, linear: &[f64], quadratic: &[f64], vartype: Vartype) -> QuadraticModel<usize> {
    let mut model = QuadraticModel::new(vartype);
    for v in 0..n {
        model.add_variable(v, linear[v]);
    }
    let mut k = 0;
    for u in 0..n {
        for v in u + 1..n {
            model.add_interaction(u, v, quadratic[k]);
            k += 1;
        }
    }
    model.add_offset(0.25);
    model
}

fn assignment(n: usize, mask: u32, vartype: Vartype) -> Vec<i8> {
    let [lo, hi] = vartype.values();
    (0..n).map(|i| if (mask >> i) & 1 == 1 { hi } else { lo }).collect()
}

/// Target row in `graph` node order with every chain set to its source value.
fn spread(embedding: &Embedding<usize, usize>, graph: &TargetGraph<usize>, values: &[i8]) -> Vec<i8> {
    let mut row = vec![0; graph.num_nodes()];
    let nodes: Vec<usize> = graph.nodes().copied().collect();
    for (v, chain) in embedding.iter() {
        for q in chain {
            let col = nodes.iter().position(|n| n == q).unwrap();
            row[col] = values[*v];
        }
    }
    row
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

// ── Fixed examples ───────────────────────────────────────────────────────────

#[test]
fn test_triangle_on_square_round_trip() {
    let source = QuadraticModel::from_ising([], [(("a", "b"), -1.0), (("b", "c"), -1.0), (("a", "c"), -1.0)]);
    let embedding: Embedding<&str, u32> = [("a", vec![0, 1]), ("b", vec![2]), ("c", vec![3])].into_iter().collect();
    let target = TargetGraph::from_edges([(0, 1), (1, 2), (2, 3), (3, 0)]);

    let embedded = embed(&source, EmbeddingSource::mapping(&embedding, &target), &EmbedConfig::default()).unwrap();
    assert_eq!(embedded.quadratic(&0, &1), Some(-1.0));

    let nodes: Vec<u32> = embedded.variables().copied().collect();
    let rows = vec![vec![1, 1, 1, 1], vec![-1, 1, -1, -1]];
    let energies = embedded.energies(&nodes, &rows).unwrap();
    let batch = SampleBatch::from_samples(nodes, rows, Vartype::Spin, energies).unwrap();

    let config = UnembedConfig::default().with_break_fraction(true);
    let out = unembed(&batch, &embedding, &source, &MajorityVote, &config).unwrap();
    assert_eq!(out.samples(), &[vec![1, 1, 1], vec![1, -1, -1]]);
    assert_eq!(out.energies(), &[-3.0, 1.0]);
    assert_eq!(out.column(CHAIN_BREAK_FRACTION), Some(&Column::Float(vec![0.0, 1.0 / 3.0])));

    let kept = unembed(&batch, &embedding, &source, &Discard, &config).unwrap();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept.first(), Some((&[1i8, 1, 1][..], -3.0)));
}

// ── Properties ───────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn test_agreeing_chains_round_trip(
        lengths in prop::collection::vec(1usize..4, 2..=5),
        linear in prop::collection::vec(-2.0f64..2.0, 5),
        quadratic in prop::collection::vec(-2.0f64..2.0, 10),
        mask in 0u32..32,
        chain_strength in 0.1f64..5.0,
        binary in any::<bool>(),
        smear in 0u8..3,
    ) {
        let n = lengths.len();
        let vartype = if binary { Vartype::Binary } else { Vartype::Spin };
        let smear_domain = match smear {
            0 => None,
            1 => Some(Vartype::Spin),
            _ => Some(Vartype::Binary),
        };
        let source = complete_model(n, &linear, &quadratic, vartype);
        let (embedding, graph) = instance(&lengths);
        let config = EmbedConfig::default()
            .with_chain_strength(chain_strength)
            .with_smear_domain(smear_domain);
        let embedded = embed(&source, EmbeddingSource::mapping(&embedding, &graph), &config).unwrap();
        prop_assert_eq!(embedded.vartype(), vartype);

        let values = assignment(n, mask, vartype);
        let variables: Vec<usize> = (0..n).collect();
        let source_energy = source.energy(&variables, &values).unwrap();

        let nodes: Vec<usize> = graph.nodes().copied().collect();
        let row = spread(&embedding, &graph, &values);
        let target_energy = embedded.energy(&nodes, &row).unwrap();
        prop_assert!(close(source_energy, target_energy), "{} vs {}", source_energy, target_energy);

        let batch = SampleBatch::from_samples(nodes, vec![row], vartype, vec![target_energy]).unwrap();
        let out = unembed(
            &batch,
            &embedding,
            &source,
            &MajorityVote,
            &UnembedConfig::default().with_break_fraction(true),
        )
        .unwrap();
        prop_assert_eq!(out.samples(), &[values][..]);
        prop_assert_eq!(out.energies()[0], source_energy);
        prop_assert_eq!(out.column(CHAIN_BREAK_FRACTION), Some(&Column::Float(vec![0.0])));
    }

    #[test]
    fn test_arbitrary_samples_unembed(
        lengths in prop::collection::vec(1usize..4, 2..=4),
        rows in prop::collection::vec(prop::collection::vec(any::<bool>(), 12), 0..8),
    ) {
        let n = lengths.len();
        let source = complete_model(n, &[0.5; 5], &[-1.0; 10], Vartype::Spin);
        let (embedding, graph) = instance(&lengths);
        let nodes: Vec<usize> = graph.nodes().copied().collect();
        let samples: Vec<Vec<i8>> = rows
            .iter()
            .map(|r| nodes.iter().map(|&q| if r[q] { 1 } else { -1 }).collect())
            .collect();
        let batch = SampleBatch::from_samples(nodes, samples, Vartype::Spin, vec![0.0; rows.len()]).unwrap();
        let config = UnembedConfig::default().with_break_fraction(true);

        let policies = [ChainBreakStrategy::MajorityVote, ChainBreakStrategy::Discard];
        let majority = unembed(&batch, &embedding, &source, &policies[0], &config).unwrap();
        let discard = unembed(&batch, &embedding, &source, &policies[1], &config).unwrap();
        prop_assert_eq!(majority.len(), rows.len());
        prop_assert!(discard.len() <= rows.len());

        let fractions = majority.column(CHAIN_BREAK_FRACTION).and_then(Column::as_float).unwrap();
        prop_assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
        let kept = discard.column(CHAIN_BREAK_FRACTION).and_then(Column::as_float).unwrap();
        prop_assert!(kept.iter().all(|&f| f == 0.0));

        let both = unembed_many(&batch, &embedding, &source, &policies, &config).unwrap();
        prop_assert_eq!(both.len(), majority.len() + discard.len());
        let tags = both.column(CHAIN_BREAK_METHOD).and_then(Column::as_int).unwrap();
        prop_assert!(tags[..majority.len()].iter().all(|&t| t == 0));
        prop_assert!(tags[majority.len()..].iter().all(|&t| t == 1));
    }
}
