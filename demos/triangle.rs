//! # Frustrated triangle on a four-node ring
//!
//! A triangle of antiferromagnetic couplings cannot be placed directly on a
//! 4-cycle: the cycle has no triangles. Giving `c` a two-node chain `{2, 3}`
//! fixes that, at the price of a ferromagnetic chain coupling that holds the
//! two copies of `c` together.
//!
//! The demo embeds the triangle, samples the target model exhaustively (16
//! states is nothing) in place of a real sampler, and maps the samples back:
//!
//! - with majority vote, every target state becomes a source state;
//! - with discard, only states whose chain is intact survive.
//!
//! ## Running this demo
//!
//! ```text
//! cargo run --example triangle
//! ```

use chain_embed::unembed::{CHAIN_BREAK_FRACTION, CHAIN_BREAK_METHOD};
use chain_embed::{
    embed, unembed_many, ChainBreakStrategy, Column, EmbedConfig, Embedding, EmbeddingSource, QuadraticModel,
    SampleBatch, TargetGraph, UnembedConfig, Vartype,
};

fn main() {
    let source = QuadraticModel::from_ising(
        [("a", 0.0), ("b", 0.0), ("c", 0.0)],
        [(("a", "b"), 1.0), (("b", "c"), 1.0), (("a", "c"), 1.0)],
    );
    let target = TargetGraph::from_edges([(0u32, 1), (1, 2), (2, 3), (3, 0)]);
    let embedding: Embedding<&str, u32> = [("a", vec![0]), ("b", vec![1]), ("c", vec![2, 3])].into_iter().collect();

    let config = EmbedConfig::default().with_chain_strength(2.0);
    let embedded = match embed(&source, EmbeddingSource::mapping(&embedding, &target), &config) {
        Ok(model) => model,
        Err(err) => {
            eprintln!("embedding failed: {err}");
            std::process::exit(1);
        }
    };

    println!("── Target model ────────────────────────────────────────────");
    for (u, v, bias) in embedded.quadratic_terms() {
        println!("  J({u}, {v}) = {bias:+.2}");
    }
    println!("  offset     = {:+.2}", embedded.offset());

    // Exhaustive "sampler" over the target.
    let nodes: Vec<u32> = embedded.variables().copied().collect();
    let rows: Vec<Vec<i8>> = (0..1u32 << nodes.len())
        .map(|mask| (0..nodes.len()).map(|i| if (mask >> i) & 1 == 1 { 1 } else { -1 }).collect())
        .collect();
    let energies = match embedded.energies(&nodes, &rows) {
        Ok(energies) => energies,
        Err(err) => {
            eprintln!("energy evaluation failed: {err}");
            std::process::exit(1);
        }
    };
    let batch = match SampleBatch::from_samples(nodes, rows, Vartype::Spin, energies) {
        Ok(batch) => batch,
        Err(err) => {
            eprintln!("bad sample batch: {err}");
            std::process::exit(1);
        }
    };

    let policies = [ChainBreakStrategy::MajorityVote, ChainBreakStrategy::Discard];
    let unembed_config = UnembedConfig::default().with_break_fraction(true);
    let out = match unembed_many(&batch, &embedding, &source, &policies, &unembed_config) {
        Ok(out) => out,
        Err(err) => {
            eprintln!("unembedding failed: {err}");
            std::process::exit(1);
        }
    };

    println!();
    println!("── Source samples ──────────────────────────────────────────");
    println!("  policy         a   b   c   energy  broken");
    let methods = out.column(CHAIN_BREAK_METHOD).and_then(Column::as_int).unwrap_or(&[]);
    let fractions = out.column(CHAIN_BREAK_FRACTION).and_then(Column::as_float).unwrap_or(&[]);
    for (i, (values, energy)) in out.rows().enumerate() {
        let policy = methods.get(i).map_or("?", |&m| if m == 0 { "majority_vote" } else { "discard" });
        println!(
            "  {policy:<13} {:>3} {:>3} {:>3} {energy:>8.2} {:>7.2}",
            values[0],
            values[1],
            values[2],
            fractions.get(i).copied().unwrap_or(0.0)
        );
    }

    if let Some((best, energy)) = out.first() {
        println!();
        println!("ground state {best:?} at energy {energy:+.2}");
    }
}
