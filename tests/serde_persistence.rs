//! JSON persistence of the public data types.
//!
//! An embedding and its configs are typically stored next to the problem
//! they were computed for; a sample batch travels between processes. Both
//! must come back exactly as they were written.

#[cfg(feature = "serde")]
mod tests {
    use chain_embed::{
        embed, Column, EmbedConfig, Embedding, EmbeddingSource, QuadraticModel, SampleBatch, TargetGraph,
        UnembedConfig, Vartype,
    };

    fn square() -> TargetGraph<u32> {
        TargetGraph::from_edges([(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    fn embedding() -> Embedding<String, u32> {
        [("a".to_string(), vec![0]), ("b".to_string(), vec![1]), ("c".to_string(), vec![2, 3])]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_embedding_is_a_plain_object() {
        let json = serde_json::to_string(&embedding()).unwrap();
        assert_eq!(json, r#"{"a":[0],"b":[1],"c":[2,3]}"#);
        let back: Embedding<String, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, embedding());
        assert_eq!(back.iter().map(|(v, _)| v.as_str()).collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn test_configs_round_trip() {
        let embed_config = EmbedConfig::default()
            .with_chain_strength(2.5)
            .with_smear_domain(Some(Vartype::Binary));
        let json = serde_json::to_string(&embed_config).unwrap();
        assert_eq!(serde_json::from_str::<EmbedConfig>(&json).unwrap(), embed_config);

        let unembed_config = UnembedConfig::default().with_break_fraction(true);
        let json = serde_json::to_string(&unembed_config).unwrap();
        assert_eq!(serde_json::from_str::<UnembedConfig>(&json).unwrap(), unembed_config);
    }

    #[test]
    fn test_embedded_model_survives_json() {
        let source = QuadraticModel::from_ising(
            [("a".to_string(), 0.5)],
            [(("a".to_string(), "b".to_string()), 1.0), (("b".to_string(), "c".to_string()), -1.0)],
        );
        let embedding = embedding();
        let target = square();
        let embedded = embed(&source, EmbeddingSource::mapping(&embedding, &target), &EmbedConfig::default()).unwrap();

        let json = serde_json::to_string(&embedded).unwrap();
        let back: QuadraticModel<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, embedded);

        let graph_json = serde_json::to_string(&target).unwrap();
        let graph: TargetGraph<u32> = serde_json::from_str(&graph_json).unwrap();
        assert_eq!(graph.edge_list(), target.edge_list());
    }

    #[test]
    fn test_sample_batch_survives_json() {
        let batch = SampleBatch::from_samples(vec![7u32, 9], vec![vec![0, 1], vec![1, 1]], Vartype::Binary, vec![-1.0, 0.5])
            .unwrap()
            .with_column("num_occurrences", Column::Int(vec![2, 5]))
            .unwrap()
            .with_info("solver", "exact");
        let json = serde_json::to_string(&batch).unwrap();
        let back: SampleBatch<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, batch);
    }

    #[test]
    fn test_malformed_sample_batch_is_rejected() {
        let batch = SampleBatch::from_samples(vec![7u32, 9], vec![vec![0, 1]], Vartype::Binary, vec![-1.0])
            .unwrap()
            .with_column("num_occurrences", Column::Int(vec![2]))
            .unwrap();
        let json = serde_json::to_string(&batch).unwrap();
        assert!(serde_json::from_str::<SampleBatch<u32>>(&json).is_ok());

        let short_row = json.replace("[[0,1]]", "[[0]]");
        assert_ne!(short_row, json);
        let err = serde_json::from_str::<SampleBatch<u32>>(&short_row).unwrap_err();
        assert!(err.to_string().contains("row 0"), "{err}");

        let long_column = json.replace("[2]", "[2,3]");
        assert_ne!(long_column, json);
        assert!(serde_json::from_str::<SampleBatch<u32>>(&long_column).is_err());
    }
}
