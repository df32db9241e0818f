//! Integration tests for the full pipeline:
//! dataset -> batches -> negatives -> scoring -> evaluation -> distillation.

use distil_kge::{
    find_threshold, BatchIterator, ComplEx, Dataset, DistMult, Distiller, Embeddings, Evaluator,
    IteratorConfig, Mode, ModelConfig, NegativeSampler, PRotatE, RotatE, SamplerConfig,
    ScoringModel, TransE, Triple, Vocabulary,
};

/// The 6-entity, 2-relation toy graph: 3 train triples, 2 test triples.
fn toy_dataset() -> Dataset {
    let entities = Vocabulary::from_labels(["e0", "e1", "e2", "e3", "e4", "e5"]).unwrap();
    let relations = Vocabulary::from_labels(["r0", "r1"]).unwrap();
    let train = vec![
        Triple::new(0, 0, 2),
        Triple::new(1, 0, 2),
        Triple::new(2, 1, 3),
    ];
    let test = vec![Triple::new(0, 0, 2), Triple::new(2, 1, 3)];
    Dataset::new("toy", train, vec![], test, entities, relations).unwrap()
}

/// A chain graph with skip links, large enough to exercise chunking.
fn chain_dataset() -> Dataset {
    let mut train = Vec::new();
    for i in 0..100 {
        train.push((format!("e{i}"), "next".to_string(), format!("e{}", i + 1)));
    }
    for i in (0..100).step_by(10) {
        train.push((format!("e{i}"), "skip".to_string(), format!("e{}", i + 10)));
    }
    let test = vec![
        ("e0".to_string(), "next".to_string(), "e2".to_string()),
        ("e5".to_string(), "skip".to_string(), "e20".to_string()),
    ];

    let train_refs: Vec<(&str, &str, &str)> = train
        .iter()
        .map(|(h, r, t)| (h.as_str(), r.as_str(), t.as_str()))
        .collect();
    let test_refs: Vec<(&str, &str, &str)> = test
        .iter()
        .map(|(h, r, t)| (h.as_str(), r.as_str(), t.as_str()))
        .collect();

    Dataset::from_labeled("chain", &train_refs, &[], &test_refs).unwrap()
}

#[test]
fn test_toy_dataset_reports_declared_counts() {
    let dataset = toy_dataset();
    let report = dataset.to_string();

    assert!(report.contains("Entities            6"));
    assert!(report.contains("Relations           2"));
    assert!(report.contains("Train triples       3"));
    assert!(report.contains("Test triples        2"));
    assert!(report.contains("Validation triples  0"));
}

#[test]
fn test_training_step_pipeline() {
    let dataset = toy_dataset();
    let index = dataset.index().unwrap();

    let mut batches = BatchIterator::new(
        dataset.train().to_vec(),
        IteratorConfig::default().with_batch_size(3).with_seed(42),
    )
    .unwrap();
    let mut sampler = NegativeSampler::new(
        &index,
        SamplerConfig::default().with_n_negative(2).with_seed(42),
    )
    .unwrap();

    let model = RotatE::new(
        ModelConfig::new(dataset.n_entity(), dataset.n_relation(), 8, 6.0).unwrap(),
    );
    let embeddings = Embeddings::for_model(&model, 42).unwrap();

    for step in 0..6 {
        let batch = batches.next().unwrap();
        let expected_mode = if step % 2 == 0 {
            Mode::CorruptTail
        } else {
            Mode::CorruptHead
        };
        assert_eq!(batch.mode, expected_mode);
        assert_eq!(batch.len(), 3);
        for &weight in &batch.weights {
            assert!(weight > 0.0 && weight <= 1.0);
        }

        let negatives = sampler.generate(&batch);
        assert_eq!(negatives.candidates().dim(), (3, 2));
        for (row, triple) in batch.triples.iter().enumerate() {
            for candidate in negatives.row(row) {
                let (h, t) = match batch.mode {
                    Mode::CorruptTail => (triple.head, candidate),
                    Mode::CorruptHead => (candidate, triple.tail),
                };
                assert!(!index.contains(h, triple.relation, t));
            }
        }

        let positive = model.score_positive(&embeddings, &batch);
        let negative = model.score_negatives(&embeddings, &batch, &negatives);
        assert_eq!(positive.len(), 3);
        assert_eq!(negative.dim(), (3, 2));
        assert!(positive.iter().all(|s| s.is_finite()));
        assert!(negative.iter().all(|s| s.is_finite()));
    }
}

#[test]
fn test_two_runs_are_bit_identical() {
    let dataset = chain_dataset();
    let index = dataset.index().unwrap();

    let run = || {
        let mut batches = BatchIterator::new(
            dataset.train().to_vec(),
            IteratorConfig::default().with_batch_size(16).with_seed(7),
        )
        .unwrap();
        let mut sampler = NegativeSampler::new(
            &index,
            SamplerConfig::default().with_n_negative(8).with_seed(7),
        )
        .unwrap();

        let mut trace = Vec::new();
        for _ in 0..30 {
            let batch = batches.next().unwrap();
            let negatives = sampler.generate(&batch);
            trace.push((batch.triples.clone(), negatives.candidates().clone()));
        }
        trace
    };

    assert_eq!(run(), run());
}

#[test]
fn test_every_model_evaluates_on_the_chain() {
    let dataset = chain_dataset();
    let index = dataset.index().unwrap();
    let (n_entity, n_relation) = (dataset.n_entity(), dataset.n_relation());

    let models: Vec<Box<dyn ScoringModel>> = vec![
        Box::new(TransE::new(
            ModelConfig::new(n_entity, n_relation, 8, 6.0).unwrap(),
        )),
        Box::new(DistMult::new(
            ModelConfig::new(n_entity, n_relation, 8, 6.0).unwrap(),
        )),
        Box::new(RotatE::new(
            ModelConfig::new(n_entity, n_relation, 8, 6.0).unwrap(),
        )),
        Box::new(PRotatE::new(
            ModelConfig::new(n_entity, n_relation, 8, 6.0).unwrap(),
        )),
        Box::new(ComplEx::new(
            ModelConfig::new(n_entity, n_relation, 8, 6.0).unwrap(),
        )),
    ];

    let evaluator = Evaluator::new(&index).with_chunk_size(32).unwrap();
    for model in &models {
        let embeddings = Embeddings::for_model(model.as_ref(), 42).unwrap();
        let metrics = evaluator
            .eval(model.as_ref(), &embeddings, dataset.test())
            .unwrap();

        assert_eq!(metrics.num_ranks, 4, "{}", model.name());
        assert!(metrics.mrr > 0.0 && metrics.mrr <= 1.0, "{}", model.name());
        assert!(
            metrics.mr >= 1.0 && metrics.mr <= n_entity as f64,
            "{}",
            model.name()
        );
        assert!(
            (0.0..=1.0).contains(&metrics.hits_at_10),
            "{}",
            model.name()
        );
        assert!(metrics.hits_at_1 <= metrics.hits_at_3, "{}", model.name());
        assert!(metrics.hits_at_3 <= metrics.hits_at_10, "{}", model.name());
    }
}

#[test]
fn test_handcrafted_transe_ranks_perfectly() {
    // Entity embeddings placed so every train/test fact is an exact
    // translation: filtered evaluation must give MRR 1.
    let dataset = toy_dataset();
    let index = dataset.index().unwrap();

    let model = TransE::new(ModelConfig::new(6, 2, 2, 4.0).unwrap());
    let embeddings = Embeddings::from_arrays(
        ndarray::arr2(&[
            [0.0, 0.0],
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [-5.0, 5.0],
            [6.0, -6.0],
        ]),
        ndarray::arr2(&[
            [1.0, 0.0], // r0: e0 + r0 = e2, e1 + r0 = e2
            [0.0, 1.0], // r1: e2 + r1 = e3
        ]),
    )
    .unwrap();

    let metrics = Evaluator::new(&index)
        .eval(&model, &embeddings, dataset.test())
        .unwrap();
    assert!((metrics.mrr - 1.0).abs() < 1e-9);
    assert!((metrics.hits_at_1 - 1.0).abs() < 1e-9);
    assert!((metrics.mr - 1.0).abs() < 1e-9);
}

#[test]
fn test_distillation_across_variants() {
    let dataset = chain_dataset();
    let index = dataset.index().unwrap();
    let (n_entity, n_relation) = (dataset.n_entity(), dataset.n_relation());

    let teacher = RotatE::new(ModelConfig::new(n_entity, n_relation, 16, 6.0).unwrap());
    let student = TransE::new(ModelConfig::new(n_entity, n_relation, 4, 6.0).unwrap());
    let teacher_emb = Embeddings::for_model(&teacher, 1).unwrap();
    let student_emb = Embeddings::for_model(&student, 2).unwrap();

    let mut batches = BatchIterator::new(
        dataset.train().to_vec(),
        IteratorConfig::default().with_batch_size(8).with_seed(3),
    )
    .unwrap();
    let mut sampler = NegativeSampler::new(
        &index,
        SamplerConfig::default().with_n_negative(4).with_seed(3),
    )
    .unwrap();
    let distiller = Distiller::new(2.0).unwrap();

    for _ in 0..5 {
        let batch = batches.next().unwrap();
        let negatives = sampler.generate(&batch);
        let loss = distiller
            .step(
                &teacher,
                &teacher_emb,
                &student,
                &student_emb,
                &batch,
                &negatives,
            )
            .unwrap();
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }

    // A student scoring exactly like the teacher has (near) zero loss.
    let batch = batches.next().unwrap();
    let negatives = sampler.generate(&batch);
    let self_loss = distiller
        .step(
            &teacher,
            &teacher_emb,
            &teacher,
            &teacher_emb,
            &batch,
            &negatives,
        )
        .unwrap();
    assert!(self_loss.abs() < 1e-5);
}

#[test]
fn test_classification_on_handcrafted_embeddings() {
    let model = TransE::new(ModelConfig::new(6, 2, 2, 4.0).unwrap());
    let embeddings = Embeddings::from_arrays(
        ndarray::arr2(&[
            [0.0, 0.0],
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [-5.0, 5.0],
            [6.0, -6.0],
        ]),
        ndarray::arr2(&[[1.0, 0.0], [0.0, 1.0]]),
    )
    .unwrap();

    let triples = vec![
        Triple::new(0, 0, 2),
        Triple::new(2, 1, 3),
        Triple::new(0, 0, 4),
        Triple::new(1, 0, 5),
    ];
    let labels = vec![true, true, false, false];

    let report = find_threshold(&model, &embeddings, &triples, &labels).unwrap();
    assert!((report.accuracy - 1.0).abs() < 1e-9);
}

#[test]
fn test_relation_prediction_on_toy_graph() {
    let dataset = toy_dataset();
    let index = dataset.index().unwrap();

    let model = TransE::new(ModelConfig::new(6, 2, 2, 4.0).unwrap());
    let embeddings = Embeddings::from_arrays(
        ndarray::arr2(&[
            [0.0, 0.0],
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [-5.0, 5.0],
            [6.0, -6.0],
        ]),
        ndarray::arr2(&[[1.0, 0.0], [0.0, 1.0]]),
    )
    .unwrap();

    let metrics = Evaluator::new(&index)
        .eval_relations(&model, &embeddings, dataset.test())
        .unwrap();
    assert_eq!(metrics.num_ranks, 2);
    assert!((metrics.mrr - 1.0).abs() < 1e-9);
}
