//! Knowledge graph embedding training, evaluation and distillation.
//!
//! Knowledge graphs store facts as (head, relation, tail) triples:
//! `(Einstein, won, NobelPrize)`, `(Paris, capitalOf, France)`. Embedding
//! models learn low-dimensional vectors for entities and relations where
//! **geometric operations predict missing links**.
//!
//! This crate provides the machinery around the gradient step, which stays
//! with the caller's optimizer:
//!
//! - [`Dataset`] / [`TripleIndex`] — id-encoded triple splits with O(1)
//!   membership and filtering lookups
//! - [`BatchIterator`] — infinite, seedable, reshuffling positive batches
//!   with subsampling weights and alternating corruption modes
//! - [`NegativeSampler`] — corrupted candidates that never collide with
//!   known true triples
//! - [`ScoringModel`] — five pluggable scoring variants over caller-owned
//!   [`Embeddings`]
//! - [`Evaluator`] — filtered link-prediction metrics (MR, MRR, HITS@k)
//! - [`Distiller`] — teacher/student score-distribution matching
//!
//! ## Scoring models
//!
//! Each model encodes a geometric hypothesis about how relations transform
//! entities:
//!
//! | Model | Hypothesis | Geometric operation |
//! |-------|------------|---------------------|
//! | TransE | Relations are translations | h + r ≈ t |
//! | DistMult | Relations are scalings | ⟨h, r, t⟩ |
//! | RotatE | Relations are rotations | h ∘ r ≈ t |
//! | pRotatE | Phase-only rotations | θ_h + θ_r ≈ θ_t |
//! | ComplEx | Asymmetric bilinear | Re(⟨h, r, conj(t)⟩) |
//!
//! ## Usage
//!
//! ```rust
//! use distil_kge::{
//!     BatchIterator, Dataset, Embeddings, Evaluator, IteratorConfig, ModelConfig,
//!     NegativeSampler, RotatE, SamplerConfig, ScoringModel,
//! };
//!
//! # fn main() -> distil_kge::Result<()> {
//! let dataset = Dataset::from_labeled(
//!     "toy",
//!     &[("a", "r", "b"), ("b", "r", "c"), ("c", "s", "a")],
//!     &[],
//!     &[("a", "r", "c")],
//! )?;
//! let index = dataset.index()?;
//!
//! let mut batches = BatchIterator::new(
//!     dataset.train().to_vec(),
//!     IteratorConfig::default().with_batch_size(2).with_seed(42),
//! )?;
//! let mut sampler = NegativeSampler::new(
//!     &index,
//!     SamplerConfig::default().with_n_negative(4).with_seed(42),
//! )?;
//!
//! let model = RotatE::new(ModelConfig::new(
//!     dataset.n_entity(),
//!     dataset.n_relation(),
//!     16,
//!     6.0,
//! )?);
//! let embeddings = Embeddings::for_model(&model, 42)?;
//!
//! // One training step's worth of scores; gradients happen outside.
//! let batch = batches.next().unwrap();
//! let negatives = sampler.generate(&batch);
//! let positive_scores = model.score_positive(&embeddings, &batch);
//! let negative_scores = model.score_negatives(&embeddings, &batch, &negatives);
//! assert_eq!(negative_scores.nrows(), positive_scores.len());
//!
//! let metrics = Evaluator::new(&index).eval(&model, &embeddings, dataset.test())?;
//! println!("{}", metrics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Reproducibility
//!
//! Every stochastic component (iterator, sampler, initializer) owns an
//! explicit seeded generator. Two runs with the same data, configuration
//! and seeds produce bit-identical batches, negatives and metrics.
//!
//! ## References
//!
//! - Bordes et al. (2013). "Translating Embeddings for Modeling
//!   Multi-relational Data." NIPS.
//! - Yang et al. (2015). "Embedding Entities and Relations for Learning
//!   and Inference in Knowledge Bases." ICLR.
//! - Trouillon et al. (2016). "Complex Embeddings for Simple Link
//!   Prediction." ICML.
//! - Sun et al. (2019). "RotatE: Knowledge Graph Embedding by Relational
//!   Rotation in Complex Space." ICLR.
//! - Hinton et al. (2015). "Distilling the Knowledge in a Neural Network."

pub mod batch;
pub mod dataset;
pub mod distill;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod index;
pub mod models;
pub mod sampling;
pub mod triple;

pub use batch::{Batch, BatchIterator, IteratorConfig, Mode};
pub use dataset::Dataset;
pub use distill::Distiller;
pub use embedding::Embeddings;
pub use error::{Error, Result};
pub use evaluation::{
    accuracy, compute_rank_average, find_threshold, Evaluator, RankMetrics, ThresholdReport,
};
pub use index::TripleIndex;
pub use models::{ComplEx, DistMult, ModelConfig, PRotatE, RotatE, ScoringModel, TransE};
pub use sampling::{NegativeSampler, NegativeSet, SamplerConfig};
pub use triple::{Triple, Vocabulary};
