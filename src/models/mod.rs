//! Scoring models for knowledge graph embeddings.
//!
//! Each model encodes a geometric hypothesis about how relations transform
//! entities:
//!
//! | Model | Hypothesis | Score |
//! |-------|------------|-------|
//! | TransE | Relations are translations | gamma − ‖h + r − t‖₂ |
//! | DistMult | Relations are scalings | Σ hᵢ rᵢ tᵢ |
//! | RotatE | Relations are complex rotations | gamma − Σ \|h ∘ r − t\|ᵢ |
//! | pRotatE | Phase-only rotations | gamma − m · Σ \|sin(θ_h + θ_r − θ_t)\|ᵢ |
//! | ComplEx | Complex bilinear product | Re(⟨h, r, conj(t)⟩) |
//!
//! All models are pure functions of caller-owned [`Embeddings`]; they hold
//! hyperparameters only and never mutate the tables. Any variant is
//! pluggable wherever a `&dyn ScoringModel` is expected.

mod complex;
mod distmult;
mod protate;
mod rotate;
mod transe;

pub use complex::ComplEx;
pub use distmult::DistMult;
pub use protate::PRotatE;
pub use rotate::RotatE;
pub use transe::TransE;

use crate::batch::{Batch, Mode};
use crate::embedding::Embeddings;
use crate::error::{Error, Result};
use crate::sampling::NegativeSet;
use crate::triple::Triple;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Margin slack added to the phase range, following the published setups.
const EPSILON: f32 = 2.0;

/// Shared model hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of entities the model scores over.
    pub n_entity: usize,
    /// Number of relations the model scores over.
    pub n_relation: usize,
    /// Base embedding dimension (complex models use twice this per vector).
    pub hidden_dim: usize,
    /// Score margin; bounds the embedding initialization range.
    pub gamma: f32,
}

impl ModelConfig {
    /// Validate and create a configuration.
    pub fn new(n_entity: usize, n_relation: usize, hidden_dim: usize, gamma: f32) -> Result<Self> {
        if n_entity == 0 {
            return Err(Error::Config("n_entity must be positive".into()));
        }
        if n_relation == 0 {
            return Err(Error::Config("n_relation must be positive".into()));
        }
        if hidden_dim == 0 {
            return Err(Error::Config("hidden_dim must be positive".into()));
        }
        if !gamma.is_finite() {
            return Err(Error::Config(format!("gamma must be finite, got {gamma}")));
        }

        Ok(Self {
            n_entity,
            n_relation,
            hidden_dim,
            gamma,
        })
    }

    /// Uniform initialization bound, `(gamma + epsilon) / hidden_dim`.
    pub fn embedding_range(&self) -> f32 {
        (self.gamma + EPSILON) / self.hidden_dim as f32
    }
}

/// Capability contract shared by the five scoring variants.
///
/// Higher scores mean more plausible triples. Implementations are stateless
/// beyond their hyperparameters, so teacher and student models in a
/// distillation setup can differ in variant and hidden dimension while
/// exposing the same interface.
pub trait ScoringModel: Send + Sync {
    /// Model hyperparameters.
    fn config(&self) -> &ModelConfig;

    /// Model name, e.g. "TransE".
    fn name(&self) -> &'static str;

    /// Width of one entity vector.
    fn entity_dim(&self) -> usize {
        self.config().hidden_dim
    }

    /// Width of one relation vector.
    fn relation_dim(&self) -> usize {
        self.config().hidden_dim
    }

    /// Score a single (head, relation, tail) triple.
    fn score_triple(&self, emb: &Embeddings, head: usize, relation: usize, tail: usize) -> f32;

    /// Check embedding table shapes against the model's declared dims.
    fn validate(&self, emb: &Embeddings) -> Result<()> {
        let config = self.config();
        if emb.n_entity() != config.n_entity {
            return Err(Error::DimensionMismatch(format!(
                "{}: entity table has {} rows, model declares {}",
                self.name(),
                emb.n_entity(),
                config.n_entity
            )));
        }
        if emb.n_relation() != config.n_relation {
            return Err(Error::DimensionMismatch(format!(
                "{}: relation table has {} rows, model declares {}",
                self.name(),
                emb.n_relation(),
                config.n_relation
            )));
        }
        if emb.entity_dim() != self.entity_dim() {
            return Err(Error::DimensionMismatch(format!(
                "{}: entity vectors are {}-wide, model expects {}",
                self.name(),
                emb.entity_dim(),
                self.entity_dim()
            )));
        }
        if emb.relation_dim() != self.relation_dim() {
            return Err(Error::DimensionMismatch(format!(
                "{}: relation vectors are {}-wide, model expects {}",
                self.name(),
                emb.relation_dim(),
                self.relation_dim()
            )));
        }
        Ok(())
    }

    /// Score candidate entities substituted into the corrupted slot.
    fn score_candidates(
        &self,
        emb: &Embeddings,
        triple: Triple,
        candidates: &[usize],
        mode: Mode,
    ) -> Vec<f32> {
        candidates
            .iter()
            .map(|&candidate| match mode {
                Mode::CorruptTail => {
                    self.score_triple(emb, triple.head, triple.relation, candidate)
                }
                Mode::CorruptHead => {
                    self.score_triple(emb, candidate, triple.relation, triple.tail)
                }
            })
            .collect()
    }

    /// Score candidate relations substituted into the relation slot.
    fn score_relations(&self, emb: &Embeddings, triple: Triple, candidates: &[usize]) -> Vec<f32> {
        candidates
            .iter()
            .map(|&candidate| self.score_triple(emb, triple.head, candidate, triple.tail))
            .collect()
    }

    /// Score every positive triple of a batch.
    fn score_positive(&self, emb: &Embeddings, batch: &Batch) -> Array1<f32> {
        batch
            .triples
            .iter()
            .map(|t| self.score_triple(emb, t.head, t.relation, t.tail))
            .collect()
    }

    /// Score every negative candidate, row-aligned with the batch.
    fn score_negatives(
        &self,
        emb: &Embeddings,
        batch: &Batch,
        negatives: &NegativeSet,
    ) -> Array2<f32> {
        let mut scores = Array2::zeros((negatives.len(), negatives.n_negative()));
        for (row, triple) in batch.triples.iter().enumerate() {
            let row_scores =
                self.score_candidates(emb, *triple, &negatives.row(row), negatives.mode());
            for (column, score) in row_scores.into_iter().enumerate() {
                scores[[row, column]] = score;
            }
        }
        scores
    }
}
