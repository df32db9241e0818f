//! RotatE: relations as rotations in complex space.
//!
//! RotatE ([Sun et al. 2019](https://arxiv.org/abs/1902.10197)) models a
//! relation as an element-wise rotation: h ∘ r ≈ t, where each relation
//! coordinate is a phase angle and each entity coordinate a complex number.
//! Rotation can express symmetry (θ = π), inversion (−θ) and composition
//! (angles add), which translations cannot.
//!
//! Entity vectors are `2 × hidden_dim` wide: the first half holds real
//! parts, the second half imaginary parts. Relation vectors hold raw values
//! mapped to phases by `embedding_range / π`, so rotations always have unit
//! modulus.
//!
//! Score = gamma − Σᵢ |h ∘ r − t|ᵢ, with |·| the complex modulus per
//! dimension.

use crate::embedding::Embeddings;
use crate::models::{ModelConfig, ScoringModel};
use std::f32::consts::PI;

/// RotatE model: relations as unit-modulus complex rotations.
#[derive(Debug, Clone)]
pub struct RotatE {
    config: ModelConfig,
}

impl RotatE {
    /// Create a RotatE model from a validated configuration.
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    fn phase_scale(&self) -> f32 {
        self.config.embedding_range() / PI
    }
}

impl ScoringModel for RotatE {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "RotatE"
    }

    fn entity_dim(&self) -> usize {
        2 * self.config.hidden_dim
    }

    fn score_triple(&self, emb: &Embeddings, head: usize, relation: usize, tail: usize) -> f32 {
        let dim = self.config.hidden_dim;
        let scale = self.phase_scale();
        let h = emb.entity.row(head);
        let r = emb.relation.row(relation);
        let t = emb.entity.row(tail);

        let mut total = 0.0;
        for i in 0..dim {
            let (h_re, h_im) = (h[i], h[i + dim]);
            let (t_re, t_im) = (t[i], t[i + dim]);
            let (r_im, r_re) = (r[i] / scale).sin_cos();

            let diff_re = h_re * r_re - h_im * r_im - t_re;
            let diff_im = h_re * r_im + h_im * r_re - t_im;
            total += (diff_re * diff_re + diff_im * diff_im).sqrt();
        }
        self.config.gamma - total
    }
}
