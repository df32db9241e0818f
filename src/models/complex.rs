//! ComplEx: complex bilinear scoring.
//!
//! ComplEx ([Trouillon et al. 2016](https://arxiv.org/abs/1606.06357))
//! extends DistMult to complex space. The conjugate on the tail breaks
//! symmetry, so (h, r, t) and (t, r, h) can score differently.
//!
//! Entity and relation vectors are both `2 × hidden_dim` wide (real half,
//! then imaginary half).
//!
//! Score = Re(⟨h, r, conj(t)⟩).

use crate::embedding::Embeddings;
use crate::models::{ModelConfig, ScoringModel};

/// ComplEx model: complex bilinear products with a conjugated tail.
#[derive(Debug, Clone)]
pub struct ComplEx {
    config: ModelConfig,
}

impl ComplEx {
    /// Create a ComplEx model from a validated configuration.
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

impl ScoringModel for ComplEx {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "ComplEx"
    }

    fn entity_dim(&self) -> usize {
        2 * self.config.hidden_dim
    }

    fn relation_dim(&self) -> usize {
        2 * self.config.hidden_dim
    }

    fn score_triple(&self, emb: &Embeddings, head: usize, relation: usize, tail: usize) -> f32 {
        let dim = self.config.hidden_dim;
        let h = emb.entity.row(head);
        let r = emb.relation.row(relation);
        let t = emb.entity.row(tail);

        let mut score = 0.0;
        for i in 0..dim {
            let (h_re, h_im) = (h[i], h[i + dim]);
            let (r_re, r_im) = (r[i], r[i + dim]);
            let (t_re, t_im) = (t[i], t[i + dim]);

            // Re((h * r) * conj(t)) per dimension.
            let hr_re = h_re * r_re - h_im * r_im;
            let hr_im = h_re * r_im + h_im * r_re;
            score += hr_re * t_re + hr_im * t_im;
        }
        score
    }
}
