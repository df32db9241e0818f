//! DistMult: bilinear diagonal scoring.
//!
//! DistMult ([Yang et al. 2015](https://arxiv.org/abs/1412.6575)) scores a
//! triple with the trilinear product Σᵢ hᵢ rᵢ tᵢ. Symmetric by
//! construction: it cannot distinguish (h, r, t) from (t, r, h).

use crate::embedding::Embeddings;
use crate::models::{ModelConfig, ScoringModel};

/// DistMult model: relations as element-wise scalings.
#[derive(Debug, Clone)]
pub struct DistMult {
    config: ModelConfig,
}

impl DistMult {
    /// Create a DistMult model from a validated configuration.
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

impl ScoringModel for DistMult {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "DistMult"
    }

    fn score_triple(&self, emb: &Embeddings, head: usize, relation: usize, tail: usize) -> f32 {
        let h = emb.entity.row(head);
        let r = emb.relation.row(relation);
        let t = emb.entity.row(tail);

        let mut score = 0.0;
        for i in 0..self.config.hidden_dim {
            score += h[i] * r[i] * t[i];
        }
        score
    }
}
