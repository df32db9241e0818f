//! pRotatE: phase-only rotations.
//!
//! The phase-only ablation of RotatE ([Sun et al. 2019](https://arxiv.org/abs/1902.10197)):
//! entities and relations are all phase vectors on the unit circle, and a
//! triple is scored by how closely the head and relation phases compose
//! into the tail phase.
//!
//! Score = gamma − modulus · Σᵢ |sin(θ_h + θ_r − θ_t)ᵢ|, where raw values
//! map to phases via `embedding_range / π` and the modulus fixes the
//! entity norm the full model would learn (default `embedding_range / 2`).

use crate::embedding::Embeddings;
use crate::models::{ModelConfig, ScoringModel};
use std::f32::consts::PI;

/// pRotatE model: rotations with a fixed shared modulus.
#[derive(Debug, Clone)]
pub struct PRotatE {
    config: ModelConfig,
    modulus: f32,
}

impl PRotatE {
    /// Create a pRotatE model from a validated configuration.
    pub fn new(config: ModelConfig) -> Self {
        let modulus = 0.5 * config.embedding_range();
        Self { config, modulus }
    }

    /// Override the shared entity modulus.
    pub fn with_modulus(mut self, modulus: f32) -> Self {
        self.modulus = modulus;
        self
    }

    /// Shared entity modulus.
    pub fn modulus(&self) -> f32 {
        self.modulus
    }

    fn phase_scale(&self) -> f32 {
        self.config.embedding_range() / PI
    }
}

impl ScoringModel for PRotatE {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "pRotatE"
    }

    fn score_triple(&self, emb: &Embeddings, head: usize, relation: usize, tail: usize) -> f32 {
        let scale = self.phase_scale();
        let h = emb.entity.row(head);
        let r = emb.relation.row(relation);
        let t = emb.entity.row(tail);

        let mut total = 0.0;
        for i in 0..self.config.hidden_dim {
            let phase = (h[i] + r[i] - t[i]) / scale;
            total += phase.sin().abs();
        }
        self.config.gamma - total * self.modulus
    }
}
