//! TransE: relations as translations.
//!
//! TransE ([Bordes et al. 2013](https://papers.nips.cc/paper/2013/hash/1cecc7a77928ca8133fa24680a88d2f9-Abstract.html))
//! interprets a relation as a translation in embedding space: if (h, r, t)
//! holds, then h + r ≈ t.
//!
//! Score = gamma − ‖h + r − t‖₂ (higher = more plausible).

use crate::embedding::Embeddings;
use crate::models::{ModelConfig, ScoringModel};

/// TransE model: relations as translations.
#[derive(Debug, Clone)]
pub struct TransE {
    config: ModelConfig,
}

impl TransE {
    /// Create a TransE model from a validated configuration.
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

impl ScoringModel for TransE {
    fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn name(&self) -> &'static str {
        "TransE"
    }

    fn score_triple(&self, emb: &Embeddings, head: usize, relation: usize, tail: usize) -> f32 {
        let h = emb.entity.row(head);
        let r = emb.relation.row(relation);
        let t = emb.entity.row(tail);

        let mut sum = 0.0;
        for i in 0..self.config.hidden_dim {
            let diff = h[i] + r[i] - t[i];
            sum += diff * diff;
        }
        self.config.gamma - sum.sqrt()
    }
}
