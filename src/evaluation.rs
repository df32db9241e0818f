//! Rank-based evaluation for knowledge graph embeddings.
//!
//! Implements the standard filtered link-prediction protocol: for each test
//! triple, every entity is substituted into the head and the tail slot,
//! all candidates are scored, candidates forming a *different* known-true
//! triple are discounted, and the true entity's rank feeds MR, MRR and
//! HITS@{1,3,10}.
//!
//! Filtered is the standard setting: raw ranking penalizes the model for
//! preferring alternative answers that are in fact true.
//!
//! Ties are broken by assigning the average rank of the tied block, which
//! keeps the metrics deterministic for models that score many candidates
//! identically.
//!
//! # References
//!
//! - Bordes et al. (2013): original TransE evaluation protocol
//! - Sun et al. (2019): RotatE benchmark setup (filtered metrics)

use crate::batch::Mode;
use crate::embedding::Embeddings;
use crate::error::{Error, Result};
use crate::index::TripleIndex;
use crate::models::ScoringModel;
use crate::triple::Triple;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rank-based evaluation results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankMetrics {
    /// Mean Reciprocal Rank: E\[1/rank\]
    pub mrr: f64,
    /// Mean Rank: E\[rank\]
    pub mr: f64,
    /// Hits@1: P(rank <= 1)
    pub hits_at_1: f64,
    /// Hits@3: P(rank <= 3)
    pub hits_at_3: f64,
    /// Hits@10: P(rank <= 10)
    pub hits_at_10: f64,
    /// Number of ranking computations aggregated.
    pub num_ranks: usize,
}

impl RankMetrics {
    /// Compute metrics from a list of (possibly fractional) ranks.
    pub fn from_ranks(ranks: &[f64]) -> Self {
        if ranks.is_empty() {
            return Self::default();
        }

        let n = ranks.len() as f64;
        Self {
            mrr: ranks.iter().map(|&r| 1.0 / r).sum::<f64>() / n,
            mr: ranks.iter().sum::<f64>() / n,
            hits_at_1: ranks.iter().filter(|&&r| r <= 1.0).count() as f64 / n,
            hits_at_3: ranks.iter().filter(|&&r| r <= 3.0).count() as f64 / n,
            hits_at_10: ranks.iter().filter(|&&r| r <= 10.0).count() as f64 / n,
            num_ranks: ranks.len(),
        }
    }

    /// Merge metrics from multiple evaluation runs, weighted by size.
    pub fn merge(metrics: &[Self]) -> Self {
        let total: usize = metrics.iter().map(|m| m.num_ranks).sum();
        if total == 0 {
            return Self::default();
        }
        let total_f = total as f64;

        let weighted = |f: fn(&Self) -> f64| -> f64 {
            metrics
                .iter()
                .map(|m| f(m) * m.num_ranks as f64)
                .sum::<f64>()
                / total_f
        };

        Self {
            mrr: weighted(|m| m.mrr),
            mr: weighted(|m| m.mr),
            hits_at_1: weighted(|m| m.hits_at_1),
            hits_at_3: weighted(|m| m.hits_at_3),
            hits_at_10: weighted(|m| m.hits_at_10),
            num_ranks: total,
        }
    }

    /// Format as a one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "MRR: {:.4} | MR: {:.1} | H@1: {:.3} | H@3: {:.3} | H@10: {:.3} (n={})",
            self.mrr, self.mr, self.hits_at_1, self.hits_at_3, self.hits_at_10, self.num_ranks
        )
    }
}

/// Average rank of the target among all scores (descending order).
///
/// Tied scores share the average rank of their block:
/// `rank = better + (tied + 1) / 2`, where `tied` counts the target itself.
pub fn compute_rank_average(target_score: f32, all_scores: &[f32]) -> f64 {
    let mut better = 0usize;
    let mut tied = 0usize;

    for &score in all_scores {
        if (score - target_score).abs() < 1e-9 {
            tied += 1;
        } else if score > target_score {
            better += 1;
        }
    }

    better as f64 + (tied as f64 + 1.0) / 2.0
}

/// Best-threshold report for triple classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdReport {
    /// Score threshold maximizing accuracy.
    pub threshold: f32,
    /// Accuracy at that threshold.
    pub accuracy: f64,
}

/// Filtered link-prediction evaluator.
///
/// # Example
///
/// ```rust,ignore
/// use distil_kge::{Evaluator, TransE};
///
/// let index = dataset.index()?;
/// let evaluator = Evaluator::new(&index);
/// let metrics = evaluator.eval(&model, &embeddings, dataset.test())?;
/// println!("{}", metrics.summary());
/// ```
pub struct Evaluator<'a> {
    index: &'a TripleIndex,
    chunk_size: usize,
}

impl<'a> Evaluator<'a> {
    /// Create an evaluator filtering against the given index.
    pub fn new(index: &'a TripleIndex) -> Self {
        Self {
            index,
            chunk_size: 1024,
        }
    }

    /// Score candidates in chunks of this size (memory bound for large
    /// entity spaces).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be positive".into()));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    /// Evaluate link prediction over both corruption directions.
    ///
    /// Produces `2 × triples.len()` ranking computations.
    pub fn eval(
        &self,
        model: &dyn ScoringModel,
        emb: &Embeddings,
        triples: &[Triple],
    ) -> Result<RankMetrics> {
        model.validate(emb)?;
        debug!(
            n_triples = triples.len(),
            model = model.name(),
            "evaluating link prediction"
        );

        let mut ranks = Vec::with_capacity(2 * triples.len());
        for &triple in triples {
            ranks.push(self.rank_entities(model, emb, triple, Mode::CorruptHead));
            ranks.push(self.rank_entities(model, emb, triple, Mode::CorruptTail));
        }
        Ok(RankMetrics::from_ranks(&ranks))
    }

    /// Filtered rank of a triple's true entity in one corruption direction.
    pub fn rank(
        &self,
        model: &dyn ScoringModel,
        emb: &Embeddings,
        triple: Triple,
        mode: Mode,
    ) -> Result<f64> {
        model.validate(emb)?;
        Ok(self.rank_entities(model, emb, triple, mode))
    }

    fn rank_entities(
        &self,
        model: &dyn ScoringModel,
        emb: &Embeddings,
        triple: Triple,
        mode: Mode,
    ) -> f64 {
        let n_entity = self.index.n_entity();
        let mut scores = Vec::with_capacity(n_entity);
        let mut start = 0;
        while start < n_entity {
            let end = (start + self.chunk_size).min(n_entity);
            let candidates: Vec<usize> = (start..end).collect();
            scores.extend(model.score_candidates(emb, triple, &candidates, mode));
            start = end;
        }

        // Filtered protocol: discount every candidate that forms a
        // different known-true triple with the fixed slots.
        let (known, truth) = match mode {
            Mode::CorruptTail => (
                self.index.true_tails(triple.head, triple.relation),
                triple.tail,
            ),
            Mode::CorruptHead => (
                self.index.true_heads(triple.relation, triple.tail),
                triple.head,
            ),
        };
        if let Some(known) = known {
            for &entity in known {
                if entity != truth {
                    scores[entity] = f32::NEG_INFINITY;
                }
            }
        }

        compute_rank_average(scores[truth], &scores)
    }

    /// Evaluate relation prediction: rank the true relation among all
    /// relations, filtered the same way.
    pub fn eval_relations(
        &self,
        model: &dyn ScoringModel,
        emb: &Embeddings,
        triples: &[Triple],
    ) -> Result<RankMetrics> {
        model.validate(emb)?;
        debug!(
            n_triples = triples.len(),
            model = model.name(),
            "evaluating relation prediction"
        );

        let n_relation = self.index.n_relation();
        let mut ranks = Vec::with_capacity(triples.len());
        for &triple in triples {
            let mut scores = Vec::with_capacity(n_relation);
            let mut start = 0;
            while start < n_relation {
                let end = (start + self.chunk_size).min(n_relation);
                let candidates: Vec<usize> = (start..end).collect();
                scores.extend(model.score_relations(emb, triple, &candidates));
                start = end;
            }

            if let Some(known) = self.index.true_relations(triple.head, triple.tail) {
                for &relation in known {
                    if relation != triple.relation {
                        scores[relation] = f32::NEG_INFINITY;
                    }
                }
            }

            ranks.push(compute_rank_average(scores[triple.relation], &scores));
        }
        Ok(RankMetrics::from_ranks(&ranks))
    }
}

/// Find the score threshold maximizing classification accuracy.
///
/// `labels[i]` is true when `triples[i]` is an existing fact. Every
/// observed score is tried as a threshold; the best one is reported
/// together with its accuracy.
pub fn find_threshold(
    model: &dyn ScoringModel,
    emb: &Embeddings,
    triples: &[Triple],
    labels: &[bool],
) -> Result<ThresholdReport> {
    let scores = classification_scores(model, emb, triples, labels)?;

    let mut best = ThresholdReport {
        threshold: f32::NEG_INFINITY,
        accuracy: 0.0,
    };
    for &threshold in &scores {
        let accuracy = accuracy_at(&scores, labels, threshold);
        if accuracy > best.accuracy {
            best = ThresholdReport {
                threshold,
                accuracy,
            };
        }
    }
    Ok(best)
}

/// Classification accuracy of a score threshold on labeled triples.
pub fn accuracy(
    model: &dyn ScoringModel,
    emb: &Embeddings,
    triples: &[Triple],
    labels: &[bool],
    threshold: f32,
) -> Result<f64> {
    let scores = classification_scores(model, emb, triples, labels)?;
    Ok(accuracy_at(&scores, labels, threshold))
}

fn classification_scores(
    model: &dyn ScoringModel,
    emb: &Embeddings,
    triples: &[Triple],
    labels: &[bool],
) -> Result<Vec<f32>> {
    model.validate(emb)?;
    if triples.len() != labels.len() {
        return Err(Error::Config(format!(
            "{} triples but {} labels",
            triples.len(),
            labels.len()
        )));
    }
    if triples.is_empty() {
        return Err(Error::EmptyDataset("no labeled triples".into()));
    }
    Ok(triples
        .iter()
        .map(|t| model.score_triple(emb, t.head, t.relation, t.tail))
        .collect())
}

fn accuracy_at(scores: &[f32], labels: &[bool], threshold: f32) -> f64 {
    let correct = scores
        .iter()
        .zip(labels)
        .filter(|&(&score, &label)| {
            if label {
                score >= threshold
            } else {
                score < threshold
            }
        })
        .count();
    correct as f64 / scores.len() as f64
}
