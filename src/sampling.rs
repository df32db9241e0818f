//! Negative sampling for embedding training.
//!
//! For every positive triple in a batch, [`NegativeSampler`] draws corrupted
//! candidate entities that do not reproduce any known true triple. Rejection
//! is checked against the per-row true-alternative set from the
//! [`TripleIndex`], which keeps the expected rejection rate bounded by the
//! sparsity of the graph and the sampler near O(n_negative) per row.

use crate::batch::{Batch, Mode};
use crate::error::{Error, Result};
use crate::index::TripleIndex;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Corrupted candidate entities for one batch, row-aligned with it.
#[derive(Debug, Clone)]
pub struct NegativeSet {
    candidates: Array2<usize>,
    mode: Mode,
}

impl NegativeSet {
    /// Candidate ids, shape `(batch_size, n_negative)`.
    pub fn candidates(&self) -> &Array2<usize> {
        &self.candidates
    }

    /// Candidates for one batch row.
    pub fn row(&self, row: usize) -> Vec<usize> {
        self.candidates.row(row).to_vec()
    }

    /// Which slot the candidates corrupt.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.candidates.nrows()
    }

    /// Whether the set holds no rows.
    pub fn is_empty(&self) -> bool {
        self.candidates.nrows() == 0
    }

    /// Negatives per row.
    pub fn n_negative(&self) -> usize {
        self.candidates.ncols()
    }
}

/// Negative sampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Corrupted candidates per positive triple (default: 5).
    pub n_negative: usize,
    /// Random seed (default: 42).
    pub seed: u64,
    /// Cap on uniform draws per row before the filter is dropped
    /// (default: `10 * n_negative`).
    pub max_retries: Option<usize>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            n_negative: 5,
            seed: 42,
            max_retries: None,
        }
    }
}

impl SamplerConfig {
    pub fn with_n_negative(mut self, n_negative: usize) -> Self {
        self.n_negative = n_negative;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// Draws corrupted entities for positive batches.
///
/// The sampler owns its seeded generator, so two samplers built with the
/// same index and configuration produce identical negative sets for the
/// same batch sequence.
///
/// # Example
///
/// ```rust
/// use distil_kge::{
///     BatchIterator, IteratorConfig, NegativeSampler, SamplerConfig, Triple, TripleIndex,
/// };
///
/// let triples = vec![Triple::new(0, 0, 2), Triple::new(1, 0, 2)];
/// let index = TripleIndex::build(&triples, 6, 1).unwrap();
///
/// let mut iterator = BatchIterator::new(
///     triples,
///     IteratorConfig::default().with_batch_size(2),
/// )
/// .unwrap();
/// let mut sampler =
///     NegativeSampler::new(&index, SamplerConfig::default().with_n_negative(4)).unwrap();
///
/// let batch = iterator.next().unwrap();
/// let negatives = sampler.generate(&batch);
/// assert_eq!(negatives.candidates().dim(), (2, 4));
/// ```
pub struct NegativeSampler<'a> {
    index: &'a TripleIndex,
    n_negative: usize,
    max_retries: usize,
    rng: XorShiftRng,
}

impl<'a> NegativeSampler<'a> {
    /// Create a sampler drawing entities from the index's id range.
    pub fn new(index: &'a TripleIndex, config: SamplerConfig) -> Result<Self> {
        if config.n_negative == 0 {
            return Err(Error::Config("n_negative must be positive".into()));
        }
        let max_retries = config.max_retries.unwrap_or(10 * config.n_negative);
        if max_retries < config.n_negative {
            return Err(Error::Config(format!(
                "max_retries {} cannot be below n_negative {}",
                max_retries, config.n_negative
            )));
        }

        Ok(Self {
            index,
            n_negative: config.n_negative,
            max_retries,
            rng: XorShiftRng::seed_from_u64(config.seed),
        })
    }

    /// Negatives per row.
    pub fn n_negative(&self) -> usize {
        self.n_negative
    }

    /// Generate corrupted candidates for every row of the batch.
    ///
    /// Each accepted candidate, substituted into the row's corrupted slot,
    /// is guaranteed not to reproduce a known true triple and not to equal
    /// the row's own entity. When a row exhausts its retry budget (a
    /// degenerate graph where true alternatives cover nearly the whole
    /// entity space), the remainder is filled with unfiltered draws rather
    /// than looping forever.
    pub fn generate(&mut self, batch: &Batch) -> NegativeSet {
        let n_entity = self.index.n_entity();
        let mut candidates = Array2::zeros((batch.len(), self.n_negative));

        for (row, triple) in batch.triples.iter().enumerate() {
            let true_alternatives = match batch.mode {
                Mode::CorruptTail => self.index.true_tails(triple.head, triple.relation),
                Mode::CorruptHead => self.index.true_heads(triple.relation, triple.tail),
            };
            let truth = match batch.mode {
                Mode::CorruptTail => triple.tail,
                Mode::CorruptHead => triple.head,
            };

            let mut accepted = 0;
            let mut drawn = 0;
            while accepted < self.n_negative && drawn < self.max_retries {
                // Oversample so sparse graphs usually finish in one round.
                let chunk = (2 * self.n_negative).min(self.max_retries - drawn);
                for _ in 0..chunk {
                    let candidate = self.rng.gen_range(0..n_entity);
                    drawn += 1;
                    if candidate == truth {
                        continue;
                    }
                    if true_alternatives.is_some_and(|set| set.contains(&candidate)) {
                        continue;
                    }
                    candidates[[row, accepted]] = candidate;
                    accepted += 1;
                    if accepted == self.n_negative {
                        break;
                    }
                }
            }

            if accepted < self.n_negative {
                warn!(
                    row,
                    accepted,
                    n_negative = self.n_negative,
                    "negative sampling retry cap hit, filling row with unfiltered draws"
                );
                for slot in accepted..self.n_negative {
                    candidates[[row, slot]] = self.rng.gen_range(0..n_entity);
                }
            }
        }

        NegativeSet {
            candidates,
            mode: batch.mode,
        }
    }
}
