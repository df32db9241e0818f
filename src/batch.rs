//! Positive-batch iteration for embedding training.
//!
//! [`BatchIterator`] cycles infinitely over a triple collection in
//! randomized order, reshuffling exactly once per full pass, and yields
//! fixed-size batches tagged with a corruption [`Mode`] and per-row
//! subsampling weights. Two iterators built with the same triples and
//! configuration produce bit-identical batch sequences.

use crate::error::{Error, Result};
use crate::triple::Triple;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Additive start for the subsampling frequency counts.
///
/// A key's count is this constant plus its number of extra occurrences, so
/// a triple whose (head, relation) and (relation, tail) pairs each occur
/// once gets weight `1/sqrt(8)`.
const FREQUENCY_START: usize = 4;

/// Which slot of the positive triples the negatives corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Replace the head entity.
    CorruptHead,
    /// Replace the tail entity.
    CorruptTail,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::CorruptHead => write!(f, "head-batch"),
            Mode::CorruptTail => write!(f, "tail-batch"),
        }
    }
}

/// One training step's positive triples.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Positive triples, in traversal order.
    pub triples: Vec<Triple>,
    /// Per-row subsampling weight, `1/sqrt(freq(h,r) + freq(r,t))`.
    pub weights: Vec<f32>,
    /// Corruption mode for this step.
    pub mode: Mode,
}

impl Batch {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the batch holds no rows.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

/// Batch iteration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IteratorConfig {
    /// Rows per batch (default: 512).
    pub batch_size: usize,
    /// Whether to reshuffle each pass (default: true).
    pub shuffle: bool,
    /// Random seed (default: 42).
    pub seed: u64,
}

impl Default for IteratorConfig {
    fn default() -> Self {
        Self {
            batch_size: 512,
            shuffle: true,
            seed: 42,
        }
    }
}

impl IteratorConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Infinite, seedable traversal of a triple collection.
///
/// The iterator walks a permutation of triple indices with an explicit
/// cursor; when the permutation is exhausted it draws a fresh one from its
/// own seeded generator (or keeps identity order when shuffling is off) and
/// continues, so batches may span a pass boundary and are always exactly
/// `batch_size` rows. The corruption mode alternates by step parity,
/// starting with [`Mode::CorruptTail`] at step 0.
///
/// # Example
///
/// ```rust
/// use distil_kge::{BatchIterator, IteratorConfig, Mode, Triple};
///
/// let triples = vec![Triple::new(0, 0, 1), Triple::new(1, 0, 2)];
/// let config = IteratorConfig::default().with_batch_size(2).with_seed(42);
/// let mut iterator = BatchIterator::new(triples, config).unwrap();
///
/// let batch = iterator.next().unwrap();
/// assert_eq!(batch.len(), 2);
/// assert_eq!(batch.mode, Mode::CorruptTail);
/// assert_eq!(iterator.next().unwrap().mode, Mode::CorruptHead);
/// ```
pub struct BatchIterator {
    triples: Vec<Triple>,
    weights: Vec<f32>,
    batch_size: usize,
    shuffle: bool,
    rng: XorShiftRng,
    permutation: Vec<usize>,
    cursor: usize,
    step: u64,
}

impl BatchIterator {
    /// Create an iterator over the given triples.
    pub fn new(triples: Vec<Triple>, config: IteratorConfig) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".into()));
        }
        if triples.is_empty() {
            return Err(Error::EmptyDataset("no triples to iterate".into()));
        }

        let weights = subsampling_weights(&triples);
        let mut rng = XorShiftRng::seed_from_u64(config.seed);
        let mut permutation: Vec<usize> = (0..triples.len()).collect();
        if config.shuffle {
            permutation.shuffle(&mut rng);
        }

        Ok(Self {
            triples,
            weights,
            batch_size: config.batch_size,
            shuffle: config.shuffle,
            rng,
            permutation,
            cursor: 0,
            step: 0,
        })
    }

    /// Number of steps taken so far.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Number of triples in one full pass.
    pub fn pass_len(&self) -> usize {
        self.triples.len()
    }

    fn next_index(&mut self) -> usize {
        if self.cursor == self.permutation.len() {
            if self.shuffle {
                self.permutation.shuffle(&mut self.rng);
            }
            self.cursor = 0;
        }
        let index = self.permutation[self.cursor];
        self.cursor += 1;
        index
    }
}

impl Iterator for BatchIterator {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let mode = if self.step % 2 == 0 {
            Mode::CorruptTail
        } else {
            Mode::CorruptHead
        };
        self.step += 1;

        let mut triples = Vec::with_capacity(self.batch_size);
        let mut weights = Vec::with_capacity(self.batch_size);
        for _ in 0..self.batch_size {
            let index = self.next_index();
            triples.push(self.triples[index]);
            weights.push(self.weights[index]);
        }

        Some(Batch {
            triples,
            weights,
            mode,
        })
    }
}

impl fmt::Debug for BatchIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchIterator")
            .field("triples", &self.triples.len())
            .field("batch_size", &self.batch_size)
            .field("shuffle", &self.shuffle)
            .field("cursor", &self.cursor)
            .field("step", &self.step)
            .finish()
    }
}

/// Subsampling weight per triple, downweighting high-degree keys.
fn subsampling_weights(triples: &[Triple]) -> Vec<f32> {
    let mut head_relation: HashMap<(usize, usize), usize> = HashMap::new();
    let mut relation_tail: HashMap<(usize, usize), usize> = HashMap::new();

    for triple in triples {
        *head_relation
            .entry((triple.head, triple.relation))
            .or_insert(FREQUENCY_START - 1) += 1;
        *relation_tail
            .entry((triple.relation, triple.tail))
            .or_insert(FREQUENCY_START - 1) += 1;
    }

    triples
        .iter()
        .map(|triple| {
            let frequency = head_relation[&(triple.head, triple.relation)]
                + relation_tail[&(triple.relation, triple.tail)];
            1.0 / (frequency as f32).sqrt()
        })
        .collect()
}
