//! Entity and relation embedding tables.
//!
//! The tables are owned by the caller's training loop; the scoring models,
//! evaluator and distiller only ever read from them. A seeded uniform
//! initializer and a JSON persistence helper are provided as conveniences.

use crate::error::{Error, Result};
use crate::models::ScoringModel;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Entity and relation embedding tables.
///
/// Row `i` of each table is the vector for id `i`. The core never mutates
/// the tables; gradient updates happen outside, between core calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embeddings {
    /// Entity table, shape `(n_entity, entity_dim)`.
    pub entity: Array2<f32>,
    /// Relation table, shape `(n_relation, relation_dim)`.
    pub relation: Array2<f32>,
}

impl Embeddings {
    /// Wrap caller-provided tables.
    pub fn from_arrays(entity: Array2<f32>, relation: Array2<f32>) -> Result<Self> {
        if entity.nrows() == 0 {
            return Err(Error::EmptyDataset("entity table has no rows".into()));
        }
        if relation.nrows() == 0 {
            return Err(Error::EmptyDataset("relation table has no rows".into()));
        }
        Ok(Self { entity, relation })
    }

    /// Seeded uniform initialization in `[-range, range]`.
    pub fn uniform(
        n_entity: usize,
        entity_dim: usize,
        n_relation: usize,
        relation_dim: usize,
        range: f32,
        seed: u64,
    ) -> Result<Self> {
        if n_entity == 0 || n_relation == 0 {
            return Err(Error::EmptyDataset(
                "cannot initialize embeddings for zero ids".into(),
            ));
        }
        if entity_dim == 0 || relation_dim == 0 {
            return Err(Error::Config("embedding dimensions must be positive".into()));
        }
        if !(range.is_finite() && range > 0.0) {
            return Err(Error::Config(format!(
                "initialization range must be positive and finite, got {range}"
            )));
        }

        let mut rng = XorShiftRng::seed_from_u64(seed);
        let entity =
            Array2::from_shape_simple_fn((n_entity, entity_dim), || rng.gen_range(-range..=range));
        let relation = Array2::from_shape_simple_fn((n_relation, relation_dim), || {
            rng.gen_range(-range..=range)
        });

        Ok(Self { entity, relation })
    }

    /// Initialize tables matching a model's declared dimensions.
    ///
    /// Uses the model's embedding range, so rotation phases start inside
    /// one full turn.
    pub fn for_model(model: &dyn ScoringModel, seed: u64) -> Result<Self> {
        let config = model.config();
        Self::uniform(
            config.n_entity,
            model.entity_dim(),
            config.n_relation,
            model.relation_dim(),
            config.embedding_range(),
            seed,
        )
    }

    /// Number of entity rows.
    pub fn n_entity(&self) -> usize {
        self.entity.nrows()
    }

    /// Number of relation rows.
    pub fn n_relation(&self) -> usize {
        self.relation.nrows()
    }

    /// Entity vector width.
    pub fn entity_dim(&self) -> usize {
        self.entity.ncols()
    }

    /// Relation vector width.
    pub fn relation_dim(&self) -> usize {
        self.relation.ncols()
    }

    /// Write both tables as JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Read tables previously written by [`Embeddings::save_json`].
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let embeddings: Self = serde_json::from_reader(BufReader::new(file))?;
        Ok(embeddings)
    }
}
