//! Dataset container bundling triple splits with their catalogs.
//!
//! A [`Dataset`] holds the train/validation/test splits as id triples
//! together with the entity and relation [`Vocabulary`] catalogs they are
//! expressed in. It is built once by an external loader and read-only
//! afterward; the sampling and evaluation machinery consumes it through
//! [`Dataset::index`] and the split accessors.

use crate::error::{Error, Result};
use crate::index::TripleIndex;
use crate::triple::{Triple, Vocabulary};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Train/validation/test triples plus entity and relation catalogs.
///
/// # Example
///
/// ```rust
/// use distil_kge::{Dataset, Triple, Vocabulary};
///
/// let entities = Vocabulary::from_labels(["e0", "e1", "e2", "e3", "e4", "e5"]).unwrap();
/// let relations = Vocabulary::from_labels(["r0", "r1"]).unwrap();
///
/// let train = vec![Triple::new(0, 0, 2), Triple::new(1, 0, 2), Triple::new(2, 1, 3)];
/// let test = vec![Triple::new(0, 0, 2), Triple::new(2, 1, 3)];
///
/// let dataset = Dataset::new("toy", train, vec![], test, entities, relations).unwrap();
/// assert_eq!(dataset.n_entity(), 6);
/// assert_eq!(dataset.n_relation(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    train: Vec<Triple>,
    valid: Vec<Triple>,
    test: Vec<Triple>,
    entities: Vocabulary,
    relations: Vocabulary,
}

impl Dataset {
    /// Create a dataset from id triples and their catalogs.
    ///
    /// The training split must be non-empty and every id must fall inside
    /// the catalog ranges.
    pub fn new(
        name: impl Into<String>,
        train: Vec<Triple>,
        valid: Vec<Triple>,
        test: Vec<Triple>,
        entities: Vocabulary,
        relations: Vocabulary,
    ) -> Result<Self> {
        if entities.is_empty() {
            return Err(Error::EmptyDataset("entity catalog is empty".into()));
        }
        if relations.is_empty() {
            return Err(Error::EmptyDataset("relation catalog is empty".into()));
        }
        if train.is_empty() {
            return Err(Error::EmptyDataset("no training triples".into()));
        }

        let dataset = Self {
            name: name.into(),
            train,
            valid,
            test,
            entities,
            relations,
        };

        for split in [&dataset.train, &dataset.valid, &dataset.test] {
            for triple in split {
                dataset.check_range(triple)?;
            }
        }

        Ok(dataset)
    }

    /// Build a dataset from labeled triples.
    ///
    /// Catalogs are assigned in first-appearance order across the train,
    /// validation and test splits.
    pub fn from_labeled(
        name: impl Into<String>,
        train: &[(&str, &str, &str)],
        valid: &[(&str, &str, &str)],
        test: &[(&str, &str, &str)],
    ) -> Result<Self> {
        let mut entities = Vocabulary::new();
        let mut relations = Vocabulary::new();

        let mut encode = |split: &[(&str, &str, &str)]| -> Vec<Triple> {
            split
                .iter()
                .map(|&(head, relation, tail)| {
                    Triple::new(
                        entities.insert(head),
                        relations.insert(relation),
                        entities.insert(tail),
                    )
                })
                .collect()
        };

        let train = encode(train);
        let valid = encode(valid);
        let test = encode(test);

        Self::new(name, train, valid, test, entities, relations)
    }

    fn check_range(&self, triple: &Triple) -> Result<()> {
        let n_entity = self.entities.len();
        let n_relation = self.relations.len();
        if triple.head >= n_entity || triple.tail >= n_entity {
            return Err(Error::InvalidTriple(format!(
                "{triple} has an entity id outside [0, {n_entity})"
            )));
        }
        if triple.relation >= n_relation {
            return Err(Error::InvalidTriple(format!(
                "{triple} has a relation id outside [0, {n_relation})"
            )));
        }
        Ok(())
    }

    /// Encode a labeled triple against the catalogs.
    pub fn encode(&self, head: &str, relation: &str, tail: &str) -> Result<Triple> {
        Ok(Triple::new(
            self.entities.require(head)?,
            self.relations.require(relation)?,
            self.entities.require(tail)?,
        ))
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Training split.
    pub fn train(&self) -> &[Triple] {
        &self.train
    }

    /// Validation split.
    pub fn valid(&self) -> &[Triple] {
        &self.valid
    }

    /// Test split.
    pub fn test(&self) -> &[Triple] {
        &self.test
    }

    /// Entity catalog.
    pub fn entities(&self) -> &Vocabulary {
        &self.entities
    }

    /// Relation catalog.
    pub fn relations(&self) -> &Vocabulary {
        &self.relations
    }

    /// Number of catalogued entities.
    pub fn n_entity(&self) -> usize {
        self.entities.len()
    }

    /// Number of catalogued relations.
    pub fn n_relation(&self) -> usize {
        self.relations.len()
    }

    /// All triples across the three splits.
    ///
    /// This is the filtering set for evaluation: a candidate that forms any
    /// of these triples is a legitimate alternative answer, not an error.
    pub fn true_triples(&self) -> Vec<Triple> {
        let mut all = Vec::with_capacity(self.train.len() + self.valid.len() + self.test.len());
        all.extend_from_slice(&self.train);
        all.extend_from_slice(&self.valid);
        all.extend_from_slice(&self.test);
        all
    }

    /// Build the [`TripleIndex`] over train, validation and test.
    pub fn index(&self) -> Result<TripleIndex> {
        TripleIndex::build(&self.true_triples(), self.n_entity(), self.n_relation())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} dataset", self.name)?;
        writeln!(f, "    {:<20}{}", "Entities", self.n_entity())?;
        writeln!(f, "    {:<20}{}", "Relations", self.n_relation())?;
        writeln!(f, "    {:<20}{}", "Train triples", self.train.len())?;
        writeln!(f, "    {:<20}{}", "Validation triples", self.valid.len())?;
        write!(f, "    {:<20}{}", "Test triples", self.test.len())
    }
}
