//! Membership and filtering lookups over the full set of known triples.
//!
//! The index is built once from the union of train, validation and test
//! triples and is read-only afterward. It answers three questions in O(1)
//! expected time: is (h, r, t) a known fact, which tails are true for a
//! (head, relation) pair, and which heads are true for a (relation, tail)
//! pair. Negative sampling and filtered evaluation both lean on it.

use crate::error::{Error, Result};
use crate::triple::Triple;
use std::collections::{HashMap, HashSet};

/// Read-only lookup structure over all known triples.
///
/// The membership set and the auxiliary maps are derived from the same
/// triple sequence, so they are always mutually consistent.
///
/// # Example
///
/// ```rust
/// use distil_kge::{Triple, TripleIndex};
///
/// let triples = vec![Triple::new(0, 0, 2), Triple::new(1, 0, 2)];
/// let index = TripleIndex::build(&triples, 6, 2).unwrap();
///
/// assert!(index.contains(0, 0, 2));
/// assert!(!index.contains(0, 0, 3));
/// assert!(index.true_heads(0, 2).unwrap().contains(&1));
/// ```
#[derive(Debug, Clone)]
pub struct TripleIndex {
    triples: HashSet<Triple>,
    tails: HashMap<(usize, usize), HashSet<usize>>,
    heads: HashMap<(usize, usize), HashSet<usize>>,
    relations: HashMap<(usize, usize), HashSet<usize>>,
    n_entity: usize,
    n_relation: usize,
}

impl TripleIndex {
    /// Build the index from a triple sequence.
    ///
    /// Ids are validated against the declared entity and relation counts;
    /// an out-of-range id is fatal.
    pub fn build(triples: &[Triple], n_entity: usize, n_relation: usize) -> Result<Self> {
        if n_entity == 0 {
            return Err(Error::EmptyDataset("zero entities declared".into()));
        }
        if n_relation == 0 {
            return Err(Error::EmptyDataset("zero relations declared".into()));
        }

        let mut index = Self {
            triples: HashSet::with_capacity(triples.len()),
            tails: HashMap::new(),
            heads: HashMap::new(),
            relations: HashMap::new(),
            n_entity,
            n_relation,
        };

        for &triple in triples {
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

            index.triples.insert(triple);
            index
                .tails
                .entry((triple.head, triple.relation))
                .or_default()
                .insert(triple.tail);
            index
                .heads
                .entry((triple.relation, triple.tail))
                .or_default()
                .insert(triple.head);
            index
                .relations
                .entry((triple.head, triple.tail))
                .or_default()
                .insert(triple.relation);
        }

        Ok(index)
    }

    /// Whether (head, relation, tail) is a known triple.
    pub fn contains(&self, head: usize, relation: usize, tail: usize) -> bool {
        self.triples.contains(&Triple::new(head, relation, tail))
    }

    /// All tails t such that (head, relation, t) is known.
    pub fn true_tails(&self, head: usize, relation: usize) -> Option<&HashSet<usize>> {
        self.tails.get(&(head, relation))
    }

    /// All heads h such that (h, relation, tail) is known.
    pub fn true_heads(&self, relation: usize, tail: usize) -> Option<&HashSet<usize>> {
        self.heads.get(&(relation, tail))
    }

    /// All relations r such that (head, r, tail) is known.
    pub fn true_relations(&self, head: usize, tail: usize) -> Option<&HashSet<usize>> {
        self.relations.get(&(head, tail))
    }

    /// Number of distinct indexed triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the index holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Declared entity count.
    pub fn n_entity(&self) -> usize {
        self.n_entity
    }

    /// Declared relation count.
    pub fn n_relation(&self) -> usize {
        self.n_relation
    }
}
