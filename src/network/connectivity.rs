use std::collections::HashMap;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::error::{NetworkError, Result};
use crate::network::change::WeightChange;

/// One weighted, directed link from a unit in the previous layer to a unit
/// in the next layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub prev: usize,
    pub next: usize,
    pub weight: f32,
}

/// Sparse edge set between two adjacent layers.
///
/// Edges live in a single arena; `by_prev` and `by_next` hold arena offsets
/// so both directions enumerate in O(degree), and `lookup` resolves a
/// `(prev, next)` pair in O(1). Edges are never removed, so offsets are
/// stable and gradient buffers can be indexed by them.
#[derive(Debug, Clone)]
pub struct Connectivity {
    index: usize,
    prev_len: usize,
    next_len: usize,
    edges: Vec<Edge>,
    by_prev: Vec<Vec<usize>>,
    by_next: Vec<Vec<usize>>,
    lookup: HashMap<(usize, usize), usize>,
}

impl Connectivity {
    /// An edge set with no links between a layer of `prev_len` units and one
    /// of `next_len` units. `index` is the position of the previous layer.
    pub fn new(index: usize, prev_len: usize, next_len: usize) -> Connectivity {
        Connectivity {
            index,
            prev_len,
            next_len,
            edges: Vec::new(),
            by_prev: vec![Vec::new(); prev_len],
            by_next: vec![Vec::new(); next_len],
            lookup: HashMap::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn prev_len(&self) -> usize {
        self.prev_len
    }

    pub fn next_len(&self) -> usize {
        self.next_len
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Adds the edge `prev → next`.
    ///
    /// `prev` must be a unit of layer `index` and `next` a unit of layer
    /// `index + 1`; a pair may only be linked once.
    pub fn link_units(&mut self, prev: usize, next: usize, weight: f32) -> Result<()> {
        if prev >= self.prev_len {
            return Err(NetworkError::UnitOutOfRange {
                layer: self.index,
                unit: prev,
                len: self.prev_len,
            });
        }
        if next >= self.next_len {
            return Err(NetworkError::UnitOutOfRange {
                layer: self.index + 1,
                unit: next,
                len: self.next_len,
            });
        }
        if self.lookup.contains_key(&(prev, next)) {
            return Err(NetworkError::DuplicateEdge {
                connectivity: self.index,
                prev,
                next,
            });
        }

        let offset = self.edges.len();
        self.edges.push(Edge { prev, next, weight });
        self.by_prev[prev].push(offset);
        self.by_next[next].push(offset);
        self.lookup.insert((prev, next), offset);
        Ok(())
    }

    /// Links every previous unit to every next unit with weights drawn
    /// uniformly from `[-0.5, 0.5)`.
    pub fn link_all(&mut self, seed: u64) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(seed);
        for prev in 0..self.prev_len {
            for next in 0..self.next_len {
                self.link_units(prev, next, rng.gen_range(-0.5..0.5))?;
            }
        }
        Ok(())
    }

    pub fn weight(&self, prev: usize, next: usize) -> Option<f32> {
        self.lookup.get(&(prev, next)).map(|&offset| self.edges[offset].weight)
    }

    pub fn set_weight(&mut self, prev: usize, next: usize, weight: f32) -> Result<()> {
        match self.lookup.get(&(prev, next)) {
            Some(&offset) => {
                self.edges[offset].weight = weight;
                Ok(())
            }
            None => Err(NetworkError::InvalidArgument(format!(
                "connectivity {} has no edge {} -> {}",
                self.index, prev, next
            ))),
        }
    }

    /// Arena offset of the edge `prev → next`, the index of its gradient cell.
    pub fn edge_offset(&self, prev: usize, next: usize) -> Option<usize> {
        self.lookup.get(&(prev, next)).copied()
    }

    /// Next-layer units reachable from `prev`.
    ///
    /// # Panics
    /// Panics if `prev` is not a unit of the previous layer.
    pub fn outgoing_of(&self, prev: usize) -> impl Iterator<Item = usize> + '_ {
        self.by_prev[prev].iter().map(move |&offset| self.edges[offset].next)
    }

    /// Previous-layer units feeding `next`.
    ///
    /// # Panics
    /// Panics if `next` is not a unit of the next layer.
    pub fn incoming_of(&self, next: usize) -> impl Iterator<Item = usize> + '_ {
        self.by_next[next].iter().map(move |&offset| self.edges[offset].prev)
    }

    pub(crate) fn incoming_edges(&self, next: usize) -> impl Iterator<Item = (usize, &Edge)> + '_ {
        self.by_next[next].iter().map(move |&offset| (offset, &self.edges[offset]))
    }

    pub(crate) fn outgoing_edges(&self, prev: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.by_prev[prev].iter().map(move |&offset| &self.edges[offset])
    }

    /// `weight ← weight − accumulated × learning_rate` for every edge.
    /// Edges with no accumulated gradient keep their weight untouched.
    pub fn apply_changes(&mut self, change: &WeightChange, learning_rate: f32) -> Result<()> {
        if change.len() != self.edges.len() {
            return Err(NetworkError::LengthMismatch {
                what: "weight change",
                expected: self.edges.len(),
                found: change.len(),
            });
        }
        for (edge, &delta) in self.edges.iter_mut().zip(change.deltas()) {
            if delta != 0.0 {
                edge.weight -= delta * learning_rate;
            }
        }
        Ok(())
    }
}
