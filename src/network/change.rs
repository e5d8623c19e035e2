use crate::network::connectivity::Connectivity;
use crate::network::layer::Layer;
use crate::network::network::Network;

/// Bias gradients and local deltas for one non-input layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerChange {
    layer: usize,
    pub(crate) bias: Vec<f32>,
    pub(crate) delta: Vec<f32>,
}

impl LayerChange {
    pub fn new(layer: &Layer) -> LayerChange {
        LayerChange {
            layer: layer.index(),
            bias: vec![0.0; layer.len()],
            delta: vec![0.0; layer.len()],
        }
    }

    /// Index of the layer this change belongs to.
    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn len(&self) -> usize {
        self.bias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bias.is_empty()
    }

    /// Accumulated bias gradient, one cell per unit.
    pub fn bias(&self) -> &[f32] {
        &self.bias
    }

    /// Deltas computed for the most recent sample.
    pub fn delta(&self) -> &[f32] {
        &self.delta
    }

    pub fn reset(&mut self) {
        self.bias.fill(0.0);
        self.delta.fill(0.0);
    }
}

/// Weight gradients for one connectivity, one cell per edge in arena order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightChange {
    connectivity: usize,
    deltas: Vec<f32>,
}

impl WeightChange {
    pub fn new(connectivity: &Connectivity) -> WeightChange {
        WeightChange {
            connectivity: connectivity.index(),
            deltas: vec![0.0; connectivity.edge_count()],
        }
    }

    pub fn connectivity(&self) -> usize {
        self.connectivity
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    pub fn deltas(&self) -> &[f32] {
        &self.deltas
    }

    /// Accumulated gradient of the edge `prev → next`, if `owner` has it.
    pub fn delta_of(&self, owner: &Connectivity, prev: usize, next: usize) -> Option<f32> {
        owner.edge_offset(prev, next).and_then(|offset| self.deltas.get(offset).copied())
    }

    pub(crate) fn add(&mut self, offset: usize, value: f32) {
        self.deltas[offset] += value;
    }

    pub fn reset(&mut self) {
        self.deltas.fill(0.0);
    }
}

/// Per-batch gradient accumulator shaped exactly like a `Network`.
///
/// `layers[i]` belongs to network layer `i + 1` (the input layer has no
/// trainable state) and `weights[i]` to connectivity `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkChange {
    pub(crate) layers: Vec<LayerChange>,
    pub(crate) weights: Vec<WeightChange>,
}

impl NetworkChange {
    /// Zeroed accumulator for the network's current topology. Edges linked
    /// afterwards are not covered; build a fresh one instead.
    pub fn new(network: &Network) -> NetworkChange {
        NetworkChange {
            layers: network.layers().iter().skip(1).map(LayerChange::new).collect(),
            weights: network.connectivities().iter().map(WeightChange::new).collect(),
        }
    }

    /// Change for network layer `layer`; `None` for the input layer.
    pub fn layer(&self, layer: usize) -> Option<&LayerChange> {
        layer.checked_sub(1).and_then(|i| self.layers.get(i))
    }

    pub fn weights(&self, connectivity: usize) -> Option<&WeightChange> {
        self.weights.get(connectivity)
    }

    pub fn reset(&mut self) {
        self.layers.iter_mut().for_each(LayerChange::reset);
        self.weights.iter_mut().for_each(WeightChange::reset);
    }

    /// True when this accumulator lines up cell for cell with `network`.
    pub fn fits(&self, network: &Network) -> bool {
        self.layers.len() + 1 == network.layers().len()
            && self.weights.len() == network.connectivities().len()
            && self.layers.iter().zip(network.layers().iter().skip(1))
                .all(|(change, layer)| change.len() == layer.len())
            && self.weights.iter().zip(network.connectivities())
                .all(|(change, conn)| change.len() == conn.edge_count())
    }
}
