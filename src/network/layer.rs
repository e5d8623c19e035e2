use rand::Rng;

use crate::activation::ActivationFunction;
use crate::error::{NetworkError, Result};
use crate::network::change::{LayerChange, WeightChange};
use crate::network::connectivity::Connectivity;
use crate::network::unit::{Unit, Upstream};

/// Fixed-size, ordered group of units at one depth of the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    index: usize,
    units: Vec<Unit>,
}

impl Layer {
    pub fn new(index: usize, size: usize, activation: ActivationFunction) -> Result<Layer> {
        if size == 0 {
            return Err(NetworkError::EmptyLayer { layer: index });
        }
        let units = (0..size).map(|i| Unit::new(index, i, activation)).collect();
        Ok(Layer { index, units })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    pub fn unit_mut(&mut self, index: usize) -> Option<&mut Unit> {
        self.units.get_mut(index)
    }

    /// Draws every bias uniformly from `[-0.5, 0.5)`.
    pub fn randomize_biases<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for unit in &mut self.units {
            unit.set_bias(rng.gen_range(-0.5..0.5));
        }
    }

    /// Recomputes every unit's output from the previous layer's outputs.
    pub fn pulse(&mut self, upstream: &Layer, incoming: &Connectivity, strict: bool) {
        if strict {
            assert!(
                incoming.prev_len() == upstream.len() && incoming.next_len() == self.len(),
                "connectivity {} ({}x{}) does not join layers {} and {}",
                incoming.index(), incoming.prev_len(), incoming.next_len(),
                upstream.index(), self.index
            );
        }
        for unit in &mut self.units {
            unit.calculate_output(upstream, incoming);
        }
    }

    /// Writes `values` straight into the unit outputs; the input layer's
    /// activation is the identity.
    pub fn set_input(&mut self, values: &[f32]) -> Result<()> {
        if values.len() != self.units.len() {
            return Err(NetworkError::LengthMismatch {
                what: "layer input",
                expected: self.units.len(),
                found: values.len(),
            });
        }
        for (unit, &value) in self.units.iter_mut().zip(values) {
            unit.set_output(value);
        }
        Ok(())
    }

    pub fn output(&self) -> Vec<f32> {
        self.units.iter().map(Unit::output).collect()
    }

    /// Copies the outputs into `buffer`, resizing it only when its length
    /// differs from the layer size.
    pub fn output_into(&self, buffer: &mut Vec<f32>) {
        if buffer.len() != self.units.len() {
            buffer.resize(self.units.len(), 0.0);
        }
        for (slot, unit) in buffer.iter_mut().zip(&self.units) {
            *slot = unit.output();
        }
    }

    /// Backward step for this layer.
    ///
    /// With no `following` connectivity this is the output layer and
    /// `delta_or_error` holds one error value per unit. Otherwise it holds
    /// the deltas of the next layer, already computed. The resulting deltas
    /// are stored in `change` for the layer before this one.
    pub fn calculate_changes(
        &self,
        change: &mut LayerChange,
        weight_change: &mut WeightChange,
        upstream: Upstream<'_>,
        following: Option<&Connectivity>,
        delta_or_error: &[f32],
        strict: bool,
    ) -> Result<()> {
        if change.len() != self.units.len() {
            return Err(NetworkError::LengthMismatch {
                what: "layer change",
                expected: self.units.len(),
                found: change.len(),
            });
        }
        if weight_change.len() != upstream.incoming.edge_count() {
            return Err(NetworkError::LengthMismatch {
                what: "weight change",
                expected: upstream.incoming.edge_count(),
                found: weight_change.len(),
            });
        }

        match following {
            None => {
                if delta_or_error.len() != self.units.len() {
                    return Err(NetworkError::LengthMismatch {
                        what: "output error",
                        expected: self.units.len(),
                        found: delta_or_error.len(),
                    });
                }
                for (i, unit) in self.units.iter().enumerate() {
                    change.delta[i] = unit.calculate_changes(
                        delta_or_error[i],
                        upstream,
                        &mut change.bias[i],
                        weight_change,
                        strict,
                    );
                }
            }
            Some(outgoing) => {
                if delta_or_error.len() != outgoing.next_len() {
                    return Err(NetworkError::LengthMismatch {
                        what: "next layer deltas",
                        expected: outgoing.next_len(),
                        found: delta_or_error.len(),
                    });
                }
                for (i, unit) in self.units.iter().enumerate() {
                    change.delta[i] = unit.calculate_error_then_changes(
                        outgoing,
                        delta_or_error,
                        upstream,
                        &mut change.bias[i],
                        weight_change,
                        strict,
                    );
                }
            }
        }
        Ok(())
    }

    /// Bias update for every unit from the accumulated bias gradient.
    pub fn apply_changes(&mut self, change: &LayerChange, learning_rate: f32) -> Result<()> {
        if change.len() != self.units.len() {
            return Err(NetworkError::LengthMismatch {
                what: "layer change",
                expected: self.units.len(),
                found: change.len(),
            });
        }
        for (unit, &delta) in self.units.iter_mut().zip(change.bias()) {
            unit.apply_changes(delta, learning_rate);
        }
        Ok(())
    }
}
