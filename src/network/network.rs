use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};

use crate::activation::ActivationFunction;
use crate::error::{NetworkError, Result};
use crate::loss::ErrorFunction;
use crate::network::change::NetworkChange;
use crate::network::connectivity::Connectivity;
use crate::network::layer::Layer;
use crate::network::unit::Upstream;
use crate::persist::json::{JsonLoader, JsonSaver};

/// A layered feed-forward network over explicit, possibly sparse edges.
///
/// `layers[0]` is the input layer and the last layer the output. Connectivity
/// `i` joins layer `i` to layer `i + 1`.
#[derive(Debug, Clone)]
pub struct Network {
    layers: Vec<Layer>,
    connections: Vec<Connectivity>,
    learning_rate: f32,
    widest: usize,
    activation: ActivationFunction,
    error_function: ErrorFunction,
    strict: bool,
}

impl Network {
    /// Builds a network with the given layer sizes, zero biases and no edges.
    pub fn new(sizes: &[usize], learning_rate: f32, activation: ActivationFunction) -> Result<Network> {
        if sizes.len() < 3 {
            return Err(NetworkError::TooFewLayers { found: sizes.len() });
        }
        let layers = sizes.iter().enumerate()
            .map(|(index, &size)| Layer::new(index, size, activation))
            .collect::<Result<Vec<_>>>()?;
        let connections = sizes.windows(2).enumerate()
            .map(|(index, pair)| Connectivity::new(index, pair[0], pair[1]))
            .collect();

        Ok(Network {
            layers,
            connections,
            learning_rate,
            widest: sizes.iter().copied().max().unwrap_or(0),
            activation,
            error_function: ErrorFunction::default(),
            strict: cfg!(debug_assertions),
        })
    }

    /// Fully connected network; weights and non-input biases are drawn
    /// uniformly from `[-0.5, 0.5)`, reproducibly for a given `seed`.
    pub fn fully_connected(
        sizes: &[usize],
        learning_rate: f32,
        activation: ActivationFunction,
        seed: u64,
    ) -> Result<Network> {
        let mut network = Network::new(sizes, learning_rate, activation)?;
        for (i, conn) in network.connections.iter_mut().enumerate() {
            conn.link_all(seed.wrapping_add(i as u64))?;
        }
        let mut rng = StdRng::seed_from_u64(seed.wrapping_sub(1));
        for layer in network.layers.iter_mut().skip(1) {
            layer.randomize_biases(&mut rng);
        }
        Ok(network)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn connectivities(&self) -> &[Connectivity] {
        &self.connections
    }

    pub fn connectivity(&self, index: usize) -> Option<&Connectivity> {
        self.connections.get(index)
    }

    pub fn connectivity_mut(&mut self, index: usize) -> Option<&mut Connectivity> {
        self.connections.get_mut(index)
    }

    pub fn input_len(&self) -> usize {
        self.layers[0].len()
    }

    pub fn output_len(&self) -> usize {
        self.output_layer().len()
    }

    /// Unit count of the widest layer; sizes per-sample scratch buffers.
    pub fn widest_layer(&self) -> usize {
        self.widest
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) {
        self.learning_rate = learning_rate;
    }

    /// Activation every unit starts with; individual units may differ.
    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn error_function(&self) -> ErrorFunction {
        self.error_function
    }

    /// Strict mode turns the internal consistency checks of the forward and
    /// backward passes into panics. Defaults to on in debug builds only.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Adds the edge `prev → next` to connectivity `connectivity`.
    pub fn link_units(&mut self, connectivity: usize, prev: usize, next: usize, weight: f32) -> Result<()> {
        let count = self.connections.len();
        self.connections.get_mut(connectivity)
            .ok_or(NetworkError::ConnectivityOutOfRange { index: connectivity, count })?
            .link_units(prev, next, weight)
    }

    pub fn bias(&self, layer: usize, unit: usize) -> Result<f32> {
        let count = self.layers.len();
        let layer_ref = self.layers.get(layer)
            .ok_or(NetworkError::LayerOutOfRange { index: layer, count })?;
        layer_ref.unit(unit)
            .map(|u| u.bias())
            .ok_or(NetworkError::UnitOutOfRange { layer, unit, len: layer_ref.len() })
    }

    pub fn set_bias(&mut self, layer: usize, unit: usize, bias: f32) -> Result<()> {
        let count = self.layers.len();
        let layer_ref = self.layers.get_mut(layer)
            .ok_or(NetworkError::LayerOutOfRange { index: layer, count })?;
        let len = layer_ref.len();
        layer_ref.unit_mut(unit)
            .ok_or(NetworkError::UnitOutOfRange { layer, unit, len })?
            .set_bias(bias);
        Ok(())
    }

    /// Switches a single unit to another activation function.
    pub fn set_activation(&mut self, layer: usize, unit: usize, activation: ActivationFunction) -> Result<()> {
        let count = self.layers.len();
        let layer_ref = self.layers.get_mut(layer)
            .ok_or(NetworkError::LayerOutOfRange { index: layer, count })?;
        let len = layer_ref.len();
        layer_ref.unit_mut(unit)
            .ok_or(NetworkError::UnitOutOfRange { layer, unit, len })?
            .set_activation(activation);
        Ok(())
    }

    /// Forward pass; returns a snapshot of the output layer.
    pub fn process_input(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        let mut output = Vec::with_capacity(self.output_len());
        self.process_input_into(input, &mut output)?;
        Ok(output)
    }

    /// Forward pass writing the output into a reusable buffer.
    pub fn process_input_into(&mut self, input: &[f32], output: &mut Vec<f32>) -> Result<()> {
        self.layers[0].set_input(input)?;
        for i in 1..self.layers.len() {
            let (done, rest) = self.layers.split_at_mut(i);
            rest[0].pulse(&done[i - 1], &self.connections[i - 1], self.strict);
        }
        self.output_layer().output_into(output);
        Ok(())
    }

    /// Per-output-unit error derivative against `desired`. Without `observed`
    /// the output of the last forward pass is used.
    pub fn calculate_error(&self, desired: &[f32], observed: Option<&[f32]>) -> Result<Vec<f32>> {
        let mut error = Vec::with_capacity(self.output_len());
        self.calculate_error_into(desired, observed, &mut error)?;
        Ok(error)
    }

    pub fn calculate_error_into(
        &self,
        desired: &[f32],
        observed: Option<&[f32]>,
        error: &mut Vec<f32>,
    ) -> Result<()> {
        let expected = self.output_len();
        if desired.len() != expected {
            return Err(NetworkError::LengthMismatch {
                what: "desired output",
                expected,
                found: desired.len(),
            });
        }
        if let Some(observed) = observed {
            if observed.len() != expected {
                return Err(NetworkError::LengthMismatch {
                    what: "observed output",
                    expected,
                    found: observed.len(),
                });
            }
        }

        error.clear();
        let units = self.output_layer().units();
        for (i, &want) in desired.iter().enumerate() {
            let got = observed.map_or_else(|| units[i].output(), |o| o[i]);
            error.push(self.error_function.derivative(got, want));
        }
        Ok(())
    }

    /// Backward sweep from the output layer down to the first hidden layer,
    /// adding this sample's gradients into `change`.
    pub fn calculate_changes(&self, change: &mut NetworkChange, error: &[f32]) -> Result<()> {
        if change.layers.len() + 1 != self.layers.len() {
            return Err(NetworkError::LengthMismatch {
                what: "network change layers",
                expected: self.layers.len() - 1,
                found: change.layers.len(),
            });
        }
        if change.weights.len() != self.connections.len() {
            return Err(NetworkError::LengthMismatch {
                what: "network change connectivities",
                expected: self.connections.len(),
                found: change.weights.len(),
            });
        }

        for i in (1..self.layers.len()).rev() {
            let upstream = Upstream {
                layer: &self.layers[i - 1],
                incoming: &self.connections[i - 1],
            };
            let following = self.connections.get(i);
            let (shallower, deeper) = change.layers.split_at_mut(i);
            let delta_or_error = match following {
                Some(_) => deeper[0].delta(),
                None => error,
            };
            self.layers[i].calculate_changes(
                &mut shallower[i - 1],
                &mut change.weights[i - 1],
                upstream,
                following,
                delta_or_error,
                self.strict,
            )?;
        }
        Ok(())
    }

    /// Applies the accumulated gradients of a batch. The learning rate is
    /// divided by `batch_size`, averaging the summed per-sample gradients.
    pub fn apply_changes(&mut self, change: &NetworkChange, batch_size: usize) -> Result<()> {
        if batch_size == 0 {
            return Err(NetworkError::InvalidArgument("batch size must be at least 1".to_owned()));
        }
        if !change.fits(self) {
            return Err(NetworkError::InvalidArgument(
                "network change does not match the network topology".to_owned(),
            ));
        }
        let rate = self.learning_rate * (1.0 / batch_size as f32);
        for (layer, layer_change) in self.layers.iter_mut().skip(1).zip(&change.layers) {
            layer.apply_changes(layer_change, rate)?;
        }
        for (conn, weight_change) in self.connections.iter_mut().zip(&change.weights) {
            conn.apply_changes(weight_change, rate)?;
        }
        Ok(())
    }

    /// Index of the first output strictly greater than every earlier one,
    /// starting from a floor of 0. `None` when no output is positive.
    pub fn highest_confidence(output: &[f32]) -> Option<usize> {
        let mut best = 0.0;
        let mut index = None;
        for (i, &value) in output.iter().enumerate() {
            if value > best {
                best = value;
                index = Some(i);
            }
        }
        index
    }

    /// Output indices from most to least confident.
    ///
    /// Sorted ascending (stable) and then reversed, so equal outputs come
    /// out in reverse index order. NaN outputs rank above every number.
    pub fn sorted_output_indices(output: &[f32]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..output.len()).collect();
        indices.sort_by(|&a, &b| output[a].total_cmp(&output[b]));
        indices.reverse();
        indices
    }

    /// One-hot target vector for `label`, written into `desired`.
    pub fn desired_output_into(&self, label: usize, desired: &mut Vec<f32>) -> Result<()> {
        let len = self.output_len();
        if label >= len {
            return Err(NetworkError::InvalidArgument(format!(
                "label {} has no output unit ({} outputs)",
                label, len
            )));
        }
        desired.clear();
        desired.resize(len, 0.0);
        desired[label] = 1.0;
        Ok(())
    }

    /// Writes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let mut saver = JsonSaver::new();
        self.save(&mut saver)?;
        saver.write(path, overwrite)
    }

    /// Reads a network previously written by `save_json`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Network> {
        let loader = JsonLoader::from_path(path)?;
        Network::load(&loader)
    }
}
