use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::Result;
use crate::network::network::Network;

/// Serializable description of a fully connected architecture and its
/// hyper-parameters, independent of any trained weights.
///
/// - `layers`: unit count per layer, input first
/// - `activation`: activation used by every unit
/// - `learning_rate`: base rate, divided by the batch size at update time
/// - `seed`: seed for the initial weights and biases
/// - `strict`: forces strict mode on or off; build default otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub layers: Vec<usize>,
    #[serde(default)]
    pub activation: ActivationFunction,
    pub learning_rate: f32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub strict: Option<bool>,
}

impl NetworkSpec {
    /// 28×28 digit images in, one output per digit class.
    pub fn mnist() -> NetworkSpec {
        NetworkSpec {
            layers: vec![784, 100, 10],
            activation: ActivationFunction::Sigmoid,
            learning_rate: 3.0,
            seed: 0,
            strict: None,
        }
    }

    pub fn build(&self) -> Result<Network> {
        let mut network = Network::fully_connected(
            &self.layers,
            self.learning_rate,
            self.activation,
            self.seed,
        )?;
        if let Some(strict) = self.strict {
            network.set_strict(strict);
        }
        Ok(network)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
