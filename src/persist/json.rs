use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::ActivationFunction;
use crate::error::{NetworkError, Result};
use crate::persist::{NetworkLoader, NetworkSaver};

/// Format identifier written into, and required from, every saved network.
pub const FORMAT: &str = "ferrite-graph/1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedUnit {
    pub index: usize,
    pub bias: f32,
    /// Only written when it differs from the network-wide activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation: Option<ActivationFunction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLayer {
    pub index: usize,
    pub units: Vec<SavedUnit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEdge {
    pub prev: usize,
    pub next: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedConnectivity {
    pub index: usize,
    pub edges: Vec<SavedEdge>,
}

/// On-disk shape of a network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedNetwork {
    pub format: String,
    pub learning_rate: f32,
    #[serde(default)]
    pub activation: ActivationFunction,
    pub layers: Vec<SavedLayer>,
    pub connectivities: Vec<SavedConnectivity>,
}

/// Collects a network into a `SavedNetwork` document.
#[derive(Debug, Clone)]
pub struct JsonSaver {
    document: SavedNetwork,
}

impl Default for JsonSaver {
    fn default() -> Self {
        JsonSaver::new()
    }
}

impl JsonSaver {
    pub fn new() -> JsonSaver {
        JsonSaver {
            document: SavedNetwork {
                format: FORMAT.to_owned(),
                learning_rate: 0.0,
                activation: ActivationFunction::default(),
                layers: Vec::new(),
                connectivities: Vec::new(),
            },
        }
    }

    pub fn document(&self) -> &SavedNetwork {
        &self.document
    }

    pub fn into_document(self) -> SavedNetwork {
        self.document
    }

    /// Serializes the collected document to a pretty-printed JSON file.
    /// An existing file is only replaced when `overwrite` is set.
    pub fn write(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create_new(!overwrite)
            .create(overwrite)
            .truncate(overwrite)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => NetworkError::TargetExists(path.to_path_buf()),
                _ => NetworkError::Io(e),
            })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &self.document)?;
        Ok(())
    }
}

impl NetworkSaver for JsonSaver {
    fn learning_rate(&mut self, rate: f32) -> Result<()> {
        self.document.learning_rate = rate;
        Ok(())
    }

    fn activation(&mut self, activation: ActivationFunction) -> Result<()> {
        self.document.activation = activation;
        Ok(())
    }

    fn layer(&mut self, index: usize) -> Result<()> {
        self.document.layers.push(SavedLayer { index, units: Vec::new() });
        Ok(())
    }

    fn unit(&mut self, index: usize, bias: f32, activation: ActivationFunction) -> Result<()> {
        let activation = (activation != self.document.activation).then_some(activation);
        self.document.layers.last_mut()
            .ok_or_else(|| NetworkError::InvalidArgument("unit recorded before any layer".to_owned()))?
            .units
            .push(SavedUnit { index, bias, activation });
        Ok(())
    }

    fn create_connectivity(&mut self, index: usize) -> Result<()> {
        self.document.connectivities.push(SavedConnectivity { index, edges: Vec::new() });
        Ok(())
    }

    fn record_edge(&mut self, prev: usize, next: usize, weight: f32) -> Result<()> {
        self.document.connectivities.last_mut()
            .ok_or_else(|| NetworkError::InvalidArgument("edge recorded before any connectivity".to_owned()))?
            .edges
            .push(SavedEdge { prev, next, weight });
        Ok(())
    }
}

/// Serves a `SavedNetwork` document to `Network::load`.
#[derive(Debug, Clone)]
pub struct JsonLoader {
    document: SavedNetwork,
}

impl JsonLoader {
    pub fn from_document(document: SavedNetwork) -> Result<JsonLoader> {
        if document.format != FORMAT {
            return Err(NetworkError::UnsupportedFormat { found: document.format });
        }
        let layer_count = document.layers.len();
        check_indices("layer", document.layers.iter().map(|l| l.index), layer_count)?;
        check_indices(
            "connectivity",
            document.connectivities.iter().map(|c| c.index),
            layer_count.saturating_sub(1),
        )?;
        Ok(JsonLoader { document })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<JsonLoader> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(NetworkError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        JsonLoader::from_document(serde_json::from_reader(reader)?)
    }

    /// One value per unit of `layer`, ordered by unit index.
    fn per_unit<T>(&self, layer: usize, value: impl Fn(&SavedUnit) -> T) -> Result<Vec<T>> {
        let saved = self.saved_layer(layer)?;
        let mut values: Vec<Option<T>> = (0..saved.units.len()).map(|_| None).collect();
        for unit in &saved.units {
            match values.get_mut(unit.index) {
                Some(slot) if slot.is_none() => *slot = Some(value(unit)),
                _ => {
                    return Err(NetworkError::InvalidDataFormat(format!(
                        "layer {} lists unit {} out of range or twice",
                        layer, unit.index
                    )))
                }
            }
        }
        // every slot is filled: n distinct indices below n
        Ok(values.into_iter().flatten().collect())
    }

    fn saved_layer(&self, layer: usize) -> Result<&SavedLayer> {
        self.document.layers.iter()
            .find(|l| l.index == layer)
            .ok_or(NetworkError::LayerOutOfRange { index: layer, count: self.document.layers.len() })
    }
}

/// Every index must be below `count` and appear at most once.
fn check_indices(what: &str, indices: impl Iterator<Item = usize>, count: usize) -> Result<()> {
    let mut seen = vec![false; count];
    for index in indices {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => {
                return Err(NetworkError::InvalidDataFormat(format!(
                    "{} {} is out of range or listed twice ({} expected)",
                    what, index, count
                )))
            }
        }
    }
    Ok(())
}

impl NetworkLoader for JsonLoader {
    fn learning_rate(&self) -> f32 {
        self.document.learning_rate
    }

    fn activation(&self) -> ActivationFunction {
        self.document.activation
    }

    fn layer_count(&self) -> usize {
        self.document.layers.len()
    }

    fn unit_count(&self, layer: usize) -> Result<usize> {
        Ok(self.saved_layer(layer)?.units.len())
    }

    fn biases(&self, layer: usize) -> Result<Vec<f32>> {
        self.per_unit(layer, |unit| unit.bias)
    }

    fn activations(&self, layer: usize) -> Result<Vec<ActivationFunction>> {
        let default = self.document.activation;
        self.per_unit(layer, |unit| unit.activation.unwrap_or(default))
    }

    fn edges(&self, connectivity: usize) -> Result<Vec<(usize, f32, usize)>> {
        Ok(self.document.connectivities.iter()
            .find(|c| c.index == connectivity)
            .map(|c| c.edges.iter().map(|e| (e.prev, e.weight, e.next)).collect())
            .unwrap_or_default())
    }
}
