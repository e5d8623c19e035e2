pub mod json;

pub use json::{JsonLoader, JsonSaver, SavedNetwork, FORMAT};

use crate::activation::ActivationFunction;
use crate::error::{NetworkError, Result};
use crate::network::Network;

/// Receives a network piece by piece, in a fixed order: learning rate,
/// activation, every layer with its units, then every connectivity followed
/// by its edges.
pub trait NetworkSaver {
    fn learning_rate(&mut self, rate: f32) -> Result<()>;

    fn activation(&mut self, _activation: ActivationFunction) -> Result<()> {
        Ok(())
    }

    fn layer(&mut self, index: usize) -> Result<()>;

    /// A unit of the layer most recently started.
    fn unit(&mut self, index: usize, bias: f32, activation: ActivationFunction) -> Result<()>;

    fn create_connectivity(&mut self, index: usize) -> Result<()>;

    /// An edge of the connectivity most recently created.
    fn record_edge(&mut self, prev: usize, next: usize, weight: f32) -> Result<()>;
}

/// Supplies everything needed to rebuild a network.
pub trait NetworkLoader {
    fn learning_rate(&self) -> f32;

    fn activation(&self) -> ActivationFunction {
        ActivationFunction::default()
    }

    fn layer_count(&self) -> usize;

    fn unit_count(&self, layer: usize) -> Result<usize>;

    /// Biases of `layer` in unit order.
    fn biases(&self, layer: usize) -> Result<Vec<f32>>;

    /// Activations of `layer` in unit order.
    fn activations(&self, layer: usize) -> Result<Vec<ActivationFunction>> {
        Ok(vec![self.activation(); self.unit_count(layer)?])
    }

    /// `(prev, weight, next)` triples of connectivity `connectivity`, in any order.
    fn edges(&self, connectivity: usize) -> Result<Vec<(usize, f32, usize)>>;
}

impl Network {
    pub fn save<S: NetworkSaver + ?Sized>(&self, saver: &mut S) -> Result<()> {
        saver.learning_rate(self.learning_rate())?;
        saver.activation(self.activation())?;
        for layer in self.layers() {
            saver.layer(layer.index())?;
            for unit in layer.units() {
                saver.unit(unit.index(), unit.bias(), unit.activation())?;
            }
        }
        for conn in self.connectivities() {
            saver.create_connectivity(conn.index())?;
            for edge in conn.edges() {
                saver.record_edge(edge.prev, edge.next, edge.weight)?;
            }
        }
        Ok(())
    }

    /// Rebuilds a network by replaying every stored edge through `link_units`.
    pub fn load<L: NetworkLoader + ?Sized>(loader: &L) -> Result<Network> {
        let sizes = (0..loader.layer_count())
            .map(|layer| loader.unit_count(layer))
            .collect::<Result<Vec<_>>>()?;
        let mut network = Network::new(&sizes, loader.learning_rate(), loader.activation())?;

        for (layer, &size) in sizes.iter().enumerate() {
            let biases = loader.biases(layer)?;
            if biases.len() != size {
                return Err(NetworkError::LengthMismatch {
                    what: "stored biases",
                    expected: size,
                    found: biases.len(),
                });
            }
            let activations = loader.activations(layer)?;
            if activations.len() != size {
                return Err(NetworkError::LengthMismatch {
                    what: "stored activations",
                    expected: size,
                    found: activations.len(),
                });
            }
            for (unit, (bias, activation)) in biases.into_iter().zip(activations).enumerate() {
                network.set_bias(layer, unit, bias)?;
                network.set_activation(layer, unit, activation)?;
            }
        }

        for connectivity in 0..sizes.len() - 1 {
            for (prev, weight, next) in loader.edges(connectivity)? {
                network.link_units(connectivity, prev, next, weight)?;
            }
        }
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the call sequence of a save.
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl NetworkSaver for Trace {
        fn learning_rate(&mut self, rate: f32) -> Result<()> {
            self.0.push(format!("rate {rate}"));
            Ok(())
        }
        fn layer(&mut self, index: usize) -> Result<()> {
            self.0.push(format!("layer {index}"));
            Ok(())
        }
        fn unit(&mut self, index: usize, bias: f32, _activation: ActivationFunction) -> Result<()> {
            self.0.push(format!("unit {index} {bias}"));
            Ok(())
        }
        fn create_connectivity(&mut self, index: usize) -> Result<()> {
            self.0.push(format!("conn {index}"));
            Ok(())
        }
        fn record_edge(&mut self, prev: usize, next: usize, weight: f32) -> Result<()> {
            self.0.push(format!("edge {prev} {next} {weight}"));
            Ok(())
        }
    }

    #[test]
    fn save_emits_rate_layers_then_edges() {
        let mut net = Network::new(&[1, 2, 1], 0.5, ActivationFunction::Sigmoid).unwrap();
        net.set_bias(1, 1, 0.25).unwrap();
        net.link_units(0, 0, 1, 2.0).unwrap();
        net.link_units(1, 1, 0, -1.0).unwrap();

        let mut trace = Trace::default();
        net.save(&mut trace).unwrap();

        assert_eq!(
            trace.0,
            vec![
                "rate 0.5", "layer 0", "unit 0 0",
                "layer 1", "unit 0 0", "unit 1 0.25",
                "layer 2", "unit 0 0",
                "conn 0", "edge 0 1 2",
                "conn 1", "edge 1 0 -1",
            ]
        );
    }

    struct Fixed;

    impl NetworkLoader for Fixed {
        fn learning_rate(&self) -> f32 {
            0.1
        }
        fn layer_count(&self) -> usize {
            3
        }
        fn unit_count(&self, layer: usize) -> Result<usize> {
            Ok([2, 1, 1][layer])
        }
        fn biases(&self, layer: usize) -> Result<Vec<f32>> {
            Ok(vec![0.5; [2, 1, 1][layer]])
        }
        fn edges(&self, connectivity: usize) -> Result<Vec<(usize, f32, usize)>> {
            Ok(match connectivity {
                0 => vec![(1, 0.25, 0)],
                _ => vec![(0, -0.75, 0)],
            })
        }
    }

    #[test]
    fn load_replays_every_edge() {
        let net = Network::load(&Fixed).unwrap();
        assert_eq!(net.learning_rate(), 0.1);
        assert_eq!(net.activation(), ActivationFunction::Sigmoid);
        assert_eq!(net.connectivity(0).unwrap().edge_count(), 1);
        assert_eq!(net.connectivity(0).unwrap().weight(1, 0), Some(0.25));
        assert_eq!(net.connectivity(1).unwrap().weight(0, 0), Some(-0.75));
        assert_eq!(net.bias(0, 1).unwrap(), 0.5);
        assert_eq!(net.bias(2, 0).unwrap(), 0.5);
        assert!(net.layers().iter()
            .flat_map(|l| l.units())
            .all(|u| u.activation() == ActivationFunction::Sigmoid));
    }
}
