use crate::activation::ActivationFunction;
use crate::network::change::WeightChange;
use crate::network::connectivity::Connectivity;
use crate::network::layer::Layer;

/// The layer feeding a unit and the edges it feeds through.
#[derive(Clone, Copy)]
pub struct Upstream<'a> {
    pub layer: &'a Layer,
    pub incoming: &'a Connectivity,
}

/// A single scalar activation site.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    layer: usize,
    index: usize,
    bias: f32,
    output: f32,
    activation: ActivationFunction,
}

impl Unit {
    pub fn new(layer: usize, index: usize, activation: ActivationFunction) -> Unit {
        Unit {
            layer,
            index,
            bias: 0.0,
            output: 0.0,
            activation,
        }
    }

    pub fn layer(&self) -> usize {
        self.layer
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
    }

    /// Output of the most recent pulse.
    pub fn output(&self) -> f32 {
        self.output
    }

    pub(crate) fn set_output(&mut self, output: f32) {
        self.output = output;
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn set_activation(&mut self, activation: ActivationFunction) {
        self.activation = activation;
    }

    /// `output ← activation(bias + Σ upstream_output × weight)` over the
    /// incoming edges. The upstream layer must already hold this pulse's outputs.
    pub fn calculate_output(&mut self, upstream: &Layer, incoming: &Connectivity) {
        let units = upstream.units();
        let sum = incoming.incoming_edges(self.index)
            .fold(self.bias, |acc, (_, edge)| acc + units[edge.prev].output * edge.weight);
        self.output = self.activation.function(sum);
    }

    /// Turns this unit's error into its delta and accumulates the bias and
    /// incoming-weight gradients that follow from it. Returns the delta.
    pub fn calculate_changes(
        &self,
        error: f32,
        upstream: Upstream<'_>,
        bias_change: &mut f32,
        weight_change: &mut WeightChange,
        strict: bool,
    ) -> f32 {
        let derivative = self.activation.derivative_from_output(self.output);
        if strict {
            assert!(
                derivative >= 0.0,
                "negative {:?} derivative {} at unit {} of layer {} (output {})",
                self.activation, derivative, self.index, self.layer, self.output
            );
            assert_eq!(
                weight_change.connectivity(),
                upstream.incoming.index(),
                "weight change of the wrong connectivity for layer {}",
                self.layer
            );
            assert_eq!(
                upstream.incoming.index() + 1,
                self.layer,
                "connectivity {} does not feed layer {}",
                upstream.incoming.index(),
                self.layer
            );
        }
        let delta = derivative * error;

        let units = upstream.layer.units();
        for (offset, edge) in upstream.incoming.incoming_edges(self.index) {
            weight_change.add(offset, units[edge.prev].output * delta);
        }
        *bias_change += delta;

        delta
    }

    /// Hidden-layer variant: the error is gathered from the deltas of the
    /// units this one feeds, weighted by the connecting edges.
    pub fn calculate_error_then_changes(
        &self,
        outgoing: &Connectivity,
        next_deltas: &[f32],
        upstream: Upstream<'_>,
        bias_change: &mut f32,
        weight_change: &mut WeightChange,
        strict: bool,
    ) -> f32 {
        if strict {
            assert_eq!(
                outgoing.index(),
                self.layer,
                "connectivity {} does not leave layer {}",
                outgoing.index(),
                self.layer
            );
        }
        let error: f32 = outgoing.outgoing_edges(self.index)
            .map(|edge| edge.weight * next_deltas[edge.next])
            .sum();
        self.calculate_changes(error, upstream, bias_change, weight_change, strict)
    }

    /// `bias ← bias − bias_delta × learning_rate`
    pub fn apply_changes(&mut self, bias_delta: f32, learning_rate: f32) {
        self.bias -= bias_delta * learning_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn inputs(values: &[f32]) -> Layer {
        let mut layer = Layer::new(0, values.len(), ActivationFunction::Sigmoid).unwrap();
        layer.set_input(values).unwrap();
        layer
    }

    #[test]
    fn output_is_activation_of_weighted_sum() {
        let upstream = inputs(&[1.0, 0.5, 2.0]);
        let mut conn = Connectivity::new(0, 3, 1);
        conn.link_units(0, 0, 0.5).unwrap();
        conn.link_units(2, 0, -0.25).unwrap();

        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_bias(0.25);
        unit.calculate_output(&upstream, &conn);

        // 0.25 + 1.0 * 0.5 + 2.0 * -0.25; the unlinked 0.5 input is ignored
        assert_abs_diff_eq!(unit.output(), ActivationFunction::Sigmoid.function(0.25));
    }

    #[test]
    fn unlinked_unit_sees_only_its_bias() {
        let upstream = inputs(&[1.0]);
        let conn = Connectivity::new(0, 1, 1);
        let mut unit = Unit::new(1, 0, ActivationFunction::Tanh);
        unit.set_bias(0.3);
        unit.calculate_output(&upstream, &conn);
        assert_abs_diff_eq!(unit.output(), 0.3f32.tanh());
    }

    #[test]
    fn changes_accumulate_into_bias_and_incoming_weights() {
        let upstream = inputs(&[1.0, 0.5]);
        let mut conn = Connectivity::new(0, 2, 1);
        conn.link_units(0, 0, 0.1).unwrap();
        conn.link_units(1, 0, 0.2).unwrap();
        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_output(0.5);

        let mut bias = 0.0;
        let mut weights = WeightChange::new(&conn);
        let up = Upstream { layer: &upstream, incoming: &conn };
        let delta = unit.calculate_changes(2.0, up, &mut bias, &mut weights, true);

        // σ'(0.5) = 0.25
        assert_abs_diff_eq!(delta, 0.5);
        assert_abs_diff_eq!(bias, 0.5);
        assert_abs_diff_eq!(weights.delta_of(&conn, 0, 0).unwrap(), 0.5);
        assert_abs_diff_eq!(weights.delta_of(&conn, 1, 0).unwrap(), 0.25);

        unit.calculate_changes(2.0, up, &mut bias, &mut weights, true);
        assert_abs_diff_eq!(bias, 1.0);
        assert_abs_diff_eq!(weights.delta_of(&conn, 0, 0).unwrap(), 1.0);
    }

    #[test]
    fn hidden_error_is_gathered_from_outgoing_deltas() {
        let upstream = inputs(&[1.0]);
        let mut incoming = Connectivity::new(0, 1, 1);
        incoming.link_units(0, 0, 1.0).unwrap();
        let mut outgoing = Connectivity::new(1, 1, 3);
        outgoing.link_units(0, 0, 0.5).unwrap();
        outgoing.link_units(0, 2, -1.0).unwrap();

        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_output(0.5);
        let mut bias = 0.0;
        let mut weights = WeightChange::new(&incoming);
        let delta = unit.calculate_error_then_changes(
            &outgoing,
            &[0.4, 100.0, 0.1],
            Upstream { layer: &upstream, incoming: &incoming },
            &mut bias,
            &mut weights,
            true,
        );

        // error = 0.5 * 0.4 + -1.0 * 0.1; unit 1 is not linked
        assert_abs_diff_eq!(delta, 0.25 * 0.1, epsilon = 1e-7);
    }

    #[test]
    #[should_panic(expected = "negative")]
    fn strict_mode_rejects_negative_derivative() {
        let upstream = inputs(&[1.0]);
        let conn = Connectivity::new(0, 1, 1);
        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_output(1.5);
        let mut bias = 0.0;
        let mut weights = WeightChange::new(&conn);
        unit.calculate_changes(
            1.0,
            Upstream { layer: &upstream, incoming: &conn },
            &mut bias,
            &mut weights,
            true,
        );
    }

    #[test]
    #[should_panic(expected = "wrong connectivity")]
    fn strict_mode_rejects_weight_change_of_another_connectivity() {
        let upstream = inputs(&[1.0]);
        let conn = Connectivity::new(0, 1, 1);
        let other = Connectivity::new(1, 1, 1);
        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_output(0.5);
        let mut bias = 0.0;
        let mut weights = WeightChange::new(&other);
        unit.calculate_changes(
            1.0,
            Upstream { layer: &upstream, incoming: &conn },
            &mut bias,
            &mut weights,
            true,
        );
    }

    #[test]
    #[should_panic(expected = "does not feed layer")]
    fn strict_mode_rejects_incoming_that_skips_the_layer() {
        let upstream = inputs(&[1.0]);
        let conn = Connectivity::new(1, 1, 1);
        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_output(0.5);
        let mut bias = 0.0;
        let mut weights = WeightChange::new(&conn);
        unit.calculate_changes(
            1.0,
            Upstream { layer: &upstream, incoming: &conn },
            &mut bias,
            &mut weights,
            true,
        );
    }

    #[test]
    #[should_panic(expected = "does not leave layer")]
    fn strict_mode_rejects_outgoing_of_another_layer() {
        let upstream = inputs(&[1.0]);
        let incoming = Connectivity::new(0, 1, 1);
        let outgoing = Connectivity::new(2, 1, 1);
        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_output(0.5);
        let mut bias = 0.0;
        let mut weights = WeightChange::new(&incoming);
        unit.calculate_error_then_changes(
            &outgoing,
            &[0.1],
            Upstream { layer: &upstream, incoming: &incoming },
            &mut bias,
            &mut weights,
            true,
        );
    }

    #[test]
    fn lenient_mode_skips_connectivity_checks() {
        let upstream = inputs(&[1.0]);
        let conn = Connectivity::new(1, 1, 1);
        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_output(0.5);
        let mut bias = 0.0;
        let mut weights = WeightChange::new(&conn);
        let delta = unit.calculate_changes(
            1.0,
            Upstream { layer: &upstream, incoming: &conn },
            &mut bias,
            &mut weights,
            false,
        );
        assert_abs_diff_eq!(delta, 0.25);
    }

    #[test]
    fn apply_changes_moves_bias_against_gradient() {
        let mut unit = Unit::new(1, 0, ActivationFunction::Sigmoid);
        unit.set_bias(1.0);
        unit.apply_changes(0.5, 0.1);
        assert_abs_diff_eq!(unit.bias(), 0.95);
    }
}
