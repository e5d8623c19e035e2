//! End-to-end: a hand-wired 2-2-1 network learns XOR by plain gradient descent.

use ferrite_graph::{ActivationFunction, Network, NetworkChange};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

const SAMPLES: [([f32; 2], f32); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

fn xor_network() -> Network {
    let mut network = Network::new(&[2, 2, 1], 3.0, ActivationFunction::Sigmoid).unwrap();
    network.set_strict(true);
    for (prev, next, weight) in [(0, 0, 0.5), (0, 1, 0.9), (1, 0, 0.4), (1, 1, 1.0)] {
        network.link_units(0, prev, next, weight).unwrap();
    }
    network.link_units(1, 0, 0, -1.2).unwrap();
    network.link_units(1, 1, 0, 1.1).unwrap();
    network
}

fn train_step(network: &mut Network, change: &mut NetworkChange, input: &[f32], target: f32) {
    network.process_input(input).unwrap();
    let error = network.calculate_error(&[target], None).unwrap();
    network.calculate_changes(change, &error).unwrap();
    network.apply_changes(change, 1).unwrap();
    change.reset();
}

fn within_tolerance(network: &mut Network) -> usize {
    SAMPLES.iter()
        .filter(|(input, target)| (network.process_input(input).unwrap()[0] - target).abs() < 0.1)
        .count()
}

#[test]
fn learns_xor_in_fixed_order() {
    let mut network = xor_network();
    let mut change = NetworkChange::new(&network);
    for _ in 0..2000 {
        for (input, target) in &SAMPLES {
            train_step(&mut network, &mut change, input, *target);
        }
    }
    assert_eq!(within_tolerance(&mut network), 4);
}

#[test]
fn learns_xor_in_shuffled_order() {
    let mut network = xor_network();
    let mut change = NetworkChange::new(&network);
    let mut rng = StdRng::seed_from_u64(2024);
    let mut order = SAMPLES;
    for _ in 0..2000 {
        order.shuffle(&mut rng);
        for (input, target) in &order {
            train_step(&mut network, &mut change, input, *target);
        }
    }
    assert_eq!(within_tolerance(&mut network), 4);
}

#[test]
fn untrained_network_does_not_solve_xor() {
    let mut network = xor_network();
    assert!(within_tolerance(&mut network) < 4);
}
