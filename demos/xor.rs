use ferrite_graph::{ActivationFunction, Network, NetworkChange};

fn main() -> ferrite_graph::Result<()> {
    // 2 inputs → 2 hidden → 1 output, wired by hand.
    let mut network = Network::new(&[2, 2, 1], 3.0, ActivationFunction::Sigmoid)?;
    network.link_units(0, 0, 0, 0.5)?;
    network.link_units(0, 0, 1, 0.9)?;
    network.link_units(0, 1, 0, 0.4)?;
    network.link_units(0, 1, 1, 1.0)?;
    network.link_units(1, 0, 0, -1.2)?;
    network.link_units(1, 1, 0, 1.1)?;

    let samples: [([f32; 2], f32); 4] = [
        ([0.0, 0.0], 0.0),
        ([0.0, 1.0], 1.0),
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
    ];

    let mut change = NetworkChange::new(&network);
    for epoch in 0..2000 {
        let mut total = 0.0;
        for (input, target) in &samples {
            let output = network.process_input(input)?;
            total += network.error_function().total(&output, &[*target]);
            let error = network.calculate_error(&[*target], None)?;
            network.calculate_changes(&mut change, &error)?;
            network.apply_changes(&change, 1)?;
            change.reset();
        }
        if epoch % 200 == 0 {
            println!("Epoch {epoch}: error = {total:.6}");
        }
    }

    for (input, target) in &samples {
        let output = network.process_input(input)?;
        println!("Input: {:?} -> Output: {:.4} (want {})", input, output[0], target);
    }
    Ok(())
}
