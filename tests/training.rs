//! Training-loop scenarios over labelled byte samples.

use ferrite_graph::data::{idx, load_idx_pair};
use ferrite_graph::{
    ActivationFunction, DataPoint, DataSet, EpochStats, Network, NetworkSpec, NoopReporter,
    ProgressReporter, TrainConfig,
};
use ferrite_graph::train::SampleProgress;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Class 0 lights the first two pixels, class 1 the last two.
fn bright_halves(n: usize, rng: &mut StdRng) -> DataSet {
    let points = (0..n)
        .map(|i| {
            let label = (i % 2) as u8;
            let mut hi = || rng.gen_range(180..=255u8);
            let (a, b) = (hi(), hi());
            let mut lo = || rng.gen_range(0..=60u8);
            let (c, d) = (lo(), lo());
            let data = if label == 0 { vec![a, b, c, d] } else { vec![c, d, a, b] };
            DataPoint::new(data, label)
        })
        .collect();
    DataSet::new(points).unwrap()
}

#[derive(Default)]
struct Recorder {
    samples: usize,
    statuses: Vec<String>,
}

impl ProgressReporter for Recorder {
    fn sample_processed(&mut self, _progress: &SampleProgress) {
        self.samples += 1;
    }

    fn status(&mut self, text: &str) {
        self.statuses.push(text.to_owned());
    }
}

#[test]
fn learns_a_separable_task() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut train = bright_halves(40, &mut rng);
    let mut test = bright_halves(20, &mut rng);
    let spec = NetworkSpec {
        layers: vec![4, 4, 2],
        activation: ActivationFunction::Sigmoid,
        learning_rate: 3.0,
        seed: 3,
        strict: Some(true),
    };
    let mut network = spec.build().unwrap();
    let mut recorder = Recorder::default();

    let history = network
        .learn_over_data(&mut train, &TrainConfig::new(30, 4).with_seed(8), &mut recorder, Some(&mut test))
        .unwrap();

    assert_eq!(recorder.samples, 30 * 40);
    assert_eq!(recorder.statuses.len(), 30);
    let last: &EpochStats = history.last().unwrap();
    assert!(last.test_accuracy.unwrap() >= 0.9, "{:?}", last);
    assert!(last.mean_error < history[0].mean_error);
    assert_eq!(test.len(), 20);
}

#[test]
fn ten_samples_in_batches_of_three_touch_nine() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut train = bright_halves(10, &mut rng);
    let mut network = Network::fully_connected(&[4, 3, 2], 1.0, ActivationFunction::Sigmoid, 0).unwrap();
    let mut recorder = Recorder::default();

    let history = network
        .learn_over_data(&mut train, &TrainConfig::new(2, 3).with_seed(5), &mut recorder, None)
        .unwrap();

    assert_eq!(recorder.samples, 18);
    assert!(history.iter().all(|s| s.samples_seen == 9 && s.test_accuracy.is_none()));
}

#[test]
fn batch_larger_than_data_set_trains_nothing() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut train = bright_halves(3, &mut rng);
    let mut network = Network::fully_connected(&[4, 3, 2], 1.0, ActivationFunction::Sigmoid, 0).unwrap();
    let before = network.clone();

    network.learn_over_data(&mut train, &TrainConfig::new(1, 4), &mut NoopReporter, None).unwrap();

    assert_eq!(network.layers(), before.layers());
    assert_eq!(network.connectivity(0).unwrap().edges(), before.connectivity(0).unwrap().edges());
}

#[test]
fn idx_files_feed_the_training_loop() {
    let mut rng = StdRng::seed_from_u64(3);
    let set = bright_halves(12, &mut rng);
    let (images, labels) = idx::encode_idx_pair(&set, 2, 2).unwrap();
    let dir = std::env::temp_dir();
    let image_path = dir.join(format!("ferrite_graph_images_{}", std::process::id()));
    let label_path = dir.join(format!("ferrite_graph_labels_{}", std::process::id()));
    std::fs::write(&image_path, images).unwrap();
    std::fs::write(&label_path, labels).unwrap();

    let mut loaded = load_idx_pair(&image_path, &label_path).unwrap();
    std::fs::remove_file(&image_path).ok();
    std::fs::remove_file(&label_path).ok();
    assert_eq!(loaded, set);

    let mut network = Network::fully_connected(&[4, 3, 2], 3.0, ActivationFunction::Sigmoid, 9).unwrap();
    let history = network
        .learn_over_data(&mut loaded, &TrainConfig::new(1, 4).with_seed(0), &mut NoopReporter, None)
        .unwrap();
    assert_eq!(history[0].samples_seen, 12);
}
