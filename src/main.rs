// Command-line driver: trains a network on an IDX (MNIST-style) data set,
// evaluates saved networks, and writes them to JSON.
//
//   cargo run --release -- train --train-images data/train-images-idx3-ubyte \
//       --train-labels data/train-labels-idx1-ubyte --epochs 5 --save mnist.json

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use rand::{rngs::StdRng, SeedableRng};

use ferrite_graph::data::load_idx_pair;
use ferrite_graph::{
    ConsoleReporter, Network, NetworkError, NetworkSpec, NoopReporter, ProgressReporter, Result,
    TrainConfig,
};

const USAGE: &str = "\
usage:
  ferrite-graph train --train-images FILE --train-labels FILE
                      [--test-images FILE --test-labels FILE]
                      [--spec FILE] [--hidden N] [--learning-rate R]
                      [--epochs N] [--batch-size N] [--seed N]
                      [--save FILE] [--overwrite] [--quiet]
  ferrite-graph eval  --model FILE --images FILE --labels FILE";

const SWITCHES: &[&str] = &["overwrite", "quiet"];

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("train") => train(&Flags::parse(&args[1..])?),
        Some("eval") => eval(&Flags::parse(&args[1..])?),
        None | Some("-h") | Some("--help") | Some("help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some(other) => Err(invalid(format!("unknown command '{}'\n{}", other, USAGE))),
    }
}

fn invalid(message: String) -> NetworkError {
    NetworkError::InvalidArgument(message)
}

/// `--name value` options and bare `--switch` flags.
struct Flags {
    values: HashMap<String, String>,
    switches: Vec<String>,
}

impl Flags {
    fn parse(args: &[String]) -> Result<Flags> {
        let mut values = HashMap::new();
        let mut switches = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let name = arg.strip_prefix("--")
                .ok_or_else(|| invalid(format!("unexpected argument '{}'", arg)))?;
            if SWITCHES.contains(&name) {
                switches.push(name.to_owned());
                continue;
            }
            let value = iter.next()
                .ok_or_else(|| invalid(format!("--{} needs a value", name)))?;
            values.insert(name.to_owned(), value.clone());
        }
        Ok(Flags { values, switches })
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    fn required(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| invalid(format!("--{} is required", name)))
    }

    fn parsed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>> {
        self.get(name)
            .map(|raw| raw.parse().map_err(|_| invalid(format!("--{}: cannot parse '{}'", name, raw))))
            .transpose()
    }

    fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }
}

fn train(flags: &Flags) -> Result<()> {
    let mut train_set = load_idx_pair(flags.required("train-images")?, flags.required("train-labels")?)?;
    let mut test_set = match (flags.get("test-images"), flags.get("test-labels")) {
        (Some(images), Some(labels)) => Some(load_idx_pair(images, labels)?),
        (None, None) => None,
        _ => return Err(invalid("--test-images and --test-labels go together".to_owned())),
    };

    let mut spec = match flags.get("spec") {
        Some(path) => NetworkSpec::load_json(path)?,
        None => {
            let mut spec = NetworkSpec::mnist();
            spec.layers[0] = train_set.point_len();
            spec
        }
    };
    if let Some(hidden) = flags.parsed::<usize>("hidden")? {
        if let (Some(&first), Some(&last)) = (spec.layers.first(), spec.layers.last()) {
            spec.layers = vec![first, hidden, last];
        }
    }
    if let Some(rate) = flags.parsed::<f32>("learning-rate")? {
        spec.learning_rate = rate;
    }
    if let Some(seed) = flags.parsed::<u64>("seed")? {
        spec.seed = seed;
    }

    let epochs = flags.parsed("epochs")?.unwrap_or(5);
    let batch_size = flags.parsed("batch-size")?.unwrap_or(10);
    let mut config = TrainConfig::new(epochs, batch_size);
    config.seed = flags.parsed("seed")?;

    let mut network = spec.build()?;
    let mut console = ConsoleReporter::every_batches(batch_size, 50);
    let mut quiet = NoopReporter;
    let reporter: &mut dyn ProgressReporter = if flags.switch("quiet") { &mut quiet } else { &mut console };

    reporter.status(&format!(
        "layers {:?}, {:?}, learning rate {}, {} epochs of batch size {} over {} samples",
        spec.layers, spec.activation, spec.learning_rate, epochs, batch_size, train_set.len()
    ));
    let history = network.learn_over_data(&mut train_set, &config, reporter, test_set.as_mut())?;

    if let Some(last) = history.last() {
        let accuracy = last.test_accuracy.unwrap_or(last.train_accuracy);
        println!("final accuracy: {:.2}%", accuracy * 100.0);
    }
    if let Some(path) = flags.get("save") {
        network.save_json(path, flags.switch("overwrite"))?;
        println!("network saved to {}", path);
    }
    Ok(())
}

fn eval(flags: &Flags) -> Result<()> {
    let mut network = Network::load_json(flags.required("model")?)?;
    let mut test_set = load_idx_pair(flags.required("images")?, flags.required("labels")?)?;
    let mut rng = StdRng::from_entropy();
    let accuracy = network.percentage_of_correct_test_data(&mut test_set, &mut rng)?;
    println!("{} samples, accuracy {:.2}%", test_set.len(), accuracy * 100.0);
    Ok(())
}
