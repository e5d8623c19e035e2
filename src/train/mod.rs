pub mod epoch_stats;
pub mod loop_fn;
pub mod progress;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use progress::{ConsoleReporter, NoopReporter, ProgressReporter, SampleProgress};
pub use train_config::TrainConfig;
