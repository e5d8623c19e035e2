pub mod activation;
pub mod data;
pub mod error;
pub mod loss;
pub mod network;
pub mod persist;
pub mod train;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use data::{DataPoint, DataSet};
pub use error::{NetworkError, Result};
pub use loss::error_function::ErrorFunction;
pub use network::{Connectivity, Layer, Network, NetworkChange, NetworkSpec, Unit};
pub use persist::{NetworkLoader, NetworkSaver};
pub use train::{ConsoleReporter, EpochStats, NoopReporter, ProgressReporter, TrainConfig};
