use serde::{Serialize, Deserialize};

/// Per-epoch training statistics returned by `learn_over_data` and handed to
/// the progress reporter at the end of every epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Samples trained on; excludes the dropped partial batch.
    pub samples_seen: usize,
    /// Fraction of trained samples whose highest output matched the label,
    /// measured before each sample's batch was applied.
    pub train_accuracy: f32,
    /// Mean summed output error per trained sample.
    pub mean_error: f32,
    /// Accuracy on the held-out set, if one was given.
    pub test_accuracy: Option<f32>,
    /// Wall-clock duration of this epoch in milliseconds.
    pub elapsed_ms: u64,
}
