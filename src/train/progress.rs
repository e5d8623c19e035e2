use std::io::{self, Write};

use crate::train::epoch_stats::EpochStats;

/// Position of the training loop after one processed sample. All counters
/// are 1-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleProgress {
    pub epoch: usize,
    pub total_epochs: usize,
    pub batch: usize,
    pub total_batches: usize,
    pub sample_in_batch: usize,
    pub batch_size: usize,
    /// Accuracy of the previous batch; 0 before the first one completes.
    pub last_batch_accuracy: f32,
}

/// Observer of a training run.
pub trait ProgressReporter {
    fn sample_processed(&mut self, progress: &SampleProgress);

    fn status(&mut self, text: &str);

    fn epoch_completed(&mut self, stats: &EpochStats) {
        let test = match stats.test_accuracy {
            Some(accuracy) => format!("  test acc {:>6.2}%", accuracy * 100.0),
            None => String::new(),
        };
        self.status(&format!(
            "epoch {}/{}  error {:.6}  train acc {:>6.2}%{}  ({} ms)",
            stats.epoch,
            stats.total_epochs,
            stats.mean_error,
            stats.train_accuracy * 100.0,
            test,
            stats.elapsed_ms
        ));
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn sample_processed(&mut self, _progress: &SampleProgress) {}

    fn status(&mut self, _text: &str) {}

    fn epoch_completed(&mut self, _stats: &EpochStats) {}
}

/// Keeps one progress line on stdout, rewritten in place every `every`
/// samples, and prints status text on lines of its own.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    every: usize,
    seen: usize,
    line_open: bool,
}

impl ConsoleReporter {
    pub fn new(every: usize) -> ConsoleReporter {
        ConsoleReporter {
            every: every.max(1),
            seen: 0,
            line_open: false,
        }
    }

    /// Rewrites the line once every `batches` batches of `batch_size` samples.
    pub fn every_batches(batch_size: usize, batches: usize) -> ConsoleReporter {
        ConsoleReporter::new(batch_size.saturating_mul(batches))
    }

    pub(crate) fn progress_line(progress: &SampleProgress) -> String {
        format!(
            "epoch {}/{}  batch {:>6}/{}  sample {:>4}/{}  last batch {:>6.2}%",
            progress.epoch,
            progress.total_epochs,
            progress.batch,
            progress.total_batches,
            progress.sample_in_batch,
            progress.batch_size,
            progress.last_batch_accuracy * 100.0
        )
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        ConsoleReporter::new(100)
    }
}

impl ProgressReporter for ConsoleReporter {
    fn sample_processed(&mut self, progress: &SampleProgress) {
        self.seen += 1;
        let last = progress.batch == progress.total_batches
            && progress.sample_in_batch == progress.batch_size;
        if self.seen % self.every == 0 || last {
            print!("\r{}", ConsoleReporter::progress_line(progress));
            // A failed flush only delays the progress line.
            let _ = io::stdout().flush();
            self.line_open = true;
        }
    }

    fn status(&mut self, text: &str) {
        if self.line_open {
            println!();
            self.line_open = false;
        }
        println!("{}", text);
    }
}
