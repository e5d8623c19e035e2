use std::time::Instant;

use rand::Rng;

use crate::data::DataSet;
use crate::error::{NetworkError, Result};
use crate::network::{Network, NetworkChange};
use crate::train::epoch_stats::EpochStats;
use crate::train::progress::{ProgressReporter, SampleProgress};
use crate::train::train_config::TrainConfig;

impl Network {
    /// Mini-batch gradient descent over `train` for `config.epochs` epochs.
    ///
    /// Each epoch shuffles `train`, then walks it in consecutive batches of
    /// `config.batch_size`, accumulating every sample's gradients and
    /// applying them once per batch. Samples past the last full batch are
    /// not used. When `test` is given it is evaluated after every epoch.
    ///
    /// Any failing sample aborts the run; gradients of the batch it belongs
    /// to are not applied.
    pub fn learn_over_data(
        &mut self,
        train: &mut DataSet,
        config: &TrainConfig,
        reporter: &mut dyn ProgressReporter,
        mut test: Option<&mut DataSet>,
    ) -> Result<Vec<EpochStats>> {
        config.validate()?;
        self.check_samples(train)?;
        if let Some(set) = test.as_deref() {
            self.check_samples(set)?;
        }

        let mut rng = config.rng();
        let mut change = NetworkChange::new(self);
        let batch_size = config.batch_size;
        let total_batches = train.len() / batch_size;
        let samples_seen = total_batches * batch_size;

        // Scratch buffers, overwritten per sample.
        let mut input = vec![0.0; self.input_len()];
        let mut output = Vec::with_capacity(self.widest_layer());
        let mut desired = Vec::with_capacity(self.output_len());
        let mut error = Vec::with_capacity(self.output_len());

        let mut history = Vec::with_capacity(config.epochs);
        for epoch in 1..=config.epochs {
            let started = Instant::now();
            train.shuffle(&mut rng);

            let mut correct = 0usize;
            let mut error_sum = 0.0f32;
            let mut last_batch_accuracy = 0.0f32;

            for batch in 0..total_batches {
                let mut batch_correct = 0usize;
                for sample in 0..batch_size {
                    let point = train.get(batch * batch_size + sample)
                        .ok_or_else(|| NetworkError::InvalidArgument("sample index out of range".to_owned()))?;

                    point.to_normalized_floats(&mut input)?;
                    self.process_input_into(&input, &mut output)?;
                    let guess = Network::highest_confidence(&output);
                    self.desired_output_into(point.label() as usize, &mut desired)?;
                    self.calculate_error_into(&desired, Some(&output[..]), &mut error)?;
                    error_sum += self.error_function().total(&output, &desired);
                    self.calculate_changes(&mut change, &error)?;

                    if guess == Some(point.label() as usize) {
                        batch_correct += 1;
                    }
                    reporter.sample_processed(&SampleProgress {
                        epoch,
                        total_epochs: config.epochs,
                        batch: batch + 1,
                        total_batches,
                        sample_in_batch: sample + 1,
                        batch_size,
                        last_batch_accuracy,
                    });
                }

                self.apply_changes(&change, batch_size)?;
                change.reset();
                last_batch_accuracy = batch_correct as f32 / batch_size as f32;
                correct += batch_correct;
            }

            let test_accuracy = match test.as_deref_mut() {
                Some(set) => Some(self.percentage_of_correct_test_data(set, &mut rng)?),
                None => None,
            };

            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                samples_seen,
                train_accuracy: ratio(correct, samples_seen),
                mean_error: if samples_seen == 0 { 0.0 } else { error_sum / samples_seen as f32 },
                test_accuracy,
                elapsed_ms: started.elapsed().as_millis() as u64,
            };
            reporter.epoch_completed(&stats);
            history.push(stats);
        }

        Ok(history)
    }

    /// Shuffles `test`, runs every sample forward and returns the fraction
    /// whose highest output matches the label.
    pub fn percentage_of_correct_test_data<R: Rng + ?Sized>(
        &mut self,
        test: &mut DataSet,
        rng: &mut R,
    ) -> Result<f32> {
        self.check_samples(test)?;
        test.shuffle(rng);

        let mut input = vec![0.0; self.input_len()];
        let mut output = Vec::with_capacity(self.output_len());
        let mut correct = 0usize;
        for point in test.iter() {
            point.to_normalized_floats(&mut input)?;
            self.process_input_into(&input, &mut output)?;
            if Network::highest_confidence(&output) == Some(point.label() as usize) {
                correct += 1;
            }
        }
        Ok(ratio(correct, test.len()))
    }

    fn check_samples(&self, set: &DataSet) -> Result<()> {
        if !set.is_empty() && set.point_len() != self.input_len() {
            return Err(NetworkError::LengthMismatch {
                what: "data set samples",
                expected: self.input_len(),
                found: set.point_len(),
            });
        }
        Ok(())
    }
}

fn ratio(correct: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        correct as f32 / total as f32
    }
}
