use serde::{Serialize, Deserialize};

use crate::error::{NetworkError, Result};

/// One labelled sample: raw bytes (e.g. grayscale pixels) and a class label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataPoint {
    data: Vec<u8>,
    label: u8,
}

impl DataPoint {
    pub fn new(data: Vec<u8>, label: u8) -> DataPoint {
        DataPoint { data, label }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn label(&self) -> u8 {
        self.label
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes every byte divided by 255 into `out`, which must be exactly as
    /// long as the sample.
    pub fn to_normalized_floats(&self, out: &mut [f32]) -> Result<()> {
        if out.len() != self.data.len() {
            return Err(NetworkError::LengthMismatch {
                what: "normalized sample buffer",
                expected: self.data.len(),
                found: out.len(),
            });
        }
        for (slot, &byte) in out.iter_mut().zip(&self.data) {
            *slot = byte as f32 / 255.0;
        }
        Ok(())
    }
}
