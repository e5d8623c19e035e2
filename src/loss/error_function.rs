use serde::{Serialize, Deserialize};

/// Per-output-unit loss used to seed the backward pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorFunction {
    /// ½(observed − desired)²
    #[default]
    SquaredError,
}

impl ErrorFunction {
    pub fn error(&self, observed: f32, desired: f32) -> f32 {
        match self {
            ErrorFunction::SquaredError => {
                let diff = observed - desired;
                0.5 * diff * diff
            }
        }
    }

    /// ∂error/∂observed.
    pub fn derivative(&self, observed: f32, desired: f32) -> f32 {
        match self {
            ErrorFunction::SquaredError => observed - desired,
        }
    }

    /// Summed error over a whole output vector.
    pub fn total(&self, observed: &[f32], desired: &[f32]) -> f32 {
        observed.iter().zip(desired.iter())
            .map(|(&o, &d)| self.error(o, d))
            .sum()
    }
}
