use serde::{Serialize, Deserialize};

/// Scalar squashing function applied by every non-input unit.
///
/// Units only cache their post-activation output, so derivatives are
/// expressed in terms of that output rather than the pre-activation sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    #[default]
    Sigmoid,
    Tanh,
}

impl ActivationFunction {
    pub fn function(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::Tanh => x.tanh(),
        }
    }

    /// Derivative at the point whose activation produced `y`.
    ///
    /// Both variants are monotonic, so the result is never negative for a
    /// `y` inside the function's range.
    pub fn derivative_from_output(&self, y: f32) -> f32 {
        match self {
            ActivationFunction::Sigmoid => y * (1.0 - y),
            ActivationFunction::Tanh => 1.0 - y * y,
        }
    }
}
