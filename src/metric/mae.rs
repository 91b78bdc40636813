pub use super::*;

/// Computing the mean absolute error (MAE) between the inputs:
///
/// `mean(abs(value - target))`
///
/// It drives the cyclic reconstruction objective.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanAbsoluteError;

impl MeanAbsoluteError {
    #[inline]
    pub fn init() -> Self {
        Self
    }
}

impl<B: Backend> Metric<B> for MeanAbsoluteError {
    /// ## Returns
    ///
    /// The mean absolute error (MAE) with shape `[1]`.
    #[inline]
    fn evaluate<const D: usize>(
        &self,
        value: Tensor<B, D>,
        target: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        value.sub(target).abs().mean()
    }
}
