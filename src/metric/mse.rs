pub use super::*;

/// Computing the mean square error (MSE) between the inputs:
///
/// `mean((value - target) ^ 2)`
///
/// It drives the action-unit classification objectives of both networks.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanSquareError;

impl MeanSquareError {
    #[inline]
    pub fn init() -> Self {
        Self
    }
}

impl<B: Backend> Metric<B> for MeanSquareError {
    /// ## Returns
    ///
    /// The mean square error (MSE) with shape `[1]`.
    #[inline]
    fn evaluate<const D: usize>(
        &self,
        value: Tensor<B, D>,
        target: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        value.sub(target).powf_scalar(2.0).mean()
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn evaluate() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let metric = MeanSquareError::init();

        let value = Tensor::<NdArray, 2>::zeros([4, 17], &device);
        let target = Tensor::<NdArray, 2>::zeros([4, 17], &device);
        let score = metric.evaluate(value, target).into_scalar();
        assert_eq!(score, 0.0);

        let value = Tensor::<NdArray, 2>::full([4, 17], 0.5, &device);
        let target = Tensor::<NdArray, 2>::zeros([4, 17], &device);
        let score = metric.evaluate(value, target).into_scalar();
        assert_eq!(score, 0.25);
    }
}
