pub use super::*;

/// Computing a total-variation penalty over the spatial dimensions:
///
/// `mean((value[.., 1.., ..] - value[.., ..-1, ..]) ^ 2) +
///  mean((value[.., .., 1..] - value[.., .., ..-1]) ^ 2)`
///
/// It discourages high-frequency attention masks. The spatial dimensions
/// must be at least `2 x 2`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TotalVariation;

impl TotalVariation {
    #[inline]
    pub fn init() -> Self {
        Self
    }

    /// ## Returns
    ///
    /// The total-variation penalty with shape `[1]`.
    pub fn evaluate<B: Backend>(
        &self,
        value: Tensor<B, 4>,
    ) -> Tensor<B, 1> {
        let [n, c, h, w] = value.dims();

        let diff_y = value
            .to_owned()
            .slice([0..n, 0..c, 1..h, 0..w])
            .sub(value.to_owned().slice([0..n, 0..c, 0..h - 1, 0..w]));
        let diff_x = value
            .to_owned()
            .slice([0..n, 0..c, 0..h, 1..w])
            .sub(value.slice([0..n, 0..c, 0..h, 0..w - 1]));

        diff_y
            .powf_scalar(2.0)
            .mean()
            .add(diff_x.powf_scalar(2.0).mean())
    }
}
