//! Toy collaborator networks for trainer tests.

pub use super::*;

/// Passes the source image through: the mask saturates to one and the
/// regression is the input scaled by a learnable gain (initially `1`).
#[derive(Module, Debug)]
pub struct IdentityGenerator<B: Backend> {
    pub gain: Param<Tensor<B, 1>>,
}

impl<B: Backend> IdentityGenerator<B> {
    pub fn init(device: &B::Device) -> Self {
        Self {
            gain: Param::from_data([1.0], device),
        }
    }
}

impl<AB: AutodiffBackend> AttentionGenerator<AB> for IdentityGenerator<AB> {
    fn generate(
        &self,
        images: Tensor<AB, 4>,
        _targets: Tensor<AB, 2>,
    ) -> AttentionOutput<AB> {
        let dims = images.dims();
        let [n, _, h, w] = dims;
        let device = images.device();

        let attention = Tensor::ones([n, 1, h, w], &device);
        let regression = images.mul(
            self.gain.val().reshape([1, 1, 1, 1]).expand(dims),
        );

        AttentionOutput {
            attention,
            regression,
        }
    }
}

/// Scores an image by its weighted pixel mean and regresses the same value
/// over every attribute component.
#[derive(Module, Debug)]
pub struct MeanCritic<B: Backend> {
    pub weight: Param<Tensor<B, 1>>,
    pub attribute_count: usize,
}

impl<B: Backend> MeanCritic<B> {
    pub fn init(
        attribute_count: usize,
        device: &B::Device,
    ) -> Self {
        Self {
            weight: Param::from_data([0.5], device),
            attribute_count,
        }
    }
}

impl<AB: AutodiffBackend> ExpressionCritic<AB> for MeanCritic<AB> {
    fn judge(
        &self,
        images: Tensor<AB, 4>,
    ) -> CriticScores<AB> {
        let [n, ..] = images.dims();
        let mean = images.flatten::<2>(1, 3).mean_dim(1);
        let weight = self.weight.val().reshape([1, 1]);

        let critic = mean.to_owned().mul(weight.to_owned().expand([n, 1]));
        let classes = mean
            .expand([n, self.attribute_count])
            .mul(weight.expand([n, self.attribute_count]));

        CriticScores { critic, classes }
    }
}
