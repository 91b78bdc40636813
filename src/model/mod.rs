pub use burn::{
    module::{AutodiffModule, Module, Param},
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    tensor::{
        backend::{AutodiffBackend, Backend},
        Tensor,
    },
};

#[cfg(test)]
pub mod testing;

/// An Adam optimizer over one collaborator network, stepped with an
/// externally supplied learning rate.
pub type AdamModuleOptimizer<AB, M> = OptimizerAdaptor<
    Adam<<AB as AutodiffBackend>::InnerBackend>,
    M,
    AB,
>;

/// One generator forward pass.
#[derive(Clone, Debug)]
pub struct AttentionOutput<B: Backend> {
    /// Per-pixel blend weights in `[0, 1]`, shape `[N, 1, H, W]`.
    pub attention: Tensor<B, 4>,
    /// Unconstrained per-pixel colors, shape `[N, C, H, W]`.
    pub regression: Tensor<B, 4>,
}

/// One discriminator forward pass.
#[derive(Clone, Debug)]
pub struct CriticScores<B: Backend> {
    /// Wasserstein critic scores, shape `[N, 1]`.
    pub critic: Tensor<B, 2>,
    /// Action-unit regression, shape `[N, A]`.
    pub classes: Tensor<B, 2>,
}

/// The generator collaborator: predicts an attention mask and a color
/// regression for a source image conditioned on a target attribute vector.
///
/// Architecture internals are the collaborator's concern; the trainer only
/// drives forward passes, gradients and parameter updates.
pub trait AttentionGenerator<AB: AutodiffBackend>: AutodiffModule<AB> {
    fn generate(
        &self,
        images: Tensor<AB, 4>,
        targets: Tensor<AB, 2>,
    ) -> AttentionOutput<AB>;
}

/// The discriminator collaborator: scores realness and regresses the
/// attribute vector of an image.
pub trait ExpressionCritic<AB: AutodiffBackend>: AutodiffModule<AB> {
    fn judge(
        &self,
        images: Tensor<AB, 4>,
    ) -> CriticScores<AB>;
}
