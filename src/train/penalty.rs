pub use super::*;

/// Mixes real and fake images with per-sample coefficients:
/// `alpha * real + (1 - alpha) * fake`, with `alpha` of shape
/// `[N, 1, 1, 1]` broadcast over the image dimensions.
pub fn interpolate<B: Backend>(
    real: Tensor<B, 4>,
    fake: Tensor<B, 4>,
    alpha: Tensor<B, 4>,
) -> Tensor<B, 4> {
    let alpha = alpha.expand(real.dims());

    alpha
        .to_owned()
        .mul(real)
        .add(alpha.neg().add_scalar(1.0).mul(fake))
}

/// The WGAN gradient penalty `mean((norm(d critic / d x) - 1) ^ 2)` at the
/// mixed images `x`.
///
/// The input gradient comes from a dedicated backward pass over a fresh
/// leaf on the inner backend, so the surrounding step graph is untouched.
/// The penalty value re-enters the step graph as a constant: it penalizes
/// through the critic forward pass only, not through the gradient norm's
/// own parameters.
pub fn gradient_penalty<AB, D>(
    discriminator: &D,
    mixed: Tensor<AB, 4>,
) -> Tensor<AB, 1>
where
    AB: AutodiffBackend,
    D: ExpressionCritic<AB>,
{
    let leaf = Tensor::from_inner(mixed.inner()).set_require_grad(true);
    let scores = discriminator.judge(leaf.to_owned());

    let grads = scores.critic.sum().backward();
    let grad = leaf
        .grad(&grads)
        .expect("the mixed images should have a gradient");

    let norm = grad.flatten::<2>(1, 3).powf_scalar(2.0).sum_dim(1).sqrt();

    Tensor::from_inner(norm.sub_scalar(1.0).powf_scalar(2.0).mean())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::MeanCritic;
    use burn::{
        backend::{Autodiff, NdArray},
        tensor::Distribution,
    };

    type TB = Autodiff<NdArray>;

    #[test]
    fn interpolate_boundaries() {
        let device = Default::default();
        let real = Tensor::<TB, 4>::random(
            [2, 3, 4, 4],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let fake = Tensor::<TB, 4>::random(
            [2, 3, 4, 4],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );

        let at_one = interpolate(
            real.to_owned(),
            fake.to_owned(),
            Tensor::ones([2, 1, 1, 1], &device),
        );
        at_one
            .into_data()
            .assert_approx_eq(&real.to_owned().into_data(), 6);

        let at_zero = interpolate(
            real,
            fake.to_owned(),
            Tensor::zeros([2, 1, 1, 1], &device),
        );
        at_zero
            .into_data()
            .assert_approx_eq(&fake.into_data(), 6);
    }

    #[test]
    fn gradient_penalty_matches_the_analytic_norm() {
        let device = Default::default();
        let critic = MeanCritic::<TB>::init(3, &device);
        let images = Tensor::random(
            [2, 3, 4, 4],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );

        // The critic score is `weight * mean(x)`, so the input gradient is
        // `weight / (c * h * w)` everywhere and its per-sample norm is
        // `weight / sqrt(c * h * w)`.
        let norm = 0.5 / (48.0f64).sqrt();
        let target = (norm - 1.0).powi(2);

        let penalty: f64 =
            gradient_penalty(&critic, images).into_scalar().into();
        assert!((penalty - target).abs() < 1e-5, "{penalty} != {target}");
    }

    #[test]
    fn gradient_penalty_at_the_mixing_boundaries() {
        let device = Default::default();
        let critic = MeanCritic::<TB>::init(2, &device);
        let real = Tensor::random(
            [2, 3, 4, 4],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let fake = Tensor::random(
            [2, 3, 4, 4],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );

        let at_real: f64 =
            gradient_penalty(&critic, real.to_owned()).into_scalar().into();
        let at_one: f64 = gradient_penalty(
            &critic,
            interpolate(
                real.to_owned(),
                fake.to_owned(),
                Tensor::ones([2, 1, 1, 1], &device),
            ),
        )
        .into_scalar()
        .into();
        assert!((at_one - at_real).abs() < 1e-6, "{at_one} != {at_real}");

        let at_fake: f64 =
            gradient_penalty(&critic, fake.to_owned()).into_scalar().into();
        let at_zero: f64 = gradient_penalty(
            &critic,
            interpolate(real, fake, Tensor::zeros([2, 1, 1, 1], &device)),
        )
        .into_scalar()
        .into();
        assert!((at_zero - at_fake).abs() < 1e-6, "{at_zero} != {at_fake}");
    }

    #[test]
    fn gradient_penalty_is_nonnegative() {
        let device = Default::default();
        let critic = MeanCritic::<TB>::init(2, &device);

        for seed in [89, 144, 233] {
            TB::seed(seed);
            let images = Tensor::random(
                [3, 3, 2, 2],
                Distribution::Uniform(-1.0, 1.0),
                &device,
            );
            let penalty: f64 =
                gradient_penalty(&critic, images).into_scalar().into();
            assert!(penalty >= 0.0);
        }
    }
}
