pub use burn::tensor::{backend::Backend, Tensor};

/// Blending an attention mask and a color regression map into the source
/// image:
///
/// `attention * regression + (1 - attention) * source`
///
/// The mask holds per-pixel weights in `[0, 1]`. A single-channel mask of
/// shape `[N, 1, H, W]` is expanded across the source channels. The output
/// shape always equals the source shape.
pub fn image_from_attention<B: Backend>(
    attention: Tensor<B, 4>,
    regression: Tensor<B, 4>,
    source: Tensor<B, 4>,
) -> Tensor<B, 4> {
    let attention = if attention.dims() == source.dims() {
        attention
    } else {
        attention.expand(source.dims())
    };

    attention
        .to_owned()
        .mul(regression)
        .add(attention.neg().add_scalar(1.0).mul(source))
}

/// Mapping images from the `[-1, 1]` training range into `[0, 1]` for
/// visualization.
#[inline]
pub fn denormalize<B: Backend>(images: Tensor<B, 4>) -> Tensor<B, 4> {
    images.add_scalar(1.0).div_scalar(2.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    #[test]
    fn image_from_attention_boundaries() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();

        let regression = Tensor::<NdArray, 4>::full([2, 3, 4, 4], 0.75, &device);
        let source = Tensor::<NdArray, 4>::full([2, 3, 4, 4], -0.25, &device);

        // An all-zero mask passes the source through unchanged.
        let attention = Tensor::zeros([2, 1, 4, 4], &device);
        let output = image_from_attention(
            attention,
            regression.to_owned(),
            source.to_owned(),
        );
        output.into_data().assert_eq(&source.to_owned().into_data(), true);

        // An all-one mask replaces the source with the regression.
        let attention = Tensor::ones([2, 1, 4, 4], &device);
        let output = image_from_attention(
            attention,
            regression.to_owned(),
            source,
        );
        output.into_data().assert_eq(&regression.into_data(), true);
    }

    #[test]
    fn image_from_attention_convexity() {
        use super::*;
        use burn::backend::NdArray;
        use burn::tensor::Distribution;

        let device = Default::default();

        let attention = Tensor::<NdArray, 4>::random(
            [2, 1, 8, 8],
            Distribution::Uniform(0.0, 1.0),
            &device,
        );
        let regression = Tensor::<NdArray, 4>::random(
            [2, 3, 8, 8],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );
        let source = Tensor::<NdArray, 4>::random(
            [2, 3, 8, 8],
            Distribution::Uniform(-1.0, 1.0),
            &device,
        );

        let output = image_from_attention(
            attention,
            regression.to_owned(),
            source.to_owned(),
        );
        assert_eq!(output.dims(), source.dims());

        // Each component stays between the regression and the source.
        let lower = regression.to_owned().min_pair(source.to_owned());
        let upper = regression.max_pair(source);
        let target = true;
        let output_above = output
            .to_owned()
            .greater_equal(lower.sub_scalar(1e-6))
            .all()
            .into_scalar();
        let output_below = output
            .lower_equal(upper.add_scalar(1e-6))
            .all()
            .into_scalar();
        assert_eq!(output_above, target);
        assert_eq!(output_below, target);
    }

    #[test]
    fn denormalize_range() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();

        let images = Tensor::<NdArray, 4>::from_data(
            [[[[-1.0, -0.5], [0.0, 1.0]]]],
            &device,
        );
        let output = denormalize(images);
        output
            .into_data()
            .assert_eq(
                &Tensor::<NdArray, 4>::from_data(
                    [[[[0.0, 0.25], [0.5, 1.0]]]],
                    &device,
                )
                .into_data(),
                true,
            );
    }
}
