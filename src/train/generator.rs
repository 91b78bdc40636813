pub use super::*;

/// The detached intermediate tensors of one generator step, kept for
/// sampling.
#[derive(Clone, Debug)]
pub struct DirectGeneration<B: Backend> {
    pub attention: Tensor<B, 4>,
    pub regression: Tensor<B, 4>,
    pub fake: Tensor<B, 4>,
    pub reconstruction: Tensor<B, 4>,
    pub reconstructed_attention: Tensor<B, 4>,
    pub reconstructed_regression: Tensor<B, 4>,
}

/// A direct generation extended with the virtual double-cycle tensors.
#[derive(Clone, Debug)]
pub struct VirtualGeneration<B: Backend> {
    pub direct: DirectGeneration<B>,
    pub virtual_attention: Tensor<B, 4>,
    pub virtual_regression: Tensor<B, 4>,
    pub virtual_reconstruction: Tensor<B, 4>,
}

#[derive(Clone, Debug)]
pub enum GeneratorStepResult<B: Backend> {
    Direct(DirectGeneration<B>),
    Virtual(VirtualGeneration<B>),
}

impl<AB, G, D> ExpressionGanTrainer<AB, G, D>
where
    AB: AutodiffBackend,
    G: AttentionGenerator<AB>,
    D: ExpressionCritic<AB>,
{
    /// One generator update: adversarial realness and classification on the
    /// generated image, the cyclic reconstruction back to the origin labels
    /// and the attention saturation and smoothness regularizers.
    ///
    /// In virtual mode the generated image additionally round-trips through
    /// an independent virtual target, and the reconstruction-side terms
    /// blend the plain and virtual cycles by `alpha_rec`. The virtual base
    /// image is held constant in the second cycle.
    ///
    /// Extends the loss board with the `G/*` entries.
    pub fn train_generator(
        &mut self,
        batch: &Batch<AB>,
        targets: &TargetLabels<AB>,
    ) -> GeneratorStepResult<AB> {
        assert_eq!(
            self.config.use_virtual,
            targets.virtual_target.is_some(),
            "virtual-cycle mode requires a virtual target label",
        );

        let mae = MeanAbsoluteError::init();
        let smooth = TotalVariation::init();

        // Origin-to-target domain.
        let AttentionOutput {
            attention,
            regression,
        } = self
            .generator
            .generate(batch.images.to_owned(), targets.target.to_owned());
        let fake = image_from_attention(
            attention.to_owned(),
            regression.to_owned(),
            batch.images.to_owned(),
        );

        let scores = self.discriminator.judge(fake.to_owned());
        let loss_fake = scores.critic.mean().neg();
        let loss_cls = MeanSquareError::init()
            .evaluate(scores.classes, targets.target.to_owned());

        // Target-to-origin cycle.
        let rec_out = self
            .generator
            .generate(fake.to_owned(), batch.labels.to_owned());
        let reconstruction = image_from_attention(
            rec_out.attention.to_owned(),
            rec_out.regression.to_owned(),
            fake.to_owned(),
        );

        let loss_sat_1 = attention.to_owned().mean();
        let loss_smooth_1 = smooth.evaluate(attention.to_owned());
        let alpha_rec = self.state.alpha_rec;

        let direct = DirectGeneration {
            attention: attention.detach(),
            regression: regression.detach(),
            fake: fake.to_owned().detach(),
            reconstruction: reconstruction.to_owned().detach(),
            reconstructed_attention: rec_out.attention.to_owned().detach(),
            reconstructed_regression: rec_out.regression.to_owned().detach(),
        };

        let (loss_rec, loss_sat_2, loss_smooth_2, result) =
            match &targets.virtual_target {
                None => (
                    mae.evaluate(
                        batch.images.to_owned(),
                        reconstruction.to_owned(),
                    ),
                    rec_out.attention.to_owned().mean(),
                    smooth.evaluate(rec_out.attention),
                    GeneratorStepResult::Direct(direct),
                ),
                Some(virtual_target) => {
                    // Target-to-virtual, then virtual back to target. The
                    // second hop reconstructs the generated image, not the
                    // origin.
                    let virtual_out = self
                        .generator
                        .generate(fake.to_owned(), virtual_target.to_owned());
                    let fake_virtual = image_from_attention(
                        virtual_out.attention,
                        virtual_out.regression,
                        fake.to_owned(),
                    );
                    let back_out = self.generator.generate(
                        fake_virtual.to_owned(),
                        targets.target.to_owned(),
                    );
                    let virtual_reconstruction = image_from_attention(
                        back_out.attention.to_owned(),
                        back_out.regression.to_owned(),
                        fake_virtual.detach(),
                    );

                    let loss_rec = mae
                        .evaluate(
                            batch.images.to_owned(),
                            reconstruction.to_owned(),
                        )
                        .mul_scalar(1.0 - alpha_rec)
                        .add(
                            mae.evaluate(
                                fake.to_owned(),
                                virtual_reconstruction.to_owned(),
                            )
                            .mul_scalar(alpha_rec),
                        );
                    let loss_sat_2 = rec_out
                        .attention
                        .to_owned()
                        .mean()
                        .mul_scalar(1.0 - alpha_rec)
                        .add(
                            back_out
                                .attention
                                .to_owned()
                                .mean()
                                .mul_scalar(alpha_rec),
                        );
                    let loss_smooth_2 = smooth
                        .evaluate(rec_out.attention)
                        .mul_scalar(1.0 - alpha_rec)
                        .add(
                            smooth
                                .evaluate(back_out.attention.to_owned())
                                .mul_scalar(alpha_rec),
                        );

                    let result =
                        GeneratorStepResult::Virtual(VirtualGeneration {
                            direct,
                            virtual_attention: back_out.attention.detach(),
                            virtual_regression: back_out.regression.detach(),
                            virtual_reconstruction: virtual_reconstruction
                                .detach(),
                        });

                    (loss_rec, loss_sat_2, loss_smooth_2, result)
                },
            };

        let attention_loss = loss_smooth_1
            .to_owned()
            .add(loss_smooth_2.to_owned())
            .mul_scalar(self.config.lambda_smooth)
            .add(
                loss_sat_1
                    .to_owned()
                    .add(loss_sat_2.to_owned())
                    .mul_scalar(self.config.lambda_sat),
            );

        let loss = loss_fake
            .to_owned()
            .add(loss_rec.to_owned().mul_scalar(self.config.lambda_rec))
            .add(loss_cls.to_owned().mul_scalar(self.config.lambda_cls))
            .add(attention_loss.to_owned());

        self.losses
            .put("G/loss", scalar(&loss))
            .put("G/loss_fake", scalar(&loss_fake))
            .put("G/loss_rec", self.config.lambda_rec * scalar(&loss_rec))
            .put("G/loss_cls", self.config.lambda_cls * scalar(&loss_cls))
            .put("G/attention_loss", scalar(&attention_loss))
            .put(
                "G/loss_smooth1",
                self.config.lambda_smooth * scalar(&loss_smooth_1),
            )
            .put(
                "G/loss_smooth2",
                self.config.lambda_smooth * scalar(&loss_smooth_2),
            )
            .put("G/loss_sat1", self.config.lambda_sat * scalar(&loss_sat_1))
            .put("G/loss_sat2", self.config.lambda_sat * scalar(&loss_sat_2));
        if self.config.use_virtual {
            self.losses.put("G/alpha", alpha_rec);
        }

        let grads = GradientsParams::from_grads(loss.backward(), &self.generator);
        self.generator = self.optimizer_g.step(
            self.state.g_lr,
            self.generator.to_owned(),
            grads,
        );

        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "exprgan::trainer::generator",
            "train_generator ({})",
            self.state.iteration,
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemoryDataset;
    use crate::model::testing::{IdentityGenerator, MeanCritic};
    use burn::backend::{Autodiff, NdArray};

    type TB = Autodiff<NdArray>;

    fn fixture(
        tag: &str,
        use_virtual: bool,
    ) -> (
        InMemoryDataset<TB>,
        ExpressionGanTrainer<TB, IdentityGenerator<TB>, MeanCritic<TB>>,
    ) {
        let device = Default::default();
        let dataset = InMemoryDataset::init(
            vec![
                (Tensor::full([3, 4, 4], 0.25, &device), vec![0.2, 0.8]),
                (Tensor::full([3, 4, 4], -0.25, &device), vec![0.6, 0.4]),
            ],
            2,
        );
        let scratch = std::env::temp_dir().join(format!("exprgan-{tag}"));
        let trainer = ExpressionGanTrainerConfig::new(
            scratch.join("samples").display().to_string(),
            scratch.join("models").display().to_string(),
        )
        .with_use_virtual(use_virtual)
        .init(
            &device,
            IdentityGenerator::init(&device),
            MeanCritic::init(2, &device),
        );

        (dataset, trainer)
    }

    #[test]
    fn train_generator_direct_keeps_detached_tensors() {
        TB::seed(89);

        let device = Default::default();
        let (mut dataset, mut trainer) = fixture("g-direct", false);
        let batch = match dataset.try_next() {
            Fetch::Batch(batch) => batch,
            Fetch::EndOfEpoch => {
                panic!("the stub dataset should yield a batch")
            },
        };
        let targets = LabelSamplerConfig::new(2)
            .init_with_seed(89)
            .sample::<TB>(&dataset, &device);

        let result = trainer.train_generator(&batch, &targets);

        let direct = match result {
            GeneratorStepResult::Direct(direct) => direct,
            GeneratorStepResult::Virtual(_) => {
                panic!("direct mode should not produce a virtual generation")
            },
        };
        assert_eq!(direct.attention.dims(), [2, 1, 4, 4]);
        assert_eq!(direct.fake.dims(), [2, 3, 4, 4]);

        // The identity generator reproduces its input exactly, so the
        // cycle is lossless before the optimizer step.
        direct
            .reconstruction
            .into_data()
            .assert_approx_eq(&batch.images.into_data(), 5);
        assert_eq!(trainer.losses.get("G/loss_rec"), Some(0.0));
        assert_eq!(trainer.losses.get("G/alpha"), None);
    }

    #[test]
    fn train_generator_virtual_blends_the_cycles() {
        TB::seed(144);

        let device = Default::default();
        let (mut dataset, mut trainer) = fixture("g-virtual", true);
        let batch = match dataset.try_next() {
            Fetch::Batch(batch) => batch,
            Fetch::EndOfEpoch => {
                panic!("the stub dataset should yield a batch")
            },
        };
        let targets = LabelSamplerConfig::new(2)
            .with_use_virtual(true)
            .init_with_seed(144)
            .sample::<TB>(&dataset, &device);

        trainer.state.alpha_rec = 0.75;
        let result = trainer.train_generator(&batch, &targets);

        assert!(matches!(result, GeneratorStepResult::Virtual(_)));
        assert_eq!(trainer.losses.get("G/alpha"), Some(0.75));
        // Both cycles are lossless under the identity generator.
        assert_eq!(trainer.losses.get("G/loss_rec"), Some(0.0));
    }

    #[test]
    #[should_panic(expected = "virtual-cycle mode requires a virtual target")]
    fn train_generator_rejects_mismatched_mode() {
        let device = Default::default();
        let (mut dataset, mut trainer) = fixture("g-mismatch", true);
        let batch = match dataset.try_next() {
            Fetch::Batch(batch) => batch,
            Fetch::EndOfEpoch => {
                panic!("the stub dataset should yield a batch")
            },
        };
        let targets = LabelSamplerConfig::new(2)
            .init_with_seed(233)
            .sample::<TB>(&dataset, &device);

        trainer.train_generator(&batch, &targets);
    }
}
