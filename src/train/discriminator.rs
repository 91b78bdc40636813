pub use super::*;

impl<AB, G, D> ExpressionGanTrainer<AB, G, D>
where
    AB: AutodiffBackend,
    G: AttentionGenerator<AB>,
    D: ExpressionCritic<AB>,
{
    /// One critic update: Wasserstein scores on real and generated images,
    /// action-unit regression on the origin labels and the gradient penalty
    /// on randomly mixed images.
    ///
    /// The penalty value is first-order (see [`gradient_penalty`]): it is
    /// weighted into the total and logged, but pushes no parameter
    /// gradients of its own.
    ///
    /// Rebuilds the loss board with the `D/*` entries, weighted the way
    /// they enter the objective.
    pub fn train_discriminator(
        &mut self,
        batch: &Batch<AB>,
        targets: &Tensor<AB, 2>,
    ) -> &mut Self {
        let scores = self.discriminator.judge(batch.images.to_owned());
        let loss_real = scores.critic.mean().neg();
        let loss_cls = MeanSquareError::init()
            .evaluate(scores.classes, batch.labels.to_owned());

        // The generator only feeds images here; its graph is cut off.
        let generated = self
            .generator
            .generate(batch.images.to_owned(), targets.to_owned());
        let fake = image_from_attention(
            generated.attention,
            generated.regression,
            batch.images.to_owned(),
        )
        .detach();
        let loss_fake = self.discriminator.judge(fake.to_owned()).critic.mean();

        let [n, ..] = batch.images.dims();
        let alpha = Tensor::random(
            [n, 1, 1, 1],
            Distribution::Uniform(0.0, 1.0),
            &self.device,
        );
        let mixed = interpolate(batch.images.to_owned(), fake, alpha);
        let loss_gp = gradient_penalty(&self.discriminator, mixed);

        let loss = loss_real
            .to_owned()
            .add(loss_fake.to_owned())
            .add(loss_cls.to_owned().mul_scalar(self.config.lambda_cls))
            .add(loss_gp.to_owned().mul_scalar(self.config.lambda_gp));

        self.losses
            .clear()
            .put("D/loss", scalar(&loss))
            .put("D/loss_real", scalar(&loss_real))
            .put("D/loss_fake", scalar(&loss_fake))
            .put("D/loss_cls", self.config.lambda_cls * scalar(&loss_cls))
            .put("D/loss_gp", self.config.lambda_gp * scalar(&loss_gp));

        let grads = GradientsParams::from_grads(
            loss.backward(),
            &self.discriminator,
        );
        self.discriminator = self.optimizer_d.step(
            self.state.d_lr,
            self.discriminator.to_owned(),
            grads,
        );

        #[cfg(all(debug_assertions, not(test)))]
        log::debug!(
            target: "exprgan::trainer::discriminator",
            "train_discriminator ({})",
            self.state.iteration,
        );

        self
    }
}
