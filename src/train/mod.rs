pub mod checkpoint;
pub mod config;
pub mod discriminator;
pub mod generator;
pub mod penalty;

pub use crate::{
    compose::{denormalize, image_from_attention},
    dataset::{Batch, ExpressionDataset, Fetch},
    error::Error,
    metric::{MeanAbsoluteError, MeanSquareError, Metric, TotalVariation},
    model::{
        AdamModuleOptimizer, AttentionGenerator, AttentionOutput, CriticScores,
        ExpressionCritic, GradientsParams, Optimizer,
    },
    monitor::{format_elapsed, LossBoard, ScalarSink},
    range::Cadence,
    sample::{LabelSampler, LabelSamplerConfig, TargetLabels},
};
pub use burn::{
    config::Config,
    tensor::{
        backend::{AutodiffBackend, Backend},
        Distribution, Tensor,
    },
};
pub use config::*;
pub use generator::*;
pub use penalty::*;

use burn::tensor::ElementConversion;
use std::{fmt, time::Instant};

/// The training orchestrator: owns the loop counters, the learning-rate
/// schedule, the loss board and one Adam optimizer per collaborator
/// network.
pub struct ExpressionGanTrainer<AB, G, D>
where
    AB: AutodiffBackend,
    G: AttentionGenerator<AB>,
    D: ExpressionCritic<AB>,
{
    pub config: ExpressionGanTrainerConfig,
    pub device: AB::Device,
    pub discriminator: D,
    pub generator: G,
    pub losses: LossBoard,
    pub optimizer_d: AdamModuleOptimizer<AB, D>,
    pub optimizer_g: AdamModuleOptimizer<AB, G>,
    pub sink: Option<Box<dyn ScalarSink>>,
    pub start_time: Instant,
    pub state: TrainingState,
}

impl<AB, G, D> ExpressionGanTrainer<AB, G, D>
where
    AB: AutodiffBackend,
    G: AttentionGenerator<AB>,
    D: ExpressionCritic<AB>,
{
    /// Runs the adversarial loop over the configured epoch range.
    ///
    /// Every iteration trains the discriminator; the generator trains on the
    /// `n_critic` cadence. Generations are sampled to disk on the
    /// `sample_step` cadence (when one is in hand), checkpoints are written
    /// on the `model_save_step` cadence and at every epoch end, and metrics
    /// flush on the `log_step` cadence. Past `num_epochs_decay`, both
    /// learning rates shrink by 10% per epoch boundary.
    pub fn train<S>(
        &mut self,
        dataset: &mut S,
    ) -> Result<&mut Self, Error>
    where
        S: ExpressionDataset<AB>,
    {
        let first_iteration = match self.config.resume_iters {
            Some(iteration) => {
                self.restore(iteration)?;
                iteration
            },
            None => 0,
        };
        self.state.first_iteration = first_iteration;
        self.state.global_step = 0;
        self.start_time = Instant::now();

        let mut sampler = LabelSamplerConfig::new(self.config.batch_size)
            .with_noise(self.config.label_noise)
            .with_use_virtual(self.config.use_virtual)
            .init();

        let batch_count = dataset.batch_count();
        let cadence_critic = Cadence::shifted(self.config.n_critic);
        let cadence_sample = Cadence::shifted(self.config.sample_step);
        let cadence_save = Cadence::every(self.config.model_save_step);
        let cadence_log = Cadence::every(self.config.log_step);

        for epoch in self.state.epoch..self.config.num_epochs {
            self.state.epoch = epoch;
            self.state.alpha_rec = 1.0;

            log::info!(
                target: "exprgan::trainer::train",
                "Epoch {epoch} with {batch_count} steps",
            );

            let mut generation = None;

            for iteration in self.state.first_iteration..batch_count {
                self.state.iteration = iteration;

                let batch = Self::fetch_batch(dataset)?;
                let targets = sampler.sample::<AB>(dataset, &self.device);

                self.train_discriminator(&batch, &targets.target);

                if cadence_critic.hits(iteration) {
                    generation = Some(self.train_generator(&batch, &targets));
                }
                if cadence_sample.hits(iteration) {
                    if let Some(generation) = &generation {
                        self.sample_generations(generation, &batch)?;
                    }
                }
                if cadence_save.hits(iteration) {
                    self.checkpoint(iteration)?;
                }
                if cadence_log.hits(iteration) {
                    self.report(batch_count);
                }

                self.state.global_step += 1;
            }

            if epoch + 1 > self.config.num_epochs_decay {
                self.state.g_lr -= self.state.g_lr / 10.0;
                self.state.d_lr -= self.state.d_lr / 10.0;

                log::info!(
                    target: "exprgan::trainer::train",
                    "Decayed learning rates: g_lr {}, d_lr {}",
                    self.state.g_lr,
                    self.state.d_lr,
                );
            }

            self.checkpoint(self.state.iteration)?;
            self.state.first_iteration = 0;
        }

        Ok(self)
    }

    /// Fetches the next batch, restarting the source once on exhaustion.
    fn fetch_batch<S>(dataset: &mut S) -> Result<Batch<AB>, Error>
    where
        S: ExpressionDataset<AB>,
    {
        match dataset.try_next() {
            Fetch::Batch(batch) => Ok(batch),
            Fetch::EndOfEpoch => {
                dataset.restart();

                match dataset.try_next() {
                    Fetch::Batch(batch) => Ok(batch),
                    Fetch::EndOfEpoch => Err(Error::EmptyDataSource),
                }
            },
        }
    }

    /// Formats the elapsed time and every loss-board entry, and forwards
    /// the scalars to the metrics sink keyed by the global step.
    pub fn report(
        &mut self,
        batch_count: u64,
    ) -> &mut Self {
        let elapsed = format_elapsed(self.start_time.elapsed());
        let mut line = format!(
            "Elapsed [{elapsed}], Iteration [{}/{batch_count}], Epoch [{}/{}]",
            self.state.iteration + 1,
            self.state.epoch + 1,
            self.config.num_epochs,
        );
        for (tag, value) in self.losses.iter() {
            line.push_str(&format!(", {tag}: {value:.4}"));
        }
        log::info!(target: "exprgan::trainer::train", "{line}");

        if self.config.use_tensorboard {
            if let Some(sink) = self.sink.as_mut() {
                for (tag, value) in self.losses.iter() {
                    sink.scalar(tag, value, self.state.global_step);
                }
            }
        }

        self
    }

    /// Writes one PNG per intermediate tensor of the generation under the
    /// sample directory, named `{epoch}_{tag}_.png`.
    pub fn sample_generations(
        &self,
        generation: &GeneratorStepResult<AB>,
        batch: &Batch<AB>,
    ) -> Result<&Self, Error> {
        use crate::function::save_image_batch;

        std::fs::create_dir_all(&self.config.sample_dir)?;
        let directory = std::path::Path::new(&self.config.sample_dir);
        let epoch = self.state.epoch;
        let save = |images: Tensor<AB, 4>, tag: &str| {
            save_image_batch(images, &directory.join(format!("{epoch}_{tag}_.png")))
        };

        let direct = match generation {
            GeneratorStepResult::Direct(direct) => direct,
            GeneratorStepResult::Virtual(generation) => &generation.direct,
        };

        save(direct.attention.to_owned(), "1attention")?;
        save(denormalize(direct.regression.to_owned()), "2reg")?;
        save(denormalize(direct.fake.to_owned()), "3res")?;
        save(denormalize(batch.images.to_owned()), "4real")?;
        save(denormalize(direct.reconstruction.to_owned()), "5rec")?;
        save(direct.reconstructed_attention.to_owned(), "6rec_attention")?;
        save(
            denormalize(direct.reconstructed_regression.to_owned()),
            "7rec_reg",
        )?;

        if let GeneratorStepResult::Virtual(generation) = generation {
            save(
                generation.virtual_attention.to_owned(),
                "8rec_virtual_attention",
            )?;
            save(
                denormalize(generation.virtual_regression.to_owned()),
                "91rec_virtual_reg",
            )?;
            save(
                denormalize(generation.virtual_reconstruction.to_owned()),
                "92rec_virtual",
            )?;
        }

        Ok(self)
    }
}

impl<AB, G, D> fmt::Debug for ExpressionGanTrainer<AB, G, D>
where
    AB: AutodiffBackend,
    G: AttentionGenerator<AB>,
    D: ExpressionCritic<AB>,
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("ExpressionGanTrainer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("losses", &self.losses)
            .field("optimizer_d", &format!("Adam<{}>", AB::name()))
            .field("optimizer_g", &format!("Adam<{}>", AB::name()))
            .finish()
    }
}

/// Reads a loss tensor of shape `[1]` into the loss board's scalar domain.
pub(crate) fn scalar<B: Backend>(value: &Tensor<B, 1>) -> f64 {
    value.to_owned().into_scalar().elem()
}
