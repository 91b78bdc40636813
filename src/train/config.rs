pub use super::*;
pub use burn::optim::AdamConfig;

use std::time::Instant;

/// The training surface of the expression editor.
///
/// Learning rates and `alpha_rec` seed the mutable [`TrainingState`]; the
/// remaining fields are read-only during the run.
#[derive(Config)]
pub struct ExpressionGanTrainerConfig {
    /// Where sampled generations are written as PNG strips.
    pub sample_dir: String,

    /// Where model checkpoints are written.
    pub model_dir: String,

    #[config(default = "20")]
    pub num_epochs: u64,

    /// Epoch count after which both learning rates decay by 10% per epoch.
    #[config(default = "10")]
    pub num_epochs_decay: u64,

    /// Discriminator updates per generator update.
    #[config(default = "5")]
    pub n_critic: u64,

    #[config(default = "25")]
    pub batch_size: usize,

    #[config(default = "1e-4")]
    pub g_lr: f64,

    #[config(default = "1e-4")]
    pub d_lr: f64,

    /// Weight of the action-unit regression losses.
    #[config(default = "160.0")]
    pub lambda_cls: f64,

    /// Weight of the gradient penalty.
    #[config(default = "10.0")]
    pub lambda_gp: f64,

    /// Weight of the cyclic reconstruction loss.
    #[config(default = "10.0")]
    pub lambda_rec: f64,

    /// Weight of the attention total-variation losses.
    #[config(default = "1e-4")]
    pub lambda_smooth: f64,

    /// Weight of the attention saturation losses.
    #[config(default = "0.1")]
    pub lambda_sat: f64,

    /// The bound of the uniform noise perturbing sampled target labels.
    #[config(default = "0.1")]
    pub label_noise: f64,

    /// Trains the generator with the virtual double-cycle instead of the
    /// plain cycle.
    #[config(default = "false")]
    pub use_virtual: bool,

    /// Forwards loss scalars to the metrics sink, when one is attached.
    #[config(default = "true")]
    pub use_tensorboard: bool,

    /// Device ordinal hint. The caller maps it onto a backend device
    /// before `init`.
    #[config(default = "0")]
    pub gpu_id: u64,

    #[config(default = "1000")]
    pub sample_step: u64,

    #[config(default = "10000")]
    pub model_save_step: u64,

    #[config(default = "10")]
    pub log_step: u64,

    /// Restores both networks from this iteration's checkpoint and starts
    /// the first epoch there.
    pub resume_iters: Option<u64>,

    /// Input directory of the expression-animation utility.
    pub animation_images_dir: Option<String>,

    /// Output directory of the expression-animation utility.
    pub animation_results_dir: Option<String>,

    /// WGAN training wants a low first-moment decay.
    #[config(default = "AdamConfig::new().with_beta_1(0.5)")]
    pub optimizer_adam: AdamConfig,
}

/// The mutable loop counters and schedules of one training run.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingState {
    /// Blend weight of the virtual cycle within the reconstruction losses.
    /// Reset to one at every epoch start.
    pub alpha_rec: f64,
    pub d_lr: f64,
    pub epoch: u64,
    /// The iteration the current epoch starts at. Non-zero only on the
    /// resumed first epoch.
    pub first_iteration: u64,
    pub g_lr: f64,
    /// Counts every completed iteration across epochs. Keys the sink.
    pub global_step: u64,
    pub iteration: u64,
}

impl ExpressionGanTrainerConfig {
    pub fn init<AB, G, D>(
        &self,
        device: &AB::Device,
        generator: G,
        discriminator: D,
    ) -> ExpressionGanTrainer<AB, G, D>
    where
        AB: AutodiffBackend,
        G: AttentionGenerator<AB>,
        D: ExpressionCritic<AB>,
    {
        ExpressionGanTrainer {
            device: device.to_owned(),
            discriminator,
            generator,
            losses: LossBoard::default(),
            optimizer_d: self.optimizer_adam.init(),
            optimizer_g: self.optimizer_adam.init(),
            sink: None,
            start_time: Instant::now(),
            state: TrainingState {
                alpha_rec: 1.0,
                d_lr: self.d_lr,
                epoch: 0,
                first_iteration: 0,
                g_lr: self.g_lr,
                global_step: 0,
                iteration: 0,
            },
            config: self.to_owned(),
        }
    }
}

// `burn::optim::AdamConfig` implements `Display` but not `Debug`, so the
// derive cannot be used; this impl mirrors it field for field.
impl core::fmt::Debug for ExpressionGanTrainerConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExpressionGanTrainerConfig")
            .field("sample_dir", &self.sample_dir)
            .field("model_dir", &self.model_dir)
            .field("num_epochs", &self.num_epochs)
            .field("num_epochs_decay", &self.num_epochs_decay)
            .field("n_critic", &self.n_critic)
            .field("batch_size", &self.batch_size)
            .field("g_lr", &self.g_lr)
            .field("d_lr", &self.d_lr)
            .field("lambda_cls", &self.lambda_cls)
            .field("lambda_gp", &self.lambda_gp)
            .field("lambda_rec", &self.lambda_rec)
            .field("lambda_smooth", &self.lambda_smooth)
            .field("lambda_sat", &self.lambda_sat)
            .field("label_noise", &self.label_noise)
            .field("use_virtual", &self.use_virtual)
            .field("use_tensorboard", &self.use_tensorboard)
            .field("gpu_id", &self.gpu_id)
            .field("sample_step", &self.sample_step)
            .field("model_save_step", &self.model_save_step)
            .field("log_step", &self.log_step)
            .field("resume_iters", &self.resume_iters)
            .field("animation_images_dir", &self.animation_images_dir)
            .field("animation_results_dir", &self.animation_results_dir)
            .field("optimizer_adam", &format_args!("{}", self.optimizer_adam))
            .finish()
    }
}

impl Default for ExpressionGanTrainerConfig {
    fn default() -> Self {
        Self::new("samples".into(), "models".into())
    }
}
