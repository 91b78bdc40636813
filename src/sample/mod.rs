pub use crate::dataset::LabelPool;
pub use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor, TensorData},
};

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::fmt;

/// Randomized target action-unit vectors for one training step.
///
/// The virtual target is present in virtual-cycle mode only.
#[derive(Clone, Debug)]
pub struct TargetLabels<B: Backend> {
    pub target: Tensor<B, 2>,
    pub virtual_target: Option<Tensor<B, 2>>,
}

/// Drawing randomized target labels from the dataset distribution.
#[derive(Config, Debug)]
pub struct LabelSamplerConfig {
    pub batch_size: usize,

    /// The bound of the uniform perturbation applied per component.
    #[config(default = "0.1")]
    pub noise: f64,

    #[config(default = "false")]
    pub use_virtual: bool,
}

pub struct LabelSampler {
    pub batch_size: usize,
    pub noise: f64,
    pub use_virtual: bool,
    rng: StdRng,
}

impl LabelSamplerConfig {
    pub fn init(&self) -> LabelSampler {
        LabelSampler {
            batch_size: self.batch_size,
            noise: self.noise,
            use_virtual: self.use_virtual,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn init_with_seed(
        &self,
        seed: u64,
    ) -> LabelSampler {
        LabelSampler {
            batch_size: self.batch_size,
            noise: self.noise,
            use_virtual: self.use_virtual,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl LabelSampler {
    /// Draw one target label per batch row: a uniformly random pool entry
    /// (with replacement), perturbed by independent uniform noise in
    /// `[-noise, noise]` per component, clamped to `[0, 1]`.
    ///
    /// In virtual mode a second independent target is drawn. It must differ
    /// from the primary target; an identical draw signals a degenerate
    /// sampling distribution and panics.
    pub fn sample<B: Backend>(
        &mut self,
        pool: &impl LabelPool,
        device: &B::Device,
    ) -> TargetLabels<B> {
        let target_rows = self.draw_rows(pool);

        let virtual_target = self.use_virtual.then(|| {
            let virtual_rows = self.draw_rows(pool);
            assert_ne!(
                target_rows, virtual_rows,
                "target and virtual labels must not coincide",
            );

            Self::into_tensor(virtual_rows, device)
        });

        TargetLabels {
            target: Self::into_tensor(target_rows, device),
            virtual_target,
        }
    }

    fn draw_rows(
        &mut self,
        pool: &impl LabelPool,
    ) -> Vec<Vec<f32>> {
        (0..self.batch_size)
            .map(|_| {
                let index = self.rng.gen_range(0..pool.sample_count());
                pool.label(index)
                    .into_iter()
                    .map(|value| {
                        let noise = if self.noise > 0.0 {
                            self.rng.gen_range(-self.noise..self.noise)
                        } else {
                            0.0
                        };
                        (value as f64 + noise).clamp(0.0, 1.0) as f32
                    })
                    .collect()
            })
            .collect()
    }

    fn into_tensor<B: Backend>(
        rows: Vec<Vec<f32>>,
        device: &B::Device,
    ) -> Tensor<B, 2> {
        let row_count = rows.len();
        let attribute_count = rows.first().map_or(0, Vec::len);

        Tensor::from_data(
            TensorData::new(
                rows.into_iter().flatten().collect(),
                [row_count, attribute_count],
            ),
            device,
        )
    }
}

impl fmt::Debug for LabelSampler {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("LabelSampler")
            .field("batch_size", &self.batch_size)
            .field("noise", &self.noise)
            .field("use_virtual", &self.use_virtual)
            .finish()
    }
}
