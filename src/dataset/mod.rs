pub use burn::tensor::{backend::Backend, Tensor, TensorData};

use std::fmt;

/// A co-indexed batch of face images and their origin action-unit vectors.
///
/// Images have shape `[N, C, H, W]` in `[-1, 1]`, labels `[N, A]` in
/// `[0, 1]`.
#[derive(Clone, Debug)]
pub struct Batch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub labels: Tensor<B, 2>,
}

/// The outcome of a batch fetch.
///
/// An exhausted source reports [`Fetch::EndOfEpoch`] instead of failing.
/// The training loop restarts the source and retries once.
#[derive(Clone, Debug)]
pub enum Fetch<B: Backend> {
    Batch(Batch<B>),
    EndOfEpoch,
}

/// Indexed access to the label pool, used by the label sampler.
pub trait LabelPool {
    fn sample_count(&self) -> usize;

    /// The action-unit vector of the sample at `index`.
    fn label(
        &self,
        index: usize,
    ) -> Vec<f32>;
}

/// A restartable sequence of training batches over a fixed-length epoch.
pub trait ExpressionDataset<B: Backend>: LabelPool {
    /// The number of full batches per epoch.
    fn batch_count(&self) -> u64;

    fn try_next(&mut self) -> Fetch<B>;

    fn restart(&mut self);
}

/// An in-memory data source over pre-decoded samples.
///
/// Batches are fixed-size; a trailing partial batch is reported as
/// [`Fetch::EndOfEpoch`].
#[derive(Clone)]
pub struct InMemoryDataset<B: Backend> {
    pub batch_size: usize,
    pub samples: Vec<(Tensor<B, 3>, Vec<f32>)>,
    cursor: usize,
}

impl<B: Backend> InMemoryDataset<B> {
    pub fn init(
        samples: Vec<(Tensor<B, 3>, Vec<f32>)>,
        batch_size: usize,
    ) -> Self {
        Self {
            batch_size,
            samples,
            cursor: 0,
        }
    }
}

impl<B: Backend> LabelPool for InMemoryDataset<B> {
    #[inline]
    fn sample_count(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    fn label(
        &self,
        index: usize,
    ) -> Vec<f32> {
        self.samples[index].1.to_owned()
    }
}

impl<B: Backend> ExpressionDataset<B> for InMemoryDataset<B> {
    #[inline]
    fn batch_count(&self) -> u64 {
        (self.samples.len() / self.batch_size) as u64
    }

    fn try_next(&mut self) -> Fetch<B> {
        if self.cursor + self.batch_size > self.samples.len() {
            return Fetch::EndOfEpoch;
        }

        let rows = &self.samples[self.cursor..self.cursor + self.batch_size];
        self.cursor += self.batch_size;

        let device = rows[0].0.device();
        let attribute_count = rows[0].1.len();
        let images = Tensor::stack(
            rows.iter().map(|(image, _)| image.to_owned()).collect(),
            0,
        );
        let labels = Tensor::from_data(
            TensorData::new(
                rows.iter().flat_map(|(_, label)| label.to_owned()).collect(),
                [self.batch_size, attribute_count],
            ),
            &device,
        );

        Fetch::Batch(Batch { images, labels })
    }

    #[inline]
    fn restart(&mut self) {
        self.cursor = 0;
    }
}

impl<B: Backend> fmt::Debug for InMemoryDataset<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("InMemoryDataset")
            .field("batch_size", &self.batch_size)
            .field("samples.len()", &self.samples.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
