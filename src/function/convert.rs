pub use crate::error::Error;
pub use burn::tensor::{backend::Backend, Tensor};
pub use image::RgbImage;

use std::path::Path;

/// Tiles a `[N, C, H, W]` batch in `[0, 1]` into one horizontal 8-bit RGB
/// strip. Single-channel tensors (attention masks) are replicated to gray.
pub fn rgb_image_from_batch<B: Backend>(images: Tensor<B, 4>) -> RgbImage {
    let [n, c, h, w] = images.dims();
    let data = images
        .clamp(0.0, 1.0)
        .mul_scalar(255.0)
        .into_data()
        .convert::<f32>();
    let values = data
        .to_vec::<f32>()
        .expect("image tensor data should be f32 after conversion");

    let value_at = |index: usize, channel: usize, y: usize, x: usize| {
        let channel = channel.min(c - 1);
        values[((index * c + channel) * h + y) * w + x] as u8
    };

    RgbImage::from_fn((n * w) as u32, h as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let (index, x) = (x / w, x % w);

        image::Rgb([
            value_at(index, 0, y, x),
            value_at(index, 1, y, x),
            value_at(index, 2, y, x),
        ])
    })
}

/// Writes a `[N, C, H, W]` batch in `[0, 1]` to a PNG file.
pub fn save_image_batch<B: Backend>(
    images: Tensor<B, 4>,
    path: &Path,
) -> Result<(), Error> {
    rgb_image_from_batch(images).save(path)?;

    Ok(())
}
