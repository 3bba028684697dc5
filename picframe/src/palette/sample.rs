//! Downsampling and pixel sampling ahead of clustering

use fast_image_resize as fr;
use fr::images::Image as FrImage;

use crate::image::Bitmap;

/// Longest side of the buffer the sampler reads from
const MAX_SAMPLE_SIZE: u32 = 100;
/// Read every n-th pixel in raster order
const SAMPLE_STRIDE: usize = 5;
const MIN_ALPHA: u8 = 128;
const NEAR_BLACK: u8 = 10;
const NEAR_WHITE: u8 = 245;

/// Shrink so neither side exceeds [`MAX_SAMPLE_SIZE`]; never upsamples
pub(super) fn downsample(img: &Bitmap) -> Bitmap {
    let (width, height) = img.dimensions();
    let scale = (MAX_SAMPLE_SIZE as f64 / width as f64)
        .min(MAX_SAMPLE_SIZE as f64 / height as f64)
        .min(1.0);

    if scale >= 1.0 {
        return img.clone();
    }

    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);

    match resize(img, new_width, new_height) {
        Some(resized) => resized,
        None => {
            log::warn!("fast resize failed, falling back to imageops::thumbnail");
            imageproc::image::imageops::thumbnail(img, new_width, new_height)
        }
    }
}

fn resize(img: &Bitmap, new_width: u32, new_height: u32) -> Option<Bitmap> {
    let (width, height) = img.dimensions();

    let src_image =
        FrImage::from_vec_u8(width, height, img.as_raw().clone(), fr::PixelType::U8x4).ok()?;

    let mut dst_buffer = vec![0u8; (new_width * new_height * 4) as usize];
    let mut dst_image =
        FrImage::from_slice_u8(new_width, new_height, &mut dst_buffer, fr::PixelType::U8x4)
            .ok()?;

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            Some(
                &fr::ResizeOptions::new()
                    .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)),
            ),
        )
        .ok()?;

    Bitmap::from_raw(new_width, new_height, dst_buffer)
}

/// Opaque-enough pixels that are neither near-black nor near-white
pub(super) fn sample(img: &Bitmap) -> Vec<[u8; 3]> {
    img.pixels()
        .step_by(SAMPLE_STRIDE)
        .filter_map(|p| {
            let [r, g, b, a] = p.0;
            if a < MIN_ALPHA {
                return None;
            }
            if r < NEAR_BLACK && g < NEAR_BLACK && b < NEAR_BLACK {
                return None;
            }
            if r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE {
                return None;
            }
            Some([r, g, b])
        })
        .collect()
}
