//! Dominant color suggestions from an image

mod kmeans;
mod sample;

use crate::color::Color;
use crate::error::Result;
use crate::image::{decode, Bitmap};

/// How many colors the editor asks for after loading an image
pub const DEFAULT_COLOR_COUNT: usize = 5;

/// Returned when no pixel survives the sampling filters
pub const FALLBACK_PALETTE: [Color; 5] = [
    Color::rgb(0x3b, 0x82, 0xf6),
    Color::rgb(0x10, 0xb9, 0x81),
    Color::rgb(0xf5, 0x9e, 0x0b),
    Color::rgb(0xef, 0x44, 0x44),
    Color::rgb(0x8b, 0x5c, 0xf6),
];

/// The fallback palette cycled to exactly `k` entries
pub fn fallback_palette(k: usize) -> Vec<Color> {
    FALLBACK_PALETTE.iter().copied().cycle().take(k).collect()
}

/// Suggest `k` opaque colors from `img`, most dominant first.
///
/// Never fails: images with nothing worth sampling (fully transparent,
/// near-black or near-white) get [`fallback_palette`].
#[tracing::instrument(skip(img), fields(width = img.width(), height = img.height()))]
pub fn extract_palette(img: &Bitmap, k: usize) -> Vec<Color> {
    let small = sample::downsample(img);
    let pixels = sample::sample(&small);
    log::debug!(
        "sampled {} pixels from {}x{}",
        pixels.len(),
        small.width(),
        small.height()
    );

    if pixels.is_empty() {
        return fallback_palette(k);
    }

    kmeans::quantize(&pixels, k)
        .into_iter()
        .take(k)
        .map(|cluster| {
            let [r, g, b] = cluster.centroid;
            Color::rgb(r, g, b)
        })
        .collect()
}

/// Decode `data` and suggest `k` colors from it
pub fn extract_palette_from_bytes(data: &[u8], k: usize) -> Result<Vec<Color>> {
    let img = decode(data)?;
    Ok(extract_palette(&img, k))
}
