//! Image decoding

use imageproc::image::load_from_memory;

use super::Bitmap;
use crate::error::{Error, Result};

/// Decode PNG, JPEG, WebP or GIF bytes into an RGBA bitmap
pub fn decode(data: &[u8]) -> Result<Bitmap> {
    let img = load_from_memory(data).map_err(Error::Decode)?;
    log::trace!("decoded {}x{} {:?}", img.width(), img.height(), img.color());
    Ok(img.into_rgba8())
}
