//! Decoding, compositing and encoding of raster images

mod border;
mod canvas;
mod compose;
mod decode;
mod encode;
mod shape;

// Re-export public API
pub use compose::{compose, Geometry, MAX_CANVAS_DIMENSION};
pub use decode::decode;
pub use encode::{
    compress_to_jpeg, compress_to_png, compress_to_webp, default_file_name, encode, encode_data_uri,
    EncodedImage,
};

use imageproc::image::RgbaImage;

/// Decoded RGBA pixels, row-major, 8 bits per channel
pub type Bitmap = RgbaImage;
