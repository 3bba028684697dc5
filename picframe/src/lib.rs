pub mod color;
pub mod editor;
pub mod error;
pub mod image;
pub mod palette;
pub mod params;

// Re-export commonly used types
pub use color::Color;
pub use editor::{Editor, EditorSettings, ImageInfo};
pub use error::{Error, Result};
pub use image::{compose, decode, encode, encode_data_uri, Bitmap, EncodedImage, Geometry};
pub use palette::{extract_palette, extract_palette_from_bytes, FALLBACK_PALETTE};
pub use params::{BorderStyle, EffectParameters, OutputFormat};
