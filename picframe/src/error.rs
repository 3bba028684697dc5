//! Error types shared by the compositor, the encoder and the palette extractor

use imageproc::image::ImageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Input bytes could not be rasterized
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),

    /// The composed canvas could not be written in the requested format
    #[error("failed to encode {format}: {reason}")]
    Encoding {
        format: &'static str,
        reason: String,
    },

    /// Parameters resolve to a degenerate canvas
    #[error("invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

impl Error {
    pub(crate) fn encoding(format: &'static str, reason: impl ToString) -> Self {
        Error::Encoding {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}
