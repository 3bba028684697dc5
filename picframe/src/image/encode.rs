//! Image encoding: PNG, JPEG, WebP

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use imageproc::image::codecs::jpeg::JpegEncoder;
use imageproc::image::codecs::png::PngEncoder;
use imageproc::image::{ExtendedColorType, ImageEncoder, RgbImage};
use webp::WebPMemory;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::Bitmap;
use crate::error::{Error, Result};
use crate::params::OutputFormat;

// libwebp refuses anything larger
const WEBP_MAX_DIMENSION: u32 = 16_383;

/// Compress an image to JPEG with the specified quality.
///
/// JPEG has no alpha channel, so pixels are flattened over black first.
pub fn compress_to_jpeg<W>(img: &Bitmap, writer: &mut W, quality: u8) -> Result<()>
where
    W: std::io::Write,
{
    let flattened = RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let over_black = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        [over_black(r), over_black(g), over_black(b)].into()
    });

    let mut encoder = JpegEncoder::new_with_quality(writer, quality);
    encoder
        .encode_image(&flattened)
        .map_err(|e| Error::encoding("jpeg", e))
}

/// Compress an image to lossless PNG, alpha preserved
pub fn compress_to_png<W>(img: &Bitmap, writer: &mut W) -> Result<()>
where
    W: std::io::Write,
{
    PngEncoder::new(writer)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| Error::encoding("png", e))
}

/// Compress an image to lossy WebP with the specified quality, alpha preserved
pub fn compress_to_webp(img: &Bitmap, quality: u8) -> Result<WebPMemory> {
    if img.width() > WEBP_MAX_DIMENSION || img.height() > WEBP_MAX_DIMENSION {
        return Err(Error::encoding(
            "webp",
            format!("{}x{} exceeds {WEBP_MAX_DIMENSION}px", img.width(), img.height()),
        ));
    }

    let encoder = webp::Encoder::from_rgba(img.as_raw(), img.width(), img.height());
    encoder
        .encode_simple(false, quality as f32)
        .map_err(|e| Error::encoding("webp", format!("{e:?}")))
}

/// Encode `img` as `format`. `quality` must be 1-100 and only matters for
/// the lossy formats.
pub fn encode(img: &Bitmap, format: OutputFormat, quality: u8) -> Result<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(Error::encoding(
            format.extension(),
            format!("quality {quality} is outside 1-100"),
        ));
    }

    let (width, height) = img.dimensions();
    let mut buffer = Vec::with_capacity(width as usize * height as usize);

    match format {
        OutputFormat::Jpeg => compress_to_jpeg(img, &mut buffer, quality)?,
        OutputFormat::Png => compress_to_png(img, &mut buffer)?,
        OutputFormat::WebP => buffer.extend_from_slice(&compress_to_webp(img, quality)?),
    }

    log::trace!(
        "encoded {width}x{height} as {} ({} bytes)",
        format.extension(),
        buffer.len()
    );
    Ok(buffer)
}

/// Encode to an embeddable `data:` URI wrapping exactly the bytes of [`encode`]
pub fn encode_data_uri(img: &Bitmap, format: OutputFormat, quality: u8) -> Result<String> {
    let bytes = encode(img, format, quality)?;
    Ok(format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes)))
}

/// `bordered-<unix-ms>.<ext>`
pub fn default_file_name(format: OutputFormat) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("bordered-{millis}.{}", format.extension())
}

/// An encoded image ready to be handed to a save-as-file collaborator
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub file_name: String,
    pub data: Vec<u8>,
    pub dimensions: (u32, u32),
    pub format: OutputFormat,
}

impl EncodedImage {
    pub fn new(
        img: &Bitmap,
        format: OutputFormat,
        quality: u8,
        file_name: Option<String>,
    ) -> Result<Self> {
        let encoded = EncodedImage {
            file_name: file_name.unwrap_or_else(|| default_file_name(format)),
            data: encode(img, format, quality)?,
            dimensions: img.dimensions(),
            format,
        };

        log::debug!("encoded image: {}", encoded.file_name);
        Ok(encoded)
    }

    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// Write into `dir` under the image's file name
    pub fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.data)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::image::Rgba;

    fn sample() -> Bitmap {
        Bitmap::from_fn(12, 9, |x, y| Rgba([(x * 20) as u8, (y * 25) as u8, 90, 200]))
    }

    #[test]
    fn quality_out_of_range() {
        for quality in [0, 101] {
            let err = encode(&sample(), OutputFormat::Jpeg, quality).unwrap_err();
            assert!(matches!(err, Error::Encoding { .. }));
        }
    }

    #[test]
    fn containers_have_their_magic() {
        let img = sample();
        let png = encode(&img, OutputFormat::Png, 90).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let jpeg = encode(&img, OutputFormat::Jpeg, 90).unwrap();
        assert_eq!(&jpeg[..2], &[0xff, 0xd8]);

        let webp = encode(&img, OutputFormat::WebP, 90).unwrap();
        assert_eq!(&webp[..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn data_uri_wraps_the_same_bytes() {
        let img = sample();
        for format in OutputFormat::iter() {
            let bytes = encode(&img, format, 80).unwrap();
            let uri = encode_data_uri(&img, format, 80).unwrap();

            let prefix = format!("data:{};base64,", format.mime());
            let payload = uri.strip_prefix(&prefix).unwrap();
            assert_eq!(STANDARD.decode(payload).unwrap(), bytes, "{format:?}");
        }
    }

    #[test]
    fn default_names() {
        let name = default_file_name(OutputFormat::Jpeg);
        let millis = name
            .strip_prefix("bordered-")
            .and_then(|rest| rest.strip_suffix(".jpg"))
            .unwrap();
        assert!(millis.parse::<u128>().unwrap() > 0);
    }

    #[test]
    fn saves_under_its_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let encoded =
            EncodedImage::new(&sample(), OutputFormat::Png, 90, Some("out.png".into())).unwrap();

        let path = encoded.save_in(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("out.png"));
        assert_eq!(std::fs::read(path).unwrap(), encoded.data);
        assert_eq!(encoded.mime(), "image/png");
        assert_eq!(encoded.dimensions, (12, 9));
    }
}
