//! Canvas geometry and the shadow / border / corner / image layering

use imageproc::filter::gaussian_blur_f32;
use imageproc::geometric_transformations::translate;
use imageproc::image::imageops;
use imageproc::rect::Rect;

use super::border;
use super::canvas::Canvas;
use super::shape::{Mask, RoundedRect};
use super::Bitmap;
use crate::error::{Error, Result};
use crate::params::EffectParameters;

/// Largest canvas side a browser will allocate
pub const MAX_CANVAS_DIMENSION: u32 = 32_767;

/// Where everything lands on the output canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub shadow_padding: u32,
    pub border_width: u32,
    pub total_padding: u32,
    pub width: u32,
    pub height: u32,
    /// Border plus image, excluding the shadow margin
    pub content: Rect,
    /// The source image's placement inside the border
    pub image: Rect,
}

impl Geometry {
    pub fn new(source: (u32, u32), params: &EffectParameters) -> Result<Self> {
        let (src_width, src_height) = source;
        if src_width == 0 || src_height == 0 {
            return Err(Error::invalid(
                "source",
                format!("image has no area ({src_width}x{src_height})"),
            ));
        }

        let shadow_padding = params.shadow_padding();
        let border_width = params.border_width;

        let oversized = || {
            Error::invalid(
                "padding",
                format!("canvas would exceed {MAX_CANVAS_DIMENSION}px"),
            )
        };

        let total_padding = shadow_padding
            .checked_add(border_width)
            .ok_or_else(oversized)?;
        let grow = |side: u32| {
            total_padding
                .checked_mul(2)
                .and_then(|pad| side.checked_add(pad))
                .filter(|&len| len <= MAX_CANVAS_DIMENSION)
                .ok_or_else(oversized)
        };
        let width = grow(src_width)?;
        let height = grow(src_height)?;

        let origin = shadow_padding as i32;
        let content = Rect::at(origin, origin).of_size(
            src_width + 2 * border_width,
            src_height + 2 * border_width,
        );
        let inner = origin + border_width as i32;
        let image = Rect::at(inner, inner).of_size(src_width, src_height);

        Ok(Geometry {
            shadow_padding,
            border_width,
            total_padding,
            width,
            height,
            content,
            image,
        })
    }

    /// Outline of the border's outer edge; rounded only when corners are
    pub(crate) fn content_shape(&self, params: &EffectParameters) -> RoundedRect {
        let radius = if params.corner_radius > 0 {
            params.corner_radius.saturating_add(self.border_width)
        } else {
            0
        };
        RoundedRect::new(self.content, radius)
    }
}

/// Compose border, shadow and rounded corners around `source`
#[tracing::instrument(skip_all, fields(width = source.width(), height = source.height()))]
pub fn compose(source: &Bitmap, params: &EffectParameters) -> Result<Bitmap> {
    let geometry = Geometry::new(source.dimensions(), params)?;
    log::debug!(
        "composing {}x{} -> {}x{} (shadow padding {}, border {})",
        source.width(),
        source.height(),
        geometry.width,
        geometry.height,
        geometry.shadow_padding,
        geometry.border_width
    );

    let mut canvas = Canvas::new(geometry.width, geometry.height);
    let outline = geometry.content_shape(params);

    if params.shadow_enabled && geometry.shadow_padding > 0 {
        draw_shadow(&mut canvas, &outline, params);
    }

    if geometry.border_width > 0 {
        border::draw(&mut canvas, &geometry, &outline, params);
    }

    let (x, y) = (geometry.image.left() as u32, geometry.image.top() as u32);
    if params.corner_radius > 0 {
        let clip = outline
            .inset(geometry.border_width)
            .rasterize(canvas.width(), canvas.height());
        canvas.draw_image(source, x, y, Some(&clip));
    } else {
        canvas.draw_image(source, x, y, None);
    }

    Ok(canvas.into_image())
}

/// Blurred, offset silhouette of the outline, then the outline itself.
///
/// The outline is painted in the shadow color and casts a shadow of that
/// same color, so the halo carries the shadow alpha twice.
fn draw_shadow(canvas: &mut Canvas, outline: &RoundedRect, params: &EffectParameters) {
    let silhouette = outline.rasterize(canvas.width(), canvas.height());

    let shifted = translate(
        &silhouette,
        (params.shadow_offset_x, params.shadow_offset_y),
    );
    // canvas shadowBlur is twice the gaussian standard deviation
    let shadow = if params.shadow_blur > 0 {
        blur(&shifted, params.shadow_blur as f32 / 2.0)
    } else {
        shifted
    };
    log::trace!(
        "shadow blur {} offset ({}, {})",
        params.shadow_blur,
        params.shadow_offset_x,
        params.shadow_offset_y
    );

    let color = params.shadow_color;
    let halo_alpha = (color.a as u32 * color.a as u32 + 127) / 255;
    canvas.fill(&shadow, color.with_alpha(halo_alpha as u8));
    canvas.fill(&silhouette, color);
}

/// Gaussian blur treating everything beyond the mask as uncovered
fn blur(mask: &Mask, sigma: f32) -> Mask {
    let (width, height) = mask.dimensions();
    let margin = (3.0 * sigma).ceil() as u32;

    let mut padded = Mask::new(width + 2 * margin, height + 2 * margin);
    imageops::replace(&mut padded, mask, margin as i64, margin as i64);

    let blurred = gaussian_blur_f32(&padded, sigma);
    imageops::crop_imm(&blurred, margin, margin, width, height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use imageproc::image::Rgba;

    fn checkerboard(width: u32, height: u32) -> Bitmap {
        Bitmap::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([200, 40, 40, 255])
            } else {
                Rgba([40, 40, 200, 128])
            }
        })
    }

    #[test]
    fn geometry_reserves_shadow_and_border() {
        let params = EffectParameters {
            border_width: 8,
            shadow_enabled: true,
            shadow_blur: 4,
            shadow_offset_x: -12,
            shadow_offset_y: 3,
            ..Default::default()
        };
        let g = Geometry::new((50, 30), &params).unwrap();

        assert_eq!(g.shadow_padding, 12);
        assert_eq!(g.total_padding, 20);
        assert_eq!((g.width, g.height), (90, 70));
        assert_eq!(g.content, Rect::at(12, 12).of_size(66, 46));
        assert_eq!(g.image, Rect::at(20, 20).of_size(50, 30));
    }

    #[test]
    fn empty_source_is_rejected() {
        let err = Geometry::new((0, 10), &EffectParameters::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn runaway_padding_is_rejected() {
        let params = EffectParameters {
            border_width: u32::MAX,
            ..Default::default()
        };
        assert!(Geometry::new((10, 10), &params).is_err());
    }

    #[test]
    fn identity_keeps_every_pixel() {
        let source = checkerboard(7, 5);
        let output = compose(&source, &EffectParameters::default()).unwrap();
        assert_eq!(output, source);
    }

    #[test]
    fn rounded_image_without_border_is_clipped() {
        let source = Bitmap::from_pixel(40, 40, Rgba([10, 200, 10, 255]));
        let params = EffectParameters {
            corner_radius: 12,
            ..Default::default()
        };
        let output = compose(&source, &params).unwrap();

        assert_eq!(output.dimensions(), (40, 40));
        assert_eq!(output.get_pixel(0, 0)[3], 0);
        assert_eq!(output.get_pixel(20, 20), &Rgba([10, 200, 10, 255]));
        assert_eq!(output.get_pixel(20, 0), &Rgba([10, 200, 10, 255]));
    }

    #[test]
    fn shadow_lands_on_the_offset_side() {
        let source = Bitmap::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let params = EffectParameters {
            shadow_enabled: true,
            shadow_color: Color::rgba(0, 0, 0, 200),
            shadow_blur: 2,
            shadow_offset_x: 6,
            shadow_offset_y: 6,
            ..Default::default()
        };
        let output = compose(&source, &params).unwrap();

        assert_eq!(output.dimensions(), (32, 32));
        // bottom-right margin carries shadow, top-left margin does not
        assert!(output.get_pixel(29, 29)[3] > 0);
        assert_eq!(output.get_pixel(1, 1)[3], 0);
        // the image itself sits on top untouched
        assert_eq!(output.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn unblurred_shadow_is_a_hard_copy() {
        let source = Bitmap::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let params = EffectParameters {
            shadow_enabled: true,
            shadow_color: Color::rgb(0, 0, 0),
            shadow_blur: 0,
            shadow_offset_x: 3,
            shadow_offset_y: 0,
            ..Default::default()
        };
        let output = compose(&source, &params).unwrap();

        assert_eq!(output.dimensions(), (10, 10));
        assert_eq!(output.get_pixel(8, 5), &Rgba([0, 0, 0, 255]));
        assert_eq!(output.get_pixel(9, 5), &Rgba([0, 0, 0, 255]));
        assert_eq!(output.get_pixel(2, 5)[3], 0);
        assert_eq!(output.get_pixel(5, 1)[3], 0);
    }

    #[test]
    fn shadow_halo_squares_the_shadow_alpha() {
        let source = Bitmap::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let params = EffectParameters {
            shadow_enabled: true,
            shadow_color: Color::rgba(0, 0, 0, 77),
            shadow_blur: 0,
            shadow_offset_x: 3,
            shadow_offset_y: 0,
            ..Default::default()
        };
        let output = compose(&source, &params).unwrap();

        // 77 * 77 / 255, rounded
        assert_eq!(output.get_pixel(9, 5), &Rgba([0, 0, 0, 23]));
        assert_eq!(output.get_pixel(4, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn shadow_fades_out_at_the_canvas_edge() {
        let source = Bitmap::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        let params = EffectParameters {
            shadow_enabled: true,
            shadow_color: Color::rgb(0, 0, 0),
            shadow_blur: 4,
            shadow_offset_x: 20,
            shadow_offset_y: 0,
            ..Default::default()
        };
        let output = compose(&source, &params).unwrap();
        assert_eq!(output.dimensions(), (50, 50));

        // the shifted silhouette ends exactly at the right edge
        let edge = output.get_pixel(49, 25)[3];
        let inner = output.get_pixel(45, 25)[3];
        assert!((100..200).contains(&edge), "edge alpha {edge}");
        assert!(inner > edge, "inner {inner} edge {edge}");
    }
}
