//! A transparent RGBA drawing surface with canvas-style compositing

use imageproc::image::{Pixel, Rgba, RgbaImage};
use imageproc::rect::Rect;

use super::shape::Mask;
use crate::color::Color;

pub(crate) struct Canvas {
    pixels: RgbaImage,
}

/// Source-over `src` onto `dst` at the given coverage
#[inline]
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: u8) {
    // full coverage over nothing, or opaque over anything, is a plain copy
    if coverage == 255 && (src[3] == 255 || dst[3] == 0) {
        *dst = src;
        return;
    }

    let alpha = ((src[3] as u32 * coverage as u32 + 127) / 255) as u8;
    if alpha == 0 {
        return;
    }
    let src = Rgba([src[0], src[1], src[2], alpha]);

    match dst[3] {
        0 => *dst = src,
        // Pixel::blend truncates, which can leave an opaque pixel at 254
        255 => {
            dst.blend(&src);
            dst[3] = 255;
        }
        _ => dst.blend(&src),
    }
}

/// Destination-out at the given coverage
#[inline]
fn erase(dst: &mut Rgba<u8>, coverage: u8) {
    if coverage == 0 {
        return;
    }

    let alpha = dst[3] as u32 * (255 - coverage as u32);
    let alpha = ((alpha + 127) / 255) as u8;
    *dst = if alpha == 0 {
        Rgba([0, 0, 0, 0])
    } else {
        Rgba([dst[0], dst[1], dst[2], alpha])
    };
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Canvas {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn bounds(&self) -> Option<Rect> {
        if self.width() == 0 || self.height() == 0 {
            return None;
        }
        Some(Rect::at(0, 0).of_size(self.width(), self.height()))
    }

    /// Fill an axis-aligned rectangle, clipped to the canvas
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(area) = self.bounds().and_then(|b| b.intersect(rect)) else {
            return;
        };

        let src = Rgba::from(color);
        for y in area.top()..=area.bottom() {
            for x in area.left()..=area.right() {
                blend(self.pixels.get_pixel_mut(x as u32, y as u32), src, 255);
            }
        }
    }

    /// Fill every pixel of the mask with `color`, weighted by coverage
    pub fn fill(&mut self, mask: &Mask, color: Color) {
        let src = Rgba::from(color);
        for (dst, coverage) in self.pixels.pixels_mut().zip(mask.pixels()) {
            blend(dst, src, coverage[0]);
        }
    }

    /// Erase to transparent wherever the mask covers
    pub fn erase(&mut self, mask: &Mask) {
        for (dst, coverage) in self.pixels.pixels_mut().zip(mask.pixels()) {
            erase(dst, coverage[0]);
        }
    }

    /// Draw `image` with its top-left corner at (`x`, `y`), optionally
    /// clipped by a canvas-sized mask
    pub fn draw_image(&mut self, image: &RgbaImage, x: u32, y: u32, clip: Option<&Mask>) {
        let (width, height) = image.dimensions();
        let width = width.min(self.width().saturating_sub(x));
        let height = height.min(self.height().saturating_sub(y));

        for sy in 0..height {
            for sx in 0..width {
                let (cx, cy) = (x + sx, y + sy);
                let coverage = clip.map_or(255, |m| m.get_pixel(cx, cy)[0]);
                let src = image.get_pixel(sx, sy);
                blend(self.pixels.get_pixel_mut(cx, cy), *src, coverage);
            }
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}
