//! Border band painting for each border style

use imageproc::rect::Rect;

use super::canvas::Canvas;
use super::compose::Geometry;
use super::shape::{Mask, RoundedRect};
use crate::params::{BorderStyle, EffectParameters};

/// Paint the border band between `outline` and the image box.
///
/// Every style starts as a solid band; dashed and double then cut their
/// gaps back to transparent.
pub(super) fn draw(
    canvas: &mut Canvas,
    geometry: &Geometry,
    outline: &RoundedRect,
    params: &EffectParameters,
) {
    let border_width = geometry.border_width;
    let (width, height) = (canvas.width(), canvas.height());

    if params.corner_radius > 0 {
        canvas.fill(&outline.rasterize(width, height), params.border_color);
        canvas.erase(&outline.inset(border_width).rasterize(width, height));
    } else {
        for band in bands(geometry.content, border_width) {
            canvas.fill_rect(band, params.border_color);
        }
    }

    match params.border_style {
        BorderStyle::Solid => {}
        BorderStyle::Double => {
            let line = border_width.div_ceil(3);
            let gap = ring(
                &outline.inset(line),
                &outline.inset(border_width - line),
                width,
                height,
            );
            canvas.erase(&gap);
        }
        BorderStyle::Dashed => {
            let mut gaps = ring(outline, &outline.inset(border_width), width, height);
            let pattern = DashPattern::new(geometry.content, border_width);
            for (x, y, coverage) in gaps.enumerate_pixels_mut() {
                if pattern.is_dash(x as i32, y as i32) {
                    coverage[0] = 0;
                }
            }
            canvas.erase(&gaps);
        }
    }
}

/// Top, bottom, left and right bands of a square-cornered border
fn bands(content: Rect, border_width: u32) -> [Rect; 4] {
    let (x, y) = (content.left(), content.top());
    let (w, h) = (content.width(), content.height());
    let bw = border_width as i32;
    let side = h - 2 * border_width;

    [
        Rect::at(x, y).of_size(w, border_width),
        Rect::at(x, y + h as i32 - bw).of_size(w, border_width),
        Rect::at(x, y + bw).of_size(border_width, side),
        Rect::at(x + w as i32 - bw, y + bw).of_size(border_width, side),
    ]
}

/// Coverage of `outer` minus coverage of `inner`
fn ring(outer: &RoundedRect, inner: &RoundedRect, width: u32, height: u32) -> Mask {
    let mut mask = outer.rasterize(width, height);
    let hole = inner.rasterize(width, height);
    for (m, h) in mask.pixels_mut().zip(hole.pixels()) {
        m[0] = m[0].saturating_sub(h[0]);
    }
    mask
}

/// Dashes of twice the border width separated by one border width,
/// measured along each side from the content box corner. Corner squares
/// are always painted.
struct DashPattern {
    content: Rect,
    border_width: i32,
    dash: i32,
    period: i32,
}

impl DashPattern {
    fn new(content: Rect, border_width: u32) -> Self {
        let border_width = border_width as i32;
        DashPattern {
            content,
            border_width,
            dash: border_width * 2,
            period: border_width * 3,
        }
    }

    fn is_dash(&self, x: i32, y: i32) -> bool {
        let lx = x - self.content.left();
        let ly = y - self.content.top();
        let (w, h) = (self.content.width() as i32, self.content.height() as i32);
        let bw = self.border_width;

        let in_rows = ly < bw || ly >= h - bw;
        let in_columns = lx < bw || lx >= w - bw;

        let along = match (in_rows, in_columns) {
            (true, true) => return true,
            (true, false) => lx - bw,
            (false, true) => ly - bw,
            // interior, never part of the band
            (false, false) => return true,
        };

        along.rem_euclid(self.period) < self.dash
    }
}
