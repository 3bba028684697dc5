//! Rounded rectangles and their coverage masks

use imageproc::image::GrayImage;
use imageproc::rect::Rect;
use rayon::prelude::*;

// Samples per axis when a pixel straddles a curved edge
const SUPERSAMPLE: u32 = 4;

/// Per-pixel coverage over the whole canvas, 0 = outside, 255 = inside
pub(crate) type Mask = GrayImage;

/// Axis-aligned rectangle whose corners are quadratic curves with the
/// control point on the rectangle's corner, as a canvas `quadraticCurveTo`
/// path draws them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RoundedRect {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    radius: i64,
}

impl RoundedRect {
    pub fn new(rect: Rect, radius: u32) -> Self {
        RoundedRect {
            x: rect.left() as i64,
            y: rect.top() as i64,
            width: rect.width() as i64,
            height: rect.height() as i64,
            radius: radius as i64,
        }
    }

    /// Shrink by `d` on every side; the radius shrinks with it
    pub fn inset(&self, d: u32) -> Self {
        let d = d as i64;
        RoundedRect {
            x: self.x + d,
            y: self.y + d,
            width: (self.width - 2 * d).max(0),
            height: (self.height - 2 * d).max(0),
            radius: (self.radius - d).max(0),
        }
    }

    fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn effective_radius(&self) -> f32 {
        self.radius.min(self.width / 2).min(self.height / 2) as f32
    }

    fn contains_point(&self, px: f32, py: f32, radius: f32) -> bool {
        let (x, y) = (self.x as f32, self.y as f32);
        let (right, bottom) = ((self.x + self.width) as f32, (self.y + self.height) as f32);

        if px < x || py < y || px > right || py > bottom {
            return false;
        }

        let dx = (px - x).min(right - px);
        let dy = (py - y).min(bottom - py);
        if dx >= radius || dy >= radius {
            return true;
        }

        // inside the corner curve: sqrt(dx) + sqrt(dy) >= sqrt(r)
        dx.sqrt() + dy.sqrt() >= radius.sqrt()
    }

    /// Coverage of the unit pixel cell whose top-left corner is (`px`, `py`)
    pub fn coverage(&self, px: i64, py: i64) -> u8 {
        if self.is_empty()
            || px < self.x
            || py < self.y
            || px >= self.x + self.width
            || py >= self.y + self.height
        {
            return 0;
        }

        let radius = self.effective_radius();
        let horizontal = (px - self.x).min(self.x + self.width - px - 1);
        let vertical = (py - self.y).min(self.y + self.height - py - 1);
        if horizontal as f32 >= radius || vertical as f32 >= radius {
            return 255;
        }

        let step = 1.0 / SUPERSAMPLE as f32;
        let mut hits = 0;
        for sy in 0..SUPERSAMPLE {
            for sx in 0..SUPERSAMPLE {
                let sample_x = px as f32 + (sx as f32 + 0.5) * step;
                let sample_y = py as f32 + (sy as f32 + 0.5) * step;
                if self.contains_point(sample_x, sample_y, radius) {
                    hits += 1;
                }
            }
        }

        ((hits * 255 + SUPERSAMPLE * SUPERSAMPLE / 2) / (SUPERSAMPLE * SUPERSAMPLE)) as u8
    }

    /// Rasterize into a mask the size of the canvas
    pub fn rasterize(&self, width: u32, height: u32) -> Mask {
        let mut mask = Mask::new(width, height);
        if self.is_empty() || width == 0 {
            return mask;
        }

        mask.par_chunks_mut(width as usize)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, value) in row.iter_mut().enumerate() {
                    *value = self.coverage(x as i64, y as i64);
                }
            });

        mask
    }
}
