//! Pixel mask describing the area a shield bubble covers.

use glam::Vec2;

/// Opaque-pixel bitmap of an elliptical shield bubble.
///
/// The mask is anchored at `origin` in the owning ship's pixel frame. Points
/// left of or above the origin are outside the mask.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ShieldMask {
    origin: Vec2,
    width: usize,
    height: usize,
    opaque: Vec<bool>,
}

impl ShieldMask {
    /// Builds an ellipse that encloses the rectangle `min..max` plus `margin`.
    pub(crate) fn enclosing(min: Vec2, max: Vec2, margin: f32) -> Self {
        let center = (min + max) * 0.5;
        let radii = (max - min) * 0.5 * std::f32::consts::SQRT_2 + Vec2::splat(margin);
        let origin = center - radii;
        let width = (radii.x * 2.0).ceil().max(1.0) as usize;
        let height = (radii.y * 2.0).ceil().max(1.0) as usize;

        let mut opaque = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - radii;
                let normalized = pixel / radii;
                opaque.push(normalized.length_squared() <= 1.0);
            }
        }

        Self {
            origin,
            width,
            height,
            opaque,
        }
    }

    /// Reports whether the point lands on an opaque pixel.
    pub(crate) fn contains(&self, point: Vec2) -> bool {
        let local = point - self.origin;
        if local.x < 0.0 || local.y < 0.0 {
            return false;
        }
        let x = local.x as usize;
        let y = local.y as usize;
        if x >= self.width || y >= self.height {
            return false;
        }
        self.opaque[y * self.width + x]
    }

    /// Left edge of the mask in the owning ship's frame.
    pub(crate) fn left(&self) -> f32 {
        self.origin.x
    }
}
