//! Ribbon-rack geometry.
//!
//! Ribbons are first laid out on an off-screen surface the size of the main canvas, then the
//! whole rack is scaled, rotated, skewed and moved onto the portrait. Both steps are pure so the
//! drawn artwork and the registered hit-regions always come from the same numbers.

use crate::{
    config::RenderConfig,
    foundation::core::{Affine, Canvas, Point, Rect},
    transform::affine::{map_rect_bounds, shrink},
};

/// Slot rectangles, in rack-surface pixels, for ribbons of the given sizes.
///
/// Entries fill rows of `row_capacity` in order (row 0 first). Within a row the first entry sits
/// at the right end and later ones pack leftwards; the row is centered horizontally as a block.
/// Row 0 is centered vertically and each following row sits directly above the previous one.
pub fn layout_rack(sizes: &[(f64, f64)], canvas: Canvas, row_capacity: usize) -> Vec<Rect> {
    let capacity = row_capacity.max(1);
    let (canvas_w, canvas_h) = (f64::from(canvas.width), f64::from(canvas.height));

    let mut out = Vec::with_capacity(sizes.len());
    let mut row_top: Option<f64> = None;
    for row in sizes.chunks(capacity) {
        let row_w: f64 = row.iter().map(|(w, _)| w).sum();
        let row_h = row.iter().map(|(_, h)| *h).fold(0.0, f64::max);
        let top = match row_top {
            None => (canvas_h - row_h) / 2.0,
            Some(prev) => prev - row_h,
        };
        row_top = Some(top);

        let mut right = (canvas_w + row_w) / 2.0;
        for &(w, h) in row {
            out.push(Rect::new(right - w, top, right, top + h));
            right -= w;
        }
    }
    out
}

/// Placement of the rack surface on the portrait.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RackTransform {
    /// Pivot on the rack surface.
    pub center: Point,
    /// Where the pivot lands on the portrait.
    pub anchor: Point,
    pub scale: f64,
    pub rotation_rad: f64,
    pub skew_rad: f64,
}

impl RackTransform {
    /// Transform for a rack of `award_count` ribbons on a surface the size of `canvas`.
    pub fn for_count(config: &RenderConfig, canvas: Canvas, award_count: usize) -> Self {
        Self {
            center: canvas.center(),
            anchor: config.anchor_for(award_count),
            scale: config.rack_scale,
            rotation_rad: config.rack_rotation_deg.to_radians(),
            skew_rad: config.rack_skew_deg.to_radians(),
        }
    }

    /// Scale, then rotate, then skew vertically around `center`, then move to `anchor`.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.anchor.to_vec2())
            * Affine::skew(0.0, self.skew_rad.tan())
            * Affine::rotate(self.rotation_rad)
            * Affine::scale(self.scale)
            * Affine::translate(-self.center.to_vec2())
    }

    pub fn inverse(&self) -> Affine {
        self.to_affine().inverse()
    }

    /// Portrait-space bounding box of a rack-space rectangle.
    pub fn map_rect_bounds(&self, rect: Rect) -> Rect {
        map_rect_bounds(self.to_affine(), rect)
    }

    /// Hit-region for a rack slot.
    ///
    /// The mapped bounds are shrunk by `margin` per side, then scaled about their center until
    /// every corner maps back inside `slot`. Small ribbons keep the plain margin; wide ones lose
    /// more, since their bounding box overhangs the tilted ribbon.
    pub fn hit_rect(&self, slot: Rect, margin: f64) -> Rect {
        let affine = self.to_affine();
        let bounds = shrink(map_rect_bounds(affine, slot), margin);
        let center = bounds.center();
        let (half_w, half_h) = (bounds.width() / 2.0, bounds.height() / 2.0);

        // Slot-space half extents of the box, through the inverse linear part.
        let [ia, ib, ic, id, _, _] = affine.inverse().as_coeffs();
        let need_x = ia.abs() * half_w + ic.abs() * half_h;
        let need_y = ib.abs() * half_w + id.abs() * half_h;
        let fit = [
            (slot.width().abs() / 2.0, need_x),
            (slot.height().abs() / 2.0, need_y),
        ]
        .into_iter()
        .filter(|(_, need)| *need > 0.0)
        .map(|(have, need)| have / need)
        .fold(1.0, f64::min);

        if !fit.is_finite() {
            return Rect::from_points(center, center);
        }
        Rect::from_center_size(center, (bounds.width() * fit, bounds.height() * fit))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/rack.rs"]
mod tests;
