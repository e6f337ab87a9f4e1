use crate::foundation::core::{Affine, Point, Rect};

/// The four corners of `rect`, clockwise from the top-left.
pub fn rect_corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// Map every corner of `rect` through `affine`.
pub fn map_corners(affine: Affine, rect: Rect) -> [Point; 4] {
    rect_corners(rect).map(|p| affine * p)
}

/// Axis-aligned bounding box of `rect` after `affine`.
///
/// Rotation and skew turn a rectangle into a parallelogram; hit-testing needs an axis-aligned
/// rectangle in output space, so all four corners are mapped and bounded.
pub fn map_rect_bounds(affine: Affine, rect: Rect) -> Rect {
    bounds_of(&map_corners(affine, rect))
}

/// Smallest axis-aligned rectangle containing every point. Empty input gives `Rect::ZERO`.
pub fn bounds_of(points: &[Point]) -> Rect {
    let Some(first) = points.first() else {
        return Rect::ZERO;
    };
    points.iter().skip(1).fold(
        Rect::new(first.x, first.y, first.x, first.y),
        |acc, p| Rect::new(acc.x0.min(p.x), acc.y0.min(p.y), acc.x1.max(p.x), acc.y1.max(p.y)),
    )
}

/// Move every side of `rect` inward by `margin`.
///
/// An axis narrower than `2 * margin` collapses to its center line instead of inverting.
pub fn shrink(rect: Rect, margin: f64) -> Rect {
    let rect = rect.abs();
    let (x0, x1) = shrink_axis(rect.x0, rect.x1, margin);
    let (y0, y1) = shrink_axis(rect.y0, rect.y1, margin);
    Rect::new(x0, y0, x1, y1)
}

fn shrink_axis(lo: f64, hi: f64, margin: f64) -> (f64, f64) {
    let (a, b) = (lo + margin, hi - margin);
    if a <= b {
        (a, b)
    } else {
        let mid = (lo + hi) / 2.0;
        (mid, mid)
    }
}

/// Whether `p` lies inside `rect` grown by `tolerance` on every side.
pub fn contains_with_tolerance(rect: Rect, p: Point, tolerance: f64) -> bool {
    p.x >= rect.x0 - tolerance
        && p.x <= rect.x1 + tolerance
        && p.y >= rect.y0 - tolerance
        && p.y <= rect.y1 + tolerance
}

#[cfg(test)]
#[path = "../../tests/unit/transform/affine.rs"]
mod tests;
