use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn identity_and_translation_keep_the_rect() {
    let r = Rect::new(1.0, 2.0, 5.0, 7.0);
    assert_eq!(map_rect_bounds(Affine::IDENTITY, r), r);
    assert_eq!(
        map_rect_bounds(Affine::translate((10.0, -2.0)), r),
        Rect::new(11.0, 0.0, 15.0, 5.0)
    );
}

#[test]
fn quarter_turn_swaps_extents() {
    let r = Rect::new(0.0, 0.0, 4.0, 2.0);
    let b = map_rect_bounds(Affine::rotate(std::f64::consts::FRAC_PI_2), r);
    assert!(approx(b.width(), 2.0));
    assert!(approx(b.height(), 4.0));
    assert!(approx(b.x0, -2.0));
    assert!(approx(b.y0, 0.0));
}

#[test]
fn rotation_grows_bounds_and_covers_all_corners() {
    let r = Rect::new(10.0, 10.0, 110.0, 40.0);
    let a = Affine::rotate(0.3).then_translate((5.0, 5.0).into());
    let b = map_rect_bounds(a, r);
    assert!(b.width() > r.width());
    assert!(b.height() > r.height());
    for p in map_corners(a, r) {
        assert!(contains_with_tolerance(b, p, 1e-9));
    }
}

#[test]
fn shrink_moves_each_side_inward() {
    let r = Rect::new(0.0, 0.0, 20.0, 10.0);
    assert_eq!(shrink(r, 4.0), Rect::new(4.0, 4.0, 16.0, 6.0));
}

#[test]
fn shrink_collapses_instead_of_inverting() {
    let r = Rect::new(0.0, 0.0, 6.0, 30.0);
    let s = shrink(r, 4.0);
    assert_eq!((s.x0, s.x1), (3.0, 3.0));
    assert_eq!((s.y0, s.y1), (4.0, 26.0));
}

#[test]
fn bounds_of_empty_is_zero() {
    assert_eq!(bounds_of(&[]), Rect::ZERO);
    assert_eq!(
        bounds_of(&[Point::new(3.0, -1.0), Point::new(-2.0, 4.0)]),
        Rect::new(-2.0, -1.0, 3.0, 4.0)
    );
}
