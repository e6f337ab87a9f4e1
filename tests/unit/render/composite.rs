use super::*;

fn shadow(offset: f64, blur: f64, opacity: f32) -> ShadowSpec {
    ShadowSpec {
        offset_x: offset,
        offset_y: offset,
        blur,
        opacity,
    }
}

#[test]
fn over_opacity_0_is_noop() {
    assert_eq!(over([1, 2, 3, 4], [200, 200, 200, 200], 0.0), [1, 2, 3, 4]);
}

#[test]
fn over_transparent_src_is_noop() {
    assert_eq!(over([10, 20, 30, 40], [255, 255, 255, 0], 1.0), [10, 20, 30, 40]);
}

#[test]
fn over_opaque_src_replaces_dst() {
    assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255], 1.0), [255, 0, 0, 255]);
}

#[test]
fn over_half_alpha_blends() {
    let out = over([0, 0, 255, 255], [128, 0, 0, 128], 1.0);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert_eq!(out[2], 127);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn unblurred_shadow_is_offset_black_at_scaled_alpha() {
    let canvas = Canvas {
        width: 3,
        height: 3,
    };
    let mut layer = vec![0u8; canvas.rgba_len()];
    layer[0..4].copy_from_slice(&[255, 255, 255, 255]);

    let s = drop_shadow(&layer, canvas, &shadow(1.0, 0.0, 0.4)).unwrap();
    assert_eq!(s[0..4], [0, 0, 0, 0]);
    let idx = (3 + 1) * 4;
    assert_eq!(s[idx..idx + 4], [0, 0, 0, 102]);
    assert_eq!(s.chunks_exact(4).filter(|px| px[3] != 0).count(), 1);
}

#[test]
fn blurred_shadow_spreads() {
    let canvas = Canvas {
        width: 9,
        height: 9,
    };
    let mut layer = vec![0u8; canvas.rgba_len()];
    let c = (4 * 9 + 4) * 4;
    layer[c..c + 4].copy_from_slice(&[255, 255, 255, 255]);

    let s = drop_shadow(&layer, canvas, &shadow(0.0, 3.0, 1.0)).unwrap();
    assert!(s.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
    assert!(s.chunks_exact(4).all(|px| px[0] == 0 && px[1] == 0 && px[2] == 0));
}

#[test]
fn over_with_shadow_darkens_under_transparent_pixels() {
    let canvas = Canvas {
        width: 2,
        height: 1,
    };
    let mut dst = [255u8, 255, 255, 255].repeat(2);
    let layer = vec![0, 0, 255, 255, 0, 0, 0, 0];
    let sideways = ShadowSpec {
        offset_x: 1.0,
        offset_y: 0.0,
        blur: 0.0,
        opacity: 1.0,
    };
    over_with_shadow(&mut dst, &layer, canvas, &sideways).unwrap();
    assert_eq!(dst[0..4], [0, 0, 255, 255]);
    assert_eq!(dst[4..8], [0, 0, 0, 255]);
}
