use crate::{
    config::ShadowSpec,
    foundation::{
        core::Canvas,
        error::{InsigniaError, InsigniaResult},
        math::{mul_div255_u8, opacity_to_u8},
    },
    render::blur::{blur_rgba8_premul, shadow_kernel},
};

pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = u16::from(opacity_to_u8(opacity));
    if op == 0 || src[3] == 0 {
        return dst;
    }

    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> InsigniaResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(InsigniaError::surface(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Black silhouette of `layer`, offset, alpha-scaled and blurred per `shadow`.
pub fn drop_shadow(layer: &[u8], canvas: Canvas, shadow: &ShadowSpec) -> InsigniaResult<Vec<u8>> {
    if layer.len() != canvas.rgba_len() {
        return Err(InsigniaError::surface(
            "drop_shadow expects a layer matching the canvas",
        ));
    }
    let (w, h) = (canvas.width as i64, canvas.height as i64);
    let dx = shadow.offset_x.round() as i64;
    let dy = shadow.offset_y.round() as i64;
    let op = u16::from(opacity_to_u8(shadow.opacity));

    let mut silhouette = vec![0u8; layer.len()];
    for y in 0..h {
        let sy = y - dy;
        if !(0..h).contains(&sy) {
            continue;
        }
        for x in 0..w {
            let sx = x - dx;
            if !(0..w).contains(&sx) {
                continue;
            }
            let a = layer[((sy * w + sx) * 4 + 3) as usize];
            silhouette[((y * w + x) * 4 + 3) as usize] = mul_div255_u8(u16::from(a), op);
        }
    }

    let (radius, sigma) = shadow_kernel(shadow.blur);
    if radius == 0 {
        return Ok(silhouette);
    }
    blur_rgba8_premul(&silhouette, canvas.width, canvas.height, radius, sigma)
}

/// Composite `layer` onto `dst`, preceded by its drop shadow unless the shadow is a no-op.
pub fn over_with_shadow(
    dst: &mut [u8],
    layer: &[u8],
    canvas: Canvas,
    shadow: &ShadowSpec,
) -> InsigniaResult<()> {
    if !shadow.is_noop() {
        let s = drop_shadow(layer, canvas, shadow)?;
        over_in_place(dst, &s, 1.0)?;
    }
    over_in_place(dst, layer, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
