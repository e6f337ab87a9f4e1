use crate::foundation::error::{InsigniaError, InsigniaResult};

/// Separable Gaussian blur over a premultiplied RGBA8 buffer, edges clamped.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> InsigniaResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| InsigniaError::surface("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(InsigniaError::surface(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || width == 0 || height == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    blur_pass(src, &mut tmp, width, height, &kernel, Axis::Horizontal);
    blur_pass(&tmp, &mut out, width, height, &kernel, Axis::Vertical);
    Ok(out)
}

/// Blur parameters matching a canvas `shadowBlur` of `blur` pixels.
pub fn shadow_kernel(blur: f64) -> (u32, f32) {
    let sigma = (blur / 2.0) as f32;
    if !(sigma.is_finite() && sigma > 0.0) {
        return (0, 0.0);
    }
    ((sigma * 3.0).ceil() as u32, sigma)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> InsigniaResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(InsigniaError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| (-(f64::from(i) * f64::from(i)) / denom).exp())
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(InsigniaError::surface("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    // Rounding drift goes to the center tap so the kernel sums to exactly 1.0 in Q16.
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + 65536 - acc).clamp(0, 65536) as u32;

    Ok(weights)
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

fn blur_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = (i64::from(width), i64::from(height));
    let stride = width as usize;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i64 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + d).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + d).clamp(0, h - 1)),
                };
                let idx = (sy as usize * stride + sx as usize) * 4;
                for (c, a) in acc.iter_mut().enumerate() {
                    *a += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = (y as usize * stride + x as usize) * 4;
            for (c, a) in acc.into_iter().enumerate() {
                dst[out_idx + c] = q16_to_u8(a);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
