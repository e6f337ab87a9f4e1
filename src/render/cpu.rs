use std::sync::Arc;

use crate::{
    assets::decode::PreparedImage,
    foundation::{
        core::{Affine, Canvas, Rect, Rgba8Premul},
        error::{InsigniaError, InsigniaResult},
    },
};

/// Canvas-sized transparent layer rasterized with `vello_cpu`.
pub struct Layer {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl Layer {
    pub fn new(canvas: Canvas) -> InsigniaResult<Self> {
        let (width, height) = canvas.to_u16()?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    /// Draw `image` with its top-left corner mapped through `transform`.
    pub fn draw_image(&mut self, image: &ImagePaint, transform: Affine) {
        let mut ctx = self.context();
        ctx.set_transform(affine_to_cpu(transform));
        ctx.set_paint(image.paint.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, image.width, image.height));
        self.finish(ctx);
    }

    /// Draw several images in order, all in one pass.
    pub fn draw_images<'a>(&mut self, items: impl IntoIterator<Item = (&'a ImagePaint, Affine)>) {
        let mut ctx = self.context();
        for (image, transform) in items {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(image.paint.clone());
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, image.width, image.height));
        }
        self.finish(ctx);
    }

    /// Stroke 1px borders just inside every rectangle.
    pub fn outline_rects(&mut self, rects: &[Rect], color: Rgba8Premul) {
        let mut ctx = self.context();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        for r in rects {
            let r = r.abs();
            let t = 1.0f64.min(r.width()).min(r.height()).max(0.0);
            if t <= 0.0 {
                continue;
            }
            for edge in [
                Rect::new(r.x0, r.y0, r.x1, r.y0 + t),
                Rect::new(r.x0, r.y1 - t, r.x1, r.y1),
                Rect::new(r.x0, r.y0, r.x0 + t, r.y1),
                Rect::new(r.x1 - t, r.y0, r.x1, r.y1),
            ] {
                ctx.fill_rect(&rect_to_cpu(edge));
            }
        }
        self.finish(ctx);
    }

    /// Use this layer as an image paint, e.g. to draw an off-screen rack transformed.
    pub fn into_paint(self) -> ImagePaint {
        ImagePaint::from_pixmap(self.pixmap)
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    fn context(&self) -> vello_cpu::RenderContext {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx
    }

    fn finish(&mut self, mut ctx: vello_cpu::RenderContext) {
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
    }
}

/// A decoded image ready to be used as a `vello_cpu` paint.
#[derive(Clone)]
pub struct ImagePaint {
    width: f64,
    height: f64,
    paint: vello_cpu::Image,
}

impl ImagePaint {
    pub fn from_prepared(img: &PreparedImage) -> InsigniaResult<Self> {
        let pixmap = premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        Ok(Self::from_pixmap(pixmap))
    }

    fn from_pixmap(pixmap: vello_cpu::Pixmap) -> Self {
        Self {
            width: f64::from(pixmap.width()),
            height: f64::from(pixmap.height()),
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
        }
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> InsigniaResult<vello_cpu::Pixmap> {
    let (w, h) = Canvas { width, height }
        .to_u16()
        .map_err(|_| InsigniaError::asset(format!("image {width}x{height} is not drawable")))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(InsigniaError::asset("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
