use crate::foundation::error::{InsigniaError, InsigniaResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Pixel dimensions of a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Degenerate 1x1 surface used when no background could be loaded.
    pub const DEGENERATE: Canvas = Canvas {
        width: 1,
        height: 1,
    };

    /// Surface center in pixel coordinates.
    pub fn center(self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }

    /// Full-surface rectangle anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Dimensions narrowed to what the rasterizer accepts.
    pub fn to_u16(self) -> InsigniaResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| InsigniaError::surface("surface width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| InsigniaError::surface("surface height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(InsigniaError::surface("surface width/height must be > 0"));
        }
        Ok((w, h))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
