use crate::foundation::core::{Point, Rect};

/// Rectangle on the composited surface plus the tooltip shown while the pointer is inside it.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct HitRegion {
    /// Surface-pixel rectangle.
    pub rect: Rect,
    /// Tooltip markup.
    pub content: String,
}

impl HitRegion {
    pub fn new(rect: Rect, content: impl Into<String>) -> Self {
        Self {
            rect: rect.abs(),
            content: content.into(),
        }
    }

    /// Edge-inclusive containment, so regions collapsed to a line stay hoverable.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.rect.x0 && p.x <= self.rect.x1 && p.y >= self.rect.y0 && p.y <= self.rect.y1
    }

    /// Panel anchor: horizontally centered, `gap` below the bottom edge.
    pub fn panel_anchor(&self, gap: f64) -> Point {
        Point::new(self.rect.center().x, self.rect.y1 + gap)
    }
}

/// Tooltip markup: optional image followed by the escaped text.
pub fn tooltip_html(image_url: Option<&str>, text: &str) -> String {
    let mut out = String::new();
    if let Some(url) = image_url.filter(|u| !u.is_empty()) {
        out.push_str(&format!(
            "<img src=\"{}\" alt=\"\" class=\"insignia-tooltip-image\">",
            escape_html(url)
        ));
    }
    if !text.is_empty() {
        out.push_str(&format!("<p>{}</p>", escape_html(text)));
    }
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/tooltip/region.rs"]
mod tests;
