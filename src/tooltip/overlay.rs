use crate::{
    foundation::core::{Canvas, Point, Vec2},
    tooltip::region::HitRegion,
};

/// Where the surface element currently sits on the page, and how large it is displayed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceBounds {
    /// Bounds of a surface shown at its natural size with its top-left at `origin`.
    pub fn natural(origin: Point, canvas: Canvas) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            width: f64::from(canvas.width),
            height: f64::from(canvas.height),
        }
    }

    fn scale_to_surface(&self, canvas: Canvas) -> Vec2 {
        let sx = if self.width > 0.0 {
            f64::from(canvas.width) / self.width
        } else {
            1.0
        };
        let sy = if self.height > 0.0 {
            f64::from(canvas.height) / self.height
        } else {
            1.0
        };
        Vec2::new(sx, sy)
    }
}

/// What the host should do with the tooltip panel.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OverlayEvent {
    /// Show the panel with new content at a page position.
    Show { content: String, position: Point },
    /// Keep the content, move the panel.
    Move { position: Point },
    Hide,
}

/// Snapshot of the panel for hosts that render it declaratively.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipPanel<'a> {
    pub role: &'static str,
    pub aria_hidden: bool,
    pub content: Option<&'a str>,
    pub position: Option<Point>,
}

/// Pointer hit-testing over one surface's regions.
///
/// Regions are tested in registration order and the first match wins. The list is only ever
/// replaced as a whole. Events are returned rather than applied so the host owns its UI.
#[derive(Debug)]
pub struct TooltipOverlay {
    canvas: Canvas,
    regions: Vec<HitRegion>,
    bounds: Option<SurfaceBounds>,
    gap: f64,
    shown: Option<Shown>,
    attached: bool,
}

#[derive(Clone, Debug, PartialEq)]
struct Shown {
    content: String,
    position: Point,
}

impl TooltipOverlay {
    pub const ROLE: &'static str = "tooltip";

    /// Attach to a surface. `bounds` carries the last known on-page placement, if any, so
    /// hit-testing works before the next scroll or resize.
    pub fn attach(
        canvas: Canvas,
        regions: Vec<HitRegion>,
        gap: f64,
        bounds: Option<SurfaceBounds>,
    ) -> Self {
        Self {
            canvas,
            regions,
            bounds,
            gap,
            shown: None,
            attached: true,
        }
    }

    pub fn regions(&self) -> &[HitRegion] {
        &self.regions
    }

    pub fn bounds(&self) -> Option<SurfaceBounds> {
        self.bounds
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Replace every region; a visible panel is hidden.
    pub fn replace_regions(&mut self, regions: Vec<HitRegion>) -> Option<OverlayEvent> {
        self.regions = regions;
        self.hide()
    }

    /// Record new surface bounds after a scroll or resize.
    pub fn on_viewport_change(&mut self, bounds: SurfaceBounds) {
        if self.attached {
            self.bounds = Some(bounds);
        }
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn on_pointer_move(&mut self, page: Point) -> Option<OverlayEvent> {
        if !self.attached {
            return None;
        }
        let bounds = self.bounds?;
        let scale = bounds.scale_to_surface(self.canvas);
        let local = Point::new(
            (page.x - bounds.left) * scale.x,
            (page.y - bounds.top) * scale.y,
        );

        let Some(region) = self.regions.iter().find(|r| r.contains(local)) else {
            return self.hide();
        };
        let anchor = region.panel_anchor(self.gap);
        let position = Point::new(
            bounds.left + anchor.x / scale.x,
            bounds.top + anchor.y / scale.y,
        );

        match &mut self.shown {
            Some(shown) if shown.content == region.content => {
                if shown.position == position {
                    None
                } else {
                    shown.position = position;
                    Some(OverlayEvent::Move { position })
                }
            }
            _ => {
                let content = region.content.clone();
                self.shown = Some(Shown {
                    content: content.clone(),
                    position,
                });
                Some(OverlayEvent::Show { content, position })
            }
        }
    }

    pub fn on_pointer_leave(&mut self) -> Option<OverlayEvent> {
        self.hide()
    }

    pub fn panel(&self) -> TooltipPanel<'_> {
        TooltipPanel {
            role: Self::ROLE,
            aria_hidden: self.shown.is_none(),
            content: self.shown.as_ref().map(|s| s.content.as_str()),
            position: self.shown.as_ref().map(|s| s.position),
        }
    }

    /// Detach from the surface. Safe to call repeatedly; only the first call can hide a panel.
    pub fn teardown(&mut self) -> Option<OverlayEvent> {
        if !self.attached {
            return None;
        }
        let event = self.hide();
        self.attached = false;
        self.regions.clear();
        self.bounds = None;
        event
    }

    fn hide(&mut self) -> Option<OverlayEvent> {
        self.shown.take().map(|_| OverlayEvent::Hide)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tooltip/overlay.rs"]
mod tests;
