use std::sync::{
    Mutex, MutexGuard,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    catalog::model::AssetCatalog,
    foundation::{
        core::{Canvas, Point},
        error::{InsigniaError, InsigniaResult},
    },
    render::{
        compositor::{CompositedPortrait, Compositor},
        surface::Surface,
    },
    select::{context::UserContext, engine::select},
    tooltip::{
        overlay::{OverlayEvent, SurfaceBounds, TooltipOverlay},
        region::HitRegion,
    },
};

/// Result of one render request.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// A new portrait is displayed.
    Rendered {
        width: u32,
        height: u32,
        regions: Vec<HitRegion>,
    },
    /// Nothing matched; any previous portrait was removed.
    NothingToShow,
    /// A newer render started first; this result was dropped.
    Superseded,
}

/// Sequence number of one render attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// The surface currently attached to a mount, with its overlay.
#[derive(Debug)]
pub struct DisplayedPortrait {
    pub seq: u64,
    pub surface: Surface,
    pub overlay: TooltipOverlay,
}

/// Host mount point holding at most one displayed portrait.
///
/// Every render takes a ticket; a result is applied only if its ticket is still the newest when
/// the displayed state is locked for mutation. The last reported viewport outlives individual
/// portraits and seeds each new overlay.
#[derive(Debug, Default)]
pub struct PortraitMount {
    latest: AtomicU64,
    state: Mutex<MountState>,
}

#[derive(Debug, Default)]
struct MountState {
    displayed: Option<DisplayedPortrait>,
    viewport: Option<SurfaceBounds>,
}

impl PortraitMount {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a render, invalidating every earlier ticket.
    pub fn begin_render(&self) -> RenderTicket {
        RenderTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: RenderTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Replace the displayed portrait unless `ticket` is stale. Returns whether it was applied.
    pub fn commit(
        &self,
        ticket: RenderTicket,
        portrait: CompositedPortrait,
        tooltip_gap: f64,
    ) -> InsigniaResult<bool> {
        let mut state = self.lock()?;
        if !self.is_latest(ticket) {
            return Ok(false);
        }
        detach(&mut state.displayed);
        let overlay = TooltipOverlay::attach(
            portrait.surface.canvas(),
            portrait.hit_regions,
            tooltip_gap,
            state.viewport,
        );
        state.displayed = Some(DisplayedPortrait {
            seq: ticket.0,
            surface: portrait.surface,
            overlay,
        });
        Ok(true)
    }

    /// Remove the displayed portrait unless `ticket` is stale. Returns whether it was applied.
    pub fn clear(&self, ticket: RenderTicket) -> InsigniaResult<bool> {
        let mut state = self.lock()?;
        if !self.is_latest(ticket) {
            return Ok(false);
        }
        detach(&mut state.displayed);
        Ok(true)
    }

    /// Remove whatever is displayed. Idempotent.
    pub fn teardown(&self) -> InsigniaResult<()> {
        let mut state = self.lock()?;
        detach(&mut state.displayed);
        Ok(())
    }

    pub fn is_displaying(&self) -> bool {
        self.lock().map(|s| s.displayed.is_some()).unwrap_or(false)
    }

    /// Run `f` against the displayed portrait, if any.
    pub fn with_displayed<R>(
        &self,
        f: impl FnOnce(&DisplayedPortrait) -> R,
    ) -> InsigniaResult<Option<R>> {
        Ok(self.lock()?.displayed.as_ref().map(f))
    }

    pub fn displayed_canvas(&self) -> InsigniaResult<Option<Canvas>> {
        self.with_displayed(|d| d.surface.canvas())
    }

    pub fn displayed_regions(&self) -> InsigniaResult<Vec<HitRegion>> {
        Ok(self
            .with_displayed(|d| d.overlay.regions().to_vec())?
            .unwrap_or_default())
    }

    /// Record where the surface sits on the page. Kept across re-renders.
    pub fn on_viewport_change(&self, bounds: SurfaceBounds) -> InsigniaResult<()> {
        let mut state = self.lock()?;
        state.viewport = Some(bounds);
        if let Some(d) = state.displayed.as_mut() {
            d.overlay.on_viewport_change(bounds);
        }
        Ok(())
    }

    pub fn on_pointer_move(&self, page: Point) -> InsigniaResult<Option<OverlayEvent>> {
        Ok(self
            .lock()?
            .displayed
            .as_mut()
            .and_then(|d| d.overlay.on_pointer_move(page)))
    }

    pub fn on_pointer_leave(&self) -> InsigniaResult<Option<OverlayEvent>> {
        Ok(self
            .lock()?
            .displayed
            .as_mut()
            .and_then(|d| d.overlay.on_pointer_leave()))
    }

    fn lock(&self) -> InsigniaResult<MutexGuard<'_, MountState>> {
        self.state
            .lock()
            .map_err(|_| InsigniaError::surface("portrait mount state poisoned"))
    }
}

fn detach(displayed: &mut Option<DisplayedPortrait>) {
    if let Some(mut old) = displayed.take() {
        old.overlay.teardown();
        tracing::debug!(seq = old.seq, "detached portrait");
    }
}

/// Select, composite and attach a portrait for `user` on `mount`.
///
/// "Nothing matched" and "superseded by a newer render" are outcomes, not errors. Errors are
/// reserved for host failures such as an unusable drawing surface.
#[tracing::instrument(skip_all, fields(seq = tracing::field::Empty))]
pub fn render_portrait(
    mount: &PortraitMount,
    user: &UserContext,
    catalog: &AssetCatalog,
    compositor: &Compositor,
) -> InsigniaResult<RenderOutcome> {
    let ticket = mount.begin_render();
    tracing::Span::current().record("seq", ticket.seq());

    let plan = select(user, catalog);
    if plan.is_suppressed() {
        return Ok(if mount.clear(ticket)? {
            tracing::debug!("nothing to show");
            RenderOutcome::NothingToShow
        } else {
            RenderOutcome::Superseded
        });
    }

    let portrait = compositor.composite(&plan, catalog)?;
    let (width, height) = (portrait.surface.width(), portrait.surface.height());
    let regions = portrait.hit_regions.clone();
    if mount.commit(ticket, portrait, compositor.config().tooltip_gap_px)? {
        Ok(RenderOutcome::Rendered {
            width,
            height,
            regions,
        })
    } else {
        tracing::debug!("discarding stale render");
        Ok(RenderOutcome::Superseded)
    }
}

/// Remove the portrait and overlay attached to `mount`. Safe to call repeatedly.
pub fn teardown_portrait(mount: &PortraitMount) -> InsigniaResult<()> {
    mount.teardown()
}

#[cfg(test)]
#[path = "../../tests/unit/host/mount.rs"]
mod tests;
