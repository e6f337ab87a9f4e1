//! Insignia composes uniform portraits from a user's groups and badges.
//!
//! # Pipeline overview
//!
//! 1. **Select**: `UserContext + AssetCatalog -> RenderPlan` (which background, which foreground
//!    layers in which order, which awards), applying rank precedence, badge tiers, service
//!    variants and exclusion rules.
//! 2. **Composite**: `RenderPlan -> CompositedPortrait` (load every image, draw background,
//!    centered foregrounds and the transformed ribbon rack; emit surface-space hit-regions).
//! 3. **Attach**: a [`PortraitMount`] displays the newest portrait and routes pointer events to
//!    its [`TooltipOverlay`]; stale renders are dropped.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure selection**: [`select`] does no IO and is deterministic for a given input.
//! - **Drawn equals clickable**: hit-regions go through the same transforms as the artwork.
//! - **Premultiplied RGBA8** end-to-end until PNG output.
#![forbid(unsafe_code)]

mod assets;
mod catalog;
mod config;
mod foundation;
mod host;
mod render;
mod select;
mod tooltip;

/// Rectangle mapping helpers shared by the rack and the tooltip geometry.
pub mod transform;

pub use assets::decode::{PreparedImage, decode_image, unpremultiply_rgba8};
pub use assets::loader::{FsFetcher, ImageFetcher, ImageLoader};
pub use assets::resolve::{AssetResolver, ExtensionResolver, normalize_rel_path};
pub use catalog::model::{
    AssetCatalog, AwardEntry, BackgroundRow, Backgrounds, GroupBadgeSuppression, GroupEntry,
    ImageRef, LanyardEntry, QualificationEntry, RankCategory, RankEntry, RankFallback, RegionRect,
    SelectionRules, Service, Tiers, TooltipSpec, UnitGate,
};
pub use catalog::names::{NameSet, fold_name, names_eq};
pub use config::{RenderConfig, ShadowSpec, parse_debug_flag};
pub use foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, Vec2};
pub use foundation::error::{InsigniaError, InsigniaResult};
pub use host::mount::{
    DisplayedPortrait, PortraitMount, RenderOutcome, RenderTicket, render_portrait,
    teardown_portrait,
};
pub use render::blur::blur_rgba8_premul;
pub use render::composite::{PremulRgba8, drop_shadow, over, over_in_place};
pub use render::compositor::{CompositedPortrait, Compositor, rack_order};
pub use render::rack::{RackTransform, layout_rack};
pub use render::surface::Surface;
pub use select::context::{BadgeInfo, GroupRef, UserBadge, UserContext};
pub use select::engine::{AwardLayer, ForegroundLayer, LayerKind, RenderPlan, select};
pub use select::precedence::{highest_in, highest_name_in};
pub use tooltip::overlay::{OverlayEvent, SurfaceBounds, TooltipOverlay, TooltipPanel};
pub use tooltip::region::{HitRegion, escape_html, tooltip_html};
