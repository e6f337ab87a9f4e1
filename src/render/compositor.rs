use std::{collections::HashSet, sync::Arc};

use rayon::prelude::*;

use crate::{
    assets::{decode::PreparedImage, loader::ImageLoader, resolve::AssetResolver},
    catalog::model::{AssetCatalog, ImageRef, RegionRect, TooltipSpec},
    catalog::names::fold_name,
    config::RenderConfig,
    foundation::{
        core::{Affine, Canvas, Rect, Rgba8Premul, Vec2},
        error::InsigniaResult,
    },
    render::{
        composite::{over_in_place, over_with_shadow},
        cpu::{ImagePaint, Layer},
        rack::{RackTransform, layout_rack},
        surface::Surface,
    },
    select::engine::{AwardLayer, RenderPlan},
    tooltip::region::{HitRegion, tooltip_html},
};

const DEBUG_OUTLINE: Rgba8Premul = Rgba8Premul {
    r: 255,
    g: 0,
    b: 0,
    a: 255,
};

/// A finished portrait and the hit-regions that belong to it.
#[derive(Clone, Debug)]
pub struct CompositedPortrait {
    pub surface: Surface,
    pub hit_regions: Vec<HitRegion>,
}

/// Draws render plans. Holds the shared image cache, the URL resolver and the constants.
#[derive(Clone)]
pub struct Compositor {
    loader: Arc<ImageLoader>,
    resolver: Arc<dyn AssetResolver>,
    config: RenderConfig,
    debug: bool,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("loader", &self.loader)
            .field("config", &self.config)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Compositor {
    pub fn new(
        loader: Arc<ImageLoader>,
        resolver: Arc<dyn AssetResolver>,
        config: RenderConfig,
    ) -> Self {
        let debug = config.effective_debug(false);
        Self {
            loader,
            resolver,
            config,
            debug,
        }
    }

    /// OR a runtime debug flag (e.g. from the environment) into the configured one.
    pub fn with_runtime_debug(mut self, runtime_debug: bool) -> Self {
        self.debug = self.config.effective_debug(runtime_debug);
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn loader(&self) -> &Arc<ImageLoader> {
        &self.loader
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// Draw `plan` and collect its hit-regions.
    ///
    /// Every image is loaded before anything is drawn. Images that fail to load are skipped; a
    /// missing background leaves a 1x1 surface.
    #[tracing::instrument(
        skip_all,
        fields(foregrounds = plan.foregrounds.len(), awards = plan.awards.len())
    )]
    pub fn composite(
        &self,
        plan: &RenderPlan,
        catalog: &AssetCatalog,
    ) -> InsigniaResult<CompositedPortrait> {
        let keys: Vec<&ImageRef> = plan
            .background
            .iter()
            .chain(plan.foregrounds.iter().map(|l| &l.image))
            .chain(plan.awards.iter().map(|a| &a.ribbon))
            .collect();
        let mut loaded = self.load_batch(&keys).into_iter();
        let background = if plan.background.is_some() {
            loaded.next().flatten()
        } else {
            None
        };
        let foregrounds: Vec<_> = loaded.by_ref().take(plan.foregrounds.len()).collect();
        let ribbons: Vec<_> = loaded.collect();

        let canvas = background
            .as_ref()
            .map_or(Canvas::DEGENERATE, |img| img.canvas());
        let mut surface = Surface::new(canvas);
        let mut regions = Vec::new();

        if let Some(bg) = &background {
            let mut layer = Layer::new(canvas)?;
            layer.draw_image(&ImagePaint::from_prepared(bg)?, Affine::IDENTITY);
            over_with_shadow(
                surface.data_mut(),
                layer.data(),
                canvas,
                &self.config.background_shadow,
            )?;
        } else {
            tracing::warn!(
                background = plan.background.as_ref().map(ImageRef::as_str),
                "background unavailable; drawing on a degenerate surface"
            );
        }

        let mut rank_offset = None;
        let mut fg_layer = Layer::new(canvas)?;
        let mut paints = Vec::with_capacity(foregrounds.len());
        for (idx, img) in foregrounds.iter().enumerate() {
            let Some(img) = img else { continue };
            let offset = centering_offset(canvas, img);
            if idx == 0 && plan.rank.is_some() {
                rank_offset = Some(offset);
            }
            paints.push((ImagePaint::from_prepared(img)?, Affine::translate(offset)));
        }
        fg_layer.draw_images(paints.iter().map(|(p, a)| (p, *a)));
        over_in_place(surface.data_mut(), fg_layer.data(), 1.0)?;

        self.register_group_regions(plan, catalog, &mut regions);
        if let (Some(rank), Some(offset)) = (&plan.rank, rank_offset)
            && let Some(tooltip) = &rank.tooltip
        {
            self.push_regions(&mut regions, &rank.regions, tooltip, offset);
        }
        for q in &plan.qualifications {
            if let Some(tooltip) = &q.tooltip {
                self.push_regions(&mut regions, &q.regions, tooltip, Vec2::ZERO);
            }
        }

        // Only ribbons that loaded compete for a place in the rack.
        let mut drawn: Vec<(&AwardLayer, Arc<PreparedImage>)> = plan
            .awards
            .iter()
            .zip(ribbons)
            .filter_map(|(award, img)| img.map(|img| (award, img)))
            .collect();
        drawn.sort_by_key(|(award, _)| award_priority(award, catalog));
        drawn.truncate(self.config.max_awards);
        drawn.reverse();
        if !drawn.is_empty() {
            self.draw_rack(&mut surface, &drawn, catalog, &mut regions)?;
        }

        if self.debug {
            let rects: Vec<Rect> = regions.iter().map(|r| r.rect).collect();
            let mut layer = Layer::new(canvas)?;
            layer.outline_rects(&rects, DEBUG_OUTLINE);
            over_in_place(surface.data_mut(), layer.data(), 1.0)?;
        }

        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            regions = regions.len(),
            ribbons = drawn.len(),
            "composited portrait"
        );
        Ok(CompositedPortrait {
            surface,
            hit_regions: regions,
        })
    }

    fn load_batch(&self, keys: &[&ImageRef]) -> Vec<Option<Arc<PreparedImage>>> {
        let candidates: Vec<Vec<String>> =
            keys.iter().map(|k| self.resolver.candidates(k)).collect();
        candidates
            .par_iter()
            .map(|c| self.loader.load(c))
            .collect()
    }

    fn draw_rack(
        &self,
        surface: &mut Surface,
        drawn: &[(&AwardLayer, Arc<PreparedImage>)],
        catalog: &AssetCatalog,
        regions: &mut Vec<HitRegion>,
    ) -> InsigniaResult<()> {
        let canvas = surface.canvas();
        let sizes: Vec<(f64, f64)> = drawn
            .iter()
            .map(|(_, img)| (f64::from(img.width), f64::from(img.height)))
            .collect();
        let slots = layout_rack(&sizes, canvas, self.config.row_capacity);

        let mut rack = Layer::new(canvas)?;
        let mut paints = Vec::with_capacity(drawn.len());
        for ((_, img), slot) in drawn.iter().zip(&slots) {
            paints.push((
                ImagePaint::from_prepared(img)?,
                Affine::translate(slot.origin().to_vec2()),
            ));
        }
        rack.draw_images(paints.iter().map(|(p, a)| (p, *a)));

        let transform = RackTransform::for_count(&self.config, canvas, drawn.len());
        let mut placed = Layer::new(canvas)?;
        placed.draw_image(&rack.into_paint(), transform.to_affine());
        over_with_shadow(
            surface.data_mut(),
            placed.data(),
            canvas,
            &self.config.rack_shadow,
        )?;

        for ((award, _), slot) in drawn.iter().zip(&slots) {
            let rect = transform.hit_rect(*slot, self.config.hit_margin_px);
            regions.push(HitRegion::new(rect, self.award_tooltip(award, catalog)));
        }
        Ok(())
    }

    fn award_tooltip(&self, award: &AwardLayer, catalog: &AssetCatalog) -> String {
        let entry = catalog
            .award_by_ribbon(&award.ribbon)
            .or_else(|| catalog.award(&award.name));
        match entry {
            Some(entry) => {
                let medal = entry.medal.as_ref().map(|m| self.resolver.url_for(m));
                let text = if entry.text.is_empty() {
                    entry.name.as_str()
                } else {
                    entry.text.as_str()
                };
                tooltip_html(medal.as_deref(), text)
            }
            None => tooltip_html(Some(&self.resolver.url_for(&award.ribbon)), &award.name),
        }
    }

    fn register_group_regions(
        &self,
        plan: &RenderPlan,
        catalog: &AssetCatalog,
        regions: &mut Vec<HitRegion>,
    ) {
        let mut seen = HashSet::new();
        for name in &plan.groups {
            if !seen.insert(fold_name(name)) {
                continue;
            }
            if let Some(group) = catalog.group(name)
                && let Some(tooltip) = &group.tooltip
            {
                self.push_regions(regions, &group.regions, tooltip, Vec2::ZERO);
            }
        }

        let Some(region) = catalog.lanyard_region else {
            return;
        };
        for group in plan.lanyard_groups() {
            if let Some(tooltip) = catalog.lanyard(group).and_then(|l| l.tooltip.as_ref()) {
                self.push_regions(regions, std::slice::from_ref(&region), tooltip, Vec2::ZERO);
            }
        }
    }

    fn push_regions(
        &self,
        regions: &mut Vec<HitRegion>,
        rects: &[RegionRect],
        tooltip: &TooltipSpec,
        offset: Vec2,
    ) {
        if rects.is_empty() {
            return;
        }
        let image = tooltip.image.as_ref().map(|i| self.resolver.url_for(i));
        let content = tooltip_html(image.as_deref(), &tooltip.text);
        for r in rects {
            regions.push(HitRegion::new(r.to_rect() + offset, content.clone()));
        }
    }
}

/// Awards in draw order: the `max_awards` highest-priority entries, lowest of those first.
pub fn rack_order<'a>(
    awards: &'a [AwardLayer],
    catalog: &AssetCatalog,
    max_awards: usize,
) -> Vec<&'a AwardLayer> {
    let mut ordered: Vec<&AwardLayer> = awards.iter().collect();
    ordered.sort_by_key(|a| award_priority(a, catalog));
    ordered.truncate(max_awards);
    ordered.reverse();
    ordered
}

/// Priority index by name, then by ribbon; unknown awards sort last.
fn award_priority(award: &AwardLayer, catalog: &AssetCatalog) -> usize {
    catalog
        .award_priority(&award.name)
        .or_else(|| {
            catalog
                .award_by_ribbon(&award.ribbon)
                .and_then(|e| catalog.award_priority(&e.name))
        })
        .unwrap_or(usize::MAX)
}

fn centering_offset(canvas: Canvas, img: &PreparedImage) -> Vec2 {
    Vec2::new(
        (f64::from(canvas.width) - f64::from(img.width)) / 2.0,
        (f64::from(canvas.height) - f64::from(img.height)) / 2.0,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
