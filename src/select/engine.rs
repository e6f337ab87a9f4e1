use std::collections::HashSet;

use crate::{
    catalog::model::{
        AssetCatalog, AwardEntry, ImageRef, QualificationEntry, RankCategory, RankEntry,
        RankFallback, SelectionRules, Service,
    },
    catalog::names::{NameSet, fold_name, names_eq},
    select::context::UserContext,
    select::precedence::{highest_in, highest_name_in},
};

/// Why a foreground layer is in the plan.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerKind {
    /// The resolved highest rank. Always the first foreground when present.
    Rank,
    /// A group crest.
    Crest {
        /// Group the crest belongs to.
        group: String,
    },
    /// A group lanyard.
    Lanyard {
        /// Group the lanyard belongs to.
        group: String,
    },
    /// A qualification badge.
    Qualification {
        /// Qualification name.
        name: String,
    },
}

/// One image drawn centered on the surface.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ForegroundLayer {
    /// Layer origin.
    #[serde(flatten)]
    pub kind: LayerKind,
    /// Artwork.
    pub image: ImageRef,
}

/// One ribbon destined for the award rack.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AwardLayer {
    /// Award name as recorded in the catalog.
    pub name: String,
    /// Ribbon artwork.
    pub ribbon: ImageRef,
}

impl AwardLayer {
    fn from_entry(entry: &AwardEntry) -> Self {
        Self {
            name: entry.name.clone(),
            ribbon: entry.ribbon.clone(),
        }
    }
}

/// Ordered layers to draw for one user, rebuilt on every render.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderPlan {
    /// Selected background, if any.
    pub background: Option<ImageRef>,
    /// Foregrounds in draw order: rank, then per-group crest/lanyard, then qualifications.
    pub foregrounds: Vec<ForegroundLayer>,
    /// Awards in badge order (the compositor re-sorts by catalog priority).
    pub awards: Vec<AwardLayer>,
    /// Qualifications actually drawn, for tooltip registration.
    pub qualifications: Vec<QualificationEntry>,
    /// Resolved highest rank.
    pub rank: Option<RankEntry>,
    /// Service whose artwork variants were used.
    pub service: Service,
    /// Original group names in membership order.
    pub groups: Vec<String>,
}

impl RenderPlan {
    /// Whether there is nothing to draw: no background, or no foreground survived filtering.
    pub fn is_suppressed(&self) -> bool {
        self.background.is_none() || self.foregrounds.is_empty()
    }

    /// Groups whose lanyard was selected.
    pub fn lanyard_groups(&self) -> impl Iterator<Item = &str> {
        self.foregrounds.iter().filter_map(|l| match &l.kind {
            LayerKind::Lanyard { group } => Some(group.as_str()),
            _ => None,
        })
    }

    /// Foreground image keys in draw order.
    pub fn foreground_images(&self) -> Vec<&ImageRef> {
        self.foregrounds.iter().map(|l| &l.image).collect()
    }
}

/// Decide which background, foregrounds and awards to draw for `user`.
///
/// Pure and deterministic: the same catalog and user always produce the same plan.
#[tracing::instrument(skip_all, fields(groups = user.groups.len(), badges = user.user_badges.len()))]
pub fn select(user: &UserContext, catalog: &AssetCatalog) -> RenderPlan {
    let rules = &catalog.rules;
    let groups = user.group_set();
    let badges = user.badge_names();
    let held = NameSet::from_names(&badges);

    let rank = highest_in(&catalog.ranks, |r| r.name.as_str(), &groups);
    let service = rank.map_or(Service::Ba, |r| r.service);
    let background = match rank {
        Some(r) => Some(rules.backgrounds.get(r.service, r.category).clone()),
        None => fallback_category(&rules.rank_fallback, &groups)
            .map(|category| rules.backgrounds.get(Service::Ba, category).clone()),
    };
    tracing::debug!(
        rank = rank.map(|r| r.name.as_str()),
        ?service,
        background = background.as_ref().map(ImageRef::as_str),
        "resolved rank"
    );

    let mut foregrounds = Vec::new();
    if let Some(r) = rank {
        foregrounds.push(ForegroundLayer {
            kind: LayerKind::Rank,
            image: r.image.clone(),
        });
    }

    let mut seen_groups = HashSet::new();
    for group in user.group_names() {
        if !seen_groups.insert(fold_name(group)) {
            continue;
        }
        if let Some(crest) = catalog.group(group).and_then(|g| g.crest.as_ref()) {
            foregrounds.push(ForegroundLayer {
                kind: LayerKind::Crest {
                    group: group.to_string(),
                },
                image: crest.clone(),
            });
        }
        if service.wears_lanyards()
            && let Some(lanyard) = catalog.lanyard(group)
        {
            foregrounds.push(ForegroundLayer {
                kind: LayerKind::Lanyard {
                    group: group.to_string(),
                },
                image: lanyard.image.clone(),
            });
        }
    }

    let tiers = TierTops::resolve(rules, &held);
    let mut qualifications = Vec::new();
    let mut awards = Vec::new();
    for badge in badges {
        if !tiers.allows(badge) {
            tracing::debug!(badge, "suppressed by tier precedence");
            continue;
        }
        if is_suppressed_for_groups(rules, &groups, badge) {
            tracing::debug!(badge, "suppressed by group rule");
            continue;
        }

        if let Some(q) = catalog.qualification(badge) {
            let restricted = rank.is_some_and(|r| q.is_restricted_for(&r.name));
            let gated_out = rules
                .unit_gated
                .iter()
                .find(|g| names_eq(&g.qualification, &q.name))
                .is_some_and(|g| !groups.contains_any(&g.groups));
            if restricted || gated_out {
                tracing::debug!(badge, restricted, gated_out, "qualification not shown");
            } else {
                foregrounds.push(ForegroundLayer {
                    kind: LayerKind::Qualification {
                        name: q.name.clone(),
                    },
                    image: q.image_for(service).clone(),
                });
                qualifications.push(q.clone());
            }
        }

        if let Some(award) = catalog.award(badge) {
            awards.push(AwardLayer::from_entry(award));
        }
    }

    RenderPlan {
        background,
        foregrounds,
        awards,
        qualifications,
        rank: rank.cloned(),
        service,
        groups: user.group_names().map(str::to_string).collect(),
    }
}

fn fallback_category(fallback: &RankFallback, groups: &NameSet) -> Option<RankCategory> {
    if groups.contains_any(&fallback.officer_names) {
        Some(RankCategory::Officer)
    } else if groups.contains_any(&fallback.enlisted_names) {
        Some(RankCategory::Enlisted)
    } else {
        None
    }
}

fn is_suppressed_for_groups(rules: &SelectionRules, groups: &NameSet, badge: &str) -> bool {
    rules
        .group_badge_suppressions
        .iter()
        .any(|s| groups.contains(&s.group) && s.badges.iter().any(|b| names_eq(b, badge)))
}

/// Highest held badge per tier.
struct TierTops<'a> {
    tops: Vec<(&'a [String], Option<&'a str>)>,
}

impl<'a> TierTops<'a> {
    fn resolve(rules: &'a SelectionRules, held: &NameSet) -> Self {
        let tops = rules
            .tiers
            .all()
            .into_iter()
            .map(|(_, order)| (order, highest_name_in(order, held)))
            .collect();
        Self { tops }
    }

    /// A badge is shown only if it is the highest held entry of every tier containing it.
    fn allows(&self, badge: &str) -> bool {
        self.tops.iter().all(|(order, top)| {
            !order.iter().any(|n| names_eq(n, badge)) || top.is_some_and(|t| names_eq(t, badge))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/select/engine.rs"]
mod tests;
