use std::{collections::BTreeMap, fmt, path::Path};

use anyhow::Context;

use crate::{
    catalog::names::{fold_name, names_eq},
    foundation::core::Rect,
    foundation::error::{InsigniaError, InsigniaResult},
};

/// Catalog-relative image key, resolved to fetchable URLs by an [`crate::AssetResolver`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    /// Build a reference from any string-like key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uniform service. The two services wear different artwork for the same rank or badge.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// Army service; the default when no catalog rank resolves.
    Ba,
    /// Air service. Lanyards are never worn with this service's uniform.
    Raf,
}

impl Service {
    /// Whether lanyards are drawn for wearers of this service.
    pub fn wears_lanyards(self) -> bool {
        !matches!(self, Service::Raf)
    }
}

/// Coarse rank category used to pick a background.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankCategory {
    /// Commissioned officer.
    Officer,
    /// Enlisted rank.
    Enlisted,
}

/// Axis-aligned rectangle in `{x, y, width, height}` form, as authored in catalog data.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl RegionRect {
    /// Convert to a [`Rect`].
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn validate(&self, what: &str) -> InsigniaResult<()> {
        for (field, v) in [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !v.is_finite() {
                return Err(InsigniaError::validation(format!(
                    "{what} region {field} must be finite"
                )));
            }
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(InsigniaError::validation(format!(
                "{what} region width/height must be >= 0"
            )));
        }
        Ok(())
    }
}

/// Tooltip text plus an optional illustrative image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TooltipSpec {
    /// Plain tooltip text (escaped when rendered).
    pub text: String,
    /// Optional image shown above the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
}

/// A rank the user may hold through group membership.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RankEntry {
    /// Unique rank name, matched against group names.
    pub name: String,
    /// Officer or enlisted.
    pub category: RankCategory,
    /// Service whose uniform this rank belongs to.
    pub service: Service,
    /// Rank artwork.
    pub image: ImageRef,
    /// Optional tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipSpec>,
    /// Tooltip hit rectangles relative to the rank image's own bounding box.
    #[serde(default)]
    pub regions: Vec<RegionRect>,
}

/// A qualification badge drawn on the uniform.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QualificationEntry {
    /// Badge name.
    pub name: String,
    /// Default artwork.
    pub image: ImageRef,
    /// Rank names that may not wear this qualification.
    #[serde(default)]
    pub restricted_ranks: Vec<String>,
    /// Optional tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipSpec>,
    /// Tooltip hit rectangles in canvas space.
    #[serde(default)]
    pub regions: Vec<RegionRect>,
    /// Per-service artwork overriding [`QualificationEntry::image`].
    #[serde(default)]
    pub service_images: BTreeMap<Service, ImageRef>,
}

impl QualificationEntry {
    /// Whether `rank` is barred from wearing this qualification.
    pub fn is_restricted_for(&self, rank: &str) -> bool {
        self.restricted_ranks.iter().any(|r| names_eq(r, rank))
    }

    /// Artwork for a wearer of `service`.
    pub fn image_for(&self, service: Service) -> &ImageRef {
        self.service_images.get(&service).unwrap_or(&self.image)
    }
}

/// An award shown as a ribbon in the rack. Catalog order is display priority.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AwardEntry {
    /// Award name.
    pub name: String,
    /// Ribbon artwork drawn in the rack.
    pub ribbon: ImageRef,
    /// Full medal artwork, only shown in the tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medal: Option<ImageRef>,
    /// Tooltip text.
    #[serde(default)]
    pub text: String,
}

/// Unit/group metadata: crest artwork and canvas-space tooltip regions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupEntry {
    /// Group name.
    pub name: String,
    /// Crest artwork.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crest: Option<ImageRef>,
    /// Optional tooltip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipSpec>,
    /// Tooltip hit rectangles in canvas space.
    #[serde(default)]
    pub regions: Vec<RegionRect>,
}

/// Lanyard worn by members of a group.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LanyardEntry {
    /// Group name.
    pub group: String,
    /// Lanyard artwork.
    pub image: ImageRef,
    /// Optional tooltip, registered over [`AssetCatalog::lanyard_region`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipSpec>,
}

/// Backgrounds for one service.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BackgroundRow {
    /// Officer background.
    pub officer: ImageRef,
    /// Enlisted background.
    pub enlisted: ImageRef,
}

/// The 2x2 background table keyed by (service, category).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Backgrounds {
    /// Army row.
    pub ba: BackgroundRow,
    /// Air row.
    pub raf: BackgroundRow,
}

impl Backgrounds {
    /// Background for a (service, category) pair.
    pub fn get(&self, service: Service, category: RankCategory) -> &ImageRef {
        let row = match service {
            Service::Ba => &self.ba,
            Service::Raf => &self.raf,
        };
        match category {
            RankCategory::Officer => &row.officer,
            RankCategory::Enlisted => &row.enlisted,
        }
    }
}

/// Group-name lists used when no catalog rank matches.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RankFallback {
    /// Groups implying an officer background.
    #[serde(default)]
    pub officer_names: Vec<String>,
    /// Groups implying an enlisted background.
    #[serde(default)]
    pub enlisted_names: Vec<String>,
}

/// Badge precedence tiers, each ordered from lowest to highest.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tiers {
    /// Leadership course badges.
    #[serde(default)]
    pub leadership: Vec<String>,
    /// Marksmanship badges.
    #[serde(default)]
    pub marksmanship: Vec<String>,
    /// Pilot wings.
    #[serde(default)]
    pub pilot: Vec<String>,
}

impl Tiers {
    /// All tiers with their names.
    pub fn all(&self) -> [(&'static str, &[String]); 3] {
        [
            ("leadership", self.leadership.as_slice()),
            ("marksmanship", self.marksmanship.as_slice()),
            ("pilot", self.pilot.as_slice()),
        ]
    }
}

/// A qualification only shown to members of specific unit groups.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UnitGate {
    /// Gated qualification name.
    pub qualification: String,
    /// Groups allowed to show it.
    pub groups: Vec<String>,
}

/// Badges never rendered for members of a group.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupBadgeSuppression {
    /// Group whose members skip the badges.
    pub group: String,
    /// Suppressed badge names.
    pub badges: Vec<String>,
}

/// Declarative selection rules shipped alongside the asset tables.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SelectionRules {
    /// Background table.
    pub backgrounds: Backgrounds,
    /// Officer/enlisted fallback lists.
    #[serde(default)]
    pub rank_fallback: RankFallback,
    /// Badge precedence tiers.
    #[serde(default)]
    pub tiers: Tiers,
    /// Unit-gated qualifications.
    #[serde(default)]
    pub unit_gated: Vec<UnitGate>,
    /// Group-specific badge suppressions.
    #[serde(default)]
    pub group_badge_suppressions: Vec<GroupBadgeSuppression>,
}

/// Immutable description of every rank, qualification, award, group and lanyard.
///
/// Array order is meaningful: `ranks` run from lowest to highest, and `awards` from highest
/// display priority to lowest.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssetCatalog {
    /// Ranks, lowest first.
    pub ranks: Vec<RankEntry>,
    /// Qualifications.
    #[serde(default)]
    pub qualifications: Vec<QualificationEntry>,
    /// Awards, highest priority first.
    #[serde(default)]
    pub awards: Vec<AwardEntry>,
    /// Groups with crests and tooltip regions.
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    /// Lanyards by group.
    #[serde(default)]
    pub lanyards: Vec<LanyardEntry>,
    /// Canvas-space region shared by all lanyard tooltips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lanyard_region: Option<RegionRect>,
    /// Selection rules.
    pub rules: SelectionRules,
}

impl AssetCatalog {
    /// Parse a catalog from JSON text and validate it.
    pub fn from_json_str(json: &str) -> InsigniaResult<Self> {
        let catalog: Self = serde_json::from_str(json)
            .map_err(|e| InsigniaError::serde(format!("parse catalog JSON: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read, parse and validate a catalog file.
    pub fn from_path(path: &Path) -> InsigniaResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Validate catalog invariants.
    pub fn validate(&self) -> InsigniaResult<()> {
        let mut seen_ranks = std::collections::HashSet::new();
        for rank in &self.ranks {
            require_name(&rank.name, "rank name")?;
            require_key(&rank.image, "rank image")?;
            if !seen_ranks.insert(fold_name(&rank.name)) {
                return Err(InsigniaError::validation(format!(
                    "duplicate rank name '{}'",
                    rank.name
                )));
            }
            for r in &rank.regions {
                r.validate(&format!("rank '{}'", rank.name))?;
            }
        }

        for q in &self.qualifications {
            require_name(&q.name, "qualification name")?;
            require_key(&q.image, "qualification image")?;
            for key in q.service_images.values() {
                require_key(key, "qualification service image")?;
            }
            for r in &q.regions {
                r.validate(&format!("qualification '{}'", q.name))?;
            }
        }

        for a in &self.awards {
            require_name(&a.name, "award name")?;
            require_key(&a.ribbon, "award ribbon")?;
        }

        for g in &self.groups {
            require_name(&g.name, "group name")?;
            for r in &g.regions {
                r.validate(&format!("group '{}'", g.name))?;
            }
        }

        for l in &self.lanyards {
            require_name(&l.group, "lanyard group")?;
            require_key(&l.image, "lanyard image")?;
        }
        if let Some(r) = &self.lanyard_region {
            r.validate("lanyard")?;
        }

        let rules = &self.rules;
        for key in [
            &rules.backgrounds.ba.officer,
            &rules.backgrounds.ba.enlisted,
            &rules.backgrounds.raf.officer,
            &rules.backgrounds.raf.enlisted,
        ] {
            require_key(key, "background")?;
        }
        for (tier, names) in rules.tiers.all() {
            for n in names {
                require_name(n, &format!("{tier} tier entry"))?;
            }
        }
        for gate in &rules.unit_gated {
            require_name(&gate.qualification, "unit-gated qualification")?;
            if gate.groups.is_empty() {
                return Err(InsigniaError::validation(format!(
                    "unit-gated qualification '{}' must list at least one group",
                    gate.qualification
                )));
            }
        }
        for s in &rules.group_badge_suppressions {
            require_name(&s.group, "badge suppression group")?;
        }

        Ok(())
    }

    /// Find a qualification by name, ignoring case.
    pub fn qualification(&self, name: &str) -> Option<&QualificationEntry> {
        self.qualifications.iter().find(|q| names_eq(&q.name, name))
    }

    /// Find an award by name, ignoring case.
    pub fn award(&self, name: &str) -> Option<&AwardEntry> {
        self.awards.iter().find(|a| names_eq(&a.name, name))
    }

    /// Display priority of an award (0 is highest), by name.
    pub fn award_priority(&self, name: &str) -> Option<usize> {
        self.awards.iter().position(|a| names_eq(&a.name, name))
    }

    /// Find an award by its ribbon image key.
    pub fn award_by_ribbon(&self, ribbon: &ImageRef) -> Option<&AwardEntry> {
        self.awards.iter().find(|a| &a.ribbon == ribbon)
    }

    /// Find group metadata by name, ignoring case.
    pub fn group(&self, name: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|g| names_eq(&g.name, name))
    }

    /// Find the lanyard worn by members of `group`, ignoring case.
    pub fn lanyard(&self, group: &str) -> Option<&LanyardEntry> {
        self.lanyards.iter().find(|l| names_eq(&l.group, group))
    }
}

fn require_name(name: &str, what: &str) -> InsigniaResult<()> {
    if name.trim().is_empty() {
        return Err(InsigniaError::validation(format!("{what} must be non-empty")));
    }
    Ok(())
}

fn require_key(key: &ImageRef, what: &str) -> InsigniaResult<()> {
    if key.as_str().trim().is_empty() {
        return Err(InsigniaError::validation(format!(
            "{what} image key must be non-empty"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
