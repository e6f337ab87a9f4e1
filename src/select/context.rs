use std::{collections::HashMap, path::Path};

use anyhow::Context;

use crate::{
    catalog::names::{NameSet, fold_name},
    foundation::error::{InsigniaError, InsigniaResult},
};

/// A group the user belongs to.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GroupRef {
    /// Group name.
    pub name: String,
}

/// A badge held by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserBadge {
    /// Identifier resolved through [`UserContext::id_to_badge`].
    pub badge_id: u64,
}

/// Badge metadata as known to the host.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BadgeInfo {
    /// Badge name, matched against qualification and award names.
    pub name: String,
}

/// Already-fetched user data consumed by selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserContext {
    /// Groups in membership order.
    #[serde(default)]
    pub groups: Vec<GroupRef>,
    /// Held badges in display order.
    #[serde(default)]
    pub user_badges: Vec<UserBadge>,
    /// Badge lookup table.
    #[serde(default)]
    pub id_to_badge: HashMap<u64, BadgeInfo>,
}

impl UserContext {
    /// Build a context from plain group and badge names, assigning sequential badge ids.
    pub fn from_names<G, B>(groups: G, badges: B) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        let mut ctx = Self {
            groups: groups
                .into_iter()
                .map(|name| GroupRef { name: name.into() })
                .collect(),
            ..Self::default()
        };
        for (idx, name) in badges.into_iter().enumerate() {
            let badge_id = idx as u64 + 1;
            ctx.user_badges.push(UserBadge { badge_id });
            ctx.id_to_badge
                .insert(badge_id, BadgeInfo { name: name.into() });
        }
        ctx
    }

    /// Parse a context from JSON text.
    pub fn from_json_str(json: &str) -> InsigniaResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| InsigniaError::serde(format!("parse user context JSON: {e}")))
    }

    /// Read and parse a context file.
    pub fn from_path(path: &Path) -> InsigniaResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read user context '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Group names in membership order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Case-insensitive set of group names.
    pub fn group_set(&self) -> NameSet {
        NameSet::from_names(self.group_names())
    }

    /// Held badge names in badge order, ids resolved through the lookup.
    ///
    /// Unresolved ids are dropped and a name held twice is kept only at its first position.
    pub fn badge_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.user_badges
            .iter()
            .filter_map(|b| self.id_to_badge.get(&b.badge_id))
            .map(|info| info.name.as_str())
            .filter(|name| !name.trim().is_empty() && seen.insert(fold_name(name)))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/select/context.rs"]
mod tests;
