use std::collections::HashSet;

/// Fold a catalog or user-supplied name for case-insensitive comparison.
pub fn fold_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Case-insensitive name equality.
pub fn names_eq(a: &str, b: &str) -> bool {
    fold_name(a) == fold_name(b)
}

/// A set of names compared case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameSet {
    folded: HashSet<String>,
}

impl NameSet {
    /// Build a set from any iterator of names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            folded: names
                .into_iter()
                .map(|n| fold_name(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// Whether `name` is in the set, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.folded.contains(&fold_name(name))
    }

    /// Whether any of `names` is in the set.
    pub fn contains_any<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.contains(n.as_ref()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/names.rs"]
mod tests;
