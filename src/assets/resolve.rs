use crate::{
    catalog::model::ImageRef,
    foundation::error::{InsigniaError, InsigniaResult},
};

/// Turns catalog image keys into fetchable URLs.
pub trait AssetResolver: Send + Sync {
    /// Ordered candidate URLs for `key`; the first that loads wins.
    fn candidates(&self, key: &ImageRef) -> Vec<String>;

    /// Preferred URL for `key`, used in tooltip markup.
    fn url_for(&self, key: &ImageRef) -> String {
        self.candidates(key)
            .into_iter()
            .next()
            .unwrap_or_else(|| key.as_str().to_string())
    }
}

/// Default resolver: prefixes a base path and expands extension-less keys.
#[derive(Clone, Debug)]
pub struct ExtensionResolver {
    base: String,
    extensions: Vec<String>,
}

impl Default for ExtensionResolver {
    fn default() -> Self {
        Self::new("")
    }
}

impl ExtensionResolver {
    /// Extensions tried, in order, for keys without one.
    pub const DEFAULT_EXTENSIONS: [&'static str; 3] = ["png", "jpg", "webp"];

    /// Resolver rooted at `base` (may be empty) with the default extensions.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            extensions: Self::DEFAULT_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    /// Replace the extension fallback list.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    fn prefixed(&self, path: &str) -> String {
        if self.base.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.base.trim_end_matches('/'), path)
        }
    }
}

impl AssetResolver for ExtensionResolver {
    fn candidates(&self, key: &ImageRef) -> Vec<String> {
        let Ok(path) = normalize_rel_path(key.as_str()) else {
            return Vec::new();
        };
        if has_extension(&path) || self.extensions.is_empty() {
            return vec![self.prefixed(&path)];
        }
        self.extensions
            .iter()
            .map(|ext| self.prefixed(&format!("{path}.{ext}")))
            .collect()
    }
}

fn has_extension(path: &str) -> bool {
    let file = path.rsplit('/').next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && !ext.is_empty(),
        None => false,
    }
}

/// Normalize and validate catalog-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> InsigniaResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(InsigniaError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(InsigniaError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(InsigniaError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(InsigniaError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolve.rs"]
mod tests;
