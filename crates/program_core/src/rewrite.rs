use std::collections::BTreeSet;

use url::Url;

use crate::strip::{has_extension, has_numeric_query, PathStripper};

/// Source path of the generated program stylesheet, after stripping.
pub const PROGRAM_STYLESHEET: &str = "schedule/style.css";

/// Elements whose references are rewritten for the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Link,
    Script,
    Image,
    Anchor,
}

impl ElementKind {
    pub const ALL: [ElementKind; 4] = [
        ElementKind::Link,
        ElementKind::Script,
        ElementKind::Image,
        ElementKind::Anchor,
    ];

    pub fn attribute(self) -> &'static str {
        match self {
            ElementKind::Link | ElementKind::Anchor => "href",
            ElementKind::Script | ElementKind::Image => "src",
        }
    }

    /// CSS selector matching elements of this kind that carry the attribute.
    pub fn selector(self) -> &'static str {
        match self {
            ElementKind::Link => "link[href]",
            ElementKind::Script => "script[src]",
            ElementKind::Image => "img[src]",
            ElementKind::Anchor => "a[href]",
        }
    }
}

/// Deduplicated asset paths discovered while rewriting, relative to the asset root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPathSet {
    paths: BTreeSet<String>,
}

impl AssetPathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the path was not yet known.
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn extend(&mut self, other: AssetPathSet) {
        self.paths.extend(other.paths);
    }
}

/// Normalize the conference's export base URL to a path ending in `/`.
///
/// Only the path of an absolute URL is kept; relative values are taken as paths.
pub fn export_base_path(raw: Option<&str>) -> Result<String, url::ParseError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    let anchor = Url::parse("http://localhost/")?;
    let resolved = anchor.join(raw)?;
    let mut path = resolved.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    Ok(path)
}

/// Rewrite rules for references in rendered pages of one conference.
#[derive(Debug, Clone)]
pub struct ReferenceRewriter {
    stripper: PathStripper,
    base_url: String,
}

impl ReferenceRewriter {
    /// `base_url` is expected to end in `/`, see [`export_base_path`].
    pub fn new(acronym: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            stripper: PathStripper::new(acronym),
            base_url: base_url.into(),
        }
    }

    /// New attribute value for a reference, or `None` when it stays untouched.
    ///
    /// Asset references are recorded in `assets`.
    pub fn rewrite(
        &self,
        kind: ElementKind,
        reference: &str,
        assets: &mut AssetPathSet,
    ) -> Option<String> {
        let reference = reference.trim();
        match kind {
            ElementKind::Link => {
                if !is_site_reference(reference) {
                    return None;
                }
                if self.stripper.strip(reference) == PROGRAM_STYLESHEET {
                    Some(format!("{}style.css", self.base_url))
                } else {
                    Some(self.rewrite_asset(reference, assets))
                }
            }
            ElementKind::Script | ElementKind::Image => {
                if !is_site_reference(reference) {
                    return None;
                }
                Some(self.rewrite_asset(reference, assets))
            }
            ElementKind::Anchor => {
                if !reference.starts_with('/') || reference.starts_with("//") {
                    return None;
                }
                let (path, fragment) = match reference.split_once('#') {
                    Some((path, fragment)) => (path, Some(fragment)),
                    None => (reference, None),
                };
                let mut rewritten = if has_numeric_query(path) {
                    self.rewrite_asset(path, assets)
                } else {
                    self.rewrite_page_link(path)
                };
                if let Some(fragment) = fragment {
                    rewritten.push('#');
                    rewritten.push_str(fragment);
                }
                Some(rewritten)
            }
        }
    }

    fn rewrite_asset(&self, reference: &str, assets: &mut AssetPathSet) -> String {
        let stripped = self.stripper.strip(reference);
        let path = stripped.split_once('?').map_or(stripped, |(path, _)| path);
        assets.insert(path);
        format!("{}{}", self.base_url, path)
    }

    fn rewrite_page_link(&self, reference: &str) -> String {
        let stripped = self.stripper.strip(reference);
        if stripped.is_empty() {
            return format!("{}index.html", self.base_url);
        }
        let mut path = format!("{}{}", self.base_url, stripped);
        if !has_extension(&path) {
            path.push_str(".html");
        }
        path
    }
}

/// References served by the live site itself, as opposed to external or inline ones.
fn is_site_reference(reference: &str) -> bool {
    if reference.is_empty() || reference.starts_with('#') || reference.starts_with("//") {
        return false;
    }
    !has_scheme(reference)
}

fn has_scheme(reference: &str) -> bool {
    let Some((scheme, _)) = reference.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
