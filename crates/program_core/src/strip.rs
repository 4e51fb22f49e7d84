use std::sync::LazyLock;

use regex::Regex;

static QUERY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?(?:body=)?\d+$").expect("query suffix pattern"));

static EXTENSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\w+$").expect("extension suffix pattern"));

/// Whether `path` ends in a numeric cache-busting query such as `?12345` or `?body=1`.
pub fn has_numeric_query(path: &str) -> bool {
    QUERY_SUFFIX.is_match(path)
}

/// Whether `path` ends in a file-extension-like token such as `.json`.
pub fn has_extension(path: &str) -> bool {
    EXTENSION_SUFFIX.is_match(path)
}

/// Normalizes site paths of one conference to export-relative paths.
///
/// `/en/acme/public/images/logo.png?123` becomes `images/logo.png`.
#[derive(Debug, Clone)]
pub struct PathStripper {
    acronym: String,
}

impl PathStripper {
    pub fn new(acronym: impl Into<String>) -> Self {
        Self {
            acronym: acronym.into(),
        }
    }

    /// Only site-absolute paths lose their conference prefix.
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        let path = match path.strip_prefix('/') {
            Some(rest) => self.strip_conference_prefix(rest),
            None => path,
        };
        match QUERY_SUFFIX.find(path) {
            Some(found) => &path[..found.start()],
            None => path,
        }
    }

    fn strip_conference_prefix<'a>(&self, path: &'a str) -> &'a str {
        if let Some(rest) = self.strip_public_segment(path) {
            return rest;
        }
        let bytes = path.as_bytes();
        let has_locale = bytes.len() > 3
            && bytes[0].is_ascii_lowercase()
            && bytes[1].is_ascii_lowercase()
            && bytes[2] == b'/';
        if has_locale {
            if let Some(rest) = self.strip_public_segment(&path[3..]) {
                return rest;
            }
        }
        path
    }

    fn strip_public_segment<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.acronym.as_str())?
            .strip_prefix("/public/")
    }
}

#[cfg(test)]
mod tests {
    use super::{has_extension, has_numeric_query, PathStripper};

    #[test]
    fn body_marker_is_part_of_the_query() {
        assert!(has_numeric_query("/assets/app.js?body=1"));
        assert!(!has_numeric_query("/assets/app.js?v=abc"));
    }

    #[test]
    fn extension_needs_word_characters() {
        assert!(has_extension("/export/speakers.json"));
        assert!(!has_extension("/export/schedule/3"));
        assert!(!has_extension("/export/events."));
    }

    #[test]
    fn relative_paths_keep_their_prefix() {
        let stripper = PathStripper::new("acme");
        assert_eq!(stripper.strip("/acme/public/acme/public/x"), "acme/public/x");
        assert_eq!(stripper.strip("acme/public/x"), "acme/public/x");
    }

    #[test]
    fn uppercase_segment_is_not_a_locale() {
        let stripper = PathStripper::new("acme");
        assert_eq!(stripper.strip("/EN/acme/public/x"), "EN/acme/public/x");
    }
}
