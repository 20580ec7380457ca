use std::path::{Component, Path};

/// A stable document identifier derived from a notebook's path relative to
/// the catalogue root: the path without its extension, segments joined by
/// `/` (e.g. `artificial_intelligence/text/chatbot`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derive the identifier from a relative notebook path.
    ///
    /// Only normal path components are kept, so `./a/b.ipynb` and
    /// `a/b.ipynb` produce the same id on every platform.
    pub fn from_relative_path(relative_path: &Path) -> Self {
        let stem = relative_path.with_extension("");
        let segments: Vec<String> = stem
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Self(segments.join("/"))
    }

    /// Rebuild an identifier from route segments (the inverse of
    /// [`DocumentId::segments`]).
    pub fn from_slug<S: AsRef<str>>(slug: &[S]) -> Self {
        Self(
            slug.iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join("/"),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The addressable route for this document, e.g. `/a/b`.
    pub fn route(&self) -> String {
        format!("/{}", self.0)
    }

    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').collect()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = DocumentId::from_relative_path(Path::new("ml/nlp/intro.ipynb"));
        let b = DocumentId::from_relative_path(Path::new("ml/nlp/intro.ipynb"));
        assert_eq!(a, b);
    }

    #[test]
    fn strips_extension_and_joins_segments() {
        let id = DocumentId::from_relative_path(Path::new("ml/nlp/intro.ipynb"));
        assert_eq!(id.as_str(), "ml/nlp/intro");
        assert_eq!(id.route(), "/ml/nlp/intro");
    }

    #[test]
    fn ignores_current_dir_components() {
        let id = DocumentId::from_relative_path(Path::new("./ml/intro.ipynb"));
        assert_eq!(id.as_str(), "ml/intro");
    }

    #[test]
    fn top_level_file() {
        let id = DocumentId::from_relative_path(Path::new("test.ipynb"));
        assert_eq!(id.as_str(), "test");
        assert_eq!(id.segments(), vec!["test"]);
    }

    #[test]
    fn slug_roundtrip() {
        let id = DocumentId::from_relative_path(Path::new("a/b/c.ipynb"));
        let slug = id.segments();
        assert_eq!(slug, vec!["a", "b", "c"]);
        assert_eq!(DocumentId::from_slug(&slug), id);
    }

    #[test]
    fn display_is_plain_id() {
        let id = DocumentId::from_slug(&["statistics", "weibull"]);
        assert_eq!(id.to_string(), "statistics/weibull");
    }
}
