//! Artifact types shared by the taxonomy builder and the search index.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One heading of a notebook, used for the per-document table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    /// Anchor id of the heading in the rendered page.
    pub id: String,
}

/// A converted notebook, as stored in the input artifact.
///
/// Every text field defaults to empty when absent so that a sparse record
/// still loads; the search build then indexes whatever text is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRecord {
    pub id: String,
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub path: String,
    pub file_path: String,
    pub headings: Vec<Heading>,
    pub content: String,
    /// Tag path: first tag is the top-level category, the rest are nested
    /// subcategories. May be empty.
    pub tags: Vec<String>,
}

/// A document reference attached to a navigation node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookRef {
    pub title: String,
    pub path: String,
    pub id: String,
}

impl From<&DocumentRecord> for NotebookRef {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            title: record.title.clone(),
            path: record.path.clone(),
            id: record.id.clone(),
        }
    }
}

/// A flattened record in the search documents artifact. Headings are reduced
/// to their text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDocument {
    pub id: String,
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub path: String,
    pub content: String,
    pub tags: Vec<String>,
    pub headings: Vec<String>,
}

impl From<&DocumentRecord> for SearchDocument {
    fn from(record: &DocumentRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.clone(),
            category: record.category.clone(),
            subcategory: record.subcategory.clone(),
            path: record.path.clone(),
            content: record.content.clone(),
            tags: record.tags.clone(),
            headings: record.headings.iter().map(|h| h.text.clone()).collect(),
        }
    }
}

/// Load the input artifact.
///
/// A missing file is reported as [`Error::MissingInput`] since there is
/// nothing to build from.
pub fn load_records(path: &Path) -> Result<Vec<DocumentRecord>> {
    if !path.is_file() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Load the search documents artifact.
pub fn load_search_documents(path: &Path) -> Result<Vec<SearchDocument>> {
    if !path.is_file() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Write any serializable artifact as pretty-printed JSON.
pub fn write_artifact<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    std::io::Write::flush(&mut writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_record_uses_defaults() {
        let json = r#"[{"id": "a", "tags": ["ml"]}]"#;
        let records: Vec<DocumentRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "a");
        assert!(records[0].title.is_empty());
        assert!(records[0].headings.is_empty());
        assert_eq!(records[0].tags, vec!["ml"]);
    }

    #[test]
    fn search_document_keeps_heading_text_only() {
        let record = DocumentRecord {
            id: "ml/intro".into(),
            title: "Intro".into(),
            headings: vec![
                Heading {
                    level: 1,
                    text: "Intro".into(),
                    id: "intro".into(),
                },
                Heading {
                    level: 2,
                    text: "Setup".into(),
                    id: "setup".into(),
                },
            ],
            tags: vec!["ml".into()],
            ..Default::default()
        };
        let doc = SearchDocument::from(&record);
        assert_eq!(doc.headings, vec!["Intro", "Setup"]);
        assert_eq!(doc.tags, vec!["ml"]);
    }

    #[test]
    fn load_missing_artifact_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("notebooks-metadata.json");
        match load_records(&missing) {
            Err(Error::MissingInput(path)) => assert_eq!(path, missing),
            other => panic!("expected MissingInput, got {other:?}"),
        }
    }

    #[test]
    fn write_then_load_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("search-index.json");
        let docs = vec![SearchDocument {
            id: "a".into(),
            title: "Alpha".into(),
            ..Default::default()
        }];
        write_artifact(&path, &docs).unwrap();
        let loaded = load_search_documents(&path).unwrap();
        assert_eq!(loaded, docs);
    }
}
