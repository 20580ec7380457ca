//! Read-side helpers over the loaded document records: page lookup by route
//! slug, per-document table of contents and corpus statistics.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{
    doc_id::DocumentId,
    record::{DocumentRecord, Heading},
    taxonomy::{self, CategorySummary, Navigation},
};

/// One line of a document's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Nesting depth: `level - 1`, so top-level headings have no indent.
    pub indent: usize,
    pub text: String,
    pub anchor: String,
}

impl From<&Heading> for TocEntry {
    fn from(heading: &Heading) -> Self {
        Self {
            indent: usize::from(heading.level.saturating_sub(1)),
            text: heading.text.clone(),
            anchor: heading.id.clone(),
        }
    }
}

/// Table of contents of a document, in heading order.
pub fn table_of_contents(record: &DocumentRecord) -> Vec<TocEntry> {
    record.headings.iter().map(TocEntry::from).collect()
}

/// Corpus-wide counts printed after a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogueStats {
    pub total: usize,
    pub categories: usize,
    pub unique_tags: usize,
    /// Top-level navigation categories, largest first.
    pub top_categories: Vec<CategorySummary>,
}

impl CatalogueStats {
    pub fn collect(records: &[DocumentRecord], nav: &Navigation) -> Self {
        let categories: BTreeSet<&str> =
            records.iter().map(|r| r.category.as_str()).collect();
        let tags: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.tags.iter().map(String::as_str))
            .collect();

        Self {
            total: records.len(),
            categories: categories.len(),
            unique_tags: tags.len(),
            top_categories: taxonomy::categories_by_count(nav),
        }
    }
}

/// The loaded input artifact, addressable by route.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    records: Vec<DocumentRecord>,
}

impl Catalogue {
    pub fn new(records: Vec<DocumentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    /// The document whose id equals the slug segments joined with `/`.
    pub fn find<S: AsRef<str>>(&self, slug: &[S]) -> Option<&DocumentRecord> {
        if slug.is_empty() {
            return None;
        }
        let id = DocumentId::from_slug(slug);
        self.records.iter().find(|r| r.id == id.as_str())
    }

    /// Look up a document by its slash-joined id.
    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        let segments: Vec<&str> = id.trim_matches('/').split('/').collect();
        self.find(&segments)
    }

    /// Route slugs of every document, one static page each.
    pub fn static_slugs(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|r| r.id.split('/').map(str::to_string).collect())
            .collect()
    }
}
