use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf},
};

use rayon::prelude::*;
use serde::Deserialize;

use crate::{
    doc_id::DocumentId,
    error::{Error, Result},
    record::{DocumentRecord, Heading},
    text_util::{
        clean_title,
        heading_anchor,
        strip_markdown,
        title_case,
        truncate_chars,
    },
    walker::DiscoveredFile,
};

/// Title used when a notebook has no usable markdown heading or first line.
pub const UNTITLED: &str = "Untitled Notebook";

/// Category used for notebooks at the catalogue root.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Characters of notebook text kept for search.
pub const CONTENT_LIMIT: usize = 1000;

/// First lines at least this long are not used as a title.
const MAX_FIRST_LINE_TITLE: usize = 100;

/// The subset of the nbformat v4 layout this crate reads.
#[derive(Debug, Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: Source,
}

/// Cell source: nbformat allows a single string or a list of lines.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Source {
    Text(String),
    Lines(Vec<String>),
}

impl Default for Source {
    fn default() -> Self {
        Source::Text(String::new())
    }
}

impl Source {
    fn text(&self) -> Cow<'_, str> {
        match self {
            Source::Text(s) => Cow::Borrowed(s),
            Source::Lines(lines) => Cow::Owned(lines.concat()),
        }
    }
}

impl Cell {
    fn is_markdown(&self) -> bool {
        self.cell_type == "markdown"
    }

    fn is_code(&self) -> bool {
        self.cell_type == "code"
    }
}

/// Parse a level-1 heading line (`# Title`).
fn h1_text(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('#')?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some(text)
}

/// Parse a heading line of level 1 to 6 into `(level, text)`.
fn heading_line(line: &str) -> Option<(u8, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim();
    (!text.is_empty()).then_some((level as u8, text))
}

/// Extract a title from the first markdown cell that provides one.
///
/// A level-1 heading anywhere in the cell wins. Otherwise the cell's first
/// line is used when it is non-empty and shorter than 100 characters.
fn extract_title(nb: &Notebook) -> String {
    for cell in nb.cells.iter().filter(|c| c.is_markdown()) {
        let source = cell.source.text();

        if let Some(heading) = source.lines().find_map(h1_text) {
            let title = clean_title(heading);
            if !title.is_empty() {
                return title;
            }
        }

        let first_line = source.split('\n').next().unwrap_or("").trim();
        if !first_line.is_empty()
            && first_line.chars().count() < MAX_FIRST_LINE_TITLE
        {
            let title = clean_title(first_line.trim_start_matches('#').trim());
            if !title.is_empty() {
                return title;
            }
        }
    }
    UNTITLED.to_string()
}

/// Every markdown heading, in document order.
fn extract_headings(nb: &Notebook) -> Vec<Heading> {
    nb.cells
        .iter()
        .filter(|c| c.is_markdown())
        .flat_map(|cell| {
            cell.source
                .text()
                .lines()
                .filter_map(heading_line)
                .map(|(level, text)| Heading {
                    level,
                    text: text.to_string(),
                    id: heading_anchor(text),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Searchable text: markdown without formatting markers plus code,
/// truncated to [`CONTENT_LIMIT`] characters.
fn extract_content(nb: &Notebook) -> String {
    let parts: Vec<Cow<'_, str>> = nb
        .cells
        .iter()
        .filter_map(|cell| {
            if cell.is_markdown() {
                Some(Cow::Owned(strip_markdown(&cell.source.text())))
            } else if cell.is_code() {
                Some(cell.source.text())
            } else {
                None
            }
        })
        .collect();
    truncate_chars(&parts.join(" "), CONTENT_LIMIT)
}

/// Directory segments of a relative path (the file name excluded).
fn directory_segments(relative_path: &Path) -> Vec<String> {
    relative_path
        .parent()
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => {
                        Some(s.to_string_lossy().into_owned())
                    }
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Forward-slash form of a relative path with a new extension.
fn rendered_file_path(relative_path: &Path) -> String {
    let html = relative_path.with_extension("html");
    html.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the document record of a parsed notebook.
fn notebook_to_record(nb: &Notebook, relative_path: &Path) -> DocumentRecord {
    let tags = directory_segments(relative_path);
    let category = tags
        .first()
        .map(|c| title_case(c))
        .unwrap_or_else(|| UNCATEGORIZED.to_string());
    let subcategory = tags.get(1).map(|s| title_case(s)).unwrap_or_default();
    let id = DocumentId::from_relative_path(relative_path);

    DocumentRecord {
        path: id.route(),
        id: id.to_string(),
        title: extract_title(nb),
        category,
        subcategory,
        file_path: rendered_file_path(relative_path),
        headings: extract_headings(nb),
        content: extract_content(nb),
        tags,
    }
}

/// Read and convert a single notebook.
pub fn convert_notebook(file: &DiscoveredFile) -> Result<DocumentRecord> {
    let data = std::fs::read_to_string(&file.absolute_path)?;
    let nb: Notebook = serde_json::from_str(&data)?;
    tracing::debug!(path = %file.relative_path.display(), "converted notebook");
    Ok(notebook_to_record(&nb, &file.relative_path))
}

/// Outcome of converting a batch of notebooks.
#[derive(Debug, Default)]
pub struct Ingested {
    /// Converted records, in the order the files were given.
    pub records: Vec<DocumentRecord>,
    /// Notebooks that could not be read or parsed.
    pub failures: Vec<(PathBuf, Error)>,
}

/// Convert discovered notebooks into document records.
///
/// Files are read and parsed in parallel; records keep the input order.
/// A notebook that fails to convert is logged and reported in
/// [`Ingested::failures`] without stopping the batch.
pub fn ingest_notebooks(files: &[DiscoveredFile]) -> Ingested {
    let converted: Vec<_> = files
        .par_iter()
        .map(|file| (file, convert_notebook(file)))
        .collect();

    let mut ingested = Ingested::default();
    for (file, outcome) in converted {
        match outcome {
            Ok(record) => ingested.records.push(record),
            Err(e) => {
                tracing::warn!(
                    path = %file.relative_path.display(),
                    error = %e,
                    "skipping notebook"
                );
                ingested.failures.push((file.relative_path.clone(), e));
            }
        }
    }

    tracing::info!(
        converted = ingested.records.len(),
        failed = ingested.failures.len(),
        "ingested notebooks"
    );
    ingested
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn notebook(cells: serde_json::Value) -> Notebook {
        serde_json::from_value(json!({ "cells": cells, "nbformat": 4 })).unwrap()
    }

    #[test]
    fn title_from_h1_heading() {
        let nb = notebook(json!([
            { "cell_type": "code", "source": "# not markdown" },
            { "cell_type": "markdown", "source": ["Intro text\n", "# Weibull Distribution!\n"] }
        ]));
        assert_eq!(extract_title(&nb), "Weibull Distribution");
    }

    #[test]
    fn title_from_short_first_line() {
        let nb = notebook(json!([
            { "cell_type": "markdown", "source": "## Hidden Markov, chatbot\nmore" }
        ]));
        assert_eq!(extract_title(&nb), "Hidden Markov chatbot");
    }

    #[test]
    fn title_skips_long_first_line() {
        let long = "word ".repeat(30);
        let nb = notebook(json!([
            { "cell_type": "markdown", "source": long },
            { "cell_type": "markdown", "source": "Second Cell" }
        ]));
        assert_eq!(extract_title(&nb), "Second Cell");
    }

    #[test]
    fn title_skips_heading_that_cleans_to_empty() {
        let nb = notebook(json!([
            { "cell_type": "markdown", "source": "# ???\nbody" },
            { "cell_type": "markdown", "source": "# Kaplan-Meier" }
        ]));
        assert_eq!(extract_title(&nb), "Kaplan-Meier");

        let nb = notebook(json!([{ "cell_type": "markdown", "source": "# !!!" }]));
        assert_eq!(extract_title(&nb), UNTITLED);
    }

    #[test]
    fn title_defaults_to_untitled() {
        let nb = notebook(json!([{ "cell_type": "code", "source": "x = 1" }]));
        assert_eq!(extract_title(&nb), UNTITLED);
        assert_eq!(extract_title(&notebook(json!([]))), UNTITLED);
    }

    #[test]
    fn headings_with_levels_and_anchors() {
        let nb = notebook(json!([
            { "cell_type": "markdown", "source": "# Intro\ntext\n## Load the data!\n####### too deep\n#nospace" },
            { "cell_type": "markdown", "source": ["### Results\n"] }
        ]));
        let headings = extract_headings(&nb);
        assert_eq!(
            headings,
            vec![
                Heading { level: 1, text: "Intro".into(), id: "intro".into() },
                Heading { level: 2, text: "Load the data!".into(), id: "load-the-data".into() },
                Heading { level: 3, text: "Results".into(), id: "results".into() },
            ]
        );
    }

    #[test]
    fn content_strips_markdown_and_keeps_code() {
        let nb = notebook(json!([
            { "cell_type": "markdown", "source": "# **Title**" },
            { "cell_type": "code", "source": ["import numpy as np\n", "x = np_array"] },
            { "cell_type": "raw", "source": "ignored" }
        ]));
        assert_eq!(extract_content(&nb), " Title import numpy as np\nx = np_array");
    }

    #[test]
    fn content_is_truncated() {
        let nb = notebook(json!([
            { "cell_type": "code", "source": "x".repeat(CONTENT_LIMIT + 50) }
        ]));
        assert_eq!(extract_content(&nb).chars().count(), CONTENT_LIMIT);
    }

    #[test]
    fn record_from_nested_path() {
        let nb = notebook(json!([{ "cell_type": "markdown", "source": "# Chatbot" }]));
        let record = notebook_to_record(
            &nb,
            Path::new("artificial_intelligence/text/chatbot/hidden_markov.ipynb"),
        );

        assert_eq!(record.id, "artificial_intelligence/text/chatbot/hidden_markov");
        assert_eq!(record.path, "/artificial_intelligence/text/chatbot/hidden_markov");
        assert_eq!(
            record.file_path,
            "artificial_intelligence/text/chatbot/hidden_markov.html"
        );
        assert_eq!(record.category, "Artificial Intelligence");
        assert_eq!(record.subcategory, "Text");
        assert_eq!(record.tags, vec!["artificial_intelligence", "text", "chatbot"]);
        assert_eq!(record.title, "Chatbot");
    }

    #[test]
    fn record_at_root_is_uncategorized() {
        let nb = notebook(json!([]));
        let record = notebook_to_record(&nb, Path::new("test.ipynb"));
        assert_eq!(record.category, UNCATEGORIZED);
        assert!(record.subcategory.is_empty());
        assert!(record.tags.is_empty());
        assert_eq!(record.id, "test");
    }

    #[test]
    fn ingest_keeps_order_and_reports_failures() {
        let tmp = tempfile::tempdir().unwrap();
        let stats = tmp.path().join("statistics");
        std::fs::create_dir(&stats).unwrap();
        std::fs::write(
            stats.join("weibull.ipynb"),
            json!({ "cells": [{ "cell_type": "markdown", "source": "# Weibull" }] }).to_string(),
        )
        .unwrap();
        std::fs::write(tmp.path().join("broken.ipynb"), "not json").unwrap();
        std::fs::write(
            tmp.path().join("test.ipynb"),
            json!({ "cells": [] }).to_string(),
        )
        .unwrap();

        let files = crate::walker::discover_notebooks(
            tmp.path(),
            &crate::walker::Exclusions::none(),
        )
        .unwrap();
        let ingested = ingest_notebooks(&files);

        let ids: Vec<_> = ingested.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["statistics/weibull", "test"]);
        assert_eq!(ingested.failures.len(), 1);
        assert_eq!(ingested.failures[0].0, PathBuf::from("broken.ipynb"));
    }
}
