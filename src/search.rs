//! Search index build and query.
//!
//! [`build_index`] turns search documents into a [`TokenIndex`] plus a
//! [`DocumentTable`] aligned by position. [`query`] resolves free text
//! against that pair. Both structures are immutable after the build, so a
//! [`SearchIndex`] can be shared across threads and queried concurrently.

use std::{
    cmp::Reverse,
    collections::{HashMap, HashSet},
};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    record::{DocumentRecord, SearchDocument},
    text_util,
    token_index::{TokenIndex, tokenize},
};

/// Number of results returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: usize = 10;

/// Documents in index order. A document's position in the table is the key
/// stored in the token index.
#[derive(Debug, Clone, Default)]
pub struct DocumentTable {
    docs: Vec<SearchDocument>,
}

impl DocumentTable {
    pub fn get(&self, position: usize) -> Option<&SearchDocument> {
        self.docs.get(position)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SearchDocument> {
        self.docs.iter()
    }
}

/// A ranked hit returned to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub path: String,
    pub excerpt: String,
}

impl SearchResult {
    fn new(doc: &SearchDocument, query: &str) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
            category: doc.category.clone(),
            subcategory: doc.subcategory.clone(),
            path: doc.path.clone(),
            excerpt: text_util::excerpt(&doc.content, query),
        }
    }
}

/// The text indexed for a document: title, category, subcategory, content,
/// heading texts and tags, space-joined in that order.
pub fn indexable_text(doc: &SearchDocument) -> String {
    [
        doc.title.as_str(),
        doc.category.as_str(),
        doc.subcategory.as_str(),
        doc.content.as_str(),
        doc.headings.join(" ").as_str(),
        doc.tags.join(" ").as_str(),
    ]
    .join(" ")
}

/// Build the token index and document table. Input order is preserved and
/// no document is merged or dropped.
pub fn build_index(documents: &[SearchDocument]) -> (TokenIndex, DocumentTable) {
    let mut index = TokenIndex::new();
    for doc in documents {
        index.add(&indexable_text(doc));
    }
    tracing::info!(
        documents = index.doc_count(),
        terms = index.term_count(),
        "built search index"
    );
    (
        index,
        DocumentTable {
            docs: documents.to_vec(),
        },
    )
}

/// Answer a free-text query with at most `limit` ranked results.
///
/// An empty or whitespace-only query returns no results. Internal errors
/// (an index and table that do not belong together) are logged and reported
/// as an empty result, never returned to the caller.
pub fn query(
    index: &TokenIndex,
    table: &DocumentTable,
    text: &str,
    limit: usize,
) -> Vec<SearchResult> {
    if text.trim().is_empty() || limit == 0 {
        return Vec::new();
    }

    match try_query(index, table, text, limit) {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(error = %e, query = text, "search failed");
            Vec::new()
        }
    }
}

fn try_query(
    index: &TokenIndex,
    table: &DocumentTable,
    text: &str,
    limit: usize,
) -> Result<Vec<SearchResult>> {
    if index.doc_count() != table.len() {
        return Err(Error::CorruptIndex(format!(
            "index holds {} documents but table holds {}",
            index.doc_count(),
            table.len()
        )));
    }

    rank(index, table, text)?
        .into_iter()
        .take(limit)
        .map(|position| {
            let doc = lookup(table, position)?;
            Ok(SearchResult::new(doc, text))
        })
        .collect()
}

fn lookup(table: &DocumentTable, position: usize) -> Result<&SearchDocument> {
    table.get(position).ok_or_else(|| {
        Error::CorruptIndex(format!(
            "posting {position} outside table of {}",
            table.len()
        ))
    })
}

/// How closely a document title matches the raw query, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TitleMatch {
    Exact,
    CaseFolded,
    SameTokens,
    Unrelated,
}

impl TitleMatch {
    fn of(title: &str, query: &str, query_terms: &[String]) -> Self {
        if title == query {
            Self::Exact
        } else if text_util::fold_case(title) == text_util::fold_case(query) {
            Self::CaseFolded
        } else if tokenize(title)
            .into_iter()
            .map(|t| t.text)
            .eq(query_terms.iter().cloned())
        {
            Self::SameTokens
        } else {
            Self::Unrelated
        }
    }
}

#[derive(Debug)]
struct Candidate {
    doc: usize,
    title: TitleMatch,
    position_sum: u64,
    exact_hits: usize,
}

/// Table positions of every document matching all query terms, best first.
///
/// Each query term matches any indexed term it is a prefix of. Ordering:
/// 1. documents whose title equals the query, then equals it case-folded,
///    then tokenizes exactly like it,
/// 2. smaller sum of first-occurrence positions (title words come first in
///    the indexed text, so title hits rank above body hits),
/// 3. more query terms matched as whole words rather than prefixes,
/// 4. table position.
///
/// A query without any token (only punctuation, say) can still name a
/// document by its literal title; nothing else matches it.
fn rank(index: &TokenIndex, table: &DocumentTable, text: &str) -> Result<Vec<usize>> {
    let query_terms: Vec<String> =
        tokenize(text).into_iter().map(|t| t.text).collect();

    let mut seen = HashSet::new();
    let distinct: Vec<&str> = query_terms
        .iter()
        .map(String::as_str)
        .filter(|t| seen.insert(*t))
        .collect();
    if distinct.is_empty() {
        let mut hits: Vec<(TitleMatch, usize)> = table
            .iter()
            .enumerate()
            .map(|(doc, d)| (TitleMatch::of(&d.title, text, &query_terms), doc))
            .filter(|(title, _)| *title < TitleMatch::SameTokens)
            .collect();
        hits.sort();
        return Ok(hits.into_iter().map(|(_, doc)| doc).collect());
    }

    let mut candidates: HashMap<usize, Candidate> = HashMap::new();
    for (i, term) in distinct.iter().enumerate() {
        // best (earliest position, any exact hit) per document for this term
        let mut best: HashMap<usize, (u32, bool)> = HashMap::new();
        for (indexed, postings) in index.prefix_matches(term) {
            let exact = indexed == *term;
            for p in postings {
                best.entry(p.doc)
                    .and_modify(|(pos, ex)| {
                        *pos = (*pos).min(p.first_position);
                        *ex |= exact;
                    })
                    .or_insert((p.first_position, exact));
            }
        }

        if i == 0 {
            candidates = best
                .into_iter()
                .map(|(doc, (pos, exact))| {
                    (
                        doc,
                        Candidate {
                            doc,
                            title: TitleMatch::Unrelated,
                            position_sum: u64::from(pos),
                            exact_hits: usize::from(exact),
                        },
                    )
                })
                .collect();
        } else {
            candidates.retain(|doc, _| best.contains_key(doc));
            for (doc, candidate) in candidates.iter_mut() {
                if let Some(&(pos, exact)) = best.get(doc) {
                    candidate.position_sum += u64::from(pos);
                    candidate.exact_hits += usize::from(exact);
                }
            }
        }

        if candidates.is_empty() {
            return Ok(Vec::new());
        }
    }

    let mut ranked: Vec<Candidate> = candidates.into_values().collect();
    for candidate in &mut ranked {
        let doc = lookup(table, candidate.doc)?;
        candidate.title = TitleMatch::of(&doc.title, text, &query_terms);
    }

    ranked.sort_by_key(|c| {
        (
            c.title,
            c.position_sum,
            Reverse(c.exact_hits),
            c.doc,
        )
    });
    Ok(ranked.into_iter().map(|c| c.doc).collect())
}

/// A built token index together with its document table.
///
/// This is the load-once, query-many state of a search session: build it
/// once from the search documents artifact and pass it to whoever serves
/// queries.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    tokens: TokenIndex,
    table: DocumentTable,
}

impl SearchIndex {
    pub fn build(documents: &[SearchDocument]) -> Self {
        let (tokens, table) = build_index(documents);
        Self { tokens, table }
    }

    pub fn from_records(records: &[DocumentRecord]) -> Self {
        let documents: Vec<SearchDocument> =
            records.iter().map(SearchDocument::from).collect();
        Self::build(&documents)
    }

    pub fn query(&self, text: &str, limit: usize) -> Vec<SearchResult> {
        query(&self.tokens, &self.table, text, limit)
    }

    pub fn tokens(&self) -> &TokenIndex {
        &self.tokens
    }

    pub fn table(&self) -> &DocumentTable {
        &self.table
    }
}

/// Format results for human-readable terminal output.
pub fn format_human(results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, r) in results.iter().enumerate() {
        println!("{:>3}. {} ({})", i + 1, r.title, r.path);
        if r.subcategory.is_empty() {
            println!("     {}", r.category);
        } else {
            println!("     {} › {}", r.category, r.subcategory);
        }
        println!("     {}", r.excerpt);
    }
    println!("\n{} result(s)", results.len());
}

#[derive(Serialize)]
struct JsonResults<'a> {
    query: &'a str,
    result_count: usize,
    results: &'a [SearchResult],
}

/// Format results as JSON output.
pub fn format_json(results: &[SearchResult], query: &str) -> Result<()> {
    let out = JsonResults {
        query,
        result_count: results.len(),
        results,
    };
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}
