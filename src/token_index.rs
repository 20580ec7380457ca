//! Forward (prefix) token index over document positions.
//!
//! Terms live in a sorted dictionary, so every term that starts with a given
//! prefix is found with a single range scan. Each term maps to its postings:
//! the table positions of the documents containing it, ascending, together
//! with the ordinal of the term's first occurrence in that document's text.

use std::{collections::BTreeMap, ops::Bound};

use tantivy::tokenizer::{
    LowerCaser,
    SimpleTokenizer,
    TextAnalyzer,
    TokenStream,
};

/// The analyzer shared by indexing and querying: split on non-alphanumeric
/// characters, then lowercase.
fn analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .build()
}

/// A token produced by [`tokenize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Ordinal of the token within the analyzed text.
    pub position: u32,
}

/// Tokenize text the same way for indexing and for queries.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut analyzer = analyzer();
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while stream.advance() {
        let token = stream.token();
        tokens.push(Token {
            text: token.text.clone(),
            position: token.position as u32,
        });
    }
    tokens
}

/// One document containing a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    /// Position of the document in the document table.
    pub doc: usize,
    /// Ordinal of the term's first occurrence in the document text.
    pub first_position: u32,
}

/// Mapping from case-folded term to the documents containing it.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    terms: BTreeMap<String, Vec<Posting>>,
    doc_count: usize,
}

impl TokenIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the text of the next document in table order and return its
    /// position.
    pub fn add(&mut self, text: &str) -> usize {
        let doc = self.doc_count;
        self.doc_count += 1;

        let mut first_seen: BTreeMap<String, u32> = BTreeMap::new();
        for token in tokenize(text) {
            first_seen.entry(token.text).or_insert(token.position);
        }
        for (term, first_position) in first_seen {
            self.terms.entry(term).or_default().push(Posting {
                doc,
                first_position,
            });
        }

        doc
    }

    /// Number of documents added so far.
    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Postings of an exact term.
    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.terms.get(term).map(Vec::as_slice)
    }

    /// Every indexed term starting with `prefix`, in sorted order, with its
    /// postings.
    pub fn prefix_matches<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [Posting])> + 'a {
        self.terms
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(term, _)| term.starts_with(prefix))
            .map(|(term, postings)| (term.as_str(), postings.as_slice()))
    }
}
