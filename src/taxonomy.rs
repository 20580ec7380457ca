//! Category navigation tree built from per-document tag paths.
//!
//! The tree is a trie keyed by tag: each level is a `BTreeMap` from the raw
//! tag to its [`NavigationNode`]. It is rebuilt from the whole corpus on
//! every call to [`build`]; nothing mutates it afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{DocumentRecord, NotebookRef};

/// Top-level navigation, keyed by the raw first tag.
pub type Navigation = BTreeMap<String, NavigationNode>;

/// One category in the navigation tree.
///
/// `count` always equals `documents.len()` plus the sum of the children's
/// counts once [`build`] returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationNode {
    pub label: String,
    pub count: usize,
    pub children: BTreeMap<String, NavigationNode>,
    /// Documents whose tag path ends exactly at this node, in input order.
    #[serde(rename = "notebooks")]
    pub documents: Vec<NotebookRef>,
}

impl NavigationNode {
    fn new(tag: &str) -> Self {
        Self {
            label: label(tag),
            ..Default::default()
        }
    }

    /// Recompute `count` for this subtree, children first.
    fn recount(&mut self) -> usize {
        let nested: usize =
            self.children.values_mut().map(NavigationNode::recount).sum();
        self.count = self.documents.len() + nested;
        self.count
    }
}

/// Human-readable label for a raw tag: underscores become spaces and the
/// first letter of every whitespace-separated word is capitalized. Other
/// characters are left untouched, so the transform is idempotent.
///
/// ```
/// assert_eq!(gistbook::taxonomy::label("machine_learning"), "Machine Learning");
/// assert_eq!(gistbook::taxonomy::label("Machine Learning"), "Machine Learning");
/// ```
pub fn label(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut at_word_start = true;
    for c in tag.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_whitespace() {
            out.push(c);
            at_word_start = true;
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Fold documents into the navigation tree.
///
/// Documents with an empty tag path are skipped. The first tag selects a
/// top-level node, every further tag descends one level, and the document
/// is attached to the deepest node reached.
pub fn build(documents: &[DocumentRecord]) -> Navigation {
    let mut nav = Navigation::new();
    let mut skipped = 0usize;

    for doc in documents {
        let Some((first, rest)) = doc.tags.split_first() else {
            skipped += 1;
            continue;
        };

        let mut node = nav
            .entry(first.clone())
            .or_insert_with(|| NavigationNode::new(first));
        for tag in rest {
            node = node
                .children
                .entry(tag.clone())
                .or_insert_with(|| NavigationNode::new(tag));
        }
        node.documents.push(NotebookRef::from(doc));
    }

    for node in nav.values_mut() {
        node.recount();
    }

    if skipped > 0 {
        tracing::debug!(skipped, "documents without tags left out of navigation");
    }
    tracing::info!(
        categories = nav.len(),
        documents = total_count(&nav),
        "built navigation"
    );

    nav
}

/// Sum of the top-level counts: the number of documents in the tree.
pub fn total_count(nav: &Navigation) -> usize {
    nav.values().map(|n| n.count).sum()
}

/// A top-level category as listed on the catalogue home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub key: String,
    pub label: String,
    pub count: usize,
}

/// Top-level categories, largest first. Equal counts keep key order.
pub fn categories_by_count(nav: &Navigation) -> Vec<CategorySummary> {
    let mut entries: Vec<CategorySummary> = nav
        .iter()
        .map(|(key, node)| CategorySummary {
            key: key.clone(),
            label: node.label.clone(),
            count: node.count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn doc(id: &str, tags: &[&str]) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            path: format!("/{id}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn assert_counts(node: &NavigationNode) {
        let nested: usize = node.children.values().map(|c| c.count).sum();
        assert_eq!(node.count, node.documents.len() + nested);
        for child in node.children.values() {
            assert_counts(child);
        }
    }

    #[test]
    fn nested_and_direct_documents() {
        let nav = build(&[doc("a", &["ml", "nlp"]), doc("b", &["ml"])]);

        assert_eq!(nav.len(), 1);
        let ml = &nav["ml"];
        assert_eq!(ml.label, "Ml");
        assert_eq!(ml.count, 2);
        assert_eq!(ml.documents.len(), 1);
        assert_eq!(ml.documents[0].id, "b");

        assert_eq!(ml.children.len(), 1);
        let nlp = &ml.children["nlp"];
        assert_eq!(nlp.count, 1);
        assert_eq!(nlp.documents.len(), 1);
        assert_eq!(nlp.documents[0].id, "a");
    }

    #[test]
    fn empty_tag_path_is_skipped() {
        let nav = build(&[doc("a", &[]), doc("b", &["stats"])]);
        assert_eq!(nav.len(), 1);
        assert_eq!(total_count(&nav), 1);
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        assert!(build(&[]).is_empty());
    }

    #[test]
    fn deep_paths_share_prefixes() {
        let nav = build(&[
            doc("a", &["ai", "text", "chatbot"]),
            doc("b", &["ai", "text", "chatbot"]),
            doc("c", &["ai", "text"]),
            doc("d", &["ai", "home_service"]),
        ]);

        let ai = &nav["ai"];
        assert_eq!(ai.count, 4);
        assert!(ai.documents.is_empty());

        let text = &ai.children["text"];
        assert_eq!(text.count, 3);
        assert_eq!(text.documents[0].id, "c");

        let chatbot = &text.children["chatbot"];
        let ids: Vec<_> = chatbot.documents.iter().map(|d| &d.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        assert_eq!(ai.children["home_service"].label, "Home Service");
        assert_counts(ai);
    }

    #[test]
    fn label_examples() {
        assert_eq!(label("artificial_intelligence"), "Artificial Intelligence");
        assert_eq!(label("fewshot_learning"), "Fewshot Learning");
        assert_eq!(label("resnet"), "Resnet");
        assert_eq!(label("a__b"), "A  B");
        assert_eq!(label(""), "");
    }

    #[test]
    fn serializes_documents_as_notebooks() {
        let nav = build(&[doc("a", &["ml"])]);
        let json = serde_json::to_value(&nav).unwrap();
        assert_eq!(json["ml"]["label"], "Ml");
        assert_eq!(json["ml"]["count"], 1);
        assert_eq!(json["ml"]["notebooks"][0]["id"], "a");
        assert_eq!(json["ml"]["notebooks"][0]["path"], "/a");
        assert!(json["ml"]["children"].as_object().unwrap().is_empty());
    }

    #[test]
    fn categories_sorted_by_count() {
        let nav = build(&[
            doc("a", &["stats"]),
            doc("b", &["ml"]),
            doc("c", &["ml", "nlp"]),
            doc("d", &["python"]),
        ]);
        let cats = categories_by_count(&nav);
        assert_eq!(cats[0].key, "ml");
        assert_eq!(cats[0].count, 2);
        // ties keep key order
        assert_eq!(cats[1].key, "python");
        assert_eq!(cats[2].key, "stats");
    }

    fn tag_paths() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(
            prop::collection::vec("[a-c_]{1,3}", 0..4),
            0..40,
        )
    }

    proptest! {
        #[test]
        fn counts_are_consistent(paths in tag_paths()) {
            let docs: Vec<DocumentRecord> = paths
                .iter()
                .enumerate()
                .map(|(i, tags)| DocumentRecord {
                    id: i.to_string(),
                    tags: tags.clone(),
                    ..Default::default()
                })
                .collect();
            let nav = build(&docs);

            for node in nav.values() {
                assert_counts(node);
            }
            let tagged = paths.iter().filter(|p| !p.is_empty()).count();
            prop_assert_eq!(total_count(&nav), tagged);
        }

        #[test]
        fn label_is_idempotent(tag in "[a-zA-Z0-9_ \t-]{0,24}") {
            let once = label(&tag);
            prop_assert_eq!(label(&once), once);
        }
    }
}
