//! gistbook - category navigation and prefix search for a catalogue of
//! converted notebooks.
//!
//! Two pure transforms sit at the core. [`taxonomy::build`] folds document
//! tag paths into a navigation tree with per-node document counts, and
//! [`search::build_index`] turns the same documents into a forward (prefix)
//! token index that [`search::query`] answers free-text queries against,
//! with a short excerpt per hit.
//!
//! # Quick start
//!
//! ```
//! use gistbook::{DocumentRecord, SearchIndex, taxonomy};
//!
//! let records = vec![
//!     DocumentRecord {
//!         id: "ml/nlp/tokenizers".into(),
//!         title: "Tokenizers".into(),
//!         path: "/ml/nlp/tokenizers".into(),
//!         content: "Byte pair encoding merges frequent pairs.".into(),
//!         tags: vec!["ml".into(), "nlp".into()],
//!         ..Default::default()
//!     },
//!     DocumentRecord {
//!         id: "ml/intro".into(),
//!         title: "Intro".into(),
//!         path: "/ml/intro".into(),
//!         tags: vec!["ml".into()],
//!         ..Default::default()
//!     },
//! ];
//!
//! let nav = taxonomy::build(&records);
//! assert_eq!(nav["ml"].count, 2);
//! assert_eq!(nav["ml"].children["nlp"].count, 1);
//!
//! let index = SearchIndex::from_records(&records);
//! let hits = index.query("token", 10);
//! assert_eq!(hits[0].id, "ml/nlp/tokenizers");
//! ```

pub mod catalogue;
pub mod data_dir;
pub mod doc_id;
pub mod error;
pub mod ingestion;
pub mod record;
pub mod search;
pub mod taxonomy;
pub mod text_util;
pub mod token_index;
pub mod walker;

pub use catalogue::Catalogue;
pub use data_dir::DataDir;
pub use doc_id::DocumentId;
pub use error::{Error, Result};
pub use record::{DocumentRecord, SearchDocument};
pub use search::{SearchIndex, SearchResult};
pub use taxonomy::{Navigation, NavigationNode};
pub use token_index::TokenIndex;
