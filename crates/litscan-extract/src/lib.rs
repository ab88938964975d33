//! Identifier-scoped sentence extraction from full-text JATS XML.
//!
//! [`extract`] is a pure function: raw XML bytes for one article plus a
//! job identifier in, either `None` (the article yields no Result) or a
//! structured hit record out. No I/O, no database, no network.

mod avoid_set;
mod extractor;
mod metadata;
mod regex_util;
mod section;
mod sentence;
mod xml_tree;

pub use extractor::{extract, ExtractedArticle};
