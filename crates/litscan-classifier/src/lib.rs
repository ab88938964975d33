//! Relevance classification: clean each stored abstract, call a
//! pluggable scoring backend, persist `(rna_related, probability)`.

pub mod backend;
pub mod cleaning;
pub mod pass;

pub use backend::{Classification, ClassifierBackend, HttpClassifier, MockClassifier};
pub use pass::{run, PassSummary};
