//! Europe PMC literature search and full-text retrieval.

mod client;
mod response;

pub use client::{EpmcClient, SearchHit, SearchPage};
