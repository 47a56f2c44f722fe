// File: src/fuzzy/mod.rs
pub mod similarity;

pub use similarity::{best_match, char_set_overlap, similarity};
