// File: src/lib.rs

pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod fuzzy;
pub mod generator;
pub mod learning;
pub mod persistence;

pub use crate::config::{Config, MatchConfig};
pub use crate::core::cascade::Matcher;
pub use crate::core::engine::MatchEngine;
pub use crate::core::index::{SharedIndex, SubjectIndex};
pub use crate::core::types::{CourseRecord, MatchContext, MatchMethod, MatchResult, RecognizedText};
pub use crate::core::validator::{CourseRow, ValidatedRow};
pub use crate::error::{MatchError, Result};
pub use crate::generator::PatternGenerator;
pub use crate::learning::LearningPipeline;
pub use crate::persistence::{CorrectionStore, JsonFileStore, MemoryStore};
