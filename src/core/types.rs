// File: src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One course offering as delivered by the catalog provider.
/// The canonical `name` is the "value" every match resolves to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub code: String,
    pub name: String,
    pub professor: String,
    pub credit: String,
    /// e.g. "2025-01". Compared as a string when deduplicating.
    pub semester: String,
    /// Abbreviations and known misspellings, e.g. {"OS", "운체"} for "운영체제".
    #[serde(default)]
    pub aliases: BTreeSet<String>,
}

impl CourseRecord {
    pub fn new(code: &str, name: &str, professor: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            professor: professor.to_string(),
            ..Default::default()
        }
    }

    pub fn with_credit(mut self, credit: &str) -> Self {
        self.credit = credit.to_string();
        self
    }

    pub fn with_semester(mut self, semester: &str) -> Self {
        self.semester = semester.to_string();
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.insert(alias.to_string());
        self
    }
}

/// Which cascade stage produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    ExactMatch,
    CodePattern,
    ContextMatch,
    FuzzyMatch,
    PartialMatch,
    PatternMatch,
    NoMatch,
    EmptyInput,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::ExactMatch => "exact_match",
            MatchMethod::CodePattern => "code_pattern",
            MatchMethod::ContextMatch => "context_match",
            MatchMethod::FuzzyMatch => "fuzzy_match",
            MatchMethod::PartialMatch => "partial_match",
            MatchMethod::PatternMatch => "pattern_match",
            MatchMethod::NoMatch => "no_match",
            MatchMethod::EmptyInput => "empty_input",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one noisy string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Canonical name, or the input itself when unresolved.
    pub text: String,
    /// 0..=100
    pub confidence: f64,
    pub method: MatchMethod,
}

impl MatchResult {
    pub fn new(text: impl Into<String>, confidence: f64, method: MatchMethod) -> Self {
        Self { text: text.into(), confidence: confidence.clamp(0.0, 100.0), method }
    }

    pub fn unresolved(text: &str) -> Self {
        Self::new(text, 0.0, MatchMethod::NoMatch)
    }

    pub fn is_match(&self) -> bool {
        !matches!(self.method, MatchMethod::NoMatch | MatchMethod::EmptyInput)
    }
}

/// Sibling fields from the same recognized table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchContext {
    pub professor: Option<String>,
    pub code: Option<String>,
    pub credit: Option<String>,
}

impl MatchContext {
    pub fn with_professor(professor: &str) -> Self {
        Self { professor: Some(professor.to_string()), ..Default::default() }
    }
}

/// A raw region from the recognition engine. Produced by a collaborator;
/// the core only ever reads `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedText {
    pub text: String,
    pub confidence: f32,
    /// (x, y, width, height)
    pub bbox: (u32, u32, u32, u32),
}
