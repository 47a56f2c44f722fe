// File: src/core/cascade.rs
//! Ordered fallback strategies that resolve one noisy string to a catalog name.
//!
//! Each strategy is a plain function with the same shape: look at the text
//! (and optionally the row context) and either return a result that already
//! cleared its own acceptance bar, or `None` to fall through. The cascade
//! walks them in a fixed order and stops at the first hit.

use crate::config::MatchConfig;
use crate::core::confusion::{apply_recognition_corrections, substitute_code_glyphs};
use crate::core::context::professor_candidates;
use crate::core::index::SubjectIndex;
use crate::core::types::{MatchContext, MatchMethod, MatchResult};
use crate::error::Result;
use crate::fuzzy::best_match;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

type Strategy = fn(&Matcher, &SubjectIndex, &str, Option<&MatchContext>, f64) -> Option<MatchResult>;

const STRATEGIES: [Strategy; 6] = [
    Matcher::exact,
    Matcher::code_pattern,
    Matcher::context,
    Matcher::fuzzy,
    Matcher::partial,
    Matcher::pattern_corrected,
];

/// Stateless apart from its configuration; safe to share across threads and
/// to run against any index snapshot.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatchConfig,
    code_re: Regex,
}

impl Matcher {
    pub fn new(config: MatchConfig) -> Result<Self> {
        let code_re = Regex::new(&format!(r"\b[0-9]{{{}}}\b", config.code_length))?;
        Ok(Self { config, code_re })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Resolves `text` against `index`.
    ///
    /// Returns the canonical name with a 0..=100 confidence and the tag of the
    /// stage that accepted it, or the trimmed input with `no_match`.
    pub fn find_best_match(
        &self,
        index: &SubjectIndex,
        text: &str,
        context: Option<&MatchContext>,
        threshold: f64,
    ) -> MatchResult {
        let text = text.trim();
        if text.is_empty() {
            return MatchResult::new(text, 0.0, MatchMethod::EmptyInput);
        }

        for strategy in STRATEGIES {
            if let Some(found) = strategy(self, index, text, context, threshold) {
                debug!(input = %text, matched = %found.text, confidence = found.confidence, method = %found.method, "match");
                return found;
            }
        }

        debug!(input = %text, "no match");
        MatchResult::unresolved(text)
    }

    /// Shorthand with the configured default threshold and no context.
    pub fn resolve(&self, index: &SubjectIndex, text: &str) -> MatchResult {
        self.find_best_match(index, text, None, self.config.default_threshold)
    }

    fn is_canonical_code(&self, text: &str) -> bool {
        text.chars().count() == self.config.code_length && text.chars().all(|c| c.is_ascii_digit())
    }

    fn exact(&self, index: &SubjectIndex, text: &str, _: Option<&MatchContext>, _: f64) -> Option<MatchResult> {
        // Canonical numeric codes are left to the code stage unless a course
        // is literally named that way.
        let name = if self.is_canonical_code(text) && !index.contains_name(text) {
            index.name_for_alias(text)?
        } else {
            index.resolve_exact(text)?
        };
        Some(MatchResult::new(name, self.config.exact_confidence, MatchMethod::ExactMatch))
    }

    fn code_pattern(&self, index: &SubjectIndex, text: &str, _: Option<&MatchContext>, _: f64) -> Option<MatchResult> {
        let name = self.known_code_in(index, text).or_else(|| {
            let substituted = substitute_code_glyphs(text);
            if substituted == text {
                None
            } else {
                self.known_code_in(index, &substituted)
            }
        })?;
        Some(MatchResult::new(name, self.config.code_confidence, MatchMethod::CodePattern))
    }

    fn known_code_in<'i>(&self, index: &'i SubjectIndex, text: &str) -> Option<&'i str> {
        self.code_re
            .find_iter(text)
            .find_map(|m| index.name_for_code(m.as_str()))
    }

    fn context(
        &self,
        index: &SubjectIndex,
        text: &str,
        context: Option<&MatchContext>,
        threshold: f64,
    ) -> Option<MatchResult> {
        let candidates = professor_candidates(index, context?)?;
        let (name, score) = best_match(text, candidates.iter().map(String::as_str))?;
        if score < threshold - self.config.context_slack {
            return None;
        }
        let boosted = (score + self.config.context_bonus).min(100.0);
        Some(MatchResult::new(name, boosted, MatchMethod::ContextMatch))
    }

    fn fuzzy(&self, index: &SubjectIndex, text: &str, _: Option<&MatchContext>, threshold: f64) -> Option<MatchResult> {
        let (name, score) = best_match(text, index.names())?;
        (score >= threshold).then(|| MatchResult::new(name, score, MatchMethod::FuzzyMatch))
    }

    fn partial(&self, index: &SubjectIndex, text: &str, _: Option<&MatchContext>, threshold: f64) -> Option<MatchResult> {
        let text_len = text.chars().count();
        if text_len < 2 {
            return None;
        }

        let mut best: Option<(&str, f64)> = None;
        for name in index.names() {
            let name_len = name.chars().count();
            if name_len < 2 {
                continue;
            }
            let score = if name.contains(text) {
                text_len as f64 / name_len as f64 * self.config.partial_contained_weight
            } else if text.contains(name) {
                name_len as f64 / text_len as f64 * self.config.partial_containing_weight
            } else {
                continue;
            };
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((name, score));
            }
        }

        let (name, score) = best?;
        (score >= threshold - self.config.partial_slack)
            .then(|| MatchResult::new(name, score, MatchMethod::PartialMatch))
    }

    fn pattern_corrected(
        &self,
        index: &SubjectIndex,
        text: &str,
        _: Option<&MatchContext>,
        threshold: f64,
    ) -> Option<MatchResult> {
        let corrected = apply_recognition_corrections(text);
        if corrected != text {
            if let Some(name) = index.resolve_exact(&corrected) {
                return Some(MatchResult::new(
                    name,
                    self.config.pattern_exact_confidence,
                    MatchMethod::PatternMatch,
                ));
            }
        }

        let (name, score) = best_match(&corrected, index.names())?;
        let penalized = score - self.config.pattern_penalty;
        (penalized >= threshold - self.config.pattern_slack)
            .then(|| MatchResult::new(name, penalized, MatchMethod::PatternMatch))
    }

    /// Aggregate view of how a batch of inputs resolves.
    pub fn match_statistics<'t, I>(&self, index: &SubjectIndex, texts: I) -> MatchStatistics
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut stats = MatchStatistics::default();
        let mut total_confidence = 0.0;

        for text in texts {
            let result = self.resolve(index, text);
            stats.total_inputs += 1;
            total_confidence += result.confidence;
            if result.confidence >= self.config.exact_confidence {
                stats.exact_matches += 1;
            } else if result.confidence > 0.0 {
                stats.fuzzy_matches += 1;
            } else {
                stats.no_matches += 1;
            }
            *stats.methods.entry(result.method).or_insert(0) += 1;
        }

        if stats.total_inputs > 0 {
            stats.average_confidence = total_confidence / stats.total_inputs as f64;
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStatistics {
    pub total_inputs: usize,
    pub exact_matches: usize,
    pub fuzzy_matches: usize,
    pub no_matches: usize,
    pub average_confidence: f64,
    pub methods: BTreeMap<MatchMethod, usize>,
}
