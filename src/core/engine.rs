// File: src/core/engine.rs
use crate::catalog;
use crate::config::Config;
use crate::core::cascade::{MatchStatistics, Matcher};
use crate::core::index::{IndexStats, SharedIndex, SubjectIndex};
use crate::core::types::{CourseRecord, MatchContext, MatchResult, RecognizedText};
use crate::core::validator::{self, CourseRow, ValidatedRow};
use crate::error::{MatchError, Result};
use crate::learning::report::LearningReport;
use crate::learning::{DailySummary, LearningPipeline};
use crate::persistence::{load_index, save_index, CorrectionStore};
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// The entry point collaborators use: one shared index snapshot, the matching
/// cascade over it, and the learning loop that feeds approved corrections
/// back into it.
pub struct MatchEngine<S: CorrectionStore> {
    index: Arc<SharedIndex>,
    matcher: Matcher,
    learning: LearningPipeline<S>,
}

impl<S: CorrectionStore> MatchEngine<S> {
    /// Builds the engine and re-applies previously approved corrections.
    pub fn new(index: SubjectIndex, store: S, config: &Config) -> Result<Self> {
        let matcher = Matcher::new(config.matching.clone())?;
        let index = Arc::new(SharedIndex::new(index));
        let learning = LearningPipeline::new(store, Arc::clone(&index), config.learning.clone());

        let engine = Self { index, matcher, learning };
        match engine.learning.apply_approved() {
            Ok(0) => {}
            Ok(promoted) => info!(aliases = promoted, "approved corrections re-applied"),
            Err(e) => warn!(error = %e, "approved corrections could not be re-applied"),
        }
        Ok(engine)
    }

    pub fn from_records(records: Vec<CourseRecord>, store: S, config: &Config) -> Result<Self> {
        Self::new(SubjectIndex::build(records), store, config)
    }

    /// Loads a JSON catalog, adding generated abbreviations when
    /// `generate_aliases` is set. An unreadable catalog yields an empty index,
    /// so every lookup passes its input through until a catalog is reloaded.
    pub fn from_catalog_file(path: &Path, store: S, config: &Config) -> Result<Self> {
        let index = match catalog::load_json(path) {
            Ok(load) if config.matching.generate_aliases => {
                SubjectIndex::build(catalog::with_generated_aliases(load.records))
            }
            Ok(load) => SubjectIndex::build(load.records),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "catalog unavailable, starting with an empty index");
                SubjectIndex::default()
            }
        };
        Self::new(index, store, config)
    }

    /// Prefers the compiled cache at `cache`; falls back to the catalog and
    /// refreshes the cache from it.
    pub fn from_cache_or_catalog(cache: &Path, catalog_path: &Path, store: S, config: &Config) -> Result<Self> {
        match load_index(cache) {
            Ok(index) => {
                info!(path = %cache.display(), courses = index.len(), "index cache loaded");
                Self::new(index, store, config)
            }
            Err(e) => {
                info!(path = %cache.display(), error = %e, "index cache unusable, building from catalog");
                let engine = Self::from_catalog_file(catalog_path, store, config)?;
                if !engine.index.snapshot().is_empty() {
                    if let Err(e) = engine.save_index_cache(cache) {
                        warn!(path = %cache.display(), error = %e, "index cache not written");
                    }
                }
                Ok(engine)
            }
        }
    }

    /// Replaces the learning loop's wall clock.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.learning = self.learning.with_clock(clock);
        self
    }

    /// Swaps in a new catalog and re-applies approved corrections on top.
    pub fn reload_catalog(&self, records: Vec<CourseRecord>) -> Result<usize> {
        self.index.replace(SubjectIndex::build(records));
        self.learning.apply_approved()
    }

    pub fn index(&self) -> Arc<SubjectIndex> {
        self.index.snapshot()
    }

    pub fn stats(&self) -> IndexStats {
        self.index.snapshot().stats()
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn learning(&self) -> &LearningPipeline<S> {
        &self.learning
    }

    pub fn learning_mut(&mut self) -> &mut LearningPipeline<S> {
        &mut self.learning
    }

    pub fn try_find_best_match(
        &self,
        text: &str,
        context: Option<&MatchContext>,
        threshold: f64,
    ) -> Result<MatchResult> {
        let index = self.index.snapshot();
        if index.is_empty() {
            return Err(MatchError::MissingIndex);
        }
        Ok(self.matcher.find_best_match(&index, text, context, threshold))
    }

    /// Resolves `text` against the current snapshot. With no catalog loaded
    /// the trimmed input comes back unresolved.
    pub fn find_best_match(&self, text: &str, context: Option<&MatchContext>, threshold: f64) -> MatchResult {
        self.try_find_best_match(text, context, threshold).unwrap_or_else(|e| {
            warn!(input = %text, error = %e, "lookup without a catalog, passing input through");
            MatchResult::unresolved(text.trim())
        })
    }

    pub fn resolve(&self, text: &str) -> MatchResult {
        self.find_best_match(text, None, self.matcher.config().default_threshold)
    }

    /// One result per region, in input order. Geometry and recognizer
    /// confidence are ignored.
    pub fn resolve_recognized(&self, regions: &[RecognizedText]) -> Vec<MatchResult> {
        let index = self.index.snapshot();
        let threshold = self.matcher.config().default_threshold;
        if index.is_empty() {
            warn!(regions = regions.len(), "regions received without a catalog, passing them through");
            return regions.iter().map(|r| MatchResult::unresolved(r.text.trim())).collect();
        }
        regions
            .iter()
            .map(|r| self.matcher.find_best_match(&index, &r.text, None, threshold))
            .collect()
    }

    pub fn validate_row(&self, row: &CourseRow) -> ValidatedRow {
        validator::validate_row(&self.matcher, &self.index.snapshot(), row)
    }

    pub fn validate_table(&self, rows: &[CourseRow]) -> Vec<ValidatedRow> {
        validator::validate_table(&self.matcher, &self.index.snapshot(), rows)
    }

    pub fn match_statistics<'t, I>(&self, texts: I) -> MatchStatistics
    where
        I: IntoIterator<Item = &'t str>,
    {
        self.matcher.match_statistics(&self.index.snapshot(), texts)
    }

    pub fn collect_feedback<A, B>(
        &mut self,
        texts: &[A],
        corrections: &[B],
        context: Option<&serde_json::Value>,
        user_id: &str,
    ) -> usize
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        self.learning.collect_feedback(texts, corrections, context, user_id)
    }

    pub fn auto_approve(&mut self, min_frequency: u32, min_confidence: f64) -> usize {
        self.learning.auto_approve(min_frequency, min_confidence)
    }

    pub fn generate_report(&self, days: i64) -> LearningReport {
        self.learning.generate_report(days)
    }

    pub fn daily_routine(&mut self) -> DailySummary {
        self.learning.daily_routine()
    }

    pub fn save_index_cache(&self, path: &Path) -> Result<()> {
        save_index(&self.index.snapshot(), path)?;
        info!(path = %path.display(), "index cache saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MatchMethod;
    use crate::persistence::MemoryStore;

    fn records() -> Vec<CourseRecord> {
        vec![
            CourseRecord::new("5118020", "컴퓨터구조", "김교수"),
            CourseRecord::new("5118030", "운영체제", "이교수").with_alias("OS"),
        ]
    }

    #[test]
    fn empty_catalog_passes_input_through() {
        let engine = MatchEngine::new(SubjectIndex::default(), MemoryStore::default(), &Config::default()).unwrap();
        assert_eq!(engine.resolve(" 운영체제 "), MatchResult::unresolved("운영체제"));
        assert!(matches!(engine.try_find_best_match("x", None, 70.0), Err(MatchError::MissingIndex)));
    }

    #[test]
    fn recognized_regions_resolve_in_order() {
        let engine = MatchEngine::from_records(records(), MemoryStore::default(), &Config::default()).unwrap();
        let region = |text: &str| RecognizedText { text: text.to_string(), confidence: 0.9, bbox: (0, 0, 10, 10) };
        let results = engine.resolve_recognized(&[region("OS"), region("5118020"), region("")]);
        let methods: Vec<MatchMethod> = results.iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![MatchMethod::ExactMatch, MatchMethod::CodePattern, MatchMethod::EmptyInput]);
        assert_eq!(results[1].text, "컴퓨터구조");
    }

    #[test]
    fn missing_catalog_file_degrades_to_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let engine =
            MatchEngine::from_catalog_file(&dir.path().join("none.json"), MemoryStore::default(), &Config::default())
                .unwrap();
        assert_eq!(engine.stats().courses, 0);
    }

    #[test]
    fn cache_is_written_and_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        let cache = dir.path().join("subject_index.bin");
        std::fs::write(&catalog_path, r#"[{"name": "운영체제", "code": "5118030", "aliases": "OS"}]"#).unwrap();

        let first =
            MatchEngine::from_cache_or_catalog(&cache, &catalog_path, MemoryStore::default(), &Config::default()).unwrap();
        assert!(cache.exists());
        assert_eq!(first.resolve("OS").method, MatchMethod::ExactMatch);

        std::fs::remove_file(&catalog_path).unwrap();
        let second =
            MatchEngine::from_cache_or_catalog(&cache, &catalog_path, MemoryStore::default(), &Config::default()).unwrap();
        assert_eq!(second.stats(), first.stats());
    }

    #[test]
    fn catalog_file_gains_generated_abbreviations() {
        let dir = tempfile::tempdir().unwrap();
        let catalog_path = dir.path().join("catalog.json");
        std::fs::write(&catalog_path, r#"[{"name": "운영체제", "code": "5118030"}, {"name": "데이터베이스"}]"#).unwrap();

        let engine = MatchEngine::from_catalog_file(&catalog_path, MemoryStore::default(), &Config::default()).unwrap();
        for abbreviation in ["운체", "OS", "DB"] {
            let result = engine.resolve(abbreviation);
            assert_eq!(result.method, MatchMethod::ExactMatch, "{abbreviation}");
            assert_eq!(result.confidence, 100.0);
        }
        assert_eq!(engine.resolve("데베").text, "데이터베이스");

        let mut config = Config::default();
        config.matching.generate_aliases = false;
        let plain = MatchEngine::from_catalog_file(&catalog_path, MemoryStore::default(), &config).unwrap();
        assert_eq!(plain.stats().aliases, 0);
    }

    #[test]
    fn padded_feedback_is_promoted_as_a_reachable_alias() {
        let mut engine = MatchEngine::from_records(records(), MemoryStore::default(), &Config::default()).unwrap();
        for _ in 0..3 {
            engine.collect_feedback(&["운영체계론 "], &["운영체제"], None, "u1");
        }
        assert_eq!(engine.auto_approve(3, 0.5), 1);
        let result = engine.resolve("운영체계론 ");
        assert_eq!((result.text.as_str(), result.confidence, result.method), ("운영체제", 100.0, MatchMethod::ExactMatch));
        assert_eq!(engine.stats().aliases, 2);
    }

    #[test]
    fn approved_corrections_survive_a_catalog_reload() {
        let mut engine = MatchEngine::from_records(records(), MemoryStore::default(), &Config::default()).unwrap();
        for _ in 0..3 {
            engine.collect_feedback(&["운영체계론"], &["운영체제"], None, "u1");
        }
        assert_eq!(engine.auto_approve(3, 0.5), 1);
        assert_eq!(engine.resolve("운영체계론").method, MatchMethod::ExactMatch);

        assert_eq!(engine.reload_catalog(records()).unwrap(), 1);
        assert_eq!(engine.resolve("운영체계론").confidence, 100.0);
    }
}
