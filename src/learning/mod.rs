// File: src/learning/mod.rs
//! The feedback loop: collect user corrections, aggregate them into the
//! corrections table, and promote trusted ones into the live index.

pub mod report;
pub mod types;

use crate::config::LearningConfig;
use crate::core::index::SharedIndex;
use crate::error::{MatchError, Result};
use crate::fuzzy::char_set_overlap;
use crate::generator::PatternGenerator;
use crate::persistence::{write_json_atomic, CorrectionStore};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use report::{build_report, window_start, LearningReport};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use types::{CorrectionEntry, ErrorType, FeedbackRecord, FeedbackType, PerformanceEntry};

const SUBJECT_KEYWORDS: &[&str] = &["컴퓨터", "프로그래밍", "데이터", "알고리즘", "공학", "개론"];
const PROFESSOR_TITLES: &[&str] = &["교수", "박사", "선생"];

pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Outcome of one [`LearningPipeline::daily_routine`] run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub approved: usize,
    pub pruned: usize,
    pub report: LearningReport,
}

pub struct LearningPipeline<S: CorrectionStore> {
    store: S,
    index: Arc<SharedIndex>,
    config: LearningConfig,
    clock: Clock,
}

impl<S: CorrectionStore> LearningPipeline<S> {
    pub fn new(store: S, index: Arc<SharedIndex>, config: LearningConfig) -> Self {
        Self { store, index, config, clock: Box::new(Utc::now) }
    }

    /// Replaces the wall clock, e.g. to replay a fixed timeline in tests.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    pub fn corrections(&self) -> Result<Vec<CorrectionEntry>> {
        self.store.load_corrections()
    }

    /// Records every pair whose trimmed texts differ, stored trimmed. Returns
    /// how many were recorded; 0 on a shape mismatch or a store failure (both
    /// logged).
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
        self.try_collect_feedback(texts, corrections, context, user_id)
            .unwrap_or_else(|e| {
                error!(error = %e, "feedback collection failed");
                0
            })
    }

    pub fn try_collect_feedback<A, B>(
        &mut self,
        texts: &[A],
        corrections: &[B],
        context: Option<&serde_json::Value>,
        user_id: &str,
    ) -> Result<usize>
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        if texts.len() != corrections.len() {
            return Err(MatchError::InputShapeMismatch {
                texts: texts.len(),
                corrections: corrections.len(),
            });
        }

        let now = (self.clock)();
        let context = match context {
            Some(value) => serde_json::to_string(value)?,
            None => "{}".to_string(),
        };

        let records: Vec<FeedbackRecord> = texts
            .iter()
            .zip(corrections)
            .map(|(t, c)| (t.as_ref().trim(), c.as_ref().trim()))
            .filter(|(t, c)| t != c)
            .map(|(original, corrected)| FeedbackRecord {
                timestamp: now,
                original_ocr: original.to_string(),
                user_correction: corrected.to_string(),
                confidence: self.edit_confidence(original, corrected),
                context: context.clone(),
                feedback_type: classify_feedback_type(original, corrected),
                user_id: user_id.to_string(),
            })
            .collect();

        let recorded = self.record_feedback(records, now)?;
        if recorded > 0 {
            info!(count = recorded, user = %user_id, "feedback collected");
        }
        Ok(recorded)
    }

    /// Folds each record into the corrections table, then appends to the log.
    /// An unreadable table stops before anything is written.
    fn record_feedback(&mut self, records: Vec<FeedbackRecord>, now: DateTime<Utc>) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut table = self.store.load_corrections()?;
        for record in &records {
            upsert_correction(&mut table, record, now);
        }

        self.store.append_feedback(&records)?;
        self.store.save_corrections(&table)?;
        Ok(records.len())
    }

    /// `min(cap, scale × |A∩B| / |A∪B|)` over character sets.
    pub fn edit_confidence(&self, original: &str, corrected: &str) -> f64 {
        if original == corrected {
            return 1.0;
        }
        let overlap = char_set_overlap(original, corrected);
        (overlap * self.config.edit_confidence_scale).min(self.config.edit_confidence_cap)
    }

    /// Approves every pending entry meeting both thresholds and promotes the
    /// approved pairs into the live index. Returns the number approved.
    pub fn auto_approve(&mut self, min_frequency: u32, min_confidence: f64) -> usize {
        self.try_auto_approve(min_frequency, min_confidence)
            .unwrap_or_else(|e| {
                error!(error = %e, "auto-approval failed");
                0
            })
    }

    pub fn try_auto_approve(&mut self, min_frequency: u32, min_confidence: f64) -> Result<usize> {
        let mut table = self.store.load_corrections()?;
        let mut approved = Vec::new();

        for entry in table.iter_mut() {
            if !entry.auto_approved && entry.frequency >= min_frequency && entry.confidence >= min_confidence {
                entry.auto_approved = true;
                approved.push((entry.ocr_result.clone(), entry.correct_result.clone()));
            }
        }

        if approved.is_empty() {
            return Ok(0);
        }

        self.store.save_corrections(&table)?;
        self.promote(&approved);
        info!(count = approved.len(), min_frequency, min_confidence, "corrections auto-approved");
        Ok(approved.len())
    }

    /// Re-injects every already-approved entry, e.g. after loading a fresh
    /// catalog. Returns the number of aliases added.
    pub fn apply_approved(&self) -> Result<usize> {
        let approved: Vec<(String, String)> = self
            .store
            .load_corrections()?
            .into_iter()
            .filter(|e| e.auto_approved)
            .map(|e| (e.ocr_result, e.correct_result))
            .collect();
        Ok(self.promote(&approved))
    }

    fn promote(&self, pairs: &[(String, String)]) -> usize {
        let current = self.index.snapshot();
        let (next, injected) = current.with_aliases(pairs.iter().map(|(o, c)| (o.as_str(), c.as_str())));
        if injected > 0 {
            self.index.replace(next);
            info!(aliases = injected, "approved corrections promoted into index");
        } else if !pairs.is_empty() {
            warn!(pairs = pairs.len(), "approved corrections added no new aliases");
        }
        injected
    }

    pub fn generate_report(&self, days: i64) -> LearningReport {
        self.try_generate_report(days).unwrap_or_else(|e| {
            error!(error = %e, "report generation failed");
            LearningReport::default()
        })
    }

    pub fn try_generate_report(&self, days: i64) -> Result<LearningReport> {
        let feedback = self.store.load_feedback()?;
        let corrections = self.store.load_corrections()?;
        build_report(&feedback, &corrections, days, (self.clock)(), self.config.top_corrections)
    }

    /// Approve, report, log, prune. Each step is best effort: a failing step
    /// is logged and the routine moves on.
    pub fn daily_routine(&mut self) -> DailySummary {
        info!("daily learning routine started");
        let approved = self.auto_approve(self.config.min_frequency, self.config.min_confidence);
        let report = self.generate_report(self.config.report_days);

        if let Err(e) = self.update_learning_log(&report, approved) {
            error!(error = %e, "learning log update failed");
        }
        let pruned = self.prune_feedback(self.config.retention_days).unwrap_or_else(|e| {
            error!(error = %e, "feedback pruning failed");
            0
        });

        info!(approved, pruned, "daily learning routine finished");
        DailySummary { approved, pruned, report }
    }

    fn update_learning_log(&mut self, report: &LearningReport, approved_today: usize) -> Result<()> {
        let now = (self.clock)();
        let mut log = self.store.load_learning_log()?;
        log.last_update = Some(now);
        log.total_corrections = report.total_corrections;
        log.auto_approved_corrections = report.auto_approved_corrections;
        log.performance_history.push(PerformanceEntry {
            date: now.date_naive(),
            total_feedback: report.total_feedback,
            approved_today,
            average_confidence: report.average_confidence,
        });

        let limit = self.config.history_limit;
        if log.performance_history.len() > limit {
            let excess = log.performance_history.len() - limit;
            log.performance_history.drain(..excess);
        }
        self.store.save_learning_log(&log)
    }

    /// Drops feedback older than `days`. Returns how many records went.
    pub fn prune_feedback(&mut self, days: i64) -> Result<usize> {
        let cutoff = window_start((self.clock)(), days)?;
        let feedback = self.store.load_feedback()?;
        let before = feedback.len();
        let kept: Vec<FeedbackRecord> = feedback.into_iter().filter(|f| f.timestamp > cutoff).collect();
        let removed = before - kept.len();
        if removed > 0 {
            self.store.save_feedback(&kept)?;
            info!(removed, "old feedback pruned");
        }
        Ok(removed)
    }

    /// Writes approved corrections, a 30-day report and summary statistics as
    /// dated JSON files under `dir`. Returns the paths written.
    pub fn export_training_data(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let today = (self.clock)().date_naive();
        let corrections = self.store.load_corrections()?;
        let approved: Vec<&CorrectionEntry> = corrections.iter().filter(|c| c.auto_approved).collect();
        let report = self.try_generate_report(30)?;

        let mut error_types: BTreeMap<ErrorType, usize> = BTreeMap::new();
        for entry in &corrections {
            *error_types.entry(entry.error_type).or_insert(0) += 1;
        }
        let stats = serde_json::json!({
            "total_corrections": corrections.len(),
            "approved_corrections": approved.len(),
            "error_types": error_types,
            "export_date": (self.clock)(),
        });

        let written = vec![
            dir.join(format!("approved_corrections_{today}.json")),
            dir.join(format!("performance_report_{today}.json")),
            dir.join(format!("learning_stats_{today}.json")),
        ];
        write_json_atomic(&written[0], &approved)?;
        write_json_atomic(&written[1], &report)?;
        write_json_atomic(&written[2], &stats)?;

        info!(dir = %dir.display(), approved = approved.len(), "training data exported");
        Ok(written)
    }

    /// Feeds `samples` synthetic corrections built from generator variants of
    /// `subjects`, as if users had fixed them. Deterministic for a given seed.
    pub fn simulate_feedback(
        &mut self,
        subjects: &[&str],
        samples: usize,
        generator: &PatternGenerator,
        seed: u64,
    ) -> Result<usize> {
        let now = (self.clock)();
        let mut rng = StdRng::seed_from_u64(seed);
        let context = serde_json::json!({ "simulation": true }).to_string();

        let mut records = Vec::with_capacity(samples);
        for _ in 0..samples {
            let Some(subject) = subjects.choose(&mut rng) else {
                break;
            };
            let variants: Vec<String> = generator
                .generate(subject, 0.4)
                .into_iter()
                .filter(|v| v != subject)
                .collect();
            let Some(corrupted) = variants.choose(&mut rng) else {
                continue;
            };
            records.push(FeedbackRecord {
                timestamp: now,
                original_ocr: corrupted.clone(),
                user_correction: subject.to_string(),
                confidence: rng.gen_range(0.6..0.95),
                context: context.clone(),
                feedback_type: FeedbackType::CharacterCorrection,
                user_id: "simulation".to_string(),
            });
        }

        let recorded = self.record_feedback(records, now)?;
        info!(count = recorded, "simulated feedback recorded");
        Ok(recorded)
    }
}

fn upsert_correction(table: &mut Vec<CorrectionEntry>, record: &FeedbackRecord, now: DateTime<Utc>) {
    let existing = table
        .iter_mut()
        .find(|e| e.ocr_result == record.original_ocr && e.correct_result == record.user_correction);

    match existing {
        Some(entry) => {
            entry.frequency += 1;
            entry.confidence = (entry.confidence + record.confidence) / 2.0;
            entry.last_updated = now;
        }
        None => table.push(CorrectionEntry {
            ocr_result: record.original_ocr.clone(),
            correct_result: record.user_correction.clone(),
            frequency: 1,
            confidence: record.confidence,
            error_type: classify_error_type(&record.original_ocr, &record.user_correction),
            last_updated: now,
            auto_approved: false,
        }),
    }
}

/// Shorter → truncation fix, longer → completion, Latin letters appearing or
/// disappearing → language correction, otherwise a character fix.
pub fn classify_feedback_type(original: &str, corrected: &str) -> FeedbackType {
    let (before, after) = (original.chars().count(), corrected.chars().count());
    let has_latin = |s: &str| s.chars().any(|c| c.is_ascii_alphabetic());

    if after < before {
        FeedbackType::TruncationFix
    } else if after > before {
        FeedbackType::Completion
    } else if has_latin(original) != has_latin(corrected) {
        FeedbackType::LangCorrection
    } else {
        FeedbackType::CharacterCorrection
    }
}

pub fn classify_error_type(original: &str, corrected: &str) -> ErrorType {
    let either_contains = |needle: &str| original.contains(needle) || corrected.contains(needle);
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());

    if SUBJECT_KEYWORDS.iter().any(|k| either_contains(k)) {
        ErrorType::SubjectName
    } else if all_digits(original) || all_digits(corrected) {
        ErrorType::SubjectCode
    } else if PROFESSOR_TITLES.iter().any(|t| either_contains(t)) {
        ErrorType::ProfessorName
    } else {
        ErrorType::GeneralText
    }
}
