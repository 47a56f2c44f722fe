// File: src/learning/report.rs
use crate::error::{MatchError, Result};
use crate::learning::types::{CorrectionEntry, ErrorType, FeedbackRecord, FeedbackType};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionSummary {
    pub ocr_result: String,
    pub correct_result: String,
    pub frequency: u32,
}

/// Snapshot of the learning loop over a trailing window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LearningReport {
    pub period_days: i64,
    /// Feedback inside the window.
    pub total_feedback: usize,
    pub total_corrections: usize,
    pub auto_approved_corrections: usize,
    pub pending_corrections: usize,
    pub average_confidence: f64,
    pub error_type_distribution: BTreeMap<ErrorType, usize>,
    /// Over feedback inside the window.
    pub feedback_type_distribution: BTreeMap<FeedbackType, usize>,
    pub most_common_corrections: Vec<CorrectionSummary>,
    /// `None` only on the empty report returned after a failure.
    pub generated_at: Option<DateTime<Utc>>,
}

/// Start of a trailing `days` window ending at `now`.
pub fn window_start(now: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or(MatchError::WindowOutOfRange(days))
}

pub fn build_report(
    feedback: &[FeedbackRecord],
    corrections: &[CorrectionEntry],
    days: i64,
    now: DateTime<Utc>,
    top_n: usize,
) -> Result<LearningReport> {
    let cutoff = window_start(now, days)?;
    let recent: Vec<&FeedbackRecord> = feedback.iter().filter(|f| f.timestamp > cutoff).collect();

    let approved = corrections.iter().filter(|c| c.auto_approved).count();
    let average_confidence = if corrections.is_empty() {
        0.0
    } else {
        corrections.iter().map(|c| c.confidence).sum::<f64>() / corrections.len() as f64
    };

    let mut error_type_distribution = BTreeMap::new();
    for entry in corrections {
        *error_type_distribution.entry(entry.error_type).or_insert(0) += 1;
    }
    let mut feedback_type_distribution = BTreeMap::new();
    for record in &recent {
        *feedback_type_distribution.entry(record.feedback_type).or_insert(0) += 1;
    }

    // Stable sort: equal frequencies keep table order.
    let mut by_frequency: Vec<&CorrectionEntry> = corrections.iter().collect();
    by_frequency.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    let most_common_corrections = by_frequency
        .into_iter()
        .take(top_n)
        .map(|c| CorrectionSummary {
            ocr_result: c.ocr_result.clone(),
            correct_result: c.correct_result.clone(),
            frequency: c.frequency,
        })
        .collect();

    Ok(LearningReport {
        period_days: days,
        total_feedback: recent.len(),
        total_corrections: corrections.len(),
        auto_approved_corrections: approved,
        pending_corrections: corrections.len() - approved,
        average_confidence,
        error_type_distribution,
        feedback_type_distribution,
        most_common_corrections,
        generated_at: Some(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn feedback(day: u32, kind: FeedbackType) -> FeedbackRecord {
        FeedbackRecord {
            timestamp: at(day),
            original_ocr: "a".into(),
            user_correction: "b".into(),
            confidence: 0.5,
            context: "{}".into(),
            feedback_type: kind,
            user_id: "u".into(),
        }
    }

    fn correction(ocr: &str, frequency: u32, approved: bool, error_type: ErrorType) -> CorrectionEntry {
        CorrectionEntry {
            ocr_result: ocr.into(),
            correct_result: "x".into(),
            frequency,
            confidence: 0.5 + frequency as f64 / 10.0,
            error_type,
            last_updated: at(1),
            auto_approved: approved,
        }
    }

    #[test]
    fn window_and_distributions() {
        let feedback = vec![
            feedback(1, FeedbackType::Completion),
            feedback(9, FeedbackType::Completion),
            feedback(10, FeedbackType::TruncationFix),
        ];
        let corrections = vec![
            correction("a", 1, false, ErrorType::GeneralText),
            correction("b", 3, true, ErrorType::SubjectName),
            correction("c", 3, false, ErrorType::SubjectName),
        ];
        let report = build_report(&feedback, &corrections, 7, at(10), 2).unwrap();

        assert_eq!(report.total_feedback, 2);
        assert_eq!(report.feedback_type_distribution[&FeedbackType::Completion], 1);
        assert_eq!(report.total_corrections, 3);
        assert_eq!(report.auto_approved_corrections, 1);
        assert_eq!(report.pending_corrections, 2);
        assert_eq!(report.error_type_distribution[&ErrorType::SubjectName], 2);
        assert!((report.average_confidence - (0.6 + 0.8 + 0.8) / 3.0).abs() < 1e-9);
        let top: Vec<&str> = report.most_common_corrections.iter().map(|c| c.ocr_result.as_str()).collect();
        assert_eq!(top, vec!["b", "c"]);
    }

    #[test]
    fn empty_tables() {
        let report = build_report(&[], &[], 30, at(10), 10).unwrap();
        assert_eq!(report.total_feedback, 0);
        assert_eq!(report.average_confidence, 0.0);
        assert!(report.most_common_corrections.is_empty());
    }

    #[test]
    fn serializes_enum_keys_as_strings() {
        let corrections = vec![correction("a", 1, false, ErrorType::ProfessorName)];
        let json = serde_json::to_value(build_report(&[], &corrections, 7, at(10), 10).unwrap()).unwrap();
        assert_eq!(json["error_type_distribution"]["professor_name"], 1);
    }

    #[test]
    fn unrepresentable_window_is_an_error() {
        assert!(matches!(window_start(at(10), i64::MAX), Err(MatchError::WindowOutOfRange(i64::MAX))));
        assert!(matches!(build_report(&[], &[], 100_000_000, at(10), 10), Err(MatchError::WindowOutOfRange(_))));
        assert_eq!(window_start(at(10), 9).unwrap(), at(1));
    }
}
