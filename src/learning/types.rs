// File: src/learning/types.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of text a correction fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    SubjectName,
    SubjectCode,
    ProfessorName,
    GeneralText,
}

/// How the user's edit changed the recognized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    TruncationFix,
    Completion,
    LangCorrection,
    CharacterCorrection,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorType::SubjectName => "subject_name",
            ErrorType::SubjectCode => "subject_code",
            ErrorType::ProfessorName => "professor_name",
            ErrorType::GeneralText => "general_text",
        })
    }
}

impl fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FeedbackType::TruncationFix => "truncation_fix",
            FeedbackType::Completion => "completion",
            FeedbackType::LangCorrection => "lang_correction",
            FeedbackType::CharacterCorrection => "character_correction",
        })
    }
}

/// One row of the corrections table: an aggregated (recognized, corrected)
/// pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub ocr_result: String,
    pub correct_result: String,
    /// Times this exact pair was observed. Always >= 1.
    pub frequency: u32,
    /// Running average of edit confidences, 0.0..=1.0.
    pub confidence: f64,
    pub error_type: ErrorType,
    pub last_updated: DateTime<Utc>,
    pub auto_approved: bool,
}

/// One row of the append-only feedback log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub timestamp: DateTime<Utc>,
    pub original_ocr: String,
    pub user_correction: String,
    pub confidence: f64,
    /// JSON object serialized as a string.
    pub context: String,
    pub feedback_type: FeedbackType,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEntry {
    pub date: NaiveDate,
    pub total_feedback: usize,
    pub approved_today: usize,
    pub average_confidence: f64,
}

/// Rolling state written by the daily routine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningLog {
    pub last_update: Option<DateTime<Utc>>,
    pub total_corrections: usize,
    pub auto_approved_corrections: usize,
    /// Most recent last; bounded by the configured history limit.
    pub performance_history: Vec<PerformanceEntry>,
}
