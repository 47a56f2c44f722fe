// File: src/core/validator.rs
//! Row-level validation: resolve the course name, then use the matched
//! catalog record to backfill and cross-check the sibling fields.

use crate::core::cascade::Matcher;
use crate::core::context::{check_professor, ProfessorCheck};
use crate::core::index::SubjectIndex;
use crate::core::normalize::is_blank;
use crate::core::types::{MatchContext, MatchMethod};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One recognized table row. `None` or a blank string both mean "missing".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRow {
    pub name: Option<String>,
    pub professor: Option<String>,
    pub code: Option<String>,
    pub credit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRow {
    pub row: CourseRow,
    pub name_confidence: Option<f64>,
    pub method: Option<MatchMethod>,
    /// `None` when the row has no professor to check.
    pub professor_verified: Option<bool>,
    pub professor_suggestion: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !is_blank(v))
}

pub fn validate_row(matcher: &Matcher, index: &SubjectIndex, row: &CourseRow) -> ValidatedRow {
    let config = matcher.config();
    let mut out = ValidatedRow { row: row.clone(), ..Default::default() };

    let Some(name) = present(&row.name) else {
        return out;
    };

    let context = MatchContext {
        professor: present(&row.professor).map(str::to_string),
        code: present(&row.code).map(str::to_string),
        credit: present(&row.credit).map(str::to_string),
    };
    let found = matcher.find_best_match(index, name, Some(&context), config.row_threshold);
    let confidence = found.confidence;

    if confidence > config.row_fill_confidence {
        if let Some(record) = index.record(&found.text) {
            let overwrite = confidence > config.row_overwrite_confidence;
            if !record.code.is_empty() && (overwrite || context.code.is_none()) {
                out.row.code = Some(record.code.clone());
            }
            if !record.credit.is_empty() && (overwrite || context.credit.is_none()) {
                out.row.credit = Some(record.credit.clone());
            }
        }
    }

    if let Some(professor) = context.professor.as_deref() {
        match check_professor(index, professor, &found.text) {
            ProfessorCheck::Verified => out.professor_verified = Some(true),
            ProfessorCheck::Mismatch { suggestion } => {
                debug!(professor = %professor, course = %found.text, suggestion = ?suggestion, "professor does not teach course");
                out.professor_verified = Some(false);
                out.professor_suggestion = suggestion;
            }
        }
    }

    out.name_confidence = Some(confidence);
    out.method = Some(found.method);
    out.row.name = Some(found.text);
    out
}

pub fn validate_table(matcher: &Matcher, index: &SubjectIndex, rows: &[CourseRow]) -> Vec<ValidatedRow> {
    let validated: Vec<ValidatedRow> = rows.iter().map(|row| validate_row(matcher, index, row)).collect();
    let resolved = validated
        .iter()
        .filter(|v| v.method.is_some_and(|m| m != MatchMethod::NoMatch))
        .count();
    info!(rows = validated.len(), resolved, "table validated");
    validated
}
