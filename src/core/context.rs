// File: src/core/context.rs
use crate::core::index::SubjectIndex;
use crate::core::normalize::{is_blank, normalize_field};
use crate::core::types::MatchContext;

/// Names taught by the context's professor, when that professor is known.
/// Narrowing to this list is what lets a weaker similarity still be trusted.
pub fn professor_candidates<'i>(index: &'i SubjectIndex, context: &MatchContext) -> Option<&'i [String]> {
    let professor = context.professor.as_deref().map(normalize_field)?;
    if is_blank(&professor) || !index.knows_professor(&professor) {
        return None;
    }
    Some(index.courses_taught_by(&professor))
}

/// Result of cross-checking a professor against a matched course name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfessorCheck {
    Verified,
    /// The pairing is not in the catalog. Carries a professor who does teach
    /// the course, if any.
    Mismatch { suggestion: Option<String> },
}

pub fn check_professor(index: &SubjectIndex, professor: &str, name: &str) -> ProfessorCheck {
    let professor = normalize_field(professor);
    if index.courses_taught_by(&professor).iter().any(|n| n == name) {
        return ProfessorCheck::Verified;
    }
    ProfessorCheck::Mismatch {
        suggestion: index.professors_teaching(name).first().map(|p| p.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::CourseRecord;

    fn index() -> SubjectIndex {
        SubjectIndex::build(vec![
            CourseRecord::new("1", "컴퓨터구조", "김교수"),
            CourseRecord::new("2", "운영체제", "이교수"),
        ])
    }

    #[test]
    fn candidates_only_for_known_professor() {
        let idx = index();
        let known = professor_candidates(&idx, &MatchContext::with_professor(" 김교수 ")).unwrap();
        assert_eq!(known, ["컴퓨터구조".to_string()]);
        assert!(professor_candidates(&idx, &MatchContext::with_professor("nan")).is_none());
        assert!(professor_candidates(&idx, &MatchContext::default()).is_none());
    }

    #[test]
    fn mismatch_suggests_actual_professor() {
        let idx = index();
        assert_eq!(check_professor(&idx, "김교수", "컴퓨터구조"), ProfessorCheck::Verified);
        assert_eq!(
            check_professor(&idx, "김교수", "운영체제"),
            ProfessorCheck::Mismatch { suggestion: Some("이교수".to_string()) }
        );
        assert_eq!(
            check_professor(&idx, "김교수", "없는과목"),
            ProfessorCheck::Mismatch { suggestion: None }
        );
    }
}
