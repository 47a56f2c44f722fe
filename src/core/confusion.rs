// File: src/core/confusion.rs
//! Fixed tables of recognition confusions used by the cascade.

/// Maps a glyph the recognizer commonly emits in place of a digit.
fn code_digit(c: char) -> Option<char> {
    match c {
        'O' | 'o' => Some('0'),
        'l' | 'I' => Some('1'),
        'S' => Some('5'),
        'B' => Some('8'),
        _ => None,
    }
}

/// Rewrites letter look-alikes into digits so a mangled course code can be
/// extracted again. Every other character is kept as-is.
pub fn substitute_code_glyphs(text: &str) -> String {
    text.chars().map(|c| code_digit(c).unwrap_or(c)).collect()
}

/// Visual confusions and known misspellings, applied in order.
/// Multi-glyph keys come before the single glyphs they contain.
const RECOGNITION_CORRECTIONS: &[(&str, &str)] = &[
    ("rr", "ㄱ"),
    ("rl", "ㄴ"),
    ("|", "ㅣ"),
    ("l", "ㅣ"),
    ("1", "ㅣ"),
    ("I", "ㅣ"),
    ("o", "ㅇ"),
    ("O", "ㅇ"),
    ("0", "ㅇ"),
    ("컴퓨터구초", "컴퓨터구조"),
    ("컴퓨타", "컴퓨터"),
    ("프로그리밍", "프로그래밍"),
    ("프로그램밍", "프로그래밍"),
    ("데이타베이스", "데이터베이스"),
    ("데이터배이스", "데이터베이스"),
    ("운영체계", "운영체제"),
    ("운영체재", "운영체제"),
    ("운영체체", "운영체제"),
    ("알고리듬", "알고리즘"),
    ("알고이듬", "알고리즘"),
    ("넷워크", "네트워크"),
    ("소프트웨아", "소프트웨어"),
    ("인공지릉", "인공지능"),
    ("인공지뇽", "인공지능"),
    ("시스탬", "시스템"),
    ("시스뎀", "시스템"),
];

/// Applies every entry of the correction table, left to right.
pub fn apply_recognition_corrections(text: &str) -> String {
    RECOGNITION_CORRECTIONS
        .iter()
        .fold(text.to_string(), |acc, (wrong, right)| acc.replace(wrong, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_glyphs_become_digits() {
        assert_eq!(substitute_code_glyphs("O118O2O"), "0118020");
        assert_eq!(substitute_code_glyphs("5Il8B2o"), "5118820");
        assert_eq!(substitute_code_glyphs("컴퓨터"), "컴퓨터");
    }

    #[test]
    fn known_misspellings_are_fixed() {
        assert_eq!(apply_recognition_corrections("데이타베이스"), "데이터베이스");
        assert_eq!(apply_recognition_corrections("운영체계"), "운영체제");
        assert_eq!(apply_recognition_corrections("컴퓨터구초"), "컴퓨터구조");
    }

    #[test]
    fn latin_lookalikes_become_jamo() {
        assert_eq!(apply_recognition_corrections("rl|"), "ㄴㅣ");
        assert_eq!(apply_recognition_corrections("정보보안"), "정보보안");
    }
}
