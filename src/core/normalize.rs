// File: src/core/normalize.rs

/// Trims and collapses internal whitespace runs to a single space.
pub fn normalize_field(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Form used to detect near-duplicate names: whitespace and punctuation removed.
pub fn dedup_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !is_punctuation(*c))
        .collect()
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '·' | '‧' | '・' | '–' | '—' | '（' | '）')
}

/// Placeholder strings spreadsheets leak into text cells.
pub fn is_blank(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || v.eq_ignore_ascii_case("nan") || v.eq_ignore_ascii_case("none")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_field("  컴퓨터   구조 \t"), "컴퓨터 구조");
    }

    #[test]
    fn dedup_key_strips_spacing_and_punctuation() {
        assert_eq!(dedup_key("캡스톤 디자인(1)"), dedup_key("캡스톤디자인-1"));
        assert_ne!(dedup_key("운영체제"), dedup_key("운영체계"));
    }

    #[test]
    fn blank_placeholders() {
        assert!(is_blank(" nan "));
        assert!(is_blank(""));
        assert!(!is_blank("김교수"));
    }
}
