// File: src/catalog.rs
//! Reads catalog rows handed over by the provider as loosely-typed JSON.
//!
//! Rows are objects keyed either by the English field names or by the Korean
//! column headers of the registrar export. Codes and credits may arrive as
//! numbers. A row without a usable name is skipped and counted, never fatal.

use crate::core::normalize::is_blank;
use crate::core::types::CourseRecord;
use crate::error::{MatchError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info, warn};

const NAME_KEYS: &[&str] = &["name", "과목명"];
const CODE_KEYS: &[&str] = &["code", "과목코드"];
const PROFESSOR_KEYS: &[&str] = &["professor", "교수명"];
const CREDIT_KEYS: &[&str] = &["credit", "학점"];
const SEMESTER_KEYS: &[&str] = &["semester", "학기"];
const ALIAS_KEYS: &[&str] = &["aliases", "별명/약칭"];

/// Common abbreviations keyed by the word they shorten.
const ABBREVIATIONS: &[(&str, &[&str])] = &[
    ("프로그래밍", &["프밍"]),
    ("컴퓨터", &["컴"]),
    ("데이터베이스", &["DB", "데베", "디비"]),
    ("운영체제", &["OS", "운체"]),
    ("네트워크", &["네트", "넷워크"]),
    ("알고리즘", &["알고"]),
    ("인공지능", &["AI", "인지"]),
    ("소프트웨어", &["SW", "소웨"]),
    ("시스템", &["시스"]),
];

#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub records: Vec<CourseRecord>,
    /// Rows rejected as malformed.
    pub skipped: usize,
}

pub fn parse_rows(rows: Vec<Value>) -> CatalogLoad {
    let mut load = CatalogLoad::default();
    for (position, row) in rows.into_iter().enumerate() {
        match parse_row(&row) {
            Ok(record) => load.records.push(record),
            Err(e) => {
                warn!(row = position, error = %e, "catalog row skipped");
                load.skipped += 1;
            }
        }
    }
    info!(records = load.records.len(), skipped = load.skipped, "catalog parsed");
    load
}

pub fn parse_row(row: &Value) -> Result<CourseRecord> {
    let Value::Object(fields) = row else {
        return Err(MatchError::MalformedRecord(format!("expected an object, got {row}")));
    };

    let name = match lookup(fields, NAME_KEYS) {
        Some(Value::String(name)) if !is_blank(name.trim()) => name.clone(),
        Some(other) => return Err(MatchError::MalformedRecord(format!("name is not a usable string: {other}"))),
        None => return Err(MatchError::MalformedRecord("missing name".to_string())),
    };

    Ok(CourseRecord {
        code: scalar(fields, CODE_KEYS)?,
        professor: scalar(fields, PROFESSOR_KEYS)?,
        credit: scalar(fields, CREDIT_KEYS)?,
        semester: scalar(fields, SEMESTER_KEYS)?,
        aliases: aliases(fields)?,
        name,
    })
}

/// Reads a JSON array of rows from disk.
pub fn load_json(path: &Path) -> Result<CatalogLoad> {
    let reader = BufReader::new(File::open(path)?);
    let rows: Vec<Value> = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), rows = rows.len(), "catalog file read");
    Ok(parse_rows(rows))
}

fn lookup<'a>(fields: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| fields.get(*k)).filter(|v| !v.is_null())
}

/// Strings and numbers are accepted; missing or blank reads as "".
fn scalar(fields: &Map<String, Value>, keys: &[&str]) -> Result<String> {
    let value = match lookup(fields, keys) {
        None => return Ok(String::new()),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(MatchError::MalformedRecord(format!("{} has unsupported value {other}", keys[0])));
        }
    };
    Ok(if is_blank(&value) { String::new() } else { value })
}

/// Either an array of strings or one comma-separated string.
fn aliases(fields: &Map<String, Value>) -> Result<BTreeSet<String>> {
    let raw: Vec<String> = match lookup(fields, ALIAS_KEYS) {
        None => Vec::new(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(MatchError::MalformedRecord(format!("alias is not a string: {other}"))),
            })
            .collect::<Result<_>>()?,
        Some(other) => return Err(MatchError::MalformedRecord(format!("aliases has unsupported value {other}"))),
    };
    Ok(raw
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !is_blank(a))
        .collect())
}

/// Abbreviations a student might write for `name`: table abbreviations,
/// first+middle and first+last syllables, the digit-free form and upper-cased
/// Latin words. Never contains `name` itself.
pub fn generate_aliases(name: &str) -> BTreeSet<String> {
    let mut aliases = BTreeSet::new();

    for (word, short) in ABBREVIATIONS {
        if name.contains(word) {
            aliases.extend(short.iter().map(|s| s.to_string()));
        }
    }

    let compact: Vec<char> = name.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if compact.len() >= 4 {
        aliases.insert([compact[0], compact[compact.len() / 2]].iter().collect());
        aliases.insert([compact[0], compact[compact.len() - 1]].iter().collect());
    }

    if name.chars().any(|c| c.is_ascii_digit()) {
        let without_digits: String = name.chars().filter(|c| !c.is_ascii_digit()).collect();
        let without_digits = without_digits.trim();
        if !without_digits.is_empty() {
            aliases.insert(without_digits.to_string());
        }
    }

    for word in name.split(|c: char| !c.is_ascii_alphabetic()) {
        if word.len() >= 2 {
            aliases.insert(word.to_uppercase());
        }
    }

    aliases.remove(name);
    aliases
}

/// Adds generated aliases to every record, keeping the ones it already has.
pub fn with_generated_aliases(records: Vec<CourseRecord>) -> Vec<CourseRecord> {
    records
        .into_iter()
        .map(|mut record| {
            let generated = generate_aliases(&record.name);
            record.aliases.extend(generated);
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_korean_headers_are_accepted() {
        let load = parse_rows(vec![
            json!({"name": "컴퓨터구조", "code": 5118020, "professor": "김교수", "credit": 3}),
            json!({"과목명": "운영체제", "과목코드": "5118030", "교수명": "이교수", "별명/약칭": "OS, 운체"}),
        ]);
        assert_eq!(load.skipped, 0);
        assert_eq!(load.records[0].code, "5118020");
        assert_eq!(load.records[0].credit, "3");
        assert_eq!(load.records[1].professor, "이교수");
        assert!(load.records[1].aliases.contains("운체"));
    }

    #[test]
    fn malformed_rows_are_counted() {
        let load = parse_rows(vec![
            json!("not an object"),
            json!({"code": "1"}),
            json!({"name": 42}),
            json!({"name": "  "}),
            json!({"name": "nan"}),
            json!({"name": "OK", "credit": [3]}),
            json!({"name": "네트워크", "professor": null, "aliases": ["넷"]}),
        ]);
        assert_eq!(load.skipped, 6);
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].professor, "");
    }

    #[test]
    fn aliases_from_name() {
        let aliases = generate_aliases("운영체제");
        for expected in ["OS", "운체", "운제"] {
            assert!(aliases.contains(expected), "missing {expected}");
        }
        let aliases = generate_aliases("Java프로그래밍2");
        assert!(aliases.contains("JAVA"));
        assert!(aliases.contains("Java프로그래밍"));
        assert!(aliases.contains("프밍"));
        assert!(!aliases.contains("Java프로그래밍2"));
    }

    #[test]
    fn short_names_get_no_syllable_aliases() {
        assert!(generate_aliases("국어").is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"[{"name": "알고리즘", "code": "5118040"}, 7]"#).unwrap();
        let load = load_json(&path).unwrap();
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.skipped, 1);
        assert!(with_generated_aliases(load.records)[0].aliases.contains("알고"));
    }
}
