// File: tests/end_to_end.rs
use match_core::generator::{misspelling_variants, truncation_variants};
use match_core::{Config, CourseRecord, CourseRow, MatchEngine, MatchMethod, MemoryStore, PatternGenerator};

fn engine() -> MatchEngine<MemoryStore> {
    let records = vec![
        CourseRecord::new("5118020", "컴퓨터구조", "김교수").with_credit("3"),
        CourseRecord::new("5118030", "운영체제", "이교수").with_alias("OS"),
        CourseRecord::new("0118020", "오픈소스플랫폼", "박교수"),
    ];
    MatchEngine::from_records(records, MemoryStore::default(), &Config::default()).unwrap()
}

#[test]
fn catalog_scenario() {
    let engine = engine();

    let garbled = engine.resolve("컴퓨터구초");
    assert_eq!(garbled.text, "컴퓨터구조");
    assert!(garbled.confidence >= 80.0);
    assert!(matches!(garbled.method, MatchMethod::FuzzyMatch | MatchMethod::PatternMatch));

    let code = engine.resolve("5118020");
    assert_eq!((code.text.as_str(), code.confidence, code.method), ("컴퓨터구조", 95.0, MatchMethod::CodePattern));

    let alias = engine.resolve("OS");
    assert_eq!((alias.text.as_str(), alias.confidence, alias.method), ("운영체제", 100.0, MatchMethod::ExactMatch));

    let nothing = engine.resolve("zzz9");
    assert_eq!((nothing.text.as_str(), nothing.confidence, nothing.method), ("zzz9", 0.0, MatchMethod::NoMatch));
}

#[test]
fn glyph_swapped_code_resolves() {
    let result = engine().resolve("O118O2O");
    assert_eq!(result.text, "오픈소스플랫폼");
    assert_eq!(result.method, MatchMethod::CodePattern);
}

#[test]
fn empty_input_is_tagged() {
    let result = engine().resolve("   ");
    assert_eq!(result.method, MatchMethod::EmptyInput);
    assert_eq!(result.confidence, 0.0);
}

#[test]
fn row_validation_backfills_code() {
    let engine = engine();
    let row = CourseRow { name: Some("운영체제".into()), professor: Some("이교수".into()), ..Default::default() };
    let out = engine.validate_row(&row);
    assert_eq!(out.row.code.as_deref(), Some("5118030"));
    assert_eq!(out.professor_verified, Some(true));
}

#[test]
fn misspelling_and_truncation_variants_resolve_back() {
    for original in ["컴퓨터구조", "운영체제", "데이터베이스", "알고리즘", "소프트웨어공학", "인공지능개론"] {
        let engine =
            MatchEngine::from_records(vec![CourseRecord::new("", original, "")], MemoryStore::default(), &Config::default())
                .unwrap();
        let variants = misspelling_variants(original).into_iter().chain(truncation_variants(original));
        for variant in variants {
            let result = engine.resolve(&variant);
            assert_eq!(result.text, original, "{variant} resolved as {result:?}");
        }
    }
}

#[test]
fn generated_variants_are_reproducible_and_include_the_original() {
    let generator = PatternGenerator::new(2024);
    let first = generator.generate("데이터베이스", 0.4);
    assert_eq!(first, generator.generate("데이터베이스", 0.4));
    assert_eq!(first.first().map(String::as_str), Some("데이터베이스"));
    assert!(first.iter().any(|v| v == "데이타베이스"));
}

#[test]
fn match_statistics_over_a_batch() {
    let stats = engine().match_statistics(["OS", "5118020", "zzz9", ""]);
    assert_eq!(stats.total_inputs, 4);
    assert_eq!(stats.exact_matches, 1);
    assert_eq!(stats.fuzzy_matches, 1);
    assert_eq!(stats.no_matches, 2);
    assert_eq!(stats.methods[&MatchMethod::EmptyInput], 1);
}
