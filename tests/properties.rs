// File: tests/properties.rs
use match_core::{Config, CourseRecord, MatchEngine, MatchMethod, MemoryStore, SubjectIndex};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn hangul_name() -> impl Strategy<Value = String> {
    proptest::collection::vec(0xAC00u32..0xD7A4, 2..8)
        .prop_map(|codes| codes.into_iter().filter_map(char::from_u32).collect())
}

fn engine_over(names: &BTreeSet<String>) -> MatchEngine<MemoryStore> {
    let records = names
        .iter()
        .enumerate()
        .map(|(i, name)| CourseRecord::new(&format!("C{i}"), name, "").with_alias(&format!("{name}#")))
        .collect();
    MatchEngine::from_records(records, MemoryStore::default(), &Config::default()).unwrap()
}

proptest! {
    #[test]
    fn verbatim_names_aliases_and_codes_are_exact(names in proptest::collection::btree_set(hangul_name(), 1..12)) {
        let engine = engine_over(&names);
        for (i, name) in names.iter().enumerate() {
            for input in [name.clone(), format!("{name}#"), format!("C{i}")] {
                let result = engine.resolve(&input);
                prop_assert_eq!(&result.text, name);
                prop_assert_eq!(result.confidence, 100.0);
                prop_assert_eq!(result.method, MatchMethod::ExactMatch);
            }
        }
    }

    #[test]
    fn one_glyph_in_a_code_still_resolves(digits in proptest::collection::vec(0u8..10, 7), at in 0usize..7) {
        let code: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
        let glyph = match digits[at] {
            0 => 'O',
            1 => 'l',
            5 => 'S',
            8 => 'B',
            _ => return Ok(()),
        };
        let garbled: String = code.chars().enumerate().map(|(i, c)| if i == at { glyph } else { c }).collect();

        let engine = MatchEngine::from_records(
            vec![CourseRecord::new(&code, "오픈소스플랫폼", "")],
            MemoryStore::default(),
            &Config::default(),
        ).unwrap();
        let result = engine.resolve(&garbled);
        prop_assert_eq!(result.text.as_str(), "오픈소스플랫폼");
        prop_assert_eq!(result.method, MatchMethod::CodePattern);
        prop_assert_eq!(result.confidence, 95.0);
    }

    #[test]
    fn repeated_feedback_keeps_confidence_and_grows_frequency(rounds in 2usize..8, original in hangul_name(), corrected in hangul_name()) {
        prop_assume!(original != corrected);
        let mut engine = MatchEngine::new(SubjectIndex::default(), MemoryStore::default(), &Config::default()).unwrap();

        engine.collect_feedback(&[original.as_str()], &[corrected.as_str()], None, "p");
        let first = engine.learning().corrections().unwrap()[0].confidence;
        for round in 2..=rounds {
            engine.collect_feedback(&[original.as_str()], &[corrected.as_str()], None, "p");
            let entry = &engine.learning().corrections().unwrap()[0];
            prop_assert_eq!(entry.frequency as usize, round);
            prop_assert!((entry.confidence - first).abs() < 1e-12);
        }
    }

    #[test]
    fn approval_never_flips_entries_below_a_threshold(
        pairs in proptest::collection::vec((hangul_name(), 1usize..5), 1..6),
        min_frequency in 1u32..5,
        min_confidence in 0.0f64..1.0,
    ) {
        let mut engine = MatchEngine::new(SubjectIndex::default(), MemoryStore::default(), &Config::default()).unwrap();
        for (text, times) in &pairs {
            for _ in 0..*times {
                engine.collect_feedback(&[text.as_str()], &["운영체제"], None, "p");
            }
        }
        engine.auto_approve(min_frequency, min_confidence);
        for entry in engine.learning().corrections().unwrap() {
            if entry.auto_approved {
                prop_assert!(entry.frequency >= min_frequency);
                prop_assert!(entry.confidence >= min_confidence);
            }
        }
    }
}
