// File: src/generator.rs
//! Synthesizes recognition-error variants of known course names, for test
//! corpora, simulated feedback and labelled training samples.

use crate::config::GeneratorConfig;
use crate::fuzzy::char_set_overlap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

type Confusions = &'static [(&'static str, &'static [&'static str])];

const JAMO_CONFUSIONS: Confusions = &[
    ("ㅣ", &["|", "l", "1", "I"]),
    ("ㅇ", &["o", "O", "0"]),
    ("ㅡ", &["-", "_", "―"]),
    ("ㄱ", &["r", "ㄴ"]),
    ("ㄴ", &["ㄱ", "L"]),
    ("ㄹ", &["ㄴ", "ㅏ"]),
    ("ㅏ", &["ㅓ", "ㅑ"]),
    ("ㅓ", &["ㅏ", "ㅕ"]),
    ("ㅗ", &["ㅜ", "ㅛ"]),
    ("ㅜ", &["ㅗ", "ㅠ"]),
];

/// Latin letter → Hangul jamo it is mistaken for (and back).
const LATIN_HANGUL_CONFUSIONS: Confusions = &[
    ("a", &["ㅏ", "ㅑ"]),
    ("o", &["ㅇ", "ㅗ"]),
    ("i", &["ㅣ", "ㅏ"]),
    ("u", &["ㅜ", "ㅠ"]),
    ("e", &["ㅓ", "ㅔ"]),
    ("l", &["ㅣ", "|"]),
    ("r", &["ㄱ", "ㄴ"]),
    ("n", &["ㄴ", "ㅏ"]),
    ("s", &["ㅅ", "ㅆ"]),
    ("t", &["ㅌ", "ㅜ"]),
];

const SIMILAR_SYLLABLES: Confusions = &[
    ("가", &["까", "나", "다"]),
    ("나", &["다", "라", "마"]),
    ("다", &["라", "마", "바"]),
    ("라", &["마", "바", "사"]),
    ("마", &["바", "사", "아"]),
    ("바", &["사", "아", "자"]),
    ("사", &["아", "자", "차"]),
    ("아", &["자", "차", "카"]),
    ("자", &["차", "카", "타"]),
    ("차", &["카", "타", "파"]),
    ("구", &["부", "수", "누"]),
    ("조", &["초", "소", "도"]),
    ("설", &["절", "털"]),
    ("계", &["게", "개", "께"]),
];

const KNOWN_MISSPELLINGS: Confusions = &[
    ("컴퓨터", &["컴퓨타"]),
    ("프로그래밍", &["프로그리밍", "프로그램밍"]),
    ("데이터베이스", &["데이타베이스", "데이터배이스"]),
    ("운영체제", &["운영체계", "운영체재", "운영체체"]),
    ("알고리즘", &["알고리듬", "알고이듬"]),
    ("네트워크", &["넷워크"]),
    ("소프트웨어", &["소프트웨아"]),
    ("인공지능", &["인공지릉", "인공지뇽"]),
    ("시스템", &["시스탬", "시스뎀"]),
    ("구조", &["구초", "구죠"]),
    ("설계", &["설게", "절계"]),
    ("분석", &["분서", "분설"]),
    ("개론", &["개룬", "개른"]),
    ("공학", &["공악", "공확"]),
    ("이론", &["이룬", "이른"]),
];

/// Rough label for how a variant differs from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Original,
    Truncation,
    Insertion,
    EngKorConfusion,
    SpaceRemoval,
    SpaceInsertion,
    JamoConfusion,
    CharacterSubstitution,
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VariantKind::Original => "original",
            VariantKind::Truncation => "truncation",
            VariantKind::Insertion => "insertion",
            VariantKind::EngKorConfusion => "eng_kor_confusion",
            VariantKind::SpaceRemoval => "space_removal",
            VariantKind::SpaceInsertion => "space_insertion",
            VariantKind::JamoConfusion => "jamo_confusion",
            VariantKind::CharacterSubstitution => "character_substitution",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSample {
    pub original: String,
    pub corrupted: String,
    pub kind: VariantKind,
    /// Character-set overlap with the original, 0.0..=1.0.
    pub similarity: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PatternGenerator {
    seed: u64,
}

impl PatternGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(config.seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// All variants of `text`, the original first, duplicates removed in
    /// first-seen order. Same seed, same text, same rate → same output.
    pub fn generate(&self, text: &str, error_rate: f64) -> Vec<String> {
        let rate = error_rate.clamp(0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut variants = vec![text.to_string()];
        variants.extend(jamo_variants(text, rate, &mut rng));
        variants.extend(latin_hangul_variants(text, rate, &mut rng));
        variants.extend(similar_syllable_variants(text, rate, &mut rng));
        variants.extend(misspelling_variants(text));
        variants.extend(spacing_variants(text));
        variants.extend(truncation_variants(text));

        let mut seen = HashSet::new();
        variants.retain(|v| !v.is_empty() && seen.insert(v.clone()));
        debug!(text = %text, count = variants.len(), "variants generated");
        variants
    }

    /// Up to `samples_per_subject` labelled variants per subject, the
    /// original included as the first sample.
    pub fn training_dataset(&self, subjects: &[&str], samples_per_subject: usize) -> Vec<TrainingSample> {
        let samples: Vec<TrainingSample> = subjects
            .iter()
            .flat_map(|subject| {
                self.generate(subject, 0.4)
                    .into_iter()
                    .take(samples_per_subject)
                    .map(move |corrupted| TrainingSample {
                        kind: classify_variant(subject, &corrupted),
                        similarity: char_set_overlap(subject, &corrupted),
                        original: subject.to_string(),
                        corrupted,
                    })
            })
            .collect();
        info!(subjects = subjects.len(), samples = samples.len(), "training dataset generated");
        samples
    }
}

impl Default for PatternGenerator {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

fn jamo_variants(text: &str, rate: f64, rng: &mut StdRng) -> Vec<String> {
    let passes = (text.chars().count() as f64 * rate) as usize + 1;
    let mut out = Vec::new();
    for _ in 0..passes {
        let mut modified = text.to_string();
        for (jamo, confusions) in JAMO_CONFUSIONS {
            if modified.contains(jamo) && rng.gen::<f64>() < rate {
                if let Some(replacement) = confusions.choose(rng) {
                    modified = modified.replacen(jamo, replacement, 1);
                }
            }
        }
        if modified != text {
            out.push(modified);
        }
    }
    out
}

fn latin_hangul_variants(text: &str, rate: f64, rng: &mut StdRng) -> Vec<String> {
    let mut out = Vec::new();

    let mut to_latin = text.to_string();
    for (latin, jamos) in LATIN_HANGUL_CONFUSIONS {
        for jamo in jamos.iter() {
            if to_latin.contains(jamo) && rng.gen::<f64>() < rate {
                to_latin = to_latin.replacen(jamo, latin, 1);
            }
        }
    }
    if to_latin != text {
        out.push(to_latin);
    }

    let mut to_hangul = text.to_string();
    for (latin, jamos) in LATIN_HANGUL_CONFUSIONS {
        if to_hangul.contains(latin) && rng.gen::<f64>() < rate {
            if let Some(replacement) = jamos.choose(rng) {
                to_hangul = to_hangul.replacen(latin, replacement, 1);
            }
        }
    }
    if to_hangul != text {
        out.push(to_hangul);
    }
    out
}

fn similar_syllable_variants(text: &str, rate: f64, rng: &mut StdRng) -> Vec<String> {
    let mut out = Vec::new();
    for (syllable, similar) in SIMILAR_SYLLABLES {
        if text.contains(syllable) && rng.gen::<f64>() < rate {
            out.extend(similar.iter().take(2).map(|s| text.replacen(syllable, s, 1)));
        }
    }
    out
}

/// Every known academic misspelling that applies to `text`.
pub fn misspelling_variants(text: &str) -> Vec<String> {
    KNOWN_MISSPELLINGS
        .iter()
        .filter(|(word, _)| text.contains(word))
        .flat_map(|(word, variants)| variants.iter().map(move |v| text.replace(word, v)))
        .collect()
}

fn spacing_variants(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = vec![text.replace(' ', "")];

    if chars.len() > 2 {
        let mid = chars.len() / 2;
        let (head, tail) = chars.split_at(mid);
        out.push(format!("{} {}", head.iter().collect::<String>(), tail.iter().collect::<String>()));
    }

    let punctuated = text.replace('-', "_").replace('(', "[").replace(')', "]");
    if punctuated != text {
        out.push(punctuated);
    }
    out
}

/// Leading, trailing and middle slices, as a partially read cell produces.
pub fn truncation_variants(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    if n <= 3 {
        return Vec::new();
    }
    let slice = |from: usize, to: usize| chars[from..to].iter().collect::<String>();

    let mut out = vec![slice(1, n), slice(2, n), slice(0, n - 1), slice(0, n - 2)];
    if n > 5 {
        out.push(slice(n / 4, n * 3 / 4));
    }
    out
}

pub fn classify_variant(original: &str, corrupted: &str) -> VariantKind {
    if original == corrupted {
        return VariantKind::Original;
    }
    let (before, after) = (original.chars().count(), corrupted.chars().count());
    if after < before {
        return VariantKind::Truncation;
    }
    if after > before {
        return VariantKind::Insertion;
    }

    let has_latin = |s: &str| s.chars().any(|c| c.is_ascii_alphabetic());
    if has_latin(corrupted) && !has_latin(original) {
        return VariantKind::EngKorConfusion;
    }
    match (original.contains(' '), corrupted.contains(' ')) {
        (true, false) => return VariantKind::SpaceRemoval,
        (false, true) => return VariantKind::SpaceInsertion,
        _ => {}
    }
    if JAMO_CONFUSIONS
        .iter()
        .any(|(jamo, _)| original.contains(jamo) && !corrupted.contains(jamo))
    {
        return VariantKind::JamoConfusion;
    }
    VariantKind::CharacterSubstitution
}
