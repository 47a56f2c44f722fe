// File: src/bin/pattern_demo.rs
// Prints generated recognition-error variants and how the matcher resolves them.
// Run with: cargo run --bin pattern_demo -- 컴퓨터구조 운영체제
use clap::Parser;
use match_core::config::GeneratorConfig;
use match_core::generator::classify_variant;
use match_core::{CourseRecord, MatchConfig, Matcher, PatternGenerator, SubjectIndex};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(name = "pattern_demo")]
struct Args {
    /// Course names to corrupt; a small built-in list when empty
    subjects: Vec<String>,

    #[clap(long, default_value_t = GeneratorConfig::default().error_rate)]
    error_rate: f64,

    #[clap(long, default_value_t = GeneratorConfig::default().seed)]
    seed: u64,

    /// Write a labelled training dataset as JSON instead of printing variants
    #[clap(long, value_name = "FILE")]
    dataset: Option<PathBuf>,
}

const DEFAULT_SUBJECTS: &[&str] = &["컴퓨터구조", "오픈소스플랫폼", "운영체제", "데이터베이스", "알고리즘", "프로그래밍언어"];

fn main() -> match_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("COURSE_MATCH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let args = Args::parse();

    let subjects: Vec<&str> = if args.subjects.is_empty() {
        DEFAULT_SUBJECTS.to_vec()
    } else {
        args.subjects.iter().map(String::as_str).collect()
    };
    let generator = PatternGenerator::new(args.seed);

    if let Some(path) = args.dataset {
        let samples = generator.training_dataset(&subjects, GeneratorConfig::default().samples_per_subject);
        match_core::persistence::write_json_atomic(&path, &samples)?;
        println!("{} samples written to {}", samples.len(), path.display());
        return Ok(());
    }

    let index = SubjectIndex::build(subjects.iter().map(|s| CourseRecord::new("", s, "")));
    let matcher = Matcher::new(MatchConfig::default())?;

    for subject in &subjects {
        let variants = generator.generate(subject, args.error_rate);
        println!("\n{subject} ({} variants)", variants.len());
        for variant in variants.iter().skip(1) {
            let result = matcher.resolve(&index, variant);
            let mark = if result.text == *subject { "ok" } else { "--" };
            println!(
                "  {mark} {variant:<16} {:<24} -> {} ({:.0}, {})",
                classify_variant(subject, variant).to_string(),
                result.text,
                result.confidence,
                result.method
            );
        }
    }
    Ok(())
}
