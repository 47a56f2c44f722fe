// File: src/bin/main.rs
use clap::Parser;
use crossterm::style::Stylize;
use crossterm::{cursor, execute, terminal};
use match_core::learning::report::LearningReport;
use match_core::persistence::INDEX_CACHE_FILE;
use match_core::{Config, JsonFileStore, MatchContext, MatchEngine, MatchResult};
use std::io::{stdin, stdout, BufRead, Write};
use std::path::PathBuf;
use std::sync::Once;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

#[derive(Parser, Debug)]
#[clap(name = "course_match")]
#[clap(about = "Resolve noisy course names against the catalog and learn from corrections")]
struct Args {
    /// TOML configuration file
    #[clap(long, default_value = "course_match.toml")]
    config: PathBuf,

    /// JSON catalog (array of course rows)
    #[clap(long, default_value = "catalog.json")]
    catalog: PathBuf,

    /// Directory for corrections, feedback and the index cache; overrides the config
    #[clap(long, env = "COURSE_MATCH_DATA")]
    data_dir: Option<PathBuf>,

    /// Clear the screen between prompts
    #[clap(long)]
    clear: bool,
}

fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("COURSE_MATCH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn main() -> match_core::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::load(&args.config)?;
    let data_dir = args
        .data_dir
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from("data"));
    let cache = data_dir.join(INDEX_CACHE_FILE);

    let mut engine =
        MatchEngine::from_cache_or_catalog(&cache, &args.catalog, JsonFileStore::new(&data_dir), &config)?;
    let stats = engine.stats();
    info!(courses = stats.courses, aliases = stats.aliases, data_dir = %data_dir.display(), "engine ready");

    println!("Course name matcher. Type ':help' for commands, 'exit' to quit.");
    println!("---------------------------------------------------------------");

    let mut professor: Option<String> = None;
    let mut last: Option<(String, MatchResult)> = None;
    let mut lines = stdin().lock().lines();

    loop {
        prompt(args.clear, professor.as_deref())?;
        let Some(line) = lines.next() else { break };
        let input = line?;
        let cmd = input.trim();

        match cmd {
            "exit" | ":q" => break,
            "" => {}
            ":help" => print_help(),
            ":stats" => {
                let s = engine.stats();
                println!("courses {}  codes {}  aliases {}  professors {}", s.courses, s.codes, s.aliases, s.professors);
            }
            ":approve" => {
                let cfg = engine.learning().config().clone();
                let approved = engine.auto_approve(cfg.min_frequency, cfg.min_confidence);
                println!("{} correction(s) approved", approved.to_string().green());
            }
            ":daily" => {
                let summary = engine.daily_routine();
                println!("approved {}  pruned {}", summary.approved, summary.pruned);
                print_report(&summary.report);
            }
            s if s.starts_with(":report") => {
                let days = s[":report".len()..].trim().parse().unwrap_or(7);
                print_report(&engine.generate_report(days));
            }
            s if s.starts_with(":prof") => {
                let name = s[":prof".len()..].trim();
                professor = (!name.is_empty()).then(|| name.to_string());
            }
            s if s.starts_with(":export") => {
                let dir = s[":export".len()..].trim();
                let dir = if dir.is_empty() { data_dir.join("training_data") } else { PathBuf::from(dir) };
                match engine.learning().export_training_data(&dir) {
                    Ok(paths) => paths.iter().for_each(|p| println!("wrote {}", p.display())),
                    Err(e) => error!(error = %e, "export failed"),
                }
            }
            s if s.starts_with(":fix") => {
                let correction = s[":fix".len()..].trim();
                match (&last, correction.is_empty()) {
                    (Some((original, _)), false) => {
                        let recorded = engine.collect_feedback(&[original.as_str()], &[correction], None, "repl");
                        println!("{} feedback record(s) stored", recorded);
                    }
                    _ => println!("{}", "usage: ':fix <correct name>' after a lookup".yellow()),
                }
            }
            text => {
                let context = professor.as_deref().map(MatchContext::with_professor);
                let threshold = engine.matcher().config().default_threshold;
                let result = engine.find_best_match(text, context.as_ref(), threshold);
                print_result(&result);
                last = Some((text.to_string(), result));
            }
        }
    }

    if let Err(e) = engine.save_index_cache(&cache) {
        error!(path = %cache.display(), error = %e, "could not save index cache");
    }
    Ok(())
}

fn prompt(clear: bool, professor: Option<&str>) -> std::io::Result<()> {
    let mut out = stdout();
    if clear {
        execute!(out, terminal::Clear(terminal::ClearType::All), cursor::MoveTo(0, 0))?;
    }
    match professor {
        Some(p) => print!("\n[{}] > ", p.cyan()),
        None => print!("\n> "),
    }
    out.flush()
}

fn print_help() {
    println!("  <text>            resolve a recognized course name");
    println!("  :prof <name>      use a professor as row context (empty clears it)");
    println!("  :fix <name>       record the correct name for the last lookup");
    println!("  :approve          approve corrections over the configured thresholds");
    println!("  :report [days]    learning report");
    println!("  :daily            run the daily routine");
    println!("  :export [dir]     export training data");
    println!("  :stats            index statistics");
}

fn print_result(result: &MatchResult) {
    let confidence = format!("{:.0}", result.confidence);
    let confidence = match result.confidence {
        c if c >= 90.0 => confidence.green(),
        c if c >= 70.0 => confidence.yellow(),
        _ => confidence.red(),
    };
    println!("{} ({}, {})", result.text.as_str().bold(), confidence, result.method);
}

fn print_report(report: &LearningReport) {
    println!("last {} day(s): {} feedback", report.period_days, report.total_feedback);
    println!(
        "corrections: {} total, {} approved, {} pending, mean confidence {:.2}",
        report.total_corrections, report.auto_approved_corrections, report.pending_corrections, report.average_confidence
    );
    for (kind, count) in &report.error_type_distribution {
        println!("  {kind}: {count}");
    }
    if !report.most_common_corrections.is_empty() {
        println!("most common:");
        for c in &report.most_common_corrections {
            println!("  {} -> {} (x{})", c.ocr_result, c.correct_result, c.frequency);
        }
    }
}
