use std::fmt;

use chrono::{DateTime, Duration, Utc};
use oceanos_core::model::{Completion, CompletionSource, LessonId, SessionId, UserProfile};
use oceanos_core::scoring::ScoreResult;
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    name: String,
    points: u32,
    completions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidPoints { raw: String },
    InvalidCompletions { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPoints { raw } => write!(f, "invalid --points value: {raw}"),
            ArgsError::InvalidCompletions { raw } => {
                write!(f, "invalid --completions value: {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("OCEANOS_DB_URL").unwrap_or_else(|_| "sqlite://oceanos.sqlite3".into());
        let mut name = std::env::var("OCEANOS_SEED_NAME").unwrap_or_else(|_| "Estudante".into());
        let mut points = std::env::var("OCEANOS_SEED_POINTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(165);
        let mut completions = std::env::var("OCEANOS_SEED_COMPLETIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(3);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--name" => {
                    name = require_value(&mut args, "--name")?;
                }
                "--points" => {
                    let value = require_value(&mut args, "--points")?;
                    points = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidPoints { raw: value.clone() })?;
                }
                "--completions" => {
                    let value = require_value(&mut args, "--completions")?;
                    completions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidCompletions { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            name,
            points,
            completions,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://oceanos.sqlite3)");
    eprintln!("  --name <name>             Profile name (default: Estudante)");
    eprintln!("  --points <n>              Starting points (default: 165)");
    eprintln!("  --completions <n>         Daily quiz completions to append (default: 3)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!(
        "  OCEANOS_DB_URL, OCEANOS_SEED_NAME, OCEANOS_SEED_POINTS, OCEANOS_SEED_COMPLETIONS"
    );
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut profile = UserProfile {
        name: args.name.clone(),
        points: args.points,
        lessons_completed: 7,
        quizzes_completed: 12,
        ..UserProfile::default()
    };

    // One read lesson, then daily quizzes an hour apart, oldest first.
    let lesson = LessonId::new("ondas-formacao")?;
    let mut history = vec![Completion {
        session_id: SessionId::generate(),
        source: CompletionSource::LessonRead(lesson),
        score: ScoreResult {
            correct_count: 0,
            total_questions: 0,
            points_awarded: 15,
        },
        timed_out: false,
        completed_at: now - Duration::hours(i64::from(args.completions) + 1),
    }];
    for i in 0..args.completions {
        let correct = 3 + i % 3;
        history.push(Completion {
            session_id: SessionId::generate(),
            source: CompletionSource::DailyQuiz,
            score: ScoreResult {
                correct_count: correct.min(5),
                total_questions: 5,
                points_awarded: correct.min(5) * 8,
            },
            timed_out: false,
            completed_at: now - Duration::hours(i64::from(args.completions - i)),
        });
    }

    for completion in &history {
        let id = storage.progress.append_completion(completion).await?;
        profile.apply(completion);
        println!(
            "Appended {} completion id={id} points={}",
            completion.source.kind(),
            completion.points()
        );
    }

    storage.progress.save_profile(&profile).await?;
    println!(
        "Seeded profile '{}' with {} points into {}",
        profile.name, profile.points, args.db_url
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("seed failed: {err}");
        std::process::exit(1);
    }
}
