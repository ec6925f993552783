use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use oceanos_core::model::{LessonId, QuizSettings, SettingsError};
use services::MEMORY_DB;

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingLessonId,
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidSeed { raw: String },
    InvalidQuizSeconds { raw: String },
    InvalidNow { raw: String },
    InvalidLessonId { raw: String },
    Settings(SettingsError),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingLessonId => write!(f, "lesson requires a lesson id"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidQuizSeconds { raw } => {
                write!(f, "invalid --quiz-seconds value: {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
            ArgsError::InvalidLessonId { raw } => write!(f, "invalid lesson id: {raw}"),
            ArgsError::Settings(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Subjects,
    Lesson(LessonId),
    Daily,
    Weekly,
    Progress,
    Ranking,
    History,
}

#[derive(Debug, Clone)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub content_path: Option<PathBuf>,
    pub seed: Option<u64>,
    pub now: Option<DateTime<Utc>>,
    pub settings: QuizSettings,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    /// Parse flags and the command from `args`, with `OCEANOS_*` environment
    /// variables as defaults. Returns `Ok(None)` when help was requested.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = std::env::var("OCEANOS_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://oceanos.sqlite3".into(), normalize_sqlite_url);
        let mut content_path = std::env::var("OCEANOS_CONTENT_PATH").ok().map(PathBuf::from);
        let mut seed = std::env::var("OCEANOS_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());
        let mut quiz_seconds = std::env::var("OCEANOS_QUIZ_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok());
        let mut now = None;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--content" => {
                    content_path = Some(PathBuf::from(require_value(&mut args, "--content")?));
                }
                "--seed" => {
                    let value = require_value(&mut args, "--seed")?;
                    seed = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?,
                    );
                }
                "--quiz-seconds" => {
                    let value = require_value(&mut args, "--quiz-seconds")?;
                    quiz_seconds = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidQuizSeconds { raw: value.clone() })?,
                    );
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => return Ok(None),
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let command = match positional.next().as_deref() {
            None | Some("subjects") => Command::Subjects,
            Some("lesson") => {
                let raw = positional.next().ok_or(ArgsError::MissingLessonId)?;
                let id = LessonId::new(&raw).map_err(|_| ArgsError::InvalidLessonId { raw })?;
                Command::Lesson(id)
            }
            Some("daily") => Command::Daily,
            Some("weekly") => Command::Weekly,
            Some("progress") => Command::Progress,
            Some("ranking") => Command::Ranking,
            Some("history") => Command::History,
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };
        if let Some(extra) = positional.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Some(Self {
            command,
            db_url,
            content_path,
            seed,
            now,
            settings: settings_with_duration(quiz_seconds)?,
        }))
    }
}

fn settings_with_duration(quiz_seconds: Option<u32>) -> Result<QuizSettings, ArgsError> {
    let defaults = QuizSettings::default();
    let Some(secs) = quiz_seconds else {
        return Ok(defaults);
    };
    QuizSettings::new(
        secs,
        defaults.timeout_grace_secs(),
        defaults.daily_quiz_size(),
        defaults.lesson_points_per_correct(),
        defaults.daily_points_per_correct(),
        defaults.weekly_threshold_percent(),
    )
    .map_err(ArgsError::Settings)
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  oceanos [options] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  subjects              List subjects and lessons (default)");
    eprintln!("  lesson <lesson-id>    Read a lesson, then finish it or take its quiz");
    eprintln!("  daily                 Take today's five-question quiz");
    eprintln!("  weekly                Work on this week's challenge checklist");
    eprintln!("  progress              Show points, level and goals");
    eprintln!("  ranking               Show the leaderboard");
    eprintln!("  history               Show recent completions");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <url>            SQLite URL or 'memory' (default: sqlite://oceanos.sqlite3)");
    eprintln!("  --content <path>      Content TOML file (default: bundled content)");
    eprintln!("  --seed <u64>          Seed for reproducible shuffles");
    eprintln!("  --quiz-seconds <n>    Quiz time limit (default: 300)");
    eprintln!("  --now <rfc3339>       Pin the current time");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  OCEANOS_DB_URL, OCEANOS_CONTENT_PATH, OCEANOS_SEED, OCEANOS_QUIZ_SECONDS,");
    eprintln!("  LOG_LEVEL, LOG_FORMAT=json|pretty");
}

fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == MEMORY_DB || trimmed.starts_with("sqlite://") || trimmed.starts_with("sqlite:file:")
    {
        return trimmed.to_owned();
    }

    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(|a| (*a).to_owned()))
    }

    #[test]
    fn defaults_to_subjects() {
        let args = parse(&["--db", "memory"]).unwrap().unwrap();
        assert_eq!(args.command, Command::Subjects);
        assert_eq!(args.db_url, "memory");
    }

    #[test]
    fn lesson_command_takes_an_id() {
        let args = parse(&["lesson", "ondas-formacao", "--seed", "7"])
            .unwrap()
            .unwrap();
        assert_eq!(
            args.command,
            Command::Lesson(LessonId::new("ondas-formacao").unwrap())
        );
        assert_eq!(args.seed, Some(7));
        assert!(matches!(parse(&["lesson"]), Err(ArgsError::MissingLessonId)));
    }

    #[test]
    fn quiz_seconds_are_validated() {
        let args = parse(&["daily", "--quiz-seconds", "60"]).unwrap().unwrap();
        assert_eq!(args.settings.quiz_duration_secs(), 60);
        assert!(matches!(
            parse(&["daily", "--quiz-seconds", "5"]),
            Err(ArgsError::Settings(SettingsError::InvalidQuizDuration))
        ));
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(matches!(parse(&["voar"]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&["--fast"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(
            parse(&["--db"]),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("dados/oceanos.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("dados/oceanos.sqlite3"));
    }
}
