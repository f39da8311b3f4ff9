use std::fmt;

use chrono::{DateTime, Duration, Utc};
use storage::repository::Storage;
use study_core::model::{ExamScope, Goal, GoalDraft, GoalId, SessionId, StudySession, UserId};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    scope: ExamScope,
    sessions: u32,
    questions: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUser { raw: String },
    InvalidScope { raw: String },
    InvalidSessions { raw: String },
    InvalidQuestions { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidScope { raw } => {
                write!(f, "invalid --provider/--exam value: {raw:?}")
            }
            ArgsError::InvalidSessions { raw } => write!(f, "invalid --sessions value: {raw}"),
            ArgsError::InvalidQuestions { raw } => {
                write!(f, "invalid --questions value (must be > 0): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
        let mut db_url = std::env::var("STUDY_DB_URL")
            .unwrap_or_else(|_| "sqlite:study.sqlite3?mode=rwc".into());
        let mut user = std::env::var("STUDY_SEED_USER").unwrap_or_else(|_| "demo-user".into());
        let mut provider = "aws".to_string();
        let mut exam = "saa".to_string();
        let mut sessions = std::env::var("STUDY_SEED_SESSIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(6);
        let mut questions = 20_u32;
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
                "--user" => user = require_value(&mut args, "--user")?,
                "--provider" => provider = require_value(&mut args, "--provider")?,
                "--exam" => exam = require_value(&mut args, "--exam")?,
                "--sessions" => {
                    let value = require_value(&mut args, "--sessions")?;
                    sessions = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidSessions { raw: value.clone() })?;
                }
                "--questions" => {
                    let value = require_value(&mut args, "--questions")?;
                    questions = value
                        .parse::<u32>()
                        .ok()
                        .filter(|q| *q > 0)
                        .ok_or_else(|| ArgsError::InvalidQuestions { raw: value.clone() })?;
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

        let user_id = UserId::new(user.clone()).map_err(|_| ArgsError::InvalidUser { raw: user })?;
        let scope = ExamScope::new(provider.clone(), exam.clone()).map_err(|_| {
            ArgsError::InvalidScope {
                raw: format!("{provider}/{exam}"),
            }
        })?;

        Ok(Self {
            db_url,
            user_id,
            scope,
            sessions,
            questions,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:study.sqlite3?mode=rwc)");
    eprintln!("  --user <id>               Owner of the seeded data (default: demo-user)");
    eprintln!("  --provider <name>         Certification provider (default: aws)");
    eprintln!("  --exam <code>             Exam code (default: saa)");
    eprintln!("  --sessions <n>            Completed study sessions to insert (default: 6)");
    eprintln!("  --questions <n>           Questions per session (default: 20)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STUDY_DB_URL, STUDY_SEED_USER, STUDY_SEED_SESSIONS");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    // Accuracy climbs from 50% upwards so the goal has visible progress.
    for i in 0..args.sessions {
        let days_ago = i64::from(args.sessions - i) * 2;
        let started_at = now - Duration::days(days_ago);
        let mut session = StudySession::start(
            SessionId::generate(),
            args.user_id.clone(),
            args.scope.clone(),
            args.questions,
            started_at,
        )?;
        let correct = (args.questions / 2 + i).min(args.questions);
        for q in 0..args.questions {
            session.record_answer(q < correct)?;
        }
        session.complete(started_at + Duration::minutes(25))?;
        storage.sessions.insert_session(&session).await?;
    }

    let target_date = (now + Duration::days(45)).date_naive();
    let goal = Goal::new(
        GoalId::generate(),
        args.user_id.clone(),
        GoalDraft {
            title: format!("Pass {}", args.scope),
            description: Some("Seeded demo goal".into()),
            provider: args.scope.provider().to_owned(),
            exam: args.scope.exam().to_owned(),
            target_score: 80,
            target_date,
        },
        now,
    )?;
    storage.goals.create_goal(&goal).await?;

    println!(
        "Seeded {} sessions and goal {} for {} ({}) into {}",
        args.sessions,
        goal.id(),
        args.user_id,
        args.scope,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
