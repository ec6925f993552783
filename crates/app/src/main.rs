mod args;
mod interactive;
mod render;
mod telemetry;

use std::sync::Arc;

use args::{Args, Command, print_usage};
use interactive::LessonExit;
use services::{AppServices, Clock, MEMORY_DB};
use storage::content::{ContentRepository, StaticContent};
use tracing::info;

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Some(args) = Args::parse(std::env::args().skip(1)).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?
    else {
        print_usage();
        return Ok(());
    };

    let content: Arc<dyn ContentRepository> = match &args.content_path {
        Some(path) => Arc::new(StaticContent::from_path(path)?),
        None => Arc::new(StaticContent::bundled()?),
    };
    let clock = args.now.map_or(Clock::System, Clock::fixed);

    prepare_sqlite_dir(&args.db_url)?;
    let app = AppServices::open(
        &args.db_url,
        clock,
        args.settings.clone(),
        Arc::clone(&content),
        args.seed,
    )
    .await?;
    info!(target: "cli", db = %args.db_url, command = ?args.command, "ready");

    match args.command {
        Command::Subjects => render::subjects(content.subjects()),
        Command::Lesson(lesson_id) => {
            let quizzes = app.quizzes();
            let visit = quizzes.open_lesson(&lesson_id)?;
            let Some((subject, lesson)) = content.lesson(&lesson_id) else {
                return Err(format!("unknown lesson: {lesson_id}").into());
            };
            println!("{} · {}", subject.title(), lesson.title());
            println!("{}", lesson.description());
            println!();
            println!("{}", lesson.content());
            for point in lesson.key_points() {
                println!("  • {point}");
            }
            println!();
            if visit.has_quiz() {
                println!("Enter conclui a lição, z faz o quiz, q sai.");
            } else {
                println!("Enter conclui a lição, q sai.");
            }

            let mut input = interactive::stdin_lines();
            match interactive::choose_lesson_exit(&mut input, visit.has_quiz()).await? {
                LessonExit::Leave => {}
                LessonExit::Finish => {
                    let update = visit.finish_reading().await?;
                    println!("Lição concluída! +{} pontos", lesson.points());
                    render::update_summary(&update);
                }
                LessonExit::Quiz => {
                    let runner = visit.take_quiz()?;
                    let outcome = interactive::play_quiz(&runner, &mut input).await?;
                    render::outcome(&outcome);
                }
            }
        }
        Command::Daily => {
            let runner = app.quizzes().start_daily_quiz()?;
            let mut input = interactive::stdin_lines();
            let outcome = interactive::play_quiz(&runner, &mut input).await?;
            render::outcome(&outcome);
        }
        Command::Weekly => {
            let mut input = interactive::stdin_lines();
            interactive::work_checklist(app.challenges().as_ref(), &mut input).await?;
        }
        Command::Progress => {
            let progress = app.progress();
            let profile = progress.profile().await?;
            render::profile(&profile, &progress.ladder().status(profile.points));
            render::goals(&progress.goals().await);
        }
        Command::Ranking => render::leaderboard(&app.progress().leaderboard().await?),
        Command::History => render::history(&app.progress().history(20).await?),
    }
    Ok(())
}

/// Create the parent directory of a file-backed database.
fn prepare_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    if db_url == MEMORY_DB {
        return Ok(());
    }
    let Some(path) = db_url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
