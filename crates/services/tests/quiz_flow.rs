use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use oceanos_core::model::{LessonId, QuizSettings};
use oceanos_core::quiz::Advance;
use oceanos_core::time::fixed_now;
use services::{AppServices, Clock, MEMORY_DB, QuizRunner, QuizServiceError, RunnerOutcome};
use storage::content::{ContentRepository, StaticContent};

async fn services_at(clock: Clock) -> AppServices {
    let content: Arc<dyn ContentRepository> = Arc::new(StaticContent::bundled().unwrap());
    AppServices::open(MEMORY_DB, clock, QuizSettings::default(), content, Some(42))
        .await
        .unwrap()
}

/// Answer the current question, picking the right option when `correct`.
fn answer(app: &AppServices, runner: &QuizRunner, correct: bool) {
    let view = runner.snapshot().unwrap().question.unwrap();
    let right = app
        .content()
        .question_pool()
        .into_iter()
        .find(|q| q.text() == view.text)
        .unwrap()
        .correct_option()
        .to_owned();
    let index = view
        .options
        .iter()
        .position(|o| (*o == right) == correct)
        .unwrap();
    assert!(runner.select_answer(index).unwrap());
    assert_eq!(runner.submit_answer().unwrap(), Some(correct));
}

fn completed_points(outcome: RunnerOutcome) -> (u32, bool) {
    match outcome {
        RunnerOutcome::Completed {
            score, timed_out, ..
        } => (score.points_awarded, timed_out),
        RunnerOutcome::Abandoned => panic!("quiz was abandoned"),
    }
}

#[tokio::test(start_paused = true)]
async fn lesson_quiz_awards_base_plus_correct_answers() {
    let app = services_at(Clock::fixed(fixed_now())).await;
    let lesson = LessonId::new("ondas-formacao").unwrap();
    let runner = app.quizzes().start_lesson_quiz(&lesson).unwrap();

    answer(&app, &runner, true);
    assert_eq!(runner.advance().await.unwrap(), Some(Advance::Next(1)));
    answer(&app, &runner, true);
    assert!(matches!(
        runner.advance().await.unwrap(),
        Some(Advance::Completed(_))
    ));

    assert_eq!(completed_points(runner.wait_finished().await), (25, false));
    let profile = app.progress().profile().await.unwrap();
    assert_eq!(profile.quizzes_completed, 1);
    assert_eq!(profile.lessons_completed, 1);
}

#[tokio::test(start_paused = true)]
async fn daily_quiz_scores_eight_per_correct_answer() {
    let app = services_at(Clock::fixed(fixed_now())).await;
    let runner = app.quizzes().start_daily_quiz().unwrap();
    assert_eq!(runner.snapshot().unwrap().progress.total, 5);

    for correct in [true, false, true, false, true] {
        answer(&app, &runner, correct);
        runner.advance().await.unwrap();
    }

    assert_eq!(completed_points(runner.wait_finished().await), (24, false));
    assert_eq!(app.progress().profile().await.unwrap().points, 24);
}

#[tokio::test(start_paused = true)]
async fn daily_quiz_timeout_on_third_question_keeps_earned_points() {
    let app = services_at(Clock::fixed(fixed_now())).await;
    let runner = app.quizzes().start_daily_quiz().unwrap();

    answer(&app, &runner, true);
    runner.advance().await.unwrap();
    answer(&app, &runner, true);
    runner.advance().await.unwrap();
    assert_eq!(runner.snapshot().unwrap().progress.position, 3);

    tokio::time::sleep(StdDuration::from_secs(301)).await;
    assert!(runner.snapshot().unwrap().timed_out);
    assert_eq!(app.progress().profile().await.unwrap().points, 0);

    assert_eq!(completed_points(runner.wait_finished().await), (16, true));
    assert_eq!(app.progress().profile().await.unwrap().points, 16);
    let history = app.progress().history(10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].completion.score.total_questions, 5);
}

#[tokio::test(start_paused = true)]
async fn abandoning_a_quiz_commits_nothing() {
    let app = services_at(Clock::fixed(fixed_now())).await;
    let runner = app.quizzes().start_daily_quiz().unwrap();
    answer(&app, &runner, true);

    runner.abandon().unwrap();
    tokio::time::sleep(StdDuration::from_secs(400)).await;

    assert!(matches!(runner.outcome(), Some(RunnerOutcome::Abandoned)));
    assert!(app.progress().history(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_lesson_is_rejected() {
    let app = services_at(Clock::fixed(fixed_now())).await;
    let missing = LessonId::new("nao-existe").unwrap();
    assert!(matches!(
        app.quizzes().start_lesson_quiz(&missing),
        Err(QuizServiceError::UnknownLesson(_))
    ));

    let no_quiz = LessonId::new("mares-canal-mocambique").unwrap();
    assert!(matches!(
        app.quizzes().start_lesson_quiz(&no_quiz),
        Err(QuizServiceError::NoQuiz(_))
    ));
}

#[tokio::test]
async fn reading_a_lesson_awards_its_points() {
    let app = services_at(Clock::fixed(fixed_now())).await;
    let lesson = LessonId::new("plancton-base-vida").unwrap();

    let update = app.quizzes().finish_lesson_reading(&lesson).await.unwrap();
    assert_eq!(update.points_awarded, 20);
    assert_eq!(update.profile.lessons_completed, 1);
    assert_eq!(update.profile.quizzes_completed, 0);
}

#[tokio::test(start_paused = true)]
async fn lesson_visit_taking_the_quiz_awards_the_lesson_once() {
    let app = services_at(Clock::fixed(fixed_now())).await;
    let quizzes = app.quizzes();
    let visit = quizzes
        .open_lesson(&LessonId::new("ondas-formacao").unwrap())
        .unwrap();
    assert!(visit.has_quiz());

    let runner = visit.take_quiz().unwrap();
    answer(&app, &runner, true);
    runner.advance().await.unwrap();
    answer(&app, &runner, true);
    runner.advance().await.unwrap();
    assert_eq!(completed_points(runner.wait_finished().await), (25, false));

    let profile = app.progress().profile().await.unwrap();
    assert_eq!(profile.lessons_completed, 1);
    // Quiz points plus the perfect-score goal.
    assert_eq!(profile.points, 25 + 60);

    let kinds: Vec<_> = app
        .progress()
        .history(10)
        .await
        .unwrap()
        .iter()
        .map(|r| r.completion.source.kind())
        .collect();
    assert_eq!(kinds, ["goal", "lesson_quiz"]);
}

#[tokio::test]
async fn lesson_visit_finished_by_reading_awards_base_points() {
    let app = services_at(Clock::fixed(fixed_now())).await;
    let quizzes = app.quizzes();
    let visit = quizzes
        .open_lesson(&LessonId::new("ondas-formacao").unwrap())
        .unwrap();

    let update = visit.finish_reading().await.unwrap();
    assert_eq!(update.points_awarded, 15);
    assert_eq!(update.profile.lessons_completed, 1);
    assert_eq!(update.profile.quizzes_completed, 0);
    assert!(matches!(
        quizzes.open_lesson(&LessonId::new("nao-existe").unwrap()),
        Err(QuizServiceError::UnknownLesson(_))
    ));
}

#[tokio::test]
async fn weekly_challenge_needs_eighty_percent() {
    // Three buckets after the fixed instant selects the eight-task variant.
    let app = services_at(Clock::fixed(fixed_now() + Duration::weeks(3))).await;
    let challenges = app.challenges();
    let mut list = challenges.current().unwrap();
    assert_eq!(list.challenge().id().as_str(), "correntes-agulhas");
    assert_eq!(list.total(), 8);

    for i in 0..6 {
        list.toggle(i);
    }
    assert!(challenges.submit(&mut list).await.unwrap().is_none());

    list.toggle(6);
    let update = challenges.submit(&mut list).await.unwrap().unwrap();
    assert_eq!(update.points_awarded, 87);

    assert!(challenges.submit(&mut list).await.unwrap().is_none());
    assert_eq!(app.progress().profile().await.unwrap().points, 87);
}

#[tokio::test]
async fn sqlite_backend_persists_between_openings() {
    let url = "sqlite:file:memdb_services_flow?mode=memory&cache=shared";
    let content: Arc<dyn ContentRepository> = Arc::new(StaticContent::bundled().unwrap());
    let clock = Clock::fixed(fixed_now());

    // Keep one pool open so the shared in-memory database survives.
    let first = AppServices::open(url, clock, QuizSettings::default(), Arc::clone(&content), None)
        .await
        .unwrap();
    first
        .quizzes()
        .finish_lesson_reading(&LessonId::new("ondas-formacao").unwrap())
        .await
        .unwrap();

    let second = AppServices::open(url, clock, QuizSettings::default(), content, None)
        .await
        .unwrap();
    assert_eq!(second.progress().profile().await.unwrap().points, 15);
    drop(first);
}
