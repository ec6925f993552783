//! Stdin-driven quiz and checklist loops.

use std::time::Duration;

use oceanos_core::quiz::{Advance, QuizPhase};
use services::{ChallengeService, QuizRunner, RunnerOutcome, wait_outcome};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::render;

pub type Input = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> Input {
    BufReader::new(tokio::io::stdin()).lines()
}

/// How the learner leaves a lesson: each visit records at most one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonExit {
    Finish,
    Quiz,
    Leave,
}

impl LessonExit {
    /// `None` for input that is not an exit offered for this lesson.
    pub fn parse(line: &str, has_quiz: bool) -> Option<Self> {
        match line.trim() {
            "" => Some(Self::Finish),
            z if z.eq_ignore_ascii_case("z") && has_quiz => Some(Self::Quiz),
            q if q.eq_ignore_ascii_case("q") => Some(Self::Leave),
            _ => None,
        }
    }
}

/// Read lines until one names a lesson exit. End of input leaves.
///
/// # Errors
///
/// Returns an error if stdin fails.
pub async fn choose_lesson_exit(
    input: &mut Input,
    has_quiz: bool,
) -> Result<LessonExit, Box<dyn std::error::Error>> {
    while let Some(line) = input.next_line().await? {
        if let Some(exit) = LessonExit::parse(&line, has_quiz) {
            return Ok(exit);
        }
        println!("Opção inválida.");
    }
    Ok(LessonExit::Leave)
}

/// Run a quiz until it completes or the learner leaves with `q`.
///
/// # Errors
///
/// Returns an error if stdin fails or the session lock is poisoned.
pub async fn play_quiz(
    runner: &QuizRunner,
    input: &mut Input,
) -> Result<RunnerOutcome, Box<dyn std::error::Error>> {
    println!("Responda com a letra da opção. Enter avança, q sai.");
    render::question(&runner.snapshot()?);

    let finished = wait_outcome(runner.subscribe());
    tokio::pin!(finished);

    let mut ticks = tokio::time::interval(Duration::from_secs(1));
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut announced_timeout = false;
    let mut input_open = true;

    loop {
        tokio::select! {
            biased;

            outcome = &mut finished => return Ok(outcome),

            _ = ticks.tick() => {
                let snapshot = runner.snapshot()?;
                if snapshot.timed_out && !announced_timeout {
                    announced_timeout = true;
                    println!();
                    println!("Tempo esgotado!");
                    render::reveal(&snapshot);
                }
            }

            line = input.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    runner.abandon()?;
                    continue;
                };
                handle_line(runner, line.trim()).await?;
            }
        }
    }
}

async fn handle_line(runner: &QuizRunner, line: &str) -> Result<(), Box<dyn std::error::Error>> {
    if line.eq_ignore_ascii_case("q") {
        runner.abandon()?;
        return Ok(());
    }

    let snapshot = runner.snapshot()?;
    match snapshot.phase {
        QuizPhase::Presenting => {
            let Some(index) = render::letter_index(line) else {
                println!("Escolha uma das letras apresentadas.");
                return Ok(());
            };
            if !runner.select_answer(index)? {
                println!("Opção inválida.");
                return Ok(());
            }
            match runner.submit_answer()? {
                Some(true) => println!("Correto!"),
                Some(false) => println!("Incorreto."),
                None => return Ok(()),
            }
            render::reveal(&runner.snapshot()?);
            println!("(Enter para continuar)");
        }
        QuizPhase::Answered => {
            if let Some(Advance::Next(index)) = runner.advance().await? {
                debug!(target: "cli", index, "next question");
                render::question(&runner.snapshot()?);
            }
        }
        QuizPhase::TimedOut { .. } | QuizPhase::Completed => {}
    }
    Ok(())
}

/// Toggle tasks by number; `s` submits, `q` leaves.
///
/// # Errors
///
/// Returns an error if stdin fails or the completion cannot be recorded.
pub async fn work_checklist(
    challenges: &ChallengeService,
    input: &mut Input,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut list = challenges.current()?;
    render::checklist(&list);
    println!("Número alterna uma tarefa, s submete, q sai.");

    while let Some(line) = input.next_line().await? {
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            break;
        }
        if line.eq_ignore_ascii_case("s") {
            match challenges.submit(&mut list).await? {
                Some(update) => {
                    println!("Desafio submetido! +{} pontos", list.points());
                    render::update_summary(&update);
                    break;
                }
                None => println!("Ainda faltam tarefas para atingir o mínimo de submissão."),
            }
            continue;
        }
        let toggled = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| list.toggle(i));
        if toggled.is_none() {
            println!("Tarefa inválida.");
            continue;
        }
        render::checklist(&list);
    }
    Ok(())
}
