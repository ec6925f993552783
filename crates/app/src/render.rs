//! Plain-text rendering for the terminal.

use oceanos_core::goal::{GoalPeriod, GoalProgress};
use oceanos_core::model::{LevelStatus, Subject, UserProfile};
use oceanos_core::ranking::{Leaderboard, Podium, RankingEntry};
use oceanos_core::weekly::ChallengeTaskList;
use services::{ProgressUpdate, QuizSnapshot, RunnerOutcome};
use storage::repository::CompletionRow;

pub fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .and_then(|i| b'a'.checked_add(i))
        .map_or('?', char::from)
}

pub fn letter_index(input: &str) -> Option<usize> {
    let mut chars = input.trim().chars();
    let c = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some() || !c.is_ascii_lowercase() {
        return None;
    }
    Some(usize::from(c as u8 - b'a'))
}

pub fn subjects(subjects: &[Subject]) {
    for subject in subjects {
        println!("{} ({})", subject.title(), subject.id());
        for lesson in subject.lessons() {
            let quiz = if lesson.quiz().is_some() { " [quiz]" } else { "" };
            println!(
                "  - {:<28} {:>3} pts  {} min{quiz}",
                lesson.id().as_str(),
                lesson.points(),
                lesson.duration_minutes()
            );
        }
    }
}

pub fn question(snapshot: &QuizSnapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };
    println!();
    println!(
        "Pergunta {}/{}  ({}s)",
        snapshot.progress.position, snapshot.progress.total, snapshot.remaining_seconds
    );
    println!("{}", question.text);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {option}", option_letter(i));
    }
}

pub fn reveal(snapshot: &QuizSnapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };
    if let Some(correct) = question.correct_index {
        let text = question
            .options
            .get(correct)
            .map_or("", String::as_str);
        println!("Resposta correta: {}) {text}", option_letter(correct));
    }
    if let Some(explanation) = question.explanation.as_deref().filter(|e| !e.is_empty()) {
        println!("{explanation}");
    }
}

pub fn outcome(outcome: &RunnerOutcome) {
    match outcome {
        RunnerOutcome::Abandoned => println!("Quiz abandonado. Nenhum ponto registado."),
        RunnerOutcome::Completed {
            score,
            timed_out,
            progress,
        } => {
            println!();
            if *timed_out {
                println!("Tempo esgotado.");
            }
            println!(
                "Resultado: {}/{} corretas ({}%), +{} pontos",
                score.correct_count,
                score.total_questions,
                score.percentage(),
                score.points_awarded
            );
            match progress {
                Ok(update) => update_summary(update),
                Err(err) => println!("Não foi possível guardar o progresso: {err}"),
            }
        }
    }
}

pub fn update_summary(update: &ProgressUpdate) {
    for award in &update.goal_awards {
        println!("Meta concluída: {} (+{} pontos)", award.title, award.points);
    }
    if update.leveled_up {
        println!("Subiu para o nível {}: {}", update.level.number, update.level.label);
    }
    println!("Total: {} pontos", update.profile.points);
}

pub fn profile(profile: &UserProfile, level: &LevelStatus) {
    println!("{} · {} · {}", profile.name, profile.university, profile.course);
    println!("Nível {}: {}", level.number, level.label);
    match (&level.next_label, level.points_to_next) {
        (Some(next), Some(missing)) => {
            println!("{} pontos ({missing} para {next})", profile.points);
        }
        _ => println!("{} pontos (nível máximo)", profile.points),
    }
    println!(
        "Lições concluídas: {}  Quizzes concluídos: {}",
        profile.lessons_completed, profile.quizzes_completed
    );
}

pub fn goals(goals: &[GoalProgress]) {
    let sections = [
        (GoalPeriod::Daily, "Metas de hoje"),
        (GoalPeriod::Weekly, "Metas da semana"),
    ];
    for (period, heading) in sections {
        println!();
        println!("{heading}");
        for goal in goals.iter().filter(|g| g.spec().period == period) {
            let mark = if goal.is_completed() { 'x' } else { ' ' };
            println!(
                "  [{mark}] {:<26} {:>3}/{:<3} +{} pts",
                goal.spec().title,
                goal.current(),
                goal.spec().target,
                goal.spec().reward
            );
        }
    }
}

fn ranking_line(rank: usize, entry: &RankingEntry) {
    let medal = Podium::for_rank(rank).map_or("", Podium::label);
    println!(
        "{rank:>3}. {:<20} {:>5} pts  nível {}  {medal}",
        entry.name, entry.points, entry.level
    );
}

pub fn leaderboard(board: &Leaderboard) {
    for (rank, entry) in board.ranked().take(board.top_three().len()) {
        ranking_line(rank, entry);
    }
    if board.show_current_separately() {
        if let (Some(rank), Some(entry)) = (board.current_rank(), board.current_entry()) {
            println!("  ...");
            ranking_line(rank, entry);
        }
    }
    println!("{} participantes", board.entries().len());
}

pub fn history(rows: &[CompletionRow]) {
    if rows.is_empty() {
        println!("Ainda sem atividade.");
        return;
    }
    for row in rows {
        let c = &row.completion;
        let detail = if c.score.total_questions > 0 {
            format!("{}/{}", c.score.correct_count, c.score.total_questions)
        } else {
            String::new()
        };
        println!(
            "{}  {:<16} {:<26} {:>5} +{}{}",
            c.completed_at.format("%Y-%m-%d %H:%M"),
            c.source.kind(),
            c.source.source_id().unwrap_or("-"),
            detail,
            c.points(),
            if c.timed_out { "  (tempo esgotado)" } else { "" }
        );
    }
}

pub fn checklist(list: &ChallengeTaskList) {
    let challenge = list.challenge();
    println!();
    println!(
        "{} [{}] · {} pontos · {}",
        challenge.title(),
        challenge.difficulty().label(),
        challenge.points(),
        challenge.category()
    );
    for (i, (task, done)) in challenge.tasks().iter().zip(list.done_flags()).enumerate() {
        let mark = if *done { 'x' } else { ' ' };
        println!("  {:>2}. [{mark}] {task}", i + 1);
    }
    println!(
        "{}/{} tarefas ({:.0}%), valor atual {} pontos",
        list.done_count(),
        list.total(),
        list.ratio() * 100.0,
        list.points()
    );
}
