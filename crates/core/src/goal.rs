//! Daily and weekly goals that award bonus points once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Completion, CompletionSource, SessionId, SubjectId};
use crate::scoring::ScoreResult;
use crate::time::epoch_week;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    Daily,
    Weekly,
}

/// What a goal counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "metric", content = "subject", rename_all = "snake_case")]
pub enum GoalMetric {
    QuizzesCompleted,
    LessonsCompleted,
    PerfectQuizzes,
    SubjectLessons(SubjectId),
    PointsEarned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalSpec {
    pub id: String,
    pub title: String,
    pub description: String,
    pub period: GoalPeriod,
    pub metric: GoalMetric,
    pub target: u32,
    pub reward: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalProgress {
    spec: GoalSpec,
    current: u32,
    completed: bool,
}

impl GoalProgress {
    fn new(spec: GoalSpec) -> Self {
        Self {
            spec,
            current: 0,
            completed: false,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &GoalSpec {
        &self.spec
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn reset(&mut self) {
        self.current = 0;
        self.completed = false;
    }

    /// Adds `amount`, clamped to the target. Returns true the first time the
    /// target is reached.
    fn bump(&mut self, amount: u32) -> bool {
        if self.completed || amount == 0 {
            return false;
        }
        self.current = self.current.saturating_add(amount).min(self.spec.target);
        if self.current >= self.spec.target {
            self.completed = true;
            return true;
        }
        false
    }
}

/// The facts a goal can count, extracted from one completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalEvent {
    pub quiz: bool,
    pub lesson: bool,
    pub perfect: bool,
    pub subject: Option<SubjectId>,
    pub points: u32,
}

impl GoalEvent {
    /// `subject` is the subject owning the completed lesson, if any.
    ///
    /// Goal awards themselves produce no event.
    #[must_use]
    pub fn from_completion(completion: &Completion, subject: Option<SubjectId>) -> Option<Self> {
        if matches!(completion.source, CompletionSource::Goal(_)) {
            return None;
        }
        let quiz = completion.source.is_quiz();
        Some(Self {
            quiz,
            lesson: completion.source.is_lesson(),
            perfect: quiz && completion.score.is_perfect(),
            subject: subject.filter(|_| completion.source.is_lesson()),
            points: completion.points(),
        })
    }

    fn amount_for(&self, metric: &GoalMetric) -> u32 {
        match metric {
            GoalMetric::QuizzesCompleted => u32::from(self.quiz),
            GoalMetric::LessonsCompleted => u32::from(self.lesson),
            GoalMetric::PerfectQuizzes => u32::from(self.perfect),
            GoalMetric::SubjectLessons(subject) => {
                u32::from(self.lesson && self.subject.as_ref() == Some(subject))
            }
            GoalMetric::PointsEarned => self.points,
        }
    }
}

/// A goal that just reached its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalAward {
    pub goal_id: String,
    pub title: String,
    pub points: u32,
}

impl GoalAward {
    #[must_use]
    pub fn into_completion(self, completed_at: DateTime<Utc>) -> Completion {
        Completion {
            session_id: SessionId::generate(),
            source: CompletionSource::Goal(self.goal_id),
            score: ScoreResult {
                correct_count: 0,
                total_questions: 0,
                points_awarded: self.points,
            },
            timed_out: false,
            completed_at,
        }
    }
}

/// Current goals with their period bookkeeping.
#[derive(Debug, Clone)]
pub struct GoalBoard {
    goals: Vec<GoalProgress>,
    day: NaiveDate,
    week: i64,
}

impl GoalBoard {
    #[must_use]
    pub fn new(specs: Vec<GoalSpec>, now: DateTime<Utc>) -> Self {
        Self {
            goals: specs.into_iter().map(GoalProgress::new).collect(),
            day: now.date_naive(),
            week: epoch_week(now),
        }
    }

    /// The three daily and three weekly goals of the app.
    #[must_use]
    pub fn standard(now: DateTime<Utc>) -> Self {
        Self::new(standard_goals(), now)
    }

    #[must_use]
    pub fn goals(&self) -> &[GoalProgress] {
        &self.goals
    }

    /// Reset goals whose day or week has ended.
    pub fn roll_over(&mut self, now: DateTime<Utc>) {
        let day = now.date_naive();
        let week = epoch_week(now);

        if day != self.day {
            self.reset_period(GoalPeriod::Daily);
            self.day = day;
        }
        if week != self.week {
            self.reset_period(GoalPeriod::Weekly);
            self.week = week;
        }
    }

    /// Count an event and return the goals that completed because of it.
    pub fn record(&mut self, event: &GoalEvent, now: DateTime<Utc>) -> Vec<GoalAward> {
        self.roll_over(now);

        self.goals
            .iter_mut()
            .filter_map(|goal| {
                let amount = event.amount_for(&goal.spec.metric);
                goal.bump(amount).then(|| GoalAward {
                    goal_id: goal.spec.id.clone(),
                    title: goal.spec.title.clone(),
                    points: goal.spec.reward,
                })
            })
            .collect()
    }

    /// Mark a goal as already awarded in this period, e.g. when replaying history.
    pub fn mark_awarded(&mut self, goal_id: &str) {
        if let Some(goal) = self.goals.iter_mut().find(|g| g.spec.id == goal_id) {
            goal.current = goal.spec.target;
            goal.completed = true;
        }
    }

    fn reset_period(&mut self, period: GoalPeriod) {
        self.goals
            .iter_mut()
            .filter(|g| g.spec.period == period)
            .for_each(GoalProgress::reset);
    }
}

fn standard_goals() -> Vec<GoalSpec> {
    let goal = |id: &str, title: &str, description: &str, period, metric, target, reward| GoalSpec {
        id: id.into(),
        title: title.into(),
        description: description.into(),
        period,
        metric,
        target,
        reward,
    };
    let subject = |id: &str| SubjectId::new(id).unwrap_or_else(|_| unreachable!("static id"));

    vec![
        goal(
            "daily-quiz-streak",
            "Sequência Diária",
            "Complete 3 quizzes hoje",
            GoalPeriod::Daily,
            GoalMetric::QuizzesCompleted,
            3,
            50,
        ),
        goal(
            "daily-lesson-complete",
            "Estudante Dedicado",
            "Complete 2 lições hoje",
            GoalPeriod::Daily,
            GoalMetric::LessonsCompleted,
            2,
            40,
        ),
        goal(
            "daily-perfect-score",
            "Perfeccionista",
            "Acerte 100% em um quiz hoje",
            GoalPeriod::Daily,
            GoalMetric::PerfectQuizzes,
            1,
            60,
        ),
        goal(
            "weekly-ocean-explorer",
            "Explorador dos Oceanos",
            "Complete 10 lições em Oceanografia Física",
            GoalPeriod::Weekly,
            GoalMetric::SubjectLessons(subject("fisica")),
            10,
            200,
        ),
        goal(
            "weekly-marine-biologist",
            "Biólogo Marinho",
            "Complete 8 lições em Oceanografia Biológica",
            GoalPeriod::Weekly,
            GoalMetric::SubjectLessons(subject("biologica")),
            8,
            180,
        ),
        goal(
            "weekly-knowledge-seeker",
            "Buscador de Conhecimento",
            "Acumule 500 pontos esta semana",
            GoalPeriod::Weekly,
            GoalMetric::PointsEarned,
            500,
            250,
        ),
    ]
}
