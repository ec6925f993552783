#![forbid(unsafe_code)]

pub mod app_services;
pub mod challenge_service;
pub mod error;
pub mod progress_service;
pub mod quiz_service;
pub mod runner;
pub mod timer;

pub use oceanos_core::Clock;

pub use app_services::{AppServices, MEMORY_DB};
pub use challenge_service::ChallengeService;
pub use error::{AppServicesError, ProgressError, QuizServiceError};
pub use progress_service::{CURRENT_USER_ID, ProgressService, ProgressSink, ProgressUpdate};
pub use quiz_service::{LessonVisit, QuizService};
pub use runner::{QuestionView, QuizRunner, QuizSnapshot, RunnerOutcome, wait_outcome};
pub use timer::SessionTimer;
