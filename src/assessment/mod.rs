pub mod progress;
pub mod prompt;
pub mod service;

pub use progress::calculate_progress;
pub use prompt::EvaluationPromptBuilder;
pub use service::AssessmentService;

use thiserror::Error;

use crate::database::DatabaseError;
use crate::openai::ScoringError;

#[derive(Error, Debug)]
pub enum AssessmentError {
    #[error("test record not found")]
    NotFound,
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Store(#[from] DatabaseError),
}

pub type Result<T> = std::result::Result<T, AssessmentError>;
