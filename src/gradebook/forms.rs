//! Submitted forms and their validation.
//!
//! Fields deserialize as plain strings with empty defaults so a missing field
//! becomes a validation message instead of an extractor rejection.

use serde::Deserialize;
use thiserror::Error;

use crate::storage::{NewQuiz, NewResult, NewStudent};

/// A user-facing validation failure. The Display text is shown on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("First name is required")]
    FirstNameRequired,
    #[error("Last name is required")]
    LastNameRequired,

    #[error("Subject is required")]
    SubjectRequired,
    #[error("Number of questions is required")]
    QuestionCountRequired,
    #[error("Number of questions must be a valid number")]
    QuestionCountNotNumeric,
    #[error("Number of questions must be greater than zero")]
    QuestionCountNotPositive,
    #[error("Quiz date is required")]
    QuizDateRequired,

    #[error("Student selection is required")]
    StudentRequired,
    #[error("Quiz selection is required")]
    QuizRequired,
    #[error("Selected student does not exist")]
    UnknownStudent,
    #[error("Selected quiz does not exist")]
    UnknownQuiz,
    #[error("Score is required")]
    ScoreRequired,
    #[error("Score must be a valid number")]
    ScoreNotNumeric,
    #[error("Score must be between 0 and 100")]
    ScoreOutOfRange,
    #[error("A result for this student and quiz already exists")]
    DuplicateResult,
}

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100;

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StudentForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl StudentForm {
    pub fn validate(&self) -> Result<NewStudent, FormError> {
        let first_name = required(&self.first_name, FormError::FirstNameRequired)?;
        let last_name = required(&self.last_name, FormError::LastNameRequired)?;
        Ok(NewStudent {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct QuizForm {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub num_questions: String,
    #[serde(default)]
    pub quiz_date: String,
}

impl QuizForm {
    pub fn validate(&self) -> Result<NewQuiz, FormError> {
        let subject = required(&self.subject, FormError::SubjectRequired)?;
        let num_questions = required(&self.num_questions, FormError::QuestionCountRequired)?
            .parse::<i64>()
            .map_err(|_| FormError::QuestionCountNotNumeric)?;
        if num_questions <= 0 {
            return Err(FormError::QuestionCountNotPositive);
        }
        let quiz_date = required(&self.quiz_date, FormError::QuizDateRequired)?;

        Ok(NewQuiz {
            subject: subject.to_string(),
            num_questions,
            quiz_date: quiz_date.to_string(),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ResultForm {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub quiz_id: String,
    #[serde(default)]
    pub score: String,
}

impl ResultForm {
    /// Field-level checks only; existence and duplicates need the database.
    pub fn validate(&self) -> Result<NewResult, FormError> {
        let student_id = required(&self.student_id, FormError::StudentRequired)?
            .parse::<i64>()
            .map_err(|_| FormError::UnknownStudent)?;
        let quiz_id = required(&self.quiz_id, FormError::QuizRequired)?
            .parse::<i64>()
            .map_err(|_| FormError::UnknownQuiz)?;
        let score = required(&self.score, FormError::ScoreRequired)?
            .parse::<i64>()
            .map_err(|_| FormError::ScoreNotNumeric)?;
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(FormError::ScoreOutOfRange);
        }

        Ok(NewResult {
            student_id,
            quiz_id,
            score,
        })
    }
}

fn required(value: &str, missing: FormError) -> Result<&str, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(missing)
    } else {
        Ok(value)
    }
}
