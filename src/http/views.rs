//! View models handed to the client.
//!
//! Every page carries the flash notices drained from the session. Form pages
//! carry a nullable `error` and never echo submitted values back.

use serde::Serialize;

use crate::session::Flash;
use crate::storage::{NamedQuizScore, Quiz, QuizScore, Student, StudentResult};

#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub error: Option<String>,
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub students: Vec<Student>,
    pub quizzes: Vec<Quiz>,
    pub flashes: Vec<Flash>,
}

/// Add-student and add-quiz forms.
#[derive(Debug, Serialize)]
pub struct FormPage {
    pub error: Option<String>,
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct AddResultPage {
    /// By last name.
    pub students: Vec<Student>,
    /// Newest first.
    pub quizzes: Vec<Quiz>,
    pub error: Option<String>,
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct StudentResultsPage {
    pub student_id: i64,
    pub student: Student,
    pub results: Vec<StudentResult>,
    pub flashes: Vec<Flash>,
}

/// Rows of the quiz results page. Names only appear for the teacher.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum QuizResults {
    Anonymous(Vec<QuizScore>),
    Named(Vec<NamedQuizScore>),
}

impl QuizResults {
    pub fn len(&self) -> usize {
        match self {
            QuizResults::Anonymous(rows) => rows.len(),
            QuizResults::Named(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Serialize)]
pub struct QuizResultsPage {
    pub quiz: Quiz,
    pub is_teacher: bool,
    pub results: QuizResults,
    pub flashes: Vec<Flash>,
}

#[derive(Debug, Serialize)]
pub struct ErrorPage {
    pub error: String,
    pub flashes: Vec<Flash>,
}
