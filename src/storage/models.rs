//! Row records returned by the gateway and the validated inputs it writes.

use rusqlite::Row;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Student {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub subject: String,
    pub num_questions: i64,
    /// Free text; no calendar format is enforced.
    pub quiz_date: String,
}

impl Quiz {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            subject: row.get("subject")?,
            num_questions: row.get("num_questions")?,
            quiz_date: row.get("quiz_date")?,
        })
    }
}

/// One of a student's results with the quiz it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentResult {
    pub quiz_id: i64,
    pub score: i64,
    pub subject: String,
    pub quiz_date: String,
}

impl StudentResult {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            quiz_id: row.get("quiz_id")?,
            score: row.get("score")?,
            subject: row.get("subject")?,
            quiz_date: row.get("quiz_date")?,
        })
    }
}

/// Anonymous projection of a quiz result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizScore {
    pub student_id: i64,
    pub score: i64,
}

impl QuizScore {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            student_id: row.get("student_id")?,
            score: row.get("score")?,
        })
    }
}

/// Quiz result joined with the student's name. Teacher-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedQuizScore {
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub score: i64,
}

impl NamedQuizScore {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            student_id: row.get("student_id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            score: row.get("score")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuiz {
    pub subject: String,
    pub num_questions: i64,
    pub quiz_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewResult {
    pub student_id: i64,
    pub quiz_id: i64,
    pub score: i64,
}

/// What [`Gateway::record_result`](super::Gateway::record_result) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultWrite {
    Inserted(i64),
    Updated(i64),
    /// A row for the pair exists and the policy is to reject.
    Duplicate,
}

/// Ordering for student listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentOrder {
    Id,
    LastName,
}

/// Ordering for quiz listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOrder {
    Id,
    DateDesc,
}
