//! Request-scoped persistence gateway.
//!
//! # Invariants
//! - A connection is taken from the pool on the first query, not before.
//! - The connection goes back to the pool when the gateway is dropped.
//! - Every statement is parameterized.
//! - Each write runs in its own committed transaction.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::models::{
    NamedQuizScore, NewQuiz, NewResult, NewStudent, Quiz, QuizOrder, QuizScore, ResultWrite,
    Student, StudentOrder, StudentResult,
};
use super::pool::{DbPool, SqliteConnection};
use super::StorageResult;
use crate::config::DuplicateResultPolicy;

pub struct Gateway {
    pool: DbPool,
    conn: Option<SqliteConnection>,
}

impl Gateway {
    pub(crate) fn new(pool: DbPool) -> Self {
        Self { pool, conn: None }
    }

    /// Whether a connection has been taken from the pool yet.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&mut self) -> StorageResult<&mut Connection> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => {
                tracing::trace!("Acquiring database connection");
                self.pool.acquire()?
            }
        };
        let conn: &mut Connection = self.conn.insert(conn);
        Ok(conn)
    }

    pub fn list_students(&mut self, order: StudentOrder) -> StorageResult<Vec<Student>> {
        let sql = match order {
            StudentOrder::Id => "SELECT id, first_name, last_name FROM students ORDER BY id",
            StudentOrder::LastName => {
                "SELECT id, first_name, last_name FROM students ORDER BY last_name, first_name, id"
            }
        };
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], Student::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn list_quizzes(&mut self, order: QuizOrder) -> StorageResult<Vec<Quiz>> {
        let sql = match order {
            QuizOrder::Id => {
                "SELECT id, subject, num_questions, quiz_date FROM quizzes
                 ORDER BY id"
            }
            QuizOrder::DateDesc => {
                "SELECT id, subject, num_questions, quiz_date FROM quizzes
                 ORDER BY quiz_date DESC, id"
            }
        };
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], Quiz::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn find_student(&mut self, id: i64) -> StorageResult<Option<Student>> {
        let student = self
            .conn()?
            .query_row(
                "SELECT id, first_name, last_name FROM students WHERE id = ?1",
                params![id],
                Student::from_row,
            )
            .optional()?;
        Ok(student)
    }

    pub fn find_quiz(&mut self, id: i64) -> StorageResult<Option<Quiz>> {
        let quiz = self
            .conn()?
            .query_row(
                "SELECT id, subject, num_questions, quiz_date FROM quizzes WHERE id = ?1",
                params![id],
                Quiz::from_row,
            )
            .optional()?;
        Ok(quiz)
    }

    /// A student's results with quiz subject and date, newest quiz first.
    pub fn student_results(&mut self, student_id: i64) -> StorageResult<Vec<StudentResult>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.quiz_id, r.score, q.subject, q.quiz_date
             FROM results r
             JOIN quizzes q ON r.quiz_id = q.id
             WHERE r.student_id = ?1
             ORDER BY q.quiz_date DESC, r.quiz_id",
        )?;
        let rows = stmt
            .query_map(params![student_id], StudentResult::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Scores for a quiz without any student names, highest first.
    pub fn quiz_scores(&mut self, quiz_id: i64) -> StorageResult<Vec<QuizScore>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.student_id, r.score
             FROM results r
             WHERE r.quiz_id = ?1
             ORDER BY r.score DESC, r.student_id",
        )?;
        let rows = stmt
            .query_map(params![quiz_id], QuizScore::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Scores for a quiz joined with student names, highest first.
    pub fn quiz_scores_named(&mut self, quiz_id: i64) -> StorageResult<Vec<NamedQuizScore>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT r.student_id, s.first_name, s.last_name, r.score
             FROM results r
             JOIN students s ON r.student_id = s.id
             WHERE r.quiz_id = ?1
             ORDER BY r.score DESC, r.student_id",
        )?;
        let rows = stmt
            .query_map(params![quiz_id], NamedQuizScore::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn insert_student(&mut self, student: &NewStudent) -> StorageResult<i64> {
        let tx = self.conn()?.transaction()?;
        tx.execute(
            "INSERT INTO students (first_name, last_name) VALUES (?1, ?2)",
            params![student.first_name, student.last_name],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    pub fn insert_quiz(&mut self, quiz: &NewQuiz) -> StorageResult<i64> {
        let tx = self.conn()?.transaction()?;
        tx.execute(
            "INSERT INTO quizzes (subject, num_questions, quiz_date) VALUES (?1, ?2, ?3)",
            params![quiz.subject, quiz.num_questions, quiz.quiz_date],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Store a score for a (student, quiz) pair, at most one row per pair.
    ///
    /// The existence check and the write share one IMMEDIATE transaction, so
    /// concurrent submissions for the same pair are serialized by SQLite.
    pub fn record_result(
        &mut self,
        result: &NewResult,
        policy: DuplicateResultPolicy,
    ) -> StorageResult<ResultWrite> {
        let tx = self
            .conn()?
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = tx
            .query_row(
                "SELECT id FROM results WHERE student_id = ?1 AND quiz_id = ?2",
                params![result.student_id, result.quiz_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        let write = match (existing, policy) {
            (Some(_), DuplicateResultPolicy::Reject) => ResultWrite::Duplicate,
            (Some(id), DuplicateResultPolicy::Update) => {
                tx.execute(
                    "UPDATE results SET score = ?1 WHERE id = ?2",
                    params![result.score, id],
                )?;
                ResultWrite::Updated(id)
            }
            (None, _) => {
                tx.execute(
                    "INSERT INTO results (student_id, quiz_id, score) VALUES (?1, ?2, ?3)",
                    params![result.student_id, result.quiz_id, result.score],
                )?;
                ResultWrite::Inserted(tx.last_insert_rowid())
            }
        };

        tx.commit()?;
        Ok(write)
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        if self.conn.take().is_some() {
            tracing::trace!("Database connection released");
        }
    }
}
