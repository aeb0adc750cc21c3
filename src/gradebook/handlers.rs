use axum::{
    extract::{rejection::PathRejection, Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};

use super::forms::{FormError, QuizForm, ResultForm, StudentForm};
use crate::auth::Teacher;
use crate::config::DuplicateResultPolicy;
use crate::http::error::AppError;
use crate::http::response::{not_found, render, DASHBOARD_PATH};
use crate::http::server::AppState;
use crate::http::views::{
    AddResultPage, DashboardPage, FormPage, QuizResults, QuizResultsPage, StudentResultsPage,
};
use crate::observability::metrics;
use crate::session::{Flash, Session};
use crate::storage::{
    Gateway, NewResult, Quiz, QuizOrder, ResultWrite, Student, StorageResult, StudentOrder,
};

pub async fn dashboard(
    _teacher: Teacher,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let (students, quizzes) = state
        .db
        .run(|gw| {
            Ok((
                gw.list_students(StudentOrder::Id)?,
                gw.list_quizzes(QuizOrder::Id)?,
            ))
        })
        .await?;

    Ok(render(DashboardPage {
        students,
        quizzes,
        flashes: session.take_flashes(),
    }))
}

pub async fn add_student_page(_teacher: Teacher, session: Session) -> Response {
    render(FormPage {
        error: None,
        flashes: session.take_flashes(),
    })
}

pub async fn add_student(
    _teacher: Teacher,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<StudentForm>,
) -> Result<Response, AppError> {
    let student = match form.validate() {
        Ok(student) => student,
        Err(error) => return Ok(invalid_form(&session, "student", error)),
    };

    let id = state.db.run(move |gw| gw.insert_student(&student)).await?;
    tracing::info!(student_id = id, "Student added");
    metrics::record_write("student", "insert");

    session.flash(Flash::success("New student was successfully added"));
    Ok(Redirect::to(DASHBOARD_PATH).into_response())
}

pub async fn add_quiz_page(_teacher: Teacher, session: Session) -> Response {
    render(FormPage {
        error: None,
        flashes: session.take_flashes(),
    })
}

pub async fn add_quiz(
    _teacher: Teacher,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<QuizForm>,
) -> Result<Response, AppError> {
    let quiz = match form.validate() {
        Ok(quiz) => quiz,
        Err(error) => return Ok(invalid_form(&session, "quiz", error)),
    };

    let id = state.db.run(move |gw| gw.insert_quiz(&quiz)).await?;
    tracing::info!(quiz_id = id, "Quiz added");
    metrics::record_write("quiz", "insert");

    session.flash(Flash::success("New quiz was successfully added"));
    Ok(Redirect::to(DASHBOARD_PATH).into_response())
}

pub async fn student_results(
    _teacher: Teacher,
    State(state): State<AppState>,
    session: Session,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let policy = state.config().policy.not_found;
    let Ok(Path(student_id)) = path else {
        return Ok(not_found(policy, &session, "Student not found"));
    };

    let found = state
        .db
        .run(move |gw| match gw.find_student(student_id)? {
            Some(student) => Ok(Some((student, gw.student_results(student_id)?))),
            None => Ok(None),
        })
        .await?;

    let Some((student, results)) = found else {
        return Ok(not_found(policy, &session, "Student not found"));
    };

    Ok(render(StudentResultsPage {
        student_id,
        student,
        results,
        flashes: session.take_flashes(),
    }))
}

pub async fn add_result_page(
    _teacher: Teacher,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let (students, quizzes) = state.db.run(result_choices).await?;
    Ok(render(AddResultPage {
        students,
        quizzes,
        error: None,
        flashes: session.take_flashes(),
    }))
}

pub async fn add_result(
    _teacher: Teacher,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ResultForm>,
) -> Result<Response, AppError> {
    let policy = state.config().policy.duplicate_result;
    let submission = state
        .db
        .run(move |gw| submit_result(gw, &form, policy))
        .await?;

    match submission {
        ResultSubmission::Inserted(result) => {
            tracing::info!(
                student_id = result.student_id,
                quiz_id = result.quiz_id,
                score = result.score,
                "Result added"
            );
            metrics::record_write("result", "insert");
            session.flash(Flash::success("Quiz result was successfully added"));
            Ok(Redirect::to(DASHBOARD_PATH).into_response())
        }
        ResultSubmission::Updated(result) => {
            tracing::info!(
                student_id = result.student_id,
                quiz_id = result.quiz_id,
                score = result.score,
                "Result updated"
            );
            metrics::record_write("result", "update");
            session.flash(Flash::success("Quiz result was successfully updated"));
            Ok(Redirect::to(DASHBOARD_PATH).into_response())
        }
        ResultSubmission::Rejected {
            error,
            students,
            quizzes,
        } => {
            tracing::debug!(error = %error, "Result form rejected");
            metrics::record_validation_failure("result");
            Ok(render(AddResultPage {
                students,
                quizzes,
                error: Some(error.to_string()),
                flashes: session.take_flashes(),
            }))
        }
    }
}

/// Public. Names are only joined in when the viewer is the teacher.
pub async fn quiz_results(
    State(state): State<AppState>,
    session: Session,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Response, AppError> {
    let policy = state.config().policy.not_found;
    let Ok(Path(quiz_id)) = path else {
        return Ok(not_found(policy, &session, "Quiz not found"));
    };
    let is_teacher = session.is_authenticated();

    let found = state
        .db
        .run(move |gw| {
            let Some(quiz) = gw.find_quiz(quiz_id)? else {
                return Ok(None);
            };
            let results = if is_teacher {
                QuizResults::Named(gw.quiz_scores_named(quiz_id)?)
            } else {
                QuizResults::Anonymous(gw.quiz_scores(quiz_id)?)
            };
            Ok(Some((quiz, results)))
        })
        .await?;

    let Some((quiz, results)) = found else {
        return Ok(not_found(policy, &session, "Quiz not found"));
    };

    Ok(render(QuizResultsPage {
        quiz,
        is_teacher,
        results,
        flashes: session.take_flashes(),
    }))
}

fn invalid_form(session: &Session, form: &'static str, error: FormError) -> Response {
    tracing::debug!(form, error = %error, "Form rejected");
    metrics::record_validation_failure(form);
    render(FormPage {
        error: Some(error.to_string()),
        flashes: session.take_flashes(),
    })
}

/// Outcome of an add-result submission.
#[derive(Debug)]
pub enum ResultSubmission {
    Inserted(NewResult),
    Updated(NewResult),
    Rejected {
        error: FormError,
        students: Vec<Student>,
        quizzes: Vec<Quiz>,
    },
}

fn result_choices(gw: &mut Gateway) -> StorageResult<(Vec<Student>, Vec<Quiz>)> {
    Ok((
        gw.list_students(StudentOrder::LastName)?,
        gw.list_quizzes(QuizOrder::DateDesc)?,
    ))
}

/// Validate and store a result, never creating a second row for the same
/// student and quiz.
pub fn submit_result(
    gw: &mut Gateway,
    form: &ResultForm,
    policy: DuplicateResultPolicy,
) -> StorageResult<ResultSubmission> {
    let result = match form.validate() {
        Ok(result) => result,
        Err(error) => return rejected(gw, error),
    };
    if gw.find_student(result.student_id)?.is_none() {
        return rejected(gw, FormError::UnknownStudent);
    }
    if gw.find_quiz(result.quiz_id)?.is_none() {
        return rejected(gw, FormError::UnknownQuiz);
    }

    match gw.record_result(&result, policy)? {
        ResultWrite::Inserted(_) => Ok(ResultSubmission::Inserted(result)),
        ResultWrite::Updated(_) => Ok(ResultSubmission::Updated(result)),
        ResultWrite::Duplicate => rejected(gw, FormError::DuplicateResult),
    }
}

fn rejected(gw: &mut Gateway, error: FormError) -> StorageResult<ResultSubmission> {
    let (students, quizzes) = result_choices(gw)?;
    Ok(ResultSubmission::Rejected {
        error,
        students,
        quizzes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DbPool, NewQuiz, NewStudent};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        pool: DbPool,
        student_id: i64,
        quiz_id: i64,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let pool =
            DbPool::open_path(dir.path().join("gb.db"), 4, Duration::from_secs(5)).unwrap();
        let mut gw = pool.gateway();
        let student_id = gw
            .insert_student(&NewStudent {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
            })
            .unwrap();
        let quiz_id = gw
            .insert_quiz(&NewQuiz {
                subject: "Math".into(),
                num_questions: 10,
                quiz_date: "2024-01-01".into(),
            })
            .unwrap();
        Fixture {
            _dir: dir,
            pool,
            student_id,
            quiz_id,
        }
    }

    fn form(student_id: i64, quiz_id: i64, score: &str) -> ResultForm {
        ResultForm {
            student_id: student_id.to_string(),
            quiz_id: quiz_id.to_string(),
            score: score.into(),
        }
    }

    fn submit(fx: &Fixture, score: &str, policy: DuplicateResultPolicy) -> ResultSubmission {
        let mut gw = fx.pool.gateway();
        submit_result(&mut gw, &form(fx.student_id, fx.quiz_id, score), policy).unwrap()
    }

    fn scores(fx: &Fixture) -> Vec<i64> {
        fx.pool
            .gateway()
            .student_results(fx.student_id)
            .unwrap()
            .into_iter()
            .map(|r| r.score)
            .collect()
    }

    #[test]
    fn test_first_submission_inserts() {
        let fx = fixture();
        let outcome = submit(&fx, "95", DuplicateResultPolicy::Reject);
        assert!(matches!(outcome, ResultSubmission::Inserted(r) if r.score == 95));
        assert_eq!(scores(&fx), vec![95]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let fx = fixture();
        submit(&fx, "60", DuplicateResultPolicy::Reject);

        match submit(&fx, "90", DuplicateResultPolicy::Reject) {
            ResultSubmission::Rejected {
                error,
                students,
                quizzes,
            } => {
                assert_eq!(error, FormError::DuplicateResult);
                assert_eq!(students.len(), 1);
                assert_eq!(quizzes.len(), 1);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(scores(&fx), vec![60]);
    }

    #[test]
    fn test_duplicate_updates_in_place() {
        let fx = fixture();
        submit(&fx, "60", DuplicateResultPolicy::Update);

        let outcome = submit(&fx, "90", DuplicateResultPolicy::Update);
        assert!(matches!(outcome, ResultSubmission::Updated(r) if r.score == 90));
        assert_eq!(scores(&fx), vec![90]);
    }

    #[test]
    fn test_simultaneous_submissions_store_one_row() {
        let fx = fixture();
        for round in 0..25 {
            let barrier = Arc::new(Barrier::new(4));
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let pool = fx.pool.clone();
                    let barrier = Arc::clone(&barrier);
                    let form = form(fx.student_id, fx.quiz_id, "80");
                    thread::spawn(move || {
                        let mut gw = pool.gateway();
                        barrier.wait();
                        submit_result(&mut gw, &form, DuplicateResultPolicy::Reject).unwrap()
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            assert_eq!(scores(&fx).len(), 1, "round {round}");
        }
    }

    #[test]
    fn test_out_of_range_writes_nothing() {
        let fx = fixture();
        submit(&fx, "70", DuplicateResultPolicy::Update);

        for bad in ["101", "-5", "abc"] {
            let outcome = submit(&fx, bad, DuplicateResultPolicy::Update);
            assert!(matches!(outcome, ResultSubmission::Rejected { .. }));
        }
        assert_eq!(scores(&fx), vec![70]);
    }

    #[test]
    fn test_unknown_selection() {
        let fx = fixture();
        let mut gw = fx.pool.gateway();
        let policy = DuplicateResultPolicy::Reject;

        let unknown_student = form(fx.student_id + 100, fx.quiz_id, "50");
        let outcome = submit_result(&mut gw, &unknown_student, policy).unwrap();
        assert!(matches!(
            outcome,
            ResultSubmission::Rejected {
                error: FormError::UnknownStudent,
                ..
            }
        ));

        let unknown_quiz = form(fx.student_id, fx.quiz_id + 100, "50");
        let outcome = submit_result(&mut gw, &unknown_quiz, policy).unwrap();
        assert!(matches!(
            outcome,
            ResultSubmission::Rejected {
                error: FormError::UnknownQuiz,
                ..
            }
        ));
        assert!(scores(&fx).is_empty());
    }
}
