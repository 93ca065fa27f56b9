use super::conversions;
use crate::{EngineError, NewAnswer, NewSubmission, SubmissionRecord};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

diesel::table! {
    submissions (id) {
        id -> Integer,
        name -> Varchar,
        email -> Varchar,
        submitted_at -> Timestamptz,
    }
}

diesel::table! {
    answers (id) {
        id -> Integer,
        submission_id -> Integer,
        question_id -> Integer,
        answer -> Varchar,
    }
}

#[derive(Queryable)]
struct SubmissionPrivate {
    id: i32,
    name: String,
    email: String,
    submitted_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = submissions)]
struct SubmissionPrivateNew {
    name: String,
    email: String,
}

#[derive(Insertable)]
#[diesel(table_name = answers)]
struct AnswerPrivateNew {
    submission_id: i32,
    question_id: i32,
    answer: String,
}

fn private_to_public(p: SubmissionPrivate) -> Result<SubmissionRecord, EngineError> {
    use conversions::*;
    Ok(SubmissionRecord {
        submission_id: i32_to_u32(p.id)?,
        name: p.name,
        email: p.email,
        submitted_at: p.submitted_at,
    })
}

fn build_answer_rows(
    new_submission_id: i32,
    new_answers: &[NewAnswer],
) -> Result<Vec<AnswerPrivateNew>, EngineError> {
    use conversions::*;
    new_answers
        .iter()
        .map(|a| {
            Ok(AnswerPrivateNew {
                submission_id: new_submission_id,
                question_id: u32_to_i32(a.question_id)?,
                answer: serialize_answer(a.value),
            })
        })
        .collect()
}

/// Persist a validated submission and all of its answers in one transaction.
///
/// A unique violation on the email constraint surfaces as `DuplicateEmail`;
/// the constraint, not the advisory pre-flight check, decides races. Nothing
/// is persisted on any failure.
pub fn insert_submission(
    conn: &mut PgConnection,
    new: &NewSubmission,
) -> Result<SubmissionRecord, EngineError> {
    let row = conn.transaction::<SubmissionPrivate, EngineError, _>(|conn| {
        let row: SubmissionPrivate = diesel::insert_into(submissions::table)
            .values(SubmissionPrivateNew {
                name: new.name.clone(),
                email: new.email.clone(),
            })
            .get_result(conn)?;

        let answer_rows = build_answer_rows(row.id, &new.answers)?;
        diesel::insert_into(answers::table)
            .values(&answer_rows)
            .execute(conn)?;

        Ok(row)
    })?;

    private_to_public(row)
}
