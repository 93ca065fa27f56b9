use super::{conversions, questions};
use crate::{AnswerRow, EngineError, SubmissionAnswer, SubmissionWithAnswers};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use itertools::Itertools;
use std::collections::HashMap;

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

fn answer_private_to_public(
    (submission_id, question_id, answer): (i32, i32, String),
) -> Result<AnswerRow, EngineError> {
    use conversions::*;
    Ok(AnswerRow {
        submission_id: i32_to_u32(submission_id)?,
        question_id: i32_to_u32(question_id)?,
        answer: deserialize_answer(answer)?,
    })
}

/// Total number of accepted submissions.
pub fn count_submissions(conn: &mut PgConnection) -> Result<u32, EngineError> {
    use self::submissions::dsl::*;

    let count: i64 = submissions.count().get_result(conn)?;
    conversions::i64_to_u32(count)
}

/// Advisory pre-flight check only: a negative result here does not reserve
/// the email. The create path's unique constraint is authoritative.
pub fn email_exists(conn: &mut PgConnection, input_email: &str) -> Result<bool, EngineError> {
    use self::submissions::dsl::*;

    let count: i64 = submissions
        .filter(email.eq(input_email))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Every stored answer, for aggregation. Single pass, no grouping in SQL.
pub fn get_all_answers(conn: &mut PgConnection) -> Result<Vec<AnswerRow>, EngineError> {
    use self::answers::dsl::*;

    let rows: Vec<(i32, i32, String)> = answers
        .select((submission_id, question_id, answer))
        .load(conn)?;
    rows.into_iter().map(answer_private_to_public).collect()
}

/// All submissions with their answers labeled with question text.
///
/// Two queries joined in memory; answers within a submission come back in
/// question id order. Deactivated questions still label their answers.
pub fn get_submissions_with_answers(
    conn: &mut PgConnection,
) -> Result<Vec<SubmissionWithAnswers>, EngineError> {
    let texts = questions::get_question_texts(conn)?;

    let submission_rows: Vec<SubmissionPrivate> = {
        use self::submissions::dsl::*;
        submissions.order(id.asc()).load(conn)?
    };
    let answer_rows: Vec<AnswerRow> = {
        use self::answers::dsl::*;
        answers
            .select((submission_id, question_id, answer))
            .order((submission_id.asc(), question_id.asc()))
            .load::<(i32, i32, String)>(conn)?
            .into_iter()
            .map(answer_private_to_public)
            .collect::<Result<_, _>>()?
    };

    let mut grouped: HashMap<u32, Vec<AnswerRow>> = answer_rows
        .into_iter()
        .map(|row| (row.submission_id, row))
        .into_group_map();

    submission_rows
        .into_iter()
        .map(|row| {
            let submission_id = conversions::i32_to_u32(row.id)?;
            let answers = grouped
                .remove(&submission_id)
                .unwrap_or_default()
                .into_iter()
                .map(|a| SubmissionAnswer {
                    question_id: a.question_id,
                    question_text: texts
                        .get(&a.question_id)
                        .cloned()
                        .unwrap_or_else(|| format!("question #{}", a.question_id)),
                    answer: a.answer,
                })
                .collect();
            Ok(SubmissionWithAnswers {
                submission_id,
                name: row.name,
                email: row.email,
                submitted_at: row.submitted_at,
                answers,
            })
        })
        .collect()
}
