use super::conversions;
use crate::{EngineError, NewQuestion, QuestionRecord};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::collections::HashMap;

diesel::table! {
    questions (id) {
        id -> Integer,
        text -> Varchar,
        category -> Nullable<Varchar>,
        order_index -> Integer,
        is_active -> Bool,
        created_at -> Timestamptz,
    }
}

#[derive(Queryable)]
struct QuestionPrivate {
    id: i32,
    text: String,
    category: Option<String>,
    order_index: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = questions)]
struct QuestionPrivateNew {
    text: String,
    category: Option<String>,
    order_index: i32,
    is_active: bool,
}

fn private_to_public(p: QuestionPrivate) -> Result<QuestionRecord, EngineError> {
    use conversions::*;
    Ok(QuestionRecord {
        question_id: i32_to_u32(p.id)?,
        text: p.text,
        category: p.category,
        order_index: i32_to_u32(p.order_index)?,
        is_active: p.is_active,
        created_at: p.created_at,
    })
}

fn build_new_row(q: &NewQuestion) -> Result<QuestionPrivateNew, EngineError> {
    use conversions::*;
    Ok(QuestionPrivateNew {
        text: q.text.clone(),
        category: q.category.clone(),
        order_index: u32_to_i32(q.order_index)?,
        is_active: true,
    })
}

/// All active questions, ordered by `order_index` ascending.
pub fn get_active_questions(conn: &mut PgConnection) -> Result<Vec<QuestionRecord>, EngineError> {
    use self::questions::dsl::*;

    let rows: Vec<QuestionPrivate> = questions
        .filter(is_active.eq(true))
        .order(order_index.asc())
        .load(conn)?;
    rows.into_iter().map(private_to_public).collect()
}

/// Display text for every question, active or not. Used to label stored
/// answers even after their question is deactivated.
pub fn get_question_texts(conn: &mut PgConnection) -> Result<HashMap<u32, String>, EngineError> {
    use self::questions::dsl::*;

    let rows: Vec<(i32, String)> = questions.select((id, text)).load(conn)?;
    rows.into_iter()
        .map(|(row_id, row_text)| Ok((conversions::i32_to_u32(row_id)?, row_text)))
        .collect()
}

/// One-time catalog import. Rows are inserted active, in the given order.
pub fn import_questions(conn: &mut PgConnection, rows: &[NewQuestion]) -> Result<u32, EngineError> {
    use self::questions::dsl::*;

    let insert_rows = rows
        .iter()
        .map(build_new_row)
        .collect::<Result<Vec<_>, _>>()?;

    let inserted = diesel::insert_into(questions).values(&insert_rows).execute(conn)?;
    conversions::i64_to_u32(inserted as i64)
}
