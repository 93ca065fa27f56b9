//! Derive per-question tallies and percentages from stored answers.
//!
//! This is a pure function of the rows handed in: no caching, no incremental
//! state, recomputed in full on every read.

use crate::{AnswerRow, AnswerValue, QuestionRecord, QuestionResult};
use itertools::Itertools;
use std::collections::HashMap;

/// `100 * count / total` rounded to one decimal place, or 0.0 with no votes.
fn percentage(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(count) * 1000.0 / f64::from(total)).round() / 10.0
}

/// Tally the given answers against the given (active) questions.
///
/// Output is ordered by `order_index` ascending. Answers referencing a
/// question not in the list are ignored, so deactivated questions drop out
/// of the results without touching their stored answers.
pub fn results_by_question(
    questions: &[QuestionRecord],
    answers: &[AnswerRow],
) -> Vec<QuestionResult> {
    let votes: HashMap<u32, Vec<AnswerValue>> = answers
        .iter()
        .map(|row| (row.question_id, row.answer))
        .into_group_map();

    questions
        .iter()
        .sorted_by_key(|q| q.order_index)
        .map(|question| {
            let question_votes = votes.get(&question.question_id);
            let over_count = question_votes
                .map_or(0, |v| v.iter().filter(|a| **a == AnswerValue::Over).count())
                as u32;
            let under_count = question_votes
                .map_or(0, |v| v.iter().filter(|a| **a == AnswerValue::Under).count())
                as u32;
            let total_answers = over_count + under_count;
            QuestionResult {
                question_id: question.question_id,
                text: question.text.clone(),
                category: question.category.clone(),
                order_index: question.order_index,
                over_count,
                under_count,
                total_answers,
                over_percentage: percentage(over_count, total_answers),
                under_percentage: percentage(under_count, total_answers),
            }
        })
        .collect()
}
