//! Consensus scoring: compare each submission's answers to the live majority.
//!
//! Tie policy: a question with `over_count == under_count` (including zero
//! votes) has no majority and contributes 0 to every score. A submission
//! cannot be right against a split or empty consensus.

use crate::{AnswerValue, QuestionResult, ScoredSubmission, SubmissionWithAnswers};
use std::cmp::Ordering;
use std::collections::HashMap;

/// The majority answer for a question, if one exists.
pub fn majority(result: &QuestionResult) -> Option<AnswerValue> {
    match result.over_count.cmp(&result.under_count) {
        Ordering::Greater => Some(AnswerValue::Over),
        Ordering::Less => Some(AnswerValue::Under),
        Ordering::Equal => None,
    }
}

/// Annotate every submission with its consensus score.
///
/// An answer earns a point iff its question has a strict majority and the
/// answer matches it. Questions absent from `results` (deactivated, or never
/// aggregated) earn nothing; partial answer sets are tolerated here even
/// though the create path rejects them.
///
/// Output is sorted by score descending, then submission id ascending, so
/// repeated reads over the same state produce identical output.
pub fn score_submissions(
    submissions: Vec<SubmissionWithAnswers>,
    results: &[QuestionResult],
) -> Vec<ScoredSubmission> {
    let majorities: HashMap<u32, Option<AnswerValue>> = results
        .iter()
        .map(|result| (result.question_id, majority(result)))
        .collect();

    let mut scored: Vec<ScoredSubmission> = submissions
        .into_iter()
        .map(|submission| {
            let score = submission
                .answers
                .iter()
                .filter(|a| majorities.get(&a.question_id).copied().flatten() == Some(a.answer))
                .count() as u32;
            ScoredSubmission {
                submission_id: submission.submission_id,
                name: submission.name,
                email: submission.email,
                submitted_at: submission.submitted_at,
                answers: submission.answers,
                score,
            }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.submission_id.cmp(&b.submission_id))
    });
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerRow, QuestionRecord, SubmissionAnswer, results::results_by_question};
    use chrono::Utc;

    fn question(id: u32, order_index: u32) -> QuestionRecord {
        QuestionRecord {
            question_id: id,
            text: format!("Question {id}"),
            category: None,
            order_index,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn result(question_id: u32, over_count: u32, under_count: u32) -> QuestionResult {
        QuestionResult {
            question_id,
            text: format!("Question {question_id}"),
            category: None,
            order_index: question_id,
            over_count,
            under_count,
            total_answers: over_count + under_count,
            over_percentage: 0.0,
            under_percentage: 0.0,
        }
    }

    fn submission(id: u32, answers: &[(u32, AnswerValue)]) -> SubmissionWithAnswers {
        SubmissionWithAnswers {
            submission_id: id,
            name: format!("Participant {id}"),
            email: format!("p{id}@x.com"),
            submitted_at: Utc::now(),
            answers: answers
                .iter()
                .map(|(question_id, answer)| SubmissionAnswer {
                    question_id: *question_id,
                    question_text: format!("Question {question_id}"),
                    answer: *answer,
                })
                .collect(),
        }
    }

    #[test_log::test]
    fn majority_requires_a_strict_lead() {
        assert_eq!(majority(&result(1, 3, 2)), Some(AnswerValue::Over));
        assert_eq!(majority(&result(1, 2, 3)), Some(AnswerValue::Under));
        assert_eq!(majority(&result(1, 2, 2)), None);
        assert_eq!(majority(&result(1, 0, 0)), None);
    }

    #[test_log::test]
    fn matching_the_majority_earns_a_point() {
        let results = vec![result(1, 3, 2)];
        let scored = score_submissions(
            vec![
                submission(1, &[(1, AnswerValue::Over)]),
                submission(2, &[(1, AnswerValue::Under)]),
            ],
            &results,
        );

        assert_eq!(scored[0].submission_id, 1);
        assert_eq!(scored[0].score, 1);
        assert_eq!(scored[1].submission_id, 2);
        assert_eq!(scored[1].score, 0);
    }

    #[test_log::test]
    fn a_question_with_no_answers_credits_nobody() {
        let results = vec![result(1, 0, 0)];
        let scored = score_submissions(vec![submission(1, &[(1, AnswerValue::Over)])], &results);
        assert_eq!(scored[0].score, 0);
    }

    #[test_log::test]
    fn a_question_absent_from_results_credits_nobody() {
        let scored = score_submissions(vec![submission(1, &[(42, AnswerValue::Over)])], &[]);
        assert_eq!(scored[0].score, 0);
    }

    #[test_log::test]
    fn output_sorts_by_score_descending_then_submission_id_ascending() {
        let results = vec![result(1, 5, 1), result(2, 1, 5)];
        let scored = score_submissions(
            vec![
                submission(3, &[(1, AnswerValue::Over)]),
                submission(1, &[(1, AnswerValue::Under), (2, AnswerValue::Over)]),
                submission(2, &[(1, AnswerValue::Over), (2, AnswerValue::Under)]),
            ],
            &results,
        );

        let order: Vec<(u32, u32)> = scored.iter().map(|s| (s.submission_id, s.score)).collect();
        assert_eq!(order, vec![(2, 2), (3, 1), (1, 0)]);
    }

    #[test_log::test]
    fn scoring_preserves_each_submission_and_its_answers() {
        let results = vec![result(1, 1, 0)];
        let input = submission(1, &[(1, AnswerValue::Over)]);
        let scored = score_submissions(vec![input.clone()], &results);

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].submission_id, input.submission_id);
        assert_eq!(scored[0].answers, input.answers);
    }

    #[test_log::test]
    fn end_to_end_scenario_with_a_tied_question_scores_ann_and_bo_one_each() {
        // Ann: Q1 OVER, Q2 UNDER. Bo: Q1 OVER, Q2 OVER. Q1 majority is OVER,
        // Q2 is tied 1-1 so it counts for nobody.
        let questions = vec![question(1, 1), question(2, 2)];
        let answers = vec![
            AnswerRow { submission_id: 1, question_id: 1, answer: AnswerValue::Over },
            AnswerRow { submission_id: 1, question_id: 2, answer: AnswerValue::Under },
            AnswerRow { submission_id: 2, question_id: 1, answer: AnswerValue::Over },
            AnswerRow { submission_id: 2, question_id: 2, answer: AnswerValue::Over },
        ];
        let results = results_by_question(&questions, &answers);

        let scored = score_submissions(
            vec![
                submission(1, &[(1, AnswerValue::Over), (2, AnswerValue::Under)]),
                submission(2, &[(1, AnswerValue::Over), (2, AnswerValue::Over)]),
            ],
            &results,
        );

        assert_eq!(scored[0].submission_id, 1);
        assert_eq!(scored[0].score, 1);
        assert_eq!(scored[1].submission_id, 2);
        assert_eq!(scored[1].score, 1);
    }
}
