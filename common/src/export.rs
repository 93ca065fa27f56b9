//! Render scored submissions as a flat CSV table.
//!
//! Every cell, header row included, is wrapped in double quotes with
//! embedded quotes doubled. No field is assumed free of commas or quotes;
//! question text in particular routinely contains both.

use crate::{MISSING_ANSWER, QuestionResult, ScoredSubmission};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn csv_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Serialize the admin view: one row per submission, one column per question
/// (in `order_index` order, as supplied), answer token or `N/A` per cell.
/// The score cell reads `score/total` to match the admin display.
pub fn to_table(submissions: &[ScoredSubmission], questions: &[QuestionResult]) -> String {
    let total = questions.len();

    let mut header: Vec<String> = ["Name", "Email", "Score", "Submitted At"]
        .iter()
        .map(|column| csv_cell(column))
        .collect();
    header.extend(questions.iter().map(|q| csv_cell(&q.text)));

    let mut lines = vec![header.join(",")];
    for submission in submissions {
        let mut row = vec![
            csv_cell(&submission.name),
            csv_cell(&submission.email),
            csv_cell(&format!("{}/{total}", submission.score)),
            csv_cell(&submission.submitted_at.format(TIMESTAMP_FORMAT).to_string()),
        ];
        for question in questions {
            let cell = submission
                .answers
                .iter()
                .find(|a| a.question_id == question.question_id)
                .map_or(MISSING_ANSWER, |a| a.answer.as_str());
            row.push(csv_cell(cell));
        }
        lines.push(row.join(","));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerValue, SubmissionAnswer};
    use chrono::{TimeZone, Utc};

    fn result(question_id: u32, text: &str) -> QuestionResult {
        QuestionResult {
            question_id,
            text: text.to_string(),
            category: None,
            order_index: question_id,
            over_count: 0,
            under_count: 0,
            total_answers: 0,
            over_percentage: 0.0,
            under_percentage: 0.0,
        }
    }

    fn scored(
        id: u32,
        name: &str,
        email: &str,
        score: u32,
        answers: &[(u32, AnswerValue)],
    ) -> ScoredSubmission {
        ScoredSubmission {
            submission_id: id,
            name: name.to_string(),
            email: email.to_string(),
            submitted_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap(),
            answers: answers
                .iter()
                .map(|(question_id, answer)| SubmissionAnswer {
                    question_id: *question_id,
                    question_text: String::new(),
                    answer: *answer,
                })
                .collect(),
            score,
        }
    }

    #[test_log::test]
    fn renders_the_two_question_scenario() {
        let questions = vec![result(1, "Total goals"), result(2, "Total cards")];
        let submissions = vec![
            scored(1, "Ann", "a@x.com", 1, &[(1, AnswerValue::Over), (2, AnswerValue::Under)]),
            scored(2, "Bo", "b@x.com", 1, &[(1, AnswerValue::Over), (2, AnswerValue::Over)]),
        ];

        let table = to_table(&submissions, &questions);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(
            lines[0],
            r#""Name","Email","Score","Submitted At","Total goals","Total cards""#
        );
        assert_eq!(
            lines[1],
            r#""Ann","a@x.com","1/2","2026-03-01 12:30:00 UTC","OVER","UNDER""#
        );
        assert_eq!(
            lines[2],
            r#""Bo","b@x.com","1/2","2026-03-01 12:30:00 UTC","OVER","OVER""#
        );
    }

    #[test_log::test]
    fn missing_answers_render_the_sentinel() {
        let questions = vec![result(1, "Q1"), result(2, "Q2")];
        let submissions = vec![scored(1, "Ann", "a@x.com", 0, &[(1, AnswerValue::Over)])];

        let table = to_table(&submissions, &questions);
        let row = table.lines().nth(1).unwrap();
        assert!(row.ends_with(r#""OVER","N/A""#));
    }

    #[test_log::test]
    fn commas_and_quotes_in_fields_are_contained() {
        let questions = vec![result(1, r#"Goals, total (the "big" one)"#)];
        let submissions = vec![scored(
            1,
            r#"Ann "The Oracle" O'Dea, Jr."#,
            "a@x.com",
            1,
            &[(1, AnswerValue::Over)],
        )];

        let table = to_table(&submissions, &questions);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].ends_with(r#""Goals, total (the ""big"" one)""#));
        assert!(lines[1].starts_with(r#""Ann ""The Oracle"" O'Dea, Jr.","#));
        // Quote counts stay balanced, so a CSV reader sees exactly 5 cells.
        assert_eq!(lines[1].matches('"').count() % 2, 0);
    }

    #[test_log::test]
    fn an_empty_pool_still_produces_the_header() {
        let questions = vec![result(1, "Q1")];
        let table = to_table(&[], &questions);
        assert_eq!(table, r#""Name","Email","Score","Submitted At","Q1""#);
    }
}
