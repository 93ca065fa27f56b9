//! Input validation for incoming submissions.
//!
//! Everything here is a pure check against the active question catalog; the
//! duplicate-email rule is deliberately *not* decided here, since only the
//! database uniqueness constraint can arbitrate a race.

use crate::{
    AnswerValue, CreateSubmissionRequest, EngineError, NAME_MAX_CHARS, NAME_MIN_CHARS, NewAnswer,
    NewSubmission, QuestionRecord,
};
use std::collections::HashSet;

/// Trim and lowercase an email for storage and comparison.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Minimal `local@domain.tld` shape check: no whitespace, exactly one `@`
/// with a nonempty local part, and a dot in the domain with nonempty labels
/// on both sides.
fn email_shape_ok(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Validate a create-submission request against the active catalog.
///
/// Accepts only a complete answer set: every active question answered
/// exactly once, every answer referencing an active question, every token a
/// literal OVER or UNDER.
pub fn validate_submission(
    request: &CreateSubmissionRequest,
    active_questions: &[QuestionRecord],
) -> Result<NewSubmission, EngineError> {
    let name = request.name.trim();
    let name_chars = name.chars().count();
    if name_chars < NAME_MIN_CHARS || name_chars > NAME_MAX_CHARS {
        return Err(EngineError::validation(format!(
            "name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        )));
    }

    let email = normalize_email(&request.email);
    if !email_shape_ok(&email) {
        return Err(EngineError::validation("invalid email format"));
    }

    if request.answers.is_empty() {
        return Err(EngineError::validation("at least one answer is required"));
    }

    let known: HashSet<u32> = active_questions.iter().map(|q| q.question_id).collect();
    let mut seen: HashSet<u32> = HashSet::new();
    let mut answers = Vec::with_capacity(request.answers.len());
    for input in &request.answers {
        let Some(value) = AnswerValue::parse(&input.answer) else {
            return Err(EngineError::validation(format!(
                "answer for question #{} must be either OVER or UNDER",
                input.question_id
            )));
        };
        if !known.contains(&input.question_id) {
            return Err(EngineError::validation(format!(
                "answer references unknown question #{}",
                input.question_id
            )));
        }
        if !seen.insert(input.question_id) {
            return Err(EngineError::validation(format!(
                "duplicate answer for question #{}",
                input.question_id
            )));
        }
        answers.push(NewAnswer {
            question_id: input.question_id,
            value,
        });
    }

    for question in active_questions {
        if !seen.contains(&question.question_id) {
            return Err(EngineError::validation(format!(
                "missing answer for question #{}",
                question.question_id
            )));
        }
    }

    Ok(NewSubmission {
        name: name.to_string(),
        email,
        answers,
    })
}
