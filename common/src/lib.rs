//! A library with the core engine for an over/under prediction pool:
//! validation, aggregation, consensus scoring, CSV export, and the admin
//! token scheme. Database access lives behind the `database` feature.

pub mod auth;
pub mod error;
pub mod export;
pub mod results;
pub mod scoring;
pub mod validation;

#[cfg(feature = "database")]
pub mod db_util;

pub use error::EngineError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed marker embedded in every admin token.
pub const TOKEN_MARKER: &str = "admin";
/// How long an issued admin token stays valid, in hours.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;
/// Participant name length bounds, counted after trimming.
pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 255;
/// Export cell for a question the participant never answered.
pub const MISSING_ANSWER: &str = "N/A";

/// The two possible predictions for a prop question.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnswerValue {
    Over,
    Under,
}

impl AnswerValue {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerValue::Over => "OVER",
            AnswerValue::Under => "UNDER",
        }
    }

    /// Parse the exact wire token. Anything else (including lowercase) is rejected.
    pub fn parse(token: &str) -> Option<AnswerValue> {
        match token {
            "OVER" => Some(AnswerValue::Over),
            "UNDER" => Some(AnswerValue::Under),
            _ => None,
        }
    }
}

/// A prop question from the catalog.
/// Immutable once answers reference it, except for the active flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question_id: u32,
    pub text: String,
    pub category: Option<String>,
    pub order_index: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A participant's accepted submission. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: u32,
    pub name: String,
    pub email: String,
    pub submitted_at: DateTime<Utc>,
}

/// One stored answer, as loaded for aggregation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnswerRow {
    pub submission_id: u32,
    pub question_id: u32,
    pub answer: AnswerValue,
}

/// Per-question tallies and percentages, derived on every read.
///
/// The percentages are rounded to one decimal place independently, so they
/// are not guaranteed to sum to exactly 100.0. Both are 0.0 when the
/// question has no answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: u32,
    pub text: String,
    pub category: Option<String>,
    pub order_index: u32,
    pub over_count: u32,
    pub under_count: u32,
    pub total_answers: u32,
    pub over_percentage: f64,
    pub under_percentage: f64,
}

/// One answer inside a submission, paired with its question's display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAnswer {
    pub question_id: u32,
    pub question_text: String,
    pub answer: AnswerValue,
}

/// A submission with its full answer list, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionWithAnswers {
    pub submission_id: u32,
    pub name: String,
    pub email: String,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<SubmissionAnswer>,
}

/// A submission annotated with its consensus score: the number of its
/// answers that match the current majority on their question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSubmission {
    pub submission_id: u32,
    pub name: String,
    pub email: String,
    pub submitted_at: DateTime<Utc>,
    pub answers: Vec<SubmissionAnswer>,
    pub score: u32,
}

/// One answer as submitted by a client. The token is validated (not just
/// deserialized) so a bad value surfaces as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: u32,
    pub answer: String,
}

/// The create-submission request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionRequest {
    pub name: String,
    pub email: String,
    pub answers: Vec<AnswerInput>,
}

/// A validated answer ready to persist.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NewAnswer {
    pub question_id: u32,
    pub value: AnswerValue,
}

/// A validated submission ready to persist: name trimmed, email normalized,
/// every active question covered exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub answers: Vec<NewAnswer>,
}

/// A catalog row for the one-time question import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
    pub text: String,
    pub category: Option<String>,
    pub order_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub questions: Vec<QuestionResult>,
    pub total_submissions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAuthRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminResultsResponse {
    pub submissions: Vec<ScoredSubmission>,
    pub questions: Vec<QuestionResult>,
}
