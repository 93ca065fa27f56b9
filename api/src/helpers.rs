//! Some helper functions for the API.

use overunder_common::EngineError;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::Response;
use rocket::response::status as rocket_status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Responder;
use std::time::Instant;

#[derive(Clone, Copy)]
pub struct RequestTimingFairing;

#[rocket::async_trait]
impl Fairing for RequestTimingFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request timing",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _data: &mut rocket::Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started_at = request.local_cache(Instant::now);
        let elapsed = started_at.elapsed();
        let status = response.status().code;

        tracing::info!(
            method = %request.method(),
            path = %request.uri(),
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request Completed"
        );
    }
}

#[derive(Clone, Copy)]
pub struct CorsFairing;

#[rocket::async_trait]
impl Fairing for CorsFairing {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, OPTIONS, HEAD",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Max-Age", "86400"));
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    NotFound,
    BadRequest,
    Conflict,
    Unauthorized,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ApiErrorBody {
    error: ApiErrorKind,
    message: String,
}

impl ApiErrorBody {
    pub fn new(error: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

pub type ApiResult<T> = Result<Json<T>, rocket_status::Custom<Json<ApiErrorBody>>>;

fn api_error(
    status: Status,
    kind: ApiErrorKind,
    message: impl Into<String>,
) -> rocket_status::Custom<Json<ApiErrorBody>> {
    rocket_status::Custom(status, Json(ApiErrorBody::new(kind, message)))
}

/// The client-facing message for an engine failure. Storage detail never
/// crosses the boundary; it is already in the server log.
pub fn client_message(err: &EngineError) -> String {
    match err {
        EngineError::Validation(message) => message.clone(),
        EngineError::DuplicateEmail => {
            "This email has already submitted predictions. Contact admin if you need to update."
                .to_string()
        }
        EngineError::Unauthorized => "Unauthorized".to_string(),
        EngineError::Storage(_) => "Service temporarily unavailable. Please try again.".to_string(),
    }
}

pub fn engine_error_status(err: &EngineError) -> Status {
    match err {
        EngineError::Validation(_) => Status::BadRequest,
        EngineError::DuplicateEmail => Status::Conflict,
        EngineError::Unauthorized => Status::Unauthorized,
        EngineError::Storage(_) => Status::InternalServerError,
    }
}

/// Map an engine failure onto the admin-surface error body.
pub fn engine_error_response(err: &EngineError) -> rocket_status::Custom<Json<ApiErrorBody>> {
    let kind = match err {
        EngineError::Validation(_) => ApiErrorKind::BadRequest,
        EngineError::DuplicateEmail => ApiErrorKind::Conflict,
        EngineError::Unauthorized => ApiErrorKind::Unauthorized,
        EngineError::Storage(_) => ApiErrorKind::Internal,
    };
    api_error(engine_error_status(err), kind, client_message(err))
}

pub fn not_found_error(message: impl Into<String>) -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(ApiErrorKind::NotFound, message))
}

pub fn unauthorized_error(message: impl Into<String>) -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(ApiErrorKind::Unauthorized, message))
}

pub fn bad_request_error(message: impl Into<String>) -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(ApiErrorKind::BadRequest, message))
}

pub fn internal_error_body(message: impl Into<String>) -> Json<ApiErrorBody> {
    Json(ApiErrorBody::new(ApiErrorKind::Internal, message))
}

/// A CSV payload served as a download.
#[derive(Responder)]
#[response(status = 200, content_type = "text/csv")]
pub struct CsvAttachment {
    pub body: String,
    pub disposition: Header<'static>,
}

impl CsvAttachment {
    pub fn new(body: String, filename: &str) -> Self {
        Self {
            body,
            disposition: Header::new(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            ),
        }
    }
}
