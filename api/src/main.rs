//! An api for collecting over/under predictions and scoring consensus.

#[macro_use]
extern crate rocket;

mod guards;
mod helpers;

use chrono::Utc;
use guards::AdminToken;
use helpers::{
    ApiErrorBody, ApiResult, CorsFairing, CsvAttachment, RequestTimingFairing, bad_request_error,
    client_message, engine_error_response, engine_error_status, internal_error_body,
    not_found_error, unauthorized_error,
};
use overunder_common::db_util::{self, PgPool, PgPooledConnection};
use overunder_common::{
    AdminAuthRequest, AdminAuthResponse, AdminResultsResponse, CreateSubmissionRequest,
    CreateSubmissionResponse, EngineError, NewQuestion, QuestionResult, ResultsResponse,
    ScoredSubmission, auth, export, results, scoring, validation,
};
use rocket::State;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use tracing_subscriber::EnvFilter;

/// Admin secret, read once at startup and passed explicitly into every token
/// operation. Rotation means restarting the process, which also invalidates
/// all outstanding tokens (the embedded secret stops matching).
pub struct AdminConfig {
    pub secret: String,
}

fn connect(pool: &PgPool) -> Result<PgPooledConnection, EngineError> {
    db_util::get_pooled_database_connection(pool)
}

fn try_create_submission(
    request: &CreateSubmissionRequest,
    pool: &PgPool,
) -> Result<u32, EngineError> {
    let mut conn = connect(pool)?;
    let questions = db_util::get_active_questions(&mut conn)?;
    let new = validation::validate_submission(request, &questions)?;
    // Advisory pre-flight for a friendly fast path; the unique constraint
    // inside insert_submission is what actually decides a race.
    if db_util::email_exists(&mut conn, &new.email)? {
        return Err(EngineError::DuplicateEmail);
    }
    let record = db_util::insert_submission(&mut conn, &new)?;
    tracing::info!(submission_id = record.submission_id, "Submission accepted");
    Ok(record.submission_id)
}

#[post("/submissions", data = "<request>")]
fn create_submission(
    request: Json<CreateSubmissionRequest>,
    pool: &State<PgPool>,
) -> Custom<Json<CreateSubmissionResponse>> {
    match try_create_submission(&request, pool) {
        Ok(submission_id) => Custom(
            rocket::http::Status::Ok,
            Json(CreateSubmissionResponse {
                success: true,
                submission_id: Some(submission_id),
                error: None,
            }),
        ),
        Err(err) => Custom(
            engine_error_status(&err),
            Json(CreateSubmissionResponse {
                success: false,
                submission_id: None,
                error: Some(client_message(&err)),
            }),
        ),
    }
}

fn load_results(conn: &mut PgPooledConnection) -> Result<Vec<QuestionResult>, EngineError> {
    let questions = db_util::get_active_questions(conn)?;
    let answers = db_util::get_all_answers(conn)?;
    Ok(results::results_by_question(&questions, &answers))
}

#[get("/results")]
fn get_results(pool: &State<PgPool>) -> ApiResult<ResultsResponse> {
    let run = || -> Result<ResultsResponse, EngineError> {
        let mut conn = connect(pool)?;
        Ok(ResultsResponse {
            questions: load_results(&mut conn)?,
            total_submissions: db_util::count_submissions(&mut conn)?,
        })
    };
    run().map(Json).map_err(|err| engine_error_response(&err))
}

#[post("/admin/auth", data = "<request>")]
fn admin_auth(
    request: Json<AdminAuthRequest>,
    config: &State<AdminConfig>,
) -> Custom<Json<AdminAuthResponse>> {
    match auth::issue_token(&request.password, &config.secret, Utc::now()) {
        Ok(token) => Custom(
            rocket::http::Status::Ok,
            Json(AdminAuthResponse {
                success: true,
                token: Some(token),
                error: None,
            }),
        ),
        Err(_) => Custom(
            rocket::http::Status::Unauthorized,
            Json(AdminAuthResponse {
                success: false,
                token: None,
                error: Some("Invalid password".to_string()),
            }),
        ),
    }
}

fn load_scored_submissions(
    conn: &mut PgPooledConnection,
    question_results: &[QuestionResult],
) -> Result<Vec<ScoredSubmission>, EngineError> {
    let submissions = db_util::get_submissions_with_answers(conn)?;
    Ok(scoring::score_submissions(submissions, question_results))
}

#[get("/admin/results")]
fn admin_results(_token: AdminToken, pool: &State<PgPool>) -> ApiResult<AdminResultsResponse> {
    let run = || -> Result<AdminResultsResponse, EngineError> {
        let mut conn = connect(pool)?;
        let questions = load_results(&mut conn)?;
        let submissions = load_scored_submissions(&mut conn, &questions)?;
        Ok(AdminResultsResponse {
            submissions,
            questions,
        })
    };
    run().map(Json).map_err(|err| engine_error_response(&err))
}

#[get("/admin/export")]
fn admin_export(
    _token: AdminToken,
    pool: &State<PgPool>,
) -> Result<CsvAttachment, Custom<Json<ApiErrorBody>>> {
    let run = || -> Result<String, EngineError> {
        let mut conn = connect(pool)?;
        let questions = load_results(&mut conn)?;
        let submissions = load_scored_submissions(&mut conn, &questions)?;
        Ok(export::to_table(&submissions, &questions))
    };
    match run() {
        Ok(table) => {
            let filename = format!("predictions-{}.csv", Utc::now().timestamp());
            Ok(CsvAttachment::new(table, &filename))
        }
        Err(err) => Err(engine_error_response(&err)),
    }
}

#[post("/admin/import", data = "<request>")]
fn admin_import(
    _token: AdminToken,
    request: Json<Vec<NewQuestion>>,
    pool: &State<PgPool>,
) -> ApiResult<rocket::serde::json::Value> {
    let run = || -> Result<u32, EngineError> {
        let mut conn = connect(pool)?;
        db_util::import_questions(&mut conn, &request)
    };
    match run() {
        Ok(imported) => Ok(Json(rocket::serde::json::json!({
            "success": true,
            "imported": imported,
        }))),
        Err(err) => Err(engine_error_response(&err)),
    }
}

#[catch(404)]
fn not_found() -> Json<ApiErrorBody> {
    not_found_error("The requested resource could not be found.")
}

#[catch(401)]
fn unauthorized() -> Json<ApiErrorBody> {
    unauthorized_error("Unauthorized")
}

#[catch(422)]
fn unprocessable() -> Json<ApiErrorBody> {
    bad_request_error("The request body was not in the expected format.")
}

#[catch(500)]
fn internal_error() -> Json<ApiErrorBody> {
    internal_error_body("Something went wrong. Please try again.")
}

#[launch]
fn rocket() -> _ {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pool = db_util::get_database_pool().expect("database pool must be available at startup");
    let secret = std::env::var("ADMIN_PASSWORD")
        .expect("ADMIN_PASSWORD environment variable is not set");

    rocket::build()
        .manage(pool)
        .manage(AdminConfig { secret })
        .attach(RequestTimingFairing)
        .attach(CorsFairing)
        .mount(
            "/",
            routes![
                create_submission,
                get_results,
                admin_auth,
                admin_results,
                admin_export,
                admin_import
            ],
        )
        .register("/", catchers![not_found, unauthorized, unprocessable, internal_error])
}
