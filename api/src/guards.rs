//! Request guards for admin-gated routes.

use crate::AdminConfig;
use chrono::Utc;
use overunder_common::auth;
use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};

/// Proof that the request carried a valid admin bearer token.
///
/// All failure modes (missing header, malformed token, wrong secret, expired)
/// produce the same 401, so a caller cannot probe which check failed.
pub struct AdminToken;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = request.rocket().state::<AdminConfig>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };
        let token = request
            .headers()
            .get_one("Authorization")
            .and_then(|header| header.strip_prefix("Bearer "));
        match token {
            Some(token) if auth::validate_token(token, &config.secret, Utc::now()) => {
                Outcome::Success(AdminToken)
            }
            _ => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}
