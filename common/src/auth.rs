//! Admin token issuance and validation.
//!
//! The token is an opaque base64 encoding of `admin:{unix_millis}:{secret}`,
//! internal to this system only. The configured secret and the clock are
//! passed explicitly so rotation and expiry scenarios are deterministic in
//! tests. Rotating the secret invalidates every outstanding token, since
//! validation compares the embedded secret against the current one. There is
//! no rate limiting or lockout on issuance; this is a known scope limit.

use crate::{EngineError, TOKEN_LIFETIME_HOURS, TOKEN_MARKER};
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};

const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Mint a token if the candidate secret matches the configured one.
pub fn issue_token(
    candidate_secret: &str,
    configured_secret: &str,
    now: DateTime<Utc>,
) -> Result<String, EngineError> {
    if candidate_secret != configured_secret {
        return Err(EngineError::Unauthorized);
    }
    let payload = format!("{TOKEN_MARKER}:{}:{configured_secret}", now.timestamp_millis());
    Ok(BASE64.encode(payload))
}

/// Check a token against the currently configured secret.
///
/// Valid iff it decodes, carries the marker, embeds the current secret, and
/// was issued no more than [`TOKEN_LIFETIME_HOURS`] ago (and not in the
/// future). The token only stores whole milliseconds, so the age is
/// measured in whole milliseconds of `now` too; the lifetime boundary is
/// inclusive. All failure modes look the same to the caller.
pub fn validate_token(token: &str, configured_secret: &str, now: DateTime<Utc>) -> bool {
    let Ok(decoded) = BASE64.decode(token) else {
        return false;
    };
    let Ok(payload) = String::from_utf8(decoded) else {
        return false;
    };
    // The secret may itself contain colons, so split off at most two fields.
    let mut parts = payload.splitn(3, ':');
    let (Some(marker), Some(timestamp), Some(secret)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if marker != TOKEN_MARKER {
        return false;
    }
    let Ok(millis) = timestamp.parse::<i64>() else {
        return false;
    };
    let Some(age_millis) = now.timestamp_millis().checked_sub(millis) else {
        return false;
    };
    if age_millis < 0 || age_millis > TimeDelta::hours(TOKEN_LIFETIME_HOURS).num_milliseconds() {
        return false;
    }
    secret == configured_secret
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "hunter2";

    #[test_log::test]
    fn issue_and_validate_roundtrip() {
        let now = Utc::now();
        let token = issue_token(SECRET, SECRET, now).unwrap();
        assert!(validate_token(&token, SECRET, now));
    }

    #[test_log::test]
    fn wrong_secret_is_rejected_at_issue() {
        let result = issue_token("guess", SECRET, Utc::now());
        assert_eq!(result, Err(EngineError::Unauthorized));
    }

    #[test_log::test]
    fn accepted_just_before_expiry() {
        let issued = Utc::now();
        let token = issue_token(SECRET, SECRET, issued).unwrap();
        let later = issued + TimeDelta::hours(23) + TimeDelta::minutes(59);
        assert!(validate_token(&token, SECRET, later));
    }

    #[test_log::test]
    fn accepted_at_exactly_the_lifetime() {
        let issued = Utc::now();
        let token = issue_token(SECRET, SECRET, issued).unwrap();
        assert!(validate_token(&token, SECRET, issued + TimeDelta::hours(24)));
    }

    #[test_log::test]
    fn rejected_after_expiry() {
        let issued = Utc::now();
        let token = issue_token(SECRET, SECRET, issued).unwrap();
        let later = issued + TimeDelta::hours(24) + TimeDelta::minutes(1);
        assert!(!validate_token(&token, SECRET, later));
    }

    #[test_log::test]
    fn rejected_when_issued_in_the_future() {
        let issued = Utc::now();
        let token = issue_token(SECRET, SECRET, issued).unwrap();
        assert!(!validate_token(&token, SECRET, issued - TimeDelta::minutes(5)));
    }

    #[test_log::test]
    fn rotation_invalidates_outstanding_tokens() {
        let now = Utc::now();
        let token = issue_token("old-secret", "old-secret", now).unwrap();
        assert!(validate_token(&token, "old-secret", now));
        assert!(!validate_token(&token, "new-secret", now));
    }

    #[test_log::test]
    fn secret_with_colons_survives_the_roundtrip() {
        let secret = "with:colons:inside";
        let now = Utc::now();
        let token = issue_token(secret, secret, now).unwrap();
        assert!(validate_token(&token, secret, now));
    }

    #[test_log::test]
    fn malformed_tokens_are_rejected() {
        let now = Utc::now();
        assert!(!validate_token("not base64 at all!!", SECRET, now));
        assert!(!validate_token(&BASE64.encode("nonsense"), SECRET, now));
        assert!(!validate_token(&BASE64.encode("admin:notanumber:hunter2"), SECRET, now));
        let wrong_marker = BASE64.encode(format!("user:{}:{SECRET}", now.timestamp_millis()));
        assert!(!validate_token(&wrong_marker, SECRET, now));
    }
}
