//! Interfaces between the engine and the Postgres database.
//!
//! Each entity keeps its `table!` definition and row structs in its own file
//! with a private/public split: `*Private` structs mirror the SQL types,
//! the crate-level records use unsigned ids, and conversions are checked.
//! Every Diesel error is mapped to the [`EngineError`] taxonomy before it
//! leaves this module; raw database detail goes to the log, not the caller.

pub mod conversions;
mod questions;
mod submission;
mod submissions;

pub use questions::{get_active_questions, get_question_texts, import_questions};
pub use submission::insert_submission;
pub use submissions::{
    count_submissions, email_exists, get_all_answers, get_submissions_with_answers,
};

use crate::EngineError;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};

pub type PgPool = Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

impl From<diesel::result::Error> for EngineError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) if info
                .constraint_name()
                .is_some_and(|name| name.contains("email")) =>
            {
                // The uniqueness constraint is the arbiter of duplicate
                // submission races, so the loser gets the specific error.
                EngineError::DuplicateEmail
            }
            other => {
                log::error!("database query failed: {other}");
                EngineError::storage(other.to_string())
            }
        }
    }
}

/// Build a connection pool from `DATABASE_URL` (environment or `.env`).
pub fn get_database_pool() -> Result<PgPool, EngineError> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| EngineError::storage("DATABASE_URL environment variable is not set"))?;
    Pool::builder()
        .build(ConnectionManager::new(database_url))
        .map_err(|err| EngineError::storage(err.to_string()))
}

/// Check out a connection, mapping pool exhaustion to a storage error.
pub fn get_pooled_database_connection(pool: &PgPool) -> Result<PgPooledConnection, EngineError> {
    pool.get().map_err(|err| EngineError::storage(err.to_string()))
}
