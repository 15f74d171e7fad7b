//! services/api/src/adapters/pg_store.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `SessionStore` port backed by PostgreSQL via `sqlx`.
//! The asked-question list and answer map are stored as JSON text columns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interview_core::domain::{AnswerRecord, AskedQuestion, Session};
use interview_core::ports::{PortError, PortResult, SessionStore};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A PostgreSQL-backed `SessionStore`.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Creates a new `PgSessionStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
struct AskedJson {
    question_id: String,
    issued_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
struct AnswerJson {
    text: String,
    time_spent_seconds: u32,
    submitted_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct SessionRow {
    token: String,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    asked: String,
    answers: String,
}

impl SessionRow {
    fn to_domain(self) -> PortResult<Session> {
        let asked: Vec<AskedJson> = serde_json::from_str(&self.asked)
            .map_err(|e| PortError::Unexpected(format!("corrupt asked column: {e}")))?;
        let answers: HashMap<String, AnswerJson> = serde_json::from_str(&self.answers)
            .map_err(|e| PortError::Unexpected(format!("corrupt answers column: {e}")))?;
        Ok(Session {
            token: self.token,
            created_at: self.created_at,
            last_activity: self.last_activity,
            completed: self.completed,
            completed_at: self.completed_at,
            asked: asked
                .into_iter()
                .map(|a| AskedQuestion {
                    question_id: a.question_id,
                    issued_at: a.issued_at,
                })
                .collect(),
            answers: answers
                .into_iter()
                .map(|(id, a)| {
                    (
                        id,
                        AnswerRecord {
                            text: a.text,
                            time_spent_seconds: a.time_spent_seconds,
                            submitted_at: a.submitted_at,
                        },
                    )
                })
                .collect(),
        })
    }
}

fn encode_columns(session: &Session) -> PortResult<(String, String)> {
    let asked: Vec<AskedJson> = session
        .asked
        .iter()
        .map(|a| AskedJson {
            question_id: a.question_id.clone(),
            issued_at: a.issued_at,
        })
        .collect();
    let answers: HashMap<&String, AnswerJson> = session
        .answers
        .iter()
        .map(|(id, a)| {
            (
                id,
                AnswerJson {
                    text: a.text.clone(),
                    time_spent_seconds: a.time_spent_seconds,
                    submitted_at: a.submitted_at,
                },
            )
        })
        .collect();
    let asked = serde_json::to_string(&asked)
        .map_err(|e| PortError::Unexpected(format!("encode asked: {e}")))?;
    let answers = serde_json::to_string(&answers)
        .map_err(|e| PortError::Unexpected(format!("encode answers: {e}")))?;
    Ok((asked, answers))
}

fn map_db_error(e: sqlx::Error) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound("session".to_string()),
        other => PortError::Unexpected(other.to_string()),
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: Session) -> PortResult<()> {
        let (asked, answers) = encode_columns(&session)?;
        sqlx::query(
            "INSERT INTO interview_sessions \
             (token, created_at, last_activity, completed, completed_at, asked, answers) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&session.token)
        .bind(session.created_at)
        .bind(session.last_activity)
        .bind(session.completed)
        .bind(session.completed_at)
        .bind(asked)
        .bind(answers)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(())
    }

    async fn load(&self, token: &str) -> PortResult<Session> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT token, created_at, last_activity, completed, completed_at, asked, answers \
             FROM interview_sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?
        .ok_or_else(|| PortError::NotFound(format!("session {token}")))?;
        row.to_domain()
    }

    async fn save(&self, session: &Session) -> PortResult<()> {
        let (asked, answers) = encode_columns(session)?;
        sqlx::query(
            "INSERT INTO interview_sessions \
             (token, created_at, last_activity, completed, completed_at, asked, answers) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (token) DO UPDATE SET \
             last_activity = EXCLUDED.last_activity, \
             completed = EXCLUDED.completed, \
             completed_at = EXCLUDED.completed_at, \
             asked = EXCLUDED.asked, \
             answers = EXCLUDED.answers",
        )
        .bind(&session.token)
        .bind(session.created_at)
        .bind(session.last_activity)
        .bind(session.completed)
        .bind(session.completed_at)
        .bind(asked)
        .bind(answers)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(())
    }

    async fn delete(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM interview_sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(())
    }

    async fn list(&self) -> PortResult<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT token, created_at, last_activity, completed, completed_at, asked, answers \
             FROM interview_sessions ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        rows.into_iter().map(SessionRow::to_domain).collect()
    }
}
