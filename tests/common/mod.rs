//! Shared test infrastructure.
//!
//! - `FakeClient` - in-memory `SessionClient` that records submissions
//! - `setup_test_db()` - migrated PostgreSQL pool, or `None` when
//!   `TEST_DATABASE_URL` is not set (database tests then return early)
//! - `unreachable_pool()` - lazy pool pointing at a closed port

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use absences::attendance::{AbsenceEntry, ClientError, SaveConfirmation, SessionClient};
use absences::db::MIGRATOR;
use absences::models::session::SessionKey;
use absences::models::student::Student;

// ============================================================================
// FAKE CLIENT
// ============================================================================

#[derive(Clone, Default)]
pub struct FakeClient {
    pub roster: Vec<Student>,
    pub fail_roster: bool,
    pub fail_save: bool,
    pub submitted: Arc<Mutex<Vec<(SessionKey, Vec<AbsenceEntry>)>>>,
}

impl FakeClient {
    pub fn with_roster(roster: Vec<Student>) -> Self {
        Self { roster, ..Self::default() }
    }

    pub fn submissions(&self) -> Vec<(SessionKey, Vec<AbsenceEntry>)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl SessionClient for FakeClient {
    async fn fetch_roster(&self) -> Result<Vec<Student>, ClientError> {
        if self.fail_roster {
            return Err(ClientError::RosterUnavailable("connection refused".into()));
        }
        Ok(self.roster.clone())
    }

    async fn submit(
        &self,
        key: &SessionKey,
        entries: &[AbsenceEntry],
    ) -> Result<SaveConfirmation, ClientError> {
        if self.fail_save {
            return Err(ClientError::SaveFailed("connection reset".into()));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push((key.clone(), entries.to_vec()));
        Ok(SaveConfirmation {
            message: "Absences enregistrées avec succès.".into(),
            session_id: submitted.len() as i64,
        })
    }
}

pub fn student(id: i64, nom: &str, prenom: &str) -> Student {
    Student { id, nom: nom.to_string(), prenom: prenom.to_string() }
}

// ============================================================================
// DATABASE SETUP
// ============================================================================

pub struct TestDb {
    pool: PgPool,
}

impl TestDb {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `TEST_DATABASE_URL` and run migrations.
///
/// Tests share the database, so each test works with its own module names
/// and students rather than relying on empty tables.
pub async fn setup_test_db() -> Option<TestDb> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        }
    };
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    Some(TestDb { pool })
}

/// Pool that fails on first use, for error paths.
pub fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_millis(500))
        .connect_lazy("postgres://absences@127.0.0.1:1/absences")
        .expect("lazy pool")
}
