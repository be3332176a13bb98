use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use crate::attendance::AbsenceEntry;
use crate::errors::AppError;

/// Natural key of an attendance session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionKey {
    pub module: String,
    pub date: String,
    /// Time-slot label, stored in the `timeslot` column.
    pub heure: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedSession {
    pub session_id: i64,
    pub rows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StoredAbsence {
    pub student_id: i64,
    pub status: String,
}

/// Id of the session row for `key`, inserting it on first use.
pub async fn find_or_create(conn: &mut PgConnection, key: &SessionKey) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sessions (module, date, timeslot) VALUES ($1, $2, $3) \
         ON CONFLICT (module, date, timeslot) DO UPDATE SET module = EXCLUDED.module \
         RETURNING id",
    )
    .bind(&key.module)
    .bind(&key.date)
    .bind(&key.heure)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn find_by_key(pool: &PgPool, key: &SessionKey) -> Result<Option<i64>, AppError> {
    let id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM sessions WHERE module = $1 AND date = $2 AND timeslot = $3",
    )
    .bind(&key.module)
    .bind(&key.date)
    .bind(&key.heure)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Write one absence row per entry in a single transaction. A student already
/// saved for this session is overwritten, so saving twice keeps one row.
pub async fn save_absences(
    pool: &PgPool,
    key: &SessionKey,
    entries: &[AbsenceEntry],
) -> Result<SavedSession, AppError> {
    let mut tx = pool.begin().await?;
    let session_id = find_or_create(&mut tx, key).await?;

    let mut rows = 0;
    for entry in entries {
        rows += sqlx::query(
            "INSERT INTO absences (session_id, student_id, status) VALUES ($1, $2, $3) \
             ON CONFLICT (session_id, student_id) \
             DO UPDATE SET status = EXCLUDED.status, saved_at = now()",
        )
        .bind(session_id)
        .bind(entry.id)
        .bind(&entry.status)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(SavedSession { session_id, rows })
}

pub async fn find_absences(pool: &PgPool, session_id: i64) -> Result<Vec<StoredAbsence>, AppError> {
    let rows = sqlx::query_as::<_, StoredAbsence>(
        "SELECT student_id, status FROM absences WHERE session_id = $1 ORDER BY student_id",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
