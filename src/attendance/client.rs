use std::fmt;

use sqlx::PgPool;

use super::state::AbsenceEntry;
use crate::models::session::{self, SessionKey};
use crate::models::student::{self, Student};

pub const SAVE_OK_MESSAGE: &str = "Absences enregistrées avec succès.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    RosterUnavailable(String),
    SaveFailed(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::RosterUnavailable(e) => write!(f, "Erreur lors du chargement des étudiants : {e}"),
            ClientError::SaveFailed(e) => write!(f, "Erreur lors de l'enregistrement : {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfirmation {
    pub message: String,
    pub session_id: i64,
}

/// Boundary to the persistence service: roster in, absences out.
#[allow(async_fn_in_trait)]
pub trait SessionClient {
    async fn fetch_roster(&self) -> Result<Vec<Student>, ClientError>;

    async fn submit(
        &self,
        key: &SessionKey,
        entries: &[AbsenceEntry],
    ) -> Result<SaveConfirmation, ClientError>;
}

/// Talks to the database directly through the shared pool.
#[derive(Clone)]
pub struct PgSessionClient {
    pool: PgPool,
}

impl PgSessionClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionClient for PgSessionClient {
    async fn fetch_roster(&self) -> Result<Vec<Student>, ClientError> {
        student::find_all(&self.pool)
            .await
            .map_err(|e| ClientError::RosterUnavailable(e.to_string()))
    }

    async fn submit(
        &self,
        key: &SessionKey,
        entries: &[AbsenceEntry],
    ) -> Result<SaveConfirmation, ClientError> {
        let saved = session::save_absences(&self.pool, key, entries)
            .await
            .map_err(|e| ClientError::SaveFailed(e.to_string()))?;
        log::info!(
            "Saved {} absences for session {} ({} {} {})",
            saved.rows,
            saved.session_id,
            key.module,
            key.date,
            key.heure
        );
        Ok(SaveConfirmation {
            message: SAVE_OK_MESSAGE.to_string(),
            session_id: saved.session_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_payload_shape() {
        let key = SessionKey {
            module: "R209".into(),
            date: "2025-06-02".into(),
            heure: "08h30 - 10h00".into(),
        };
        let entries = vec![
            AbsenceEntry { id: 1, status: "abi".into() },
            AbsenceEntry { id: 2, status: "present".into() },
        ];
        let body = serde_json::json!({ "session": key, "absences": entries });
        assert_eq!(
            body,
            serde_json::json!({
                "session": {"module": "R209", "date": "2025-06-02", "heure": "08h30 - 10h00"},
                "absences": [{"id": 1, "status": "abi"}, {"id": 2, "status": "present"}]
            })
        );
    }

    #[test]
    fn error_messages() {
        let e = ClientError::RosterUnavailable("timeout".into());
        assert_eq!(e.to_string(), "Erreur lors du chargement des étudiants : timeout");
        let e = ClientError::SaveFailed("timeout".into());
        assert_eq!(e.to_string(), "Erreur lors de l'enregistrement : timeout");
    }
}
