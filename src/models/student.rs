use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;

/// Roster entry. Serialized as `{id, nom, prenom}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
}

impl Student {
    /// "Nom Prénom", as shown in the identity column.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.nom, self.prenom)
    }
}

/// Demo class inserted by `seed_demo` on an empty table.
pub const DEMO_ROSTER: [(&str, &str); 8] = [
    ("Dupont", "Jean"),
    ("Martin", "Sophie"),
    ("Bernard", "Luc"),
    ("Petit", "Marie"),
    ("Durand", "Pierre"),
    ("Leroy", "Camille"),
    ("Moreau", "Antoine"),
    ("Simon", "Laura"),
];

/// Whole roster ordered by last name, then first name.
pub async fn find_all(pool: &PgPool) -> Result<Vec<Student>, AppError> {
    let students = sqlx::query_as::<_, Student>(
        "SELECT id, nom, prenom FROM students ORDER BY nom, prenom, id",
    )
    .fetch_all(pool)
    .await?;
    Ok(students)
}

pub async fn count(pool: &PgPool) -> Result<i64, AppError> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

pub async fn create(pool: &PgPool, nom: &str, prenom: &str) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO students (nom, prenom) VALUES ($1, $2) RETURNING id",
    )
    .bind(nom)
    .bind(prenom)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Insert the demo roster when no student exists yet. Returns rows created.
pub async fn seed_demo(pool: &PgPool) -> Result<usize, AppError> {
    let existing = count(pool).await?;
    if existing > 0 {
        log::info!("Roster already has {} students, skipping demo seed", existing);
        return Ok(0);
    }
    for (nom, prenom) in DEMO_ROSTER {
        create(pool, nom, prenom).await?;
    }
    log::info!("Seeded {} demo students", DEMO_ROSTER.len());
    Ok(DEMO_ROSTER.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_is_nom_then_prenom() {
        let s = Student { id: 1, nom: "Dupont".into(), prenom: "Jean".into() };
        assert_eq!(s.display_name(), "Dupont Jean");
    }

    #[test]
    fn wire_shape() {
        let s = Student { id: 4, nom: "Petit".into(), prenom: "Marie".into() };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v, serde_json::json!({"id": 4, "nom": "Petit", "prenom": "Marie"}));
    }
}
