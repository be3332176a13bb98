//! JSON persistence endpoints: roster fetch and session save.

use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::attendance::AbsenceEntry;
use crate::attendance::client::SAVE_OK_MESSAGE;
use crate::models::session::{self, SessionKey};
use crate::models::student;

pub const INVALID_REQUEST_MESSAGE: &str = "Requête invalide ou données manquantes.";

/// Rejects mutation requests that are not `application/json`. Browsers cannot
/// send cross-origin JSON with cookies through a plain form post.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "message": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Configure `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/students", web::get().to(students))
            .route("/absences", web::post().to(save_absences)),
    );
}

/// GET /api/students
pub async fn students(pool: web::Data<PgPool>) -> HttpResponse {
    match student::find_all(&pool).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => {
            log::error!("Roster query failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Erreur DB: {e}")
            }))
        }
    }
}

/// Student ids arrive as numbers or as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StudentRef {
    Number(i64),
    Text(String),
}

impl StudentRef {
    fn as_id(&self) -> Option<i64> {
        match self {
            StudentRef::Number(n) => Some(*n),
            StudentRef::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionFields {
    module: Option<String>,
    date: Option<String>,
    heure: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AbsenceItem {
    id: Option<StudentRef>,
    status: Option<String>,
}

/// Items stay raw so that one malformed entry does not reject the others.
#[derive(Debug, Deserialize)]
struct SaveRequest {
    session: Option<SessionFields>,
    absences: Option<Vec<serde_json::Value>>,
}

impl AbsenceItem {
    fn into_entry(self) -> Option<AbsenceEntry> {
        Some(AbsenceEntry {
            id: self.id?.as_id()?,
            status: self.status?,
        })
    }
}

/// Parse a save body. `None` when the body is not JSON or a required field
/// is missing. Absence items without a usable id or status are dropped.
pub fn parse_save_request(body: &[u8]) -> Option<(SessionKey, Vec<AbsenceEntry>)> {
    let req: SaveRequest = serde_json::from_slice(body).ok()?;
    let fields = req.session?;
    let items = req.absences?;
    let key = SessionKey {
        module: fields.module?,
        date: fields.date?,
        heure: fields.heure?,
    };
    let entries = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<AbsenceItem>(item).ok()?.into_entry())
        .collect();
    Some((key, entries))
}

/// POST /api/absences
pub async fn save_absences(pool: web::Data<PgPool>, body: web::Bytes) -> HttpResponse {
    let Some((key, entries)) = parse_save_request(&body) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "message": INVALID_REQUEST_MESSAGE
        }));
    };

    match session::save_absences(&pool, &key, &entries).await {
        Ok(saved) => {
            log::info!(
                "API saved {} absences for session {} ({} {} {})",
                saved.rows,
                saved.session_id,
                key.module,
                key.date,
                key.heure
            );
            HttpResponse::Ok().json(serde_json::json!({
                "message": SAVE_OK_MESSAGE,
                "sessionId": saved.session_id
            }))
        }
        Err(e) => {
            log::error!("API save failed: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": format!("Erreur lors de l'enregistrement : {e}")
            }))
        }
    }
}
