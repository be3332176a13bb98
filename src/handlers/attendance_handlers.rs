use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;

use crate::attendance::{Board, BoardStore, CellRef, Gesture, SessionClient, Slot, StudentId};
use crate::config::BoardSettings;
use crate::csrf;
use crate::errors::{AppError, render};
use crate::templates_structs::{AttendancePageTemplate, GridTemplate, PageContext, set_flash};

const BOARD_KEY: &str = "board_id";

#[derive(Debug, Deserialize)]
pub struct SessionForm {
    pub module: String,
    pub date: String,
    pub csrf_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

fn board_id(session: &Session) -> Option<String> {
    session.get::<String>(BOARD_KEY).unwrap_or(None)
}

/// Register the page routes for a given persistence client.
pub fn configure<C: SessionClient + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/session", web::post().to(open_session::<C>))
        .route("/session/close", web::post().to(close_session))
        .route("/cells/{student_id}/{slot}/{action}", web::post().to(gesture))
        .route("/slots/{slot}/save", web::post().to(save_slot::<C>));
}

/// GET /: session form, plus the grid of the open board.
pub async fn index(
    session: Session,
    store: web::Data<BoardStore>,
    settings: web::Data<BoardSettings>,
) -> Result<HttpResponse, AppError> {
    let board = match board_id(&session) {
        Some(id) => {
            let board = store.snapshot(&id)?;
            if board.is_none() {
                // evicted while idle
                session.remove(BOARD_KEY);
                set_flash(&session, "La session de saisie a expiré, veuillez la rouvrir.");
            }
            board
        }
        None => None,
    };

    let ctx = PageContext::build(&session);
    let csrf_token = ctx.csrf_token.clone();
    let tmpl = match board {
        Some(board) => AttendancePageTemplate {
            ctx,
            grid: Some(board.render()),
            module: board.module,
            date: board.date,
            csrf_token,
        },
        None => AttendancePageTemplate {
            ctx,
            module: settings.default_module.clone(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            grid: None,
            csrf_token,
        },
    };
    render(tmpl)
}

/// POST /session: fetch the roster and open a fresh board.
pub async fn open_session<C: SessionClient + 'static>(
    session: Session,
    store: web::Data<BoardStore>,
    settings: web::Data<BoardSettings>,
    client: web::Data<C>,
    form: web::Form<SessionForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let module = form.module.trim();
    let date = form.date.trim();
    if module.is_empty() || date.is_empty() {
        set_flash(&session, "Le module et la date sont obligatoires.");
        return Ok(see_other("/"));
    }

    let roster = match client.fetch_roster().await {
        Ok(roster) => roster,
        Err(e) => {
            log::warn!("Roster fetch failed: {e}");
            set_flash(&session, &e.to_string());
            return Ok(see_other("/"));
        }
    };

    if let Some(old) = board_id(&session) {
        store.close(&old)?;
    }

    let students = roster.len();
    let board = Board::new(module.to_string(), date.to_string(), roster, settings.schedule.clone());
    let id = store.open(board)?;
    session
        .insert(BOARD_KEY, &id)
        .map_err(|e| AppError::Session(e.to_string()))?;
    log::info!("Opened board for {} on {} ({} students)", module, date, students);

    Ok(see_other("/"))
}

/// POST /session/close
pub async fn close_session(
    session: Session,
    store: web::Data<BoardStore>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    if let Some(id) = board_id(&session) {
        store.close(&id)?;
        session.remove(BOARD_KEY);
    }
    Ok(see_other("/"))
}

/// POST /cells/{student_id}/{slot}/{cycle|cancel}: apply a gesture and
/// answer with the re-rendered grid.
pub async fn gesture(
    req: HttpRequest,
    session: Session,
    store: web::Data<BoardStore>,
    path: web::Path<(StudentId, Slot, String)>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_header(&session, &req)?;

    let (student_id, slot, action) = path.into_inner();
    let gesture = Gesture::from_action(&action).ok_or(AppError::NotFound)?;
    let id = board_id(&session).ok_or(AppError::NotFound)?;

    let grid = store.apply(&id, gesture, CellRef { student_id, slot })?;
    render(GridTemplate {
        grid,
        csrf_token: csrf::get_or_create_token(&session),
    })
}

/// POST /slots/{slot}/save: flatten one slot and hand it to the client.
/// The board is kept as is whatever the outcome.
pub async fn save_slot<C: SessionClient + 'static>(
    session: Session,
    store: web::Data<BoardStore>,
    client: web::Data<C>,
    path: web::Path<Slot>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let slot = path.into_inner();
    let board = match board_id(&session) {
        Some(id) => store.snapshot(&id)?,
        None => None,
    };
    let Some(board) = board else {
        set_flash(&session, "Aucune session de saisie ouverte.");
        return Ok(see_other("/"));
    };

    let key = board.session_key(slot).ok_or(AppError::NotFound)?;
    let entries = board.flatten(slot);

    match client.submit(&key, &entries).await {
        Ok(confirmation) => set_flash(&session, &confirmation.message),
        Err(e) => {
            log::error!("Save of {} {} {} failed: {e}", key.module, key.date, key.heure);
            set_flash(&session, &e.to_string());
        }
    }
    Ok(see_other("/"))
}
