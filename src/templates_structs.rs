use actix_session::Session;
use askama::Template;

use crate::attendance::Grid;
use crate::csrf;

pub const APP_NAME: &str = "Gestion des Absences";

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert("flash", message);
}

/// Common context shared by all pages.
pub struct PageContext {
    pub app_name: String,
    pub flash: Option<String>,
    pub csrf_token: String,
    /// Server date, shown until the page clock takes over.
    pub today_label: String,
    pub now_label: String,
}

impl PageContext {
    pub fn build(session: &Session) -> Self {
        let now = chrono::Local::now();
        Self {
            app_name: APP_NAME.to_string(),
            flash: take_flash(session),
            csrf_token: csrf::get_or_create_token(session),
            today_label: now.format("%d/%m/%Y").to_string(),
            now_label: now.format("%H:%M:%S").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "attendance.html")]
pub struct AttendancePageTemplate {
    pub ctx: PageContext,
    pub module: String,
    pub date: String,
    /// Present once a session is open.
    pub grid: Option<Grid>,
    pub csrf_token: String,
}

/// Grid alone, returned after every gesture.
#[derive(Template)]
#[template(path = "attendance/_grid.html")]
pub struct GridTemplate {
    pub grid: Grid,
    pub csrf_token: String,
}
