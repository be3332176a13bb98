use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use absences::attendance::{BoardStore, PgSessionClient, store};
use absences::config::AppConfig;
use absences::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // loads .env first, so RUST_LOG may come from it
    let config = AppConfig::from_env();
    env_logger::init();

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            log::error!("Configuration error: {e}");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;
    if config.seed_demo_roster {
        db::seed_roster(&pool).await;
    }

    // Session encryption key, from SESSION_KEY so sessions survive restarts
    let secret_key = match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let boards = BoardStore::with_capacity(config.max_boards);
    store::spawn_sweeper(boards.clone(), config.board_idle);

    let client = PgSessionClient::new(pool.clone());
    let settings = config.board_settings();
    log::info!(
        "Starting server at http://{} ({} slots per day)",
        config.bind_addr,
        settings.schedule.len()
    );

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(boards.clone()))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(settings.clone()))
            .service(actix_files::Files::new("/static", "./static"))
            .configure(handlers::api_handlers::configure)
            .configure(handlers::attendance_handlers::configure::<PgSessionClient>)
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
