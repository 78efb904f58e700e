mod auth;
mod config;
mod database;
mod error;
mod export;
mod handlers;
mod models;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::auth::SessionAuth;
use crate::config::AppConfig;
use crate::database::Database;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|err| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;
    let bind_address = config.bind_address();

    let db = Database::connect(&config.db_path).await.map_err(|err| {
        log::error!("Failed to open database at {}: {err:?}", config.db_path);
        std::io::Error::new(std::io::ErrorKind::Other, err)
    })?;

    db.init().await.map_err(|err| {
        log::error!("Failed to initialize DB schema: {err:?}");
        std::io::Error::new(std::io::ErrorKind::Other, err)
    })?;
    log::info!("DB schema ensured at {}", config.db_path);

    let session_auth = SessionAuth::new(&config.session_secret, config.admin_password.clone());

    let db_data = web::Data::new(db);
    let auth_data = web::Data::new(session_auth);

    log::info!("🚀 Starting QR Feedback Service on {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(db_data.clone())
            .app_data(auth_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
