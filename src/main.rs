use actix_web::http::StatusCode;
use actix_web::middleware::{Condition, ErrorHandlers, Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod state;
mod store;


use config::Config;
use db::init_db;
use state::AppState;
use store::MySqlStore;

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(env = %config.app_env, "Server starting...");

    let state = match &config.database_url {
        Some(url) => {
            let pool = init_db(url, config.run_migrations).await?;
            info!("Connected to MySQL");
            AppState::mysql(MySqlStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; running on the in-memory store, data is lost on exit");
            AppState::in_memory()
        }
    };

    let server_addr = config.server_addr.clone();
    let development = config.is_development();

    HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(
                development,
                ErrorHandlers::new().handler(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error::expose_internal_details,
                ),
            ))
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard serves the JS/CSS assets
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(state.clone()))
            .app_data(Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
