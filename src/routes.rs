use actix_web::{
    HttpResponse,
    error::{JsonPayloadError, PathError, QueryPayloadError},
    middleware::from_fn,
    web,
};

use crate::{
    api::{attendance, health},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};

fn json_error(err: JsonPayloadError) -> AppError {
    AppError::validation("body", err.to_string())
}

fn query_error(err: QueryPayloadError) -> AppError {
    AppError::validation("query", err.to_string())
}

fn path_error(err: PathError) -> AppError {
    AppError::validation("path", err.to_string())
}

async fn route_not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Route not found".to_string()))
}

/// Extractor failures render as validation errors instead of plain text.
pub fn extractor_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| json_error(err).into()))
        .app_data(web::QueryConfig::default().error_handler(|err, _| query_error(err).into()))
        .app_data(web::PathConfig::default().error_handler(|err, _| path_error(err).into()));
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    extractor_config(cfg);
    cfg.default_service(web::to(route_not_found));

    cfg.service(web::resource("/").route(web::get().to(health::index)));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(web::resource("/health").route(web::get().to(health::health)))
            // Public auth routes
            .service(
                web::scope("/auth")
                    .service(web::resource("/login").route(web::post().to(handlers::login)))
                    .service(web::resource("/register").route(web::post().to(handlers::register)))
                    .service(web::resource("/verify").route(web::get().to(handlers::verify))),
            )
            // Protected routes
            .service(
                web::scope("/attendance")
                    .wrap(from_fn(auth_middleware))
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::post().to(attendance::create_or_update_attendance)),
                    )
                    // /attendance/{id}: employee id on GET, record id on PUT and DELETE
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::put().to(attendance::update_attendance))
                            .route(web::delete().to(attendance::delete_attendance)),
                    )
                    // /attendance/{employee_id}/monthly
                    .service(
                        web::resource("/{employee_id}/monthly")
                            .route(web::get().to(attendance::monthly_attendance)),
                    ),
            ),
    );
}
