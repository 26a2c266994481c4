use actix_web::{HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the Attendance & Salary API",
        "version": env!("CARGO_PKG_VERSION"),
        "documentation": "/swagger-ui/"
    }))
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = Object, example = json!({
            "status": "OK",
            "message": "Attendance API is running",
            "timestamp": "2024-03-05T09:00:00Z"
        }))
    ),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "message": "Attendance API is running",
        "timestamp": Utc::now().to_rfc3339()
    }))
}
