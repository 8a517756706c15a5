use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use crate::config::StorageKind;
use crate::models::health::HealthResponse;

#[get("/health")]
pub async fn health_check(storage: web::Data<StorageKind>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        storage: storage.to_string(),
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
