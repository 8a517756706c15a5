use actix_web::{get, web, HttpResponse};

use crate::error::Result;
use crate::services::dictionary_service::MpaService;

#[get("")]
pub async fn find_all(mpa: web::Data<MpaService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(mpa.find_all().await?))
}

#[get("/{id}")]
pub async fn get_mpa_by_id(
    mpa: web::Data<MpaService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(mpa.get_by_id(path.into_inner()).await?))
}

pub fn mpa_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/mpa")
            .service(find_all)
            .service(get_mpa_by_id)
    );
}
