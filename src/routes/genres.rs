use actix_web::{get, web, HttpResponse};

use crate::error::Result;
use crate::services::dictionary_service::GenreService;

#[get("")]
pub async fn find_all(genres: web::Data<GenreService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(genres.find_all().await?))
}

#[get("/{id}")]
pub async fn get_genre_by_id(
    genres: web::Data<GenreService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(genres.get_by_id(path.into_inner()).await?))
}

pub fn genres_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/genres")
            .service(find_all)
            .service(get_genre_by_id)
    );
}
