use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::error::{AppError, Result};
use crate::models::dto::{FilmRequest, PopularQuery};
use crate::services::film_service::FilmService;

const FILMS_COUNT: i64 = 10;

#[get("")]
pub async fn find_all(films: web::Data<FilmService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(films.find_all().await?))
}

#[post("")]
pub async fn create(
    films: web::Data<FilmService>,
    body: web::Json<FilmRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner().into_valid()?;

    Ok(HttpResponse::Created().json(films.create(request).await?))
}

/// PUT /films - l'id est dans le corps
#[put("")]
pub async fn update(
    films: web::Data<FilmService>,
    body: web::Json<FilmRequest>,
) -> Result<HttpResponse> {
    let request = body.into_inner().into_valid()?;
    let id = request
        .id
        .ok_or_else(|| AppError::Validation("Empty id".to_string()))?;

    Ok(HttpResponse::Ok().json(films.update(id, request).await?))
}

/// GET /films/popular?count=N
/// Déclarée avant /{id} pour que "popular" ne soit pas lu comme un id
#[get("/popular")]
pub async fn show_most_popular_films(
    films: web::Data<FilmService>,
    query: web::Query<PopularQuery>,
) -> Result<HttpResponse> {
    let count = query.count.unwrap_or(FILMS_COUNT);

    Ok(HttpResponse::Ok().json(films.show_most_popular_films(count).await?))
}

#[get("/{id}")]
pub async fn get_film_by_id(
    films: web::Data<FilmService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(films.get_film_by_id(path.into_inner()).await?))
}

#[put("/{id}/like/{user_id}")]
pub async fn add_like(
    films: web::Data<FilmService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse> {
    let (id, user_id) = path.into_inner();
    films.add_like(id, user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{id}/like/{user_id}")]
pub async fn delete_like(
    films: web::Data<FilmService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse> {
    let (id, user_id) = path.into_inner();
    films.delete_like(id, user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

pub fn films_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/films")
            .service(find_all)
            .service(create)
            .service(update)
            .service(show_most_popular_films)
            .service(get_film_by_id)
            .service(add_like)
            .service(delete_like)
    );
}
