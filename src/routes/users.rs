use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::error::{AppError, Result};
use crate::models::dto::UserRequest;
use crate::services::user_service::UserService;

/// GET /users
#[get("")]
pub async fn find_all(users: web::Data<UserService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(users.find_all().await?))
}

/// POST /users
#[post("")]
pub async fn create(
    users: web::Data<UserService>,
    body: web::Json<UserRequest>,
) -> Result<HttpResponse> {
    let (_, draft) = body.into_inner().into_draft()?;

    Ok(HttpResponse::Created().json(users.create(draft).await?))
}

/// PUT /users - l'id est dans le corps
#[put("")]
pub async fn update(
    users: web::Data<UserService>,
    body: web::Json<UserRequest>,
) -> Result<HttpResponse> {
    let (id, draft) = body.into_inner().into_draft()?;
    let id = id.ok_or_else(|| AppError::Validation("Empty id".to_string()))?;

    Ok(HttpResponse::Ok().json(users.update(id, draft).await?))
}

#[get("/{id}")]
pub async fn get_user_by_id(
    users: web::Data<UserService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(users.get_user_by_id(path.into_inner()).await?))
}

#[put("/{id}/friends/{friend_id}")]
pub async fn add_friend(
    users: web::Data<UserService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse> {
    let (id, friend_id) = path.into_inner();
    users.add_friend(id, friend_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[delete("/{id}/friends/{friend_id}")]
pub async fn delete_friend(
    users: web::Data<UserService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse> {
    let (id, friend_id) = path.into_inner();
    users.delete_friend(id, friend_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[get("/{id}/friends")]
pub async fn show_friends(
    users: web::Data<UserService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(users.show_friends(path.into_inner()).await?))
}

#[get("/{id}/friends/common/{other_id}")]
pub async fn show_common_friends(
    users: web::Data<UserService>,
    path: web::Path<(i32, i32)>,
) -> Result<HttpResponse> {
    let (id, other_id) = path.into_inner();

    Ok(HttpResponse::Ok().json(users.show_common_friends(id, other_id).await?))
}

pub fn users_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .service(find_all)
            .service(create)
            .service(update)
            .service(get_user_by_id)
            .service(add_friend)
            .service(delete_friend)
            .service(show_friends)
            .service(show_common_friends)
    );
}
