pub mod films;
pub mod genres;
pub mod health;
pub mod mpa;
pub mod users;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health_check)
        .configure(users::users_routes)
        .configure(films::films_routes)
        .configure(genres::genres_routes)
        .configure(mpa::mpa_routes);
}
