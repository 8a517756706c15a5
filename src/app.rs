use actix_web::{error, web};

use crate::config::StorageKind;
use crate::error::AppError;
use crate::routes;
use crate::services::dictionary_service::{GenreService, MpaService};
use crate::services::film_service::FilmService;
use crate::services::user_service::UserService;
use crate::storage::Storages;

/// Services partagés entre tous les workers actix
#[derive(Clone)]
pub struct AppState {
    storage: web::Data<StorageKind>,
    users: web::Data<UserService>,
    films: web::Data<FilmService>,
    genres: web::Data<GenreService>,
    mpa: web::Data<MpaService>,
}

impl AppState {
    pub fn new(storages: Storages) -> Self {
        AppState {
            storage: web::Data::new(storages.kind),
            users: web::Data::new(UserService::new(storages.users.clone())),
            films: web::Data::new(FilmService::new(
                storages.films,
                storages.users,
                storages.genres.clone(),
                storages.mpa.clone(),
            )),
            genres: web::Data::new(GenreService::new(storages.genres)),
            mpa: web::Data::new(MpaService::new(storages.mpa)),
        }
    }

    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.storage.clone())
            .app_data(self.users.clone())
            .app_data(self.films.clone())
            .app_data(self.genres.clone())
            .app_data(self.mpa.clone())
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .configure(routes::configure_routes);
    }
}

// Corps JSON illisible -> 400 avec le même format que les autres erreurs
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::error!(error = %err, "Json parse error");
        error::Error::from(AppError::Validation("Json parse error".to_string()))
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        tracing::warn!(error = %err, "Incorrect path parameter");
        error::Error::from(AppError::Validation("Incorrect path parameter".to_string()))
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::warn!(error = %err, "Incorrect query parameter");
        error::Error::from(AppError::Validation("Incorrect query parameter".to_string()))
    })
}
