#![allow(dead_code, unused_macros)]

/// Génère un test `memory::<scénario>` et un test `sqlite::<scénario>` pour chaque scénario
/// `async fn(AppState)` du fichier appelant.
macro_rules! on_both_storages {
    ($($scenario:ident),* $(,)?) => {
        mod memory {
            $(
                #[actix_web::test]
                async fn $scenario() {
                    super::$scenario(crate::common::memory_state()).await;
                }
            )*
        }

        mod sqlite {
            $(
                #[actix_web::test]
                async fn $scenario() {
                    super::$scenario(crate::common::sqlite_state().await).await;
                }
            )*
        }
    };
}

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use std::path::{Path, PathBuf};

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{json, Value};

use filmorate::app::AppState;
use filmorate::db::{establish_connection, prepare_schema};
use filmorate::storage::Storages;

pub fn memory_state() -> AppState {
    AppState::new(Storages::in_memory())
}

/// Base SQLite en mémoire: une seule connexion, sinon chaque connexion aurait sa propre base
pub async fn sqlite_state() -> AppState {
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory sqlite");
    prepare_schema(&db).await.expect("Failed to prepare schema");

    AppState::new(Storages::database(db))
}

/// Base SQLite sur disque avec le pool par défaut (plusieurs connexions),
/// pour les tests qui lancent des requêtes en parallèle.
pub struct FileDb {
    pub conn: DatabaseConnection,
    path: PathBuf,
}

impl FileDb {
    pub async fn open(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("filmorate-{}-{}.db", name, std::process::id()));
        remove_sqlite_files(&path);

        let url = format!("sqlite://{}?mode=rwc", path.display());
        let conn = establish_connection(&url)
            .await
            .expect("Failed to open sqlite file");
        prepare_schema(&conn).await.expect("Failed to prepare schema");

        FileDb { conn, path }
    }

    pub async fn close(self) {
        let FileDb { conn, path } = self;
        conn.close().await.expect("Failed to close pool");
        remove_sqlite_files(&path);
    }
}

fn remove_sqlite_files(path: &Path) {
    for suffix in ["", "-wal", "-shm", "-journal"] {
        std::fs::remove_file(format!("{}{}", path.display(), suffix)).ok();
    }
}

/// Envoie la requête et renvoie le statut avec le corps JSON (None si vide)
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Option<Value>)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = test::call_service(app, req).await;
    let status = response.status();
    let body = test::read_body(response).await;

    if body.is_empty() {
        (status, None)
    } else {
        let value = serde_json::from_slice(&body).expect("Response body is not JSON");
        (status, Some(value))
    }
}

pub fn user_json(email: &str, login: &str) -> Value {
    json!({
        "email": email,
        "login": login,
        "birthday": "1946-08-20"
    })
}

pub fn film_json(name: &str, release_date: &str) -> Value {
    json!({
        "name": name,
        "description": "adipisicing",
        "releaseDate": release_date,
        "duration": 100,
        "mpa": {"id": 1}
    })
}

pub fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|item| item["id"].as_i64().expect("missing id"))
        .collect()
}
