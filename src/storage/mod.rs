// ============================================================================
// STORAGE - capacités de stockage
// ============================================================================
//
// Deux implémentations interchangeables derrière les mêmes traits:
//   - memory   : tables en mémoire, un verrou par agrégat (users / films)
//   - database : SeaORM (PostgreSQL ou SQLite), une transaction par mutation,
//                lignes verrouillées (FOR UPDATE) ou écritures sérialisées (SQLite)
//
// Les règles métier (machine à états des amitiés, classement par popularité)
// vivent dans `friendship` et `popularity` et sont appliquées par les deux.
//
// ============================================================================

pub mod database;
pub mod friendship;
pub mod memory;
pub mod popularity;

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::config::StorageKind;
use crate::error::Result;
use crate::models::dto::{Film, FilmDraft, Genre, Mpa, User, UserDraft};

/// Valeurs pré-remplies des dictionnaires
pub const GENRES: [(i32, &str); 6] = [
    (1, "Комедия"),
    (2, "Драма"),
    (3, "Мультфильм"),
    (4, "Триллер"),
    (5, "Документальный"),
    (6, "Боевик"),
];

pub const MPA_RATINGS: [(i32, &str); 5] = [
    (1, "G"),
    (2, "PG"),
    (3, "PG-13"),
    (4, "R"),
    (5, "NC-17"),
];

#[async_trait]
pub trait Storage<T, D>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<T>>;

    async fn create(&self, draft: D) -> Result<T>;

    /// Remplace les champs modifiables; NotFound si l'id n'existe pas
    async fn update(&self, id: i32, draft: D) -> Result<T>;

    async fn get_by_id(&self, id: i32) -> Result<T>;
}

#[async_trait]
pub trait UserStorage: Storage<User, UserDraft> {
    async fn add_friend(&self, user_id: i32, friend_id: i32) -> Result<()>;

    async fn delete_friend(&self, user_id: i32, friend_id: i32) -> Result<()>;

    /// Toutes les arêtes sortantes de `user_id`, quel que soit leur statut
    async fn show_friends(&self, user_id: i32) -> Result<Vec<User>>;

    async fn show_common_friends(&self, user_id: i32, other_id: i32) -> Result<Vec<User>>;
}

#[async_trait]
pub trait FilmStorage: Storage<Film, FilmDraft> {
    async fn add_like(&self, film_id: i32, user_id: i32) -> Result<()>;

    async fn delete_like(&self, film_id: i32, user_id: i32) -> Result<()>;

    async fn show_most_popular(&self, count: usize) -> Result<Vec<Film>>;
}

/// Tables de référence en lecture seule
#[async_trait]
pub trait Dictionary<T>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<T>>;

    async fn get_by_id(&self, id: i32) -> Result<T>;
}

#[derive(Clone)]
pub struct Storages {
    pub kind: StorageKind,
    pub users: Arc<dyn UserStorage>,
    pub films: Arc<dyn FilmStorage>,
    pub genres: Arc<dyn Dictionary<Genre>>,
    pub mpa: Arc<dyn Dictionary<Mpa>>,
}

impl Storages {
    pub fn in_memory() -> Self {
        Storages {
            kind: StorageKind::Memory,
            users: Arc::new(memory::InMemoryUserStorage::default()),
            films: Arc::new(memory::InMemoryFilmStorage::default()),
            genres: Arc::new(memory::InMemoryDictionary::genres()),
            mpa: Arc::new(memory::InMemoryDictionary::mpa()),
        }
    }

    /// Le schéma doit déjà exister (voir `db::prepare_schema`)
    pub fn database(db: DatabaseConnection) -> Self {
        // une seule porte: SQLite verrouille tout le fichier
        let gate = database::WriteGate::for_backend(db.get_database_backend());

        Storages {
            kind: StorageKind::Database,
            users: Arc::new(database::DbUserStorage::new(db.clone(), gate.clone())),
            films: Arc::new(database::DbFilmStorage::new(db.clone(), gate)),
            genres: Arc::new(database::DbGenreDictionary::new(db.clone())),
            mpa: Arc::new(database::DbMpaDictionary::new(db)),
        }
    }
}
