use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::dto::{Film, FilmDraft, Genre, Mpa, User, UserDraft};
use crate::models::{film_genre, films, friendship, genres, likes, mpa, users};
use crate::storage::friendship::{plan_add_friend, plan_delete_friend, EdgeChange, FriendshipEdge};
use crate::storage::{Dictionary, FilmStorage, Storage, UserStorage};

// ============================================================================
// VERROUS
// ============================================================================

/// SQLite n'a pas de verrou de ligne: les écritures du processus passent une à une.
/// Sur PostgreSQL la porte est vide, les lignes sont verrouillées avec FOR UPDATE.
#[derive(Clone, Default)]
pub struct WriteGate(Option<Arc<Mutex<()>>>);

impl WriteGate {
    pub fn for_backend(backend: DbBackend) -> Self {
        match backend {
            DbBackend::Sqlite => WriteGate(Some(Arc::new(Mutex::new(())))),
            _ => WriteGate(None),
        }
    }

    async fn enter(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.0 {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

/// SELECT ... FOR UPDATE (ignoré sur SQLite, voir `WriteGate`)
fn for_update<E: EntityTrait>(select: Select<E>, backend: DbBackend) -> Select<E> {
    match backend {
        DbBackend::Sqlite => select,
        _ => select.lock_exclusive(),
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ============================================================================
// USERS + FRIENDSHIP
// ============================================================================

pub struct DbUserStorage {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl DbUserStorage {
    pub fn new(db: DatabaseConnection, gate: WriteGate) -> Self {
        DbUserStorage { db, gate }
    }
}

fn to_user(model: users::Model, friends: BTreeSet<i32>) -> User {
    User {
        id: model.id,
        email: model.email,
        login: model.login,
        name: model.name,
        birthday: model.birthday,
        friends,
    }
}

/// Ajoute à chaque utilisateur l'ensemble de ses arêtes sortantes (1 seule requête)
async fn decorate_users<C: ConnectionTrait>(conn: &C, models: Vec<users::Model>) -> Result<Vec<User>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let rows = friendship::Entity::find()
        .filter(friendship::Column::UserId.is_in(ids))
        .all(conn)
        .await?;

    let mut friend_sets: HashMap<i32, BTreeSet<i32>> = HashMap::new();
    for row in rows {
        friend_sets.entry(row.user_id).or_default().insert(row.friend_id);
    }

    Ok(models
        .into_iter()
        .map(|model| {
            let friends = friend_sets.remove(&model.id).unwrap_or_default();
            to_user(model, friends)
        })
        .collect())
}

async fn users_by_ids<C: ConnectionTrait>(conn: &C, ids: BTreeSet<i32>) -> Result<Vec<User>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let models = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .order_by_desc(users::Column::Id)
        .all(conn)
        .await?;

    decorate_users(conn, models).await
}

async fn outgoing_ids<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<BTreeSet<i32>> {
    Ok(friendship::Entity::find()
        .filter(friendship::Column::UserId.eq(user_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|row| row.friend_id)
        .collect())
}

async fn ensure_user<C: ConnectionTrait>(conn: &C, id: i32) -> Result<users::Model> {
    users::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::user_not_found(id))
}

/// Verrouille les deux utilisateurs, toujours dans l'ordre croissant des ids.
/// Deux demandes croisées A->B et B->A s'exécutent donc l'une après l'autre.
async fn lock_pair<C: ConnectionTrait>(conn: &C, a: i32, b: i32) -> Result<()> {
    let backend = conn.get_database_backend();
    let ids: BTreeSet<i32> = [a, b].into_iter().collect();

    for id in ids {
        for_update(users::Entity::find_by_id(id), backend)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::user_not_found(id))?;
    }
    Ok(())
}

/// Lignes existantes entre deux utilisateurs, dans les deux sens
async fn pair_edges<C: ConnectionTrait>(conn: &C, a: i32, b: i32) -> Result<Vec<FriendshipEdge>> {
    let rows = friendship::Entity::find()
        .filter(friendship::Column::UserId.is_in([a, b]))
        .filter(friendship::Column::FriendId.is_in([a, b]))
        .all(conn)
        .await?;

    rows.into_iter()
        .map(|row| {
            Ok(FriendshipEdge {
                user_id: row.user_id,
                friend_id: row.friend_id,
                status: row.status.parse()?,
            })
        })
        .collect()
}

async fn apply_edge_changes<C: ConnectionTrait>(conn: &C, changes: &[EdgeChange]) -> Result<()> {
    for change in changes {
        match *change {
            EdgeChange::Insert(edge) => {
                let row = friendship::ActiveModel {
                    user_id: Set(edge.user_id),
                    friend_id: Set(edge.friend_id),
                    status: Set(edge.status.to_string()),
                };
                friendship::Entity::insert(row)
                    .exec_without_returning(conn)
                    .await
                    .map_err(|err| {
                        if is_unique_violation(&err) {
                            AppError::Validation(format!(
                                "UserId {} and friendId {} already in friendship",
                                edge.user_id, edge.friend_id
                            ))
                        } else {
                            err.into()
                        }
                    })?;
            }
            EdgeChange::SetStatus { user_id, friend_id, status } => {
                friendship::Entity::update_many()
                    .col_expr(friendship::Column::Status, Expr::value(status.as_str()))
                    .filter(friendship::Column::UserId.eq(user_id))
                    .filter(friendship::Column::FriendId.eq(friend_id))
                    .exec(conn)
                    .await?;
            }
            EdgeChange::Delete { user_id, friend_id } => {
                friendship::Entity::delete_many()
                    .filter(friendship::Column::UserId.eq(user_id))
                    .filter(friendship::Column::FriendId.eq(friend_id))
                    .exec(conn)
                    .await?;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl Storage<User, UserDraft> for DbUserStorage {
    async fn find_all(&self) -> Result<Vec<User>> {
        let models = users::Entity::find()
            .order_by_desc(users::Column::Id)
            .all(&self.db)
            .await?;

        decorate_users(&self.db, models).await
    }

    async fn create(&self, draft: UserDraft) -> Result<User> {
        let _gate = self.gate.enter().await;
        let name = draft.name.unwrap_or_else(|| draft.login.clone());

        let new_user = users::ActiveModel {
            email: Set(draft.email),
            login: Set(draft.login),
            name: Set(name),
            birthday: Set(draft.birthday),
            ..Default::default()
        };

        let user = to_user(new_user.insert(&self.db).await?, BTreeSet::new());
        info!(?user, "Saved");
        Ok(user)
    }

    async fn update(&self, id: i32, draft: UserDraft) -> Result<User> {
        let _gate = self.gate.enter().await;
        let model = ensure_user(&self.db, id).await?;
        let name = draft.name.unwrap_or_else(|| draft.login.clone());

        let mut active: users::ActiveModel = model.into();
        active.email = Set(draft.email);
        active.login = Set(draft.login);
        active.name = Set(name);
        active.birthday = Set(draft.birthday);
        let model = active.update(&self.db).await?;

        let user = decorate_users(&self.db, vec![model])
            .await?
            .pop()
            .ok_or_else(|| AppError::user_not_found(id))?;
        info!(?user, "Updated");
        Ok(user)
    }

    async fn get_by_id(&self, id: i32) -> Result<User> {
        let model = ensure_user(&self.db, id).await?;

        decorate_users(&self.db, vec![model])
            .await?
            .pop()
            .ok_or_else(|| AppError::user_not_found(id))
    }
}

#[async_trait]
impl UserStorage for DbUserStorage {
    async fn add_friend(&self, user_id: i32, friend_id: i32) -> Result<()> {
        let _gate = self.gate.enter().await;
        let txn = self.db.begin().await?;
        lock_pair(&txn, user_id, friend_id).await?;

        let edges = pair_edges(&txn, user_id, friend_id).await?;
        let changes = plan_add_friend(&edges, user_id, friend_id)?;
        apply_edge_changes(&txn, &changes).await?;
        txn.commit().await?;

        info!(user_id, friend_id, ?changes, "Friendship added");
        Ok(())
    }

    async fn delete_friend(&self, user_id: i32, friend_id: i32) -> Result<()> {
        let _gate = self.gate.enter().await;
        let txn = self.db.begin().await?;
        lock_pair(&txn, user_id, friend_id).await?;

        let edges = pair_edges(&txn, user_id, friend_id).await?;
        let changes = plan_delete_friend(&edges, user_id, friend_id)?;
        apply_edge_changes(&txn, &changes).await?;
        txn.commit().await?;

        info!(user_id, friend_id, ?changes, "Friendship deleted");
        Ok(())
    }

    async fn show_friends(&self, user_id: i32) -> Result<Vec<User>> {
        let ids = outgoing_ids(&self.db, user_id).await?;
        users_by_ids(&self.db, ids).await
    }

    async fn show_common_friends(&self, user_id: i32, other_id: i32) -> Result<Vec<User>> {
        let mine = outgoing_ids(&self.db, user_id).await?;
        let theirs = outgoing_ids(&self.db, other_id).await?;
        let common: BTreeSet<i32> = mine.intersection(&theirs).copied().collect();

        users_by_ids(&self.db, common).await
    }
}

// ============================================================================
// FILMS + LIKES + GENRES
// ============================================================================

pub struct DbFilmStorage {
    db: DatabaseConnection,
    gate: WriteGate,
}

impl DbFilmStorage {
    pub fn new(db: DatabaseConnection, gate: WriteGate) -> Self {
        DbFilmStorage { db, gate }
    }
}

fn duplicate_like(film_id: i32, user_id: i32) -> AppError {
    AppError::Conflict(format!(
        "Like on filmId {} from userId {} already exist",
        film_id, user_id
    ))
}

/// Joint à chaque film son MPA, ses genres (id croissant) et ses likes.
/// L'ordre des films en entrée est conservé.
async fn decorate_films<C: ConnectionTrait>(conn: &C, models: Vec<films::Model>) -> Result<Vec<Film>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();

    let mpa_names: HashMap<i32, String> = mpa::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|row| (row.id, row.name))
        .collect();

    let genre_rows = film_genre::Entity::find()
        .filter(film_genre::Column::FilmId.is_in(ids.clone()))
        .order_by_asc(film_genre::Column::GenreId)
        .find_also_related(genres::Entity)
        .all(conn)
        .await?;

    let mut genre_sets: HashMap<i32, Vec<Genre>> = HashMap::new();
    for (link, genre) in genre_rows {
        if let Some(genre) = genre {
            genre_sets.entry(link.film_id).or_default().push(Genre {
                id: genre.id,
                name: genre.name,
            });
        }
    }

    let like_rows = likes::Entity::find()
        .filter(likes::Column::FilmId.is_in(ids))
        .all(conn)
        .await?;

    let mut like_sets: HashMap<i32, BTreeSet<i32>> = HashMap::new();
    for row in like_rows {
        like_sets.entry(row.film_id).or_default().insert(row.user_id);
    }

    models
        .into_iter()
        .map(|model| {
            let mpa = mpa_names
                .get(&model.mpa_id)
                .map(|name| Mpa { id: model.mpa_id, name: name.clone() })
                .ok_or_else(|| {
                    AppError::Internal(format!("Mpa {} missing for film {}", model.mpa_id, model.id))
                })?;

            let draft = FilmDraft {
                name: model.name,
                description: model.description,
                release_date: model.release_date,
                duration: model.duration,
                mpa,
                genres: genre_sets.remove(&model.id).unwrap_or_default(),
            };

            Ok(Film::assemble(model.id, draft, like_sets.remove(&model.id).unwrap_or_default()))
        })
        .collect()
}

/// Les associations film-genre sont remplacées en bloc
async fn replace_genres<C: ConnectionTrait>(conn: &C, film_id: i32, genres: &[Genre]) -> Result<()> {
    film_genre::Entity::delete_many()
        .filter(film_genre::Column::FilmId.eq(film_id))
        .exec(conn)
        .await?;

    let genre_ids: BTreeSet<i32> = genres.iter().map(|genre| genre.id).collect();
    if genre_ids.is_empty() {
        return Ok(());
    }

    let rows = genre_ids.into_iter().map(|genre_id| film_genre::ActiveModel {
        film_id: Set(film_id),
        genre_id: Set(genre_id),
    });
    film_genre::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

async fn ensure_film<C: ConnectionTrait>(conn: &C, id: i32) -> Result<films::Model> {
    films::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::film_not_found(id))
}

#[async_trait]
impl Storage<Film, FilmDraft> for DbFilmStorage {
    async fn find_all(&self) -> Result<Vec<Film>> {
        let models = films::Entity::find()
            .order_by_desc(films::Column::Id)
            .all(&self.db)
            .await?;

        decorate_films(&self.db, models).await
    }

    async fn create(&self, draft: FilmDraft) -> Result<Film> {
        let draft = draft.normalized();
        let _gate = self.gate.enter().await;
        let txn = self.db.begin().await?;

        let new_film = films::ActiveModel {
            name: Set(draft.name.clone()),
            description: Set(draft.description.clone()),
            release_date: Set(draft.release_date),
            duration: Set(draft.duration),
            mpa_id: Set(draft.mpa.id),
            ..Default::default()
        };
        let model = new_film.insert(&txn).await?;
        replace_genres(&txn, model.id, &draft.genres).await?;
        txn.commit().await?;

        let film = Film::assemble(model.id, draft, BTreeSet::new());
        info!(?film, "Saved");
        Ok(film)
    }

    async fn update(&self, id: i32, draft: FilmDraft) -> Result<Film> {
        let draft = draft.normalized();
        let _gate = self.gate.enter().await;
        let txn = self.db.begin().await?;

        let model = ensure_film(&txn, id).await?;
        let mut active: films::ActiveModel = model.into();
        active.name = Set(draft.name);
        active.description = Set(draft.description);
        active.release_date = Set(draft.release_date);
        active.duration = Set(draft.duration);
        active.mpa_id = Set(draft.mpa.id);
        let model = active.update(&txn).await?;

        replace_genres(&txn, id, &draft.genres).await?;
        let film = decorate_films(&txn, vec![model])
            .await?
            .pop()
            .ok_or_else(|| AppError::film_not_found(id))?;
        txn.commit().await?;

        info!(?film, "Updated");
        Ok(film)
    }

    async fn get_by_id(&self, id: i32) -> Result<Film> {
        let model = ensure_film(&self.db, id).await?;

        decorate_films(&self.db, vec![model])
            .await?
            .pop()
            .ok_or_else(|| AppError::film_not_found(id))
    }
}

#[async_trait]
impl FilmStorage for DbFilmStorage {
    async fn add_like(&self, film_id: i32, user_id: i32) -> Result<()> {
        let _gate = self.gate.enter().await;
        let txn = self.db.begin().await?;

        // la ligne du film sert de verrou pour ses likes
        for_update(films::Entity::find_by_id(film_id), txn.get_database_backend())
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::film_not_found(film_id))?;

        let existing = likes::Entity::find_by_id((user_id, film_id)).one(&txn).await?;
        if existing.is_some() {
            return Err(duplicate_like(film_id, user_id));
        }

        let like = likes::ActiveModel {
            user_id: Set(user_id),
            film_id: Set(film_id),
        };
        likes::Entity::insert(like)
            .exec_without_returning(&txn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    duplicate_like(film_id, user_id)
                } else {
                    err.into()
                }
            })?;
        txn.commit().await?;

        info!(user_id, film_id, "Like added");
        Ok(())
    }

    async fn delete_like(&self, film_id: i32, user_id: i32) -> Result<()> {
        let _gate = self.gate.enter().await;
        let result = likes::Entity::delete_many()
            .filter(likes::Column::UserId.eq(user_id))
            .filter(likes::Column::FilmId.eq(film_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "Like on filmId {} from userId {} does not exist",
                film_id, user_id
            )));
        }

        info!(user_id, film_id, "Like deleted");
        Ok(())
    }

    async fn show_most_popular(&self, count: usize) -> Result<Vec<Film>> {
        // ORDER BY COUNT(likes.user_id) DESC, films.id DESC
        let models = films::Entity::find()
            .left_join(likes::Entity)
            .group_by(films::Column::Id)
            .order_by_desc(Expr::col((likes::Entity, likes::Column::UserId)).count())
            .order_by_desc(films::Column::Id)
            .limit(count as u64)
            .all(&self.db)
            .await?;

        decorate_films(&self.db, models).await
    }
}

// ============================================================================
// DICTIONARIES
// ============================================================================

pub struct DbGenreDictionary {
    db: DatabaseConnection,
}

impl DbGenreDictionary {
    pub fn new(db: DatabaseConnection) -> Self {
        DbGenreDictionary { db }
    }
}

#[async_trait]
impl Dictionary<Genre> for DbGenreDictionary {
    async fn find_all(&self) -> Result<Vec<Genre>> {
        Ok(genres::Entity::find()
            .order_by_asc(genres::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| Genre { id: row.id, name: row.name })
            .collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Genre> {
        genres::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|row| Genre { id: row.id, name: row.name })
            .ok_or_else(|| AppError::NotFound(format!("Genre with ID {} does not exist", id)))
    }
}

pub struct DbMpaDictionary {
    db: DatabaseConnection,
}

impl DbMpaDictionary {
    pub fn new(db: DatabaseConnection) -> Self {
        DbMpaDictionary { db }
    }
}

#[async_trait]
impl Dictionary<Mpa> for DbMpaDictionary {
    async fn find_all(&self) -> Result<Vec<Mpa>> {
        Ok(mpa::Entity::find()
            .order_by_asc(mpa::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| Mpa { id: row.id, name: row.name })
            .collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Mpa> {
        mpa::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|row| Mpa { id: row.id, name: row.name })
            .ok_or_else(|| AppError::NotFound(format!("Mpa with ID {} does not exist", id)))
    }
}
