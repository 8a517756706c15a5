use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{AppError, Result};
use crate::models::dto::{Film, FilmDraft, Genre, Mpa, User, UserDraft};
use crate::storage::friendship::{self, FriendshipEdge};
use crate::storage::popularity::rank_most_popular;
use crate::storage::{Dictionary, FilmStorage, Storage, UserStorage, GENRES, MPA_RATINGS};

#[derive(Debug, Clone)]
struct UserRecord {
    email: String,
    login: String,
    name: String,
    birthday: Option<NaiveDate>,
}

impl UserRecord {
    fn from_draft(draft: UserDraft) -> Self {
        let name = draft.name.unwrap_or_else(|| draft.login.clone());
        UserRecord {
            email: draft.email,
            login: draft.login,
            name,
            birthday: draft.birthday,
        }
    }
}

#[derive(Debug, Default)]
struct UserTable {
    last_id: i32,
    users: BTreeMap<i32, UserRecord>,
    edges: Vec<FriendshipEdge>,
}

impl UserTable {
    fn friends_of(&self, user_id: i32) -> BTreeSet<i32> {
        self.edges
            .iter()
            .filter(|edge| edge.user_id == user_id)
            .map(|edge| edge.friend_id)
            .collect()
    }

    fn to_user(&self, id: i32, record: &UserRecord) -> User {
        User {
            id,
            email: record.email.clone(),
            login: record.login.clone(),
            name: record.name.clone(),
            birthday: record.birthday,
            friends: self.friends_of(id),
        }
    }

    fn get(&self, id: i32) -> Result<User> {
        self.users
            .get(&id)
            .map(|record| self.to_user(id, record))
            .ok_or_else(|| AppError::user_not_found(id))
    }

    // id décroissant, comme la version base de données
    fn resolve(&self, ids: &BTreeSet<i32>) -> Vec<User> {
        ids.iter()
            .rev()
            .filter_map(|id| self.users.get(id).map(|record| self.to_user(*id, record)))
            .collect()
    }

    fn pair_edges(&self, a: i32, b: i32) -> Vec<FriendshipEdge> {
        self.edges
            .iter()
            .filter(|edge| {
                (edge.user_id == a && edge.friend_id == b) || (edge.user_id == b && edge.friend_id == a)
            })
            .copied()
            .collect()
    }
}

/// Utilisateurs et amitiés, protégés par un seul verrou
#[derive(Debug, Default)]
pub struct InMemoryUserStorage {
    table: Mutex<UserTable>,
}

#[async_trait]
impl Storage<User, UserDraft> for InMemoryUserStorage {
    async fn find_all(&self) -> Result<Vec<User>> {
        let table = self.table.lock().await;
        let ids: BTreeSet<i32> = table.users.keys().copied().collect();
        Ok(table.resolve(&ids))
    }

    async fn create(&self, draft: UserDraft) -> Result<User> {
        let mut table = self.table.lock().await;
        table.last_id += 1;
        let id = table.last_id;
        table.users.insert(id, UserRecord::from_draft(draft));

        let user = table.get(id)?;
        info!(?user, "Saved");
        Ok(user)
    }

    async fn update(&self, id: i32, draft: UserDraft) -> Result<User> {
        let mut table = self.table.lock().await;
        let record = table
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::user_not_found(id))?;
        *record = UserRecord::from_draft(draft);

        let user = table.get(id)?;
        info!(?user, "Updated");
        Ok(user)
    }

    async fn get_by_id(&self, id: i32) -> Result<User> {
        self.table.lock().await.get(id)
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn add_friend(&self, user_id: i32, friend_id: i32) -> Result<()> {
        let mut table = self.table.lock().await;
        table.get(user_id)?;
        table.get(friend_id)?;

        let changes = friendship::plan_add_friend(&table.pair_edges(user_id, friend_id), user_id, friend_id)?;
        friendship::apply_changes(&mut table.edges, &changes);

        info!(user_id, friend_id, ?changes, "Friendship added");
        Ok(())
    }

    async fn delete_friend(&self, user_id: i32, friend_id: i32) -> Result<()> {
        let mut table = self.table.lock().await;

        let changes =
            friendship::plan_delete_friend(&table.pair_edges(user_id, friend_id), user_id, friend_id)?;
        friendship::apply_changes(&mut table.edges, &changes);

        info!(user_id, friend_id, ?changes, "Friendship deleted");
        Ok(())
    }

    async fn show_friends(&self, user_id: i32) -> Result<Vec<User>> {
        let table = self.table.lock().await;
        Ok(table.resolve(&table.friends_of(user_id)))
    }

    async fn show_common_friends(&self, user_id: i32, other_id: i32) -> Result<Vec<User>> {
        let table = self.table.lock().await;
        let common: BTreeSet<i32> = table
            .friends_of(user_id)
            .intersection(&table.friends_of(other_id))
            .copied()
            .collect();
        Ok(table.resolve(&common))
    }
}

#[derive(Debug, Default)]
struct FilmTable {
    last_id: i32,
    films: BTreeMap<i32, FilmDraft>,
    // (user_id, film_id)
    likes: BTreeSet<(i32, i32)>,
}

impl FilmTable {
    fn likes_of(&self, film_id: i32) -> BTreeSet<i32> {
        self.likes
            .iter()
            .filter(|(_, liked)| *liked == film_id)
            .map(|(user_id, _)| *user_id)
            .collect()
    }

    fn get(&self, id: i32) -> Result<Film> {
        self.films
            .get(&id)
            .map(|draft| Film::assemble(id, draft.clone(), self.likes_of(id)))
            .ok_or_else(|| AppError::film_not_found(id))
    }

    fn all(&self) -> Vec<Film> {
        self.films
            .iter()
            .rev()
            .map(|(id, draft)| Film::assemble(*id, draft.clone(), self.likes_of(*id)))
            .collect()
    }
}

/// Films, likes et genres associés, protégés par un seul verrou
#[derive(Debug, Default)]
pub struct InMemoryFilmStorage {
    table: Mutex<FilmTable>,
}

#[async_trait]
impl Storage<Film, FilmDraft> for InMemoryFilmStorage {
    async fn find_all(&self) -> Result<Vec<Film>> {
        Ok(self.table.lock().await.all())
    }

    async fn create(&self, draft: FilmDraft) -> Result<Film> {
        let mut table = self.table.lock().await;
        table.last_id += 1;
        let id = table.last_id;
        table.films.insert(id, draft.normalized());

        let film = table.get(id)?;
        info!(?film, "Saved");
        Ok(film)
    }

    async fn update(&self, id: i32, draft: FilmDraft) -> Result<Film> {
        let mut table = self.table.lock().await;
        let stored = table
            .films
            .get_mut(&id)
            .ok_or_else(|| AppError::film_not_found(id))?;
        // les genres sont remplacés en bloc
        *stored = draft.normalized();

        let film = table.get(id)?;
        info!(?film, "Updated");
        Ok(film)
    }

    async fn get_by_id(&self, id: i32) -> Result<Film> {
        self.table.lock().await.get(id)
    }
}

#[async_trait]
impl FilmStorage for InMemoryFilmStorage {
    async fn add_like(&self, film_id: i32, user_id: i32) -> Result<()> {
        let mut table = self.table.lock().await;
        table.get(film_id)?;

        if !table.likes.insert((user_id, film_id)) {
            return Err(AppError::Conflict(format!(
                "Like on filmId {} from userId {} already exist",
                film_id, user_id
            )));
        }

        info!(user_id, film_id, "Like added");
        Ok(())
    }

    async fn delete_like(&self, film_id: i32, user_id: i32) -> Result<()> {
        let mut table = self.table.lock().await;

        if !table.likes.remove(&(user_id, film_id)) {
            return Err(AppError::NotFound(format!(
                "Like on filmId {} from userId {} does not exist",
                film_id, user_id
            )));
        }

        info!(user_id, film_id, "Like deleted");
        Ok(())
    }

    async fn show_most_popular(&self, count: usize) -> Result<Vec<Film>> {
        let films = self.table.lock().await.all();
        Ok(rank_most_popular(films, count))
    }
}

/// Entrée d'un dictionnaire (genre ou MPA)
pub trait DictionaryEntry: Clone + Send + Sync + 'static {
    const LABEL: &'static str;

    fn id(&self) -> i32;
}

impl DictionaryEntry for Genre {
    const LABEL: &'static str = "Genre";

    fn id(&self) -> i32 {
        self.id
    }
}

impl DictionaryEntry for Mpa {
    const LABEL: &'static str = "Mpa";

    fn id(&self) -> i32 {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryDictionary<T> {
    entries: Vec<T>,
}

impl InMemoryDictionary<Genre> {
    pub fn genres() -> Self {
        InMemoryDictionary {
            entries: GENRES
                .iter()
                .map(|(id, name)| Genre { id: *id, name: name.to_string() })
                .collect(),
        }
    }
}

impl InMemoryDictionary<Mpa> {
    pub fn mpa() -> Self {
        InMemoryDictionary {
            entries: MPA_RATINGS
                .iter()
                .map(|(id, name)| Mpa { id: *id, name: name.to_string() })
                .collect(),
        }
    }
}

#[async_trait]
impl<T: DictionaryEntry> Dictionary<T> for InMemoryDictionary<T> {
    async fn find_all(&self) -> Result<Vec<T>> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|entry| entry.id());
        Ok(entries)
    }

    async fn get_by_id(&self, id: i32) -> Result<T> {
        self.entries
            .iter()
            .find(|entry| entry.id() == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{} with ID {} does not exist", T::LABEL, id)))
    }
}
