use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::dto::{Film, FilmDraft, Genre, Mpa, ValidFilmRequest};
use crate::storage::{Dictionary, FilmStorage, UserStorage};

pub struct FilmService {
    films: Arc<dyn FilmStorage>,
    users: Arc<dyn UserStorage>,
    genres: Arc<dyn Dictionary<Genre>>,
    mpa: Arc<dyn Dictionary<Mpa>>,
}

impl FilmService {
    pub fn new(
        films: Arc<dyn FilmStorage>,
        users: Arc<dyn UserStorage>,
        genres: Arc<dyn Dictionary<Genre>>,
        mpa: Arc<dyn Dictionary<Mpa>>,
    ) -> Self {
        FilmService { films, users, genres, mpa }
    }

    pub async fn find_all(&self) -> Result<Vec<Film>> {
        self.films.find_all().await
    }

    pub async fn create(&self, request: ValidFilmRequest) -> Result<Film> {
        let draft = self.resolve(request).await?;
        self.films.create(draft).await
    }

    pub async fn update(&self, id: i32, request: ValidFilmRequest) -> Result<Film> {
        // Vérifie que le film existe
        self.get_film_by_id(id).await?;

        let draft = self.resolve(request).await?;
        self.films.update(id, draft).await
    }

    pub async fn get_film_by_id(&self, id: i32) -> Result<Film> {
        self.films.get_by_id(id).await
    }

    pub async fn add_like(&self, film_id: i32, user_id: i32) -> Result<()> {
        // Vérifie que le film et l'utilisateur existent
        self.users.get_by_id(user_id).await?;
        self.get_film_by_id(film_id).await?;

        self.films.add_like(film_id, user_id).await
    }

    pub async fn delete_like(&self, film_id: i32, user_id: i32) -> Result<()> {
        self.users.get_by_id(user_id).await?;
        self.get_film_by_id(film_id).await?;

        self.films.delete_like(film_id, user_id).await
    }

    pub async fn show_most_popular_films(&self, count: i64) -> Result<Vec<Film>> {
        if count <= 0 {
            return Err(AppError::Validation("Incorrect count".to_string()));
        }

        let count = usize::try_from(count).unwrap_or(usize::MAX);
        self.films.show_most_popular(count).await
    }

    /// Résout la classification MPA et les genres référencés par id.
    /// Un id inconnu donne NotFound avant toute écriture.
    async fn resolve(&self, request: ValidFilmRequest) -> Result<FilmDraft> {
        let mpa = self.mpa.get_by_id(request.mpa_id).await?;

        let mut genres = Vec::with_capacity(request.genre_ids.len());
        for genre_id in &request.genre_ids {
            genres.push(self.genres.get_by_id(*genre_id).await?);
        }

        Ok(FilmDraft {
            name: request.name,
            description: request.description,
            release_date: request.release_date,
            duration: request.duration,
            mpa,
            genres,
        }
        .normalized())
    }
}
