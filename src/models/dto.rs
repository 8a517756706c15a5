//pour les requêtes et réponses de l'API
use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::utils::validation::{
    first_message, validate_birthday, validate_film_name, validate_login, validate_release_date,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mpa {
    pub id: i32,
    pub name: String,
}

/// Utilisateur tel que renvoyé par l'API.
/// `friends` = arêtes sortantes (demandes en attente comprises), triées par id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,
    pub login: String,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub friends: BTreeSet<i32>,
}

/// Film tel que renvoyé par l'API.
/// `rate` n'est jamais stocké: c'est toujours la taille de `likes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Film {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: i64,
    pub rate: usize,
    #[serde(rename = "likeFromUserId")]
    pub likes: BTreeSet<i32>,
    pub genres: Vec<Genre>,
    pub mpa: Mpa,
}

impl Film {
    pub fn assemble(
        id: i32,
        draft: FilmDraft,
        likes: BTreeSet<i32>,
    ) -> Self {
        Film {
            id,
            name: draft.name,
            description: draft.description,
            release_date: draft.release_date,
            duration: draft.duration,
            rate: likes.len(),
            likes,
            genres: draft.genres,
            mpa: draft.mpa,
        }
    }
}

/// Données d'un utilisateur validées, prêtes à être persistées
#[derive(Debug, Clone, PartialEq)]
pub struct UserDraft {
    pub email: String,
    pub login: String,
    pub name: Option<String>,
    pub birthday: Option<NaiveDate>,
}

/// Données d'un film validées, avec MPA et genres déjà résolus.
/// `genres` est dédoublonné et trié par id croissant.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmDraft {
    pub name: String,
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: i64,
    pub mpa: Mpa,
    pub genres: Vec<Genre>,
}

impl FilmDraft {
    /// Genres triés par id, un même genre ajouté deux fois n'apparaît qu'une fois
    pub fn normalized(mut self) -> Self {
        self.genres.sort_by_key(|genre| genre.id);
        self.genres.dedup_by_key(|genre| genre.id);
        self
    }
}

/// Référence vers une entrée de dictionnaire: `{"id": 1}` (le nom est ignoré)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserRequest {
    pub id: Option<i32>,

    #[validate(required(message = "Empty E-mail"), email(message = "Incorrect E-mail"))]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_login"))]
    pub login: String,

    pub name: Option<String>,

    #[validate(custom(function = "validate_birthday"))]
    pub birthday: Option<NaiveDate>,
}

impl UserRequest {
    /// Valide la requête et la convertit en `UserDraft`
    pub fn into_draft(self) -> Result<(Option<i32>, UserDraft), AppError> {
        self.validate()
            .map_err(|errors| AppError::Validation(first_message(&errors)))?;

        let email = self
            .email
            .ok_or_else(|| AppError::Validation("Empty E-mail".to_string()))?;

        Ok((
            self.id,
            UserDraft {
                email,
                login: self.login,
                name: self.name,
                birthday: self.birthday,
            },
        ))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FilmRequest {
    pub id: Option<i32>,

    #[serde(default)]
    #[validate(custom(function = "validate_film_name"))]
    pub name: String,

    #[validate(length(max = 200, message = "Max description length was exceeded"))]
    pub description: Option<String>,

    #[validate(
        required(message = "Empty release date"),
        custom(function = "validate_release_date")
    )]
    pub release_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(range(min = 1, message = "Incorrect duration"))]
    pub duration: i64,

    #[validate(required(message = "Empty mpa"))]
    pub mpa: Option<IdRef>,

    pub genres: Option<Vec<IdRef>>,
}

/// Requête film validée, les références MPA/genres restant à résoudre
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFilmRequest {
    pub id: Option<i32>,
    pub name: String,
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: i64,
    pub mpa_id: i32,
    pub genre_ids: Vec<i32>,
}

impl FilmRequest {
    pub fn into_valid(self) -> Result<ValidFilmRequest, AppError> {
        self.validate()
            .map_err(|errors| AppError::Validation(first_message(&errors)))?;

        let release_date = self
            .release_date
            .ok_or_else(|| AppError::Validation("Empty release date".to_string()))?;
        let mpa = self
            .mpa
            .ok_or_else(|| AppError::Validation("Empty mpa".to_string()))?;

        // doublons supprimés, ordre croissant
        let genre_ids: BTreeSet<i32> = self
            .genres
            .unwrap_or_default()
            .into_iter()
            .map(|genre| genre.id)
            .collect();

        Ok(ValidFilmRequest {
            id: self.id,
            name: self.name,
            description: self.description,
            release_date,
            duration: self.duration,
            mpa_id: mpa.id,
            genre_ids: genre_ids.into_iter().collect(),
        })
    }
}

/// Corps de réponse de toutes les erreurs
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    pub count: Option<i64>,
}
