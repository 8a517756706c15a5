use std::sync::Arc;

use crate::error::Result;
use crate::models::dto::{Genre, Mpa};
use crate::storage::Dictionary;

/// Lecture seule sur un dictionnaire pré-rempli (genres, classifications MPA)
pub struct DictionaryService<T> {
    dictionary: Arc<dyn Dictionary<T>>,
}

pub type GenreService = DictionaryService<Genre>;
pub type MpaService = DictionaryService<Mpa>;

impl<T> DictionaryService<T> {
    pub fn new(dictionary: Arc<dyn Dictionary<T>>) -> Self {
        DictionaryService { dictionary }
    }

    pub async fn find_all(&self) -> Result<Vec<T>> {
        self.dictionary.find_all().await
    }

    pub async fn get_by_id(&self, id: i32) -> Result<T> {
        self.dictionary.get_by_id(id).await
    }
}
