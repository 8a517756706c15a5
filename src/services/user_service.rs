use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::models::dto::{User, UserDraft};
use crate::storage::UserStorage;

pub struct UserService {
    users: Arc<dyn UserStorage>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStorage>) -> Self {
        UserService { users }
    }

    pub async fn find_all(&self) -> Result<Vec<User>> {
        self.users.find_all().await
    }

    /// Le nom affiché prend la valeur du login s'il est absent ou vide
    pub async fn create(&self, draft: UserDraft) -> Result<User> {
        self.users.create(Self::with_default_name(draft)).await
    }

    pub async fn update(&self, id: i32, draft: UserDraft) -> Result<User> {
        // Vérifie que l'utilisateur existe
        self.get_user_by_id(id).await?;

        self.users.update(id, Self::with_default_name(draft)).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<User> {
        self.users.get_by_id(id).await
    }

    /// Les deux utilisateurs sont vérifiés avant de toucher aux amitiés
    pub async fn add_friend(&self, user_id: i32, friend_id: i32) -> Result<()> {
        self.get_user_by_id(user_id).await?;
        self.get_user_by_id(friend_id).await?;

        self.users.add_friend(user_id, friend_id).await
    }

    pub async fn delete_friend(&self, user_id: i32, friend_id: i32) -> Result<()> {
        self.get_user_by_id(user_id).await?;
        self.get_user_by_id(friend_id).await?;

        self.users.delete_friend(user_id, friend_id).await
    }

    pub async fn show_friends(&self, user_id: i32) -> Result<Vec<User>> {
        self.get_user_by_id(user_id).await?;

        self.users.show_friends(user_id).await
    }

    pub async fn show_common_friends(&self, user_id: i32, other_id: i32) -> Result<Vec<User>> {
        self.get_user_by_id(user_id).await?;
        self.get_user_by_id(other_id).await?;

        self.users.show_common_friends(user_id, other_id).await
    }

    fn with_default_name(mut draft: UserDraft) -> UserDraft {
        let blank = draft.name.as_deref().is_none_or(|name| name.trim().is_empty());
        if blank {
            debug!(login = %draft.login, "Empty name was changed");
            draft.name = Some(draft.login.clone());
        }
        draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::memory::InMemoryUserStorage;
    use chrono::NaiveDate;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserStorage::default()))
    }

    fn draft(login: &str, name: Option<&str>) -> UserDraft {
        UserDraft {
            email: "mail@mail.ru".to_string(),
            login: login.to_string(),
            name: name.map(str::to_string),
            birthday: NaiveDate::from_ymd_opt(1946, 8, 20),
        }
    }

    #[tokio::test]
    async fn blank_name_defaults_to_login() {
        let users = service();
        assert_eq!(users.create(draft("dolore", None)).await.unwrap().name, "dolore");
        assert_eq!(users.create(draft("adam", Some("  "))).await.unwrap().name, "adam");
        assert_eq!(
            users.create(draft("nick", Some("Nick Name"))).await.unwrap().name,
            "Nick Name"
        );
    }

    #[tokio::test]
    async fn update_of_unknown_user_is_not_found() {
        let err = service().update(9999, draft("dolore", None)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_friends() {
        let users = service();
        let u1 = users.create(draft("dolore", Some("Nick Name"))).await.unwrap();
        let u2 = users.create(draft("adam", None)).await.unwrap();
        users.add_friend(u1.id, u2.id).await.unwrap();

        let updated = users.update(u1.id, draft("doloreUpdate", None)).await.unwrap();
        assert_eq!(updated.login, "doloreUpdate");
        assert_eq!(updated.name, "doloreUpdate");
        assert!(updated.friends.contains(&u2.id));
    }

    #[tokio::test]
    async fn deleting_a_missing_friendship_is_a_validation_error() {
        let users = service();
        let u1 = users.create(draft("dolore", None)).await.unwrap();
        let u2 = users.create(draft("adam", None)).await.unwrap();

        let err = users.delete_friend(u1.id, u2.id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
