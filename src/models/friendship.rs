use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

// Une ligne = une arête orientée user_id -> friend_id
// status: 'REQUESTED' (demande en attente) ou 'APPROVED' (amitié mutuelle)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "friendship")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub friend_id: i32,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        fk_name = "fk-friendship-user"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FriendId",
        to = "super::users::Column::Id",
        fk_name = "fk-friendship-friend"
    )]
    Friend,
}

impl ActiveModelBehavior for ActiveModel {}
