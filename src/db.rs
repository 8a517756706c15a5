// connexion BD + création du schéma

use sea_orm::sea_query::TableCreateStatement;
use sea_orm::*;
use tracing::info;

use crate::models::{film_genre, films, friendship, genres, likes, mpa, users};
use crate::storage::{GENRES, MPA_RATINGS};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);

    Database::connect(options).await
}

async fn create_table(db: &DatabaseConnection, mut statement: TableCreateStatement) -> Result<(), DbErr> {
    statement.if_not_exists();
    let backend = db.get_database_backend();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Crée les tables manquantes à partir des entités, puis remplit les dictionnaires s'ils sont vides.
/// L'ordre respecte les clés étrangères.
pub async fn prepare_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, schema.create_table_from_entity(genres::Entity)).await?;
    create_table(db, schema.create_table_from_entity(mpa::Entity)).await?;
    create_table(db, schema.create_table_from_entity(users::Entity)).await?;
    create_table(db, schema.create_table_from_entity(films::Entity)).await?;
    create_table(db, schema.create_table_from_entity(friendship::Entity)).await?;
    create_table(db, schema.create_table_from_entity(film_genre::Entity)).await?;
    create_table(db, schema.create_table_from_entity(likes::Entity)).await?;

    if genres::Entity::find().count(db).await? == 0 {
        let rows = GENRES.iter().map(|(id, name)| genres::ActiveModel {
            id: Set(*id),
            name: Set(ToString::to_string(name)),
        });
        genres::Entity::insert_many(rows).exec_without_returning(db).await?;
        info!(count = GENRES.len(), "Genres seeded");
    }

    if mpa::Entity::find().count(db).await? == 0 {
        let rows = MPA_RATINGS.iter().map(|(id, name)| mpa::ActiveModel {
            id: Set(*id),
            name: Set(ToString::to_string(name)),
        });
        mpa::Entity::insert_many(rows).exec_without_returning(db).await?;
        info!(count = MPA_RATINGS.len(), "Mpa ratings seeded");
    }

    Ok(())
}
