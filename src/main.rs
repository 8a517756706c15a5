use actix_web::{middleware::Logger, App, HttpServer};
use tracing::info;

use filmorate::app::AppState;
use filmorate::config::{AppConfig, StorageKind};
use filmorate::db;
use filmorate::storage::Storages;
use filmorate::utils::logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let config = AppConfig::from_env()?;

    let storages = match config.storage {
        StorageKind::Memory => Storages::in_memory(),
        StorageKind::Database => {
            let url = config.database_url.as_deref().unwrap_or_default();

            info!("Connecting to database...");
            let connection = db::establish_connection(url).await?;
            db::prepare_schema(&connection).await?;
            info!("Database connected!");

            Storages::database(connection)
        }
    };

    let state = AppState::new(storages);
    info!(storage = %config.storage, "Starting server on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| state.configure(cfg))
    })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await?;

    Ok(())
}
