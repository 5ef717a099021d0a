use crudcore::{AppConfig, build_app, logging, migration::Migrator};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    logging::init(&config)?;

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;

    let app = build_app(db, &config);
    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(
        address = %config.bind_address(),
        prefix = %config.api_prefix,
        "listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
