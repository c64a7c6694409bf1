pub mod entities;
mod comment_repository;
mod restaurant_repository;
mod user_repository;
mod visit_repository;
mod vote_repository;

pub use comment_repository::CommentRepository;
pub use restaurant_repository::RestaurantRepository;
pub use user_repository::UserRepository;
pub use visit_repository::VisitRepository;
pub use vote_repository::VoteRepository;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Create any missing table from the entity definitions. Parents come
/// before the tables holding foreign keys to them.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, entities::User).await?;
    create_table(db, entities::Restaurant).await?;
    create_table(db, entities::Visit).await?;
    create_table(db, entities::Comment).await?;
    create_table(db, entities::Vote).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let table = entity.table_name().to_string();
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    tracing::debug!(table = %table, "Ensured table exists");
    Ok(())
}
