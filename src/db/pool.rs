use crate::config::Config;
use crate::entities::{category, comment, genre, review, title, title_genre, user};
use sea_orm::sea_query::{Index, TableCreateStatement};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

pub type DbPool = DatabaseConnection;

pub async fn create_pool(config: &Config) -> Result<DbPool, anyhow::Error> {
    connect(&config.database.url, config.database.max_connections).await
}

/// Connect to `url` and make sure the schema exists.
pub async fn connect(url: &str, max_connections: u32) -> Result<DbPool, anyhow::Error> {
    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    init_schema(&db).await?;
    Ok(db)
}

/// Create tables in foreign-key order. Existing tables are left untouched.
pub async fn init_schema(db: &DbPool) -> Result<(), anyhow::Error> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut reviews = schema.create_table_from_entity(review::Entity);
    reviews.index(
        Index::create()
            .name(review::UNIQUE_TITLE_AUTHOR)
            .col(review::Column::TitleId)
            .col(review::Column::AuthorId)
            .unique(),
    );

    let statements: Vec<TableCreateStatement> = vec![
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(category::Entity),
        schema.create_table_from_entity(genre::Entity),
        schema.create_table_from_entity(title::Entity),
        schema.create_table_from_entity(title_genre::Entity),
        reviews,
        schema.create_table_from_entity(comment::Entity),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(backend.build(&statement)).await?;
    }

    log::debug!("Database schema ready");
    Ok(())
}
