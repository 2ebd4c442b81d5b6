// Shared helpers for the integration tests.
// Every test gets its own in-memory SQLite database and mail outbox.

#![allow(dead_code)]

use actix_web::{web, App};
use chrono::Utc;
use reviewhub::{
    api,
    auth::{create_token, Claims},
    config::{
        AuthConfig, Config, DatabaseConfig, JwtConfig, MailBackend, MailConfig, PaginationConfig,
        ServerConfig,
    },
    db::{self, DbPool},
    entities::{
        category, genre, title, title_genre,
        user::{self, Role},
    },
    services::{Mailer, MemoryMailer},
};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use std::sync::Arc;

pub const PAGE_SIZE: u64 = 10;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            expiration_hours: 1,
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        auth: AuthConfig {
            confirmation_ttl_hours: 72,
            // Lowest bcrypt cost keeps the tests fast.
            confirmation_cost: 4,
        },
        pagination: PaginationConfig {
            page_size: PAGE_SIZE,
        },
        mail: MailConfig {
            backend: MailBackend::Log,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from: "reviewhub <noreply@reviewhub.local>".to_string(),
        },
    }
}

pub struct TestContext {
    pub config: Config,
    pub pool: DbPool,
    pub mailer: MemoryMailer,
}

impl TestContext {
    pub async fn new() -> Self {
        let config = test_config();
        // A single connection so every query sees the same in-memory database.
        let pool = db::connect(&config.database.url, config.database.max_connections)
            .await
            .expect("Failed to create test database");
        TestContext {
            config,
            pool,
            mailer: MemoryMailer::new(),
        }
    }

    /// Helper function to create a test app
    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let mailer: Arc<dyn Mailer> = Arc::new(self.mailer.clone());
        App::new()
            .app_data(web::Data::new(self.config.clone()))
            .app_data(web::Data::new(self.pool.clone()))
            .app_data(web::Data::from(mailer))
            .configure(api::configure)
    }

    /// Insert a user directly and return it with a valid access token.
    pub async fn create_user(
        &self,
        username: &str,
        role: Role,
        is_superuser: bool,
    ) -> (user::Model, String) {
        let now = Utc::now();
        let user = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{}@example.com", username)),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            bio: Set(None),
            role: Set(role),
            is_superuser: Set(is_superuser),
            confirmation_code_hash: Set(None),
            confirmation_sent_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .expect("Failed to insert test user");

        let claims = Claims::new(user.id, user.username.clone(), user.role.clone(), 1);
        let token = create_token(&claims, &self.config.jwt.secret).expect("Failed to sign token");
        (user, token)
    }

    /// Insert the `movie` category, `drama`/`comedy` genres and one title
    /// carrying all three. Returns the title id.
    pub async fn seed_catalog(&self) -> i64 {
        let movie = category::ActiveModel {
            name: Set("Movie".to_string()),
            slug: Set("movie".to_string()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .expect("Failed to insert category");

        let mut genre_ids = Vec::new();
        for (name, slug) in [("Drama", "drama"), ("Comedy", "comedy")] {
            let genre = genre::ActiveModel {
                name: Set(name.to_string()),
                slug: Set(slug.to_string()),
                ..Default::default()
            }
            .insert(&self.pool)
            .await
            .expect("Failed to insert genre");
            genre_ids.push(genre.id);
        }

        let title = title::ActiveModel {
            name: Set("The Apartment".to_string()),
            year: Set(1960),
            description: Set(Some("Office comedy".to_string())),
            category_id: Set(Some(movie.id)),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .expect("Failed to insert title");

        for genre_id in genre_ids {
            title_genre::Entity::insert(title_genre::ActiveModel {
                title_id: Set(title.id),
                genre_id: Set(genre_id),
            })
            .exec_without_returning(&self.pool)
            .await
            .expect("Failed to link genre");
        }
        title.id
    }

    /// The confirmation code most recently mailed to `email`.
    pub fn confirmation_code(&self, email: &str) -> String {
        let mail = self
            .mailer
            .last_to(email)
            .expect("No confirmation mail was sent");
        mail.body
            .rsplit(' ')
            .next()
            .expect("Mail body has no code")
            .to_string()
    }
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
