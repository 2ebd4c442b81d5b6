use crate::db::DbPool;
use crate::entities::user::Role;
use crate::entities::{category, comment, genre, review, title, title_genre, user};
use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set, TransactionTrait,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

/// Rows per INSERT statement, kept below SQLite's bound-parameter limit.
const CHUNK_SIZE: usize = 100;

/// One CSV fixture file and the table it fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    Users,
    Categories,
    Genres,
    Titles,
    TitleGenres,
    Reviews,
    Comments,
}

impl Fixture {
    /// Every fixture in foreign-key order.
    pub const ALL: [Fixture; 7] = [
        Fixture::Users,
        Fixture::Categories,
        Fixture::Genres,
        Fixture::Titles,
        Fixture::TitleGenres,
        Fixture::Reviews,
        Fixture::Comments,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Fixture::Users => "users.csv",
            Fixture::Categories => "category.csv",
            Fixture::Genres => "genre.csv",
            Fixture::Titles => "titles.csv",
            Fixture::TitleGenres => "genre_title.csv",
            Fixture::Reviews => "review.csv",
            Fixture::Comments => "comments.csv",
        }
    }

    async fn load<C: ConnectionTrait>(self, db: &C, path: &Path) -> anyhow::Result<u64> {
        let now = Utc::now();
        let inserted = match self {
            Fixture::Users => {
                let rows: Vec<UserRow> = read_rows(path)?;
                insert_rows(
                    db,
                    rows.into_iter().map(|row| user::ActiveModel {
                        id: Set(row.id),
                        username: Set(row.username),
                        email: Set(row.email),
                        first_name: Set(row.first_name.unwrap_or_default()),
                        last_name: Set(row.last_name.unwrap_or_default()),
                        bio: Set(row.bio),
                        role: Set(row.role.unwrap_or_default()),
                        is_superuser: Set(false),
                        confirmation_code_hash: Set(None),
                        confirmation_sent_at: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }),
                )
                .await?
            }
            Fixture::Categories => {
                let rows: Vec<SlugRow> = read_rows(path)?;
                insert_rows(
                    db,
                    rows.into_iter().map(|row| category::ActiveModel {
                        id: Set(row.id),
                        name: Set(row.name),
                        slug: Set(row.slug),
                    }),
                )
                .await?
            }
            Fixture::Genres => {
                let rows: Vec<SlugRow> = read_rows(path)?;
                insert_rows(
                    db,
                    rows.into_iter().map(|row| genre::ActiveModel {
                        id: Set(row.id),
                        name: Set(row.name),
                        slug: Set(row.slug),
                    }),
                )
                .await?
            }
            Fixture::Titles => {
                let rows: Vec<TitleRow> = read_rows(path)?;
                insert_rows(
                    db,
                    rows.into_iter().map(|row| title::ActiveModel {
                        id: Set(row.id),
                        name: Set(row.name),
                        year: Set(row.year),
                        description: Set(row.description),
                        category_id: Set(row.category),
                    }),
                )
                .await?
            }
            Fixture::TitleGenres => {
                let rows: Vec<TitleGenreRow> = read_rows(path)?;
                insert_rows(
                    db,
                    rows.into_iter().map(|row| title_genre::ActiveModel {
                        title_id: Set(row.title_id),
                        genre_id: Set(row.genre_id),
                    }),
                )
                .await?
            }
            Fixture::Reviews => {
                let rows: Vec<ReviewRow> = read_rows(path)?;
                insert_rows(
                    db,
                    rows.into_iter().map(|row| review::ActiveModel {
                        id: Set(row.id),
                        title_id: Set(row.title_id),
                        author_id: Set(row.author),
                        text: Set(row.text),
                        score: Set(row.score),
                        pub_date: Set(row.pub_date.unwrap_or(now)),
                    }),
                )
                .await?
            }
            Fixture::Comments => {
                let rows: Vec<CommentRow> = read_rows(path)?;
                insert_rows(
                    db,
                    rows.into_iter().map(|row| comment::ActiveModel {
                        id: Set(row.id),
                        review_id: Set(row.review_id),
                        author_id: Set(row.author),
                        text: Set(row.text),
                        pub_date: Set(row.pub_date.unwrap_or(now)),
                    }),
                )
                .await?
            }
        };
        Ok(inserted)
    }
}

#[derive(Debug, Deserialize)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    role: Option<Role>,
    bio: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

/// Shared shape of `category.csv` and `genre.csv`.
#[derive(Debug, Deserialize)]
struct SlugRow {
    id: i64,
    name: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct TitleRow {
    id: i64,
    name: String,
    year: i32,
    #[serde(alias = "category_id")]
    category: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleGenreRow {
    title_id: i64,
    genre_id: i64,
}

#[derive(Debug, Deserialize)]
struct ReviewRow {
    id: i64,
    title_id: i64,
    text: String,
    #[serde(alias = "author_id")]
    author: i64,
    score: i16,
    pub_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommentRow {
    id: i64,
    review_id: i64,
    text: String,
    #[serde(alias = "author_id")]
    author: i64,
    pub_date: Option<DateTime<Utc>>,
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for (index, row) in reader.deserialize().enumerate() {
        // Line 1 is the header.
        let row = row.with_context(|| format!("{}: bad row {}", path.display(), index + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

async fn insert_rows<A, C>(db: &C, models: impl IntoIterator<Item = A>) -> anyhow::Result<u64>
where
    A: ActiveModelTrait + 'static,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    let mut models = models.into_iter().peekable();
    let mut inserted = 0;
    while models.peek().is_some() {
        let chunk: Vec<A> = models.by_ref().take(CHUNK_SIZE).collect();
        inserted += <A::Entity as EntityTrait>::insert_many(chunk)
            .exec_without_returning(db)
            .await?;
    }
    Ok(inserted)
}

/// Outcome of [`import_dir`].
#[derive(Debug, Default)]
pub struct ImportReport {
    pub loaded: Vec<(Fixture, u64)>,
    pub skipped: Vec<Fixture>,
}

impl ImportReport {
    pub fn rows(&self, fixture: Fixture) -> Option<u64> {
        self.loaded
            .iter()
            .find(|(loaded, _)| *loaded == fixture)
            .map(|(_, rows)| *rows)
    }
}

/// Load `fixtures` from `dir` in the given order, one transaction per file.
/// Missing files are skipped; the first failing file aborts the import and
/// leaves its table untouched.
pub async fn import_dir(
    db: &DbPool,
    dir: &Path,
    fixtures: &[Fixture],
) -> anyhow::Result<ImportReport> {
    let mut report = ImportReport::default();

    for &fixture in fixtures {
        let path = dir.join(fixture.file_name());
        if !path.is_file() {
            log::warn!("Skipping {}: file not found", path.display());
            report.skipped.push(fixture);
            continue;
        }

        let txn = db.begin().await?;
        let rows = fixture
            .load(&txn, &path)
            .await
            .with_context(|| format!("Import of {} failed", fixture.file_name()))?;
        txn.commit().await?;

        log::info!("Imported {} rows from {}", rows, fixture.file_name());
        report.loaded.push((fixture, rows));
    }

    Ok(report)
}
