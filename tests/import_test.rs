// Tests for the CSV fixture import.
// Run with: cargo test --test import_test

mod common;

use actix_web::{http::StatusCode, test};
use common::TestContext;
use reviewhub::entities::{category, comment, genre, review, title, title_genre, user};
use reviewhub::import::{import_dir, Fixture};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Fresh scratch directory holding the given CSV files.
fn fixture_dir(files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("reviewhub-import-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("Failed to create fixture dir");
    for (name, contents) in files {
        fs::write(dir.join(name), contents).expect("Failed to write fixture");
    }
    dir
}

const USERS: &str = "\
id,username,email,role,bio,first_name,last_name
100,bingobongo,bingobongo@yamdb.fake,user,,,
101,capt_obvious,capt_obvious@yamdb.fake,moderator,Sees everything,Capt,Obvious
";

const CATEGORIES: &str = "\
id,name,slug
1,Фильм,movie
2,Книга,book
";

const GENRES: &str = "\
id,name,slug
1,Драма,drama
2,Комедия,comedy
";

const TITLES: &str = "\
id,name,year,category
1,Побег из Шоушенка,1994,1
2,Generation P,1999,2
";

const GENRE_TITLES: &str = "\
id,title_id,genre_id
1,1,1
2,2,1
3,2,2
";

const REVIEWS: &str = "\
id,title_id,text,author,score,pub_date
1,1,Ну такое,100,10,2019-09-24T21:08:21.567Z
2,1,Не согласен,101,5,2019-09-24T21:08:21.567Z
";

const COMMENTS: &str = "\
id,review_id,text,author,pub_date
1,1,Критик,101,2019-09-24T21:08:21.567Z
";

#[actix_web::test]
async fn test_import_all_fixtures() {
    let ctx = TestContext::new().await;
    let dir = fixture_dir(&[
        ("users.csv", USERS),
        ("category.csv", CATEGORIES),
        ("genre.csv", GENRES),
        ("titles.csv", TITLES),
        ("genre_title.csv", GENRE_TITLES),
        ("review.csv", REVIEWS),
        ("comments.csv", COMMENTS),
    ]);

    let report = import_dir(&ctx.pool, &dir, &Fixture::ALL)
        .await
        .expect("Import should succeed");
    assert!(report.skipped.is_empty());
    assert_eq!(report.rows(Fixture::Users), Some(2));
    assert_eq!(report.rows(Fixture::TitleGenres), Some(3));
    assert_eq!(report.rows(Fixture::Comments), Some(1));

    assert_eq!(category::Entity::find().count(&ctx.pool).await.unwrap(), 2);
    assert_eq!(genre::Entity::find().count(&ctx.pool).await.unwrap(), 2);
    assert_eq!(title::Entity::find().count(&ctx.pool).await.unwrap(), 2);
    assert_eq!(title_genre::Entity::find().count(&ctx.pool).await.unwrap(), 3);
    assert_eq!(review::Entity::find().count(&ctx.pool).await.unwrap(), 2);
    assert_eq!(comment::Entity::find().count(&ctx.pool).await.unwrap(), 1);

    // Ids are preserved.
    let moderator = user::Entity::find_by_id(101)
        .one(&ctx.pool)
        .await
        .unwrap()
        .expect("User 101 should exist");
    assert_eq!(moderator.username, "capt_obvious");
    assert_eq!(moderator.role, user::Role::Moderator);
    assert_eq!(moderator.bio.as_deref(), Some("Sees everything"));

    // Imported data is served by the API.
    let app = test::init_service(ctx.app()).await;
    let req = test::TestRequest::get().uri("/api/v1/titles/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["rating"], 7.5);
    assert_eq!(body["category"]["slug"], "movie");

    fs::remove_dir_all(&dir).ok();
}

#[actix_web::test]
async fn test_missing_files_are_skipped() {
    let ctx = TestContext::new().await;
    let dir = fixture_dir(&[("category.csv", CATEGORIES)]);

    let report = import_dir(&ctx.pool, &dir, &Fixture::ALL)
        .await
        .expect("Import should succeed");
    assert_eq!(report.loaded, vec![(Fixture::Categories, 2)]);
    assert_eq!(report.skipped.len(), Fixture::ALL.len() - 1);
    assert!(report.skipped.contains(&Fixture::Users));

    fs::remove_dir_all(&dir).ok();
}

#[actix_web::test]
async fn test_bad_file_aborts_import() {
    let ctx = TestContext::new().await;
    let dir = fixture_dir(&[
        ("category.csv", CATEGORIES),
        ("titles.csv", "id,name,year,category\n1,Broken,not-a-year,1\n"),
        ("genre.csv", GENRES),
    ]);

    let err = import_dir(&ctx.pool, &dir, &Fixture::ALL)
        .await
        .expect_err("Malformed rows should fail the import");
    assert!(format!("{:#}", err).contains("titles.csv"));

    // Files loaded before the failing one stay committed.
    assert_eq!(category::Entity::find().count(&ctx.pool).await.unwrap(), 2);
    assert_eq!(genre::Entity::find().count(&ctx.pool).await.unwrap(), 2);
    assert_eq!(title::Entity::find().count(&ctx.pool).await.unwrap(), 0);

    fs::remove_dir_all(&dir).ok();
}

#[actix_web::test]
async fn test_failed_file_is_rolled_back() {
    let ctx = TestContext::new().await;
    // Review 2 points at a title that does not exist.
    let dir = fixture_dir(&[
        ("users.csv", USERS),
        ("category.csv", CATEGORIES),
        ("titles.csv", TITLES),
        (
            "review.csv",
            "id,title_id,text,author,score,pub_date\n1,1,Fine,100,8,\n2,99,Orphan,101,3,\n",
        ),
    ]);

    assert!(import_dir(&ctx.pool, &dir, &Fixture::ALL).await.is_err());
    assert_eq!(title::Entity::find().count(&ctx.pool).await.unwrap(), 2);
    assert_eq!(review::Entity::find().count(&ctx.pool).await.unwrap(), 0);

    fs::remove_dir_all(&dir).ok();
}
