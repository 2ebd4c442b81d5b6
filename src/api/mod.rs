pub mod auth;
pub mod categories;
pub mod comments;
pub mod genres;
pub mod reviews;
pub mod titles;
pub mod users;

use crate::entities::user::Role;
use crate::error::{ApiError, FieldErrors, NON_FIELD_ERRORS};
use crate::models::{
    CategoryPage, CategoryRequest, CategoryResponse, CommentPage, CommentRequest, CommentResponse,
    DeleteUserRequest, GenrePage, GenreRequest, GenreResponse, ReviewPage, ReviewRequest,
    ReviewResponse, SignupRequest, SignupResponse, TitlePage, TitleRequest, TitleResponse,
    TokenRequest, TokenResponse, UserPage, UserRequest, UserResponse,
};
use actix_web::web;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth endpoints
        auth::signup,
        auth::token,
        // Catalog endpoints
        categories::list_categories,
        categories::create_category,
        categories::delete_category,
        genres::list_genres,
        genres::create_genre,
        genres::delete_genre,
        titles::list_titles,
        titles::get_title,
        titles::create_title,
        titles::update_title,
        titles::delete_title,
        // Review endpoints
        reviews::list_reviews,
        reviews::create_review,
        reviews::get_review,
        reviews::update_review,
        reviews::delete_review,
        comments::list_comments,
        comments::create_comment,
        comments::get_comment,
        comments::update_comment,
        comments::delete_comment,
        // User endpoints
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user_by_username,
        users::get_me,
        users::update_me,
        users::delete_user,
    ),
    components(schemas(
        SignupRequest,
        SignupResponse,
        TokenRequest,
        TokenResponse,
        UserRequest,
        UserResponse,
        DeleteUserRequest,
        Role,
        CategoryRequest,
        CategoryResponse,
        GenreRequest,
        GenreResponse,
        TitleRequest,
        TitleResponse,
        ReviewRequest,
        ReviewResponse,
        CommentRequest,
        CommentResponse,
        TitlePage,
        CategoryPage,
        GenrePage,
        ReviewPage,
        CommentPage,
        UserPage,
        titles::TitleQuery,
        categories::CatalogQuery,
        reviews::PageQuery,
        users::UserQuery,
    )),
    tags(
        (name = "auth", description = "Signup and token endpoints"),
        (name = "categories", description = "Category endpoints"),
        (name = "genres", description = "Genre endpoints"),
        (name = "titles", description = "Title endpoints"),
        (name = "reviews", description = "Review endpoints"),
        (name = "comments", description = "Comment endpoints"),
        (name = "users", description = "User management endpoints"),
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

use utoipa::Modify;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

/// Malformed JSON bodies become regular validation errors.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::Validation(FieldErrors::single(NON_FIELD_ERRORS, err.to_string())).into()
    })
}

/// Same for query strings, e.g. `?page=abc`.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::Validation(FieldErrors::single(NON_FIELD_ERRORS, err.to_string())).into()
    })
}

/// Register every `/api/v1` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .app_data(json_config())
            .app_data(query_config())
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/token", web::post().to(auth::token)),
            )
            .route("/signup", web::post().to(auth::signup))
            .route("/token", web::post().to(auth::token))
            .service(
                web::resource("/categories")
                    .route(web::get().to(categories::list_categories))
                    .route(web::post().to(categories::create_category)),
            )
            .service(
                web::resource("/categories/{slug}")
                    .route(web::delete().to(categories::delete_category)),
            )
            .service(
                web::resource("/genres")
                    .route(web::get().to(genres::list_genres))
                    .route(web::post().to(genres::create_genre)),
            )
            .service(
                web::resource("/genres/{slug}").route(web::delete().to(genres::delete_genre)),
            )
            .service(
                web::resource("/titles")
                    .route(web::get().to(titles::list_titles))
                    .route(web::post().to(titles::create_title)),
            )
            .service(
                web::resource("/titles/{title_id}")
                    .route(web::get().to(titles::get_title))
                    .route(web::patch().to(titles::update_title))
                    .route(web::delete().to(titles::delete_title)),
            )
            .service(
                web::resource("/titles/{title_id}/reviews")
                    .route(web::get().to(reviews::list_reviews))
                    .route(web::post().to(reviews::create_review)),
            )
            .service(
                web::resource("/titles/{title_id}/reviews/{review_id}")
                    .route(web::get().to(reviews::get_review))
                    .route(web::patch().to(reviews::update_review))
                    .route(web::delete().to(reviews::delete_review)),
            )
            .service(
                web::resource("/titles/{title_id}/reviews/{review_id}/comments")
                    .route(web::get().to(comments::list_comments))
                    .route(web::post().to(comments::create_comment)),
            )
            .service(
                web::resource("/titles/{title_id}/reviews/{review_id}/comments/{comment_id}")
                    .route(web::get().to(comments::get_comment))
                    .route(web::patch().to(comments::update_comment))
                    .route(web::delete().to(comments::delete_comment)),
            )
            // Fixed user paths must be registered before `/users/{username}`.
            .service(
                web::resource("/users/me")
                    .route(web::get().to(users::get_me))
                    .route(web::patch().to(users::update_me))
                    .route(web::put().to(users::reject_put)),
            )
            .service(
                web::resource("/users/delete_user")
                    .route(web::delete().to(users::delete_user)),
            )
            .service(
                web::resource("/users")
                    .route(web::get().to(users::list_users))
                    .route(web::post().to(users::create_user)),
            )
            .service(
                web::resource("/users/{username}")
                    .route(web::get().to(users::get_user))
                    .route(web::patch().to(users::update_user))
                    .route(web::delete().to(users::delete_user_by_username))
                    .route(web::put().to(users::reject_put)),
            ),
    );
}
