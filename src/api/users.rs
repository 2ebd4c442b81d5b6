use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::user::{self, Role};
use crate::error::{unique_violation, ApiError, ApiResult, FieldErrors};
use crate::models::{paginate, DeleteUserRequest, UserRequest, UserResponse};
use crate::permissions::{authorize, Policy};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct UserQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Substring of the username.
    pub search: Option<String>,
}

async fn find_by_username(pool: &DbPool, username: &str) -> ApiResult<user::Model> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(pool)
        .await?
        .ok_or_else(ApiError::not_found)
}

/// Check that `column` = `value` is not used by anyone except `current_id`.
async fn ensure_unique(
    pool: &DbPool,
    column: user::Column,
    value: &str,
    current_id: Option<i64>,
    errors: &mut FieldErrors,
    field: &str,
    message: &str,
) -> ApiResult<()> {
    let mut select = user::Entity::find().filter(column.eq(value));
    if let Some(id) = current_id {
        select = select.filter(user::Column::Id.ne(id));
    }
    if select.one(pool).await?.is_some() {
        errors.add(field, message);
    }
    Ok(())
}

/// Validate `req` and copy it onto `active`. `current` is the stored user
/// for updates; `allow_role` is false for self-service edits.
async fn apply_changes(
    pool: &DbPool,
    active: &mut user::ActiveModel,
    req: UserRequest,
    current: Option<&user::Model>,
    allow_role: bool,
) -> ApiResult<()> {
    let checked = req.validate();
    let mut errors = FieldErrors::new();
    let current_id = current.map(|u| u.id);

    let username = match (current, req.username) {
        (None, value) => Some(errors.require("username", value)),
        (Some(_), value) => value.map(|v| errors.require("username", Some(v))),
    };
    let email = match (current, req.email) {
        (None, value) => Some(errors.require("email", value)),
        (Some(_), value) => value.map(|v| errors.require("email", Some(v))),
    };
    errors.merge(checked);

    if let Some(username) = username.as_deref().filter(|u| !u.is_empty()) {
        ensure_unique(
            pool,
            user::Column::Username,
            username,
            current_id,
            &mut errors,
            "username",
            "A user with that username already exists.",
        )
        .await?;
    }
    if let Some(email) = email.as_deref().filter(|e| !e.is_empty()) {
        ensure_unique(
            pool,
            user::Column::Email,
            email,
            current_id,
            &mut errors,
            "email",
            "A user with that email already exists.",
        )
        .await?;
    }
    errors.into_result()?;

    if let Some(username) = username {
        active.username = Set(username);
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(first_name) = req.first_name {
        active.first_name = Set(first_name);
    }
    if let Some(last_name) = req.last_name {
        active.last_name = Set(last_name);
    }
    if let Some(bio) = req.bio {
        active.bio = Set(Some(bio));
    }
    if allow_role {
        if let Some(role) = req.role {
            active.role = Set(role);
        }
    }
    active.updated_at = Set(Utc::now());
    Ok(())
}

async fn save(pool: &DbPool, active: user::ActiveModel) -> ApiResult<user::Model> {
    let saved = if active.is_not_set(user::Column::Id) {
        active.insert(pool).await
    } else {
        active.update(pool).await
    };
    saved.map_err(|e| unique_violation(e, "username", "A user with that username already exists."))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("search" = Option<String>, Query, description = "Username substring")
    ),
    responses(
        (status = 200, description = "Paginated users", body = UserPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    req: HttpRequest,
    requester: AuthenticatedUser,
    query: web::Query<UserQuery>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::Admin, Some(&requester.0), req.method(), None)?;

    let mut select = user::Entity::find().order_by_asc(user::Column::Username);
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(user::Column::Username.contains(search));
    }

    let page = paginate(
        select,
        pool.get_ref(),
        &req,
        query.page,
        config.pagination.page_size,
    )
    .await?;
    Ok(HttpResponse::Ok().json(page.map(UserResponse::from)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    req: HttpRequest,
    requester: AuthenticatedUser,
    body: web::Json<UserRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::Admin, Some(&requester.0), req.method(), None)?;

    let now = Utc::now();
    let mut active = user::ActiveModel {
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        bio: Set(None),
        role: Set(Role::User),
        is_superuser: Set(false),
        confirmation_code_hash: Set(None),
        confirmation_sent_at: Set(None),
        created_at: Set(now),
        ..Default::default()
    };
    apply_changes(pool.get_ref(), &mut active, body.into_inner(), None, true).await?;
    let user = save(pool.get_ref(), active).await?;

    log::info!("User {} created by {}", user.username, requester.username);
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    req: HttpRequest,
    path: web::Path<String>,
    requester: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::Admin, Some(&requester.0), req.method(), None)?;
    let user = find_by_username(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    req: HttpRequest,
    path: web::Path<String>,
    requester: AuthenticatedUser,
    body: web::Json<UserRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::Admin, Some(&requester.0), req.method(), None)?;
    let user = find_by_username(pool.get_ref(), &path.into_inner()).await?;

    let mut active: user::ActiveModel = user.clone().into();
    apply_changes(pool.get_ref(), &mut active, body.into_inner(), Some(&user), true).await?;
    let user = save(pool.get_ref(), active).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    params(("username" = String, Path, description = "Username")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user_by_username(
    req: HttpRequest,
    path: web::Path<String>,
    requester: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::Admin, Some(&requester.0), req.method(), None)?;
    let user = find_by_username(pool.get_ref(), &path.into_inner()).await?;
    let username = user.username.clone();
    user.delete(pool.get_ref()).await?;

    log::info!("User {} deleted by {}", username, requester.username);
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_me(requester: AuthenticatedUser) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(UserResponse::from(requester.0)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UserRequest,
    responses(
        (status = 200, description = "Own profile updated; role is never changed", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_me(
    requester: AuthenticatedUser,
    body: web::Json<UserRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    let current = requester.0;
    let mut active: user::ActiveModel = current.clone().into();
    apply_changes(pool.get_ref(), &mut active, body.into_inner(), Some(&current), false).await?;
    let user = save(pool.get_ref(), active).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Full replacement of a user is not supported; PATCH instead.
pub async fn reject_put() -> ApiResult<HttpResponse> {
    Err(ApiError::MethodNotAllowed("PUT".to_string()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/delete_user",
    request_body = DeleteUserRequest,
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Superuser only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    req: HttpRequest,
    requester: AuthenticatedUser,
    body: web::Json<DeleteUserRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::Superuser, Some(&requester.0), req.method(), None)?;

    let mut errors = FieldErrors::new();
    let username = errors.require("username", body.into_inner().username);
    errors.into_result()?;

    let user = find_by_username(pool.get_ref(), &username).await?;
    user.delete(pool.get_ref()).await?;

    log::info!("User {} deleted by superuser {}", username, requester.username);
    Ok(HttpResponse::Ok().finish())
}
