use crate::auth::{create_token, issue_confirmation_code, verify_confirmation_code, Claims};
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::user::{self, Role};
use crate::error::{unique_violation, ApiError, ApiResult, FieldErrors};
use crate::models::{SignupRequest, SignupResponse, TokenRequest, TokenResponse};
use crate::services::{confirmation_mail, Mailer};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use validator::Validate;

/// Find the user registered with exactly this username and email, or create
/// one. Either value being taken by somebody else is a validation error.
async fn get_or_create_user(
    pool: &DbPool,
    username: &str,
    email: &str,
) -> ApiResult<user::Model> {
    let matches = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(username))
                .add(user::Column::Email.eq(email)),
        )
        .all(pool)
        .await?;

    if let Some(existing) = matches
        .iter()
        .find(|u| u.username == username && u.email == email)
    {
        return Ok(existing.clone());
    }

    if !matches.is_empty() {
        let mut errors = FieldErrors::new();
        for taken in &matches {
            if taken.username == username {
                errors.add("username", "A user with that username already exists.");
            }
            if taken.email == email {
                errors.add("email", "A user with that email already exists.");
            }
        }
        return Err(ApiError::Validation(errors));
    }

    let now = Utc::now();
    let new_user = user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        bio: Set(None),
        role: Set(Role::User),
        is_superuser: Set(false),
        confirmation_code_hash: Set(None),
        confirmation_sent_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    new_user
        .insert(pool)
        .await
        .map_err(|e| unique_violation(e, "email", "A user with that email already exists."))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Confirmation code sent", body = SignupResponse),
        (status = 400, description = "Invalid username or email")
    ),
    tag = "auth"
)]
pub async fn signup(
    req: web::Json<SignupRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    mailer: web::Data<dyn Mailer>,
) -> ApiResult<HttpResponse> {
    let req = req.into_inner();
    let checked = req.validate();
    let mut errors = FieldErrors::new();
    let username = errors.require("username", req.username);
    let email = errors.require("email", req.email);
    errors.merge(checked);
    errors.into_result()?;

    let user = get_or_create_user(pool.get_ref(), &username, &email).await?;

    let issued = issue_confirmation_code(config.auth.confirmation_cost)?;
    let mut active: user::ActiveModel = user.into();
    active.confirmation_code_hash = Set(Some(issued.hash));
    active.confirmation_sent_at = Set(Some(issued.issued_at));
    active.updated_at = Set(Utc::now());
    let user = active.update(pool.get_ref()).await?;

    mailer
        .send(confirmation_mail(&user.email, &issued.code))
        .await
        .map_err(ApiError::Internal)?;
    log::info!("Confirmation code sent to user {}", user.username);

    Ok(HttpResponse::Ok().json(SignupResponse {
        username: user.username,
        email: user.email,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or invalid confirmation code"),
        (status = 404, description = "User not found")
    ),
    tag = "auth"
)]
pub async fn token(
    req: web::Json<TokenRequest>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let req = req.into_inner();
    let mut errors = FieldErrors::new();
    let username = errors.require("username", req.username);
    let code = errors.require("confirmation_code", req.confirmation_code);
    errors.into_result()?;

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .one(pool.get_ref())
        .await?
        .ok_or_else(|| ApiError::NotFound("No user matches the given query.".to_string()))?;

    let valid = verify_confirmation_code(
        &code,
        user.confirmation_code_hash.as_deref(),
        user.confirmation_sent_at,
        config.auth.confirmation_ttl_hours,
    );
    if !valid {
        return Err(ApiError::validation(
            "confirmation_code",
            "Invalid confirmation code.",
        ));
    }

    // Codes are single use.
    let mut active: user::ActiveModel = user.into();
    active.confirmation_code_hash = Set(None);
    active.confirmation_sent_at = Set(None);
    active.updated_at = Set(Utc::now());
    let user = active.update(pool.get_ref()).await?;

    let claims = Claims::new(
        user.id,
        user.username.clone(),
        user.role.clone(),
        config.jwt.expiration_hours,
    );
    let token = create_token(&claims, &config.jwt.secret)?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
