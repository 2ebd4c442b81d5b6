use crate::auth::verify_token;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::user;
use crate::error::ApiError;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::EntityTrait;
use std::ops::Deref;

/// The user behind a valid `Authorization: Bearer <jwt>` header.
///
/// The row is reloaded on every request so role changes and deletions take
/// effect immediately.
pub struct AuthenticatedUser(pub user::Model);

impl Deref for AuthenticatedUser {
    type Target = user::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let token = bearer_token(req);
        let config = req.app_data::<web::Data<Config>>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move {
            let token = token.ok_or(ApiError::Unauthorized)?;
            let (config, pool) = match (config, pool) {
                (Some(config), Some(pool)) => (config, pool),
                _ => {
                    return Err(ApiError::Internal(anyhow::anyhow!(
                        "Config or database pool missing from app data"
                    )))
                }
            };

            let claims = verify_token(&token, &config.jwt.secret).map_err(|e| {
                log::debug!("Rejected bearer token: {:?}", e);
                ApiError::Unauthorized
            })?;
            let user_id = claims.user_id().ok_or(ApiError::Unauthorized)?;

            let user = user::Entity::find_by_id(user_id)
                .one(pool.get_ref())
                .await?
                .ok_or(ApiError::Unauthorized)?;

            Ok(AuthenticatedUser(user))
        })
    }
}
