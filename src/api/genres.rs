use crate::api::categories::CatalogQuery;
use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::genre;
use crate::error::{unique_violation, ApiError, ApiResult, FieldErrors};
use crate::models::{paginate, GenreRequest, GenreResponse};
use crate::permissions::{authorize, Policy};
use actix_web::{web, HttpRequest, HttpResponse};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use validator::Validate;

#[utoipa::path(
    get,
    path = "/api/v1/genres",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("search" = Option<String>, Query, description = "Name substring")
    ),
    responses(
        (status = 200, description = "Paginated genres", body = GenrePage)
    ),
    tag = "genres"
)]
pub async fn list_genres(
    req: HttpRequest,
    query: web::Query<CatalogQuery>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let mut select = genre::Entity::find()
        .order_by_asc(genre::Column::Name)
        .order_by_asc(genre::Column::Id);
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(genre::Column::Name.contains(search));
    }

    let page = paginate(
        select,
        pool.get_ref(),
        &req,
        query.page,
        config.pagination.page_size,
    )
    .await?;
    Ok(HttpResponse::Ok().json(page.map(GenreResponse::from)))
}

#[utoipa::path(
    post,
    path = "/api/v1/genres",
    request_body = GenreRequest,
    responses(
        (status = 201, description = "Genre created", body = GenreResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "genres"
)]
pub async fn create_genre(
    req: HttpRequest,
    requester: AuthenticatedUser,
    body: web::Json<GenreRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::AdminOrReadOnly, Some(&requester.0), req.method(), None)?;

    let body = body.into_inner();
    let checked = body.validate();
    let mut errors = FieldErrors::new();
    let name = errors.require("name", body.name);
    let slug = errors.require("slug", body.slug);
    errors.merge(checked);
    if !slug.is_empty() {
        let taken = genre::Entity::find()
            .filter(genre::Column::Slug.eq(slug.as_str()))
            .one(pool.get_ref())
            .await?;
        if taken.is_some() {
            errors.add("slug", "A genre with this slug already exists.");
        }
    }
    errors.into_result()?;

    let genre = genre::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(pool.get_ref())
    .await
    .map_err(|e| unique_violation(e, "slug", "A genre with this slug already exists."))?;

    Ok(HttpResponse::Created().json(GenreResponse::from(genre)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/genres/{slug}",
    params(("slug" = String, Path, description = "Genre slug")),
    responses(
        (status = 204, description = "Genre deleted and detached from its titles"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Genre not found")
    ),
    security(("bearer_auth" = [])),
    tag = "genres"
)]
pub async fn delete_genre(
    req: HttpRequest,
    path: web::Path<String>,
    requester: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::AdminOrReadOnly, Some(&requester.0), req.method(), None)?;

    let genre = genre::Entity::find()
        .filter(genre::Column::Slug.eq(path.into_inner()))
        .one(pool.get_ref())
        .await?
        .ok_or_else(ApiError::not_found)?;
    genre.delete(pool.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}
