use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::category;
use crate::error::{unique_violation, ApiError, ApiResult, FieldErrors};
use crate::models::{paginate, CategoryRequest, CategoryResponse};
use crate::permissions::{authorize, Policy};
use actix_web::{web, HttpRequest, HttpResponse};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CatalogQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Substring of the name.
    pub search: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("search" = Option<String>, Query, description = "Name substring")
    ),
    responses(
        (status = 200, description = "Paginated categories", body = CategoryPage)
    ),
    tag = "categories"
)]
pub async fn list_categories(
    req: HttpRequest,
    query: web::Query<CatalogQuery>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let mut select = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .order_by_asc(category::Column::Id);
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(category::Column::Name.contains(search));
    }

    let page = paginate(
        select,
        pool.get_ref(),
        &req,
        query.page,
        config.pagination.page_size,
    )
    .await?;
    Ok(HttpResponse::Ok().json(page.map(CategoryResponse::from)))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn create_category(
    req: HttpRequest,
    requester: AuthenticatedUser,
    body: web::Json<CategoryRequest>,
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
        let taken = category::Entity::find()
            .filter(category::Column::Slug.eq(slug.as_str()))
            .one(pool.get_ref())
            .await?;
        if taken.is_some() {
            errors.add("slug", "A category with this slug already exists.");
        }
    }
    errors.into_result()?;

    let category = category::ActiveModel {
        name: Set(name),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(pool.get_ref())
    .await
    .map_err(|e| unique_violation(e, "slug", "A category with this slug already exists."))?;

    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{slug}",
    params(("slug" = String, Path, description = "Category slug")),
    responses(
        (status = 204, description = "Category deleted; its titles keep existing without a category"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn delete_category(
    req: HttpRequest,
    path: web::Path<String>,
    requester: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::AdminOrReadOnly, Some(&requester.0), req.method(), None)?;

    let category = category::Entity::find()
        .filter(category::Column::Slug.eq(path.into_inner()))
        .one(pool.get_ref())
        .await?
        .ok_or_else(ApiError::not_found)?;
    category.delete(pool.get_ref()).await?;

    Ok(HttpResponse::NoContent().finish())
}
