use crate::api::titles::find_title;
use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::{review, user};
use crate::error::{unique_violation, ApiError, ApiResult, FieldErrors, NON_FIELD_ERRORS};
use crate::models::{paginate, Page, ReviewRequest, ReviewResponse};
use crate::permissions::{authorize, Policy};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

const ALREADY_REVIEWED: &str = "You have already reviewed this title.";

#[derive(Deserialize, utoipa::ToSchema)]
pub struct PageQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
}

/// Usernames for the given user ids.
pub(crate) async fn usernames(
    pool: &DbPool,
    ids: impl IntoIterator<Item = i64>,
) -> ApiResult<HashMap<i64, String>> {
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(pool)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect())
}

/// Review `review_id` of title `title_id`; a review of another title is a 404.
pub(crate) async fn find_review(
    pool: &DbPool,
    title_id: i64,
    review_id: i64,
) -> ApiResult<review::Model> {
    review::Entity::find_by_id(review_id)
        .filter(review::Column::TitleId.eq(title_id))
        .one(pool)
        .await?
        .ok_or_else(ApiError::not_found)
}

async fn review_response(pool: &DbPool, review: review::Model) -> ApiResult<ReviewResponse> {
    let author = usernames(pool, [review.author_id])
        .await?
        .remove(&review.author_id)
        .unwrap_or_default();
    Ok(ReviewResponse::new(review, author))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Paginated reviews, newest first", body = ReviewPage),
        (status = 404, description = "Title not found")
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<PageQuery>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let title = find_title(pool.get_ref(), path.into_inner()).await?;
    let select = review::Entity::find()
        .filter(review::Column::TitleId.eq(title.id))
        .order_by_desc(review::Column::PubDate)
        .order_by_desc(review::Column::Id);

    let page = paginate(
        select,
        pool.get_ref(),
        &req,
        query.page,
        config.pagination.page_size,
    )
    .await?;
    let authors = usernames(pool.get_ref(), page.results.iter().map(|r| r.author_id)).await?;
    let page: Page<ReviewResponse> = page.map(|r| {
        let author = authors.get(&r.author_id).cloned().unwrap_or_default();
        ReviewResponse::new(r, author)
    });
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews",
    params(("title_id" = i64, Path, description = "Title ID")),
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Validation error or title already reviewed by this user"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Title not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn create_review(
    req: HttpRequest,
    path: web::Path<i64>,
    requester: AuthenticatedUser,
    body: web::Json<ReviewRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::AuthenticatedOrReadOnly, Some(&requester.0), req.method(), None)?;
    let title = find_title(pool.get_ref(), path.into_inner()).await?;

    let body = body.into_inner();
    let checked = body.validate();
    let mut errors = FieldErrors::new();
    let text = errors.require("text", body.text);
    if body.score.is_none() {
        errors.add("score", "This field is required.");
    }
    errors.merge(checked);

    let existing = review::Entity::find()
        .filter(
            Condition::all()
                .add(review::Column::TitleId.eq(title.id))
                .add(review::Column::AuthorId.eq(requester.id)),
        )
        .count(pool.get_ref())
        .await?;
    if existing > 0 {
        errors.add(NON_FIELD_ERRORS, ALREADY_REVIEWED);
    }
    errors.into_result()?;

    let review = review::ActiveModel {
        title_id: Set(title.id),
        author_id: Set(requester.id),
        text: Set(text),
        score: Set(body.score.unwrap_or_default()),
        pub_date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.get_ref())
    .await
    // A concurrent request may have won the race past the check above.
    .map_err(|e| unique_violation(e, NON_FIELD_ERRORS, ALREADY_REVIEWED))?;

    log::debug!(
        "Review {} by {} on title {}",
        review.id,
        requester.username,
        title.id
    );
    Ok(HttpResponse::Created().json(ReviewResponse::new(review, requester.0.username)))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 404, description = "Title or review not found")
    ),
    tag = "reviews"
)]
pub async fn get_review(
    path: web::Path<(i64, i64)>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id) = path.into_inner();
    let review = find_review(pool.get_ref(), title_id, review_id).await?;
    Ok(HttpResponse::Ok().json(review_response(pool.get_ref(), review).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Only the author, moderators and admins may edit"),
        (status = 404, description = "Title or review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn update_review(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    requester: AuthenticatedUser,
    body: web::Json<ReviewRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id) = path.into_inner();
    let review = find_review(pool.get_ref(), title_id, review_id).await?;
    authorize(
        Policy::AuthorModeratorAdminOrReadOnly,
        Some(&requester.0),
        req.method(),
        Some(review.author_id),
    )?;

    let body = body.into_inner();
    let mut errors = FieldErrors::new();
    errors.merge(body.validate());
    errors.into_result()?;

    let mut active: review::ActiveModel = review.into();
    if let Some(text) = body.text {
        active.text = Set(text);
    }
    if let Some(score) = body.score {
        active.score = Set(score);
    }
    let review = active.update(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(review_response(pool.get_ref(), review).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted together with its comments"),
        (status = 403, description = "Only the author, moderators and admins may delete"),
        (status = 404, description = "Title or review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reviews"
)]
pub async fn delete_review(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    requester: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id) = path.into_inner();
    let review = find_review(pool.get_ref(), title_id, review_id).await?;
    authorize(
        Policy::AuthorModeratorAdminOrReadOnly,
        Some(&requester.0),
        req.method(),
        Some(review.author_id),
    )?;

    review.delete(pool.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}
