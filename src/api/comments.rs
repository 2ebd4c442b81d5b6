use crate::api::reviews::{find_review, usernames, PageQuery};
use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::{comment, review};
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::models::{paginate, CommentRequest, CommentResponse};
use crate::permissions::{authorize, Policy};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use validator::Validate;

/// Comment `comment_id` together with the review it belongs to.
async fn find_comment(
    pool: &DbPool,
    title_id: i64,
    review_id: i64,
    comment_id: i64,
) -> ApiResult<(review::Model, comment::Model)> {
    let review = find_review(pool, title_id, review_id).await?;
    let comment = comment::Entity::find_by_id(comment_id)
        .filter(comment::Column::ReviewId.eq(review.id))
        .one(pool)
        .await?
        .ok_or_else(ApiError::not_found)?;
    Ok((review, comment))
}

async fn comment_response(
    pool: &DbPool,
    review: review::Model,
    comment: comment::Model,
) -> ApiResult<CommentResponse> {
    let author = usernames(pool, [comment.author_id])
        .await?
        .remove(&comment.author_id)
        .unwrap_or_default();
    Ok(CommentResponse::new(comment, author, review.text))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("page" = Option<u64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Paginated comments, newest first", body = CommentPage),
        (status = 404, description = "Title or review not found")
    ),
    tag = "comments"
)]
pub async fn list_comments(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    query: web::Query<PageQuery>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id) = path.into_inner();
    let review = find_review(pool.get_ref(), title_id, review_id).await?;
    let select = comment::Entity::find()
        .filter(comment::Column::ReviewId.eq(review.id))
        .order_by_desc(comment::Column::PubDate)
        .order_by_desc(comment::Column::Id);

    let page = paginate(
        select,
        pool.get_ref(),
        &req,
        query.page,
        config.pagination.page_size,
    )
    .await?;
    let authors = usernames(pool.get_ref(), page.results.iter().map(|c| c.author_id)).await?;
    Ok(HttpResponse::Ok().json(page.map(|c| {
        let author = authors.get(&c.author_id).cloned().unwrap_or_default();
        CommentResponse::new(c, author, review.text.clone())
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Title or review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn create_comment(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    requester: AuthenticatedUser,
    body: web::Json<CommentRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::AuthenticatedOrReadOnly, Some(&requester.0), req.method(), None)?;
    let (title_id, review_id) = path.into_inner();
    let review = find_review(pool.get_ref(), title_id, review_id).await?;

    let body = body.into_inner();
    let checked = body.validate();
    let mut errors = FieldErrors::new();
    let text = errors.require("text", body.text);
    errors.merge(checked);
    errors.into_result()?;

    let comment = comment::ActiveModel {
        review_id: Set(review.id),
        author_id: Set(requester.id),
        text: Set(text),
        pub_date: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(CommentResponse::new(
        comment,
        requester.0.username,
        review.text,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment", body = CommentResponse),
        (status = 404, description = "Title, review or comment not found")
    ),
    tag = "comments"
)]
pub async fn get_comment(
    path: web::Path<(i64, i64, i64)>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id, comment_id) = path.into_inner();
    let (review, comment) = find_comment(pool.get_ref(), title_id, review_id, comment_id).await?;
    Ok(HttpResponse::Ok().json(comment_response(pool.get_ref(), review, comment).await?))
}

#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Only the author, moderators and admins may edit"),
        (status = 404, description = "Title, review or comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn update_comment(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    requester: AuthenticatedUser,
    body: web::Json<CommentRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id, comment_id) = path.into_inner();
    let (review, comment) = find_comment(pool.get_ref(), title_id, review_id, comment_id).await?;
    authorize(
        Policy::AuthorModeratorAdminOrReadOnly,
        Some(&requester.0),
        req.method(),
        Some(comment.author_id),
    )?;

    let body = body.into_inner();
    let mut errors = FieldErrors::new();
    errors.merge(body.validate());
    errors.into_result()?;
    let Some(text) = body.text else {
        return Ok(HttpResponse::Ok().json(comment_response(pool.get_ref(), review, comment).await?));
    };

    let mut active: comment::ActiveModel = comment.into();
    active.text = Set(text);
    let comment = active.update(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(comment_response(pool.get_ref(), review, comment).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
    params(
        ("title_id" = i64, Path, description = "Title ID"),
        ("review_id" = i64, Path, description = "Review ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 403, description = "Only the author, moderators and admins may delete"),
        (status = 404, description = "Title, review or comment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "comments"
)]
pub async fn delete_comment(
    req: HttpRequest,
    path: web::Path<(i64, i64, i64)>,
    requester: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    let (title_id, review_id, comment_id) = path.into_inner();
    let (_, comment) = find_comment(pool.get_ref(), title_id, review_id, comment_id).await?;
    authorize(
        Policy::AuthorModeratorAdminOrReadOnly,
        Some(&requester.0),
        req.method(),
        Some(comment.author_id),
    )?;

    comment.delete(pool.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}
