use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::{category, genre, review, title, title_genre};
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::models::{paginate, CategoryResponse, Page, GenreResponse, TitleRequest, TitleResponse};
use crate::permissions::{authorize, Policy};
use actix_web::{web, HttpRequest, HttpResponse};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;

const NOT_NULL: &str = "This field may not be null.";

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TitleQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Substring of the title name.
    pub name: Option<String>,
    pub year: Option<i32>,
}

/// Running mean of review scores per title.
#[derive(Debug, Default)]
pub struct RatingAccumulator {
    totals: HashMap<i64, (i64, i64)>,
}

impl RatingAccumulator {
    pub fn add(&mut self, title_id: i64, score: i16) {
        let entry = self.totals.entry(title_id).or_insert((0, 0));
        entry.0 += i64::from(score);
        entry.1 += 1;
    }

    /// Mean score of `title_id`, `None` when it has no reviews.
    pub fn rating(&self, title_id: i64) -> Option<f64> {
        self.totals
            .get(&title_id)
            .filter(|(_, count)| *count > 0)
            .map(|(sum, count)| *sum as f64 / *count as f64)
    }
}

/// Build read-shaped responses for `titles`, loading categories, genres and
/// ratings in one query each.
pub async fn title_responses<C: ConnectionTrait>(
    db: &C,
    titles: Vec<title::Model>,
) -> ApiResult<Vec<TitleResponse>> {
    if titles.is_empty() {
        return Ok(Vec::new());
    }
    let title_ids: Vec<i64> = titles.iter().map(|t| t.id).collect();
    let category_ids: Vec<i64> = titles.iter().filter_map(|t| t.category_id).collect();

    let categories: HashMap<i64, category::Model> = if category_ids.is_empty() {
        HashMap::new()
    } else {
        category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    let links = title_genre::Entity::find()
        .filter(title_genre::Column::TitleId.is_in(title_ids.clone()))
        .all(db)
        .await?;
    let genre_ids: Vec<i64> = links.iter().map(|l| l.genre_id).collect();
    let genres: HashMap<i64, genre::Model> = if genre_ids.is_empty() {
        HashMap::new()
    } else {
        genre::Entity::find()
            .filter(genre::Column::Id.is_in(genre_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|g| (g.id, g))
            .collect()
    };
    let mut genres_by_title: HashMap<i64, Vec<GenreResponse>> = HashMap::new();
    for link in links {
        if let Some(genre) = genres.get(&link.genre_id) {
            genres_by_title
                .entry(link.title_id)
                .or_default()
                .push(GenreResponse::from(genre.clone()));
        }
    }

    let scores: Vec<(i64, i16)> = review::Entity::find()
        .select_only()
        .column(review::Column::TitleId)
        .column(review::Column::Score)
        .filter(review::Column::TitleId.is_in(title_ids))
        .into_tuple()
        .all(db)
        .await?;
    let mut ratings = RatingAccumulator::default();
    for (title_id, score) in scores {
        ratings.add(title_id, score);
    }

    Ok(titles
        .into_iter()
        .map(|t| {
            let mut genre = genres_by_title.remove(&t.id).unwrap_or_default();
            genre.sort_by(|a, b| a.name.cmp(&b.name));
            TitleResponse {
                id: t.id,
                rating: ratings.rating(t.id),
                genre,
                category: t
                    .category_id
                    .and_then(|id| categories.get(&id).cloned())
                    .map(CategoryResponse::from),
                name: t.name,
                year: t.year,
                description: t.description,
            }
        })
        .collect())
}

async fn title_response<C: ConnectionTrait>(db: &C, title: title::Model) -> ApiResult<TitleResponse> {
    title_responses(db, vec![title])
        .await?
        .pop()
        .ok_or_else(ApiError::not_found)
}

pub(crate) async fn find_title(pool: &DbPool, title_id: i64) -> ApiResult<title::Model> {
    title::Entity::find_by_id(title_id)
        .one(pool)
        .await?
        .ok_or_else(ApiError::not_found)
}

/// Validated title payload with slugs resolved to ids.
struct TitleChanges {
    name: Option<String>,
    year: Option<i32>,
    description: Option<String>,
    category_id: Option<i64>,
    genre_ids: Option<Vec<i64>>,
}

async fn resolve_request(
    pool: &DbPool,
    body: TitleRequest,
    partial: bool,
) -> ApiResult<TitleChanges> {
    let checked = body.validate();
    let mut errors = FieldErrors::new();
    if !partial {
        if body.name.is_none() {
            errors.add("name", "This field is required.");
        }
        if body.year.is_none() {
            errors.add("year", "This field is required.");
        }
    }
    errors.merge(checked);

    let category_id = match body.category {
        Some(None) => {
            errors.add("category", NOT_NULL);
            None
        }
        Some(Some(slug)) => {
            let found = category::Entity::find()
                .filter(category::Column::Slug.eq(slug.as_str()))
                .one(pool)
                .await?;
            match found {
                Some(category) => Some(category.id),
                None => {
                    errors.add(
                        "category",
                        format!("Object with slug={} does not exist.", slug),
                    );
                    None
                }
            }
        }
        None => None,
    };

    let genre_ids = match body.genre {
        Some(None) => {
            errors.add("genre", NOT_NULL);
            None
        }
        Some(Some(slugs)) => {
            let found = genre::Entity::find()
                .filter(genre::Column::Slug.is_in(slugs.clone()))
                .all(pool)
                .await?;
            let by_slug: HashMap<&str, i64> =
                found.iter().map(|g| (g.slug.as_str(), g.id)).collect();
            let mut ids = Vec::with_capacity(slugs.len());
            for slug in &slugs {
                match by_slug.get(slug.as_str()) {
                    Some(id) if !ids.contains(id) => ids.push(*id),
                    Some(_) => {}
                    None => errors.add(
                        "genre",
                        format!("Object with slug={} does not exist.", slug),
                    ),
                }
            }
            Some(ids)
        }
        None => None,
    };

    errors.into_result()?;
    Ok(TitleChanges {
        name: body.name,
        year: body.year,
        description: body.description,
        category_id,
        genre_ids,
    })
}

async fn replace_genres<C: ConnectionTrait>(
    db: &C,
    title_id: i64,
    genre_ids: Vec<i64>,
) -> ApiResult<()> {
    title_genre::Entity::delete_many()
        .filter(title_genre::Column::TitleId.eq(title_id))
        .exec(db)
        .await?;
    if genre_ids.is_empty() {
        return Ok(());
    }
    let links = genre_ids.into_iter().map(|genre_id| title_genre::ActiveModel {
        title_id: Set(title_id),
        genre_id: Set(genre_id),
    });
    title_genre::Entity::insert_many(links).exec_without_returning(db).await?;
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/v1/titles",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("category" = Option<String>, Query, description = "Category slug"),
        ("genre" = Option<String>, Query, description = "Genre slug"),
        ("name" = Option<String>, Query, description = "Name substring"),
        ("year" = Option<i32>, Query, description = "Exact year")
    ),
    responses(
        (status = 200, description = "Paginated titles ordered by name", body = TitlePage)
    ),
    tag = "titles"
)]
pub async fn list_titles(
    req: HttpRequest,
    query: web::Query<TitleQuery>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let mut select = title::Entity::find()
        .order_by_asc(title::Column::Name)
        .order_by_asc(title::Column::Id);

    if let Some(slug) = query.category.filter(|s| !s.is_empty()) {
        select = select.filter(
            title::Column::CategoryId.in_subquery(
                Query::select()
                    .column(category::Column::Id)
                    .from(category::Entity)
                    .and_where(Expr::col(category::Column::Slug).eq(slug))
                    .to_owned(),
            ),
        );
    }
    if let Some(slug) = query.genre.filter(|s| !s.is_empty()) {
        select = select.filter(
            title::Column::Id.in_subquery(
                Query::select()
                    .column((title_genre::Entity, title_genre::Column::TitleId))
                    .from(title_genre::Entity)
                    .inner_join(
                        genre::Entity,
                        Expr::col((genre::Entity, genre::Column::Id))
                            .equals((title_genre::Entity, title_genre::Column::GenreId)),
                    )
                    .and_where(Expr::col((genre::Entity, genre::Column::Slug)).eq(slug))
                    .to_owned(),
            ),
        );
    }
    if let Some(name) = query.name.filter(|s| !s.is_empty()) {
        select = select.filter(title::Column::Name.contains(&name));
    }
    if let Some(year) = query.year {
        select = select.filter(title::Column::Year.eq(year));
    }

    let page = paginate(
        select,
        pool.get_ref(),
        &req,
        query.page,
        config.pagination.page_size,
    )
    .await?;
    let results = title_responses(pool.get_ref(), page.results).await?;

    Ok(HttpResponse::Ok().json(Page {
        count: page.count,
        next: page.next,
        previous: page.previous,
        results,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = i64, Path, description = "Title ID")),
    responses(
        (status = 200, description = "Title", body = TitleResponse),
        (status = 404, description = "Title not found")
    ),
    tag = "titles"
)]
pub async fn get_title(
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    let title = find_title(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(title_response(pool.get_ref(), title).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/titles",
    request_body = TitleRequest,
    responses(
        (status = 201, description = "Title created", body = TitleResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "titles"
)]
pub async fn create_title(
    req: HttpRequest,
    requester: AuthenticatedUser,
    body: web::Json<TitleRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::AdminOrReadOnly, Some(&requester.0), req.method(), None)?;
    let changes = resolve_request(pool.get_ref(), body.into_inner(), false).await?;

    let txn = pool.begin().await?;
    let title = title::ActiveModel {
        name: Set(changes.name.unwrap_or_default()),
        year: Set(changes.year.unwrap_or_default()),
        description: Set(changes.description),
        category_id: Set(changes.category_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    if let Some(genre_ids) = changes.genre_ids {
        replace_genres(&txn, title.id, genre_ids).await?;
    }
    let response = title_response(&txn, title).await?;
    txn.commit().await?;

    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    patch,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = i64, Path, description = "Title ID")),
    request_body = TitleRequest,
    responses(
        (status = 200, description = "Title updated", body = TitleResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Title not found")
    ),
    security(("bearer_auth" = [])),
    tag = "titles"
)]
pub async fn update_title(
    req: HttpRequest,
    path: web::Path<i64>,
    requester: AuthenticatedUser,
    body: web::Json<TitleRequest>,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::AdminOrReadOnly, Some(&requester.0), req.method(), None)?;
    let title = find_title(pool.get_ref(), path.into_inner()).await?;
    let changes = resolve_request(pool.get_ref(), body.into_inner(), true).await?;

    let txn = pool.begin().await?;
    let mut active: title::ActiveModel = title.into();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(year) = changes.year {
        active.year = Set(year);
    }
    if let Some(description) = changes.description {
        active.description = Set(Some(description));
    }
    if let Some(category_id) = changes.category_id {
        active.category_id = Set(Some(category_id));
    }
    let title = active.update(&txn).await?;
    if let Some(genre_ids) = changes.genre_ids {
        replace_genres(&txn, title.id, genre_ids).await?;
    }
    let response = title_response(&txn, title).await?;
    txn.commit().await?;

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    delete,
    path = "/api/v1/titles/{title_id}",
    params(("title_id" = i64, Path, description = "Title ID")),
    responses(
        (status = 204, description = "Title deleted together with its reviews"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Title not found")
    ),
    security(("bearer_auth" = [])),
    tag = "titles"
)]
pub async fn delete_title(
    req: HttpRequest,
    path: web::Path<i64>,
    requester: AuthenticatedUser,
    pool: web::Data<DbPool>,
) -> ApiResult<HttpResponse> {
    authorize(Policy::AdminOrReadOnly, Some(&requester.0), req.method(), None)?;
    let title = find_title(pool.get_ref(), path.into_inner()).await?;
    title.delete(pool.get_ref()).await?;
    Ok(HttpResponse::NoContent().finish())
}
