use crate::error::{ApiError, ApiResult};
use crate::models::{
    CategoryResponse, CommentResponse, GenreResponse, ReviewResponse, TitleResponse, UserResponse,
};
use actix_web::HttpRequest;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Page-number pagination envelope returned by every list endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    TitlePage = Page<TitleResponse>,
    CategoryPage = Page<CategoryResponse>,
    GenrePage = Page<GenreResponse>,
    ReviewPage = Page<ReviewResponse>,
    CommentPage = Page<CommentResponse>,
    UserPage = Page<UserResponse>
)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Absolute link to `page` of the current request, keeping the other query
/// parameters. The first page carries no `page` parameter.
pub fn page_link(req: &HttpRequest, page: u64) -> String {
    let info = req.connection_info();
    let mut params: Vec<&str> = req
        .query_string()
        .split('&')
        .filter(|param| !param.is_empty() && !param.starts_with("page="))
        .collect();
    let page_param = format!("page={}", page);
    if page > 1 {
        params.push(&page_param);
    }

    let base = format!("{}://{}{}", info.scheme(), info.host(), req.path());
    if params.is_empty() {
        base
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

/// Run `select` for the requested page. Pages past the end (other than the
/// first) are a 404, like an unknown object.
pub async fn paginate<E, C>(
    select: Select<E>,
    db: &C,
    req: &HttpRequest,
    page: Option<u64>,
    page_size: u64,
) -> ApiResult<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::NotFound("Invalid page.".to_string()));
    }
    let page_size = page_size.max(1);

    let paginator = select.paginate(db, page_size);
    let count = paginator.num_items().await?;
    let pages = (count + page_size - 1) / page_size;
    if page > 1 && page > pages {
        return Err(ApiError::NotFound("Invalid page.".to_string()));
    }
    let results = paginator.fetch_page(page - 1).await?;

    Ok(Page {
        count,
        next: (page < pages).then(|| page_link(req, page + 1)),
        previous: (page > 1).then(|| page_link(req, page - 1)),
        results,
    })
}
