use crate::entities::{category, genre};
use crate::validators::{validate_not_blank, validate_slug, validate_year};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 256, message = "Ensure this field has no more than 256 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        custom(function = "validate_slug"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub name: String,
    pub slug: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(category: category::Model) -> Self {
        CategoryResponse {
            name: category.name,
            slug: category.slug,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct GenreRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 256, message = "Ensure this field has no more than 256 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        custom(function = "validate_slug"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GenreResponse {
    pub name: String,
    pub slug: String,
}

impl From<genre::Model> for GenreResponse {
    fn from(genre: genre::Model) -> Self {
        GenreResponse {
            name: genre.name,
            slug: genre.slug,
        }
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Write shape of a title: category and genres are referenced by slug.
/// Neither reference may be sent as `null`.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct TitleRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 256, message = "Ensure this field has no more than 256 characters.")
    )]
    pub name: Option<String>,
    #[schema(example = 1994)]
    #[validate(custom(function = "validate_year"))]
    pub year: Option<i32>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<String>>)]
    pub genre: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
}

/// Read shape of a title with nested category/genres and the computed rating.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TitleResponse {
    pub id: i64,
    pub name: String,
    pub year: i32,
    /// Mean review score, `null` when the title has no reviews.
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<GenreResponse>,
    pub category: Option<CategoryResponse>,
}
