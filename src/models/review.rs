use crate::entities::{comment, review};
use crate::validators::validate_not_blank;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 1000, message = "Ensure this field has no more than 1000 characters.")
    )]
    pub text: Option<String>,
    #[schema(example = 8)]
    #[validate(range(min = 1, max = 10, message = "Ensure the score is between 1 and 10."))]
    pub score: Option<i16>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    pub text: String,
    /// Username of the author.
    pub author: String,
    pub score: i16,
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl ReviewResponse {
    pub fn new(review: review::Model, author: String) -> Self {
        ReviewResponse {
            id: review.id,
            text: review.text,
            author,
            score: review.score,
            pub_date: review.pub_date,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CommentRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 200, message = "Ensure this field has no more than 200 characters.")
    )]
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub author: String,
    /// Text of the review the comment belongs to.
    pub review: String,
    pub pub_date: chrono::DateTime<chrono::Utc>,
}

impl CommentResponse {
    pub fn new(comment: comment::Model, author: String, review: String) -> Self {
        CommentResponse {
            id: comment.id,
            text: comment.text,
            author,
            review,
            pub_date: comment.pub_date,
        }
    }
}
