use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// ============================================================================
// STORED RECORDS
// ============================================================================

/// A business collecting feedback, identified externally by its slug.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Business {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A customer review. Immutable after insertion except for `seen`;
/// `flagged` is computed once at insert time and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub business_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub seen: bool,
    pub flagged: bool,
}

/// Review joined with its business, as shown in the admin listing and export.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewWithBusiness {
    pub id: i64,
    pub business_slug: String,
    pub business_name: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub seen: bool,
    pub flagged: bool,
}

/// Slug/name pair used to populate the admin filter dropdown.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BusinessOption {
    pub slug: String,
    pub name: String,
}

// ============================================================================
// REQUEST PAYLOADS
// ============================================================================

/// JSON review submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1, max = 60))]
    pub business_slug: String,
    #[validate(range(min = 1, max = 5))]
    pub rating: i64,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
}

/// Form-encoded review submission posted from the public review page.
/// Optional fields arrive as empty strings when left blank.
#[derive(Debug, Deserialize)]
pub struct ReviewFormData {
    pub rating: i64,
    pub comment: Option<String>,
    pub contact_email: Option<String>,
}

impl ReviewFormData {
    /// Normalizes blank form fields to absent and attaches the slug from the
    /// URL, yielding the same payload shape the JSON endpoint accepts.
    pub fn into_request(self, slug: &str) -> CreateReviewRequest {
        CreateReviewRequest {
            business_slug: slug.to_string(),
            rating: self.rating,
            comment: self
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            contact_email: self
                .contact_email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewPageQuery {
    pub success: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub min_rating: Option<i64>,
    pub business: Option<String>,
}

// ============================================================================
// RESPONSE PAYLOADS
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SubmitReviewResponse {
    pub ok: bool,
    pub flagged: bool,
}

/// Data behind the public review form page.
#[derive(Debug, Serialize)]
pub struct ReviewPageResponse {
    pub business: Business,
    pub success: bool,
}

/// Everything the admin listing view needs: the filtered reviews, the full
/// business list for the filter UI, and the filters that were applied.
#[derive(Debug, Serialize)]
pub struct AdminDashboardResponse {
    pub reviews: Vec<ReviewWithBusiness>,
    pub businesses: Vec<BusinessOption>,
    pub min_rating: i64,
    pub business: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
}
