use actix_web::{
    cookie::{Cookie, SameSite},
    get,
    http::header,
    post, web, HttpRequest, HttpResponse,
};
use validator::Validate;

use crate::auth::{SessionAuth, SessionState, SESSION_COOKIE};
use crate::database::Database;
use crate::error::ApiError;
use crate::export;
use crate::models::{
    AdminListQuery, AuthStatusResponse, AdminDashboardResponse, CreateReviewRequest, LoginForm,
    ReviewFormData, ReviewPageQuery, ReviewPageResponse, SubmitReviewResponse,
};

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

// ============================================================================
// HEALTH CHECK
// ============================================================================

#[get("/health")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "qr-feedback-service",
        "timestamp": chrono::Utc::now()
    }))
}

#[get("/")]
pub async fn home() -> HttpResponse {
    see_other("/r/demo")
}

// ============================================================================
// PUBLIC REVIEW FORM
// ============================================================================

/// Data behind the public review page. Resolves the business, creating it on
/// first reference to an unknown slug.
#[get("/r/{slug}")]
pub async fn review_form(
    db: web::Data<Database>,
    slug: web::Path<String>,
    query: web::Query<ReviewPageQuery>,
) -> Result<HttpResponse, ApiError> {
    let business = db.get_or_create_business(&slug).await?;
    Ok(HttpResponse::Ok().json(ReviewPageResponse {
        business,
        success: query.success.as_deref() == Some("1"),
    }))
}

/// Form-encoded submission variant; redirects back to the form page with a
/// success indicator.
#[post("/r/{slug}")]
pub async fn submit_review_form(
    db: web::Data<Database>,
    slug: web::Path<String>,
    form: web::Form<ReviewFormData>,
) -> Result<HttpResponse, ApiError> {
    let request = form.into_inner().into_request(&slug);
    request
        .validate()
        .map_err(|e| ApiError::from_validation(&e))?;

    db.create_review(
        &request.business_slug,
        request.rating,
        request.comment.as_deref(),
        request.contact_email.as_deref(),
    )
    .await?;

    Ok(see_other(&format!("/r/{slug}?success=1")))
}

// ============================================================================
// API
// ============================================================================

#[post("/api/reviews")]
pub async fn submit_review(
    db: web::Data<Database>,
    payload: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();
    request
        .validate()
        .map_err(|e| ApiError::from_validation(&e))?;

    let (_, flagged) = db
        .create_review(
            &request.business_slug,
            request.rating,
            request.comment.as_deref(),
            request.contact_email.as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(SubmitReviewResponse { ok: true, flagged }))
}

// ============================================================================
// ADMIN AUTH
// ============================================================================

/// Auth-status probe; the logout redirect lands here.
#[get("/admin/login")]
pub async fn admin_login_page(auth: web::Data<SessionAuth>, req: HttpRequest) -> HttpResponse {
    let authenticated = auth.session_state(&req) == SessionState::AuthenticatedAdmin;
    HttpResponse::Ok().json(AuthStatusResponse { authenticated })
}

/// On a password match, sets the signed session cookie and redirects to the
/// dashboard. A mismatch, or a server with no password configured, gets the
/// same 401 with no token set.
#[post("/admin/login")]
pub async fn admin_login(
    auth: web::Data<SessionAuth>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, ApiError> {
    if !auth.has_password_configured() {
        log::warn!("admin login attempted but no ADMIN_PASSWORD is configured");
        return Err(ApiError::Unauthorized);
    }
    if !auth.check_password(&form.password) {
        return Err(ApiError::Unauthorized);
    }

    let token = auth.issue_token()?;
    let cookie = Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/admin"))
        .cookie(cookie)
        .finish())
}

#[get("/admin/logout")]
pub async fn admin_logout() -> HttpResponse {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/admin/login"))
        .cookie(cookie)
        .finish()
}

// ============================================================================
// ADMIN DASHBOARD
// ============================================================================

#[get("/admin")]
pub async fn admin_dashboard(
    db: web::Data<Database>,
    auth: web::Data<SessionAuth>,
    req: HttpRequest,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin(&req)?;

    let min_rating = query.min_rating.unwrap_or(1);
    let business = query
        .business
        .clone()
        .filter(|slug| !slug.is_empty());

    let reviews = db.list_reviews(min_rating, business.as_deref()).await?;
    let businesses = db.list_businesses().await?;

    Ok(HttpResponse::Ok().json(AdminDashboardResponse {
        reviews,
        businesses,
        min_rating,
        business,
    }))
}

#[post("/admin/reviews/{review_id}/seen")]
pub async fn mark_review_seen(
    db: web::Data<Database>,
    auth: web::Data<SessionAuth>,
    req: HttpRequest,
    review_id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin(&req)?;
    db.mark_seen(review_id.into_inner()).await?;
    Ok(see_other("/admin"))
}

#[get("/admin/export.csv")]
pub async fn export_csv(
    db: web::Data<Database>,
    auth: web::Data<SessionAuth>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin(&req)?;

    let rows = db.export_reviews().await?;
    let bytes = export::reviews_to_csv(&rows)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=reviews.csv",
        ))
        .body(bytes))
}

/// Registers every route; shared between `main` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(home)
        .service(review_form)
        .service(submit_review_form)
        .service(submit_review)
        .service(admin_login_page)
        .service(admin_login)
        .service(admin_logout)
        .service(admin_dashboard)
        .service(mark_review_seen)
        .service(export_csv);
}
