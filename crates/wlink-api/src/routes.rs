//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{auth, health, individual, jobs, media, organization, payments, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/send-email-otp", post(auth::send_email_otp))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/social-auth", post(auth::social_auth))
        // Per-provider OAuth callback, one data-driven handler
        .route("/:provider/callback", get(auth::oauth_callback))
        .route("/account", delete(auth::delete_account));

    let individual_routes = Router::new()
        .route("/register", post(individual::register_profile))
        .route(
            "/profile",
            get(individual::get_profile).patch(individual::update_profile),
        )
        // Sub-entity CRUD, one uniform pattern per family
        .route(
            "/profile/education",
            post(individual::add_education).get(individual::list_education),
        )
        .route(
            "/profile/education/:id",
            patch(individual::update_education).delete(individual::delete_education),
        )
        .route("/profile/experience", post(individual::add_experience))
        .route(
            "/profile/experience/:id",
            patch(individual::update_experience).delete(individual::delete_experience),
        )
        .route(
            "/profile/experience/:id/positions",
            post(individual::add_position),
        )
        .route(
            "/profile/experience/:id/positions/:position_id",
            patch(individual::update_position).delete(individual::delete_position),
        )
        .route(
            "/profile/skills",
            post(individual::add_skill).get(individual::list_skills),
        )
        .route(
            "/profile/skills/:id",
            patch(individual::update_skill).delete(individual::delete_skill),
        )
        .route("/profile/certifications", post(individual::add_certification))
        .route(
            "/profile/certifications/:id",
            patch(individual::update_certification).delete(individual::delete_certification),
        )
        .route("/profile/projects", post(individual::add_project))
        .route(
            "/profile/projects/:id",
            patch(individual::update_project).delete(individual::delete_project),
        )
        // Profile videos (replacement cascades to the CDN)
        .route("/profile/intro-video", post(individual::upload_intro_video))
        .route("/profile/video-resume", post(individual::upload_video_resume))
        // Job alerts and recommendations
        .route(
            "/alerts",
            post(individual::create_job_alert).get(individual::list_job_alerts),
        )
        .route("/alerts/:id", delete(individual::delete_job_alert))
        .route("/recommendations", get(individual::list_recommendations))
        .route(
            "/candidates/:id/recommendations",
            post(individual::create_recommendation),
        )
        // Job workflow, candidate side
        .route("/jobs/bulkApply", post(jobs::bulk_apply))
        .route("/jobs/:id", get(jobs::job_details))
        .route("/jobs/:id/apply", post(jobs::apply))
        .route("/jobs/:id/withdraw", delete(jobs::withdraw))
        .route("/jobs/:id/toggle-save", post(jobs::toggle_save))
        .route("/jobs/current/:user_id/pending", get(jobs::current_pending))
        .route(
            "/jobs/current/:user_id/shortlisted",
            get(jobs::current_shortlisted),
        )
        .route("/jobs/current/:user_id/selected", get(jobs::current_selected))
        .route("/jobs/current/:user_id/rejected", get(jobs::current_rejected));

    let organization_routes = Router::new()
        .route("/register", post(organization::register_profile))
        .route(
            "/profile",
            get(organization::get_profile).patch(organization::update_profile),
        )
        .route("/team", post(organization::add_team_member))
        .route(
            "/team/:id",
            patch(organization::update_team_member).delete(organization::delete_team_member),
        )
        .route("/projects", post(organization::add_project))
        .route(
            "/projects/:id",
            patch(organization::update_project).delete(organization::delete_project),
        )
        .route("/social-links", post(organization::add_social_link))
        .route("/social-links/:id", delete(organization::delete_social_link))
        // Job ads
        .route(
            "/jobs",
            post(organization::post_job).get(organization::list_jobs),
        )
        .route(
            "/jobs/:job_id",
            get(organization::job_details).patch(organization::update_job),
        )
        .route("/jobs/:job_id/close", post(organization::close_job))
        .route(
            "/jobs/:job_id/applicants/:user_id/status",
            patch(organization::update_applicant_status),
        )
        .route(
            "/jobs/:job_id/applicants/:user_id/rounds",
            post(organization::add_evaluation_round),
        )
        // Status-filtered application views, own and by-org-id
        .route("/applications/:status", get(organization::applications_by_status))
        .route(
            "/:org_id/applications/:status",
            get(organization::applications_by_org_and_status),
        )
        .route(
            "/candidates/:id/save",
            post(organization::save_candidate).delete(organization::unsave_candidate),
        )
        .route("/candidates/:id/follow", post(organization::follow_candidate));

    let job_application_routes = Router::new()
        .route("/add", post(media::upload))
        .route("/:id", delete(media::delete));

    let payment_routes = Router::new()
        .route("/orders", post(payments::create_order))
        .route("/callback", post(payments::payment_callback))
        .route("/subscriptions", post(payments::create_subscription))
        .route("/plans", get(payments::list_plans))
        .route("/transactions", get(payments::list_transactions));

    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .nest("/auth/v1", auth_routes)
        .nest("/individualUser/v1", individual_routes)
        .nest("/organization/v1", organization_routes)
        .nest("/jobApplication/v1", job_application_routes)
        .nest("/payments/v1", payment_routes)
        .layer(from_fn_with_state(rate_limiter, rate_limit_middleware));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    let max_body = state.config.max_body_size;

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers))
        .layer(from_fn(request_id))
        .layer(from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
