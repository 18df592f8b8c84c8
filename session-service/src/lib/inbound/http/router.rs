use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::guard::enforce_policies;
use super::guard::require;
use super::handlers::courses::create_course;
use super::handlers::courses::delete_course;
use super::handlers::courses::enroll;
use super::handlers::courses::get_course;
use super::handlers::courses::list_courses;
use super::handlers::courses::roster;
use super::handlers::courses::update_course;
use super::handlers::courses::withdraw;
use super::handlers::session::change_password;
use super::handlers::session::check;
use super::handlers::session::forgot_password;
use super::handlers::session::login;
use super::handlers::session::logout;
use super::handlers::session::me;
use super::handlers::session::refresh;
use super::handlers::session::register;
use super::handlers::session::reset_password;
use super::handlers::users::get_user;
use super::handlers::users::set_active;
use super::middleware::authenticate as auth_middleware;
use crate::domain::access::models::Policy;
use crate::domain::access::models::ResourceKind;
use crate::domain::access::ports::AccessResolverPort;
use crate::domain::course::ports::CourseServicePort;
use crate::domain::identity::ports::SessionServicePort;

/// Application state shared by handlers and middleware.
///
/// Services sit behind their ports so the binary can pick Postgres or
/// in-memory adapters at startup.
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<dyn SessionServicePort>,
    pub access_resolver: Arc<dyn AccessResolverPort>,
    pub course_service: Arc<dyn CourseServicePort>,
}

pub fn create_router(
    session_service: Arc<dyn SessionServicePort>,
    access_resolver: Arc<dyn AccessResolverPort>,
    course_service: Arc<dyn CourseServicePort>,
) -> Router {
    let state = AppState {
        session_service,
        access_resolver,
        course_service,
    };

    let guarded = |kind: ResourceKind, policies: &[Policy]| {
        middleware::from_fn_with_state(require(&state, kind, policies), enforce_policies)
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password));

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/change-password", post(change_password))
        .route("/api/auth/me", get(me))
        .route("/api/auth/check", get(check))
        .route("/api/courses", post(create_course))
        .route("/api/enrollments", post(enroll))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let guarded_routes = Router::new()
        .route(
            "/api/courses",
            get(list_courses).route_layer(guarded(ResourceKind::Course, &[Policy::Public])),
        )
        .route(
            "/api/courses/:id",
            get(get_course).route_layer(guarded(
                ResourceKind::Course,
                &[Policy::Own, Policy::Enrolled, Policy::Admin],
            )),
        )
        .route(
            "/api/courses/:id",
            patch(update_course)
                .route_layer(guarded(ResourceKind::Course, &[Policy::Own, Policy::Admin])),
        )
        .route(
            "/api/courses/:id",
            delete(delete_course)
                .route_layer(guarded(ResourceKind::Course, &[Policy::Own, Policy::Admin])),
        )
        .route(
            "/api/enrollments",
            get(roster).route_layer(guarded(ResourceKind::Course, &[Policy::Own, Policy::Admin])),
        )
        .route(
            "/api/enrollments/withdraw",
            post(withdraw).route_layer(guarded(ResourceKind::Course, &[Policy::Enrolled])),
        )
        .route(
            "/api/users/:user_id",
            get(get_user).route_layer(guarded(ResourceKind::User, &[Policy::Own, Policy::Admin])),
        )
        .route(
            "/api/admin/users/:user_id/active",
            patch(set_active).route_layer(guarded(ResourceKind::User, &[Policy::Admin])),
        );

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(guarded_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
