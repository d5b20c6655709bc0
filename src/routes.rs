// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{auth, brain_bucks, quiz, results, students, subjects, teachers},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, students, tests, results, teachers, subjects, brain bucks).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (document store, config, games).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            axum::http::HeaderValue::from_static("http://localhost:5173"),
            axum::http::HeaderValue::from_static("http://127.0.0.1:5173"),
        ]))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let authenticated = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let student_routes = Router::new()
        .route("/", get(students::list_students))
        .layer(middleware::from_fn(staff_middleware))
        .layer(authenticated.clone());

    let test_routes = Router::new()
        .route("/", get(quiz::list_tests))
        .route("/{id}", get(quiz::get_test))
        // Any token may submit; results are recorded under the token's name.
        .merge(
            Router::new()
                .route("/{id}/submit", post(quiz::submit_test))
                .layer(authenticated.clone()),
        )
        .merge(
            Router::new()
                .route("/", post(quiz::create_test))
                .route("/{id}", delete(quiz::delete_test))
                .layer(middleware::from_fn(staff_middleware))
                .layer(authenticated.clone()),
        );

    let result_routes = Router::new()
        .route("/{id}", get(results::get_result))
        .merge(
            Router::new()
                .route("/", get(results::list_results))
                .route("/export", get(results::export_results))
                .route("/groups/{number}/export", get(results::export_group))
                .route("/{id}", delete(results::delete_result))
                .layer(middleware::from_fn(staff_middleware)),
        )
        .merge(
            Router::new()
                .route("/", delete(results::clear_results))
                .layer(middleware::from_fn(admin_middleware)),
        )
        .layer(authenticated.clone());

    let teacher_routes = Router::new()
        .route("/me", get(teachers::get_me).put(teachers::update_me))
        .merge(
            Router::new()
                .route("/", get(teachers::list_teachers).post(teachers::create_teacher))
                .route(
                    "/{id}",
                    put(teachers::update_teacher).delete(teachers::delete_teacher),
                )
                .layer(middleware::from_fn(admin_middleware)),
        )
        .layer(authenticated.clone());

    let subject_routes = Router::new()
        .route("/", get(subjects::list_subjects))
        .merge(
            Router::new()
                .route("/", post(subjects::create_subject))
                .route("/{id}", delete(subjects::delete_subject))
                .layer(middleware::from_fn(admin_middleware))
                .layer(authenticated.clone()),
        );

    let brain_bucks_routes = Router::new()
        .route(
            "/cards",
            get(brain_bucks::list_cards).post(brain_bucks::create_card),
        )
        .route(
            "/cards/{id}",
            put(brain_bucks::update_card).delete(brain_bucks::delete_card),
        )
        .route("/games", post(brain_bucks::create_game))
        .route(
            "/games/{id}",
            get(brain_bucks::get_game).delete(brain_bucks::delete_game),
        )
        .route("/games/{id}/teams", post(brain_bucks::add_team))
        .route(
            "/games/{id}/teams/{team_id}",
            put(brain_bucks::rename_team).delete(brain_bucks::remove_team),
        )
        .route("/games/{id}/start", post(brain_bucks::start_game))
        .route("/games/{id}/active-team", put(brain_bucks::select_active_team))
        .route("/games/{id}/cells", post(brain_bucks::reveal_cell))
        .route("/games/{id}/judge", post(brain_bucks::judge_answer))
        // Double middleware protection: Auth first, then Staff check
        .layer(middleware::from_fn(staff_middleware))
        .layer(authenticated);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/students", student_routes)
        .nest("/api/tests", test_routes)
        .nest("/api/results", result_routes)
        .nest("/api/teachers", teacher_routes)
        .nest("/api/subjects", subject_routes)
        .nest("/api/brain-bucks", brain_bucks_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
