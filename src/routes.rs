// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, catalog, comments, profile, reviews, titles},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Everything lives under `/api/v1`, with trailing slashes.
/// * Authentication is per-handler through the `Principal` extractor, so
///   read-only routes stay open to anonymous clients.
/// * Applies global middleware (Trace, CORS) and injects `AppState`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/signup/", post(auth::signup))
        .route("/token/", post(auth::token));

    let catalog_routes = Router::new()
        .route(
            "/categories/",
            get(catalog::list_categories).post(catalog::create_category),
        )
        .route("/categories/{slug}/", delete(catalog::delete_category))
        .route(
            "/genres/",
            get(catalog::list_genres).post(catalog::create_genre),
        )
        .route("/genres/{slug}/", delete(catalog::delete_genre));

    let title_routes = Router::new()
        .route("/titles/", get(titles::list_titles).post(titles::create_title))
        .route(
            "/titles/{title_id}/",
            get(titles::get_title)
                .patch(titles::update_title)
                .delete(titles::delete_title),
        )
        .route(
            "/titles/{title_id}/reviews/",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}/",
            get(comments::get_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        );

    // `/users/me/` is a static segment, so it wins over `/users/{username}/`.
    let user_routes = Router::new()
        .route("/users/", get(admin::list_users).post(admin::create_user))
        .route("/users/me/", get(profile::get_me).patch(profile::update_me))
        .route(
            "/users/{username}/",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::delete_user),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .merge(catalog_routes)
        .merge(title_routes)
        .merge(user_routes);

    Router::new()
        .nest("/api/v1", api)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
