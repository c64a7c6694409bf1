use axum::routing::{get, post};
use axum::Router;
use resto_app::AppContext;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub mod extract;
mod handlers;

const SESSION_IDLE_DAYS: i64 = 7;

/// All application routes, without the session layer.
pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(handlers::landing::index))
        .route(
            "/restaurants",
            get(handlers::restaurants::list).post(handlers::restaurants::create),
        )
        .route(
            "/restaurants/{id}",
            get(handlers::restaurants::retrieve)
                .put(handlers::restaurants::replace)
                .patch(handlers::restaurants::patch)
                .delete(handlers::restaurants::destroy),
        )
        .route(
            "/restaurants/{id}/vote",
            get(handlers::votes::tally).put(handlers::votes::submit),
        )
        .route("/visits", get(handlers::visits::list).post(handlers::visits::create))
        .route(
            "/visits/{id}",
            get(handlers::visits::retrieve)
                .put(handlers::visits::replace)
                .patch(handlers::visits::patch)
                .delete(handlers::visits::destroy),
        )
        .route(
            "/comments",
            get(handlers::comments::list).post(handlers::comments::create),
        )
        .route(
            "/comments/{id}",
            get(handlers::comments::retrieve)
                .put(handlers::comments::replace)
                .patch(handlers::comments::patch)
                .delete(handlers::comments::destroy),
        )
        .route("/users", get(handlers::users::list).post(handlers::users::create))
        .route("/users/me", get(handlers::users::me))
        .route(
            "/users/{id}",
            get(handlers::users::retrieve)
                .put(handlers::users::replace)
                .patch(handlers::users::patch)
                .delete(handlers::users::destroy),
        )
        .route("/auth/google/login", get(handlers::auth::login))
        .route("/auth/google/callback", get(handlers::auth::callback))
        .route("/auth/logout", post(handlers::auth::logout))
        .fallback(handlers::not_found)
        .with_state(ctx)
}

/// The served application: routes plus sessions, compression and request
/// tracing.
pub fn app(ctx: AppContext, secure_cookies: bool) -> Router {
    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(secure_cookies)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(SESSION_IDLE_DAYS)));

    routes(ctx)
        .layer(sessions)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
