#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::extract::Path;
use axum::http::{header, Method, Request, StatusCode};
use axum::routing::get;
use axum::Router;
use resto_api::extract::USER_ID_KEY;
use resto_app::domain::{Restaurant, RestaurantInput, User};
use resto_app::infrastructure::db::run_migrations;
use resto_app::AppContext;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};
use uuid::Uuid;

pub struct TestApp {
    pub ctx: AppContext,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        if self.text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&self.text).unwrap()
        }
    }
}

/// Signs the session in as `id` without going through Google.
async fn login_as(session: Session, Path(id): Path<Uuid>) -> StatusCode {
    session.insert(USER_ID_KEY, id).await.unwrap();
    StatusCode::NO_CONTENT
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        run_migrations(&db).await.unwrap();

        let ctx = AppContext::new(db);
        let router = resto_api::routes(ctx.clone())
            .merge(Router::new().route("/test/login/{id}", get(login_as)))
            .layer(SessionManagerLayer::new(MemoryStore::default()));
        Self { ctx, router }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<&str>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            content_type,
            text: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    /// Register a Google-backed user and return it with a signed-in session
    /// cookie.
    pub async fn sign_in(&self, name: &str) -> (User, String) {
        let email = format!("{}@example.com", name.to_lowercase());
        let profile = User::new(format!("google-{name}"), email, name.to_string(), None);
        let user: User = self.ctx.users.upsert_google(&profile).await.unwrap().into();

        let request = Request::builder()
            .uri(format!("/test/login/{}", user.id))
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("session cookie")
            .to_str()
            .unwrap();
        let cookie = set_cookie.split(';').next().unwrap().to_string();
        (user, cookie)
    }

    pub async fn restaurant(&self, name: &str, description: &str) -> Restaurant {
        self.ctx
            .restaurants
            .create(&RestaurantInput {
                name: Some(name.to_string()),
                description: Some(description.to_string()),
                active: None,
            })
            .await
            .unwrap()
    }
}
