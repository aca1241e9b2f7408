// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use yamdb::{
    config::Config,
    models::user::{CreateUserRequest, Role},
    routes,
    state::AppState,
    store,
    utils::{jwt::sign_jwt, mailer::MemoryMailer},
};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub mailer: Arc<MemoryMailer>,
    pub client: Client,
}

/// Spawns the app on a random port, backed by a private in-memory database.
pub async fn spawn_app() -> TestApp {
    // A single connection keeps every query on the same in-memory database
    let pool = store::create_pool("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");

    store::run_migrations(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_username: None,
        admin_email: None,
        page_size: 10,
        bind_addr: "127.0.0.1:0".to_string(),
    };

    let mailer = Arc::new(MemoryMailer::new());
    let state = AppState {
        pool: pool.clone(),
        config,
        mailer: mailer.clone(),
    };

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}/api/v1", port),
        pool,
        mailer,
        client: Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Inserts an account directly and returns a bearer token for it.
    pub async fn user_with_role(&self, username: &str, role: Role) -> String {
        let payload = CreateUserRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            role,
        };
        let user = store::users::create(&self.pool, &payload)
            .await
            .expect("Failed to create test user");

        sign_jwt(user.id, user.role, JWT_SECRET, 600).expect("Failed to sign token")
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.get(self.url(path)), token)
    }

    pub fn post(&self, path: &str, token: Option<&str>, body: &Value) -> RequestBuilder {
        with_token(self.client.post(self.url(path)), token).json(body)
    }

    pub fn patch(&self, path: &str, token: Option<&str>, body: &Value) -> RequestBuilder {
        with_token(self.client.patch(self.url(path)), token).json(body)
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_token(self.client.delete(self.url(path)), token)
    }

    /// Creates the `books` category and `sci-fi` genre, then "Dune" (1965).
    /// Returns the title id.
    pub async fn seed_dune(&self, admin: &str) -> i64 {
        let res = send(self.post(
            "/categories/",
            Some(admin),
            &json!({"name": "Books", "slug": "books"}),
        ))
        .await;
        assert_eq!(res.status().as_u16(), 201);

        let res = send(self.post(
            "/genres/",
            Some(admin),
            &json!({"name": "Science fiction", "slug": "sci-fi"}),
        ))
        .await;
        assert_eq!(res.status().as_u16(), 201);

        let res = send(self.post(
            "/titles/",
            Some(admin),
            &json!({
                "name": "Dune",
                "year": 1965,
                "description": "Spice.",
                "genre": ["sci-fi"],
                "category": "books"
            }),
        ))
        .await;
        assert_eq!(res.status().as_u16(), 201);

        let body: Value = res.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }
}

fn with_token(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

pub async fn send(builder: RequestBuilder) -> Response {
    builder.send().await.expect("Failed to execute request")
}
