use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordHasher;
use axum::body::Body;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;
use user_service::domain::authentication::gateway::AuthGateway;
use user_service::domain::authentication::models::AuthSettings;
use user_service::domain::user::errors::UserError;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::ports::UserRepository;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// Repository kept in memory so the HTTP stack can be driven without Postgres
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
    unavailable: AtomicBool,
}

impl InMemoryUserRepository {
    /// Make every subsequent call fail as if the database were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), UserError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UserError::DatabaseError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        self.check_available()?;
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        self.check_available()?;
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        self.check_available()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        self.check_available()?;
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        self.check_available()?;
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(user)
            }
            None => Err(UserError::NotFound(user.id.to_string())),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        self.check_available()?;
        match self.users.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(UserError::NotFound(id.to_string())),
        }
    }
}

/// Response captured from a single in-process request
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Test application driving the router in-process
pub struct TestApp {
    router: Router,
    pub repository: Arc<InMemoryUserRepository>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    pub fn new() -> Self {
        let password_hasher =
            PasswordHasher::with_cost(8, 1, 1).expect("Failed to build password hasher");
        let repository = Arc::new(InMemoryUserRepository::default());
        let authenticator = Arc::new(Authenticator::with_password_hasher(
            JWT_SECRET,
            password_hasher.clone(),
        ));

        let user_service = Arc::new(UserService::new(
            Arc::clone(&repository),
            password_hasher,
        ));
        let gateway = Arc::new(
            AuthGateway::new(
                Arc::clone(&repository),
                Arc::clone(&authenticator),
                AuthSettings::new(chrono::Duration::minutes(TOKEN_TTL_MINUTES)),
            )
            .expect("Failed to build auth gateway"),
        );

        Self {
            router: create_router(user_service, gateway),
            repository,
            authenticator,
        }
    }

    /// Send a request with an optional raw `Authorization` header and JSON body
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(request).await
    }

    /// Send a raw body with an optional `Content-Type`, bypassing JSON encoding
    pub async fn request_raw(
        &self,
        method: Method,
        path: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(value) = content_type {
            builder = builder.header(header::CONTENT_TYPE, value);
        }

        let request = builder
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Failed to parse response")
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, path: &str, token: &str) -> TestResponse {
        self.request(Method::GET, path, Some(&bearer(token)), None)
            .await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, None, Some(body)).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, path, Some(&bearer(token)), Some(body))
            .await
    }

    pub async fn delete(&self, path: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, path, Some(&bearer(token)), None)
            .await
    }

    /// Register a user and return the created user data
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Value {
        let response = self
            .post(
                "/api/v1/users",
                json!({ "name": name, "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["data"].clone()
    }

    /// Log in and return the access token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post(
                "/api/v1/auth/login",
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.body["data"]["access_token"]
            .as_str()
            .expect("Missing access token")
            .to_string()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
