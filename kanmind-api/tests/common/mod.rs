/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup and cleanup
/// - Test user creation with bearer tokens
/// - Request helpers against the in-process router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use kanmind_api::app::{build_router, AppState};
use kanmind_api::config::Config;
use kanmind_shared::auth::jwt::{create_token, Claims};
use kanmind_shared::auth::password::hash_password;
use kanmind_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// A test user together with a valid bearer token
pub struct TestUser {
    pub user: User,
    pub token: String,
}

/// Test context containing all necessary resources
///
/// Spins up the router against the configured database and registers three
/// users so the permission matrix can be exercised: a board owner, a board
/// member, and an outsider with no relationship to anything.
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub owner: TestUser,
    pub member: TestUser,
    pub outsider: TestUser,
}

impl TestContext {
    /// Creates a new test context with fresh users
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let owner = create_test_user(&db, &config, "owner").await?;
        let member = create_test_user(&db, &config, "member").await?;
        let outsider = create_test_user(&db, &config, "outsider").await?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            owner,
            member,
            outsider,
        })
    }

    /// Sends a request with an optional bearer token and JSON body
    ///
    /// Returns the status code and the parsed body (Null for empty bodies
    /// such as 204 responses).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> anyhow::Result<(StatusCode, serde_json::Value)> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.app.clone().call(request).await?;
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, json))
    }

    /// Creates a board owned by `owner` with `member` in the member set
    pub async fn create_board(&self, title: &str) -> anyhow::Result<Uuid> {
        let (status, body) = self
            .request(
                "POST",
                "/api/boards",
                Some(&self.owner.token),
                Some(serde_json::json!({
                    "title": title,
                    "members": [self.member.user.id],
                })),
            )
            .await?;

        anyhow::ensure!(
            status == StatusCode::CREATED,
            "board creation failed: {} {}",
            status,
            body
        );

        Ok(serde_json::from_value(body["id"].clone())?)
    }

    /// Creates a task on a board via the API, acting as the owner
    pub async fn create_task(
        &self,
        board_id: Uuid,
        title: &str,
        extra: serde_json::Value,
    ) -> anyhow::Result<Uuid> {
        let mut payload = serde_json::json!({
            "board": board_id,
            "title": title,
        });
        if let (Some(obj), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }

        let (status, body) = self
            .request("POST", "/api/tasks", Some(&self.owner.token), Some(payload))
            .await?;

        anyhow::ensure!(
            status == StatusCode::CREATED,
            "task creation failed: {} {}",
            status,
            body
        );

        Ok(serde_json::from_value(body["id"].clone())?)
    }

    /// Cleans up test data
    ///
    /// Deleting the boards first satisfies the owner foreign key, then the
    /// user rows go; memberships and comments follow via cascade.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        let user_ids = [self.owner.user.id, self.member.user.id, self.outsider.user.id];

        sqlx::query("DELETE FROM boards WHERE owner_id = ANY($1)")
            .bind(&user_ids[..])
            .execute(&self.db)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ANY($1)")
            .bind(&user_ids[..])
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Creates a user directly in the database with a valid token
async fn create_test_user(db: &PgPool, config: &Config, label: &str) -> anyhow::Result<TestUser> {
    let user = User::create(
        db,
        CreateUser {
            email: format!("{}-{}@example.com", label, Uuid::new_v4()),
            full_name: format!("Test {}", label),
            password_hash: hash_password("correct horse battery staple")?,
        },
    )
    .await?;

    let token = create_token(&Claims::new(user.id), &config.jwt.secret)?;

    Ok(TestUser { user, token })
}
