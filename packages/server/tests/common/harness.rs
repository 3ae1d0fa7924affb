//! Test harness for driving the full router in-process.
//!
//! Every test gets a fresh in-memory store behind the real router, so
//! requests run through the same middleware, extractors and templates as
//! production. Postgres-backed tests share one container, started on first
//! use.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use circuits_core::common::{AuthUser, Permission};
use circuits_core::domains::auth::JwtService;
use circuits_core::kernel::{MemoryStore, PostgresStore, ServerDeps};
use circuits_core::server::build_app;
use circuits_core::server::flash::{messages_from_set_cookie, Message};
use circuits_core::Config;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use tower::ServiceExt;
use uuid::Uuid;

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test harness wrapping the router and the store behind it.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &mut TestHarness) {
///     let token = ctx.token(&[Permission::ChangeProvider]);
///     let response = ctx.get("/circuits/providers/add/", Some(&token)).await;
/// }
/// ```
pub struct TestHarness {
    /// Store behind the router; use this for fixtures and row counts.
    pub store: Arc<MemoryStore>,
    app: Router,
    jwt_service: JwtService,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // Store is dropped with the harness
    }
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        let config = Config::for_tests();
        let store = Arc::new(MemoryStore::new());
        let deps = ServerDeps::new(store.clone(), &config);
        let app = build_app(deps, Duration::from_secs(config.request_timeout_secs));
        Self {
            store,
            app,
            jwt_service: JwtService::new(&config.jwt_secret, config.jwt_issuer),
        }
    }

    /// Token for a caller holding exactly `permissions`.
    pub fn token(&self, permissions: &[Permission]) -> String {
        self.mint(AuthUser {
            user_id: Uuid::new_v4(),
            username: "noc".to_string(),
            is_superuser: false,
            permissions: permissions.iter().map(|p| p.codename().to_string()).collect(),
        })
    }

    /// Token for a caller holding every permission.
    pub fn superuser_token(&self) -> String {
        self.mint(AuthUser {
            user_id: Uuid::new_v4(),
            username: "admin".to_string(),
            is_superuser: true,
            permissions: Vec::new(),
        })
    }

    fn mint(&self, user: AuthUser) -> String {
        self.jwt_service
            .create_token(&user)
            .expect("Failed to mint test token")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> TestResponse {
        let request = authorized(Request::get(path), token)
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(request).await
    }

    /// Follow `previous`'s redirect, carrying its flash cookie along.
    pub async fn follow(&self, previous: &TestResponse) -> TestResponse {
        let location = previous.location.as_deref().expect("Not a redirect");
        let mut builder = Request::get(location);
        if let Some(cookie) = &previous.set_cookie {
            let pair = cookie.split(';').next().unwrap_or_default();
            builder = builder.header(header::COOKIE, pair);
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");
        self.send(request).await
    }

    /// POST `fields` as an urlencoded form.
    pub async fn post(&self, path: &str, fields: &[(&str, &str)], token: Option<&str>) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = authorized(Request::post(path), token)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");
        let status = response.status();
        let header_str = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let location = header_str(header::LOCATION);
        let set_cookie = header_str(header::SET_COOKIE);
        let messages = set_cookie
            .as_deref()
            .map(messages_from_set_cookie)
            .unwrap_or_default();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        TestResponse {
            status,
            location,
            set_cookie,
            messages,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

fn authorized(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

/// Response with its body read and flash messages decoded.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookie: Option<String>,
    /// Messages queued for the next page
    pub messages: Vec<Message>,
    pub body: String,
}

impl TestResponse {
    /// Assert a 302 to `to` and return the queued message texts.
    pub fn assert_redirect(&self, to: &str) -> Vec<&str> {
        assert_eq!(self.status, StatusCode::FOUND, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
        self.messages.iter().map(|m| m.message.as_str()).collect()
    }
}

/// One Postgres container shared by every test in the binary.
struct SharedPostgres {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_POSTGRES: OnceCell<SharedPostgres> = OnceCell::const_new();

impl SharedPostgres {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        // Run migrations once on the shared database
        PostgresStore::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?
            .migrate()
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }
}

/// Fresh connection to the shared, migrated Postgres database.
pub async fn postgres_store() -> PostgresStore {
    let shared = SHARED_POSTGRES
        .get_or_init(|| async {
            SharedPostgres::init()
                .await
                .expect("Failed to initialize shared Postgres")
        })
        .await;
    PostgresStore::connect(&shared.db_url)
        .await
        .expect("Failed to connect to test database")
}
