//! # verdant: Plant Care Tracking Service
//!
//! `verdant` is a self-hostable service for tracking the watering schedule of
//! house plants. Each plant record stores what the plant is, who owns it, how
//! often it needs water, and when it was last watered; the service derives the
//! next watering date from the last two. Clients are expected to be a web or
//! mobile frontend talking JSON over REST.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence. Requests pass
//! through a session-cookie authentication extractor, reach a handler in
//! [`api::handlers`], and interact with the database through the repository
//! interfaces in [`db::handlers`]. The watering date arithmetic lives in the
//! pure [`schedule`] module, so the derived-field rules are testable without
//! a database.
//!
//! Two supporting features sit alongside the plant records: a proxy to the
//! OpenStreetMap Overpass API for finding nearby nurseries ([`nurseries`]),
//! and multipart image uploads served back as static files.
//!
//! ## Database
//!
//! Migrations are embedded in the binary and run automatically at startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! // Run migrations
//! verdant::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod nurseries;
pub mod schedule;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

mod openapi;

use crate::{
    auth::password,
    config::CorsOrigin,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    nurseries::NurseryClient,
    openapi::ApiDoc,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http,
    http::HeaderValue,
    routing::{delete, get, patch, post},
};
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

pub use types::{PlantId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from environment/files
/// - `nurseries`: HTTP client for the Overpass nursery lookup
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub nurseries: NurseryClient,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Result<Self, errors::Error> {
        let nurseries = NurseryClient::new(config.nurseries.clone()).map_err(|e| errors::Error::Internal {
            operation: format!("build Overpass HTTP client: {e}"),
        })?;

        Ok(Self {
            db,
            config: Arc::new(config),
            nurseries,
        })
    }
}

/// Get the verdant database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// This function is idempotent - it will create a new admin user if one
/// doesn't exist, or update the password if the user already exists. It is
/// called during application startup so there is always an admin available.
///
/// # Arguments
///
/// - `email`: Email address for the admin user
/// - `password`: Optional password. If `None`, the user will have no password set
/// - `db`: PostgreSQL connection pool
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> Result<UserId, sqlx::Error> {
    // Hash password if provided
    let password_hash = if let Some(pwd) = password {
        Some(password::hash_string(pwd).map_err(|e| sqlx::Error::Encode(format!("Failed to hash admin password: {e}").into()))?)
    } else {
        None
    };

    // Use a transaction to ensure atomicity
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    // Check if user already exists
    if let Some(existing_user) = user_repo
        .get_user_by_email(email)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to check existing user: {e}")))?
    {
        // User exists - update password if provided
        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE email = $2")
                .bind(password_hash)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    // Create new admin user
    let user_create = UserCreateDBRequest {
        name: "Admin".to_string(),
        email: email.to_string(),
        password_hash,
        profile_pic_url: None,
        is_admin: true,
    };

    let created_user = user_repo
        .create(&user_create)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to create admin user: {e}")))?;

    tx.commit().await?;
    Ok(created_user.id)
}

/// Setup the database connection, run migrations, and create the initial admin user
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database.pool.max_connections)
        .min_connections(config.database.pool.min_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.database.pool.acquire_timeout_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;

    // Create initial admin user if it doesn't exist
    create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {}", e))?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed = &config.auth.security.cors.allowed_origins;

    // A wildcard cannot appear in an origin list, it has its own representation
    let allow_origin = if allowed.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in allowed {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(config.auth.security.cors.allow_credentials)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Authentication routes (registration, login, logout)
/// - Plant CRUD routes under `/api/v1`
/// - Nursery lookup and image upload routes
/// - Static serving of uploaded images under `/uploads`
/// - OpenAPI documentation at `/docs`
/// - CORS configuration and tracing middleware
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let auth_routes = Router::new()
        .route("/authentication/register", post(api::handlers::auth::register))
        .route("/authentication/login", post(api::handlers::auth::login))
        .route("/authentication/logout", post(api::handlers::auth::logout))
        .with_state(state.clone());

    // Multipart parsing needs headroom beyond the raw file size cap
    let upload_body_limit = (state.config.uploads.max_file_size as usize).saturating_add(1024 * 1024);

    let api_routes = Router::new()
        .route("/plants", post(api::handlers::plants::create_plant))
        .route("/plants", get(api::handlers::plants::list_plants))
        .route("/plants/{id}", get(api::handlers::plants::get_plant))
        .route("/plants/{id}", patch(api::handlers::plants::update_plant))
        .route("/plants/{id}", delete(api::handlers::plants::delete_plant))
        .route("/users/{user_id}/plants", get(api::handlers::plants::list_user_plants))
        .route("/nurseries/nearby", get(api::handlers::nurseries::nearby_nurseries))
        .route(
            "/images",
            post(api::handlers::images::upload_image).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .nest("/api/v1", api_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.uploads.dir))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/docs"));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] initializes the database pool, runs
///    migrations, and creates the initial admin user
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts
///    handling requests
/// 3. **Shutdown**: when the shutdown signal resolves, in-flight requests
///    drain and the pool is closed
pub struct Application {
    router: Router,
    config: Arc<Config>,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting verdant with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        Self::new_with_pool(config, pool)
    }

    /// Create an application on an already-migrated pool (used by tests)
    pub fn new_with_pool(config: Config, pool: PgPool) -> anyhow::Result<Self> {
        let state = AppState::new(pool.clone(), config)?;
        let router = build_router(&state)?;

        Ok(Self {
            router,
            config: state.config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Verdant listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
