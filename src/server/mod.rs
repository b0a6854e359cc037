//! Server initialization and routing

use crate::api;
use crate::auth::JwtManager;
use crate::config::Config;
use crate::middleware::role_guard;
use crate::notify::{LifecycleNotifier, TracingNotifier};
use crate::repository::{InvoiceRepositoryImpl, ProductRepositoryImpl, UserRepositoryImpl};
use crate::service::{AuthService, InvoiceService, ProductService, UserService};
use anyhow::Result;
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db_pool: MySqlPool,
    pub auth_service: Arc<AuthService<UserRepositoryImpl>>,
    pub user_service: Arc<UserService<UserRepositoryImpl>>,
    pub product_service: Arc<ProductService<ProductRepositoryImpl>>,
    pub invoice_service:
        Arc<InvoiceService<InvoiceRepositoryImpl, UserRepositoryImpl, ProductRepositoryImpl>>,
    pub jwt_manager: JwtManager,
}

/// Run the server
pub async fn run(config: Config) -> Result<()> {
    // Create database connection pool
    let db_pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    info!("Connected to database");

    // Create repositories
    let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));
    let product_repo = Arc::new(ProductRepositoryImpl::new(db_pool.clone()));
    let invoice_repo = Arc::new(InvoiceRepositoryImpl::new(db_pool.clone()));

    // Create JWT manager
    let jwt_manager = JwtManager::new(config.jwt.clone());

    // Lifecycle events are logged through tracing
    let notifier: Arc<dyn LifecycleNotifier> = Arc::new(TracingNotifier);

    // Create services
    let auth_service = Arc::new(AuthService::new(
        user_repo.clone(),
        jwt_manager.clone(),
        Some(notifier.clone()),
    ));
    let user_service = Arc::new(UserService::new(user_repo.clone(), Some(notifier.clone())));
    let product_service = Arc::new(ProductService::new(
        product_repo.clone(),
        Some(notifier.clone()),
    ));
    let invoice_service = Arc::new(InvoiceService::new(
        invoice_repo,
        user_repo,
        product_repo,
        Some(notifier),
    ));

    // Create app state
    let state = AppState {
        config: Arc::new(config.clone()),
        db_pool,
        auth_service,
        user_service,
        product_service,
        invoice_service,
        jwt_manager,
    };

    let app = build_router(state);

    let http_addr = config.http_addr();
    let listener = TcpListener::bind(&http_addr).await?;
    info!("HTTP server started on {}", http_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the HTTP router
///
/// Write routes are grouped behind the role guard; read routes only
/// require a valid token, enforced by the `AuthUser` extractor in the
/// handlers themselves.
pub fn build_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public endpoints
    let public = Router::new()
        .route("/health", get(api::health::health))
        .route("/ready", get(api::health::ready))
        .route("/api/auth/register", post(api::auth::register))
        .route("/api/auth/login", post(api::auth::login));

    // Token-only endpoints
    let authenticated = Router::new()
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/refresh", post(api::auth::refresh))
        .route("/api/auth/user-profile", get(api::auth::user_profile))
        .route("/api/products", get(api::product::list))
        .route("/api/products/{id}", get(api::product::get))
        .route("/api/products/search/query", get(api::product::search))
        .route(
            "/api/products/price-range/filter",
            get(api::product::price_range),
        )
        .route(
            "/api/products/expensive/list",
            get(api::product::most_expensive),
        )
        .route("/api/products/cheap/list", get(api::product::cheapest))
        .route("/api/invoices", get(api::invoice::list))
        .route("/api/invoices/{id}", get(api::invoice::get))
        .route(
            "/api/invoices/status/{status}",
            get(api::invoice::list_by_status),
        )
        .route(
            "/api/invoices/seller/{seller_id}",
            get(api::invoice::list_by_seller),
        )
        .route(
            "/api/invoices/client/{client_id}",
            get(api::invoice::list_by_client),
        );

    // User management is admin only
    let admin = Router::new()
        .route("/api/users", get(api::user::list).post(api::user::create))
        .route(
            "/api/users/{id}",
            get(api::user::get)
                .put(api::user::update)
                .delete(api::user::delete),
        )
        .route("/api/users/admins/list", get(api::user::list_admins))
        .route("/api/users/sellers/list", get(api::user::list_sellers))
        .route("/api/users/clients/list", get(api::user::list_clients))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), "admin"),
            role_guard,
        ));

    // Catalog and invoice writes are for sellers and admins
    let seller_or_admin = Router::new()
        .route("/api/products", post(api::product::create))
        .route(
            "/api/products/{id}",
            put(api::product::update).delete(api::product::delete),
        )
        .route("/api/invoices", post(api::invoice::create))
        .route(
            "/api/invoices/{id}",
            put(api::invoice::update).delete(api::invoice::delete),
        )
        .route(
            "/api/invoices/{id}/status",
            patch(api::invoice::update_status),
        )
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), "seller|admin"),
            role_guard,
        ));

    public
        .merge(authenticated)
        .merge(admin)
        .merge(seller_or_admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{DatabaseConfig, JwtConfig};

    /// State wired against a lazy pool; nothing connects until a query
    /// runs, so middleware tests never touch a database.
    pub(crate) fn app_state() -> AppState {
        let config = Config {
            http_host: "127.0.0.1".to_string(),
            http_port: 8080,
            database: DatabaseConfig {
                url: "mysql://root@localhost/facturo_test".to_string(),
                max_connections: 1,
                min_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-which-is-long-enough".to_string(),
                issuer: "facturo-test".to_string(),
                access_token_ttl_secs: 3600,
            },
        };

        let db_pool = MySqlPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool");

        let user_repo = Arc::new(UserRepositoryImpl::new(db_pool.clone()));
        let product_repo = Arc::new(ProductRepositoryImpl::new(db_pool.clone()));
        let invoice_repo = Arc::new(InvoiceRepositoryImpl::new(db_pool.clone()));
        let jwt_manager = JwtManager::new(config.jwt.clone());

        AppState {
            config: Arc::new(config),
            db_pool,
            auth_service: Arc::new(AuthService::new(
                user_repo.clone(),
                jwt_manager.clone(),
                None,
            )),
            user_service: Arc::new(UserService::new(user_repo.clone(), None)),
            product_service: Arc::new(ProductService::new(product_repo.clone(), None)),
            invoice_service: Arc::new(InvoiceService::new(
                invoice_repo,
                user_repo,
                product_repo,
                None,
            )),
            jwt_manager,
        }
    }
}
