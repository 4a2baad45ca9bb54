mod core;
mod features;
mod modules;
mod shared;

use crate::core::changes::ChangeFeed;
use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::AuthService;
use crate::features::categories::{routes as categories_routes, CategoryService};
use crate::features::changes::routes as changes_routes;
use crate::features::leads::{routes as leads_routes, LeadService};
use crate::features::notifications::handlers::NotificationState;
use crate::features::notifications::{
    routes as notifications_routes, LeadWatcher, NotificationService, SecurityAuditService,
};
use crate::features::products::{routes as products_routes, ProductService};
use crate::features::quotes::{routes as quotes_routes, QuoteService};
use crate::features::stats::{routes as stats_routes, StatsService};
use crate::modules::mailer::{EmailSender, ResendClient};
use crate::shared::constants::CHANGE_FEED_CAPACITY;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Change feed shared by every writing service and its subscribers
    let change_feed = Arc::new(ChangeFeed::new(CHANGE_FEED_CAPACITY));

    // Initialize auth service (admin sessions)
    let auth_service = Arc::new(AuthService::new(pool.clone(), config.auth.clone()));
    tracing::info!("Auth service initialized");

    // Initialize email provider client
    let mailer: Arc<dyn EmailSender> = Arc::new(ResendClient::new(config.mailer.clone()));
    tracing::info!("Mailer client initialized");

    // Initialize catalog services
    let category_service = Arc::new(CategoryService::new(pool.clone()));
    let product_service = Arc::new(ProductService::new(pool.clone(), Arc::clone(&change_feed)));
    tracing::info!("Catalog services initialized");

    // Initialize intake services
    let lead_service = Arc::new(LeadService::new(pool.clone(), Arc::clone(&change_feed)));
    let quote_service = Arc::new(QuoteService::new(pool.clone(), Arc::clone(&change_feed)));
    tracing::info!("Intake services initialized");

    // Initialize notification pipeline
    let audit_service = Arc::new(SecurityAuditService::new(pool.clone()));
    let notification_service = Arc::new(NotificationService::new(
        pool.clone(),
        Arc::clone(&mailer),
        Arc::clone(&audit_service),
        Arc::clone(&change_feed),
    ));
    tracing::info!("Notification service initialized");

    // Initialize stats service
    let stats_service = Arc::new(StatsService::new(pool.clone()));
    tracing::info!("Stats service initialized");

    // Spawn the lead watcher: new leads run through the notification
    // pipeline without waiting for a manual trigger
    let watcher = LeadWatcher::new(
        Arc::clone(&lead_service),
        Arc::clone(&notification_service),
        Arc::clone(&change_feed),
    );
    tokio::spawn(async move {
        watcher.run().await;
    });
    tracing::info!("Lead notification watcher spawned");

    let notification_state = NotificationState {
        service: Arc::clone(&notification_service),
        auth: Arc::clone(&auth_service),
        leads: Arc::clone(&lead_service),
    };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Back office routes (require an admin session)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .nest(
            "/api/admin",
            Router::new()
                .merge(leads_routes::admin_routes(Arc::clone(&lead_service)))
                .merge(products_routes::admin_routes(Arc::clone(&product_service)))
                .merge(quotes_routes::admin_routes(Arc::clone(&quote_service)))
                .merge(stats_routes::admin_routes(Arc::clone(&stats_service)))
                .merge(changes_routes::admin_routes(Arc::clone(&change_feed)))
                .merge(notifications_routes::admin_routes(
                    notification_state.clone(),
                )),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            Arc::clone(&auth_service),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(Arc::clone(&auth_service)))
        .merge(categories_routes::routes(category_service))
        .merge(products_routes::routes(Arc::clone(&product_service)))
        .merge(leads_routes::routes(Arc::clone(&lead_service)))
        .merge(quotes_routes::routes(Arc::clone(&quote_service)))
        // The function checks its own bearer credential
        .merge(notifications_routes::function_routes(notification_state));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
