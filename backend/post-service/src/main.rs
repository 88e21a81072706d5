use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use post_service::config::{Config, StoreBackend};
use post_service::db::{self, InMemoryStore, PgPostStore, PgUserStore, PostStore, UserStore};
use post_service::handlers;
use post_service::middleware::SessionAuthMiddleware;
use post_service::services::GoogleIdentityProvider;
use post_service::AppState;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler; using Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Stores backing the service, plus the pool to close on shutdown.
async fn init_stores(
    config: &Config,
) -> anyhow::Result<(Arc<dyn PostStore>, Arc<dyn UserStore>, Option<PgPool>)> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.database)
                .await
                .context("failed to connect to PostgreSQL")?;
            db::run_migrations(&pool)
                .await
                .context("failed to apply database migrations")?;

            Ok((
                Arc::new(PgPostStore::new(pool.clone())),
                Arc::new(PgUserStore::new(pool.clone())),
                Some(pool),
            ))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let store = InMemoryStore::new();
            Ok((Arc::new(store.clone()), Arc::new(store), None))
        }
    }
}

/// Post Service
///
/// Serves the social feed API: Google sign-in, posts with media, likes and
/// the paginated feed.
///
/// # Routes
///
/// - `/api/posts/*` - Feed, create, delete, like/dislike
/// - `/api/auth/*` - OAuth login, status, logout
/// - `/api/health/*` - Health probes
/// - `/metrics` - Prometheus metrics
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.app.json_logs);

    tracing::info!("Starting post-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    if config.oauth.google_client_id.is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID not configured; login will redirect to the failure URL");
    }

    let (post_store, user_store, pool) = init_stores(&config).await?;
    let provider = Arc::new(
        GoogleIdentityProvider::new(&config.oauth).context("failed to build OAuth client")?,
    );

    let state = AppState::new(post_store, user_store, provider, &config);
    let session_auth = SessionAuthMiddleware::new(state.identity.clone());
    let state = web::Data::new(state);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();

    tracing::info!("HTTP server listening on {}", bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(session_auth.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(post_service::metrics::serve_metrics))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run();

    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        server_handle.stop(true).await;
    });

    if let Err(e) = server.await {
        tracing::error!(error = %e, "HTTP server exited with error");
    }

    if let Some(pool) = pool {
        pool.close().await;
    }

    tracing::info!("Post-service shutting down");
    Ok(())
}
