use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use chrono::Utc;
use content_service::config::Config;
use content_service::db::{
    self, CommentRepository, CommentStore, EngagementRepository, EngagementStore, PostRepository,
    PostStore,
};
use content_service::handlers;
use content_service::middleware::{GatewayIdentity, RequestTiming};
use content_service::services::{CommentService, PostService};
use serde::Serialize;
use sqlx::PgPool;
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn readiness(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(HealthResponse {
            status: "ready",
            timestamp: Utc::now().to_rfc3339(),
        }),
        Err(err) => {
            tracing::error!("readiness check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: "unavailable",
                timestamp: Utc::now().to_rfc3339(),
            })
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = db::create_pool(&config.database).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("failed to connect to database: {}", e),
        )
    })?;

    db::schema::ensure_content_tables(&pool)
        .await
        .map_err(|e| io::Error::other(format!("failed to ensure content tables: {}", e)))?;

    let posts: Arc<dyn PostStore> = Arc::new(PostRepository::new(pool.clone()));
    let comments: Arc<dyn CommentStore> = Arc::new(CommentRepository::new(pool.clone()));
    let engagement: Arc<dyn EngagementStore> = Arc::new(EngagementRepository::new(pool.clone()));

    let post_service = web::Data::new(PostService::new(
        posts.clone(),
        comments.clone(),
        engagement.clone(),
    ));
    let comment_service = web::Data::new(CommentService::new(comments, posts, engagement));

    tracing::info!(
        host = %config.app.host,
        port = config.app.port,
        env = %config.app.env,
        "starting content service"
    );

    let bind_addr = (config.app.host.clone(), config.app.port);
    let allowed_origins = config.cors.allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .wrap(GatewayIdentity)
            .wrap(RequestTiming)
            .wrap(build_cors(&allowed_origins))
            .app_data(web::Data::new(pool.clone()))
            .app_data(post_service.clone())
            .app_data(comment_service.clone())
            .route("/health", web::get().to(health))
            .route("/health/ready", web::get().to(readiness))
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}

fn build_cors(allowed_origins: &str) -> Cors {
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if allowed_origins.trim() == "*" {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
        {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
