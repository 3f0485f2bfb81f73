//! # Forum Server Binary
//!
//! The entry point that assembles the application based on compile-time features.

mod settings;

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use forum_api::{configure_routes, middleware, AppState};
use forum_core::{ForumUsecase, PostUsecase};

// Feature-gated imports: the storage backend is picked at compile time
#[cfg(feature = "db-sqlite")]
use forum_db_sqlite::SqliteForumRepo;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = settings::Settings::load().context("loading configuration")?;

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let repo = Arc::new(
        SqliteForumRepo::new(&settings.database_url, settings.max_connections)
            .await
            .with_context(|| format!("opening {}", settings.database_url))?,
    );

    // 2. Wire the usecases (dynamic dispatch over the storage ports)
    let state = web::Data::new(AppState {
        forums: ForumUsecase::new(repo.clone(), repo.clone(), repo.clone()),
        posts: PostUsecase::new(repo),
    });

    log::info!("forum server starting on http://{}:{}", settings.host, settings.port);

    let cors_origin = settings.cors_origin.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::cors_policy(cors_origin.as_deref()))
            .wrap(middleware::standard_middleware())
            .configure(configure_routes)
    })
    .bind((settings.host.as_str(), settings.port))
    .with_context(|| format!("binding {}:{}", settings.host, settings.port))?
    .run()
    .await?;

    Ok(())
}
