use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use log::info;
use std::sync::Arc;

mod config;
mod error;
mod handlers;
mod logging;
mod models;
mod repository;
mod seed;

use config::Config;
use repository::{PostRepository, SqlitePostRepository};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::parse();
    logging::init(config.log_level, &config.log_file)?;

    info!("Opening database {}", config.database.display());
    let repo: Arc<dyn PostRepository> = Arc::new(SqlitePostRepository::open(&config.database)?);
    seed::seed_posts(repo.as_ref(), &config.seed_source())?;

    let data = web::Data::from(repo);
    info!("Listening on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
            .default_service(web::route().to(handlers::not_found))
    })
    .bind(&config.bind)?
    .run()
    .await
}
