use actix_web::{middleware::Logger, web, App, HttpServer};

use warbler::api;
use warbler::config::Config;
use warbler::db::create_pool;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;

    log::info!("Starting server on {}", config.server_addr());

    let pool = create_pool(&config).await?;

    log::info!("Database connection established");

    let server_addr = config.server_addr();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .configure(api::configure)
            .default_service(web::to(api::not_found))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
