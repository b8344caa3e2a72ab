// src/main.rs
use actix_web::{App, HttpServer, middleware, web};
use adcritic::{AppState, config::Config, handlers, services::AnalysisClient};
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting adcritic service...");

    // A missing credential stops the process here, before any request.
    let config = Config::from_env()?;
    let analysis_client = AnalysisClient::from_config(&config)?;
    info!(
        "Using model {} with a {:?} request timeout",
        config.model, config.request_timeout
    );

    let app_state = AppState::new(analysis_client);

    info!("Starting HTTP server on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
