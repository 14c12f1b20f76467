// src/main.rs
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};
use tqp_api::config::Config;
use tqp_api::{build_default_state, configure_routes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::from_env();

    // Initialize logger only once at the start
    env_logger::init_from_env(Env::default().default_filter_or(config.environment.default_log_filter()));

    if config.steam_api_key.is_empty() {
        warn!("STEAM_API_KEY is not set, upstream requests will be rejected");
    }

    let state = match build_default_state(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!("Failed to initialize: {}", e);
            return Err(
                std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to initialize: {}", e)
                )
            );
        }
    };

    let bind = config.bind();
    info!("Starting server on {}", bind);
    info!("Environment: {}", config.environment.as_str());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(configure_routes)
    })
        .bind(&bind)?
        .run().await
}
