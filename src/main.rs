mod config;
mod error;
mod handlers;
mod models;
mod services;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use services::{engine::AnalyticsEngine, store::SubscriptionStore};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = config::Config::from_env().expect("Failed to load configuration");

    let store = SubscriptionStore::from_config(&config.store)
        .await
        .expect("Failed to initialize subscription store");
    let engine = AnalyticsEngine::new(&config.engine);

    let bind_address = config.server.bind_address();
    log::info!(
        "Engine: top_n={} savings_threshold={} recency_window={}d expiry_window={}d store={}",
        config.engine.top_n,
        config.engine.savings_risk_threshold,
        config.engine.recency_window_days,
        config.engine.expiry_window_days,
        store.backend_name()
    );
    println!("🚀 Starting Subscription Optimizer on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials(),
            )
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(engine))
            .configure(handlers::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
}
