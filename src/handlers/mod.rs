pub mod analytics;
pub mod health;
pub mod subscriptions;

use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(subscriptions::list_subscriptions)
            .service(analytics::get_recommendations)
            .service(
                web::scope("/analytics")
                    .service(analytics::get_budget_plan)
                    .service(analytics::get_duplicates)
                    .service(analytics::get_anomalies)
                    .service(analytics::get_metrics)
                    .service(analytics::get_monthly_report),
            ),
    )
    .route("/health", web::get().to(health::health_check));
}
