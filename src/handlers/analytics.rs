use actix_web::web::{Data, Query};
use actix_web::{get, HttpResponse};

use crate::error::EngineError;
use crate::models::common::{parse_target, resolve_as_of, AsOfQuery, BudgetPlanQuery};
use crate::services::{engine::AnalyticsEngine, store::SubscriptionStore};

// GET /api/recommendations
#[get("/recommendations")]
pub async fn get_recommendations(
    store: Data<SubscriptionStore>,
    engine: Data<AnalyticsEngine>,
    query: Query<AsOfQuery>,
) -> Result<HttpResponse, EngineError> {
    let today = resolve_as_of(query.as_of.as_deref())?;
    let subscriptions = store.fetch_all().await?;

    let view = engine.recommendations.build(&subscriptions, today);
    log::debug!(
        "Recommendations for {} subscriptions: {} high risk, {} savings candidates",
        subscriptions.len(),
        view.high_risk.len(),
        view.savings.candidates.len()
    );

    Ok(HttpResponse::Ok().json(view))
}

// GET /api/analytics/budget-plan?target=<number>
#[get("/budget-plan")]
pub async fn get_budget_plan(
    store: Data<SubscriptionStore>,
    engine: Data<AnalyticsEngine>,
    query: Query<BudgetPlanQuery>,
) -> Result<HttpResponse, EngineError> {
    // Request parameters are checked before the store is touched.
    let target = parse_target(query.target.as_deref())?;
    let today = resolve_as_of(query.as_of.as_deref())?;
    let subscriptions = store.fetch_all().await?;

    let plan = engine.planner.plan(&subscriptions, today, target)?;
    log::info!(
        "Budget plan: current={} target={} required={} achieved={} feasible={} cancel={:?} optional={:?}",
        plan.current_monthly_cost,
        plan.target_monthly_budget,
        plan.required_savings,
        plan.achieved_savings,
        plan.target_feasible,
        plan.cancellation_names(),
        plan.optional_names()
    );

    Ok(HttpResponse::Ok().json(plan))
}

// GET /api/analytics/duplicates
#[get("/duplicates")]
pub async fn get_duplicates(
    store: Data<SubscriptionStore>,
    engine: Data<AnalyticsEngine>,
    query: Query<AsOfQuery>,
) -> Result<HttpResponse, EngineError> {
    let today = resolve_as_of(query.as_of.as_deref())?;
    let subscriptions = store.fetch_all().await?;

    Ok(HttpResponse::Ok().json(engine.redundancy.detect(&subscriptions, today)))
}

// GET /api/analytics/anomalies
#[get("/anomalies")]
pub async fn get_anomalies(
    store: Data<SubscriptionStore>,
    engine: Data<AnalyticsEngine>,
) -> Result<HttpResponse, EngineError> {
    let subscriptions = store.fetch_all().await?;

    let anomalies = engine.anomalies.detect(&subscriptions);
    if !anomalies.is_empty() {
        log::info!("{} price anomalies among {} subscriptions", anomalies.len(), subscriptions.len());
    }

    Ok(HttpResponse::Ok().json(anomalies))
}

// GET /api/analytics/metrics
#[get("/metrics")]
pub async fn get_metrics(
    store: Data<SubscriptionStore>,
    engine: Data<AnalyticsEngine>,
    query: Query<AsOfQuery>,
) -> Result<HttpResponse, EngineError> {
    let today = resolve_as_of(query.as_of.as_deref())?;
    let subscriptions = store.fetch_all().await?;

    Ok(HttpResponse::Ok().json(engine.metrics.compute(&subscriptions, today)))
}

// GET /api/analytics/monthly-report
#[get("/monthly-report")]
pub async fn get_monthly_report(
    store: Data<SubscriptionStore>,
    engine: Data<AnalyticsEngine>,
    query: Query<AsOfQuery>,
) -> Result<HttpResponse, EngineError> {
    let today = resolve_as_of(query.as_of.as_deref())?;
    let subscriptions = store.fetch_all().await?;

    let report = engine.report.generate(&subscriptions, today);
    log::debug!(
        "Monthly report: {} unused, potential savings {}",
        report.unused.len(),
        report.potential_savings
    );

    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::handlers;
    use crate::models::subscription::fixtures::subscription;
    use crate::models::subscription::Subscription;
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal::Decimal;
    use serde_json::Value;
    use std::time::Duration;

    const AS_OF: &str = "2024-06-15";

    fn portfolio() -> Vec<Subscription> {
        vec![
            subscription("fresh", Decimal::new(20, 0), Some(2), 200),
            subscription("stale", Decimal::new(10, 0), Some(45), 60),
        ]
    }

    async fn call(store: SubscriptionStore, uri: &str) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .app_data(Data::new(AnalyticsEngine::new(&EngineConfig::default())))
                .configure(handlers::configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_budget_plan_endpoint() {
        let uri = format!("/api/analytics/budget-plan?target=15&asOf={}", AS_OF);
        let (status, body) = call(SubscriptionStore::in_memory(portfolio()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["currentMonthlyCost"], 30.0);
        assert_eq!(body["requiredSavings"], 15.0);
        assert_eq!(body["achievedSavings"], 30.0);
        assert_eq!(body["targetFeasible"], true);
        assert_eq!(body["recommendedCancellations"][0]["id"], "stale");
        assert_eq!(body["recommendedCancellations"][1]["id"], "fresh");
        assert_eq!(body["optionalCandidates"].as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn test_budget_plan_rejects_bad_targets() {
        for uri in [
            "/api/analytics/budget-plan",
            "/api/analytics/budget-plan?target=",
            "/api/analytics/budget-plan?target=lots",
            "/api/analytics/budget-plan?target=-5",
        ] {
            let (status, body) = call(SubscriptionStore::in_memory(portfolio()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(body["error"].is_string());
        }
    }

    #[actix_web::test]
    async fn test_bad_target_wins_over_unreachable_store() {
        let store = SubscriptionStore::upstream("http://127.0.0.1:9/api/abonnements", Duration::from_secs(1)).unwrap();
        let (status, _) = call(store, "/api/analytics/budget-plan?target=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unreachable_store_is_bad_gateway() {
        let store = SubscriptionStore::upstream("http://127.0.0.1:9/api/abonnements", Duration::from_secs(1)).unwrap();
        let (status, body) = call(store, &format!("/api/recommendations?asOf={}", AS_OF)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().starts_with("Subscription store unavailable"));
    }

    #[actix_web::test]
    async fn test_recommendations_endpoint() {
        let uri = format!("/api/recommendations?asOf={}", AS_OF);
        let (status, body) = call(SubscriptionStore::in_memory(portfolio()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["highRisk"][0]["id"], "stale");
        assert_eq!(body["highRisk"][0]["churnRisk"], 70);
        assert_eq!(body["lowValue"][0]["valueScore"], 30.0);
        assert_eq!(body["savings"]["totalMonthly"], 10.0);
        assert_eq!(body["savings"]["candidates"][0]["nomService"], "Service stale");
        assert_eq!(body["upcomingExpirations"].as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn test_recommendations_on_empty_store() {
        let uri = format!("/api/recommendations?asOf={}", AS_OF);
        let (status, body) = call(SubscriptionStore::in_memory(Vec::new()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["highRisk"].as_array().unwrap().len(), 0);
        assert_eq!(body["savings"]["totalMonthly"], 0.0);
    }

    #[actix_web::test]
    async fn test_invalid_as_of() {
        let (status, body) = call(
            SubscriptionStore::in_memory(portfolio()),
            "/api/recommendations?asOf=yesterday",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("asOf"));
    }

    #[actix_web::test]
    async fn test_budget_plan_out_of_range_target() {
        let uri = format!("/api/analytics/budget-plan?target=1e30&asOf={}", AS_OF);
        let (status, body) = call(SubscriptionStore::in_memory(portfolio()), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("out of range"));
    }

    #[actix_web::test]
    async fn test_zero_target_cancels_free_subscriptions_too() {
        let mut subs = portfolio();
        subs.push(subscription("free", Decimal::ZERO, Some(1), 200));
        let uri = format!("/api/analytics/budget-plan?target=0&asOf={}", AS_OF);
        let (status, body) = call(SubscriptionStore::in_memory(subs), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["targetFeasible"], true);
        assert_eq!(body["recommendedCancellations"].as_array().unwrap().len(), 3);
        assert_eq!(body["optionalCandidates"].as_array().unwrap().len(), 0);
    }

    #[actix_web::test]
    async fn test_anomalies_endpoint() {
        let mut subs: Vec<Subscription> = (0..5)
            .map(|i| subscription(&format!("s{}", i), Decimal::new(10, 0), Some(1), 90))
            .collect();
        subs.push(subscription("pricey", Decimal::new(200, 0), Some(1), 90));

        let (status, body) = call(SubscriptionStore::in_memory(subs), "/api/analytics/anomalies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], "pricey");
        assert_eq!(body[0]["prix"], 200.0);
        assert!(body[0]["message"].is_string());
    }

    #[actix_web::test]
    async fn test_metrics_endpoint() {
        let uri = format!("/api/analytics/metrics?asOf={}", AS_OF);
        let (status, body) = call(SubscriptionStore::in_memory(portfolio()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscriptionCount"], 2);
        assert_eq!(body["activeCount"], 2);
        assert_eq!(body["currentMonthlyCost"], 30.0);
        // stale: risk 70
        assert_eq!(body["highRiskCount"], 1);
        assert_eq!(body["averageChurnRisk"], 37.5);
    }

    #[actix_web::test]
    async fn test_monthly_report_endpoint() {
        let uri = format!("/api/analytics/monthly-report?asOf={}", AS_OF);
        let (status, body) = call(SubscriptionStore::in_memory(portfolio()), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["topExpenses"][0]["id"], "fresh");
        assert_eq!(body["topExpenses"][1]["id"], "stale");
        // risk 70 is not above the unused threshold
        assert_eq!(body["unused"].as_array().unwrap().len(), 0);
        assert_eq!(body["potentialSavings"], 0.0);
        assert!(body["recommendations"][0].as_str().unwrap().contains("Streaming"));

        let (status, _) = call(
            SubscriptionStore::in_memory(portfolio()),
            "/api/analytics/monthly-report?asOf=soon",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_duplicates_and_listing() {
        let uri = format!("/api/analytics/duplicates?asOf={}", AS_OF);
        let (status, body) = call(SubscriptionStore::in_memory(portfolio()), &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["categorie"], "Streaming");
        assert_eq!(body[0]["count"], 2);

        let (status, body) = call(SubscriptionStore::in_memory(portfolio()), "/api/abonnements").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = call(SubscriptionStore::in_memory(Vec::new()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
