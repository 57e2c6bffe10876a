use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::models::{analytics::PortfolioMetrics, subscription::Subscription};
use crate::services::scoring::{round2, Annotator};

/// Portfolio-wide aggregates for the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCalculator {
    annotator: Annotator,
    high_risk_threshold: u8,
}

impl MetricsCalculator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            annotator: Annotator::new(config),
            high_risk_threshold: config.savings_risk_threshold,
        }
    }

    pub fn compute(&self, subscriptions: &[Subscription], today: NaiveDate) -> PortfolioMetrics {
        let annotated = self.annotator.annotate_all(subscriptions, today);
        let count = annotated.len();

        let current_monthly_cost = subscriptions
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + s.monthly_cost());
        let total_paid = subscriptions
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + s.total_paid(today));

        let (lifetime_value, average_churn_risk, average_value_score) = if count == 0 {
            (Decimal::ZERO, 0.0, 0.0)
        } else {
            let risk_sum: f64 = annotated.iter().map(|s| f64::from(s.churn_risk)).sum();
            let value_sum: f64 = annotated.iter().map(|s| s.value_score).sum();
            (
                (total_paid / Decimal::from(count)).round_dp(2),
                round2(risk_sum / count as f64),
                round2(value_sum / count as f64),
            )
        };

        PortfolioMetrics {
            subscription_count: count,
            active_count: subscriptions.iter().filter(|s| s.is_active(today)).count(),
            current_monthly_cost,
            lifetime_value,
            average_churn_risk,
            average_value_score,
            // strictly above, unlike the savings candidates
            high_risk_count: annotated
                .iter()
                .filter(|s| s.churn_risk > self.high_risk_threshold)
                .count(),
        }
    }
}
