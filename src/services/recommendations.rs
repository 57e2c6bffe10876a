use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::config::EngineConfig;
use crate::models::{
    analytics::{RecommendationView, SavingsSummary},
    subscription::{AnnotatedSubscription, Subscription},
};
use crate::services::scoring::Annotator;

/// Groups a portfolio into high-risk, low-value, expiring and savings buckets.
///
/// Works over every subscription, expired ones included: an expired subscription that is
/// still listed is exactly the abandonment signal the view is meant to surface. Status
/// filtering is left to the caller.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationBuilder {
    annotator: Annotator,
    top_n: usize,
    savings_risk_threshold: u8,
    expiry_window_days: i64,
}

impl RecommendationBuilder {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            annotator: Annotator::new(config),
            top_n: config.top_n,
            savings_risk_threshold: config.savings_risk_threshold,
            expiry_window_days: config.expiry_window_days,
        }
    }

    pub fn build(&self, subscriptions: &[Subscription], today: NaiveDate) -> RecommendationView {
        if subscriptions.is_empty() {
            return RecommendationView::empty();
        }

        let annotated = self.annotator.annotate_all(subscriptions, today);

        let mut high_risk = annotated.clone();
        high_risk.sort_by(by_risk_then_cost);
        high_risk.truncate(self.top_n);

        let mut low_value = annotated.clone();
        low_value.sort_by(by_value_then_risk);
        low_value.truncate(self.top_n);

        let mut upcoming_expirations: Vec<AnnotatedSubscription> = annotated
            .iter()
            .filter(|s| s.days_until_expiry >= 0 && s.days_until_expiry < self.expiry_window_days)
            .cloned()
            .collect();
        upcoming_expirations.sort_by(|a, b| {
            a.days_until_expiry
                .cmp(&b.days_until_expiry)
                .then_with(|| a.id().cmp(b.id()))
        });

        let mut candidates: Vec<AnnotatedSubscription> = annotated
            .into_iter()
            .filter(|s| s.churn_risk >= self.savings_risk_threshold)
            .collect();
        candidates.sort_by(|a, b| {
            b.monthly_cost()
                .cmp(&a.monthly_cost())
                .then_with(|| a.id().cmp(b.id()))
        });
        let total_monthly = candidates
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + s.monthly_cost());

        RecommendationView {
            high_risk,
            low_value,
            upcoming_expirations,
            savings: SavingsSummary {
                total_monthly,
                candidates,
            },
        }
    }
}

/// Risk descending, then price descending so expensive stale items surface first.
fn by_risk_then_cost(a: &AnnotatedSubscription, b: &AnnotatedSubscription) -> Ordering {
    b.churn_risk
        .cmp(&a.churn_risk)
        .then_with(|| b.monthly_cost().cmp(&a.monthly_cost()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Value ascending, then risk descending.
fn by_value_then_risk(a: &AnnotatedSubscription, b: &AnnotatedSubscription) -> Ordering {
    a.value_score
        .total_cmp(&b.value_score)
        .then_with(|| b.churn_risk.cmp(&a.churn_risk))
        .then_with(|| a.id().cmp(b.id()))
}
