use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::models::analytics::MonthlyReport;
use crate::models::subscription::Subscription;
use crate::services::redundancy::RedundancyDetector;
use crate::services::scoring::Annotator;

/// Monthly digest: biggest active expenses, barely used subscriptions and a few
/// human-readable suggestions.
#[derive(Debug, Clone, Copy)]
pub struct MonthlyReporter {
    annotator: Annotator,
    redundancy: RedundancyDetector,
    top_expenses: usize,
    unused_risk_threshold: u8,
    expiry_window_days: i64,
}

impl MonthlyReporter {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            annotator: Annotator::new(config),
            redundancy: RedundancyDetector,
            top_expenses: config.report_top_expenses,
            unused_risk_threshold: config.unused_risk_threshold,
            expiry_window_days: config.expiry_window_days,
        }
    }

    pub fn generate(&self, subscriptions: &[Subscription], today: NaiveDate) -> MonthlyReport {
        let annotated = self.annotator.annotate_all(subscriptions, today);

        let mut top_expenses: Vec<_> = annotated
            .iter()
            .filter(|s| s.subscription.is_active(today))
            .cloned()
            .collect();
        top_expenses.sort_by(|a, b| {
            b.monthly_cost()
                .cmp(&a.monthly_cost())
                .then_with(|| a.id().cmp(b.id()))
        });
        top_expenses.truncate(self.top_expenses);

        let mut unused: Vec<_> = annotated
            .iter()
            .filter(|s| s.churn_risk > self.unused_risk_threshold)
            .cloned()
            .collect();
        unused.sort_by(|a, b| b.churn_risk.cmp(&a.churn_risk).then_with(|| a.id().cmp(b.id())));

        let potential_savings = unused
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + s.monthly_cost());

        let mut recommendations = Vec::new();
        if !unused.is_empty() {
            recommendations.push(format!(
                "Save {} per month by cancelling {} rarely used subscription(s)",
                potential_savings.round_dp(2),
                unused.len()
            ));
        }

        for group in self.redundancy.detect(subscriptions, today) {
            recommendations.push(format!(
                "{} services in category '{}': {}",
                group.count,
                group.categorie,
                group.services.join(", ")
            ));
        }

        let expiring = annotated
            .iter()
            .filter(|s| s.days_until_expiry > 0 && s.days_until_expiry < self.expiry_window_days)
            .count();
        if expiring > 0 {
            recommendations.push(format!(
                "{} subscription(s) expire within {} days, consider renewing",
                expiring, self.expiry_window_days
            ));
        }

        MonthlyReport {
            top_expenses,
            unused,
            potential_savings,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::subscription::fixtures::{subscription, today};
    use crate::models::subscription::AnnotatedSubscription;

    fn reporter() -> MonthlyReporter {
        MonthlyReporter::new(&EngineConfig::default())
    }

    fn ids(list: &[AnnotatedSubscription]) -> Vec<&str> {
        list.iter().map(|s| s.id()).collect()
    }

    fn named(mut sub: Subscription, name: &str, categorie: &str) -> Subscription {
        sub.nom_service = name.to_string();
        sub.categorie = categorie.to_string();
        sub
    }

    #[test]
    fn test_report_collects_spenders_and_suggestions() {
        let subs = vec![
            // risk 12, expires in 90 days
            named(subscription("gold", Decimal::new(80, 0), Some(5), 90), "Gold", "Premium"),
            // 200 days unused: risk 70, plus expiry (30 - 20) = 10 -> 80
            named(subscription("silver", Decimal::new(40, 0), Some(200), 20), "Silver", "Premium"),
            // risk 70 + expiry 25 = 95
            named(subscription("bronze", Decimal::new(25, 0), Some(190), 5), "Bronze", "Loisir"),
            named(subscription("tin", Decimal::new(5, 0), Some(1), 90), "Tin", "Loisir"),
        ];

        let report = reporter().generate(&subs, today());

        assert_eq!(ids(&report.top_expenses), vec!["gold", "silver", "bronze"]);
        assert_eq!(ids(&report.unused), vec!["bronze", "silver"]);
        assert!(report.unused.iter().all(|s| s.churn_risk > 70));
        assert_eq!(report.potential_savings, Decimal::new(65, 0));
        assert_eq!(
            report.recommendations,
            vec![
                "Save 65 per month by cancelling 2 rarely used subscription(s)".to_string(),
                "2 services in category 'Loisir': Bronze, Tin".to_string(),
                "2 services in category 'Premium': Gold, Silver".to_string(),
                "2 subscription(s) expire within 30 days, consider renewing".to_string(),
            ]
        );
    }

    #[test]
    fn test_top_expenses_skip_inactive() {
        let subs = vec![
            subscription("expired", Decimal::new(100, 0), Some(1), -1),
            subscription("b", Decimal::new(10, 0), Some(1), 90),
            subscription("a", Decimal::new(10, 0), Some(1), 90),
        ];

        let report = reporter().generate(&subs, today());
        assert_eq!(ids(&report.top_expenses), vec!["a", "b"]);
    }

    #[test]
    fn test_quiet_portfolio_has_no_suggestions() {
        let subs = vec![named(subscription("a", Decimal::new(10, 0), Some(1), 90), "A", "Solo")];

        let report = reporter().generate(&subs, today());
        assert!(report.unused.is_empty());
        assert_eq!(report.potential_savings, Decimal::ZERO);
        assert!(report.recommendations.is_empty());

        let empty = reporter().generate(&[], today());
        assert!(empty.top_expenses.is_empty());
        assert!(empty.recommendations.is_empty());
    }
}
