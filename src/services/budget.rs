use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::models::{
    analytics::BudgetPlan,
    subscription::{AnnotatedSubscription, Subscription},
};
use crate::services::scoring::Annotator;

/// Picks which subscriptions to cancel to bring monthly spend down to a target.
///
/// Selection is greedy: candidates are ranked by [`cancellation_order`] and taken in order
/// until the accumulated savings cover the gap. This gives the fewest cancellations under
/// that order in `O(n log n)`. It is deliberately not a subset-sum search: the stopping
/// subscription is never swapped for a cheaper one that would also close the gap.
#[derive(Debug, Clone, Copy)]
pub struct BudgetPlanner {
    annotator: Annotator,
}

impl BudgetPlanner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            annotator: Annotator::new(config),
        }
    }

    pub fn plan(
        &self,
        subscriptions: &[Subscription],
        today: NaiveDate,
        target_monthly_budget: Decimal,
    ) -> Result<BudgetPlan, EngineError> {
        if target_monthly_budget.is_sign_negative() && !target_monthly_budget.is_zero() {
            return Err(EngineError::InvalidTarget("Target budget must be positive".to_string()));
        }

        let mut ranked = self.annotator.annotate_all(subscriptions, today);
        ranked.sort_by(cancellation_order);

        let current_monthly_cost = ranked
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc + s.monthly_cost());
        let required_savings = (current_monthly_cost - target_monthly_budget).max(Decimal::ZERO);

        let mut recommended_cancellations = Vec::new();
        let mut optional_candidates = Vec::new();
        let mut achieved_savings = Decimal::ZERO;
        // A zero budget leaves room for no subscription at all, free ones included.
        let cancel_all = target_monthly_budget.is_zero() && required_savings > Decimal::ZERO;

        for candidate in ranked {
            if cancel_all || achieved_savings < required_savings {
                achieved_savings += candidate.monthly_cost();
                recommended_cancellations.push(candidate);
            } else {
                optional_candidates.push(candidate);
            }
        }

        let shortfall = (required_savings - achieved_savings).max(Decimal::ZERO);

        Ok(BudgetPlan {
            current_monthly_cost,
            target_monthly_budget,
            required_savings,
            recommended_cancellations,
            achieved_savings,
            shortfall,
            target_feasible: shortfall.is_zero(),
            optional_candidates,
        })
    }
}

/// Least worth keeping first: value ascending, then risk descending, then id.
pub fn cancellation_order(a: &AnnotatedSubscription, b: &AnnotatedSubscription) -> Ordering {
    a.value_score
        .total_cmp(&b.value_score)
        .then_with(|| b.churn_risk.cmp(&a.churn_risk))
        .then_with(|| a.id().cmp(b.id()))
}
