use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::subscription::AnnotatedSubscription;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationView {
    pub high_risk: Vec<AnnotatedSubscription>,
    pub low_value: Vec<AnnotatedSubscription>,
    pub upcoming_expirations: Vec<AnnotatedSubscription>,
    pub savings: SavingsSummary,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingsSummary {
    pub total_monthly: Decimal,
    pub candidates: Vec<AnnotatedSubscription>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlan {
    pub current_monthly_cost: Decimal,
    pub target_monthly_budget: Decimal,
    pub required_savings: Decimal,
    pub recommended_cancellations: Vec<AnnotatedSubscription>,
    pub achieved_savings: Decimal,
    pub shortfall: Decimal,
    pub target_feasible: bool,
    pub optional_candidates: Vec<AnnotatedSubscription>,
}

/// Several active services sharing one category.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRedundancy {
    pub categorie: String,
    pub count: usize,
    pub monthly_cost: Decimal,
    pub services: Vec<String>,
}

/// A subscription priced well above the rest of the portfolio.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PriceAnomaly {
    pub id: String,
    pub nom_service: String,
    pub prix: Decimal,
    pub threshold: f64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub subscription_count: usize,
    pub active_count: usize,
    pub current_monthly_cost: Decimal,
    /// Average amount paid so far per subscription.
    pub lifetime_value: Decimal,
    pub average_churn_risk: f64,
    pub average_value_score: f64,
    pub high_risk_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub top_expenses: Vec<AnnotatedSubscription>,
    pub unused: Vec<AnnotatedSubscription>,
    pub potential_savings: Decimal,
    pub recommendations: Vec<String>,
}

impl RecommendationView {
    pub fn empty() -> Self {
        Self {
            high_risk: Vec::new(),
            low_value: Vec::new(),
            upcoming_expirations: Vec::new(),
            savings: SavingsSummary {
                total_monthly: Decimal::ZERO,
                candidates: Vec::new(),
            },
        }
    }
}

impl BudgetPlan {
    pub fn cancellation_names(&self) -> Vec<&str> {
        self.recommended_cancellations
            .iter()
            .map(|s| s.subscription.nom_service.as_str())
            .collect()
    }

    pub fn optional_names(&self) -> Vec<&str> {
        self.optional_candidates
            .iter()
            .map(|s| s.subscription.nom_service.as_str())
            .collect()
    }
}
