use crate::config::EngineConfig;
use crate::services::{
    anomalies::PriceAnomalyDetector, budget::BudgetPlanner, metrics::MetricsCalculator,
    recommendations::RecommendationBuilder, redundancy::RedundancyDetector, report::MonthlyReporter,
};

/// Stateless analytics components shared by every request.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine {
    pub recommendations: RecommendationBuilder,
    pub planner: BudgetPlanner,
    pub redundancy: RedundancyDetector,
    pub anomalies: PriceAnomalyDetector,
    pub metrics: MetricsCalculator,
    pub report: MonthlyReporter,
}

impl AnalyticsEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            recommendations: RecommendationBuilder::new(config),
            planner: BudgetPlanner::new(config),
            redundancy: RedundancyDetector,
            anomalies: PriceAnomalyDetector::new(config),
            metrics: MetricsCalculator::new(config),
            report: MonthlyReporter::new(config),
        }
    }
}
