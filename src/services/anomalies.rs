use rust_decimal::prelude::ToPrimitive;

use crate::config::EngineConfig;
use crate::models::{analytics::PriceAnomaly, subscription::Subscription};
use crate::services::scoring::round2;

/// Below this many subscriptions the spread of prices says nothing.
const MIN_SAMPLE: usize = 3;

/// Flags subscriptions whose monthly cost exceeds `mean + sigma * stddev` of the portfolio.
///
/// Uses the population standard deviation over every subscription, active or not.
#[derive(Debug, Clone, Copy)]
pub struct PriceAnomalyDetector {
    sigma: f64,
}

impl PriceAnomalyDetector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sigma: config.anomaly_sigma,
        }
    }

    pub fn detect(&self, subscriptions: &[Subscription]) -> Vec<PriceAnomaly> {
        if subscriptions.len() < MIN_SAMPLE {
            return Vec::new();
        }

        let prices: Vec<f64> = subscriptions
            .iter()
            .map(|s| s.monthly_cost().to_f64().unwrap_or(0.0))
            .collect();
        let count = prices.len() as f64;
        let mean = prices.iter().sum::<f64>() / count;
        let variance = prices.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / count;
        let threshold = mean + self.sigma * variance.sqrt();

        subscriptions
            .iter()
            .zip(prices)
            .filter(|(_, price)| *price > threshold)
            .map(|(subscription, _)| PriceAnomaly {
                id: subscription.id.clone(),
                nom_service: subscription.nom_service.clone(),
                prix: subscription.monthly_cost(),
                threshold: round2(threshold),
                message: "Price is abnormally high".to_string(),
            })
            .collect()
    }
}
