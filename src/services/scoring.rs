use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

use crate::config::EngineConfig;
use crate::models::subscription::{AnnotatedSubscription, Subscription};

/// Churn risk in `0..=100` from usage recency and proximity to expiry.
///
/// `risk = min(100, round(recency + expiry))` where
/// - `recency = min(weight, days_since_last_use / window * weight)`, or the full weight when
///   usage was never recorded;
/// - `expiry = expired_penalty` once the commitment has ended (or the term is inverted),
///   `(window - days_left) / window * expiry_weight` inside the expiry window, else `0`.
///
/// Price plays no part in risk.
#[derive(Debug, Clone, Copy)]
pub struct RiskScorer {
    recency_window_days: f64,
    recency_weight: f64,
    expiry_window_days: i64,
    expiry_weight: f64,
    expired_penalty: f64,
}

/// Cost-adjusted utility: `recency_factor * utility_points - monthly_cost`.
///
/// `recency_factor = 1 / (1 + days_since_last_use / window)`, or the fixed never-used factor
/// when usage was never recorded. Rounded to two decimals.
#[derive(Debug, Clone, Copy)]
pub struct ValueScorer {
    recency_window_days: f64,
    never_used_recency_factor: f64,
    utility_points: f64,
}

/// Runs both scorers over a portfolio snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Annotator {
    risk: RiskScorer,
    value: ValueScorer,
}

impl RiskScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            recency_window_days: config.recency_window_days as f64,
            recency_weight: config.recency_weight,
            expiry_window_days: config.expiry_window_days,
            expiry_weight: config.expiry_weight,
            expired_penalty: config.expired_penalty,
        }
    }

    pub fn score(&self, subscription: &Subscription, today: NaiveDate) -> u8 {
        let recency = match subscription.days_since_last_use(today) {
            Some(days) => (days as f64 / self.recency_window_days * self.recency_weight).min(self.recency_weight),
            None => self.recency_weight,
        };

        let days_left = subscription.days_until_expiry(today);
        let expiry = if !subscription.has_valid_term() || days_left < 0 {
            self.expired_penalty
        } else if days_left < self.expiry_window_days {
            let window = self.expiry_window_days as f64;
            (window - days_left as f64) / window * self.expiry_weight
        } else {
            0.0
        };

        (recency + expiry).round().clamp(0.0, 100.0) as u8
    }
}

impl ValueScorer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            recency_window_days: config.recency_window_days as f64,
            never_used_recency_factor: config.never_used_recency_factor,
            utility_points: config.utility_points,
        }
    }

    pub fn score(&self, subscription: &Subscription, today: NaiveDate) -> f64 {
        let recency_factor = match subscription.days_since_last_use(today) {
            Some(days) => 1.0 / (1.0 + days as f64 / self.recency_window_days),
            None => self.never_used_recency_factor,
        };
        let cost = subscription.monthly_cost().to_f64().unwrap_or(0.0);

        round2(recency_factor * self.utility_points - cost)
    }
}

impl Annotator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            risk: RiskScorer::new(config),
            value: ValueScorer::new(config),
        }
    }

    pub fn annotate(&self, subscription: &Subscription, today: NaiveDate) -> AnnotatedSubscription {
        AnnotatedSubscription {
            subscription: subscription.clone(),
            churn_risk: self.risk.score(subscription, today),
            value_score: self.value.score(subscription, today),
            days_until_expiry: subscription.days_until_expiry(today),
            days_since_last_use: subscription.days_since_last_use(today),
        }
    }

    pub fn annotate_all(&self, subscriptions: &[Subscription], today: NaiveDate) -> Vec<AnnotatedSubscription> {
        subscriptions
            .iter()
            .map(|s| self.annotate(s, today))
            .collect()
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
