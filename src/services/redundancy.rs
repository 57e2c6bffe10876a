use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{analytics::CategoryRedundancy, subscription::Subscription};

/// Flags categories holding more than one active service.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedundancyDetector;

impl RedundancyDetector {
    pub fn detect(&self, subscriptions: &[Subscription], today: NaiveDate) -> Vec<CategoryRedundancy> {
        let mut by_category: BTreeMap<&str, Vec<&Subscription>> = BTreeMap::new();
        for subscription in subscriptions.iter().filter(|s| s.is_active(today)) {
            by_category
                .entry(subscription.categorie.trim())
                .or_default()
                .push(subscription);
        }

        by_category
            .into_iter()
            .filter(|(_, members)| members.len() > 1)
            .map(|(categorie, members)| {
                let mut services: Vec<String> = members.iter().map(|s| s.nom_service.clone()).collect();
                services.sort();
                CategoryRedundancy {
                    categorie: categorie.to_string(),
                    count: members.len(),
                    monthly_cost: members
                        .iter()
                        .fold(Decimal::ZERO, |acc, s| acc + s.monthly_cost()),
                    services,
                }
            })
            .collect()
    }
}
