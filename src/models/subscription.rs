use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A subscription record as held by the external store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nom_service: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_name: String,
    pub prix_mensuel: Decimal,
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    #[serde(default)]
    pub derniere_utilisation: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categorie: String,
}

/// Stores serialize unset text fields as `null`; read them as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A subscription enriched with the engine's scores for a given reference date.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedSubscription {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub churn_risk: u8,
    pub value_score: f64,
    pub days_until_expiry: i64,
    pub days_since_last_use: Option<i64>,
}

impl Subscription {
    /// Monthly cost used in all money arithmetic. Negative prices count as free.
    pub fn monthly_cost(&self) -> Decimal {
        self.prix_mensuel.max(Decimal::ZERO)
    }

    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        self.date_fin.signed_duration_since(today).num_days()
    }

    /// Whole days since last use, `None` when usage was never recorded.
    /// A last-use date after `today` counts as used today.
    pub fn days_since_last_use(&self, today: NaiveDate) -> Option<i64> {
        self.derniere_utilisation
            .map(|used| today.signed_duration_since(used).num_days().max(0))
    }

    /// `false` when the commitment ends before it starts.
    pub fn has_valid_term(&self) -> bool {
        self.date_debut <= self.date_fin
    }

    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.has_valid_term() && self.date_debut <= today && today <= self.date_fin
    }

    /// Whole calendar months billed between `dateDebut` and `today`, capped at `dateFin`.
    pub fn months_elapsed(&self, today: NaiveDate) -> i64 {
        let end = today.min(self.date_fin);
        if end <= self.date_debut {
            return 0;
        }

        let mut months = (end.year() - self.date_debut.year()) as i64 * 12
            + end.month() as i64
            - self.date_debut.month() as i64;
        if end.day() < self.date_debut.day() {
            months -= 1;
        }
        months.max(0)
    }

    /// Amount paid so far: elapsed months times the monthly cost.
    pub fn total_paid(&self, today: NaiveDate) -> Decimal {
        Decimal::from(self.months_elapsed(today)) * self.monthly_cost()
    }
}

impl AnnotatedSubscription {
    pub fn id(&self) -> &str {
        &self.subscription.id
    }

    pub fn monthly_cost(&self) -> Decimal {
        self.subscription.monthly_cost()
    }
}
