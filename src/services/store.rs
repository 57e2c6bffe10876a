use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::EngineError;
use crate::models::subscription::Subscription;

#[derive(Clone)]
enum Backend {
    Memory(Arc<RwLock<Vec<Subscription>>>),
    File(Arc<RwLock<Vec<Subscription>>>),
    Upstream { client: Client, url: String },
}

/// Source of the subscription collection the engine works on.
#[derive(Clone)]
pub struct SubscriptionStore {
    backend: Backend,
}

impl SubscriptionStore {
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        if let Some(url) = &config.upstream_url {
            log::info!("Using upstream subscription store at {}", url);
            return Self::upstream(url, Duration::from_secs(config.upstream_timeout_secs));
        }

        if let Some(path) = &config.snapshot_file {
            return Self::from_file(path).await;
        }

        log::warn!("No subscription store configured, starting with an empty portfolio");
        Ok(Self::in_memory(Vec::new()))
    }

    pub fn in_memory(subscriptions: Vec<Subscription>) -> Self {
        Self {
            backend: Backend::Memory(Arc::new(RwLock::new(assign_missing_ids(subscriptions)))),
        }
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read subscription snapshot {}", path.display()))?;
        let subscriptions: Vec<Subscription> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid subscription snapshot {}", path.display()))?;

        log::info!("Loaded {} subscriptions from {}", subscriptions.len(), path.display());
        Ok(Self {
            backend: Backend::File(Arc::new(RwLock::new(assign_missing_ids(subscriptions)))),
        })
    }

    pub fn upstream(url: &str, timeout: Duration) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(anyhow!("Upstream subscription URL is empty"));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            backend: Backend::Upstream {
                client,
                url: url.to_string(),
            },
        })
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Memory(_) => "memory",
            Backend::File(_) => "file",
            Backend::Upstream { .. } => "upstream",
        }
    }

    /// Current snapshot of every subscription visible to the caller.
    ///
    /// Upstream failures are reported as-is; nothing is cached or served stale.
    pub async fn fetch_all(&self) -> Result<Vec<Subscription>, EngineError> {
        match &self.backend {
            Backend::Memory(subscriptions) | Backend::File(subscriptions) => {
                Ok(subscriptions.read().await.clone())
            }
            Backend::Upstream { client, url } => fetch_upstream(client, url)
                .await
                .map(assign_missing_ids)
                .map_err(EngineError::UpstreamUnavailable),
        }
    }
}

async fn fetch_upstream(client: &Client, url: &str) -> Result<Vec<Subscription>> {
    let response = client
        .get(url)
        .header("accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        log::warn!("Upstream store answered {}: {}", status, error_text);
        return Err(anyhow!("Upstream store answered {}", status));
    }

    let subscriptions: Vec<Subscription> = response.json().await?;
    log::debug!("Fetched {} subscriptions from upstream", subscriptions.len());
    Ok(subscriptions)
}

/// Gives id-less records an id derived from their content and position, so the same
/// snapshot always yields the same ids.
fn assign_missing_ids(mut subscriptions: Vec<Subscription>) -> Vec<Subscription> {
    for (position, subscription) in subscriptions.iter_mut().enumerate() {
        if subscription.id.trim().is_empty() {
            subscription.id = derived_id(subscription, position).to_string();
        }
    }
    subscriptions
}

fn derived_id(subscription: &Subscription, position: usize) -> Uuid {
    let key = format!(
        "{}|{}|{}|{}|{}",
        subscription.nom_service, subscription.client_name, subscription.date_debut, subscription.date_fin, position
    );
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}
