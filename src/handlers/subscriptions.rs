use actix_web::web::Data;
use actix_web::{get, HttpResponse};

use crate::error::EngineError;
use crate::services::store::SubscriptionStore;

#[get("/abonnements")]
pub async fn list_subscriptions(store: Data<SubscriptionStore>) -> Result<HttpResponse, EngineError> {
    let subscriptions = store.fetch_all().await?;
    Ok(HttpResponse::Ok().json(subscriptions))
}
