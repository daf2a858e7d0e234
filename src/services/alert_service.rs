use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::models::{Alert, AlertKind};
use crate::AppState;

/// Create a new pending alert for a user.
///
/// At most one untriggered alert may exist per (user, symbol); this is
/// enforced with a pre-check before the insert, so a race between two
/// concurrent creations can still slip through (accepted, see DESIGN.md).
pub async fn create_alert(
    state: &AppState,
    user_id: ObjectId,
    symbol: &str,
    company: &str,
    kind: AlertKind,
    target_price: f64,
) -> Result<Alert, String> {
    if !target_price.is_finite() || target_price <= 0.0 {
        return Err("Target price must be a positive number.".to_string());
    }

    let sym = symbol.trim().to_uppercase();
    if sym.is_empty() {
        return Err("Symbol must not be empty.".to_string());
    }

    let alerts = state.db.collection::<Alert>("alerts");

    let existing = alerts
        .find_one(doc! { "user_id": user_id, "symbol": &sym, "triggered": false }, None)
        .await
        .map_err(|e| e.to_string())?;

    if existing.is_some() {
        return Err("You already have an active alert for this stock.".to_string());
    }

    let alert = Alert {
        id: ObjectId::new(),
        user_id,
        symbol: sym,
        company: company.trim().to_string(),
        kind,
        target_price,
        created_at: Utc::now().timestamp(),
        triggered: false,
        triggered_at: None,
    };

    alerts
        .insert_one(&alert, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(alert)
}

pub async fn list_user_alerts(state: &AppState, user_id: ObjectId) -> Result<Vec<Alert>, String> {
    let alerts = state.db.collection::<Alert>("alerts");

    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = alerts
        .find(doc! { "user_id": user_id }, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<Alert> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

pub async fn delete_alert(
    state: &AppState,
    user_id: ObjectId,
    alert_id: ObjectId,
) -> Result<(), String> {
    let alerts = state.db.collection::<Alert>("alerts");

    alerts
        .delete_one(doc! { "_id": alert_id, "user_id": user_id }, None)
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

/// All alerts still waiting on their crossing condition.
pub async fn find_pending(state: &AppState) -> Result<Vec<Alert>, String> {
    let alerts = state.db.collection::<Alert>("alerts");

    let mut cursor = alerts
        .find(doc! { "triggered": false }, None)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<Alert> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

/// Conditionally mark an alert triggered. The filter requires the record
/// to still be pending, so exactly one of any number of concurrent callers
/// observes `true`; that caller owns the notification.
pub async fn try_mark_triggered(state: &AppState, alert_id: ObjectId) -> Result<bool, String> {
    let alerts = state.db.collection::<Alert>("alerts");
    let now = Utc::now().timestamp();

    let res = alerts
        .update_one(
            doc! { "_id": alert_id, "triggered": false },
            doc! { "$set": { "triggered": true, "triggered_at": now } },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

    Ok(res.matched_count > 0)
}
