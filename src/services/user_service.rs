use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::models::{User, WatchlistItem};
use crate::AppState;

pub async fn find_user(state: &AppState, user_id: ObjectId) -> Result<Option<User>, String> {
    let users = state.db.collection::<User>("users");

    users
        .find_one(doc! { "_id": user_id }, None)
        .await
        .map_err(|e| e.to_string())
}

/// Everyone who should receive the daily digest: any user with a
/// non-empty email address.
pub async fn list_digest_recipients(state: &AppState) -> Result<Vec<User>, String> {
    let users = state.db.collection::<User>("users");

    let mut cursor = users
        .find(doc! { "email": { "$exists": true, "$ne": "" } }, None)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<User> = Vec::new();
    while let Some(res) = cursor.next().await {
        let user = res.map_err(|e| e.to_string())?;
        if !user.email.trim().is_empty() {
            items.push(user);
        }
    }

    Ok(items)
}

/// Symbols on a user's watchlist, most recently added first. The order is
/// observable: it sets the round-robin order of digest article selection.
pub async fn watchlist_symbols(state: &AppState, user_id: ObjectId) -> Result<Vec<String>, String> {
    let watchlist = state.db.collection::<WatchlistItem>("watchlists");

    let find_opts = FindOptions::builder()
        .sort(doc! { "added_at": -1 })
        .build();

    let mut cursor = watchlist
        .find(doc! { "user_id": user_id }, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut symbols: Vec<String> = Vec::new();
    while let Some(res) = cursor.next().await {
        let item = res.map_err(|e| e.to_string())?;
        symbols.push(item.symbol);
    }

    Ok(symbols)
}
