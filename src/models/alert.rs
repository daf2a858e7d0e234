use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Which side of the target price fires the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Above,
    Below,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Above => "above",
            AlertKind::Below => "below",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,
    pub symbol: String,
    pub company: String,

    pub kind: AlertKind,
    pub target_price: f64,

    pub created_at: i64,

    // Flipped exactly once, by the evaluation engine, never back.
    pub triggered: bool,
    pub triggered_at: Option<i64>,
}
