use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::notification_entity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotifyRequest {
    pub customer_id: String,
    #[schema(example = "A shop you follow added a new book")]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NotificationQuery {
    pub customer_id: String,
    #[serde(default)]
    pub unread_only: bool,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct CustomerQuery {
    pub customer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: String,
    pub content: String,
    /// true once read
    pub status: bool,
    pub timestamp: DateTime<Utc>,
    pub customer_id: String,
}

impl From<notification_entity::Model> for NotificationResponse {
    fn from(m: notification_entity::Model) -> Self {
        Self {
            id: m.id,
            content: m.content,
            status: m.status,
            timestamp: m.timestamp,
            customer_id: m.customer_id,
        }
    }
}
