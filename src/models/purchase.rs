use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::transaction_entity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    pub customer_id: String,
    pub book_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PurchaseResponse {
    pub id: String,
    pub book_id: String,
    pub customer_id: String,
}

impl From<transaction_entity::Model> for PurchaseResponse {
    fn from(m: transaction_entity::Model) -> Self {
        Self {
            id: m.id,
            book_id: m.book_id,
            customer_id: m.customer_id,
        }
    }
}

/// Exactly one of the two ids must be given.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct PurchaseQuery {
    pub customer_id: Option<String>,
    pub book_id: Option<String>,
}
