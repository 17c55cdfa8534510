use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::shop_entity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateShopRequest {
    #[schema(example = "Riverside Books")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ObserveRequest {
    pub customer_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShopResponse {
    pub id: String,
    pub name: String,
    pub observer_ids: Vec<String>,
}

impl From<shop_entity::Model> for ShopResponse {
    fn from(m: shop_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            observer_ids: m.observer_ids.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShopDetailResponse {
    #[serde(flatten)]
    pub shop: ShopResponse,
    /// User id of the seller running the shop, if any.
    pub seller_user_id: Option<String>,
}

/// A link recorded on only one side of the customer/shop observer arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "missing_on", rename_all = "snake_case")]
pub enum ObserverMismatch {
    /// `shops.observer_ids` lists the customer, `customers.shop_ids` lacks the shop.
    Customer { customer_id: String, shop_id: String },
    /// `customers.shop_ids` lists the shop, `shops.observer_ids` lacks the customer.
    Shop { customer_id: String, shop_id: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ObserverAuditReport {
    pub mismatches: Vec<ObserverMismatch>,
    /// Ids referenced from an array that match no row.
    pub dangling: Vec<String>,
}

impl ObserverAuditReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty() && self.dangling.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ObserverRepairResponse {
    pub customers_updated: u64,
    pub shops_updated: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ObserverResponse {
    pub customer_id: String,
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}
