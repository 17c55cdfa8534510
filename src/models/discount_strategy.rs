use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::client::{Aggregates, GroupRow};
use crate::entities::{DiscountType, discount_strategy_entity};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DiscountStrategyRequest {
    #[serde(rename = "type")]
    pub strategy_type: DiscountType,
    pub amount: Option<f64>,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiscountStrategyResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub strategy_type: DiscountType,
    pub amount: Option<f64>,
    pub percent: Option<f64>,
}

impl From<discount_strategy_entity::Model> for DiscountStrategyResponse {
    fn from(m: discount_strategy_entity::Model) -> Self {
        Self {
            id: m.id,
            strategy_type: m.strategy_type,
            amount: m.amount,
            percent: m.percent,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DiscountStrategyStats {
    /// Totals over every strategy.
    pub overall: Aggregates,
    /// One row per strategy type.
    pub by_type: Vec<GroupRow>,
}

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct DiscountStrategyQuery {
    #[serde(rename = "type")]
    pub strategy_type: Option<DiscountType>,
}
