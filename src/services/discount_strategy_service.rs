use sea_orm::{ColumnTrait, Condition, Order, Set};

use crate::client::{AggregateArgs, Client, Delegates, FindArgs, GroupByArgs};
use crate::entities::{DiscountType, book_entity as books, discount_strategy_entity as strategies};
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct DiscountStrategyService {
    client: Client,
}

/// Checks that `amount`/`percent` are populated the way `type` requires.
///
/// The strategies are only stored and described here; no price is ever
/// computed from them.
pub fn validate_shape(request: &DiscountStrategyRequest) -> AppResult<()> {
    let invalid = |msg: &str| Err(AppError::ValidationError(msg.to_string()));
    match (request.strategy_type, request.amount, request.percent) {
        (DiscountType::None, None, None) => Ok(()),
        (DiscountType::None, _, _) => invalid("A 'none' strategy takes neither amount nor percent"),
        (DiscountType::Fixed, Some(amount), None) => {
            if amount.is_finite() && amount >= 0.0 {
                Ok(())
            } else {
                invalid("Fixed amount must be a finite number >= 0")
            }
        }
        (DiscountType::Fixed, _, _) => invalid("A 'fixed' strategy needs an amount and no percent"),
        (DiscountType::Percentage, None, Some(percent)) => {
            if percent.is_finite() && percent > 0.0 && percent <= 100.0 {
                Ok(())
            } else {
                invalid("Percent must be greater than 0 and at most 100")
            }
        }
        (DiscountType::Percentage, _, _) => {
            invalid("A 'percentage' strategy needs a percent and no amount")
        }
    }
}

fn overall_args() -> AggregateArgs<strategies::Entity> {
    AggregateArgs::new()
        .count()
        .avg(strategies::Column::Amount)
        .avg(strategies::Column::Percent)
        .min(strategies::Column::Amount)
        .max(strategies::Column::Amount)
        .min(strategies::Column::Percent)
        .max(strategies::Column::Percent)
}

impl DiscountStrategyService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn create_strategy(
        &self,
        request: DiscountStrategyRequest,
    ) -> AppResult<DiscountStrategyResponse> {
        validate_shape(&request)?;
        let strategy = self
            .client
            .discount_strategies()
            .create(strategies::ActiveModel {
                strategy_type: Set(request.strategy_type),
                amount: Set(request.amount),
                percent: Set(request.percent),
                ..Default::default()
            })
            .await?;
        log::info!("Discount strategy {} ({}) created", strategy.id, strategy.strategy_type);
        Ok(strategy.into())
    }

    /// Replaces the type and values of a strategy.
    pub async fn update_strategy(
        &self,
        strategy_id: &str,
        request: DiscountStrategyRequest,
    ) -> AppResult<DiscountStrategyResponse> {
        validate_shape(&request)?;
        let strategy = self
            .client
            .discount_strategies()
            .update(
                strategy_id,
                strategies::ActiveModel {
                    strategy_type: Set(request.strategy_type),
                    amount: Set(request.amount),
                    percent: Set(request.percent),
                    ..Default::default()
                },
            )
            .await?;
        log::info!("Discount strategy {strategy_id} updated");
        Ok(strategy.into())
    }

    pub async fn get_strategy(&self, strategy_id: &str) -> AppResult<DiscountStrategyResponse> {
        Ok(self
            .client
            .discount_strategies()
            .find_unique_or_throw(strategy_id)
            .await?
            .into())
    }

    pub async fn list_strategies(
        &self,
        strategy_type: Option<DiscountType>,
    ) -> AppResult<Vec<DiscountStrategyResponse>> {
        let mut filter = Condition::all();
        if let Some(t) = strategy_type {
            filter = filter.add(strategies::Column::StrategyType.eq(t));
        }
        let rows = self
            .client
            .discount_strategies()
            .find_many(
                FindArgs::new()
                    .filter(filter)
                    .order_by(strategies::Column::StrategyType, Order::Asc)
                    .order_by(strategies::Column::Id, Order::Asc),
            )
            .await?;
        Ok(rows.into_iter().map(DiscountStrategyResponse::from).collect())
    }

    /// Deletes a strategy no book references.
    pub async fn delete_strategy(&self, strategy_id: &str) -> AppResult<DiscountStrategyResponse> {
        let in_use = self
            .client
            .books()
            .count(Condition::all().add(books::Column::DiscountStrategyId.eq(strategy_id)))
            .await?;
        if in_use > 0 {
            return Err(AppError::Conflict(format!(
                "Discount strategy {strategy_id} is used by {in_use} books"
            )));
        }
        let deleted = self.client.discount_strategies().delete(strategy_id).await?;
        log::info!("Discount strategy {strategy_id} deleted");
        Ok(deleted.into())
    }

    pub async fn stats(&self) -> AppResult<DiscountStrategyStats> {
        let overall = self
            .client
            .discount_strategies()
            .aggregate(overall_args())
            .await?;
        let by_type = self
            .client
            .discount_strategies()
            .group_by(
                GroupByArgs::new(vec![strategies::Column::StrategyType])
                    .aggregates(
                        AggregateArgs::new()
                            .count()
                            .avg(strategies::Column::Amount)
                            .avg(strategies::Column::Percent),
                    )
                    .order_by(strategies::Column::StrategyType, Order::Asc),
            )
            .await?;
        Ok(DiscountStrategyStats { overall, by_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn req(t: DiscountType, amount: Option<f64>, percent: Option<f64>) -> DiscountStrategyRequest {
        DiscountStrategyRequest {
            strategy_type: t,
            amount,
            percent,
        }
    }

    #[test]
    fn test_validate_shape() {
        assert!(validate_shape(&req(DiscountType::None, None, None)).is_ok());
        assert!(validate_shape(&req(DiscountType::None, Some(1.0), None)).is_err());
        assert!(validate_shape(&req(DiscountType::Fixed, Some(0.0), None)).is_ok());
        assert!(validate_shape(&req(DiscountType::Fixed, Some(-1.0), None)).is_err());
        assert!(validate_shape(&req(DiscountType::Fixed, Some(5.0), Some(10.0))).is_err());
        assert!(validate_shape(&req(DiscountType::Fixed, Some(f64::NAN), None)).is_err());
        assert!(validate_shape(&req(DiscountType::Percentage, None, Some(100.0))).is_ok());
        assert!(validate_shape(&req(DiscountType::Percentage, None, Some(0.0))).is_err());
        assert!(validate_shape(&req(DiscountType::Percentage, None, Some(100.5))).is_err());
        assert!(validate_shape(&req(DiscountType::Percentage, Some(3.0), Some(10.0))).is_err());
    }

    #[tokio::test]
    async fn test_create_invalid_shape_runs_no_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let client = Client::new(db);
        let service = DiscountStrategyService::new(client.clone());

        let err = service
            .create_strategy(req(DiscountType::Percentage, None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(client.take_log().is_empty());
    }

    #[tokio::test]
    async fn test_delete_strategy_in_use_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(4)))])]])
            .into_connection();
        let service = DiscountStrategyService::new(Client::new(db));

        let err = service.delete_strategy("d1").await.unwrap_err();
        match err {
            AppError::Conflict(msg) => assert!(msg.contains("4 books")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stats_combines_aggregate_and_groups() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([
                ("_count", Value::BigInt(Some(3))),
                ("_avg__amount", Value::Double(Some(5.0))),
                ("_avg__percent", Value::Double(Some(20.0))),
            ])]])
            .append_query_results([[
                BTreeMap::from([
                    ("type", Value::String(Some(Box::new("fixed".to_string())))),
                    ("_count", Value::BigInt(Some(1))),
                ]),
                BTreeMap::from([
                    ("type", Value::String(Some(Box::new("percentage".to_string())))),
                    ("_count", Value::BigInt(Some(2))),
                ]),
            ]])
            .into_connection();
        let service = DiscountStrategyService::new(Client::new(db));

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.overall.count, Some(3));
        assert_eq!(stats.by_type.len(), 2);
        assert_eq!(stats.by_type[1].key_str("type"), Some("percentage"));
    }
}
