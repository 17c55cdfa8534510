use std::collections::HashMap;

use sea_orm::{ColumnTrait, Condition, Order, Set};

use crate::client::{Client, Delegates, FindArgs};
use crate::entities::{
    customer_entity as customers, seller_entity as sellers, shop_entity as shops,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct ShopService {
    client: Client,
}

/// Compares `shops.observer_ids` against `customers.shop_ids`.
pub fn audit_observer_links(
    all_shops: &[shops::Model],
    all_customers: &[customers::Model],
) -> ObserverAuditReport {
    let shop_index: HashMap<&str, &shops::Model> =
        all_shops.iter().map(|s| (s.id.as_str(), s)).collect();
    let customer_index: HashMap<&str, &customers::Model> =
        all_customers.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut report = ObserverAuditReport::default();

    for shop in all_shops {
        for customer_id in shop.observer_ids.iter() {
            match customer_index.get(customer_id.as_str()) {
                None => report
                    .dangling
                    .push(format!("customer {customer_id} observing shop {}", shop.id)),
                Some(customer) if !customer.shop_ids.contains(&shop.id) => {
                    report.mismatches.push(ObserverMismatch::Customer {
                        customer_id: customer_id.clone(),
                        shop_id: shop.id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    for customer in all_customers {
        for shop_id in customer.shop_ids.iter() {
            match shop_index.get(shop_id.as_str()) {
                None => report
                    .dangling
                    .push(format!("shop {shop_id} observed by customer {}", customer.id)),
                Some(shop) if !shop.observer_ids.contains(&customer.id) => {
                    report.mismatches.push(ObserverMismatch::Shop {
                        customer_id: customer.id.clone(),
                        shop_id: shop_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    report
}

/// Rows whose observer arrays must change so both sides agree.
///
/// One-sided links are completed; ids pointing at missing rows are dropped.
pub fn plan_observer_repair(
    all_shops: &[shops::Model],
    all_customers: &[customers::Model],
) -> (Vec<shops::Model>, Vec<customers::Model>) {
    let mut shop_fix: HashMap<String, shops::Model> = all_shops
        .iter()
        .map(|s| (s.id.clone(), s.clone()))
        .collect();
    let mut customer_fix: HashMap<String, customers::Model> = all_customers
        .iter()
        .map(|c| (c.id.clone(), c.clone()))
        .collect();

    for shop in all_shops {
        for customer_id in shop.observer_ids.iter() {
            match customer_fix.get_mut(customer_id) {
                Some(customer) => {
                    customer.shop_ids.insert(&shop.id);
                }
                None => {
                    if let Some(s) = shop_fix.get_mut(&shop.id) {
                        s.observer_ids.remove(customer_id);
                    }
                }
            }
        }
    }
    for customer in all_customers {
        for shop_id in customer.shop_ids.iter() {
            match shop_fix.get_mut(shop_id) {
                Some(shop) => {
                    shop.observer_ids.insert(&customer.id);
                }
                None => {
                    if let Some(c) = customer_fix.get_mut(&customer.id) {
                        c.shop_ids.remove(shop_id);
                    }
                }
            }
        }
    }

    let changed_shops = all_shops
        .iter()
        .filter_map(|s| shop_fix.remove(&s.id).filter(|fixed| fixed != s))
        .collect();
    let changed_customers = all_customers
        .iter()
        .filter_map(|c| customer_fix.remove(&c.id).filter(|fixed| fixed != c))
        .collect();
    (changed_shops, changed_customers)
}

async fn set_observation<D: Delegates>(
    db: &D,
    shop_id: &str,
    customer_id: &str,
    observe: bool,
) -> AppResult<shops::Model> {
    // Customer before shop, the same order user deletion locks them in.
    let customer = db.customers().lock_unique(customer_id).await?;
    let shop = db.shops().lock_unique(shop_id).await?;

    let mut shop_ids = customer.shop_ids;
    let customer_changed = if observe {
        shop_ids.insert(shop_id)
    } else {
        shop_ids.remove(shop_id)
    };
    if customer_changed {
        db.customers()
            .update(
                customer_id,
                customers::ActiveModel {
                    shop_ids: Set(shop_ids),
                    ..Default::default()
                },
            )
            .await?;
    }

    let mut observer_ids = shop.observer_ids.clone();
    let shop_changed = if observe {
        observer_ids.insert(customer_id)
    } else {
        observer_ids.remove(customer_id)
    };
    if !shop_changed {
        return Ok(shop);
    }
    db.shops()
        .update(
            shop_id,
            shops::ActiveModel {
                observer_ids: Set(observer_ids),
                ..Default::default()
            },
        )
        .await
}

async fn repair_in<D: Delegates>(db: &D) -> AppResult<ObserverRepairResponse> {
    let all_shops = db.shops().find_many(FindArgs::new()).await?;
    let all_customers = db.customers().find_many(FindArgs::new()).await?;
    let (changed_shops, changed_customers) = plan_observer_repair(&all_shops, &all_customers);

    for shop in &changed_shops {
        db.shops()
            .update(
                &shop.id,
                shops::ActiveModel {
                    observer_ids: Set(shop.observer_ids.clone()),
                    ..Default::default()
                },
            )
            .await?;
    }
    for customer in &changed_customers {
        db.customers()
            .update(
                &customer.id,
                customers::ActiveModel {
                    shop_ids: Set(customer.shop_ids.clone()),
                    ..Default::default()
                },
            )
            .await?;
    }

    Ok(ObserverRepairResponse {
        customers_updated: changed_customers.len() as u64,
        shops_updated: changed_shops.len() as u64,
    })
}

fn detail(shop: shops::Model, seller: Option<sellers::Model>) -> ShopDetailResponse {
    ShopDetailResponse {
        shop: shop.into(),
        seller_user_id: seller.map(|s| s.user_id),
    }
}

impl ShopService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn create_shop(&self, request: CreateShopRequest) -> AppResult<ShopResponse> {
        let name = request.name.trim();
        if name.is_empty() || name.chars().count() > 200 {
            return Err(AppError::ValidationError(
                "Shop name must be between 1 and 200 characters".to_string(),
            ));
        }
        let shop = self
            .client
            .shops()
            .create(shops::ActiveModel {
                name: Set(name.to_string()),
                observer_ids: Set(Default::default()),
                ..Default::default()
            })
            .await?;
        log::info!("Shop {} created", shop.id);
        Ok(shop.into())
    }

    pub async fn get_shop(&self, shop_id: &str) -> AppResult<ShopDetailResponse> {
        let (shop, seller) = self
            .client
            .shops()
            .find_unique_with_related::<sellers::Entity>(shop_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Shop {shop_id} not found")))?;
        Ok(detail(shop, seller))
    }

    pub async fn list_shops(
        &self,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<ShopDetailResponse>> {
        let total = self.client.shops().count(Condition::all()).await?;
        let rows = self
            .client
            .shops()
            .find_many_with_one::<sellers::Entity>(
                FindArgs::new()
                    .order_by(shops::Column::Name, Order::Asc)
                    .skip(params.get_offset())
                    .take(params.get_limit()),
            )
            .await?;
        Ok(PaginatedResponse::new(
            rows.into_iter().map(|(shop, seller)| detail(shop, seller)).collect(),
            params,
            total,
        ))
    }

    /// Records that `customer_id` observes `shop_id` on both sides. Idempotent.
    pub async fn observe(&self, shop_id: &str, customer_id: &str) -> AppResult<ShopResponse> {
        let (shop, customer) = (shop_id.to_string(), customer_id.to_string());
        let updated = self
            .client
            .transaction(move |tx| {
                Box::pin(async move { set_observation(&tx, &shop, &customer, true).await })
            })
            .await?;
        log::info!("Customer {customer_id} observes shop {shop_id}");
        Ok(updated.into())
    }

    /// Removes the observation from both sides. Idempotent.
    pub async fn unobserve(&self, shop_id: &str, customer_id: &str) -> AppResult<ShopResponse> {
        let (shop, customer) = (shop_id.to_string(), customer_id.to_string());
        let updated = self
            .client
            .transaction(move |tx| {
                Box::pin(async move { set_observation(&tx, &shop, &customer, false).await })
            })
            .await?;
        log::info!("Customer {customer_id} no longer observes shop {shop_id}");
        Ok(updated.into())
    }

    pub async fn list_observers(&self, shop_id: &str) -> AppResult<Vec<ObserverResponse>> {
        let shop = self.client.shops().find_unique_or_throw(shop_id).await?;
        if shop.observer_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self
            .client
            .customers()
            .find_many_with_one::<users::Entity>(
                FindArgs::new()
                    .filter(Condition::all().add(customers::Column::Id.is_in(shop.observer_ids.0))),
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|(customer, user)| ObserverResponse {
                customer_id: customer.id,
                user_id: customer.user_id,
                name: user.as_ref().map(|u| u.name.clone()),
                email: user.map(|u| u.email),
            })
            .collect())
    }

    pub async fn audit_observers(&self) -> AppResult<ObserverAuditReport> {
        let all_shops = self.client.shops().find_many(FindArgs::new()).await?;
        let all_customers = self.client.customers().find_many(FindArgs::new()).await?;
        let report = audit_observer_links(&all_shops, &all_customers);
        if !report.is_consistent() {
            log::warn!(
                "Observer audit found {} mismatches and {} dangling ids",
                report.mismatches.len(),
                report.dangling.len()
            );
        }
        Ok(report)
    }

    pub async fn repair_observers(&self) -> AppResult<ObserverRepairResponse> {
        let result = self
            .client
            .transaction_serializable(|tx| Box::pin(async move { repair_in(&tx).await }))
            .await?;
        log::info!(
            "Observer repair updated {} shops and {} customers",
            result.shops_updated,
            result.customers_updated
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StringList;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn shop(id: &str, observers: &[&str]) -> shops::Model {
        shops::Model {
            id: id.to_string(),
            name: format!("Shop {id}"),
            observer_ids: StringList(observers.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn customer(id: &str, shop_ids: &[&str]) -> customers::Model {
        customers::Model {
            id: id.to_string(),
            user_id: format!("user-{id}"),
            shop_ids: StringList(shop_ids.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_audit_consistent_links() {
        let report = audit_observer_links(&[shop("s1", &["c1"])], &[customer("c1", &["s1"])]);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_audit_reports_both_directions_and_dangling() {
        let shops = [shop("s1", &["c1", "ghost"]), shop("s2", &[])];
        let customers = [customer("c1", &["s2"])];

        let report = audit_observer_links(&shops, &customers);
        assert!(report.mismatches.contains(&ObserverMismatch::Customer {
            customer_id: "c1".into(),
            shop_id: "s1".into(),
        }));
        assert!(report.mismatches.contains(&ObserverMismatch::Shop {
            customer_id: "c1".into(),
            shop_id: "s2".into(),
        }));
        assert_eq!(report.dangling.len(), 1);
        assert!(report.dangling[0].contains("ghost"));
    }

    #[test]
    fn test_repair_plan_takes_union_and_drops_dangling() {
        let shops = [shop("s1", &["c1", "ghost"]), shop("s2", &[]), shop("s3", &["c2"])];
        let customers = [customer("c1", &["s2"]), customer("c2", &["s3"])];

        let (changed_shops, changed_customers) = plan_observer_repair(&shops, &customers);

        assert_eq!(changed_shops.len(), 2);
        let s1 = changed_shops.iter().find(|s| s.id == "s1").unwrap();
        assert_eq!(s1.observer_ids, StringList(vec!["c1".into()]));
        let s2 = changed_shops.iter().find(|s| s.id == "s2").unwrap();
        assert_eq!(s2.observer_ids, StringList(vec!["c1".into()]));

        assert_eq!(changed_customers.len(), 1);
        assert_eq!(
            changed_customers[0].shop_ids,
            StringList(vec!["s2".into(), "s1".into()])
        );
        assert!(audit_observer_links(
            &[
                s1.clone(),
                s2.clone(),
                shops[2].clone()
            ],
            &[changed_customers[0].clone(), customers[1].clone()]
        )
        .is_consistent());
    }

    #[tokio::test]
    async fn test_observe_is_idempotent_when_already_linked() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer("c1", &["s1"])]])
            .append_query_results([vec![shop("s1", &["c1"])]])
            .into_connection();
        let client = Client::new(db);
        let service = ShopService::new(client.clone());

        let updated = service.observe("s1", "c1").await.unwrap();
        assert_eq!(updated.observer_ids, vec!["c1".to_string()]);

        let sql = client.take_sql();
        assert!(sql.iter().all(|s| !s.starts_with("UPDATE")));
    }

    #[tokio::test]
    async fn test_observe_locks_both_rows_and_updates_both_sides() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer("c1", &[])]])
            .append_query_results([vec![shop("s1", &[])]])
            .append_query_results([vec![customer("c1", &["s1"])]])
            .append_query_results([vec![shop("s1", &["c1"])]])
            .into_connection();
        let client = Client::new(db);
        let service = ShopService::new(client.clone());

        let updated = service.observe("s1", "c1").await.unwrap();
        assert_eq!(updated.observer_ids, vec!["c1".to_string()]);

        let sql = client.take_sql();
        let selects: Vec<_> = sql.iter().filter(|s| s.starts_with("SELECT")).collect();
        assert_eq!(selects.len(), 2);
        assert!(selects[0].contains(r#"FROM "customers""#) && selects[0].ends_with("FOR UPDATE"));
        assert!(selects[1].contains(r#"FROM "shops""#) && selects[1].ends_with("FOR UPDATE"));
        assert!(sql.iter().any(|s| s.starts_with(r#"UPDATE "customers""#)));
        assert!(sql.iter().any(|s| s.starts_with(r#"UPDATE "shops""#)));
        assert_eq!(sql.last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_unobserve_removes_both_sides() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer("c1", &["s1", "s2"])]])
            .append_query_results([vec![shop("s1", &["c1", "c2"])]])
            .append_query_results([vec![customer("c1", &["s2"])]])
            .append_query_results([vec![shop("s1", &["c2"])]])
            .into_connection();
        let client = Client::new(db);
        let service = ShopService::new(client.clone());

        let updated = service.unobserve("s1", "c1").await.unwrap();
        assert_eq!(updated.observer_ids, vec!["c2".to_string()]);

        let sql = client.take_sql();
        assert_eq!(sql.iter().filter(|s| s.starts_with("UPDATE")).count(), 2);
    }

    #[tokio::test]
    async fn test_unobserve_when_not_linked_writes_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![customer("c1", &[])]])
            .append_query_results([vec![shop("s1", &["c2"])]])
            .into_connection();
        let client = Client::new(db);
        let service = ShopService::new(client.clone());

        let unchanged = service.unobserve("s1", "c1").await.unwrap();
        assert_eq!(unchanged.observer_ids, vec!["c2".to_string()]);
        assert!(client.take_sql().iter().all(|s| !s.starts_with("UPDATE")));
    }

    #[tokio::test]
    async fn test_observe_unknown_customer_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<customers::Model>::new()])
            .into_connection();
        let client = Client::new(db);
        let service = ShopService::new(client.clone());

        let err = service.observe("s1", "nobody").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(client.take_sql().last().map(String::as_str), Some("ROLLBACK"));
    }

    #[tokio::test]
    async fn test_repair_writes_missing_sides_in_one_transaction() {
        // s1 lists c1, c1 lists nothing; c2 points at a shop that does not exist.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1", &["c1"])]])
            .append_query_results([vec![customer("c1", &[]), customer("c2", &["gone"])]])
            .append_query_results([vec![customer("c1", &["s1"])]])
            .append_query_results([vec![customer("c2", &[])]])
            .into_connection();
        let client = Client::new(db);
        let service = ShopService::new(client.clone());

        let result = service.repair_observers().await.unwrap();
        assert_eq!(result.shops_updated, 0);
        assert_eq!(result.customers_updated, 2);

        let sql = client.take_sql();
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert_eq!(
            sql.iter().filter(|s| s.starts_with(r#"UPDATE "customers""#)).count(),
            2
        );
        assert_eq!(sql.last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_get_shop_includes_seller() {
        let seller = sellers::Model {
            id: "sel1".to_string(),
            shop_id: "s1".to_string(),
            user_id: "u1".to_string(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![(shop("s1", &[]), seller)]])
            .into_connection();
        let service = ShopService::new(Client::new(db));

        let detail = service.get_shop("s1").await.unwrap();
        assert_eq!(detail.shop.id, "s1");
        assert_eq!(detail.seller_user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn test_list_observers_skips_query_for_empty_shop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1", &[])]])
            .into_connection();
        let service = ShopService::new(Client::new(db));

        assert!(service.list_observers("s1").await.unwrap().is_empty());
    }
}
