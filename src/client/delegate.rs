use std::marker::PhantomData;

use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    IdenStatic, IntoActiveModel, JsonValue, LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Related, Select,
};

use super::aggregate::{Aggregates, GroupRow, decode_row, select_aggregates};
use super::args::{AggregateArgs, FindArgs, GroupByArgs};
use crate::entities::Identifiable;
use crate::error::{AppError, AppResult};
use crate::utils::generate_id;

/// Data-access handle for one model, bound to a connection or a transaction.
///
/// Obtained through [`super::Delegates`]; cheap to create, holds only a
/// borrowed connection.
pub struct Delegate<'c, E, C> {
    conn: &'c C,
    entity: PhantomData<E>,
}

impl<'c, E, C> Delegate<'c, E, C>
where
    E: Identifiable,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    C: ConnectionTrait,
{
    pub(crate) fn new(conn: &'c C) -> Self {
        Self {
            conn,
            entity: PhantomData,
        }
    }

    fn by_id(id: &str) -> Select<E> {
        E::find().filter(E::id_column().eq(id))
    }

    fn not_found(id: &str) -> AppError {
        AppError::NotFound(format!("{} {id} not found", E::MODEL))
    }

    fn select(args: FindArgs<E>) -> Select<E> {
        let mut select = E::find().filter(args.filter);
        for (column, order) in args.order_by {
            select = select.order_by(column, order);
        }
        if let Some(skip) = args.skip {
            select = select.offset(skip);
        }
        if let Some(take) = args.take {
            select = select.limit(take);
        }
        if args.for_update {
            select = select.lock_exclusive();
        }
        select
    }

    pub async fn find_unique(&self, id: &str) -> AppResult<Option<E::Model>> {
        Ok(Self::by_id(id).one(self.conn).await?)
    }

    pub async fn find_unique_or_throw(&self, id: &str) -> AppResult<E::Model> {
        self.find_unique(id)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Loads the row with `id` and locks it (`FOR UPDATE`) until the
    /// surrounding transaction ends. Only meaningful on a [`super::TxClient`].
    pub async fn lock_unique(&self, id: &str) -> AppResult<E::Model> {
        Self::by_id(id)
            .lock_exclusive()
            .one(self.conn)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn find_first(&self, args: FindArgs<E>) -> AppResult<Option<E::Model>> {
        Ok(Self::select(args).one(self.conn).await?)
    }

    pub async fn find_first_or_throw(&self, args: FindArgs<E>) -> AppResult<E::Model> {
        self.find_first(args)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No {} matches the query", E::MODEL)))
    }

    pub async fn find_many(&self, args: FindArgs<E>) -> AppResult<Vec<E::Model>> {
        Ok(Self::select(args).all(self.conn).await?)
    }

    /// Loads one row together with a to-one relation (belongs_to / has_one).
    pub async fn find_unique_with_related<R>(
        &self,
        id: &str,
    ) -> AppResult<Option<(E::Model, Option<R::Model>)>>
    where
        R: EntityTrait,
        E: Related<R>,
    {
        Ok(Self::by_id(id)
            .find_also_related(R::default())
            .one(self.conn)
            .await?)
    }

    /// `find_many` plus a to-one relation loaded in a second query.
    pub async fn find_many_with_one<R>(
        &self,
        args: FindArgs<E>,
    ) -> AppResult<Vec<(E::Model, Option<R::Model>)>>
    where
        R: EntityTrait,
        R::Model: Send + Sync,
        E: Related<R>,
    {
        let models = self.find_many(args).await?;
        let related = models.load_one(R::default(), self.conn).await?;
        Ok(models.into_iter().zip(related).collect())
    }

    /// `find_many` plus a to-many relation loaded in a second query.
    pub async fn find_many_with_many<R>(
        &self,
        args: FindArgs<E>,
    ) -> AppResult<Vec<(E::Model, Vec<R::Model>)>>
    where
        R: EntityTrait,
        R::Model: Send + Sync,
        E: Related<R>,
    {
        let models = self.find_many(args).await?;
        let related = models.load_many(R::default(), self.conn).await?;
        Ok(models.into_iter().zip(related).collect())
    }

    /// Inserts one row. An unset id is filled with a fresh one.
    pub async fn create(&self, data: E::ActiveModel) -> AppResult<E::Model> {
        Ok(with_id::<E>(data).insert(self.conn).await?)
    }

    /// Inserts all rows in one statement and returns how many were written.
    pub async fn create_many(&self, data: Vec<E::ActiveModel>) -> AppResult<u64> {
        if data.is_empty() {
            return Ok(0);
        }
        let rows = data.into_iter().map(with_id::<E>);
        Ok(E::insert_many(rows)
            .exec_without_returning(self.conn)
            .await?)
    }

    /// Updates the row with `id` using the set fields of `data`.
    pub async fn update(&self, id: &str, mut data: E::ActiveModel) -> AppResult<E::Model> {
        data.set(E::id_column(), id.into());
        match data.update(self.conn).await {
            Ok(model) => Ok(model),
            Err(sea_orm::DbErr::RecordNotUpdated) | Err(sea_orm::DbErr::RecordNotFound(_)) => {
                Err(Self::not_found(id))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_many(&self, filter: Condition, data: E::ActiveModel) -> AppResult<u64> {
        let result = E::update_many()
            .set(data)
            .filter(filter)
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Updates the row with `id` when it exists, otherwise creates it from `create`.
    pub async fn upsert(
        &self,
        id: &str,
        mut create: E::ActiveModel,
        update: E::ActiveModel,
    ) -> AppResult<E::Model> {
        if self.find_unique(id).await?.is_some() {
            return self.update(id, update).await;
        }
        create.set(E::id_column(), id.into());
        self.create(create).await
    }

    /// Deletes the row with `id` and returns it as it was.
    pub async fn delete(&self, id: &str) -> AppResult<E::Model> {
        let existing = self.find_unique_or_throw(id).await?;
        E::delete_many()
            .filter(E::id_column().eq(id))
            .exec(self.conn)
            .await?;
        Ok(existing)
    }

    pub async fn delete_many(&self, filter: Condition) -> AppResult<u64> {
        let result = E::delete_many().filter(filter).exec(self.conn).await?;
        Ok(result.rows_affected)
    }

    pub async fn count(&self, filter: Condition) -> AppResult<u64> {
        Ok(E::find().filter(filter).count(self.conn).await?)
    }

    pub async fn aggregate(&self, args: AggregateArgs<E>) -> AppResult<Aggregates> {
        if args.is_empty() {
            return Err(AppError::ValidationError(format!(
                "aggregate on {} needs at least one of count/avg/sum/min/max",
                E::MODEL
            )));
        }
        let select = select_aggregates(E::find().filter(args.filter.clone()).select_only(), &args);
        let row = select.into_json().one(self.conn).await?;
        Ok(row.map(decode_row).unwrap_or_default().aggregates)
    }

    pub async fn group_by(&self, args: GroupByArgs<E>) -> AppResult<Vec<GroupRow>> {
        validate_group_by(&args)?;

        let mut select = E::find().filter(args.aggregates.filter.clone()).select_only();
        for column in &args.by {
            select = select.column(*column).group_by(*column);
        }
        select = select_aggregates(select, &args.aggregates);
        if let Some(having) = args.having {
            select = select.having(having);
        }
        for (column, order) in args.order_by {
            select = select.order_by(column, order);
        }
        if let Some(skip) = args.skip {
            select = select.offset(skip);
        }
        if let Some(take) = args.take {
            select = select.limit(take);
        }

        let rows = select.into_json().all(self.conn).await?;
        Ok(rows.into_iter().map(decode_row).collect())
    }

    /// Rows matching `filter` as untyped JSON objects.
    pub async fn find_raw(&self, filter: Condition) -> AppResult<Vec<JsonValue>> {
        Ok(E::find().filter(filter).into_json().all(self.conn).await?)
    }
}

fn with_id<E>(mut data: E::ActiveModel) -> E::ActiveModel
where
    E: Identifiable,
{
    if matches!(data.get(E::id_column()), ActiveValue::NotSet) {
        data.set(E::id_column(), generate_id().into());
    }
    data
}

fn validate_group_by<E: Identifiable>(args: &GroupByArgs<E>) -> AppResult<()> {
    if args.by.is_empty() {
        return Err(AppError::ValidationError(format!(
            "group_by on {} needs at least one `by` column",
            E::MODEL
        )));
    }
    for (column, _) in &args.order_by {
        if !args.by.iter().any(|b| b.as_str() == column.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Field \"{}\" in order_by must be present in `by`",
                column.as_str()
            )));
        }
    }
    if (args.skip.is_some() || args.take.is_some()) && args.order_by.is_empty() {
        return Err(AppError::ValidationError(
            "group_by with skip/take requires order_by".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Client, Delegates};
    use crate::entities::{
        DiscountType, StringList, discount_strategy_entity, seller_entity, shop_entity,
    };
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Order, Set, Value};
    use std::collections::BTreeMap;

    fn shop(id: &str, name: &str) -> shop_entity::Model {
        shop_entity::Model {
            id: id.to_string(),
            name: name.to_string(),
            observer_ids: StringList::default(),
        }
    }

    #[test]
    fn test_with_id_fills_only_missing_ids() {
        let filled = with_id::<shop_entity::Entity>(<shop_entity::ActiveModel as Default>::default());
        assert!(matches!(filled.id, ActiveValue::Set(ref id) if !id.is_empty()));

        let kept = with_id::<shop_entity::Entity>(shop_entity::ActiveModel {
            id: Set("fixed".to_string()),
            ..Default::default()
        });
        assert_eq!(kept.id, Set("fixed".to_string()));
    }

    #[tokio::test]
    async fn test_find_unique_or_throw_reports_model_and_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<shop_entity::Model>::new()])
            .into_connection();
        let client = Client::new(db);

        let err = client.shops().find_unique_or_throw("s-404").await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Shop s-404 not found"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_many_returns_rows_in_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1", "Alpha"), shop("s2", "Beta")]])
            .into_connection();
        let client = Client::new(db);

        let shops = client
            .shops()
            .find_many(
                FindArgs::new()
                    .order_by(shop_entity::Column::Name, Order::Asc)
                    .take(2),
            )
            .await
            .unwrap();
        assert_eq!(shops.len(), 2);
        assert_eq!(shops[0].name, "Alpha");
    }

    #[tokio::test]
    async fn test_create_returns_inserted_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("generated", "Alpha")]])
            .into_connection();
        let client = Client::new(db);

        let created = client
            .shops()
            .create(shop_entity::ActiveModel {
                name: Set("Alpha".to_string()),
                observer_ids: Set(StringList::default()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Alpha");
    }

    #[tokio::test]
    async fn test_create_many_skips_empty_input() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let client = Client::new(db);

        let written = client.shops().create_many(Vec::new()).await.unwrap();
        assert_eq!(written, 0);
        assert!(client.take_log().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<shop_entity::Model>::new()])
            .into_connection();
        let client = Client::new(db);

        let err = client
            .shops()
            .update(
                "missing",
                shop_entity::ActiveModel {
                    name: Set("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_returns_previous_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1", "Alpha")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let client = Client::new(db);

        let deleted = client.shops().delete("s1").await.unwrap();
        assert_eq!(deleted.id, "s1");
    }

    #[tokio::test]
    async fn test_lock_unique_selects_for_update() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1", "Alpha")]])
            .into_connection();
        let client = Client::new(db);

        let locked = client.shops().lock_unique("s1").await.unwrap();
        assert_eq!(locked.id, "s1");
        let sql = client.take_sql();
        assert_eq!(sql.len(), 1);
        assert!(sql[0].ends_with("FOR UPDATE"));
    }

    #[tokio::test]
    async fn test_upsert_updates_existing_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1", "Alpha")]])
            .append_query_results([vec![shop("s1", "Renamed")]])
            .into_connection();
        let client = Client::new(db);

        let row = client
            .shops()
            .upsert(
                "s1",
                shop_entity::ActiveModel {
                    name: Set("Created".to_string()),
                    observer_ids: Set(StringList::default()),
                    ..Default::default()
                },
                shop_entity::ActiveModel {
                    name: Set("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(row.name, "Renamed");

        let sql = client.take_sql();
        assert!(sql.iter().any(|s| s.starts_with(r#"UPDATE "shops""#)));
        assert!(sql.iter().all(|s| !s.starts_with("INSERT")));
    }

    #[tokio::test]
    async fn test_upsert_creates_missing_row_with_given_id() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<shop_entity::Model>::new()])
            .append_query_results([vec![shop("s9", "Created")]])
            .into_connection();
        let client = Client::new(db);

        let row = client
            .shops()
            .upsert(
                "s9",
                shop_entity::ActiveModel {
                    name: Set("Created".to_string()),
                    observer_ids: Set(StringList::default()),
                    ..Default::default()
                },
                shop_entity::ActiveModel {
                    name: Set("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(row.id, "s9");

        let log = client.take_log();
        let insert = log
            .iter()
            .flat_map(|txn| txn.statements().iter())
            .find(|stmt| stmt.sql.starts_with(r#"INSERT INTO "shops""#))
            .unwrap();
        let values = insert.values.as_ref().unwrap();
        assert!(values.0.contains(&Value::from("s9")));
    }

    #[tokio::test]
    async fn test_update_many_and_delete_many_report_rows_affected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                },
            ])
            .into_connection();
        let client = Client::new(db);

        let updated = client
            .shops()
            .update_many(
                Condition::all().add(shop_entity::Column::Name.eq("Alpha")),
                shop_entity::ActiveModel {
                    name: Set("Beta".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated, 3);

        let deleted = client
            .shops()
            .delete_many(Condition::all().add(shop_entity::Column::Name.eq("Beta")))
            .await
            .unwrap();
        assert_eq!(deleted, 2);

        let sql = client.take_sql();
        assert!(sql[0].starts_with(r#"UPDATE "shops" SET "name""#));
        assert!(sql[1].starts_with(r#"DELETE FROM "shops" WHERE"#));
    }

    #[tokio::test]
    async fn test_find_many_with_one_pairs_related_rows() {
        let seller = |id: &str, shop_id: &str| seller_entity::Model {
            id: id.to_string(),
            shop_id: shop_id.to_string(),
            user_id: format!("user-{id}"),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![seller("sel1", "s1"), seller("sel2", "s2")]])
            .append_query_results([vec![shop("s2", "Beta"), shop("s1", "Alpha")]])
            .into_connection();
        let client = Client::new(db);

        let rows = client
            .sellers()
            .find_many_with_one::<shop_entity::Entity>(FindArgs::new())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1.as_ref().map(|s| s.name.as_str()), Some("Alpha"));
        assert_eq!(rows[1].1.as_ref().map(|s| s.name.as_str()), Some("Beta"));
        assert_eq!(client.take_sql().len(), 2);
    }

    #[tokio::test]
    async fn test_find_raw_returns_json_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([
                ("id", Value::from("s1")),
                ("name", Value::from("Alpha")),
            ])]])
            .into_connection();
        let client = Client::new(db);

        let rows = client.shops().find_raw(Condition::all()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], serde_json::json!("s1"));
        assert_eq!(rows[0]["name"], serde_json::json!("Alpha"));
    }

    #[tokio::test]
    async fn test_count_reads_num_items() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(7)))])]])
            .into_connection();
        let client = Client::new(db);

        let total = client.shops().count(Condition::all()).await.unwrap();
        assert_eq!(total, 7);
    }

    #[tokio::test]
    async fn test_aggregate_without_selectors_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let client = Client::new(db);

        let err = client
            .discount_strategies()
            .aggregate(AggregateArgs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_aggregate_decodes_aliases() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([
                ("_count", Value::BigInt(Some(4))),
                ("_avg__percent", Value::Double(Some(15.0))),
            ])]])
            .into_connection();
        let client = Client::new(db);

        let result = client
            .discount_strategies()
            .aggregate(
                AggregateArgs::new()
                    .count()
                    .avg(discount_strategy_entity::Column::Percent),
            )
            .await
            .unwrap();
        assert_eq!(result.count, Some(4));
        assert_eq!(result.avg.get("percent"), Some(&serde_json::json!(15.0)));
    }

    #[tokio::test]
    async fn test_group_by_rejects_order_outside_by() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let client = Client::new(db);

        let err = client
            .discount_strategies()
            .group_by(
                GroupByArgs::new(vec![discount_strategy_entity::Column::StrategyType])
                    .order_by(discount_strategy_entity::Column::Amount, Order::Desc),
            )
            .await
            .unwrap_err();
        match err {
            AppError::ValidationError(msg) => assert!(msg.contains("amount")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_group_by_paging_requires_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let client = Client::new(db);

        let err = client
            .discount_strategies()
            .group_by(GroupByArgs::new(vec![discount_strategy_entity::Column::StrategyType]).take(5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_group_by_returns_keys_and_counts() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[
                BTreeMap::from([
                    ("type", Value::String(Some(Box::new("fixed".to_string())))),
                    ("_count", Value::BigInt(Some(2))),
                ]),
                BTreeMap::from([
                    ("type", Value::String(Some(Box::new("none".to_string())))),
                    ("_count", Value::BigInt(Some(5))),
                ]),
            ]])
            .into_connection();
        let client = Client::new(db);

        let groups = client
            .discount_strategies()
            .group_by(
                GroupByArgs::new(vec![discount_strategy_entity::Column::StrategyType])
                    .aggregates(AggregateArgs::new().count()),
            )
            .await
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key_str("type"), Some(DiscountType::Fixed.to_string().as_str()));
        assert_eq!(groups[1].aggregates.count, Some(5));
    }
}
