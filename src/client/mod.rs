//! Typed data-access client: one [`Delegate`] per model, plus raw SQL and
//! closure-scoped transactions.

mod aggregate;
mod args;
mod delegate;

pub use aggregate::{Aggregates, GroupRow};
pub use args::{AggregateArgs, FindArgs, GroupByArgs};
pub use delegate::Delegate;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, FromQueryResult,
    IsolationLevel, JsonValue, Statement, TransactionTrait,
};

use crate::entities::{
    admin_entity, book_entity, catalog_entity, customer_entity, discount_strategy_entity,
    notification_entity, seller_entity, shop_entity, transaction_entity, user_entity,
};
use crate::error::{AppError, AppResult};

/// Boxed future returned by a transaction body.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Model accessors shared by [`Client`] and [`TxClient`].
pub trait Delegates {
    type Conn: ConnectionTrait;

    fn conn(&self) -> &Self::Conn;

    fn users(&self) -> Delegate<'_, user_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn sellers(&self) -> Delegate<'_, seller_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn customers(&self) -> Delegate<'_, customer_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn admins(&self) -> Delegate<'_, admin_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn shops(&self) -> Delegate<'_, shop_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn books(&self) -> Delegate<'_, book_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn catalogs(&self) -> Delegate<'_, catalog_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn transactions(&self) -> Delegate<'_, transaction_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn notifications(&self) -> Delegate<'_, notification_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }

    fn discount_strategies(&self) -> Delegate<'_, discount_strategy_entity::Entity, Self::Conn> {
        Delegate::new(self.conn())
    }
}

/// Autocommit client. Clones share one connection pool.
#[derive(Clone, Debug)]
pub struct Client {
    conn: Arc<DatabaseConnection>,
}

impl Client {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn: Arc::new(conn),
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Statements recorded so far by a mock connection, drained.
    #[cfg(test)]
    pub(crate) fn take_log(&self) -> Vec<sea_orm::Transaction> {
        use sea_orm::MockDatabaseTrait;
        self.conn
            .as_mock_connection()
            .get_mocker_mutex()
            .lock()
            .map(|mut mocker| mocker.drain_transaction_log())
            .unwrap_or_default()
    }

    /// SQL text of every drained statement, transactions flattened in order.
    #[cfg(test)]
    pub(crate) fn take_sql(&self) -> Vec<String> {
        self.take_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    pub async fn query_raw(&self, stmt: Statement) -> AppResult<Vec<JsonValue>> {
        query_raw(self.connection(), stmt).await
    }

    pub async fn execute_raw(&self, stmt: Statement) -> AppResult<u64> {
        execute_raw(self.connection(), stmt).await
    }

    /// Runs `f` inside a read-committed transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise.
    pub async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TxClient<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.run_transaction(IsolationLevel::ReadCommitted, f).await
    }

    /// Same as [`Client::transaction`] with serializable isolation.
    pub async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TxClient<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.run_transaction(IsolationLevel::Serializable, f).await
    }

    async fn run_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TxClient<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .conn
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await
            .map_err(AppError::from)?;

        match f(TxClient { txn: &txn }).await {
            Ok(value) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    log::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

impl Delegates for Client {
    type Conn = DatabaseConnection;

    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Client view bound to an open transaction.
pub struct TxClient<'a> {
    txn: &'a DatabaseTransaction,
}

impl TxClient<'_> {
    pub async fn query_raw(&self, stmt: Statement) -> AppResult<Vec<JsonValue>> {
        query_raw(self.txn, stmt).await
    }

    pub async fn execute_raw(&self, stmt: Statement) -> AppResult<u64> {
        execute_raw(self.txn, stmt).await
    }
}

impl Delegates for TxClient<'_> {
    type Conn = DatabaseTransaction;

    fn conn(&self) -> &DatabaseTransaction {
        self.txn
    }
}

async fn query_raw<C: ConnectionTrait>(conn: &C, stmt: Statement) -> AppResult<Vec<JsonValue>> {
    Ok(JsonValue::find_by_statement(stmt).all(conn).await?)
}

async fn execute_raw<C: ConnectionTrait>(conn: &C, stmt: Statement) -> AppResult<u64> {
    Ok(conn.execute(stmt).await?.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StringList;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set, Value};
    use std::collections::BTreeMap;

    fn shop(id: &str) -> shop_entity::Model {
        shop_entity::Model {
            id: id.to_string(),
            name: "Alpha".to_string(),
            observer_ids: StringList::default(),
        }
    }

    #[tokio::test]
    async fn test_transaction_returns_body_value() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1")]])
            .into_connection();
        let client = Client::new(db);

        let found = client
            .transaction(|tx| Box::pin(async move { tx.shops().find_unique("s1").await }))
            .await
            .unwrap();
        assert_eq!(found.map(|s| s.id), Some("s1".to_string()));
    }

    #[tokio::test]
    async fn test_transaction_propagates_body_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<shop_entity::Model>::new()])
            .into_connection();
        let client = Client::new(db);

        let err = client
            .transaction_serializable(|tx| {
                Box::pin(async move {
                    tx.shops()
                        .update(
                            "missing",
                            shop_entity::ActiveModel {
                                name: Set("Renamed".to_string()),
                                ..Default::default()
                            },
                        )
                        .await
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1")]])
            .into_connection();
        let client = Client::new(db);

        let err = client
            .transaction(|tx| {
                Box::pin(async move {
                    tx.shops().find_unique_or_throw("s1").await?;
                    Err::<(), _>(AppError::ValidationError("stop".to_string()))
                })
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let sql = client.take_sql();
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!sql.iter().any(|s| s == "COMMIT"));
    }

    #[tokio::test]
    async fn test_transaction_commits_on_success() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop("s1")]])
            .into_connection();
        let client = Client::new(db);

        client
            .transaction(|tx| Box::pin(async move { tx.shops().find_unique_or_throw("s1").await }))
            .await
            .unwrap();
        assert_eq!(client.take_sql().last().map(String::as_str), Some("COMMIT"));
    }

    #[tokio::test]
    async fn test_raw_statements() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("total", Value::BigInt(Some(3)))])]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_connection();
        let client = Client::new(db);

        let rows = client
            .query_raw(Statement::from_string(
                DatabaseBackend::Postgres,
                "SELECT COUNT(*) AS total FROM books",
            ))
            .await
            .unwrap();
        assert_eq!(rows, vec![serde_json::json!({"total": 3})]);

        let affected = client
            .execute_raw(Statement::from_string(
                DatabaseBackend::Postgres,
                "UPDATE notifications SET status = true",
            ))
            .await
            .unwrap();
        assert_eq!(affected, 2);
    }
}
