use sea_orm::{ColumnTrait, Condition, Order, Set};

use crate::client::{Client, Delegates, FindArgs};
use crate::entities::transaction_entity as transactions;
use crate::error::AppResult;
use crate::models::*;

#[derive(Clone)]
pub struct PurchaseService {
    client: Client,
}

impl PurchaseService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Records that a customer bought a book.
    pub async fn purchase(&self, request: PurchaseRequest) -> AppResult<PurchaseResponse> {
        self.client
            .customers()
            .find_unique_or_throw(&request.customer_id)
            .await?;
        self.client.books().find_unique_or_throw(&request.book_id).await?;

        let purchase = self
            .client
            .transactions()
            .create(transactions::ActiveModel {
                book_id: Set(request.book_id),
                customer_id: Set(request.customer_id),
                ..Default::default()
            })
            .await?;
        log::info!(
            "Customer {} purchased book {} ({})",
            purchase.customer_id,
            purchase.book_id,
            purchase.id
        );
        Ok(purchase.into())
    }

    pub async fn list_by_customer(&self, customer_id: &str) -> AppResult<Vec<PurchaseResponse>> {
        self.client.customers().find_unique_or_throw(customer_id).await?;
        self.list(Condition::all().add(transactions::Column::CustomerId.eq(customer_id)))
            .await
    }

    pub async fn list_by_book(&self, book_id: &str) -> AppResult<Vec<PurchaseResponse>> {
        self.client.books().find_unique_or_throw(book_id).await?;
        self.list(Condition::all().add(transactions::Column::BookId.eq(book_id)))
            .await
    }

    async fn list(&self, filter: Condition) -> AppResult<Vec<PurchaseResponse>> {
        let rows = self
            .client
            .transactions()
            .find_many(
                FindArgs::new()
                    .filter(filter)
                    .order_by(transactions::Column::Id, Order::Asc),
            )
            .await?;
        Ok(rows.into_iter().map(PurchaseResponse::from).collect())
    }
}
