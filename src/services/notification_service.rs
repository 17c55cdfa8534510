use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, Order, Set};

use crate::client::{Client, Delegates, FindArgs};
use crate::entities::notification_entity as notifications;
use crate::error::{AppError, AppResult};
use crate::models::*;

const MAX_CONTENT_CHARS: usize = 2000;

#[derive(Clone)]
pub struct NotificationService {
    client: Client,
}

fn unread_of(customer_id: &str) -> Condition {
    Condition::all()
        .add(notifications::Column::CustomerId.eq(customer_id))
        .add(notifications::Column::Status.eq(false))
}

impl NotificationService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn notify(&self, request: NotifyRequest) -> AppResult<NotificationResponse> {
        let content = request.content.trim();
        if content.is_empty() || content.chars().count() > MAX_CONTENT_CHARS {
            return Err(AppError::ValidationError(format!(
                "Notification content must be between 1 and {MAX_CONTENT_CHARS} characters"
            )));
        }
        self.client
            .customers()
            .find_unique_or_throw(&request.customer_id)
            .await?;

        let notification = self
            .client
            .notifications()
            .create(notifications::ActiveModel {
                content: Set(content.to_string()),
                status: Set(false),
                timestamp: Set(Utc::now()),
                customer_id: Set(request.customer_id),
                ..Default::default()
            })
            .await?;
        log::info!(
            "Notification {} sent to customer {}",
            notification.id,
            notification.customer_id
        );
        Ok(notification.into())
    }

    /// Newest first.
    pub async fn list(
        &self,
        query: &NotificationQuery,
    ) -> AppResult<PaginatedResponse<NotificationResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let filter = if query.unread_only {
            unread_of(&query.customer_id)
        } else {
            Condition::all().add(notifications::Column::CustomerId.eq(query.customer_id.as_str()))
        };

        let total = self.client.notifications().count(filter.clone()).await?;
        let rows = self
            .client
            .notifications()
            .find_many(
                FindArgs::new()
                    .filter(filter)
                    .order_by(notifications::Column::Timestamp, Order::Desc)
                    .order_by(notifications::Column::Id, Order::Asc)
                    .skip(params.get_offset())
                    .take(params.get_limit()),
            )
            .await?;
        Ok(PaginatedResponse::new(
            rows.into_iter().map(NotificationResponse::from).collect(),
            &params,
            total,
        ))
    }

    pub async fn unread_count(&self, customer_id: &str) -> AppResult<u64> {
        self.client.notifications().count(unread_of(customer_id)).await
    }

    pub async fn mark_read(&self, notification_id: &str) -> AppResult<NotificationResponse> {
        let updated = self
            .client
            .notifications()
            .update(
                notification_id,
                notifications::ActiveModel {
                    status: Set(true),
                    ..Default::default()
                },
            )
            .await?;
        Ok(updated.into())
    }

    /// Marks every unread notification of the customer as read.
    pub async fn mark_all_read(&self, customer_id: &str) -> AppResult<u64> {
        let affected = self
            .client
            .notifications()
            .update_many(
                unread_of(customer_id),
                notifications::ActiveModel {
                    status: Set(true),
                    ..Default::default()
                },
            )
            .await?;
        log::info!("Marked {affected} notifications read for customer {customer_id}");
        Ok(affected)
    }

    pub async fn delete(&self, notification_id: &str) -> AppResult<NotificationResponse> {
        Ok(self
            .client
            .notifications()
            .delete(notification_id)
            .await?
            .into())
    }
}
