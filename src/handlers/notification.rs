use actix_web::{web, HttpResponse, Result, ResponseError};
use crate::models::*;
use crate::services::NotificationService;

#[utoipa::path(
    post,
    path = "/notifications",
    tag = "notification",
    request_body = NotifyRequest,
    responses(
        (status = 201, description = "Notification created", body = NotificationResponse),
        (status = 400, description = "Empty or oversized content"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn notify(
    notification_service: web::Data<NotificationService>,
    request: web::Json<NotifyRequest>,
) -> Result<HttpResponse> {
    match notification_service.notify(request.into_inner()).await {
        Ok(n) => Ok(HttpResponse::Created().json(ApiResponse::success(n))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notification",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Paginated notifications, newest first")
    )
)]
pub async fn list_notifications(
    notification_service: web::Data<NotificationService>,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse> {
    match notification_service.list(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "notification",
    params(CustomerQuery),
    responses(
        (status = 200, description = "Unread notifications of the customer", body = CountResponse)
    )
)]
pub async fn unread_count(
    notification_service: web::Data<NotificationService>,
    query: web::Query<CustomerQuery>,
) -> Result<HttpResponse> {
    match notification_service.unread_count(&query.customer_id).await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(CountResponse { count }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/notifications/read-all",
    tag = "notification",
    params(CustomerQuery),
    responses(
        (status = 200, description = "Unread notifications marked read", body = AffectedResponse)
    )
)]
pub async fn mark_all_read(
    notification_service: web::Data<NotificationService>,
    query: web::Query<CustomerQuery>,
) -> Result<HttpResponse> {
    match notification_service.mark_all_read(&query.customer_id).await {
        Ok(affected) => Ok(HttpResponse::Ok().json(ApiResponse::success(AffectedResponse { affected }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    tag = "notification",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    notification_service: web::Data<NotificationService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match notification_service.mark_read(&path.into_inner()).await {
        Ok(n) => Ok(HttpResponse::Ok().json(ApiResponse::success(n))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "notification",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification deleted", body = NotificationResponse),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification(
    notification_service: web::Data<NotificationService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match notification_service.delete(&path.into_inner()).await {
        Ok(n) => Ok(HttpResponse::Ok().json(ApiResponse::success(n))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::post().to(notify))
            .route("", web::get().to(list_notifications))
            .route("/unread-count", web::get().to(unread_count))
            .route("/read-all", web::post().to(mark_all_read))
            .route("/{id}/read", web::put().to(mark_read))
            .route("/{id}", web::delete().to(delete_notification)),
    );
}
