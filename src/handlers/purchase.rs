use actix_web::{web, HttpResponse, Result, ResponseError};
use crate::error::AppError;
use crate::models::*;
use crate::services::PurchaseService;

#[utoipa::path(
    post,
    path = "/purchases",
    tag = "purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded", body = PurchaseResponse),
        (status = 404, description = "Customer or book not found")
    )
)]
pub async fn purchase(
    purchase_service: web::Data<PurchaseService>,
    request: web::Json<PurchaseRequest>,
) -> Result<HttpResponse> {
    match purchase_service.purchase(request.into_inner()).await {
        Ok(purchase) => Ok(HttpResponse::Created().json(ApiResponse::success(purchase))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/purchases",
    tag = "purchase",
    params(PurchaseQuery),
    responses(
        (status = 200, description = "Purchases of a customer or of a book", body = [PurchaseResponse]),
        (status = 400, description = "Neither or both of customer_id and book_id given")
    )
)]
pub async fn list_purchases(
    purchase_service: web::Data<PurchaseService>,
    query: web::Query<PurchaseQuery>,
) -> Result<HttpResponse> {
    let result = match (&query.customer_id, &query.book_id) {
        (Some(customer_id), None) => purchase_service.list_by_customer(customer_id).await,
        (None, Some(book_id)) => purchase_service.list_by_book(book_id).await,
        _ => Err(AppError::ValidationError(
            "Exactly one of customer_id or book_id is required".to_string(),
        )),
    };
    match result {
        Ok(purchases) => Ok(HttpResponse::Ok().json(ApiResponse::success(purchases))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn purchase_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/purchases")
            .route("", web::post().to(purchase))
            .route("", web::get().to(list_purchases)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[actix_web::test]
    async fn test_list_requires_exactly_one_filter() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(PurchaseService::new(Client::new(db))))
                .configure(purchase_config),
        )
        .await;

        let req = test::TestRequest::get().uri("/purchases").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/purchases?customer_id=c1&book_id=b1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
