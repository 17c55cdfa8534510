use actix_web::{web, HttpResponse, Result, ResponseError};
use crate::models::*;
use crate::services::ShopService;

#[utoipa::path(
    post,
    path = "/shops",
    tag = "shop",
    request_body = CreateShopRequest,
    responses(
        (status = 201, description = "Shop created", body = ShopResponse),
        (status = 400, description = "Invalid name")
    )
)]
pub async fn create_shop(
    shop_service: web::Data<ShopService>,
    request: web::Json<CreateShopRequest>,
) -> Result<HttpResponse> {
    match shop_service.create_shop(request.into_inner()).await {
        Ok(shop) => Ok(HttpResponse::Created().json(ApiResponse::success(shop))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/shops",
    tag = "shop",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated shops with their seller")
    )
)]
pub async fn list_shops(
    shop_service: web::Data<ShopService>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match shop_service.list_shops(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/shops/{id}",
    tag = "shop",
    params(("id" = String, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Shop", body = ShopDetailResponse),
        (status = 404, description = "Shop not found")
    )
)]
pub async fn get_shop(
    shop_service: web::Data<ShopService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match shop_service.get_shop(&path.into_inner()).await {
        Ok(shop) => Ok(HttpResponse::Ok().json(ApiResponse::success(shop))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/shops/{id}/observers",
    tag = "shop",
    params(("id" = String, Path, description = "Shop id")),
    request_body = ObserveRequest,
    responses(
        (status = 200, description = "Customer observes the shop", body = ShopResponse),
        (status = 404, description = "Shop or customer not found")
    )
)]
pub async fn observe(
    shop_service: web::Data<ShopService>,
    path: web::Path<String>,
    request: web::Json<ObserveRequest>,
) -> Result<HttpResponse> {
    match shop_service
        .observe(&path.into_inner(), &request.customer_id)
        .await
    {
        Ok(shop) => Ok(HttpResponse::Ok().json(ApiResponse::success(shop))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/shops/{id}/observers/{customer_id}",
    tag = "shop",
    params(
        ("id" = String, Path, description = "Shop id"),
        ("customer_id" = String, Path, description = "Customer id")
    ),
    responses(
        (status = 200, description = "Observation removed", body = ShopResponse),
        (status = 404, description = "Shop or customer not found")
    )
)]
pub async fn unobserve(
    shop_service: web::Data<ShopService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (shop_id, customer_id) = path.into_inner();
    match shop_service.unobserve(&shop_id, &customer_id).await {
        Ok(shop) => Ok(HttpResponse::Ok().json(ApiResponse::success(shop))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/shops/{id}/observers",
    tag = "shop",
    params(("id" = String, Path, description = "Shop id")),
    responses(
        (status = 200, description = "Customers observing the shop", body = [ObserverResponse]),
        (status = 404, description = "Shop not found")
    )
)]
pub async fn list_observers(
    shop_service: web::Data<ShopService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match shop_service.list_observers(&path.into_inner()).await {
        Ok(observers) => Ok(HttpResponse::Ok().json(ApiResponse::success(observers))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/shops/observers/audit",
    tag = "shop",
    responses(
        (status = 200, description = "One-sided or dangling observer links", body = ObserverAuditReport)
    )
)]
pub async fn audit_observers(shop_service: web::Data<ShopService>) -> Result<HttpResponse> {
    match shop_service.audit_observers().await {
        Ok(report) => Ok(HttpResponse::Ok().json(ApiResponse::success(report))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/shops/observers/repair",
    tag = "shop",
    responses(
        (status = 200, description = "Observer arrays reconciled", body = ObserverRepairResponse)
    )
)]
pub async fn repair_observers(shop_service: web::Data<ShopService>) -> Result<HttpResponse> {
    match shop_service.repair_observers().await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(result))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn shop_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shops")
            .route("", web::post().to(create_shop))
            .route("", web::get().to(list_shops))
            .route("/observers/audit", web::get().to(audit_observers))
            .route("/observers/repair", web::post().to(repair_observers))
            .route("/{id}", web::get().to(get_shop))
            .route("/{id}/observers", web::get().to(list_observers))
            .route("/{id}/observers", web::post().to(observe))
            .route("/{id}/observers/{customer_id}", web::delete().to(unobserve)),
    );
}
