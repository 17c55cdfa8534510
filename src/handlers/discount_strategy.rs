use actix_web::{web, HttpResponse, Result, ResponseError};
use crate::models::*;
use crate::services::DiscountStrategyService;

#[utoipa::path(
    post,
    path = "/discount-strategies",
    tag = "discount",
    request_body = DiscountStrategyRequest,
    responses(
        (status = 201, description = "Strategy created", body = DiscountStrategyResponse),
        (status = 400, description = "amount/percent do not fit the type")
    )
)]
pub async fn create_strategy(
    strategy_service: web::Data<DiscountStrategyService>,
    request: web::Json<DiscountStrategyRequest>,
) -> Result<HttpResponse> {
    match strategy_service.create_strategy(request.into_inner()).await {
        Ok(strategy) => Ok(HttpResponse::Created().json(ApiResponse::success(strategy))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/discount-strategies",
    tag = "discount",
    params(DiscountStrategyQuery),
    responses(
        (status = 200, description = "Strategies", body = [DiscountStrategyResponse])
    )
)]
pub async fn list_strategies(
    strategy_service: web::Data<DiscountStrategyService>,
    query: web::Query<DiscountStrategyQuery>,
) -> Result<HttpResponse> {
    match strategy_service.list_strategies(query.strategy_type).await {
        Ok(strategies) => Ok(HttpResponse::Ok().json(ApiResponse::success(strategies))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/discount-strategies/stats",
    tag = "discount",
    responses(
        (status = 200, description = "Aggregates over all strategies and per type", body = DiscountStrategyStats)
    )
)]
pub async fn strategy_stats(
    strategy_service: web::Data<DiscountStrategyService>,
) -> Result<HttpResponse> {
    match strategy_service.stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/discount-strategies/{id}",
    tag = "discount",
    params(("id" = String, Path, description = "Strategy id")),
    responses(
        (status = 200, description = "Strategy", body = DiscountStrategyResponse),
        (status = 404, description = "Strategy not found")
    )
)]
pub async fn get_strategy(
    strategy_service: web::Data<DiscountStrategyService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match strategy_service.get_strategy(&path.into_inner()).await {
        Ok(strategy) => Ok(HttpResponse::Ok().json(ApiResponse::success(strategy))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/discount-strategies/{id}",
    tag = "discount",
    params(("id" = String, Path, description = "Strategy id")),
    request_body = DiscountStrategyRequest,
    responses(
        (status = 200, description = "Strategy replaced", body = DiscountStrategyResponse),
        (status = 400, description = "amount/percent do not fit the type"),
        (status = 404, description = "Strategy not found")
    )
)]
pub async fn update_strategy(
    strategy_service: web::Data<DiscountStrategyService>,
    path: web::Path<String>,
    request: web::Json<DiscountStrategyRequest>,
) -> Result<HttpResponse> {
    match strategy_service
        .update_strategy(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(strategy) => Ok(HttpResponse::Ok().json(ApiResponse::success(strategy))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/discount-strategies/{id}",
    tag = "discount",
    params(("id" = String, Path, description = "Strategy id")),
    responses(
        (status = 200, description = "Strategy deleted", body = DiscountStrategyResponse),
        (status = 404, description = "Strategy not found"),
        (status = 409, description = "Strategy still used by books")
    )
)]
pub async fn delete_strategy(
    strategy_service: web::Data<DiscountStrategyService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match strategy_service.delete_strategy(&path.into_inner()).await {
        Ok(strategy) => Ok(HttpResponse::Ok().json(ApiResponse::success(strategy))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn discount_strategy_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/discount-strategies")
            .route("", web::post().to(create_strategy))
            .route("", web::get().to(list_strategies))
            .route("/stats", web::get().to(strategy_stats))
            .route("/{id}", web::get().to(get_strategy))
            .route("/{id}", web::put().to(update_strategy))
            .route("/{id}", web::delete().to(delete_strategy)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[actix_web::test]
    async fn test_percentage_without_percent_is_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DiscountStrategyService::new(Client::new(db))))
                .configure(discount_strategy_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/discount-strategies")
            .set_json(serde_json::json!({"type": "percentage", "amount": 5.0}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_type_is_rejected_by_extractor() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(DiscountStrategyService::new(Client::new(db))))
                .configure(discount_strategy_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/discount-strategies")
            .set_json(serde_json::json!({"type": "bogo"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_client_error());
    }
}
