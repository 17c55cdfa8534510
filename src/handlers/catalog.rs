use actix_web::{web, HttpResponse, Result, ResponseError};
use crate::models::*;
use crate::services::CatalogService;

#[utoipa::path(
    post,
    path = "/catalogs",
    tag = "catalog",
    request_body = CreateCatalogRequest,
    responses(
        (status = 201, description = "Catalog created", body = CatalogResponse),
        (status = 404, description = "Shop not found")
    )
)]
pub async fn create_catalog(
    catalog_service: web::Data<CatalogService>,
    request: web::Json<CreateCatalogRequest>,
) -> Result<HttpResponse> {
    match catalog_service.create_catalog(request.into_inner()).await {
        Ok(catalog) => Ok(HttpResponse::Created().json(ApiResponse::success(catalog))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalogs",
    tag = "catalog",
    params(ShopIdQuery),
    responses(
        (status = 200, description = "Catalogs of the shop with their books", body = [CatalogWithBooks]),
        (status = 404, description = "Shop not found")
    )
)]
pub async fn list_catalogs(
    catalog_service: web::Data<CatalogService>,
    query: web::Query<ShopIdQuery>,
) -> Result<HttpResponse> {
    match catalog_service.list_for_shop(&query.shop_id).await {
        Ok(catalogs) => Ok(HttpResponse::Ok().json(ApiResponse::success(catalogs))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalogs/{id}",
    tag = "catalog",
    params(("id" = String, Path, description = "Catalog id")),
    responses(
        (status = 200, description = "Catalog", body = CatalogResponse),
        (status = 404, description = "Catalog not found")
    )
)]
pub async fn get_catalog(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match catalog_service.get_catalog(&path.into_inner()).await {
        Ok(catalog) => Ok(HttpResponse::Ok().json(ApiResponse::success(catalog))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/catalogs/{id}",
    tag = "catalog",
    params(("id" = String, Path, description = "Catalog id")),
    responses(
        (status = 200, description = "Catalog deleted, its books kept", body = CatalogResponse),
        (status = 404, description = "Catalog not found")
    )
)]
pub async fn delete_catalog(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match catalog_service.delete_catalog(&path.into_inner()).await {
        Ok(catalog) => Ok(HttpResponse::Ok().json(ApiResponse::success(catalog))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/catalogs/{id}/books",
    tag = "catalog",
    params(("id" = String, Path, description = "Catalog id")),
    responses(
        (status = 200, description = "Books in the catalog", body = [BookResponse]),
        (status = 404, description = "Catalog not found")
    )
)]
pub async fn list_catalog_books(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match catalog_service.list_books(&path.into_inner()).await {
        Ok(books) => Ok(HttpResponse::Ok().json(ApiResponse::success(books))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/catalogs/{id}/books/{book_id}",
    tag = "catalog",
    params(
        ("id" = String, Path, description = "Catalog id"),
        ("book_id" = String, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book assigned", body = BookResponse),
        (status = 400, description = "Book and catalog belong to different shops"),
        (status = 404, description = "Catalog or book not found")
    )
)]
pub async fn assign_book(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (catalog_id, book_id) = path.into_inner();
    match catalog_service.assign_book(&catalog_id, &book_id).await {
        Ok(book) => Ok(HttpResponse::Ok().json(ApiResponse::success(book))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/catalogs/{id}/books/{book_id}",
    tag = "catalog",
    params(
        ("id" = String, Path, description = "Catalog id"),
        ("book_id" = String, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book removed from the catalog", body = BookResponse),
        (status = 400, description = "Book is not in this catalog")
    )
)]
pub async fn unassign_book(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse> {
    let (catalog_id, book_id) = path.into_inner();
    match catalog_service.unassign_book(&catalog_id, &book_id).await {
        Ok(book) => Ok(HttpResponse::Ok().json(ApiResponse::success(book))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn catalog_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/catalogs")
            .route("", web::post().to(create_catalog))
            .route("", web::get().to(list_catalogs))
            .route("/{id}", web::get().to(get_catalog))
            .route("/{id}", web::delete().to(delete_catalog))
            .route("/{id}/books", web::get().to(list_catalog_books))
            .route("/{id}/books/{book_id}", web::put().to(assign_book))
            .route("/{id}/books/{book_id}", web::delete().to(unassign_book)),
    );
}
