use actix_web::{web, HttpResponse, Result, ResponseError};
use crate::models::*;
use crate::services::BookService;

#[utoipa::path(
    post,
    path = "/books",
    tag = "book",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid fields or catalog of another shop"),
        (status = 404, description = "Shop, discount strategy or catalog not found")
    )
)]
pub async fn create_book(
    book_service: web::Data<BookService>,
    request: web::Json<CreateBookRequest>,
) -> Result<HttpResponse> {
    match book_service.create_book(request.into_inner()).await {
        Ok(book) => Ok(HttpResponse::Created().json(ApiResponse::success(book))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/books",
    tag = "book",
    params(BookQuery),
    responses(
        (status = 200, description = "Paginated books of a shop")
    )
)]
pub async fn list_books(
    book_service: web::Data<BookService>,
    query: web::Query<BookQuery>,
) -> Result<HttpResponse> {
    match book_service.list_books(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "book",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    book_service: web::Data<BookService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match book_service.get_book(&path.into_inner()).await {
        Ok(book) => Ok(HttpResponse::Ok().json(ApiResponse::success(book))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "book",
    params(("id" = String, Path, description = "Book id")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "No or invalid fields"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    book_service: web::Data<BookService>,
    path: web::Path<String>,
    request: web::Json<UpdateBookRequest>,
) -> Result<HttpResponse> {
    match book_service
        .update_book(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(book) => Ok(HttpResponse::Ok().json(ApiResponse::success(book))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/books/{id}/discount-strategy",
    tag = "book",
    params(("id" = String, Path, description = "Book id")),
    request_body = ChangeStrategyRequest,
    responses(
        (status = 200, description = "Discount strategy changed", body = BookResponse),
        (status = 404, description = "Book or strategy not found")
    )
)]
pub async fn change_strategy(
    book_service: web::Data<BookService>,
    path: web::Path<String>,
    request: web::Json<ChangeStrategyRequest>,
) -> Result<HttpResponse> {
    match book_service
        .change_strategy(&path.into_inner(), &request.discount_strategy_id)
        .await
    {
        Ok(book) => Ok(HttpResponse::Ok().json(ApiResponse::success(book))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "book",
    params(("id" = String, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book deleted", body = BookResponse),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book has purchases")
    )
)]
pub async fn delete_book(
    book_service: web::Data<BookService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match book_service.delete_book(&path.into_inner()).await {
        Ok(book) => Ok(HttpResponse::Ok().json(ApiResponse::success(book))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn book_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/books")
            .route("", web::post().to(create_book))
            .route("", web::get().to(list_books))
            .route("/{id}", web::get().to(get_book))
            .route("/{id}", web::put().to(update_book))
            .route("/{id}", web::delete().to(delete_book))
            .route("/{id}/discount-strategy", web::put().to(change_strategy)),
    );
}
