use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::client::{Aggregates, GroupRow};
use crate::entities::{DiscountType, Role, StringList};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::user::create_user,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::user::attach_profile,
        handlers::user::verify_credentials,
        handlers::user::role_counts,
        handlers::shop::create_shop,
        handlers::shop::list_shops,
        handlers::shop::get_shop,
        handlers::shop::observe,
        handlers::shop::unobserve,
        handlers::shop::list_observers,
        handlers::shop::audit_observers,
        handlers::shop::repair_observers,
        handlers::catalog::create_catalog,
        handlers::catalog::list_catalogs,
        handlers::catalog::get_catalog,
        handlers::catalog::delete_catalog,
        handlers::catalog::list_catalog_books,
        handlers::catalog::assign_book,
        handlers::catalog::unassign_book,
        handlers::book::create_book,
        handlers::book::list_books,
        handlers::book::get_book,
        handlers::book::update_book,
        handlers::book::change_strategy,
        handlers::book::delete_book,
        handlers::discount_strategy::create_strategy,
        handlers::discount_strategy::list_strategies,
        handlers::discount_strategy::strategy_stats,
        handlers::discount_strategy::get_strategy,
        handlers::discount_strategy::update_strategy,
        handlers::discount_strategy::delete_strategy,
        handlers::purchase::purchase,
        handlers::purchase::list_purchases,
        handlers::notification::notify,
        handlers::notification::list_notifications,
        handlers::notification::unread_count,
        handlers::notification::mark_all_read,
        handlers::notification::mark_read,
        handlers::notification::delete_notification,
    ),
    components(
        schemas(
            Role,
            DiscountType,
            StringList,
            Aggregates,
            GroupRow,
            ApiError,
            AffectedResponse,
            CountResponse,
            PaginationParams,
            CreateUserRequest,
            UpdateUserRequest,
            VerifyCredentialsRequest,
            UserResponse,
            ProfileRequest,
            ProfileResponse,
            UserDetailResponse,
            RoleCount,
            CreateShopRequest,
            ObserveRequest,
            ShopResponse,
            ShopDetailResponse,
            ObserverMismatch,
            ObserverAuditReport,
            ObserverRepairResponse,
            ObserverResponse,
            CreateCatalogRequest,
            CatalogResponse,
            CatalogWithBooks,
            CreateBookRequest,
            UpdateBookRequest,
            ChangeStrategyRequest,
            BookResponse,
            DiscountStrategyRequest,
            DiscountStrategyResponse,
            DiscountStrategyStats,
            PurchaseRequest,
            PurchaseResponse,
            NotifyRequest,
            NotificationResponse,
        )
    ),
    tags(
        (name = "user", description = "Users and role profiles"),
        (name = "shop", description = "Shops and their observers"),
        (name = "catalog", description = "Shop catalogs"),
        (name = "book", description = "Books"),
        (name = "discount", description = "Discount strategies"),
        (name = "purchase", description = "Purchase transactions"),
        (name = "notification", description = "Customer notifications"),
    ),
    info(
        title = "Bookstore Backend API",
        version = "1.0.0",
        description = "Bookstore data access REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
