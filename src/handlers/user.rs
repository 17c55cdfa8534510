use actix_web::{web, HttpResponse, Result, ResponseError};
use crate::models::*;
use crate::services::UserService;

#[utoipa::path(
    post,
    path = "/users",
    tag = "user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid email, name, phone or password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    user_service: web::Data<UserService>,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    match user_service.create_user(request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Created().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    params(UserQuery),
    responses(
        (status = 200, description = "Paginated users")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    query: web::Query<UserQuery>,
) -> Result<HttpResponse> {
    match user_service.list_users(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "user",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User with its role profile", body = UserDetailResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match user_service.get_user(&path.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "user",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Role change blocked by an existing profile")
    )
)]
pub async fn update_user(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    match user_service
        .update_user(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "user",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User and role profile deleted", body = UserResponse),
        (status = 404, description = "User not found"),
        (status = 409, description = "Customer has recorded purchases")
    )
)]
pub async fn delete_user(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match user_service.delete_user(&path.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/{id}/profile",
    tag = "user",
    params(("id" = String, Path, description = "User id")),
    request_body = ProfileRequest,
    responses(
        (status = 201, description = "Profile attached", body = ProfileResponse),
        (status = 400, description = "Profile kind does not match the role"),
        (status = 409, description = "User already has a profile, or the shop already has a seller")
    )
)]
pub async fn attach_profile(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    request: web::Json<ProfileRequest>,
) -> Result<HttpResponse> {
    match user_service
        .attach_profile(&path.into_inner(), request.into_inner())
        .await
    {
        Ok(profile) => Ok(HttpResponse::Created().json(ApiResponse::success(profile))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/users/verify",
    tag = "user",
    request_body = VerifyCredentialsRequest,
    responses(
        (status = 200, description = "Credentials valid", body = UserResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn verify_credentials(
    user_service: web::Data<UserService>,
    request: web::Json<VerifyCredentialsRequest>,
) -> Result<HttpResponse> {
    match user_service.verify_credentials(request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/users/stats/roles",
    tag = "user",
    responses(
        (status = 200, description = "Number of users per role", body = [RoleCount])
    )
)]
pub async fn role_counts(user_service: web::Data<UserService>) -> Result<HttpResponse> {
    match user_service.role_counts().await {
        Ok(counts) => Ok(HttpResponse::Ok().json(ApiResponse::success(counts))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("", web::post().to(create_user))
            .route("", web::get().to(list_users))
            .route("/verify", web::post().to(verify_credentials))
            .route("/stats/roles", web::get().to(role_counts))
            .route("/{id}", web::get().to(get_user))
            .route("/{id}", web::put().to(update_user))
            .route("/{id}", web::delete().to(delete_user))
            .route("/{id}/profile", web::post().to(attach_profile)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::config::SecurityConfig;
    use actix_web::{App, http::StatusCode, test};
    use crate::entities::user_entity;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    #[actix_web::test]
    async fn test_create_user_with_weak_password_is_bad_request() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = UserService::new(Client::new(db), &SecurityConfig { bcrypt_cost: 4 });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(user_config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(serde_json::json!({
                "email": "reader@example.com",
                "name": "Reader",
                "password": "short",
                "phone_number": "+12345678901",
                "role": "customer"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_list_users_with_huge_page_returns_empty_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(3)))])]])
            .append_query_results([Vec::<user_entity::Model>::new()])
            .into_connection();
        let service = UserService::new(Client::new(db), &SecurityConfig { bcrypt_cost: 4 });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .configure(user_config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/users?page=18446744073709551615")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["total"], 3);
        assert_eq!(body["data"]["items"], serde_json::json!([]));
    }
}
