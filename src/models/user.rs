use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{Role, admin_entity, customer_entity, seller_entity, user_entity};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "reader@example.com")]
    pub email: String,
    #[schema(example = "Ada Reader")]
    pub name: String,
    #[schema(example = "Password123")]
    pub password: String,
    #[schema(example = "+12345678901")]
    pub phone_number: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub status: Option<bool>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct UserQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyCredentialsRequest {
    #[schema(example = "reader@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub status: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(m: user_entity::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            phone_number: m.phone_number,
            status: m.status,
            role: m.role,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Role profile to attach to an existing user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileRequest {
    Seller { shop_id: String },
    Customer,
    Admin,
}

impl ProfileRequest {
    /// The only role allowed to carry this profile.
    pub fn role(&self) -> Role {
        match self {
            ProfileRequest::Seller { .. } => Role::Seller,
            ProfileRequest::Customer => Role::Customer,
            ProfileRequest::Admin => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileResponse {
    Seller {
        id: String,
        user_id: String,
        shop_id: String,
    },
    Customer {
        id: String,
        user_id: String,
        shop_ids: Vec<String>,
    },
    Admin {
        id: String,
        user_id: String,
    },
}

impl ProfileResponse {
    pub fn id(&self) -> &str {
        match self {
            ProfileResponse::Seller { id, .. }
            | ProfileResponse::Customer { id, .. }
            | ProfileResponse::Admin { id, .. } => id,
        }
    }
}

impl From<seller_entity::Model> for ProfileResponse {
    fn from(m: seller_entity::Model) -> Self {
        ProfileResponse::Seller {
            id: m.id,
            user_id: m.user_id,
            shop_id: m.shop_id,
        }
    }
}

impl From<customer_entity::Model> for ProfileResponse {
    fn from(m: customer_entity::Model) -> Self {
        ProfileResponse::Customer {
            id: m.id,
            user_id: m.user_id,
            shop_ids: m.shop_ids.0,
        }
    }
}

impl From<admin_entity::Model> for ProfileResponse {
    fn from(m: admin_entity::Model) -> Self {
        ProfileResponse::Admin {
            id: m.id,
            user_id: m.user_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDetailResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub profile: Option<ProfileResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}
