use chrono::Utc;
use sea_orm::{ColumnTrait, Condition, Order, Set};

use crate::client::{AggregateArgs, Client, Delegates, FindArgs, GroupByArgs};
use crate::config::SecurityConfig;
use crate::entities::{
    Role, StringList, admin_entity as admins, customer_entity as customers,
    notification_entity as notifications, seller_entity as sellers, shop_entity as shops,
    transaction_entity as transactions, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{hash_password, normalize_email, validate_email, validate_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    client: Client,
    bcrypt_cost: u32,
}

fn validate_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(AppError::ValidationError(
            "Name must be between 1 and 100 characters".to_string(),
        ));
    }
    Ok(name.to_string())
}

fn validate_phone(phone: &str) -> AppResult<String> {
    let phone = phone.trim();
    if phone.is_empty() || phone.len() > 32 {
        return Err(AppError::ValidationError(
            "Phone number must be between 1 and 32 characters".to_string(),
        ));
    }
    Ok(phone.to_string())
}

fn by_user(column: impl ColumnTrait, user_id: &str) -> Condition {
    Condition::all().add(column.eq(user_id))
}

/// Profile currently attached to `user_id`, looked up by the kind its role allows.
async fn find_profile<D: Delegates>(
    db: &D,
    user_id: &str,
    role: Role,
) -> AppResult<Option<ProfileResponse>> {
    let profile = match role {
        Role::Seller => db
            .sellers()
            .find_first(FindArgs::new().filter(by_user(sellers::Column::UserId, user_id)))
            .await?
            .map(ProfileResponse::from),
        Role::Customer => db
            .customers()
            .find_first(FindArgs::new().filter(by_user(customers::Column::UserId, user_id)))
            .await?
            .map(ProfileResponse::from),
        Role::Admin => db
            .admins()
            .find_first(FindArgs::new().filter(by_user(admins::Column::UserId, user_id)))
            .await?
            .map(ProfileResponse::from),
        Role::ContentReviewer | Role::FinanceStaff => None,
    };
    Ok(profile)
}

/// Number of profiles of any kind held by `user_id`.
async fn count_profiles<D: Delegates>(db: &D, user_id: &str) -> AppResult<u64> {
    let sellers = db
        .sellers()
        .count(by_user(sellers::Column::UserId, user_id))
        .await?;
    let customers = db
        .customers()
        .count(by_user(customers::Column::UserId, user_id))
        .await?;
    let admins = db
        .admins()
        .count(by_user(admins::Column::UserId, user_id))
        .await?;
    Ok(sellers + customers + admins)
}

async fn attach_profile_in<D: Delegates>(
    db: &D,
    user_id: &str,
    request: ProfileRequest,
) -> AppResult<ProfileResponse> {
    let user = db.users().lock_unique(user_id).await?;

    if request.role() != user.role {
        return Err(AppError::ValidationError(format!(
            "A {} user cannot carry a {} profile",
            user.role,
            request.role()
        )));
    }
    if count_profiles(db, user_id).await? > 0 {
        return Err(AppError::Conflict(format!(
            "User {user_id} already has a profile"
        )));
    }

    let profile = match request {
        ProfileRequest::Seller { shop_id } => {
            db.shops().find_unique_or_throw(&shop_id).await?;
            let taken = db
                .sellers()
                .count(Condition::all().add(sellers::Column::ShopId.eq(shop_id.as_str())))
                .await?;
            if taken > 0 {
                return Err(AppError::Conflict(format!(
                    "Shop {shop_id} already has a seller"
                )));
            }
            db.sellers()
                .create(sellers::ActiveModel {
                    shop_id: Set(shop_id),
                    user_id: Set(user_id.to_string()),
                    ..Default::default()
                })
                .await?
                .into()
        }
        ProfileRequest::Customer => db
            .customers()
            .create(customers::ActiveModel {
                user_id: Set(user_id.to_string()),
                shop_ids: Set(StringList::default()),
                ..Default::default()
            })
            .await?
            .into(),
        ProfileRequest::Admin => db
            .admins()
            .create(admins::ActiveModel {
                user_id: Set(user_id.to_string()),
                ..Default::default()
            })
            .await?
            .into(),
    };
    Ok(profile)
}

/// Fields of a validated [`UpdateUserRequest`].
struct UserChanges {
    name: Option<String>,
    phone_number: Option<String>,
    status: Option<bool>,
    role: Option<Role>,
}

impl UserChanges {
    fn validate(request: UpdateUserRequest) -> AppResult<Self> {
        if request.name.is_none()
            && request.phone_number.is_none()
            && request.status.is_none()
            && request.role.is_none()
        {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }
        Ok(Self {
            name: request.name.as_deref().map(validate_name).transpose()?,
            phone_number: request.phone_number.as_deref().map(validate_phone).transpose()?,
            status: request.status,
            role: request.role,
        })
    }
}

async fn update_user_in<D: Delegates>(
    db: &D,
    user_id: &str,
    changes: UserChanges,
) -> AppResult<users::Model> {
    // Same row lock as attach_profile_in, so a profile cannot appear between
    // the check below and the role write.
    let user = db.users().lock_unique(user_id).await?;
    let mut model = users::ActiveModel::default();

    if let Some(name) = changes.name {
        model.name = Set(name);
    }
    if let Some(phone) = changes.phone_number {
        model.phone_number = Set(phone);
    }
    if let Some(status) = changes.status {
        model.status = Set(status);
    }
    if let Some(role) = changes.role
        && role != user.role
    {
        if count_profiles(db, user_id).await? > 0 {
            return Err(AppError::Conflict(format!(
                "User {user_id} still holds a {} profile; delete it before changing role",
                user.role
            )));
        }
        model.role = Set(role);
    }
    model.updated_at = Set(Utc::now());

    db.users().update(user_id, model).await
}

async fn delete_user_in<D: Delegates>(db: &D, user_id: &str) -> AppResult<users::Model> {
    db.users().lock_unique(user_id).await?;

    db.sellers()
        .delete_many(by_user(sellers::Column::UserId, user_id))
        .await?;
    db.admins()
        .delete_many(by_user(admins::Column::UserId, user_id))
        .await?;

    // Customer before shops, matching observe/unobserve.
    let customer = db
        .customers()
        .find_first(
            FindArgs::new()
                .filter(by_user(customers::Column::UserId, user_id))
                .for_update(),
        )
        .await?;
    if let Some(customer) = customer {
        let purchases = db
            .transactions()
            .count(Condition::all().add(transactions::Column::CustomerId.eq(customer.id.as_str())))
            .await?;
        if purchases > 0 {
            return Err(AppError::Conflict(format!(
                "User {user_id} has {purchases} recorded purchases and cannot be deleted"
            )));
        }
        for shop_id in customer.shop_ids.iter() {
            let shop = db
                .shops()
                .find_first(
                    FindArgs::new()
                        .filter(Condition::all().add(shops::Column::Id.eq(shop_id.as_str())))
                        .for_update(),
                )
                .await?;
            let Some(shop) = shop else {
                log::warn!("Customer {} observes missing shop {shop_id}", customer.id);
                continue;
            };
            let mut observers = shop.observer_ids;
            if observers.remove(&customer.id) {
                db.shops()
                    .update(
                        &shop.id,
                        shops::ActiveModel {
                            observer_ids: Set(observers),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
        }
        db.notifications()
            .delete_many(
                Condition::all().add(notifications::Column::CustomerId.eq(customer.id.as_str())),
            )
            .await?;
        db.customers().delete(&customer.id).await?;
    }

    db.users().delete(user_id).await
}

impl UserService {
    pub fn new(client: Client, security: &SecurityConfig) -> Self {
        Self {
            client,
            bcrypt_cost: security.bcrypt_cost,
        }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> AppResult<UserResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        let name = validate_name(&request.name)?;
        let phone_number = validate_phone(&request.phone_number)?;
        validate_password(&request.password)?;

        let existing = self
            .client
            .users()
            .find_first(FindArgs::new().filter(Condition::all().add(users::Column::Email.eq(email.as_str()))))
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!("Email {email} is already registered")));
        }

        let password = hash_password(&request.password, self.bcrypt_cost)?;
        let now = Utc::now();
        let user = self
            .client
            .users()
            .create(users::ActiveModel {
                email: Set(email),
                name: Set(name),
                password: Set(password),
                phone_number: Set(phone_number),
                status: Set(true),
                role: Set(request.role),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .await?;

        log::info!("User {} created with role {}", user.id, user.role);
        Ok(user.into())
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<UserDetailResponse> {
        let user = self.client.users().find_unique_or_throw(user_id).await?;
        let profile = find_profile(&self.client, &user.id, user.role).await?;
        Ok(UserDetailResponse {
            user: user.into(),
            profile,
        })
    }

    pub async fn list_users(&self, query: &UserQuery) -> AppResult<PaginatedResponse<UserResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut filter = Condition::all();
        if let Some(role) = query.role {
            filter = filter.add(users::Column::Role.eq(role));
        }

        let total = self.client.users().count(filter.clone()).await?;
        let users = self
            .client
            .users()
            .find_many(
                FindArgs::new()
                    .filter(filter)
                    .order_by(users::Column::CreatedAt, Order::Desc)
                    .skip(params.get_offset())
                    .take(params.get_limit()),
            )
            .await?;

        Ok(PaginatedResponse::new(
            users.into_iter().map(UserResponse::from).collect(),
            &params,
            total,
        ))
    }

    /// Updates the editable fields. A role change is refused while the user
    /// holds any role profile.
    pub async fn update_user(
        &self,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        let changes = UserChanges::validate(request)?;
        let id = user_id.to_string();
        let updated = self
            .client
            .transaction_serializable(move |tx| {
                Box::pin(async move { update_user_in(&tx, &id, changes).await })
            })
            .await?;
        log::info!("User {user_id} updated");
        Ok(updated.into())
    }

    /// Deletes the user together with its role profile.
    pub async fn delete_user(&self, user_id: &str) -> AppResult<UserResponse> {
        let id = user_id.to_string();
        let deleted = self
            .client
            .transaction(move |tx| Box::pin(async move { delete_user_in(&tx, &id).await }))
            .await?;
        log::info!("User {} deleted", deleted.id);
        Ok(deleted.into())
    }

    pub async fn verify_credentials(
        &self,
        request: VerifyCredentialsRequest,
    ) -> AppResult<UserResponse> {
        let email = normalize_email(&request.email);
        let user = self
            .client
            .users()
            .find_first(FindArgs::new().filter(Condition::all().add(users::Column::Email.eq(email.as_str()))))
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password)? {
            log::warn!("Failed credential check for user {}", user.id);
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }
        if !user.status {
            return Err(AppError::AuthError("Account is disabled".to_string()));
        }
        Ok(user.into())
    }

    pub async fn role_counts(&self) -> AppResult<Vec<RoleCount>> {
        let rows = self
            .client
            .users()
            .group_by(
                GroupByArgs::new(vec![users::Column::Role])
                    .aggregates(AggregateArgs::new().count())
                    .order_by(users::Column::Role, Order::Asc),
            )
            .await?;

        Ok(rows
            .iter()
            .map(|row| RoleCount {
                role: row.key_str("role").unwrap_or_default().to_string(),
                count: row.aggregates.count.unwrap_or(0),
            })
            .collect())
    }

    /// Creates the role profile matching the user's role.
    pub async fn attach_profile(
        &self,
        user_id: &str,
        request: ProfileRequest,
    ) -> AppResult<ProfileResponse> {
        let id = user_id.to_string();
        let profile = self
            .client
            .transaction_serializable(move |tx| {
                Box::pin(async move { attach_profile_in(&tx, &id, request).await })
            })
            .await?;
        log::info!("Profile {} attached to user {user_id}", profile.id());
        Ok(profile)
    }
}
