pub mod admins;
pub mod books;
pub mod catalogs;
pub mod customers;
pub mod discount_strategies;
pub mod notifications;
pub mod sellers;
pub mod shops;
pub mod string_list;
pub mod transactions;
pub mod users;

pub use admins as admin_entity;
pub use books as book_entity;
pub use catalogs as catalog_entity;
pub use customers as customer_entity;
pub use discount_strategies as discount_strategy_entity;
pub use notifications as notification_entity;
pub use sellers as seller_entity;
pub use shops as shop_entity;
pub use transactions as transaction_entity;
pub use users as user_entity;

pub use discount_strategies::DiscountType;
pub use string_list::StringList;
pub use users::Role;

use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait};

/// Entities addressed by a single string `id` column.
///
/// Every model in the schema uses an application-generated string id, which
/// lets the generic delegate filter, update and delete by id without going
/// through `PrimaryKeyTrait::ValueType` conversions.
pub trait Identifiable: EntityTrait {
    /// Model name used in error messages and logs.
    const MODEL: &'static str;

    type ActiveModel: ActiveModelTrait<Entity = Self>
        + ActiveModelBehavior
        + From<Self::Model>
        + Send
        + Sync;

    fn id_column() -> Self::Column;
}
