pub mod book;
pub mod catalog;
pub mod discount_strategy;
pub mod notification;
pub mod purchase;
pub mod shop;
pub mod user;

pub use book::book_config;
pub use catalog::catalog_config;
pub use discount_strategy::discount_strategy_config;
pub use notification::notification_config;
pub use purchase::purchase_config;
pub use shop::shop_config;
pub use user::user_config;
