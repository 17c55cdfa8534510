pub mod book_service;
pub mod catalog_service;
pub mod discount_strategy_service;
pub mod notification_service;
pub mod purchase_service;
pub mod shop_service;
pub mod user_service;

pub use book_service::*;
pub use catalog_service::*;
pub use discount_strategy_service::*;
pub use notification_service::*;
pub use purchase_service::*;
pub use shop_service::*;
pub use user_service::*;
