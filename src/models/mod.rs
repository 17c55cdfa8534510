pub mod book;
pub mod catalog;
pub mod common;
pub mod discount_strategy;
pub mod notification;
pub mod pagination;
pub mod purchase;
pub mod shop;
pub mod user;

pub use book::*;
pub use catalog::*;
pub use common::*;
pub use discount_strategy::*;
pub use notification::*;
pub use pagination::*;
pub use purchase::*;
pub use shop::*;
pub use user::*;
