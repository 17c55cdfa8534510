use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::book_entity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBookRequest {
    pub abstraction: String,
    #[schema(example = "https://cdn.example.com/books/1.pdf")]
    pub file_url: String,
    #[schema(example = "https://cdn.example.com/books/1.jpg")]
    pub image_url: String,
    #[serde(default)]
    pub genre: Vec<String>,
    pub discount_strategy_id: String,
    pub shop_id: String,
    pub catalog_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
    pub abstraction: Option<String>,
    pub file_url: Option<String>,
    pub image_url: Option<String>,
    pub genre: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangeStrategyRequest {
    pub discount_strategy_id: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct BookQuery {
    pub shop_id: String,
    pub genre: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: String,
    pub abstraction: String,
    pub file_url: String,
    pub image_url: String,
    pub genre: Vec<String>,
    pub discount_strategy_id: String,
    pub shop_id: String,
    pub catalog_id: Option<String>,
}

impl From<book_entity::Model> for BookResponse {
    fn from(m: book_entity::Model) -> Self {
        Self {
            id: m.id,
            abstraction: m.abstraction,
            file_url: m.file_url,
            image_url: m.image_url,
            genre: m.genre.0,
            discount_strategy_id: m.discount_strategy_id,
            shop_id: m.shop_id,
            catalog_id: m.catalog_id,
        }
    }
}
