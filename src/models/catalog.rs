use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::catalog_entity;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCatalogRequest {
    pub shop_id: String,
    #[schema(example = "Autumn picks")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogResponse {
    pub id: String,
    pub name: String,
    pub shop_id: String,
}

impl From<catalog_entity::Model> for CatalogResponse {
    fn from(m: catalog_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            shop_id: m.shop_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogWithBooks {
    #[serde(flatten)]
    pub catalog: CatalogResponse,
    pub books: Vec<super::BookResponse>,
}

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct ShopIdQuery {
    pub shop_id: String,
}
