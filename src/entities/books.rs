use super::StringList;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub abstraction: String,
    pub file_url: String,
    pub image_url: String,
    #[sea_orm(column_type = "Json")]
    pub genre: StringList,
    pub discount_strategy_id: String,
    pub shop_id: String,
    pub catalog_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::discount_strategies::Entity",
        from = "Column::DiscountStrategyId",
        to = "super::discount_strategies::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    DiscountStrategy,
    #[sea_orm(
        belongs_to = "super::shops::Entity",
        from = "Column::ShopId",
        to = "super::shops::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Shop,
    #[sea_orm(
        belongs_to = "super::catalogs::Entity",
        from = "Column::CatalogId",
        to = "super::catalogs::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Catalog,
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::discount_strategies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiscountStrategy.def()
    }
}

impl Related<super::shops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl Related<super::catalogs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Catalog.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl super::Identifiable for Entity {
    type ActiveModel = ActiveModel;

    const MODEL: &'static str = "Book";

    fn id_column() -> Column {
        Column::Id
    }
}
