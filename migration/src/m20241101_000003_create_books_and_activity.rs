use sea_orm_migration::prelude::*;

use crate::m20241101_000001_create_base_tables::{Catalogs, DiscountStrategies, Shops};
use crate::m20241101_000002_create_role_profiles::Customers;

#[derive(DeriveIden)]
enum Books {
    Table,
    Id,
    Abstraction,
    FileUrl,
    ImageUrl,
    Genre,
    DiscountStrategyId,
    ShopId,
    CatalogId,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    BookId,
    CustomerId,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    Content,
    Status,
    Timestamp,
    CustomerId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Books::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Books::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Books::Abstraction).text().not_null())
                    .col(ColumnDef::new(Books::FileUrl).string().not_null())
                    .col(ColumnDef::new(Books::ImageUrl).string().not_null())
                    .col(ColumnDef::new(Books::Genre).json().not_null())
                    .col(
                        ColumnDef::new(Books::DiscountStrategyId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Books::ShopId).string_len(36).not_null())
                    .col(ColumnDef::new(Books::CatalogId).string_len(36).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_discount_strategy")
                            .from(Books::Table, Books::DiscountStrategyId)
                            .to(DiscountStrategies::Table, DiscountStrategies::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_shop")
                            .from(Books::Table, Books::ShopId)
                            .to(Shops::Table, Shops::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_books_catalog")
                            .from(Books::Table, Books::CatalogId)
                            .to(Catalogs::Table, Catalogs::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_books_shop_id")
                    .table(Books::Table)
                    .col(Books::ShopId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::BookId).string_len(36).not_null())
                    .col(
                        ColumnDef::new(Transactions::CustomerId)
                            .string_len(36)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_book")
                            .from(Transactions::Table, Transactions::BookId)
                            .to(Books::Table, Books::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_customer")
                            .from(Transactions::Table, Transactions::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::Content).text().not_null())
                    .col(
                        ColumnDef::new(Notifications::Status)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Notifications::CustomerId)
                            .string_len(36)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_customer")
                            .from(Notifications::Table, Notifications::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // (customer_id, status) backs the unread listing
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_notifications_customer_status")
                    .table(Notifications::Table)
                    .col(Notifications::CustomerId)
                    .col(Notifications::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Books::Table).to_owned())
            .await?;
        Ok(())
    }
}
