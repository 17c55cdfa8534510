use sea_orm::{ColumnTrait, Condition, Order, Set};

use crate::client::{Client, Delegates, FindArgs};
use crate::entities::{book_entity as books, catalog_entity as catalogs};
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct CatalogService {
    client: Client,
}

impl CatalogService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn create_catalog(&self, request: CreateCatalogRequest) -> AppResult<CatalogResponse> {
        let name = request.name.trim();
        if name.is_empty() || name.chars().count() > 200 {
            return Err(AppError::ValidationError(
                "Catalog name must be between 1 and 200 characters".to_string(),
            ));
        }
        self.client.shops().find_unique_or_throw(&request.shop_id).await?;

        let catalog = self
            .client
            .catalogs()
            .create(catalogs::ActiveModel {
                name: Set(name.to_string()),
                shop_id: Set(request.shop_id),
                ..Default::default()
            })
            .await?;
        log::info!("Catalog {} created in shop {}", catalog.id, catalog.shop_id);
        Ok(catalog.into())
    }

    pub async fn get_catalog(&self, catalog_id: &str) -> AppResult<CatalogResponse> {
        Ok(self
            .client
            .catalogs()
            .find_unique_or_throw(catalog_id)
            .await?
            .into())
    }

    /// Catalogs of a shop, each with its books.
    pub async fn list_for_shop(&self, shop_id: &str) -> AppResult<Vec<CatalogWithBooks>> {
        self.client.shops().find_unique_or_throw(shop_id).await?;
        let rows = self
            .client
            .catalogs()
            .find_many_with_many::<books::Entity>(
                FindArgs::new()
                    .filter(Condition::all().add(catalogs::Column::ShopId.eq(shop_id)))
                    .order_by(catalogs::Column::Name, Order::Asc),
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|(catalog, books)| CatalogWithBooks {
                catalog: catalog.into(),
                books: books.into_iter().map(BookResponse::from).collect(),
            })
            .collect())
    }

    /// Puts a book into a catalog of the same shop.
    pub async fn assign_book(&self, catalog_id: &str, book_id: &str) -> AppResult<BookResponse> {
        let catalog = self.client.catalogs().find_unique_or_throw(catalog_id).await?;
        let book = self.client.books().find_unique_or_throw(book_id).await?;
        if book.shop_id != catalog.shop_id {
            return Err(AppError::ValidationError(format!(
                "Book {book_id} belongs to shop {}, catalog {catalog_id} to shop {}",
                book.shop_id, catalog.shop_id
            )));
        }
        if book.catalog_id.as_deref() == Some(catalog_id) {
            return Ok(book.into());
        }
        let updated = self
            .client
            .books()
            .update(
                book_id,
                books::ActiveModel {
                    catalog_id: Set(Some(catalog_id.to_string())),
                    ..Default::default()
                },
            )
            .await?;
        log::info!("Book {book_id} assigned to catalog {catalog_id}");
        Ok(updated.into())
    }

    pub async fn unassign_book(&self, catalog_id: &str, book_id: &str) -> AppResult<BookResponse> {
        let book = self.client.books().find_unique_or_throw(book_id).await?;
        if book.catalog_id.as_deref() != Some(catalog_id) {
            return Err(AppError::ValidationError(format!(
                "Book {book_id} is not in catalog {catalog_id}"
            )));
        }
        let updated = self
            .client
            .books()
            .update(
                book_id,
                books::ActiveModel {
                    catalog_id: Set(None),
                    ..Default::default()
                },
            )
            .await?;
        log::info!("Book {book_id} removed from catalog {catalog_id}");
        Ok(updated.into())
    }

    pub async fn list_books(&self, catalog_id: &str) -> AppResult<Vec<BookResponse>> {
        self.client.catalogs().find_unique_or_throw(catalog_id).await?;
        let books = self
            .client
            .books()
            .find_many(
                FindArgs::new().filter(Condition::all().add(books::Column::CatalogId.eq(catalog_id))),
            )
            .await?;
        Ok(books.into_iter().map(BookResponse::from).collect())
    }

    /// Deletes the catalog; its books stay in the shop without a catalog.
    pub async fn delete_catalog(&self, catalog_id: &str) -> AppResult<CatalogResponse> {
        let deleted = self.client.catalogs().delete(catalog_id).await?;
        log::info!("Catalog {catalog_id} deleted");
        Ok(deleted.into())
    }
}
