use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, DatabaseBackend, Order, Set};

use crate::client::{Client, Delegates, FindArgs};
use crate::entities::{StringList, book_entity as books, transaction_entity as transactions};
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct BookService {
    client: Client,
}

fn require_text(field: &str, value: &str, max: usize) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trimmed, de-duplicated genre list; blank entries are dropped.
fn normalize_genres(genres: &[String]) -> StringList {
    let mut list = StringList::default();
    for genre in genres {
        let genre = genre.trim().to_lowercase();
        if !genre.is_empty() {
            list.insert(&genre);
        }
    }
    list
}

/// Matches books whose JSON `genre` array contains `genre`.
///
/// Postgres uses jsonb containment. Other backends match the quoted element
/// in the stored JSON text, which is exact because genres are normalised
/// before they are written.
fn genre_condition(backend: DatabaseBackend, genre: &str) -> SimpleExpr {
    let genre = genre.trim().to_lowercase();
    match backend {
        DatabaseBackend::Postgres => {
            let needle = serde_json::json!([genre]).to_string();
            Expr::cust_with_values("\"books\".\"genre\"::jsonb @> ?::jsonb", [needle])
        }
        DatabaseBackend::MySql | DatabaseBackend::Sqlite => {
            let element = serde_json::Value::String(genre).to_string();
            let escaped = element
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            Expr::col((books::Entity, books::Column::Genre))
                .like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
        }
    }
}

impl BookService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn create_book(&self, request: CreateBookRequest) -> AppResult<BookResponse> {
        let abstraction = require_text("abstraction", &request.abstraction, 10_000)?;
        let file_url = require_text("file_url", &request.file_url, 2048)?;
        let image_url = require_text("image_url", &request.image_url, 2048)?;

        self.client.shops().find_unique_or_throw(&request.shop_id).await?;
        self.client
            .discount_strategies()
            .find_unique_or_throw(&request.discount_strategy_id)
            .await?;
        if let Some(catalog_id) = &request.catalog_id {
            let catalog = self.client.catalogs().find_unique_or_throw(catalog_id).await?;
            if catalog.shop_id != request.shop_id {
                return Err(AppError::ValidationError(format!(
                    "Catalog {catalog_id} does not belong to shop {}",
                    request.shop_id
                )));
            }
        }

        let book = self
            .client
            .books()
            .create(books::ActiveModel {
                abstraction: Set(abstraction),
                file_url: Set(file_url),
                image_url: Set(image_url),
                genre: Set(normalize_genres(&request.genre)),
                discount_strategy_id: Set(request.discount_strategy_id),
                shop_id: Set(request.shop_id),
                catalog_id: Set(request.catalog_id),
                ..Default::default()
            })
            .await?;
        log::info!("Book {} created in shop {}", book.id, book.shop_id);
        Ok(book.into())
    }

    pub async fn get_book(&self, book_id: &str) -> AppResult<BookResponse> {
        Ok(self.client.books().find_unique_or_throw(book_id).await?.into())
    }

    pub async fn list_books(&self, query: &BookQuery) -> AppResult<PaginatedResponse<BookResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut filter = Condition::all().add(books::Column::ShopId.eq(query.shop_id.as_str()));
        if let Some(genre) = query.genre.as_deref().filter(|g| !g.trim().is_empty()) {
            let backend = self.client.connection().get_database_backend();
            filter = filter.add(genre_condition(backend, genre));
        }

        let total = self.client.books().count(filter.clone()).await?;
        let books = self
            .client
            .books()
            .find_many(
                FindArgs::new()
                    .filter(filter)
                    .order_by(books::Column::Id, Order::Asc)
                    .skip(params.get_offset())
                    .take(params.get_limit()),
            )
            .await?;
        Ok(PaginatedResponse::new(
            books.into_iter().map(BookResponse::from).collect(),
            &params,
            total,
        ))
    }

    pub async fn update_book(&self, book_id: &str, request: UpdateBookRequest) -> AppResult<BookResponse> {
        let mut model = books::ActiveModel::default();
        let mut touched = false;
        if let Some(v) = &request.abstraction {
            model.abstraction = Set(require_text("abstraction", v, 10_000)?);
            touched = true;
        }
        if let Some(v) = &request.file_url {
            model.file_url = Set(require_text("file_url", v, 2048)?);
            touched = true;
        }
        if let Some(v) = &request.image_url {
            model.image_url = Set(require_text("image_url", v, 2048)?);
            touched = true;
        }
        if let Some(v) = &request.genre {
            model.genre = Set(normalize_genres(v));
            touched = true;
        }
        if !touched {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let updated = self.client.books().update(book_id, model).await?;
        log::info!("Book {book_id} updated");
        Ok(updated.into())
    }

    pub async fn change_strategy(&self, book_id: &str, strategy_id: &str) -> AppResult<BookResponse> {
        self.client
            .discount_strategies()
            .find_unique_or_throw(strategy_id)
            .await?;
        let updated = self
            .client
            .books()
            .update(
                book_id,
                books::ActiveModel {
                    discount_strategy_id: Set(strategy_id.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        log::info!("Book {book_id} now uses discount strategy {strategy_id}");
        Ok(updated.into())
    }

    /// Deletes a book that was never purchased.
    pub async fn delete_book(&self, book_id: &str) -> AppResult<BookResponse> {
        let purchases = self
            .client
            .transactions()
            .count(Condition::all().add(transactions::Column::BookId.eq(book_id)))
            .await?;
        if purchases > 0 {
            return Err(AppError::Conflict(format!(
                "Book {book_id} has {purchases} purchases and cannot be deleted"
            )));
        }
        let deleted = self.client.books().delete(book_id).await?;
        log::info!("Book {book_id} deleted");
        Ok(deleted.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{catalog_entity, discount_strategy_entity, shop_entity, DiscountType};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn request() -> CreateBookRequest {
        CreateBookRequest {
            abstraction: "A tale".to_string(),
            file_url: "https://cdn.example.com/b.pdf".to_string(),
            image_url: "https://cdn.example.com/b.jpg".to_string(),
            genre: vec!["Fantasy".into(), " fantasy ".into(), "".into()],
            discount_strategy_id: "d1".to_string(),
            shop_id: "s1".to_string(),
            catalog_id: Some("cat1".to_string()),
        }
    }

    fn shop() -> shop_entity::Model {
        shop_entity::Model {
            id: "s1".to_string(),
            name: "Riverside".to_string(),
            observer_ids: StringList::default(),
        }
    }

    fn strategy() -> discount_strategy_entity::Model {
        discount_strategy_entity::Model {
            id: "d1".to_string(),
            strategy_type: DiscountType::None,
            amount: None,
            percent: None,
        }
    }

    fn books_where(backend: DatabaseBackend, genre: &str) -> (String, Vec<Value>) {
        use sea_orm::{EntityTrait, QueryFilter, QueryTrait};
        let stmt = books::Entity::find()
            .filter(genre_condition(backend, genre))
            .build(backend);
        (stmt.sql, stmt.values.map(|v| v.0).unwrap_or_default())
    }

    #[test]
    fn test_genre_condition_per_backend() {
        let (sql, values) = books_where(DatabaseBackend::Postgres, " Fantasy ");
        assert!(sql.contains(r#""books"."genre"::jsonb @> $1::jsonb"#), "{sql}");
        assert_eq!(values, vec![Value::from(r#"["fantasy"]"#)]);

        let (sql, values) = books_where(DatabaseBackend::Sqlite, "sci_fi");
        assert!(sql.contains(r#""books"."genre" LIKE ?"#), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert_eq!(values, vec![Value::from(r#"%"sci\_fi"%"#)]);
    }

    #[tokio::test]
    async fn test_list_books_by_genre_on_postgres() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(0)))])]])
            .append_query_results([Vec::<books::Model>::new()])
            .into_connection();
        let client = Client::new(db);
        let service = BookService::new(client.clone());

        let page = service
            .list_books(&BookQuery {
                shop_id: "s1".to_string(),
                genre: Some("Poetry".to_string()),
                page: None,
                page_size: None,
            })
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        let sql = client.take_sql();
        assert!(sql.iter().all(|s| s.contains("::jsonb @>")));
    }

    #[test]
    fn test_normalize_genres() {
        let genres = normalize_genres(&["Poetry".into(), "poetry".into(), " ".into(), "Drama".into()]);
        assert_eq!(genres, StringList(vec!["poetry".into(), "drama".into()]));
    }

    #[tokio::test]
    async fn test_create_book_rejects_catalog_of_other_shop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop()]])
            .append_query_results([vec![strategy()]])
            .append_query_results([vec![catalog_entity::Model {
                id: "cat1".to_string(),
                name: "Other".to_string(),
                shop_id: "s2".to_string(),
            }]])
            .into_connection();
        let service = BookService::new(Client::new(db));

        let err = service.create_book(request()).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_book_requires_strategy() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![shop()]])
            .append_query_results([Vec::<discount_strategy_entity::Model>::new()])
            .into_connection();
        let service = BookService::new(Client::new(db));

        let err = service.create_book(request()).await.unwrap_err();
        match err {
            AppError::NotFound(msg) => assert!(msg.starts_with("DiscountStrategy d1")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_without_fields_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = BookService::new(Client::new(db));

        let err = service
            .update_book("b1", UpdateBookRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_delete_purchased_book_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(3)))])]])
            .into_connection();
        let service = BookService::new(Client::new(db));

        let err = service.delete_book("b1").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
