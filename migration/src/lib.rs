pub use sea_orm_migration::prelude::*;

mod m20241101_000001_create_base_tables;
mod m20241101_000002_create_role_profiles;
mod m20241101_000003_create_books_and_activity;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241101_000001_create_base_tables::Migration),
            Box::new(m20241101_000002_create_role_profiles::Migration),
            Box::new(m20241101_000003_create_books_and_activity::Migration),
        ]
    }
}
