use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;

use bookstore_backend::{
    client::Client,
    config::Config,
    database::{connect, run_migrations},
    handlers,
    middlewares::create_cors,
    services::*,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().context("failed to load configuration")?;

    let conn = connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    run_migrations(&conn)
        .await
        .context("failed to run database migrations")?;

    let client = Client::new(conn);

    let user_service = UserService::new(client.clone(), &config.security);
    let shop_service = ShopService::new(client.clone());
    let catalog_service = CatalogService::new(client.clone());
    let book_service = BookService::new(client.clone());
    let discount_strategy_service = DiscountStrategyService::new(client.clone());
    let purchase_service = PurchaseService::new(client.clone());
    let notification_service = NotificationService::new(client);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(user_service.clone()))
            .app_data(web::Data::new(shop_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(book_service.clone()))
            .app_data(web::Data::new(discount_strategy_service.clone()))
            .app_data(web::Data::new(purchase_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::user_config)
                    .configure(handlers::shop_config)
                    .configure(handlers::catalog_config)
                    .configure(handlers::book_config)
                    .configure(handlers::discount_strategy_config)
                    .configure(handlers::purchase_config)
                    .configure(handlers::notification_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
