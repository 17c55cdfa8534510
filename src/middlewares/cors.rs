use actix_cors::Cors;

/// CORS for the admin front end. Origins are open; restrict them behind a proxy in production.
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
