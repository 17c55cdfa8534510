pub mod connection;

pub use connection::{connect, run_migrations};
