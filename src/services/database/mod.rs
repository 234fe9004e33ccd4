// Schedule database
// SQLite connection, appointments table and additive column migrations

mod connection;
pub mod migrations;
mod schema;

pub use connection::Database;
