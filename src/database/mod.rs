pub mod catalog_store;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod schema;
pub mod user_store;

pub use catalog_store::PgCatalogStore;
pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{CatalogStore, Repository};
pub use user_store::{list_users, PgUserStore, UserStore};
