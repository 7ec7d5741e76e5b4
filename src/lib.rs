pub mod app;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod middleware;
pub mod pagination;
pub mod testing;
pub mod validation;

pub use app::{app, AppState};
