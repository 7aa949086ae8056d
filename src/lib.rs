pub mod app;
pub mod config;
pub mod executor;
pub mod feed;
pub mod http;
pub mod inventory;
pub mod retention;
pub mod version;
