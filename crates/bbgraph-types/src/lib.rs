pub mod api;
pub mod models;
pub mod settings;
pub mod store;
