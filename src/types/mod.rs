pub mod api;
pub mod error;
pub mod info_json;
pub mod models;
pub mod version;
