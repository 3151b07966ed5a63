use actix_web::web;

use crate::types::api;

pub mod health;
pub mod mods;
pub mod portal;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(api::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(api::query_error_handler))
        .service(portal::list)
        .service(portal::info)
        .service(portal::install)
        .service(portal::install_multiple)
        .service(portal::login)
        .service(portal::login_status)
        .service(portal::logout)
        .service(mods::installed)
        .service(health::health);
}
