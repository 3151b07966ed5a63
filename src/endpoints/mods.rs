use actix_web::{get, web, Responder};

use crate::config::AppData;
use crate::types::api::ApiError;

#[get("/api/mods/installed")]
pub async fn installed(data: web::Data<AppData>) -> Result<impl Responder, ApiError> {
    let listing = data.installer().list_installed().await?;
    Ok(web::Json(listing))
}
