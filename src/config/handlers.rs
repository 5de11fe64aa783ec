use actix_web::{web, HttpResponse};
use serde_json::json;

use super::{resolve, Config};
use crate::error::AppError;
use crate::{AppState, StatusResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Config",
    get,
    path = "/config",
    responses(
        (status = 200, description = "Current config, or the default when none is stored", body = Config)
    )
)]
pub async fn get_config(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(resolve(state.store.as_ref()).await)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Config",
    put,
    path = "/config",
    request_body = Config,
    responses(
        (status = 200, description = "Config saved and echoed back", body = StatusResponse),
        (status = 400, description = "Invalid config")
    )
)]
pub async fn set_config(
    state: web::Data<AppState>,
    item: web::Json<Config>,
) -> Result<HttpResponse, AppError> {
    let config = item.into_inner();
    config.validate()?;
    state.store.set_config(config.clone()).await?;
    log::info!("Output directory set to {}", config.output_dir);
    Ok(HttpResponse::Ok().json(StatusResponse::success(json!(config))))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Config",
    post,
    path = "/config/pick-directory",
    responses(
        (status = 200, description = "Chosen directory, `null` when cancelled")
    )
)]
pub async fn pick_directory(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let desktop = state.desktop.clone();
    let chosen = web::block(move || desktop.pick_directory())
        .await
        .map_err(|e| AppError::IoFailure(e.to_string()))??;
    let path = chosen.map(|p| p.to_string_lossy().into_owned());
    Ok(HttpResponse::Ok().json(json!({ "path": path })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/config")
            .route(web::get().to(get_config))
            .route(web::put().to(set_config)),
    )
    .service(web::resource("/config/pick-directory").route(web::post().to(pick_directory)));
}
