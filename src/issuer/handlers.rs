use actix_web::{web, HttpResponse};
use serde_json::json;

use super::models::{CreateIssuerRequest, Issuer, RemoveIssuersRequest};
use crate::error::AppError;
use crate::{AppState, StatusResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Issuers",
    get,
    path = "/issuers",
    responses(
        (status = 200, description = "List all issuers", body = [Issuer])
    )
)]
pub async fn get_issuers(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let issuers = state.store.list_issuers().await?;
    Ok(HttpResponse::Ok().json(issuers))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Issuers",
    post,
    path = "/issuers",
    request_body = CreateIssuerRequest,
    responses(
        (status = 201, description = "Issuer created", body = Issuer),
        (status = 400, description = "Name or initials missing"),
        (status = 409, description = "Initials already in use")
    )
)]
pub async fn add_issuer(
    state: web::Data<AppState>,
    item: web::Json<CreateIssuerRequest>,
) -> Result<HttpResponse, AppError> {
    if item.name.trim().is_empty() || item.initials.trim().is_empty() {
        return Err(AppError::MalformedRequest(
            "issuer name and initials must be non-empty".to_string(),
        ));
    }

    let issuer = state
        .store
        .add_issuer(Issuer::new(&item.name, &item.initials))
        .await?;
    log::info!("Issuer {} ({}) added", issuer.initials, issuer.name);
    Ok(HttpResponse::Created().json(issuer))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Issuers",
    post,
    path = "/issuers/remove",
    request_body = RemoveIssuersRequest,
    responses(
        (status = 200, description = "Issuers removed", body = StatusResponse)
    )
)]
pub async fn remove_issuers(
    state: web::Data<AppState>,
    item: web::Json<RemoveIssuersRequest>,
) -> Result<HttpResponse, AppError> {
    let removed = state.store.remove_issuers(&item.initials).await?;
    log::info!("Removed {} issuer(s)", removed);
    Ok(HttpResponse::Ok().json(StatusResponse::success(json!({ "removed": removed }))))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/issuers")
            .route(web::get().to(get_issuers))
            .route(web::post().to(add_issuer)),
    )
    .service(web::resource("/issuers/remove").route(web::post().to(remove_issuers)));
}
