use std::path::PathBuf;

use actix_files::NamedFile;
use actix_web::{web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use super::models::{ShowVoucherRequest, SubmitVoucherResponse, VoucherDetails, VoucherRequest};
use crate::error::AppError;
use crate::{AppState, StatusResponse};

#[utoipa::path(
    context_path = "/api",
    tag = "Vouchers",
    post,
    path = "/vouchers",
    request_body(content = VoucherRequest, description = "Serialized voucher document"),
    responses(
        (status = 202, description = "Job created, generation running in the background", body = SubmitVoucherResponse),
        (status = 400, description = "Malformed voucher"),
        (status = 422, description = "Issuer does not exist")
    )
)]
pub async fn submit_voucher(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let raw = std::str::from_utf8(&body)
        .map_err(|e| AppError::MalformedRequest(format!("voucher is not UTF-8: {e}")))?;
    let submission = state.vouchers.submit(raw).await?;
    Ok(HttpResponse::Accepted().json(SubmitVoucherResponse {
        job_id: submission.job_id,
    }))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vouchers",
    get,
    path = "/vouchers",
    responses(
        (status = 200, description = "All generated vouchers", body = [VoucherDetails])
    )
)]
pub async fn get_vouchers(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let vouchers = state.vouchers.list_vouchers().await?;
    Ok(HttpResponse::Ok().json(vouchers))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vouchers",
    delete,
    path = "/vouchers/{id}",
    params(
        ("id" = Uuid, Path, description = "Voucher ID")
    ),
    responses(
        (status = 200, description = "Voucher removed; status is `warning` when its files could not be deleted", body = StatusResponse),
        (status = 404, description = "Voucher not found")
    )
)]
pub async fn delete_voucher(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let outcome = state.vouchers.delete_voucher(path.into_inner()).await?;
    let response = match outcome.warning {
        Some(warning) => StatusResponse::warning(json!(warning)),
        None => StatusResponse::success(json!("Voucher deleted")),
    };
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vouchers",
    post,
    path = "/vouchers/show",
    request_body = ShowVoucherRequest,
    responses(
        (status = 200, description = "Viewer opened", body = StatusResponse),
        (status = 500, description = "Viewer could not be started")
    )
)]
pub async fn show_voucher(
    state: web::Data<AppState>,
    item: web::Json<ShowVoucherRequest>,
) -> Result<HttpResponse, AppError> {
    let path = PathBuf::from(&item.path);
    let desktop = state.desktop.clone();
    web::block(move || desktop.open(&path))
        .await
        .map_err(|e| AppError::IoFailure(e.to_string()))??;
    Ok(HttpResponse::Ok().json(StatusResponse::success(json!(item.path))))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Vouchers",
    get,
    path = "/vouchers/{id}/pages/{page}",
    params(
        ("id" = Uuid, Path, description = "Voucher ID"),
        ("page" = usize, Path, description = "1-based page number")
    ),
    responses(
        (status = 200, description = "Rendered page as application/pdf"),
        (status = 404, description = "Voucher or page not found")
    )
)]
pub async fn get_voucher_page(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, usize)>,
) -> Result<NamedFile, AppError> {
    let (id, page) = path.into_inner();
    let file = state.vouchers.page_path(id, page).await?;
    NamedFile::open_async(&file)
        .await
        .map_err(|e| AppError::IoFailure(format!("{}: {}", file.display(), e)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/vouchers")
            .route(web::get().to(get_vouchers))
            .route(web::post().to(submit_voucher)),
    )
    .service(web::resource("/vouchers/show").route(web::post().to(show_voucher)))
    .service(web::resource("/vouchers/{id}").route(web::delete().to(delete_voucher)))
    .service(
        web::resource("/vouchers/{id}/pages/{page}").route(web::get().to(get_voucher_page)),
    );
}
