use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::Printer;
use crate::error::AppError;
use crate::{AppState, StatusResponse};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrintVoucherRequest {
    pub voucher_id: Uuid,
}

#[utoipa::path(
    context_path = "/api",
    tag = "Printers",
    get,
    path = "/printers",
    responses(
        (status = 200, description = "Printers known to the system", body = [Printer])
    )
)]
pub async fn get_printers(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let desktop = state.desktop.clone();
    let printers = web::block(move || desktop.list_printers())
        .await
        .map_err(|e| AppError::IoFailure(e.to_string()))??;
    Ok(HttpResponse::Ok().json(printers))
}

#[utoipa::path(
    context_path = "/api",
    tag = "Printers",
    post,
    path = "/printers/{printer_id}/print",
    params(
        ("printer_id" = String, Path, description = "Printer device id")
    ),
    request_body = PrintVoucherRequest,
    responses(
        (status = 200, description = "Voucher sent to the printer", body = StatusResponse),
        (status = 404, description = "Voucher not found"),
        (status = 500, description = "Could not print voucher")
    )
)]
pub async fn print_voucher(
    state: web::Data<AppState>,
    path: web::Path<String>,
    item: web::Json<PrintVoucherRequest>,
) -> Result<HttpResponse, AppError> {
    let printer_id = path.into_inner();
    let (voucher, files) = state.vouchers.voucher_files(item.voucher_id).await?;

    let desktop = state.desktop.clone();
    let printer = printer_id.clone();
    web::block(move || desktop.print(&printer, &files))
        .await
        .map_err(|e| AppError::IoFailure(e.to_string()))?
        .inspect_err(|e| log::error!("Could not print voucher {}: {}", voucher.id, e))?;

    Ok(HttpResponse::Ok().json(StatusResponse::success(json!({
        "printer": printer_id,
        "voucherId": voucher.id,
    }))))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/printers").route(web::get().to(get_printers)))
        .service(
            web::resource("/printers/{printer_id}/print").route(web::post().to(print_voucher)),
        );
}
