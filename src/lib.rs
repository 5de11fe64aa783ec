use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod issuer;
pub mod jobs;
pub mod platform;
pub mod render;
pub mod settings;
pub mod state;
pub mod store;
pub mod voucher;

pub use crate::error::AppError;
pub use crate::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Envelope for mutating operations. `status` is `success`, or `warning`
/// when the operation went through but something on the side failed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    #[schema(value_type = Object)]
    pub content: Value,
}

impl StatusResponse {
    pub fn success(content: Value) -> Self {
        Self {
            status: "success".to_string(),
            content,
        }
    }

    pub fn warning(content: Value) -> Self {
        Self {
            status: "warning".to_string(),
            content,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::issuer::handlers::get_issuers,
        crate::issuer::handlers::add_issuer,
        crate::issuer::handlers::remove_issuers,
        crate::voucher::handlers::submit_voucher,
        crate::voucher::handlers::get_vouchers,
        crate::voucher::handlers::delete_voucher,
        crate::voucher::handlers::show_voucher,
        crate::voucher::handlers::get_voucher_page,
        crate::jobs::handlers::list_jobs,
        crate::jobs::handlers::get_job,
        crate::jobs::handlers::progress_stream,
        crate::config::handlers::get_config,
        crate::config::handlers::set_config,
        crate::config::handlers::pick_directory,
        crate::platform::handlers::get_printers,
        crate::platform::handlers::print_voucher
    ),
    components(
        schemas(
            issuer::models::Issuer,
            issuer::models::CreateIssuerRequest,
            issuer::models::RemoveIssuersRequest,
            voucher::models::IssuerRef,
            voucher::models::VoucherRequest,
            voucher::models::VoucherDetails,
            voucher::models::GeneratedTime,
            voucher::models::SubmitVoucherResponse,
            voucher::models::ShowVoucherRequest,
            jobs::JobView,
            jobs::JobStatus,
            jobs::ProgressEvent,
            config::Config,
            platform::Printer,
            platform::handlers::PrintVoucherRequest,
            StatusResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Issuers", description = "Issuing agents and their voucher counts."),
        (name = "Vouchers", description = "Voucher submission and the generated voucher catalog."),
        (name = "Jobs", description = "Generation jobs and live progress."),
        (name = "Config", description = "Output directory configuration."),
        (name = "Printers", description = "System printers.")
    ),
    servers(
        (url = "http://127.0.0.1:8080", description = "Local desk")
    )
)]
pub struct ApiDoc;

/// Register every `/api` route. Shared by the server and the integration tests.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        AppError::MalformedRequest(err.to_string()).into()
    });

    cfg.app_data(json_config)
        .configure(issuer::config)
        .configure(voucher::config)
        .configure(jobs::handlers::config)
        .configure(config::handlers::config)
        .configure(platform::handlers::config);
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = settings::Settings::from_env()?;
    let app_state = match AppState::new(&settings) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!(
                "Failed to initialise voucher desk. Check VOUCHER_STORE_PATH and that static/voucher.typ is readable. Error: {}",
                e
            );
            std::process::exit(1);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("voucher_desk")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {}", e))?;

    log::info!(
        "Starting server at http://{}:{}",
        settings.host,
        settings.port
    );

    let ui_origin = settings.ui_origin.clone();
    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let cors = Cors::default()
            .allowed_origin(&ui_origin)
            .allowed_origin("http://127.0.0.1:8080")
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .service(web::scope("/api").configure(configure_api))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await?;

    Ok(())
}
