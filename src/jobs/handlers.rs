use std::sync::Arc;

use actix_web::{web, HttpResponse, Responder};
use futures::stream::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use uuid::Uuid;

use super::progress::{ChannelObserver, ObserverId, ProgressChannel};
use super::registry::JobView;
use crate::error::AppError;
use crate::AppState;

#[utoipa::path(
    context_path = "/api",
    tag = "Jobs",
    get,
    path = "/jobs",
    responses(
        (status = 200, description = "All jobs of this process, oldest first", body = [JobView])
    )
)]
pub async fn list_jobs(state: web::Data<AppState>) -> impl Responder {
    let jobs: Vec<JobView> = state
        .jobs
        .list_jobs()
        .into_iter()
        .map(JobView::from)
        .collect();
    HttpResponse::Ok().json(jobs)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Jobs",
    get,
    path = "/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = JobView),
        (status = 404, description = "Job not found")
    )
)]
pub async fn get_job(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let job = state
        .jobs
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("job {id}")))?;
    Ok(HttpResponse::Ok().json(JobView::from(job)))
}

/// Unregisters the SSE observer once the response stream is dropped.
struct Subscription {
    channel: Arc<ProgressChannel>,
    id: ObserverId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.channel.unregister(self.id) {
            log::info!("Progress subscriber disconnected");
        }
    }
}

/// Server-Sent Events stream of `{ jobId, currentPage, totalPages }`.
/// Opening a new stream replaces the previous subscriber.
#[utoipa::path(
    context_path = "/api",
    tag = "Jobs",
    get,
    path = "/jobs/progress",
    responses(
        (status = 200, description = "text/event-stream of progress events")
    )
)]
pub async fn progress_stream(state: web::Data<AppState>) -> impl Responder {
    let (tx, rx) = mpsc::unbounded_channel();
    let id = state.progress.register(Arc::new(ChannelObserver::new(tx)));
    let subscription = Subscription {
        channel: state.progress.clone(),
        id,
    };
    log::info!("Progress subscriber connected");

    let events = UnboundedReceiverStream::new(rx).map(move |event| {
        let _subscription = &subscription;
        let payload = serde_json::to_string(&event).unwrap_or_default();
        Ok::<_, std::io::Error>(web::Bytes::from(format!(
            "event: progress\ndata: {}\n\n",
            payload
        )))
    });

    let initial = futures::stream::once(async {
        Ok::<_, std::io::Error>(web::Bytes::from_static(b": connected\n\n"))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("Connection", "keep-alive"))
        .streaming(initial.chain(events))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/jobs").route(web::get().to(list_jobs)))
        .service(web::resource("/jobs/progress").route(web::get().to(progress_stream)))
        .service(web::resource("/jobs/{id}").route(web::get().to(get_job)));
}
