mod common;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use chrono::Local;
use serde_json::{json, Value};
use tempfile::tempdir;
use uuid::Uuid;

use common::{seeded_store, voucher_json, FailingStore, FakeDesktop, FakeRenderer};
use voucher_desk::jobs::ProgressEvent;
use voucher_desk::store::{MemoryStore, Store};
use voucher_desk::voucher::models::GeneratedTime;
use voucher_desk::voucher::VoucherDetails;
use voucher_desk::{configure_api, AppState};

fn state_for(store: Arc<dyn Store>, desktop: Arc<FakeDesktop>) -> AppState {
    AppState::with_components(store, Arc::new(FakeRenderer::default()), desktop)
}

fn voucher_record(output_dir: &std::path::Path) -> VoucherDetails {
    VoucherDetails {
        id: Uuid::new_v4(),
        issuer: "JD".to_string(),
        flight_number: "GR123".to_string(),
        output_dir: output_dir.to_string_lossy().into_owned(),
        generated_time: GeneratedTime::from_datetime(&Local::now()),
    }
}

#[actix_web::test]
async fn test_issuer_lifecycle() {
    let state = state_for(Arc::new(MemoryStore::new()), Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issuers")
        .set_json(json!({ "name": " Jane Doe ", "initials": "jd" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["initials"], "JD");
    assert_eq!(body["name"], "Jane Doe");

    let req = test::TestRequest::post()
        .uri("/api/issuers")
        .set_json(json!({ "name": "John Dee", "initials": "JD" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "DuplicateIssuer");

    let req = test::TestRequest::get().uri("/api/issuers").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["voucher_count"], 0);

    let req = test::TestRequest::post()
        .uri("/api/issuers/remove")
        .set_json(json!({ "initials": ["jd", "XX"] }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["content"]["removed"], 1);
}

#[actix_web::test]
async fn test_malformed_json_is_a_bad_request() {
    let state = state_for(Arc::new(MemoryStore::new()), Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/issuers")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"name\":")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "MalformedRequest");

    let req = test::TestRequest::post()
        .uri("/api/vouchers")
        .set_payload("{\"flightNumber\":\"GR1\"}")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_submit_voucher_returns_job() {
    let dir = tempdir().unwrap();
    let store = seeded_store(dir.path()).await;
    let state = state_for(store, Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/vouchers")
        .set_payload(voucher_json("GR123", "JD", 3))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = test::read_body_json(resp).await;
    let job_id: Uuid = body["jobId"].as_str().unwrap().parse().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/jobs/{job_id}"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["totalPages"], 3);
    assert!(body["status"].is_string());

    let req = test::TestRequest::get().uri("/api/jobs").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], job_id.to_string());

    let req = test::TestRequest::post()
        .uri("/api/vouchers")
        .set_payload(voucher_json("GR123", "ZZ", 1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(state.jobs.list_jobs().len(), 1);
}

#[actix_web::test]
async fn test_unknown_job_is_not_found() {
    let state = state_for(Arc::new(MemoryStore::new()), Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/jobs/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_with_missing_files_warns_and_removes_record() {
    let dir = tempdir().unwrap();
    let store = seeded_store(dir.path()).await;
    let record = voucher_record(&dir.path().join("already-gone"));
    store.append_voucher(record.clone()).await.unwrap();

    let state = state_for(store.clone(), Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/vouchers/{}", record.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "warning");
    assert!(store.list_vouchers().await.unwrap().is_empty());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/vouchers/{}", record.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_voucher_pages_are_served_and_printed_in_order() {
    let dir = tempdir().unwrap();
    let store = seeded_store(dir.path()).await;
    let voucher_dir = dir.path().join("v1");
    std::fs::create_dir_all(&voucher_dir).unwrap();
    for page in [2, 1] {
        std::fs::write(
            voucher_dir.join(format!("GR123_JD_voucher-{page}.pdf")),
            format!("%PDF page {page}"),
        )
        .unwrap();
    }
    let record = voucher_record(&voucher_dir);
    store.append_voucher(record.clone()).await.unwrap();

    let desktop = Arc::new(FakeDesktop::default());
    let state = state_for(store, desktop.clone());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/vouchers/{}/pages/2", record.id))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(&body[..], b"%PDF page 2");

    let req = test::TestRequest::get()
        .uri(&format!("/api/vouchers/{}/pages/3", record.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/printers/Gate3/print")
        .set_json(json!({ "voucherId": record.id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");

    let printed = desktop.printed.lock();
    assert_eq!(printed.len(), 1);
    assert_eq!(printed[0].0, "Gate3");
    assert_eq!(
        printed[0].1,
        vec![
            voucher_dir.join("GR123_JD_voucher-1.pdf"),
            voucher_dir.join("GR123_JD_voucher-2.pdf"),
        ]
    );
}

#[actix_web::test]
async fn test_config_defaults_and_updates() {
    let state = state_for(Arc::new(MemoryStore::new()), Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/config").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["outputDir"].as_str().unwrap().ends_with("vouchers"));

    let req = test::TestRequest::put()
        .uri("/api/config")
        .set_json(json!({ "outputDir": "/srv/vouchers" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");

    let req = test::TestRequest::get().uri("/api/config").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["outputDir"], "/srv/vouchers");

    let req = test::TestRequest::put()
        .uri("/api/config")
        .set_json(json!({ "outputDir": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_desktop_endpoints() {
    let desktop = Arc::new(FakeDesktop {
        picked: Some("/home/agent/out".into()),
        ..FakeDesktop::default()
    });
    let state = state_for(Arc::new(MemoryStore::new()), desktop.clone());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/printers").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["deviceId"], "Gate3");

    let req = test::TestRequest::post()
        .uri("/api/config/pick-directory")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["path"], "/home/agent/out");

    let req = test::TestRequest::post()
        .uri("/api/vouchers/show")
        .set_json(json!({ "path": "/tmp/GR123.pdf" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(desktop.opened.lock().len(), 1);
}

#[actix_web::test]
async fn test_progress_stream_holds_the_single_subscription() {
    let state = state_for(Arc::new(MemoryStore::new()), Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/jobs/progress").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert!(state.progress.has_observer());

    drop(resp);
    assert!(!state.progress.has_observer());
}

#[actix_web::test]
async fn test_progress_stream_frames_events_and_ends_when_replaced() {
    let state = state_for(Arc::new(MemoryStore::new()), Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/jobs/progress").to_request();
    let first = test::call_service(&app, req).await;

    let job_id = Uuid::new_v4();
    for page in 1..=2 {
        state.progress.publish(ProgressEvent {
            job_id,
            current_page: page,
            total_pages: 3,
        });
    }

    let req = test::TestRequest::get().uri("/api/jobs/progress").to_request();
    let second = test::call_service(&app, req).await;
    assert!(second.status().is_success());

    // Replacing the subscriber closes the first stream after its queued events.
    let body = actix_web::rt::time::timeout(
        std::time::Duration::from_secs(5),
        test::read_body(first),
    )
    .await
    .expect("first stream should end once replaced");
    let text = std::str::from_utf8(&body).unwrap();

    assert!(text.starts_with(": connected\n\n"));
    assert_eq!(text.matches("event: progress\n").count(), 2);

    let events: Vec<Value> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["jobId"], job_id.to_string());
    assert_eq!(events[0]["currentPage"], 1);
    assert_eq!(events[0]["totalPages"], 3);
    assert_eq!(events[1]["currentPage"], 2);

    assert!(state.progress.has_observer());
    drop(second);
    assert!(!state.progress.has_observer());
}

#[actix_web::test]
async fn test_config_falls_back_to_default_when_store_is_unreadable() {
    let state = state_for(Arc::new(FailingStore), Arc::new(FakeDesktop::default()));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/config").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["outputDir"].as_str().unwrap().ends_with("vouchers"));
}

#[actix_web::test]
async fn test_printing_a_voucher_without_files_is_an_io_failure() {
    let dir = tempdir().unwrap();
    let store = seeded_store(dir.path()).await;
    let record = voucher_record(&dir.path().join("never-rendered"));
    store.append_voucher(record.clone()).await.unwrap();

    let desktop = Arc::new(FakeDesktop::default());
    let state = state_for(store, desktop.clone());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(web::scope("/api").configure(configure_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/printers/Gate3/print")
        .set_json(json!({ "voucherId": record.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "IOFailure");
    assert!(desktop.printed.lock().is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/vouchers/{}/pages/1", record.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
