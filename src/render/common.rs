//! Shared helpers for rendering and naming voucher output.

use std::path::Path;

use chrono::NaiveDate;

use crate::voucher::models::VoucherRequest;

/// Format a date the en-GB way (e.g. "01/01/2024").
pub fn format_uk_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\n', r"\n")
}

/// File name of one rendered page, e.g. `GR123_JD_voucher-2.pdf`.
pub fn page_filename(request: &VoucherRequest, page: u32) -> String {
    let flight = sanitize_part(&request.flight_number, "flight");
    let initials = sanitize_part(&request.issuer.initials, "issuer");
    format!("{flight}_{initials}_voucher-{page}.pdf")
}

fn sanitize_part(value: &str, fallback: &str) -> String {
    let cleaned = sanitize_filename::sanitize(value.trim()).replace([' ', '_'], "-");
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Get the static assets directory path.
pub fn get_static_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}
