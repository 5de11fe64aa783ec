//! Typst-backed voucher renderer.
//!
//! Writes the filled template to a temporary directory, invokes the `typst`
//! compiler and reads back the PDF.

use std::fs;
use std::process::Command;

use chrono::{DateTime, Local};
use tempfile::{tempdir, TempDir};

use super::common::{escape_typst_string, format_uk_date, get_static_dir};
use super::{RenderError, RenderedPage, VoucherRenderer};
use crate::voucher::models::VoucherRequest;

const TEMPLATE_FILE: &str = "voucher.typ";
const OUTPUT_FILE: &str = "voucher.pdf";

pub struct TypstVoucherRenderer {
    template: String,
    typst_bin: String,
}

impl TypstVoucherRenderer {
    /// Load the voucher template from the static directory.
    pub fn new(typst_bin: impl Into<String>) -> Result<Self, RenderError> {
        let template_path = get_static_dir().join(TEMPLATE_FILE);
        let template = fs::read_to_string(&template_path).map_err(RenderError::TemplateIo)?;
        Ok(Self::from_template(template, typst_bin))
    }

    pub fn from_template(template: impl Into<String>, typst_bin: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            typst_bin: typst_bin.into(),
        }
    }

    /// Complete Typst source for one page: the data binding followed by the template.
    pub fn render_source(
        &self,
        request: &VoucherRequest,
        page: u32,
        generated_at: &DateTime<Local>,
    ) -> String {
        format!(
            r#"#let voucher = (
  flight_number: "{}",
  date: "{}",
  value: "{}",
  reason: "{}",
  issuer: "{}",
  number: {},
  generated_date: "{}",
  generated_time: "{}",
)

{}"#,
            escape_typst_string(&request.flight_number),
            escape_typst_string(&format_uk_date(request.date)),
            escape_typst_string(&request.value),
            escape_typst_string(&request.reason),
            escape_typst_string(&request.issuer.initials),
            page,
            generated_at.format("%d/%m/%Y"),
            generated_at.format("%H:%M"),
            self.template,
        )
    }

    fn compile(&self, source: &str) -> Result<Vec<u8>, RenderError> {
        let temp_dir = tempdir().map_err(RenderError::TempDir)?;
        fs::write(temp_dir.path().join(TEMPLATE_FILE), source).map_err(RenderError::WriteTypst)?;
        compile_typst_to_pdf(&self.typst_bin, &temp_dir)
    }
}

impl VoucherRenderer for TypstVoucherRenderer {
    fn render(&self, request: &VoucherRequest, page: u32) -> Result<RenderedPage, RenderError> {
        let source = self.render_source(request, page, &Local::now());
        let pdf = self.compile(&source)?;
        log::debug!(
            "Rendered page {} of voucher for {} ({} bytes)",
            page,
            request.flight_number,
            pdf.len()
        );
        Ok(RenderedPage { page, pdf })
    }
}

fn compile_typst_to_pdf(typst_bin: &str, temp_dir: &TempDir) -> Result<Vec<u8>, RenderError> {
    let typ_path = temp_dir.path().join(TEMPLATE_FILE);
    let output_path = temp_dir.path().join(OUTPUT_FILE);

    let status = Command::new(typst_bin)
        .arg("compile")
        .arg(&typ_path)
        .arg(&output_path)
        .current_dir(temp_dir.path())
        .status()
        .map_err(RenderError::TypstIo)?;

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        return Err(RenderError::TypstExit(code));
    }

    fs::read(&output_path).map_err(RenderError::ReadPdf)
}
