use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Issuer reference embedded in a submitted voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IssuerRef {
    #[schema(example = "JD")]
    pub initials: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
}

/// A validated voucher submission. Only produced by
/// [`parse_voucher_request`](super::validation::parse_voucher_request).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRequest {
    #[schema(example = "GR123")]
    pub flight_number: String,
    #[schema(value_type = String, example = "2024-01-01")]
    pub date: NaiveDate,
    #[schema(example = "5.00")]
    pub value: String,
    #[schema(example = "delay")]
    pub reason: String,
    #[schema(example = 3)]
    pub count: u32,
    pub issuer: IssuerRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GeneratedTime {
    #[schema(example = "01/01/2024")]
    pub date: String,
    #[schema(example = "14:05")]
    pub time: String,
}

impl GeneratedTime {
    pub fn from_datetime(at: &DateTime<Local>) -> Self {
        Self {
            date: at.format("%d/%m/%Y").to_string(),
            time: at.format("%H:%M").to_string(),
        }
    }
}

/// Catalog record for one completed voucher generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoucherDetails {
    #[schema(example = "a1b2c3d4-e5f6-7890-1234-567890abcdef")]
    pub id: Uuid,
    #[schema(example = "JD")]
    pub issuer: String,
    #[schema(example = "GR123")]
    pub flight_number: String,
    /// Directory holding the rendered pages of this voucher.
    #[schema(example = "/home/agent/vouchers/a1b2c3d4-e5f6-7890-1234-567890abcdef")]
    pub output_dir: String,
    pub generated_time: GeneratedTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoucherResponse {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShowVoucherRequest {
    pub path: String,
}
