use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A staff member allowed to issue vouchers, keyed by unique initials.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Issuer {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "JD")]
    pub initials: String,
    #[serde(default)]
    #[schema(example = 3)]
    pub voucher_count: u64,
}

impl Issuer {
    /// Build a fresh issuer with normalised initials and no vouchers issued.
    pub fn new(name: &str, initials: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            initials: normalize_initials(initials),
            voucher_count: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct CreateIssuerRequest {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "JD")]
    pub initials: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct RemoveIssuersRequest {
    pub initials: Vec<String>,
}

/// Initials are stored trimmed and upper-cased.
pub fn normalize_initials(initials: &str) -> String {
    initials.trim().to_uppercase()
}
