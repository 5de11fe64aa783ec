//! Input validation for voucher submissions.
//!
//! The request arrives as a raw JSON document. Every field problem is
//! collected so the caller sees all of them at once.

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use super::models::{IssuerRef, VoucherRequest};
use crate::error::AppError;
use crate::issuer::models::normalize_initials;

/// Upper bound on pages per submission.
pub const MAX_PAGES: u32 = 100;

/// Validation error for a single field.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must be a non-empty string", label))
    }

    pub fn invalid_date(field: &str) -> Self {
        Self::new(field, "date is missing or could not be parsed")
            .with_suggestion("use YYYY-MM-DD, e.g. 2024-01-01")
    }

    pub fn invalid_count(field: &str) -> Self {
        Self::new(field, "count must be a positive integer")
            .with_suggestion(format!("use a whole number between 1 and {}", MAX_PAGES))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::MalformedRequest(self.message()))
        }
    }
}

/// Parse and validate a serialized voucher submission.
pub fn parse_voucher_request(raw: &str) -> Result<VoucherRequest, AppError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::MalformedRequest(format!("could not parse voucher: {e}")))?;
    let object = value.as_object().ok_or_else(|| {
        AppError::MalformedRequest("voucher must be a JSON object".to_string())
    })?;

    let mut errors = ValidationErrors::new();

    let flight_number = required_string(object, "flightNumber", "Flight number", &mut errors);
    let reason = required_string(object, "reason", "Reason", &mut errors);
    let voucher_value = required_string(object, "value", "Value", &mut errors);
    let date = parse_date(object.get("date"), &mut errors);
    let count = parse_count(object.get("count"), &mut errors);
    let issuer = parse_issuer(object.get("issuer"), &mut errors);

    errors.into_result()?;

    match (flight_number, reason, voucher_value, date, count, issuer) {
        (Some(flight_number), Some(reason), Some(value), Some(date), Some(count), Some(issuer)) => {
            Ok(VoucherRequest {
                flight_number,
                date,
                value,
                reason,
                count,
                issuer,
            })
        }
        _ => Err(AppError::MalformedRequest("voucher body malformed".to_string())),
    }
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match object.get(field).and_then(Value::as_str).map(str::trim) {
        Some(value) if !value.is_empty() => Some(value.to_string()),
        _ => {
            errors.add(ValidationError::empty_field(field, label));
            None
        }
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_date_str(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
}

fn parse_date(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let date = value.and_then(Value::as_str).and_then(parse_date_str);
    if date.is_none() {
        errors.add(ValidationError::invalid_date("date"));
    }
    date
}

fn parse_count(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<u32> {
    match value {
        None | Some(Value::Null) => Some(1),
        Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(count) if (1..=MAX_PAGES).contains(&count) => Some(count),
            _ => {
                errors.add(ValidationError::invalid_count("count"));
                None
            }
        },
    }
}

fn parse_issuer(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<IssuerRef> {
    let Some(issuer) = value.and_then(Value::as_object) else {
        errors.add(ValidationError::new("issuer", "issuer must be an object"));
        return None;
    };

    let initials = required_string(issuer, "initials", "Issuer initials", errors)?;
    let name = issuer
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    Some(IssuerRef {
        initials: normalize_initials(&initials),
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "flightNumber": "GR123",
            "date": "2024-01-01",
            "value": "5.00",
            "reason": "delay",
            "count": 3,
            "issuer": { "initials": "jd", "name": "Jane Doe" }
        })
    }

    fn parse(value: &Value) -> Result<VoucherRequest, AppError> {
        parse_voucher_request(&value.to_string())
    }

    #[test]
    fn test_valid_request() {
        let request = parse(&valid()).unwrap();
        assert_eq!(request.flight_number, "GR123");
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(request.count, 3);
        assert_eq!(request.issuer.initials, "JD");
    }

    #[test]
    fn test_rfc3339_date_is_accepted() {
        let mut value = valid();
        value["date"] = json!("2024-06-30T23:00:00.000Z");
        let request = parse(&value).unwrap();
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn test_missing_count_defaults_to_one() {
        let mut value = valid();
        value.as_object_mut().unwrap().remove("count");
        assert_eq!(parse(&value).unwrap().count, 1);
    }

    #[test]
    fn test_count_at_cap_is_accepted() {
        let mut value = valid();
        value["count"] = json!(MAX_PAGES);
        assert_eq!(parse(&value).unwrap().count, MAX_PAGES);
    }

    #[test]
    fn test_bad_count_is_rejected() {
        let too_many = [json!(MAX_PAGES + 1), json!(u64::from(u32::MAX) + 1)];
        for count in [json!(0), json!(-2), json!(1.5), json!("3")].into_iter().chain(too_many) {
            let mut value = valid();
            value["count"] = count;
            assert!(matches!(parse(&value), Err(AppError::MalformedRequest(_))));
        }
    }

    #[test]
    fn test_non_string_fields_are_rejected() {
        for field in ["flightNumber", "reason", "value"] {
            let mut value = valid();
            value[field] = json!(42);
            let err = parse(&value).unwrap_err();
            match err {
                AppError::MalformedRequest(message) => assert!(message.contains(field)),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_initials_rejected() {
        let mut value = valid();
        value["issuer"]["initials"] = json!("  ");
        assert!(matches!(parse(&value), Err(AppError::MalformedRequest(_))));
    }

    #[test]
    fn test_missing_or_bad_date_rejected() {
        let mut value = valid();
        value["date"] = json!("not a date");
        assert!(matches!(parse(&value), Err(AppError::MalformedRequest(_))));

        value.as_object_mut().unwrap().remove("date");
        assert!(matches!(parse(&value), Err(AppError::MalformedRequest(_))));
    }

    #[test]
    fn test_all_problems_are_reported_together() {
        let err = parse_voucher_request(r#"{ "count": 1 }"#).unwrap_err();
        let AppError::MalformedRequest(message) = err else {
            panic!("expected MalformedRequest");
        };
        for field in ["flightNumber", "reason", "value", "date", "issuer"] {
            assert!(message.contains(field), "{message}");
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_voucher_request("{ malformed json "),
            Err(AppError::MalformedRequest(_))
        ));
        assert!(matches!(
            parse_voucher_request("[1, 2]"),
            Err(AppError::MalformedRequest(_))
        ));
    }
}
