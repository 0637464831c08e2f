//! Shape validation of the homework API response.
//!
//! The API answers with
//! `{"homeworks": [{"homework_name": ..., "status": ...}, ...], "current_date": N}`.
//! Every expected key is checked explicitly; a missing key or a wrong JSON
//! type is an error, never silently skipped.

use serde_json::Value;

use crate::{
    domain::{HomeworkRecord, HomeworkStatus},
    errors::Error,
    Result,
};

/// Check the response for the `homeworks` list and return it unchanged.
///
/// An empty list is valid. No filtering happens here.
pub fn extract_homeworks(response: &Value) -> Result<&Vec<Value>> {
    response
        .get("homeworks")
        .ok_or(Error::MissingField {
            field: "homeworks",
        })?
        .as_array()
        .ok_or(Error::TypeMismatch {
            field: "homeworks",
            expected: "array",
        })
}

/// Server-reported poll watermark (`current_date`).
pub fn server_timestamp(response: &Value) -> Result<i64> {
    response
        .get("current_date")
        .ok_or(Error::MissingField {
            field: "current_date",
        })?
        .as_i64()
        .ok_or(Error::TypeMismatch {
            field: "current_date",
            expected: "integer",
        })
}

/// Pull the name and status out of one homework entry.
pub fn parse_record(homework: &Value) -> Result<HomeworkRecord> {
    let homework_name = str_field(homework, "homework_name")?.to_string();
    let status = HomeworkStatus::parse(str_field(homework, "status")?)?;
    Ok(HomeworkRecord {
        homework_name,
        status,
    })
}

/// Compose the notification text for a status change.
pub fn format_status_message(homework: &Value) -> Result<String> {
    let record = parse_record(homework)?;
    Ok(format!(
        "Изменился статус проверки работы \"{}\". {}",
        record.homework_name,
        record.status.verdict()
    ))
}

fn str_field<'a>(homework: &'a Value, field: &'static str) -> Result<&'a str> {
    homework
        .get(field)
        .ok_or(Error::MissingField { field })?
        .as_str()
        .ok_or(Error::TypeMismatch {
            field,
            expected: "string",
        })
}
