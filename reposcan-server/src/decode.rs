//! Search request body decoding.
//!
//! The body must hold exactly one JSON object with only the known
//! `SearchCriteria` fields. Every rejection carries a client-facing message;
//! positions are byte offsets into the body.

use serde::Deserialize;
use serde_json::Value;

use reposcan_core::types::SearchCriteria;

/// Reasons a request body is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Body is empty or whitespace only.
    #[error("Request body must not be empty")]
    Empty,

    /// JSON syntax error at a known position.
    #[error("Request body contains badly-formed JSON (at position {0})")]
    Syntax(usize),

    /// JSON ended before the first value was complete.
    #[error("Request body contains badly-formed JSON")]
    Truncated,

    /// A value has the wrong type.
    #[error(
        "Request body contains an invalid value{} (at position {position})",
        field.as_ref().map(|f| format!(" for the \"{f}\" field")).unwrap_or_default()
    )]
    InvalidValue {
        field: Option<String>,
        position: usize,
    },

    /// An object key is not a known field.
    #[error("Request body contains unknown field \"{0}\"")]
    UnknownField(String),

    /// More data follows the first JSON value.
    #[error("Request body must only contain a single JSON object")]
    TrailingData,
}

/// Decode search criteria from a request body.
pub fn decode_criteria(body: &[u8]) -> Result<SearchCriteria, DecodeError> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Value>();

    let end = match values.next() {
        None => return Err(DecodeError::Empty),
        Some(Err(err)) if err.is_eof() => return Err(DecodeError::Truncated),
        Some(Err(err)) => return Err(DecodeError::Syntax(position(body, &err))),
        Some(Ok(_)) => values.byte_offset(),
    };

    let criteria = serde_json::from_slice::<SearchCriteria>(&body[..end])
        .map_err(|err| classify_data_error(body, &body[..end], &err))?;

    if values.next().is_some() {
        return Err(DecodeError::TrailingData);
    }
    Ok(criteria)
}

fn classify_data_error(body: &[u8], value: &[u8], err: &serde_json::Error) -> DecodeError {
    if let Some(field) = unknown_field_name(&err.to_string()) {
        return DecodeError::UnknownField(field);
    }
    DecodeError::InvalidValue {
        field: invalid_field(value),
        position: position(body, err),
    }
}

/// Extract the field name from serde's "unknown field `X`, expected ..." message.
fn unknown_field_name(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_owned())
}

/// Field view used only to name the field holding a value of the wrong type.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawCriteria {
    project_name_pattern: Option<Value>,
    file_name_pattern: Option<Value>,
    content_pattern: Option<Value>,
}

fn invalid_field(value: &[u8]) -> Option<String> {
    let raw: RawCriteria = serde_json::from_slice(value).ok()?;
    [
        ("ProjectNamePattern", raw.project_name_pattern),
        ("FileNamePattern", raw.file_name_pattern),
        ("ContentPattern", raw.content_pattern),
    ]
    .into_iter()
    .find(|(_, value)| matches!(value, Some(v) if !v.is_string()))
    .map(|(name, _)| name.to_owned())
}

/// Convert serde_json's 1-based line and column into a byte offset.
fn position(body: &[u8], err: &serde_json::Error) -> usize {
    let line_start: usize = body
        .split_inclusive(|b| *b == b'\n')
        .take(err.line().saturating_sub(1))
        .map(<[u8]>::len)
        .sum();
    line_start + err.column()
}
