//! Line framing for the client protocol.
//!
//! Every message is one JSON object on one line. Requests carry `type` and an
//! optional `data` object; responses carry `Statu` (`ok` or `err`) and `data`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use shared_models::AppError;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed request")]
    Malformed(#[source] serde_json::Error),

    #[error("type missing")]
    MissingType,

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("request too long")]
    LineTooLong,

    #[error("response encoding failed")]
    Encode(#[source] serde_json::Error),
}

impl From<ProtocolError> for AppError {
    fn from(e: ProtocolError) -> Self {
        match e {
            ProtocolError::Encode(source) => AppError::Internal(source.to_string()),
            other => AppError::Protocol(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Request {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl Request {
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(line).map_err(ProtocolError::Malformed)
    }

    /// The request type, if present and not blank.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref().map(str::trim).filter(|kind| !kind.is_empty())
    }

    /// The payload; absent or `null` reads as an empty object.
    pub fn into_data(self) -> Value {
        match self.data {
            None | Some(Value::Null) => json!({}),
            Some(data) => data,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "err")]
    Err,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Response {
    #[serde(rename = "Statu")]
    pub status: Status,
    pub data: Value,
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self { status: Status::Ok, data }
    }

    pub fn err(error: &AppError) -> Self {
        Self {
            status: Status::Err,
            data: error.to_payload(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Encodes the response as one newline-terminated line.
    pub fn to_line(&self) -> Result<String, ProtocolError> {
        let mut line = serde_json::to_string(self).map_err(ProtocolError::Encode)?;
        line.push('\n');
        Ok(line)
    }

    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(line).map_err(ProtocolError::Malformed)
    }
}
