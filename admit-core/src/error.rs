use crate::field::ErrorList;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rejection in the shape the API returns it to callers.
#[derive(Error, Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[error("{message}: {reason}")]
pub struct ErrorResponse {
    /// The status
    pub status: String,
    /// A message about the error
    #[serde(default)]
    pub message: String,
    /// The reason for the error
    #[serde(default)]
    pub reason: String,
    /// The error code
    pub code: u16,
    /// Extended data associated with the reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<StatusDetails>,
}

impl ErrorResponse {
    /// A 422 response listing every field error found on `kind` named `name`
    pub fn invalid(kind: &str, name: &str, errors: &ErrorList) -> Self {
        Self {
            status: "Failure".into(),
            message: format!("{kind} \"{name}\" is invalid: {errors}"),
            reason: "Invalid".into(),
            code: 422,
            details: Some(StatusDetails {
                causes: Some(errors.causes()),
                kind: Some(kind.into()),
                name: Some(name.into()),
                ..StatusDetails::default()
            }),
        }
    }

    /// A 400 response for a request that cannot be interpreted
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: "Failure".into(),
            message: message.into(),
            reason: "BadRequest".into(),
            code: 400,
            details: None,
        }
    }

    /// A 404 response for an object that does not exist
    pub fn not_found(kind: &str, name: &str) -> Self {
        Self {
            status: "Failure".into(),
            message: format!("{kind} \"{name}\" not found"),
            reason: "NotFound".into(),
            code: 404,
            details: Some(StatusDetails {
                kind: Some(kind.into()),
                name: Some(name.into()),
                ..StatusDetails::default()
            }),
        }
    }
}

/// Additional properties describing the object an [`ErrorResponse`] is about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetails {
    /// One entry per field that caused the failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub causes: Option<Vec<StatusCause>>,

    /// The group of the resource, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// The kind of the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// The name of the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A single reason a request was refused.
///
/// Fields may appear more than once when a field has multiple errors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCause {
    /// The field path, e.g. `triggers[0].imageChangeParams.from`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Human readable description of the cause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Machine readable reason, e.g. `FieldValueRequired`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
