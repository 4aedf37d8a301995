//! GraphQL envelope handling shared by the platform clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use skylift_core::error::SkyliftError;

/// Outgoing request body: a query/mutation plus optional variables.
/// Requests always use GraphQL variables rather than string interpolation.
#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

/// Response envelope: either `data` or an `errors` array (or both).
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    pub data: Option<Value>,
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// Map an application-level `errors` array to a classified failure.
/// Authorization failures get their own variant so callers can print the
/// token remediation hint.
pub(crate) fn classify_errors(errors: &[GraphqlError]) -> SkyliftError {
    let joined = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    let is_auth = errors.iter().any(|e| {
        let message = e.message.to_ascii_lowercase();
        message.contains("not authorized")
            || message.contains("unauthorized")
            || message.contains("unauthenticated")
    });
    if is_auth {
        SkyliftError::unauthorized(joined)
    } else {
        SkyliftError::api(joined)
    }
}

/// Map a transport-level failure (connectivity, timeout, bad body) to a
/// network error.
pub(crate) fn transport_error(err: reqwest::Error) -> SkyliftError {
    SkyliftError::network(err.to_string())
}
