//! Entry point for `<scheme>://open?payload=<base64url json>` links.
//!
//! Nothing here talks to the portal: failures end up in the helper log only.

pub mod dispatch;
pub mod invocation;
pub mod payload;

pub use dispatch::{dispatch_payload, DispatchOutcome, HelperActions};
pub use invocation::{decode_payload, parse_invocation, PAYLOAD_PARAM};
pub use payload::{ExcelOpenMode, HelperPayload, KNOWN_ACTIONS};

use crate::shared::RuntimeLog;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HelperError {
    #[error("No URL argument provided")]
    MissingUri,
    #[error("invalid URI {uri}: {reason}")]
    InvalidUri { uri: String, reason: String },
    #[error("Invalid scheme: {found} (expected {expected})")]
    InvalidScheme { expected: String, found: String },
    #[error("No payload in URL")]
    MissingPayload,
    #[error("Failed to parse payload: {0}")]
    Decode(String),
    #[error("No action specified")]
    MissingAction,
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("invalid payload for {0}")]
    InvalidPayload(String),
}

/// Parses, decodes and dispatches one invocation. Every failure is logged
/// before it is returned.
pub fn handle_invocation(
    uri: Option<&str>,
    scheme: &str,
    actions: &dyn HelperActions,
    log: &RuntimeLog,
) -> Result<DispatchOutcome, HelperError> {
    let result = uri
        .filter(|uri| !uri.trim().is_empty())
        .ok_or(HelperError::MissingUri)
        .and_then(|uri| {
            log.info("helper.received", uri);
            parse_invocation(uri, scheme)
        })
        .and_then(|raw| decode_payload(&raw))
        .and_then(HelperPayload::from_value)
        .map(|payload| dispatch_payload(&payload, actions, log));

    if let Err(err) = &result {
        log.error("helper.rejected", &err.to_string());
    }
    result
}
