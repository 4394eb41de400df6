use super::HelperError;
use base64::Engine;
use serde_json::{Map, Value};

pub const PAYLOAD_PARAM: &str = "payload";

/// Pulls the raw `payload` query value out of `<scheme>://...?payload=...`.
pub fn parse_invocation(uri: &str, scheme: &str) -> Result<String, HelperError> {
    let parsed = url::Url::parse(uri.trim()).map_err(|err| HelperError::InvalidUri {
        uri: uri.to_string(),
        reason: err.to_string(),
    })?;
    if !parsed.scheme().eq_ignore_ascii_case(scheme) {
        return Err(HelperError::InvalidScheme {
            expected: scheme.to_string(),
            found: parsed.scheme().to_string(),
        });
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == PAYLOAD_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.trim().is_empty())
        .ok_or(HelperError::MissingPayload)
}

/// Decodes a base64url JSON object from an already query-decoded value.
/// Padding is optional, and the standard alphabet is accepted too since `+`
/// may arrive as a space after query decoding.
pub fn decode_payload(raw: &str) -> Result<Map<String, Value>, HelperError> {
    let normalized = raw
        .trim()
        .chars()
        .filter(|ch| *ch != '=')
        .map(|ch| match ch {
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect::<String>();

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|err| HelperError::Decode(format!("base64: {err}")))?;
    let text =
        String::from_utf8(bytes).map_err(|err| HelperError::Decode(format!("utf-8: {err}")))?;
    match serde_json::from_str::<Value>(&text)
        .map_err(|err| HelperError::Decode(format!("json: {err}")))?
    {
        Value::Object(map) => Ok(map),
        other => Err(HelperError::Decode(format!(
            "payload is not a JSON object: {other}"
        ))),
    }
}
