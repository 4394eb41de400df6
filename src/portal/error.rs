use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("invalid response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("malformed task: {0}")]
    Malformed(String),
}

const BODY_PREVIEW_CHARS: usize = 200;

pub(crate) fn body_preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

pub(crate) fn from_ureq(url: &str, err: ureq::Error) -> PortalError {
    match err {
        ureq::Error::Status(status, response) => PortalError::Status {
            url: url.to_string(),
            status,
            body: body_preview(&response.into_string().unwrap_or_default()),
        },
        ureq::Error::Transport(transport) => PortalError::Transport {
            url: url.to_string(),
            reason: transport.to_string(),
        },
    }
}
