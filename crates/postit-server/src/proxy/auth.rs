use std::fmt;

use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Pre-rendered `Authorization: Basic ...` header for the upstream.
///
/// The value is marked sensitive so hyper and `tracing` never print it.
#[derive(Clone)]
pub struct BasicAuth {
    header: HeaderValue,
}

impl BasicAuth {
    pub fn new(username: &str, password: &str) -> Result<Self, InvalidHeaderValue> {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        let mut header = HeaderValue::from_str(&format!("Basic {encoded}"))?;
        header.set_sensitive(true);
        Ok(Self { header })
    }

    pub fn header_value(&self) -> HeaderValue {
        self.header.clone()
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BasicAuth([redacted])")
    }
}
