/// Blocking HTTP access to the refget sequence metadata endpoint.
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::errors::FetchError;
use crate::types::ResponseRecord;

/// Public ENA refget API.
pub const DEFAULT_BASE_URL: &str = "https://www.ebi.ac.uk/ena/cram/";

/// Anything that can turn an identifier into a response record.
///
/// A timeout is not an error: implementations return
/// [`ResponseRecord::timeout`] and the batch carries on.
pub trait MetadataSource {
    /// Fetch metadata for one identifier.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` for failures other than a timeout.
    fn fetch(&self, id: &str) -> Result<ResponseRecord, FetchError>;
}

/// Build the metadata URL for `id` under `base_url`.
///
/// The identifier is percent-encoded. Checksum identifiers are plain
/// alphanumerics and come through unchanged.
#[must_use]
pub fn metadata_url(base_url: &str, id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{base}/sequence/{}/metadata", urlencoding::encode(id))
}

/// refget client with a fixed base URL and per-request timeout.
pub struct MetadataClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl MetadataClient {
    /// Build a client. The timeout covers the whole request including the body.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Client` if the TLS backend cannot be initialised.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            base_url: base_url.to_owned(),
            http,
        })
    }
}

impl MetadataSource for MetadataClient {
    fn fetch(&self, id: &str) -> Result<ResponseRecord, FetchError> {
        let url = metadata_url(&self.base_url, id);
        debug!(%url, "requesting metadata");

        let transport = |source: reqwest::Error| FetchError::Transport {
            id: id.to_owned(),
            source,
        };

        let response = match self.http.get(&url).send() {
            Ok(response) => response,
            Err(err) if err.is_timeout() => return Ok(timed_out(id)),
            Err(err) => return Err(transport(err)),
        };

        let status = response.status();
        debug!(id, status = status.as_u16(), "response received");

        let body = match response.bytes() {
            Ok(body) => body,
            Err(err) if err.is_timeout() => return Ok(timed_out(id)),
            Err(err) => return Err(transport(err)),
        };

        let mut record = ResponseRecord::with_status(id, status.as_u16());
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(record);
        }
        match parse_payload(id, &body) {
            Ok(payload) => record.merge(payload),
            // Error pages are often HTML; the status code alone tells the story.
            Err(err) if !status.is_success() => {
                warn!(id, status = status.as_u16(), error = %err, "ignoring non-JSON error body");
            }
            Err(err) => return Err(err),
        }
        Ok(record)
    }
}

fn timed_out(id: &str) -> ResponseRecord {
    warn!(id, "request timed out");
    ResponseRecord::timeout(id)
}

/// Parse a response body into its top-level JSON object.
fn parse_payload(id: &str, body: &[u8]) -> Result<Map<String, Value>, FetchError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(FetchError::UnexpectedPayload {
            id: id.to_owned(),
            kind: json_kind(&other),
        }),
        Err(source) => Err(FetchError::MalformedBody {
            id: id.to_owned(),
            source,
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
