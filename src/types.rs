/// Per-identifier response records.
///
/// A record is an insertion-ordered mapping. `requested_id` comes first,
/// `status_code` second, then every top-level key of the remote payload in
/// the order the server sent them. The order is what every formatter
/// renders, so it must stay deterministic.
use serde::Serialize;
use serde_json::{Map, Value};

/// Key holding the identifier exactly as the caller supplied it.
pub const REQUESTED_ID: &str = "requested_id";
/// Key holding the HTTP status (integer) or the timeout sentinel (string).
pub const STATUS_CODE: &str = "status_code";
/// Key holding the error description on timeout records.
pub const ERROR: &str = "error";

/// Status sentinel recorded when the request timed out.
pub const TIMEOUT_STATUS: &str = "408";
/// Error description recorded when the request timed out.
pub const TIMEOUT_MESSAGE: &str = "connection timeout";

/// One identifier's result: request metadata merged with the remote payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResponseRecord(Map<String, Value>);

impl ResponseRecord {
    /// A record for a request that got an HTTP response with `status`.
    #[must_use]
    pub fn with_status(requested_id: &str, status: u16) -> Self {
        let mut fields = Map::new();
        fields.insert(REQUESTED_ID.to_owned(), Value::from(requested_id));
        fields.insert(STATUS_CODE.to_owned(), Value::from(status));
        Self(fields)
    }

    /// A record for a request that timed out. No payload is ever merged in.
    #[must_use]
    pub fn timeout(requested_id: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(REQUESTED_ID.to_owned(), Value::from(requested_id));
        fields.insert(STATUS_CODE.to_owned(), Value::from(TIMEOUT_STATUS));
        fields.insert(ERROR.to_owned(), Value::from(TIMEOUT_MESSAGE));
        Self(fields)
    }

    /// Merge top-level payload keys, last write wins.
    ///
    /// A colliding key keeps its original position and takes the payload's
    /// value. `requested_id` is never overwritten.
    pub fn merge(&mut self, payload: Map<String, Value>) {
        for (key, value) in payload {
            if key == REQUESTED_ID {
                continue;
            }
            self.0.insert(key, value);
        }
    }

    /// The identifier this record was requested for.
    #[must_use]
    pub fn requested_id(&self) -> &str {
        self.get(REQUESTED_ID)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Whether this is a timeout record.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.get(STATUS_CODE).and_then(Value::as_str) == Some(TIMEOUT_STATUS)
    }

    /// Look up a single field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// All fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}
