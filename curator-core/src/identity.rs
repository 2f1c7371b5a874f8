//! Identity types for Curator records

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// Identifier of an insight or changeset record.
///
/// Records are keyed by the 32-character hex form of a UUIDv7, so ids sort
/// by creation time and stay opaque strings on the wire.
pub type RecordId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new record id (hex-encoded UUIDv7).
pub fn new_record_id() -> RecordId {
    Uuid::now_v7().simple().to_string()
}

/// Fixed-width, lexically sortable text form of a timestamp.
///
/// Two timestamps encoded by this function compare the same way as text and
/// as instants. Mixing encodings breaks that guarantee.
pub fn sortable_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Who is acting: the session, user and persona behind a call.
///
/// Every part may be empty when the transport carried no identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor {
    pub session_id: String,
    pub user_id: String,
    pub persona: String,
}

impl Actor {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        persona: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            persona: persona.into(),
        }
    }
}
