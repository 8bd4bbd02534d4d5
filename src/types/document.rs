//! Document-store record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{JukeboxError, Result};

/// A single record returned by a query or aggregate call.
///
/// Documents are JSON objects; the store-assigned `_id` field is the
/// record's promoted primary key, reachable through [`Document::id`].
/// Aggregation results reuse the same shape — a `$group` stage produces
/// documents whose `_id` holds the group key (possibly itself an object).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// The store-assigned primary key, when present.
    pub fn id(&self) -> Option<&Value> {
        self.0.get("_id")
    }

    /// Look up a field by name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field, returning the previous value if any.
    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the document, yielding its primary key.
    pub fn into_id(mut self) -> Option<Value> {
        self.0.remove("_id")
    }

    /// Consume the document, yielding the underlying field map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<Value> for Document {
    type Error = JukeboxError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(JukeboxError::InvalidInput(format!(
                "expected a document (JSON object), got {}",
                json_type_name(&other)
            ))),
        }
    }
}

/// Payload for an insert: exactly one record, or a sequence of records.
///
/// The tagged union replaces runtime type sniffing at the write path —
/// a caller holding loose JSON goes through [`InsertPayload::try_from`],
/// which rejects anything that is neither an object nor an array of
/// objects with [`JukeboxError::InvalidInput`].
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPayload {
    /// One record; dispatches to the single-record write path.
    Single(Document),
    /// A batch of records; dispatches to the bulk write path.
    Many(Vec<Document>),
}

impl From<Document> for InsertPayload {
    fn from(document: Document) -> Self {
        InsertPayload::Single(document)
    }
}

impl From<Vec<Document>> for InsertPayload {
    fn from(documents: Vec<Document>) -> Self {
        InsertPayload::Many(documents)
    }
}

impl TryFrom<Value> for InsertPayload {
    type Error = JukeboxError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(InsertPayload::Single(Document::from(fields))),
            Value::Array(items) => items
                .into_iter()
                .map(Document::try_from)
                .collect::<Result<Vec<_>>>()
                .map(InsertPayload::Many),
            other => Err(JukeboxError::InvalidInput(format!(
                "insert expects a document or a sequence of documents, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

/// Acknowledgement of a completed insert.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertAck {
    /// One record written.
    Single {
        /// Store-assigned ID of the inserted record.
        inserted_id: String,
    },
    /// A batch written.
    Many {
        /// Store-assigned IDs, in submission order.
        inserted_ids: Vec<String>,
    },
}

impl InsertAck {
    /// Number of records the store acknowledged.
    pub fn inserted_count(&self) -> usize {
        match self {
            InsertAck::Single { .. } => 1,
            InsertAck::Many { inserted_ids } => inserted_ids.len(),
        }
    }
}

/// One leaderboard row: append-only, written at game over, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Player name (may be empty for anonymous play, in which case the
    /// orchestrator skips the insert).
    pub name: String,
    /// Final score including genre/decade bonuses.
    pub score: i64,
    /// Human-readable mode label, e.g. `"rock + pop from 1970s to 1990s"`.
    pub mode: String,
    /// Submission time.
    pub time: DateTime<Utc>,
}

impl LeaderboardEntry {
    /// Create an entry stamped with the current time.
    pub fn new(name: impl Into<String>, score: i64, mode: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score,
            mode: mode.into(),
            time: Utc::now(),
        }
    }
}

impl TryFrom<LeaderboardEntry> for InsertPayload {
    type Error = JukeboxError;

    fn try_from(entry: LeaderboardEntry) -> Result<Self> {
        let value = serde_json::to_value(entry)?;
        InsertPayload::try_from(value)
    }
}

/// Typed view over a quiz dataset row from the `musicgen` collection.
///
/// `am_genre` and `id` are optional because question-set queries project
/// them away when they are not needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    /// Store-assigned primary key.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Value>,
    /// Song title.
    pub song: String,
    /// Performing artist, the answer the player must guess.
    pub artist: String,
    /// Source chart, e.g. `"70s-rock"`; encodes the decade.
    pub chart_name: String,
    /// Genre label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub am_genre: Option<String>,
    /// Catalog track ID, used for preview audio and artist images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TryFrom<Document> for SongRecord {
    type Error = JukeboxError;

    fn try_from(document: Document) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(document.into_inner()))?)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
