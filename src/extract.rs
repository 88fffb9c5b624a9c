//! Decoding and reshaping of raw `cursorDiskKV` rows.
//!
//! Cursor's values are loosely structured JSON with no fixed schema, so the
//! decoded value is kept as a [`serde_json::Value`] and every tracked field is
//! read with explicit default-on-absent logic. A bad record produces a
//! [`RecordError`] instead of aborting the batch; the caller decides whether
//! to log it (conversations) or drop it silently (contexts).

use serde::Serialize;
use serde_json::Value;

/// Why a single record could not be turned into a [`ConversationRecord`].
#[derive(Debug)]
pub enum RecordError {
    /// The stored value was not valid JSON.
    Json(serde_json::Error),
    /// The stored value parsed, but was not a JSON object.
    NotAnObject,
    /// The key had nothing after its final `:`.
    EmptyIdentifier,
    /// A tracked field was present but neither an array nor an object.
    NotACollection(&'static str),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::Json(e) => write!(f, "invalid JSON: {e}"),
            RecordError::NotAnObject => write!(f, "value is not a JSON object"),
            RecordError::EmptyIdentifier => write!(f, "key has an empty identifier suffix"),
            RecordError::NotACollection(field) => {
                write!(f, "field {field:?} is not a collection")
            }
        }
    }
}

impl std::error::Error for RecordError {}

impl RecordError {
    /// Whether this was a JSON parse failure, as opposed to a structural
    /// problem with an otherwise valid value.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, RecordError::Json(_))
    }
}

/// Sizes of the context collections attached to a conversation.
///
/// Always fully populated: an absent or null collection counts as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    pub codebase_context_chunks: usize,
    pub attached_code_chunks: usize,
    pub relevant_files: usize,
    pub tool_results: usize,
    pub commits: usize,
    pub pull_requests: usize,
}

impl ConversationMetadata {
    /// The counts as `(name, count)` pairs, in the order they are serialized.
    pub fn entries(&self) -> [(&'static str, usize); 6] {
        [
            ("codebaseContextChunks", self.codebase_context_chunks),
            ("attachedCodeChunks", self.attached_code_chunks),
            ("relevantFiles", self.relevant_files),
            ("toolResults", self.tool_results),
            ("commits", self.commits),
            ("pullRequests", self.pull_requests),
        ]
    }
}

/// One `bubbleId:<id>` entry, reshaped for export.
///
/// The full decoded value is retained under `rawData` so nothing is lost by
/// the reshaping.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub bubble_id: String,
    pub full_key: String,
    /// The `type` tag of the conversation, null when absent.
    #[serde(rename = "type")]
    pub conversation_type: Option<String>,
    pub is_agentic: bool,
    pub request_id: String,
    pub metadata: ConversationMetadata,
    pub raw_data: Value,
}

/// One `messageRequestContext:<id>` entry, passed through unmodified.
#[derive(Debug, Clone, Serialize)]
pub struct ContextRecord {
    pub key: String,
    pub data: Value,
}

fn collection_len(obj: &serde_json::Map<String, Value>, field: &'static str) -> Result<usize, RecordError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Array(items)) => Ok(items.len()),
        Some(Value::Object(map)) => Ok(map.len()),
        Some(_) => Err(RecordError::NotACollection(field)),
    }
}

/// Decode one conversation row and reshape it into a [`ConversationRecord`].
///
/// The identifier is the substring after the final `:` of the key. Optional
/// fields default rather than fail: `isAgentic` to `false`, `requestId` to
/// the empty string, `type` to null, each tracked collection count to 0.
pub fn reshape_conversation(key: &str, raw_value: &str) -> Result<ConversationRecord, RecordError> {
    let data: Value = serde_json::from_str(raw_value).map_err(RecordError::Json)?;
    let obj = data.as_object().ok_or(RecordError::NotAnObject)?;

    let bubble_id = key.rsplit(':').next().unwrap_or(key);
    if bubble_id.is_empty() {
        return Err(RecordError::EmptyIdentifier);
    }

    let conversation_type = obj.get("type").and_then(Value::as_str).map(str::to_owned);
    let is_agentic = obj.get("isAgentic").and_then(Value::as_bool).unwrap_or(false);
    let request_id = obj
        .get("requestId")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned();

    let metadata = ConversationMetadata {
        codebase_context_chunks: collection_len(obj, "codebaseContextChunks")?,
        attached_code_chunks: collection_len(obj, "attachedCodeChunks")?,
        relevant_files: collection_len(obj, "relevantFiles")?,
        tool_results: collection_len(obj, "toolResults")?,
        commits: collection_len(obj, "commits")?,
        pull_requests: collection_len(obj, "pullRequests")?,
    };

    Ok(ConversationRecord {
        bubble_id: bubble_id.to_owned(),
        full_key: key.to_owned(),
        conversation_type,
        is_agentic,
        request_id,
        metadata,
        raw_data: data,
    })
}

/// Decode one context row. Undecodable values yield `None` and are dropped
/// from the context export without a diagnostic.
pub fn decode_context(key: &str, raw_value: &str) -> Option<ContextRecord> {
    let data: Value = serde_json::from_str(raw_value).ok()?;
    Some(ContextRecord {
        key: key.to_owned(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reshapes_full_record() {
        let raw = r#"{"type":"chat","isAgentic":true,"requestId":"req-1",
            "codebaseContextChunks":[1,2],"relevantFiles":["a.rs"],
            "toolResults":[{},{},{}]}"#;
        let rec = reshape_conversation("bubbleId:abc123", raw).unwrap();
        assert_eq!(rec.bubble_id, "abc123");
        assert_eq!(rec.full_key, "bubbleId:abc123");
        assert_eq!(rec.conversation_type.as_deref(), Some("chat"));
        assert!(rec.is_agentic);
        assert_eq!(rec.request_id, "req-1");
        assert_eq!(rec.metadata.codebase_context_chunks, 2);
        assert_eq!(rec.metadata.relevant_files, 1);
        assert_eq!(rec.metadata.tool_results, 3);
        assert_eq!(rec.metadata.attached_code_chunks, 0);
        assert_eq!(rec.metadata.commits, 0);
        assert_eq!(rec.metadata.pull_requests, 0);
    }

    #[test]
    fn defaults_apply_when_fields_absent() {
        let rec = reshape_conversation("bubbleId:x", "{}").unwrap();
        assert_eq!(rec.conversation_type, None);
        assert!(!rec.is_agentic);
        assert_eq!(rec.request_id, "");
        assert_eq!(rec.metadata, ConversationMetadata::default());
        assert_eq!(rec.raw_data, json!({}));
    }

    #[test]
    fn identifier_is_suffix_after_last_colon() {
        let rec = reshape_conversation("bubbleId:composer:abc", "{}").unwrap();
        assert_eq!(rec.bubble_id, "abc");
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = reshape_conversation("bubbleId:x", "{not json").unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn non_object_value_is_rejected() {
        let err = reshape_conversation("bubbleId:x", "[1,2,3]").unwrap_err();
        assert!(matches!(err, RecordError::NotAnObject));
        assert!(!err.is_parse_error());
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let err = reshape_conversation("bubbleId:", "{}").unwrap_err();
        assert!(matches!(err, RecordError::EmptyIdentifier));
    }

    #[test]
    fn scalar_in_tracked_collection_is_rejected() {
        let err = reshape_conversation("bubbleId:x", r#"{"commits":5}"#).unwrap_err();
        assert!(matches!(err, RecordError::NotACollection("commits")));
    }

    #[test]
    fn serialized_field_names_match_store_conventions() {
        let rec = reshape_conversation("bubbleId:abc", r#"{"type":"chat"}"#).unwrap();
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["bubbleId"], "abc");
        assert_eq!(v["fullKey"], "bubbleId:abc");
        assert_eq!(v["type"], "chat");
        assert_eq!(v["isAgentic"], false);
        assert_eq!(v["requestId"], "");
        assert_eq!(v["metadata"]["codebaseContextChunks"], 0);
        assert_eq!(v["metadata"]["pullRequests"], 0);
        assert!(v["rawData"].is_object());
    }

    #[test]
    fn context_decode_drops_bad_json() {
        assert!(decode_context("messageRequestContext:a", "{oops").is_none());
        let rec = decode_context("messageRequestContext:a", r#"{"k":1}"#).unwrap();
        assert_eq!(rec.key, "messageRequestContext:a");
        assert_eq!(rec.data, json!({"k":1}));
    }
}
