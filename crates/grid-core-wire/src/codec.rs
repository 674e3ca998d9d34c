//! Patch request/reply messages.
//!
//! A request travels as `{"id", "method", "args"}` and the authority answers with either
//! `{"id", "result"}` or `{"id", "error"}`. Wire ids are allocated here, independent of
//! [`PatchTicket::id`], so a client can outlive several dataset generations without
//! id collisions.

use grid_core::{PatchError, PatchReply, PatchRequest, PatchTicket};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::WireError;

/// Maps wire ids back to the tickets that produced them.
#[derive(Debug, Default)]
pub struct PatchCodec {
    next_id: u64,
    pending: HashMap<u64, PatchTicket>,
}

impl PatchCodec {
    /// Create an empty codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests encoded but not yet answered.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Encode `request`, remembering its ticket under a fresh wire id.
    pub fn encode_request(&mut self, request: &PatchRequest) -> Value {
        self.next_id = self.next_id.saturating_add(1);
        let id = self.next_id;
        self.pending.insert(id, request.ticket);
        request_message(id, &request.method, request.args())
    }

    /// Forget a request that never reached the authority.
    pub fn abandon(&mut self, message: &Value) -> Option<PatchTicket> {
        let id = message.get("id").and_then(Value::as_u64)?;
        self.pending.remove(&id)
    }

    /// Forget every outstanding request, returning their tickets.
    pub fn drain_pending(&mut self) -> Vec<PatchTicket> {
        let mut ids: Vec<u64> = self.pending.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| self.pending.remove(&id))
            .collect()
    }

    /// Decode a reply message.
    ///
    /// Replies whose id was never issued (or already answered) yield `Ok(None)`. A reply with a
    /// known id but neither `result` nor `error` fails its ticket with
    /// [`PatchError::MalformedResponse`].
    pub fn decode_reply(&mut self, message: Value) -> Result<Option<PatchReply>, WireError> {
        let mut obj = match message {
            Value::Object(obj) => obj,
            other => return Err(WireError::MalformedMessage(other.to_string())),
        };
        let Some(id) = obj.get("id").and_then(Value::as_u64) else {
            return Err(WireError::MalformedMessage(Value::Object(obj).to_string()));
        };
        let Some(ticket) = self.pending.remove(&id) else {
            tracing::warn!(id, "reply for an unknown request id");
            return Ok(None);
        };

        let reply = if let Some(error) = obj.remove("error") {
            PatchReply::rejected(ticket, &error)
        } else if let Some(result) = obj.remove("result") {
            PatchReply::accepted(ticket, result)
        } else {
            let text = Value::Object(obj).to_string();
            tracing::warn!(id, message = %text, "reply has neither result nor error");
            PatchReply {
                ticket,
                result: Err(PatchError::MalformedResponse(format!(
                    "reply without result or error: {text}"
                ))),
            }
        };
        Ok(Some(reply))
    }
}

/// Build a request message.
pub fn request_message(id: u64, method: &str, args: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("id".to_string(), Value::Number(id.into()));
    obj.insert("method".to_string(), Value::String(method.to_string()));
    obj.insert("args".to_string(), args);
    Value::Object(obj)
}

/// Build a success reply message.
pub fn result_message(id: u64, result: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("id".to_string(), Value::Number(id.into()));
    obj.insert("result".to_string(), result);
    Value::Object(obj)
}

/// Build an error reply message.
pub fn error_message(id: u64, error: Value) -> Value {
    let mut obj = Map::new();
    obj.insert("id".to_string(), Value::Number(id.into()));
    obj.insert("error".to_string(), error);
    Value::Object(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::{EditKey, Patch};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn request(id: u64) -> PatchRequest {
        PatchRequest {
            ticket: PatchTicket {
                id,
                generation: 0,
                key: EditKey::new(1, 2),
            },
            method: "edit_handler".into(),
            patches: vec![Patch::new(1, 2, "7")],
        }
    }

    #[test]
    fn test_request_shape() {
        let mut codec = PatchCodec::new();
        let message = codec.encode_request(&request(9));
        assert_eq!(
            message,
            json!({
                "id": 1,
                "method": "edit_handler",
                "args": [[{"row_index": 1, "column_index": 2, "value": "7"}]]
            })
        );
        assert_eq!(codec.pending_count(), 1);
    }

    #[test]
    fn test_reply_maps_back_to_ticket() {
        let mut codec = PatchCodec::new();
        let req = request(9);
        codec.encode_request(&req);

        let reply = codec
            .decode_reply(result_message(1, json!([])))
            .unwrap()
            .unwrap();
        assert_eq!(reply.ticket, req.ticket);
        assert_eq!(reply.result, Ok(json!([])));

        // Already answered.
        assert_eq!(codec.decode_reply(result_message(1, json!([]))).unwrap(), None);
    }

    #[test]
    fn test_error_values_are_stringified() {
        let mut codec = PatchCodec::new();
        codec.encode_request(&request(1));
        codec.encode_request(&request(2));

        let text = codec
            .decode_reply(error_message(1, json!("out of range")))
            .unwrap()
            .unwrap();
        assert_eq!(text.result, Err(PatchError::Rejected("out of range".into())));

        let object = codec
            .decode_reply(error_message(2, json!({"code": 3})))
            .unwrap()
            .unwrap();
        assert_eq!(object.result, Err(PatchError::Rejected(r#"{"code":3}"#.into())));
    }

    #[test]
    fn test_reply_without_body_fails_its_ticket() {
        let mut codec = PatchCodec::new();
        let req = request(1);
        codec.encode_request(&req);

        let reply = codec.decode_reply(json!({"id": 1})).unwrap().unwrap();
        assert_eq!(reply.ticket, req.ticket);
        assert!(matches!(reply.result, Err(PatchError::MalformedResponse(_))));
        assert_eq!(codec.pending_count(), 0);

        // Unknown id without a body is just dropped.
        assert_eq!(codec.decode_reply(json!({"id": 7})).unwrap(), None);
    }

    #[test]
    fn test_reply_without_id_is_malformed() {
        let mut codec = PatchCodec::new();
        codec.encode_request(&request(1));
        assert!(matches!(
            codec.decode_reply(json!({"result": []})),
            Err(WireError::MalformedMessage(_))
        ));
        assert!(matches!(
            codec.decode_reply(json!([1])),
            Err(WireError::MalformedMessage(_))
        ));
        assert_eq!(codec.pending_count(), 1);
    }

    #[test]
    fn test_abandon_forgets_request() {
        let mut codec = PatchCodec::new();
        let req = request(4);
        let message = codec.encode_request(&req);
        assert_eq!(codec.abandon(&message), Some(req.ticket));
        assert_eq!(codec.pending_count(), 0);
    }
}
