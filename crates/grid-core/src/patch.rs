//! Patch protocol: committing cell edits to a remote authority.
//!
//! # Overview
//!
//! A committed edit becomes a [`PatchRequest`] carrying the full proposed value. The request is
//! handed to a [`PatchAuthority`] (a transport the host supplies) and the grid keeps working while
//! it is in flight. Replies come back tagged with the [`PatchTicket`] of their request:
//!
//! - an array of accepted patches, whose (possibly coerced) values become authoritative
//! - an error value, stringified for display
//! - something else, reported as [`PatchError::MalformedResponse`]
//!
//! At most one request per cell is in flight. Commits that arrive for a cell that is still
//! waiting are queued; a newer queued value replaces an older one, and the queued value is sent
//! as soon as the in-flight reply has been processed.
//!
//! Tickets carry the dataset generation they were issued under, so replies that arrive after the
//! dataset was replaced are dropped instead of being applied to unrelated rows.

use crate::error::PatchError;
use crate::model::{CellValue, EditKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An atomic proposed change to one cell's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Dataset row index.
    pub row_index: usize,
    /// Column index.
    pub column_index: usize,
    /// Full proposed (or accepted) value.
    pub value: CellValue,
}

impl Patch {
    /// Create a patch.
    pub fn new(row_index: usize, column_index: usize, value: impl Into<CellValue>) -> Self {
        Self {
            row_index,
            column_index,
            value: value.into(),
        }
    }

    /// The cell this patch targets.
    pub fn key(&self) -> EditKey {
        EditKey::new(self.row_index, self.column_index)
    }
}

/// Identity of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchTicket {
    /// Request id, unique per grid instance.
    pub id: u64,
    /// Dataset generation the request was issued under.
    pub generation: u64,
    /// The cell the request commits.
    pub key: EditKey,
}

/// A request ready to be handed to an authority.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchRequest {
    /// Ticket echoed back in the reply.
    pub ticket: PatchTicket,
    /// Edit-handler id on the authority side.
    pub method: String,
    /// Proposed patches (one per request in practice).
    pub patches: Vec<Patch>,
}

impl PatchRequest {
    /// The wire `args` value: a single positional argument holding the patch list.
    pub fn args(&self) -> serde_json::Value {
        let patches = self
            .patches
            .iter()
            .map(|p| serde_json::to_value(p).unwrap_or(serde_json::Value::Null))
            .collect::<Vec<_>>();
        serde_json::Value::Array(vec![serde_json::Value::Array(patches)])
    }
}

/// A reply to a [`PatchRequest`], before it is interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchReply {
    /// Ticket of the request being answered.
    pub ticket: PatchTicket,
    /// Raw result value, or the failure that replaced it.
    pub result: Result<serde_json::Value, PatchError>,
}

impl PatchReply {
    /// A successful raw reply.
    pub fn accepted(ticket: PatchTicket, result: serde_json::Value) -> Self {
        Self {
            ticket,
            result: Ok(result),
        }
    }

    /// A rejection carrying the authority's error value.
    pub fn rejected(ticket: PatchTicket, error: &serde_json::Value) -> Self {
        Self {
            ticket,
            result: Err(PatchError::Rejected(rejection_message(error))),
        }
    }
}

/// Transport seam between the grid and the remote authority.
///
/// Implementations must never block in [`poll`](Self::poll); the grid calls it from its input
/// loop.
pub trait PatchAuthority {
    /// Hand a request to the authority.
    fn send(&mut self, request: PatchRequest) -> Result<(), PatchError>;

    /// Replies that have arrived since the last poll.
    fn poll(&mut self) -> Vec<PatchReply>;
}

/// Display text of an authority error value (strings verbatim, anything else as JSON).
pub fn rejection_message(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interpret a raw success value as a list of accepted patches.
pub fn parse_patch_response(value: serde_json::Value) -> Result<Vec<Patch>, PatchError> {
    if !value.is_array() {
        return Err(PatchError::MalformedResponse(format!(
            "expected a list of patches, got {value}"
        )));
    }
    serde_json::from_value::<Vec<Patch>>(value)
        .map_err(|e| PatchError::MalformedResponse(e.to_string()))
}

/// Whether a commit was sent immediately or queued behind an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request was issued.
    Sent(PatchTicket),
    /// The cell already had a request in flight.
    Queued,
}

/// Interpretation of one reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchResolution {
    /// The cell the reply belongs to.
    pub key: EditKey,
    /// Accepted patches, or the cell-local failure.
    pub result: Result<Vec<Patch>, PatchError>,
    /// Queued value that was sent right after this reply, if any.
    pub resubmitted: Option<CellValue>,
}

/// Request bookkeeping for one grid instance.
#[derive(Debug, Clone, Default)]
pub struct PatchProtocol {
    method: String,
    generation: u64,
    next_id: u64,
    in_flight: HashMap<EditKey, PatchTicket>,
    queued: HashMap<EditKey, CellValue>,
    outbox: Vec<PatchRequest>,
}

impl PatchProtocol {
    /// Create a protocol that addresses the authority's `method` edit handler.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    /// Edit-handler id.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Current dataset generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Forget every pending request and start issuing tickets for `generation`.
    pub fn reset(&mut self, generation: u64) {
        if !self.in_flight.is_empty() || !self.queued.is_empty() {
            tracing::debug!(
                in_flight = self.in_flight.len(),
                queued = self.queued.len(),
                generation,
                "discarding pending patches"
            );
        }
        self.generation = generation;
        self.in_flight.clear();
        self.queued.clear();
        self.outbox.clear();
    }

    /// Whether `key` has a request in flight.
    pub fn is_in_flight(&self, key: &EditKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Whether `key` has a queued value waiting.
    pub fn is_queued(&self, key: &EditKey) -> bool {
        self.queued.contains_key(key)
    }

    /// Number of requests awaiting a reply.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Propose `value` for `key`.
    pub fn submit(&mut self, key: EditKey, value: CellValue) -> SubmitOutcome {
        if self.in_flight.contains_key(&key) {
            tracing::debug!(%key, "patch queued behind in-flight request");
            self.queued.insert(key, value);
            return SubmitOutcome::Queued;
        }
        SubmitOutcome::Sent(self.issue(key, value))
    }

    fn issue(&mut self, key: EditKey, value: CellValue) -> PatchTicket {
        self.next_id += 1;
        let ticket = PatchTicket {
            id: self.next_id,
            generation: self.generation,
            key,
        };
        self.in_flight.insert(key, ticket);
        self.outbox.push(PatchRequest {
            ticket,
            method: self.method.clone(),
            patches: vec![Patch::new(key.row_index, key.column_index, value)],
        });
        tracing::debug!(%key, id = ticket.id, "patch request issued");
        ticket
    }

    /// Drain the requests issued since the last call.
    pub fn take_requests(&mut self) -> Vec<PatchRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Mark a request as failed before it reached the authority.
    pub fn fail(&mut self, ticket: PatchTicket, error: PatchError) -> Option<PatchResolution> {
        self.resolve(PatchReply {
            ticket,
            result: Err(error),
        })
    }

    /// Whether a reply for `ticket` would be accepted.
    ///
    /// Tickets from an earlier dataset generation are [`PatchError::Stale`]; so are tickets that
    /// are not the cell's in-flight request.
    pub fn admit(&self, ticket: &PatchTicket) -> Result<(), PatchError> {
        if ticket.generation != self.generation {
            return Err(PatchError::Stale);
        }
        match self.in_flight.get(&ticket.key) {
            Some(current) if current.id == ticket.id => Ok(()),
            _ => Err(PatchError::Stale),
        }
    }

    /// Interpret a reply. Returns `None` for stale or unknown replies.
    pub fn resolve(&mut self, reply: PatchReply) -> Option<PatchResolution> {
        let ticket = reply.ticket;
        if let Err(err) = self.admit(&ticket) {
            tracing::warn!(
                id = ticket.id,
                key = %ticket.key,
                generation = ticket.generation,
                current = self.generation,
                error = %err,
                "dropping patch reply"
            );
            return None;
        }
        self.in_flight.remove(&ticket.key);

        let result = reply.result.and_then(parse_patch_response);
        if let Err(err) = &result {
            match err {
                PatchError::MalformedResponse(_) => {
                    tracing::warn!(key = %ticket.key, error = %err, "malformed patch response")
                }
                _ => tracing::debug!(key = %ticket.key, error = %err, "patch rejected"),
            }
        }

        let resubmitted = self.queued.remove(&ticket.key).inspect(|value| {
            self.issue(ticket.key, value.clone());
        });

        Some(PatchResolution {
            key: ticket.key,
            result,
            resubmitted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> EditKey {
        EditKey::new(1, 2)
    }

    #[test]
    fn test_request_args_shape() {
        let mut protocol = PatchProtocol::new("edit_handler");
        protocol.submit(key(), json!("7"));
        let requests = protocol.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "edit_handler");
        assert_eq!(
            requests[0].args(),
            json!([[{"row_index": 1, "column_index": 2, "value": "7"}]])
        );
        assert!(protocol.take_requests().is_empty());
    }

    #[test]
    fn test_success_reply() {
        let mut protocol = PatchProtocol::new("m");
        let SubmitOutcome::Sent(ticket) = protocol.submit(key(), json!("7")) else {
            panic!("expected a request");
        };
        let resolution = protocol
            .resolve(PatchReply::accepted(
                ticket,
                json!([{"row_index": 1, "column_index": 2, "value": 7}]),
            ))
            .unwrap();
        assert_eq!(resolution.result, Ok(vec![Patch::new(1, 2, 7)]));
        assert!(!protocol.is_in_flight(&key()));
    }

    #[test]
    fn test_rejection_is_stringified() {
        let mut protocol = PatchProtocol::new("m");
        let SubmitOutcome::Sent(ticket) = protocol.submit(key(), json!("7")) else {
            panic!("expected a request");
        };
        let resolution = protocol
            .resolve(PatchReply::rejected(ticket, &json!("out of range")))
            .unwrap();
        let err = resolution.result.unwrap_err();
        assert_eq!(err.to_string(), "out of range");

        assert_eq!(rejection_message(&json!({"code": 3})), r#"{"code":3}"#);
    }

    #[test]
    fn test_malformed_reply() {
        for bad in [json!({"ok": true}), json!([{"row_index": 1, "value": 7}])] {
            let mut protocol = PatchProtocol::new("m");
            let SubmitOutcome::Sent(ticket) = protocol.submit(key(), json!("7")) else {
                panic!("expected a request");
            };
            let resolution = protocol.resolve(PatchReply::accepted(ticket, bad)).unwrap();
            assert!(matches!(
                resolution.result,
                Err(PatchError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn test_per_cell_queue_last_write_wins() {
        let mut protocol = PatchProtocol::new("m");
        let SubmitOutcome::Sent(first) = protocol.submit(key(), json!("1")) else {
            panic!("expected a request");
        };
        assert_eq!(protocol.submit(key(), json!("2")), SubmitOutcome::Queued);
        assert_eq!(protocol.submit(key(), json!("3")), SubmitOutcome::Queued);
        // Other cells are independent.
        assert!(matches!(
            protocol.submit(EditKey::new(0, 0), json!("x")),
            SubmitOutcome::Sent(_)
        ));
        assert_eq!(protocol.take_requests().len(), 2);

        let resolution = protocol
            .resolve(PatchReply::accepted(first, json!([])))
            .unwrap();
        assert_eq!(resolution.resubmitted, Some(json!("3")));
        assert!(protocol.is_in_flight(&key()));
        assert!(!protocol.is_queued(&key()));

        let requests = protocol.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].patches[0].value, json!("3"));
    }

    #[test]
    fn test_stale_and_duplicate_replies_are_dropped() {
        let mut protocol = PatchProtocol::new("m");
        let SubmitOutcome::Sent(ticket) = protocol.submit(key(), json!("7")) else {
            panic!("expected a request");
        };
        protocol.reset(1);
        assert_eq!(protocol.admit(&ticket), Err(PatchError::Stale));
        assert_eq!(
            protocol.resolve(PatchReply::accepted(ticket, json!([]))),
            None
        );

        let SubmitOutcome::Sent(ticket) = protocol.submit(key(), json!("7")) else {
            panic!("expected a request");
        };
        assert_eq!(ticket.generation, 1);
        assert!(
            protocol
                .resolve(PatchReply::accepted(ticket, json!([])))
                .is_some()
        );
        assert_eq!(
            protocol.resolve(PatchReply::accepted(ticket, json!([]))),
            None
        );
    }
}
