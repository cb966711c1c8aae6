//  TRACER.rs
//    by Lut99
//
//  Description:
//!   Implements [`Tracer`], the append-only structured log of engine decisions, and its pure
//!   Mermaid sequence-diagram export.
//

use std::collections::BTreeSet;
use std::fmt::Write as _;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/***** LIBRARY *****/
/// The kind of decision a [`TraceEntry`] records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EventType {
    Action,
    ActionProhibited,
    TokenCreate,
    TokenStateChange,
}

/// The structured payload of a [`TraceEntry`], typed per [`EventType`] rather than a loose
/// string-keyed map.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraceDetails {
    Action { party: String, action_name: String, args: Vec<(String, String)> },
    ActionProhibited { party: String, action_name: String, reason: String },
    TokenCreate { token_id: String, template_name: String, owner: String },
    TokenStateChange { token_id: String, template_name: String, owner: String, new_state: String, trigger_event: String },
}

/// A single entry in a [`Tracer`]'s history.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEntry {
    /// A monotonic sequence number rather than a wall-clock timestamp: replaying a trace only
    /// needs a stable ordering, not real time.
    pub seq: u64,
    /// The kind of decision this entry records.
    pub event_type: EventType,
    /// The structured payload of this entry.
    pub details: TraceDetails,
}

/// Records key engine decisions to build a detailed, replayable history of a simulation run.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tracer {
    history: Vec<TraceEntry>,
    next_seq: u64,
}
impl Tracer {
    /// Constructs an empty tracer.
    #[inline]
    pub fn new() -> Self { Self::default() }

    /// Returns the full, append-only history recorded so far.
    #[inline]
    pub fn history(&self) -> &[TraceEntry] { &self.history }

    fn push(&mut self, event_type: EventType, details: TraceDetails) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.history.push(TraceEntry { seq, event_type, details });
    }

    /// Records a successfully permitted action.
    pub fn log_action(&mut self, party: impl Into<String>, action_name: impl Into<String>, args: Vec<(String, String)>) {
        self.push(EventType::Action, TraceDetails::Action { party: party.into(), action_name: action_name.into(), args });
    }

    /// Records an attempted action that was prohibited, either by an active embargo or a
    /// failing guard.
    pub fn log_action_prohibited(&mut self, party: impl Into<String>, action_name: impl Into<String>, reason: impl Into<String>) {
        self.push(EventType::ActionProhibited, TraceDetails::ActionProhibited { party: party.into(), action_name: action_name.into(), reason: reason.into() });
    }

    /// Records the minting of a new deontic token instance.
    pub fn log_token_creation(&mut self, token_id: impl Into<String>, template_name: impl Into<String>, owner: impl Into<String>) {
        self.push(EventType::TokenCreate, TraceDetails::TokenCreate { token_id: token_id.into(), template_name: template_name.into(), owner: owner.into() });
    }

    /// Records a deontic token instance's state transition (activation, discharge, or the owner
    /// change caused by a delegation).
    pub fn log_token_state_change(
        &mut self,
        token_id: impl Into<String>,
        template_name: impl Into<String>,
        owner: impl Into<String>,
        new_state: impl Into<String>,
        trigger_event: impl Into<String>,
    ) {
        self.push(
            EventType::TokenStateChange,
            TraceDetails::TokenStateChange {
                token_id: token_id.into(),
                template_name: template_name.into(),
                owner: owner.into(),
                new_state: new_state.into(),
                trigger_event: trigger_event.into(),
            },
        );
    }

    /// Renders this tracer's history as a Mermaid `sequenceDiagram`.
    ///
    /// A pure transformation of the trace into line-based text; one reasonable concrete
    /// rendering, not load-bearing for the engine's own semantics.
    pub fn to_sequence_diagram(&self) -> String {
        let mut participants = BTreeSet::new();
        for entry in &self.history {
            match &entry.details {
                TraceDetails::Action { party, .. } => { participants.insert(party.clone()); }
                TraceDetails::ActionProhibited { party, .. } => { participants.insert(party.clone()); }
                TraceDetails::TokenCreate { owner, .. } => { participants.insert(owner.clone()); }
                TraceDetails::TokenStateChange { owner, .. } => { participants.insert(owner.clone()); }
            }
        }

        let mut out = String::new();
        out.push_str("sequenceDiagram\n    participant Engine\n");
        for p in &participants {
            let _ = writeln!(out, "    participant {p}");
        }
        out.push('\n');

        for entry in &self.history {
            match &entry.details {
                TraceDetails::Action { party, action_name, .. } => {
                    let _ = writeln!(out, "    {party}->>+Engine: {action_name}()");
                }
                TraceDetails::ActionProhibited { party, action_name, reason } => {
                    let reason = reason.replace('"', "'");
                    let _ = writeln!(out, "    {party}->>+Engine: [Attempt] {action_name}()");
                    let _ = writeln!(out, "    Engine-->>-{party}: Prohibited");
                    let _ = writeln!(out, "    Note over Engine,{party}: {reason}");
                }
                TraceDetails::TokenCreate { template_name, owner, .. } => {
                    let _ = writeln!(out, "    Note over {owner}: Token '{template_name}' CREATED");
                }
                TraceDetails::TokenStateChange { template_name, owner, new_state, trigger_event, .. } => {
                    let _ = writeln!(out, "    Engine-->>-Engine: Event: {trigger_event}");
                    let _ = writeln!(out, "    Note over {owner}: Token '{template_name}' is now {new_state}");
                }
            }
        }

        out.truncate(out.trim_end().len());
        out
    }
}


/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic() {
        let mut tracer = Tracer::new();
        tracer.log_action("alice", "borrowItem", vec![]);
        tracer.log_action_prohibited("bob", "borrowItem", "Guard failed");
        assert_eq!(tracer.history()[0].seq, 0);
        assert_eq!(tracer.history()[1].seq, 1);
    }

    #[test]
    fn sequence_diagram_includes_all_participants() {
        let mut tracer = Tracer::new();
        tracer.log_action("alice", "borrowItem", vec![]);
        tracer.log_token_creation("token-1", "Borrow", "alice");
        let diagram = tracer.to_sequence_diagram();
        assert!(diagram.starts_with("sequenceDiagram"));
        assert!(diagram.contains("participant alice"));
        assert!(diagram.contains("Token 'Borrow' CREATED"));
    }

    #[test]
    fn prohibited_action_escapes_quotes_for_mermaid() {
        let mut tracer = Tracer::new();
        tracer.log_action_prohibited("bob", "borrowItem", "Guard failed: self.\"isOverdue\"");
        let diagram = tracer.to_sequence_diagram();
        assert!(!diagram.contains('"'));
    }
}
