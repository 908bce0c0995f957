//! Intent parsing: one line of free text to a structured intent
//!
//! The parser either produces a fully populated [`ParsedIntent`] or
//! `None`, meaning "no deterministic intent, defer to the generative
//! pipeline". It never returns a partial result the caller has to
//! validate further.
//!
//! Pipeline, each stage short-circuiting to `None` on failure: context
//! matching (room/function, or a direct device-name match when neither is
//! found), action detection, value extraction, state resolution,
//! device-name narrowing, confidence scoring. A safety gate suppresses
//! every write action that has neither a full room+function context nor an
//! unambiguous direct device match; a room-wide write without a function
//! would hit every device in the room indiscriminately.

pub mod rules;
pub mod value;

pub use value::{ExtractedValue, Unit};

use crate::resolver::EnumResolver;
use crate::store::StateId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The closed set of deterministic actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Switch on (boolean true, or full level for dimmers)
    SetOn,
    /// Switch off
    SetOff,
    /// Assign an explicit numeric value
    SetValue,
    /// Step a numeric value up
    Increase,
    /// Step a numeric value down
    Decrease,
    /// Read current values, no mutation
    Query,
}

impl Action {
    /// Whether the action mutates device state
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::Query)
    }
}

/// A deterministically parsed voice command
///
/// Constructed fresh per [`IntentParser::parse`] call, consumed once by the
/// fast-path executor or discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedIntent {
    /// Detected action
    pub action: Action,
    /// Matched room display name
    pub room: Option<String>,
    /// Matched function display name
    pub function: Option<String>,
    /// Device name that identified or narrowed the target, lowercased
    pub device_name: Option<String>,
    /// Extracted numeric value (only meaningful for `SetValue`)
    pub value: Option<f64>,
    /// Unit of the extracted value
    pub unit: Option<Unit>,
    /// Heuristic reliability estimate in [0, 1]
    ///
    /// Additive: base 0.3, +0.2 each for room, function and action, +0.1
    /// for a value on `SetValue`, +0.1 for room and function together,
    /// +0.05 for a narrowing device name, capped at 1.0. An unambiguous
    /// direct device match without enums counts as full context and scores
    /// 0.65, above the default execution threshold.
    pub confidence: f64,
    /// Resolved target state ids
    pub state_ids: Vec<StateId>,
}

/// Rule-based parser from free text to [`ParsedIntent`]
pub struct IntentParser {
    resolver: Arc<EnumResolver>,
}

impl IntentParser {
    /// Create a parser backed by the given resolver
    pub fn new(resolver: Arc<EnumResolver>) -> Self {
        Self { resolver }
    }

    /// Parse one utterance; `None` means "defer to the generative pipeline"
    ///
    /// Side effects: logging only. Store failures inside resolution degrade
    /// to empty results and therefore to `None`, never to an error.
    pub async fn parse(&self, text: &str) -> Option<ParsedIntent> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }

        let room = self.resolver.match_room(&text).await;
        let function = self.resolver.match_function(&text).await;

        if room.is_none() && function.is_none() {
            return self.parse_direct_device(&text).await;
        }

        let action = match rules::detect_action(&text) {
            Some(action) => action,
            None => {
                debug!(room = ?room, function = ?function, "no action detected");
                return None;
            }
        };

        let full_context = room.is_some() && function.is_some();
        if action.is_write() && !full_context {
            debug!(
                ?action,
                room = ?room,
                function = ?function,
                "write action without room and function, deferring"
            );
            return None;
        }

        let extracted = if action == Action::SetValue {
            value::extract_value(&text)
        } else {
            None
        };

        let query = self
            .resolver
            .find_states(room.as_deref(), function.as_deref())
            .await;
        if query.state_ids.is_empty() {
            debug!(room = ?room, function = ?function, "no states resolved");
            return None;
        }

        let (state_ids, device_name) = if query.state_ids.len() > 1 {
            self.resolver
                .filter_by_device_name(&query.state_ids, &text)
                .await
        } else {
            (query.state_ids.clone(), None)
        };

        let confidence = score(ConfidenceInputs {
            room: query.room.is_some(),
            function: query.function.is_some(),
            action: true,
            value: action == Action::SetValue && extracted.is_some(),
            full_context,
            device_name: device_name.is_some(),
        });

        let intent = ParsedIntent {
            action,
            room: query.room,
            function: query.function,
            device_name,
            value: extracted.map(|v| v.value),
            unit: extracted.and_then(|v| v.unit),
            confidence,
            state_ids,
        };
        debug!(
            action = ?intent.action,
            confidence = intent.confidence,
            states = intent.state_ids.len(),
            "parsed intent"
        );
        Some(intent)
    }

    /// Direct device path: no room or function matched, but the text names
    /// exactly one known device ("schalte den Standventilator ein")
    async fn parse_direct_device(&self, text: &str) -> Option<ParsedIntent> {
        let device = self.resolver.search_by_device_name(text).await?;
        let action = rules::detect_action(text)?;

        let extracted = if action == Action::SetValue {
            value::extract_value(text)
        } else {
            None
        };

        // An unambiguous device match carries the same contextual weight as
        // a full room+function pair: the target is singular and explicit.
        let confidence = score(ConfidenceInputs {
            room: false,
            function: false,
            action: true,
            value: action == Action::SetValue && extracted.is_some(),
            full_context: true,
            device_name: true,
        });

        debug!(device = %device.name, ?action, confidence, "direct device match");
        Some(ParsedIntent {
            action,
            room: None,
            function: None,
            device_name: Some(device.name),
            value: extracted.map(|v| v.value),
            unit: extracted.and_then(|v| v.unit),
            confidence,
            state_ids: vec![device.state_id],
        })
    }
}

struct ConfidenceInputs {
    room: bool,
    function: bool,
    action: bool,
    value: bool,
    full_context: bool,
    device_name: bool,
}

/// Additive confidence score, capped at 1.0
///
/// Accumulated in twentieths (0.05 steps) so that sums like
/// 0.3 + 0.2 + 0.2 + 0.2 + 0.1 come out as exactly 1.0.
fn score(inputs: ConfidenceInputs) -> f64 {
    let mut points: u32 = 6;
    if inputs.room {
        points += 4;
    }
    if inputs.function {
        points += 4;
    }
    if inputs.action {
        points += 4;
    }
    if inputs.value {
        points += 2;
    }
    if inputs.full_context {
        points += 2;
    }
    if inputs.device_name {
        points += 1;
    }
    f64::from(points.min(20)) / 20.0
}
