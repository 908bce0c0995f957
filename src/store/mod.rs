//! Object-store access for enum groupings and device state objects
//!
//! The core never talks to a concrete backend directly. Everything it needs
//! from the persistent object/state store goes through the [`ObjectStore`]
//! trait: grouping definitions for rooms and functions, per-state object
//! metadata, current state values, and state writes. Implementations wrap
//! whatever store the embedding assistant uses; tests use the mock in
//! `crate::mock`.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Identifier of a single device state.
///
/// Opaque hierarchical path string, dot-separated:
/// `adapter.instance.device.channel.state`. The core never interprets the
/// segments beyond prefix relationships.
pub type StateId = String;

/// Which grouping collection to fetch from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingKind {
    /// Physical rooms
    Room,
    /// Functional categories (lighting, heating, ...)
    Function,
}

impl GroupingKind {
    /// Human-readable label, used in log messages
    pub fn label(&self) -> &'static str {
        match self {
            GroupingKind::Room => "rooms",
            GroupingKind::Function => "functions",
        }
    }
}

/// Raw grouping definition as delivered by the store
///
/// Member lists come back exactly as stored: possibly unsorted, possibly
/// containing duplicates. The resolver normalizes them on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGrouping {
    /// Display name of the grouping (e.g. "Wohnzimmer", "Beleuchtung")
    pub display_name: String,
    /// Member state identifiers
    pub members: Vec<StateId>,
}

/// Declared value type of a state object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    /// Boolean switch state
    Bool,
    /// Numeric state (levels, temperatures, ...)
    Number,
    /// Free-text state
    Text,
}

/// Object metadata for a single state
///
/// Fetched on demand for every resolution so that writability and type
/// always reflect the live store; the core never caches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Display name of the state object
    pub display_name: String,
    /// Declared value type
    pub state_type: StateType,
    /// Whether the state accepts writes
    pub writable: bool,
    /// Role string (e.g. "level.dimmer", "value.temperature", "switch")
    pub role: String,
    /// Declared unit, if any
    pub unit: Option<String>,
    /// Declared minimum value
    pub min: Option<f64>,
    /// Declared maximum value
    pub max: Option<f64>,
}

impl ObjectMetadata {
    /// Whether the role marks a dimmer/level style numeric state
    pub fn is_level_role(&self) -> bool {
        let role = self.role.to_lowercase();
        role.contains("level") || role.contains("dimmer") || role.contains("blind")
    }

    /// Whether the role or unit marks a temperature style numeric state
    pub fn is_temperature_role(&self) -> bool {
        let role = self.role.to_lowercase();
        if role.contains("temperature") || role.contains("thermo") {
            return true;
        }
        matches!(self.unit.as_deref(), Some("°C") | Some("°F") | Some("K"))
    }
}

/// Current value of a state, with its last-change timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateValue {
    /// Raw stored value
    pub value: Value,
    /// Last change timestamp
    pub timestamp: DateTime<Utc>,
}

/// Narrow async interface to the persistent object/state store
///
/// All calls are issued and awaited one at a time; the core tolerates every
/// failure by degrading to empty results, so implementations should return
/// errors rather than panic.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch all groupings of one kind, keyed by grouping id
    async fn fetch_groupings(&self, kind: GroupingKind) -> Result<HashMap<String, RawGrouping>>;

    /// Fetch object metadata for one state, `None` if the object is unknown
    async fn fetch_object_metadata(&self, state_id: &str) -> Result<Option<ObjectMetadata>>;

    /// Fetch the current value of one state, `None` if never set
    async fn fetch_state_value(&self, state_id: &str) -> Result<Option<StateValue>>;

    /// Write a new value to a state
    ///
    /// Fire-and-forget from the core's perspective: the acknowledgment is
    /// only used for error logging, never for correctness.
    async fn write_state_value(&self, state_id: &str, value: Value) -> Result<()>;

    /// Display names along the hierarchy of a state: the state itself, its
    /// parent channel and its grandparent device, in that order. Missing
    /// levels are simply absent.
    async fn fetch_display_names(&self, state_id: &str) -> Result<Vec<String>>;

    /// List all state ids under a namespace prefix (used for the
    /// user-defined states namespace)
    async fn list_states(&self, prefix: &str) -> Result<Vec<StateId>>;
}
