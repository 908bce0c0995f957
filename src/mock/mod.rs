//! Mock implementations for testing
//!
//! [`MockObjectStore`] is an in-memory [`ObjectStore`] with a builder API.
//! It records every write so tests can assert on executed mutations, and it
//! can be told to fail grouping fetches to exercise the degrade paths.

use crate::error::{IntentError, Result};
use crate::store::{
    GroupingKind, ObjectMetadata, ObjectStore, RawGrouping, StateId, StateType, StateValue,
};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// In-memory object store for tests
#[derive(Default)]
pub struct MockObjectStore {
    rooms: HashMap<String, RawGrouping>,
    functions: HashMap<String, RawGrouping>,
    objects: HashMap<StateId, ObjectMetadata>,
    display_names: HashMap<StateId, Vec<String>>,
    user_states: Vec<StateId>,
    values: Mutex<HashMap<StateId, Value>>,
    writes: Mutex<Vec<(StateId, Value)>>,
    fail_groupings: Option<GroupingKind>,
}

impl MockObjectStore {
    /// Create an empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a room grouping
    pub fn with_room(mut self, id: &str, name: &str, members: &[&str]) -> Self {
        self.rooms.insert(
            id.to_string(),
            RawGrouping {
                display_name: name.to_string(),
                members: members.iter().map(|m| m.to_string()).collect(),
            },
        );
        self
    }

    /// Add a function grouping
    pub fn with_function(mut self, id: &str, name: &str, members: &[&str]) -> Self {
        self.functions.insert(
            id.to_string(),
            RawGrouping {
                display_name: name.to_string(),
                members: members.iter().map(|m| m.to_string()).collect(),
            },
        );
        self
    }

    /// Add object metadata for a state
    pub fn with_object(mut self, state_id: &str, meta: ObjectMetadata) -> Self {
        self.objects.insert(state_id.to_string(), meta);
        self
    }

    /// Set the hierarchy display names of a state (state, channel, device)
    pub fn with_display_names(mut self, state_id: &str, names: &[&str]) -> Self {
        self.display_names.insert(
            state_id.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    /// Register a user-defined state
    pub fn with_user_state(mut self, state_id: &str) -> Self {
        self.user_states.push(state_id.to_string());
        self
    }

    /// Seed a current state value
    pub fn with_value(self, state_id: &str, value: Value) -> Self {
        self.values
            .lock()
            .expect("mock values lock")
            .insert(state_id.to_string(), value);
        self
    }

    /// Make fetches of one grouping kind fail
    pub fn failing_groupings(mut self, kind: GroupingKind) -> Self {
        self.fail_groupings = Some(kind);
        self
    }

    /// All writes recorded so far, in order
    pub fn recorded_writes(&self) -> Vec<(StateId, Value)> {
        self.writes.lock().expect("mock writes lock").clone()
    }

    /// Current value of a state, if any
    pub fn current_value(&self, state_id: &str) -> Option<Value> {
        self.values
            .lock()
            .expect("mock values lock")
            .get(state_id)
            .cloned()
    }
}

/// Metadata for a writable boolean switch state
pub fn switch_metadata(display_name: &str) -> ObjectMetadata {
    ObjectMetadata {
        display_name: display_name.to_string(),
        state_type: StateType::Bool,
        writable: true,
        role: "switch".to_string(),
        unit: None,
        min: None,
        max: None,
    }
}

/// Metadata for a writable dimmer level state (0-100)
pub fn dimmer_metadata(display_name: &str) -> ObjectMetadata {
    ObjectMetadata {
        display_name: display_name.to_string(),
        state_type: StateType::Number,
        writable: true,
        role: "level.dimmer".to_string(),
        unit: Some("%".to_string()),
        min: Some(0.0),
        max: Some(100.0),
    }
}

/// Metadata for a writable temperature setpoint state
pub fn thermostat_metadata(display_name: &str) -> ObjectMetadata {
    ObjectMetadata {
        display_name: display_name.to_string(),
        state_type: StateType::Number,
        writable: true,
        role: "level.temperature".to_string(),
        unit: Some("°C".to_string()),
        min: Some(5.0),
        max: Some(30.0),
    }
}

/// Metadata for a read-only sensor state
pub fn sensor_metadata(display_name: &str, unit: Option<&str>) -> ObjectMetadata {
    ObjectMetadata {
        display_name: display_name.to_string(),
        state_type: StateType::Number,
        writable: false,
        role: "value.temperature".to_string(),
        unit: unit.map(String::from),
        min: None,
        max: None,
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn fetch_groupings(&self, kind: GroupingKind) -> Result<HashMap<String, RawGrouping>> {
        if self.fail_groupings == Some(kind) {
            return Err(IntentError::store(format!(
                "mock failure fetching {}",
                kind.label()
            )));
        }
        Ok(match kind {
            GroupingKind::Room => self.rooms.clone(),
            GroupingKind::Function => self.functions.clone(),
        })
    }

    async fn fetch_object_metadata(&self, state_id: &str) -> Result<Option<ObjectMetadata>> {
        Ok(self.objects.get(state_id).cloned())
    }

    async fn fetch_state_value(&self, state_id: &str) -> Result<Option<StateValue>> {
        Ok(self
            .values
            .lock()
            .expect("mock values lock")
            .get(state_id)
            .cloned()
            .map(|value| StateValue {
                value,
                timestamp: Utc::now(),
            }))
    }

    async fn write_state_value(&self, state_id: &str, value: Value) -> Result<()> {
        self.writes
            .lock()
            .expect("mock writes lock")
            .push((state_id.to_string(), value.clone()));
        self.values
            .lock()
            .expect("mock values lock")
            .insert(state_id.to_string(), value);
        Ok(())
    }

    async fn fetch_display_names(&self, state_id: &str) -> Result<Vec<String>> {
        Ok(self.display_names.get(state_id).cloned().unwrap_or_default())
    }

    async fn list_states(&self, prefix: &str) -> Result<Vec<StateId>> {
        Ok(self
            .user_states
            .iter()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect())
    }
}
