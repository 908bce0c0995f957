//! Fast-path execution: apply a parsed intent without the generative model
//!
//! Given an intent with sufficient confidence, the executor mutates every
//! resolved writable state according to per-action rules and builds a
//! templated German confirmation. Targets whose metadata cannot be fetched
//! or whose type does not fit the action are silently skipped; if nothing
//! ends up executed the executor returns `None` so the caller falls through
//! to the LLM pipeline instead of emitting an empty success.

use crate::config::FastPathConfig;
use crate::parser::{Action, ParsedIntent};
use crate::resolver::EnumResolver;
use crate::store::{ObjectMetadata, ObjectStore, StateId, StateType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One successfully written state mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedMutation {
    /// Target state id
    pub state_id: StateId,
    /// Display name of the target
    pub display_name: String,
    /// Previous value, where the action had to read it (increase/decrease)
    pub previous: Option<Value>,
    /// Value written
    pub written: Value,
}

/// Outcome of a fast-path execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastPathResult {
    /// Executed action
    pub action: Action,
    /// Room context of the intent
    pub room: Option<String>,
    /// Function context of the intent
    pub function: Option<String>,
    /// Confidence of the executed intent
    pub confidence: f64,
    /// Templated natural-language confirmation
    pub confirmation: String,
    /// Mutations performed (empty for queries)
    pub mutations: Vec<ExecutedMutation>,
    /// Execution timestamp
    pub timestamp: DateTime<Utc>,
}

/// Executes parsed intents directly against the object store
pub struct FastPathExecutor {
    store: Arc<dyn ObjectStore>,
    resolver: Arc<EnumResolver>,
    config: FastPathConfig,
}

impl FastPathExecutor {
    /// Create an executor over the given store and resolver
    pub fn new(
        store: Arc<dyn ObjectStore>,
        resolver: Arc<EnumResolver>,
        config: FastPathConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            config,
        }
    }

    /// Execute an intent; `None` means "defer to the generative pipeline"
    ///
    /// Intents below the confidence threshold are never executed. Store
    /// failures degrade to skipped targets, never to an error.
    pub async fn execute(&self, intent: &ParsedIntent) -> Option<FastPathResult> {
        if intent.confidence < self.config.confidence_threshold {
            debug!(
                confidence = intent.confidence,
                threshold = self.config.confidence_threshold,
                "confidence below threshold, deferring"
            );
            return None;
        }

        match intent.action {
            Action::Query => self.execute_query(intent).await,
            _ => self.execute_write(intent).await,
        }
    }

    async fn execute_write(&self, intent: &ParsedIntent) -> Option<FastPathResult> {
        let writable = self.resolver.get_writable_states(&intent.state_ids).await;

        let mut mutations = Vec::new();
        for (state_id, meta) in writable {
            let Some((previous, written)) = self.plan_mutation(&state_id, &meta, intent).await
            else {
                continue;
            };
            match self.store.write_state_value(&state_id, written.clone()).await {
                Ok(()) => mutations.push(ExecutedMutation {
                    state_id,
                    display_name: meta.display_name,
                    previous,
                    written,
                }),
                Err(e) => warn!(state = %state_id, error = %e, "state write failed, skipping"),
            }
        }

        if mutations.is_empty() {
            debug!(action = ?intent.action, "no state executed, deferring");
            return None;
        }

        info!(
            action = ?intent.action,
            mutations = mutations.len(),
            "fast path executed"
        );
        let confirmation = write_confirmation(intent, &mutations);
        Some(FastPathResult {
            action: intent.action,
            room: intent.room.clone(),
            function: intent.function.clone(),
            confidence: intent.confidence,
            confirmation,
            mutations,
            timestamp: Utc::now(),
        })
    }

    /// Compute the value to write, reading the current value where the
    /// action requires it. `None` means the action does not apply to this
    /// target's type.
    async fn plan_mutation(
        &self,
        state_id: &str,
        meta: &ObjectMetadata,
        intent: &ParsedIntent,
    ) -> Option<(Option<Value>, Value)> {
        match intent.action {
            Action::SetOn => match meta.state_type {
                StateType::Bool => Some((None, json!(true))),
                StateType::Number => {
                    let on_value = if meta.is_level_role() { 100.0 } else { 1.0 };
                    Some((None, json!(on_value)))
                }
                StateType::Text => None,
            },
            Action::SetOff => match meta.state_type {
                StateType::Bool => Some((None, json!(false))),
                StateType::Number => Some((None, json!(0.0))),
                StateType::Text => None,
            },
            Action::SetValue => {
                let value = intent.value?;
                let coerced = match meta.state_type {
                    StateType::Number => json!(value),
                    StateType::Bool => json!(value > 0.0),
                    StateType::Text => json!(format_number(value)),
                };
                Some((None, coerced))
            }
            Action::Increase | Action::Decrease => {
                if meta.state_type != StateType::Number {
                    return None;
                }
                let current = match self.store.fetch_state_value(state_id).await {
                    Ok(state) => state.and_then(|s| s.value.as_f64()).unwrap_or(0.0),
                    Err(e) => {
                        debug!(state = %state_id, error = %e, "current value unreadable, skipping");
                        return None;
                    }
                };

                let temperature = meta.is_temperature_role();
                let step = if temperature {
                    self.config.temperature_step
                } else {
                    self.config.level_step
                };
                let signed = if intent.action == Action::Increase {
                    step
                } else {
                    -step
                };
                let min = meta.min.unwrap_or(0.0);
                let max = meta.max.unwrap_or(if temperature {
                    self.config.default_temperature_max
                } else {
                    self.config.default_level_max
                });
                let target = (current + signed).clamp(min, max);
                Some((Some(json!(current)), json!(target)))
            }
            Action::Query => None,
        }
    }

    async fn execute_query(&self, intent: &ParsedIntent) -> Option<FastPathResult> {
        let mut readings = Vec::new();
        for state_id in intent.state_ids.iter().take(self.config.max_query_states) {
            let meta = match self.store.fetch_object_metadata(state_id).await {
                Ok(Some(meta)) => meta,
                Ok(None) => continue,
                Err(e) => {
                    debug!(state = %state_id, error = %e, "metadata fetch failed, skipping");
                    continue;
                }
            };
            let value = match self.store.fetch_state_value(state_id).await {
                Ok(Some(state)) => state.value,
                Ok(None) => continue,
                Err(e) => {
                    debug!(state = %state_id, error = %e, "value fetch failed, skipping");
                    continue;
                }
            };
            readings.push((meta, value));
        }

        if readings.is_empty() {
            debug!("no state readable, deferring");
            return None;
        }

        let confirmation = query_confirmation(&readings);
        Some(FastPathResult {
            action: intent.action,
            room: intent.room.clone(),
            function: intent.function.clone(),
            confidence: intent.confidence,
            confirmation,
            mutations: Vec::new(),
            timestamp: Utc::now(),
        })
    }
}

/// Phrase describing what was acted on, preferring the most specific
/// context the intent carries
fn target_phrase(intent: &ParsedIntent, mutations: &[ExecutedMutation]) -> String {
    if let Some(device) = &intent.device_name {
        return device.clone();
    }
    if let (Some(function), Some(room)) = (&intent.function, &intent.room) {
        return format!("{function} im {room}");
    }
    mutations
        .iter()
        .map(|m| m.display_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn write_confirmation(intent: &ParsedIntent, mutations: &[ExecutedMutation]) -> String {
    let target = target_phrase(intent, mutations);
    match intent.action {
        Action::SetOn => format!("Ich habe {target} eingeschaltet."),
        Action::SetOff => format!("Ich habe {target} ausgeschaltet."),
        Action::SetValue => {
            let value = intent.value.map(format_number).unwrap_or_default();
            let unit = intent.unit.map(|u| u.suffix()).unwrap_or("");
            format!("Ich habe {target} auf {value}{unit} gestellt.")
        }
        Action::Increase | Action::Decrease => {
            let outcome = mutations
                .first()
                .and_then(|m| m.written.as_f64())
                .map(format_number)
                .unwrap_or_default();
            let verb = if intent.action == Action::Increase {
                "erhöht"
            } else {
                "verringert"
            };
            format!("Ich habe {target} auf {outcome} {verb}.")
        }
        Action::Query => String::new(),
    }
}

fn query_confirmation(readings: &[(ObjectMetadata, Value)]) -> String {
    let parts: Vec<String> = readings
        .iter()
        .map(|(meta, value)| {
            let rendered = render_value(value, meta);
            format!("{} ist {rendered}", meta.display_name)
        })
        .collect();
    format!("{}.", parts.join(", "))
}

/// Human-readable value rendering for confirmations
fn render_value(value: &Value, meta: &ObjectMetadata) -> String {
    match value {
        Value::Bool(true) => "ein".to_string(),
        Value::Bool(false) => "aus".to_string(),
        Value::Number(n) => {
            let rendered = n.as_f64().map(format_number).unwrap_or_else(|| n.to_string());
            match &meta.unit {
                Some(unit) => format!("{rendered} {unit}"),
                None => rendered,
            }
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Trim a trailing ".0" off whole numbers for display
fn format_number(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        format!("{}", value.round() as i64)
    } else {
        format!("{value}")
    }
}
