//! Per-conversation state.
//!
//! A [`Session`] owns everything one conversation needs between runs: the
//! memory store holding the warehouse profile, and the loop state that is
//! cleared after every run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use stockpilot_config::WarehouseProfile;
use stockpilot_core::memory::MemoryStore;
use uuid::Uuid;

use crate::classify::ResponseKind;
use crate::prompts::PREFERENCES_KEY;

/// What happened during one perceive/decide/act/synthesize cycle.
#[derive(Debug, Clone, Serialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub intent: String,
    pub tool_name: String,
    pub action_result: String,
    pub synthesis: String,
    pub kind: ResponseKind,
    pub finished_at: DateTime<Utc>,
}

/// Loop state for the run in progress.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    pub iteration: u32,
    pub last_response: Option<String>,
    pub trace: Vec<IterationRecord>,
}

impl ConversationState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_clean(&self) -> bool {
        self.iteration == 0 && self.last_response.is_none() && self.trace.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub memory: MemoryStore,
    pub state: ConversationState,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            memory: MemoryStore::new(),
            state: ConversationState::default(),
        }
    }

    /// Store the warehouse profile under the preferences key.
    pub fn set_profile(&mut self, profile: &WarehouseProfile) {
        self.memory.store(
            PREFERENCES_KEY,
            json!({
                "warehouse_location": profile.location,
                "shipment_volume": profile.shipment_volume,
                "automation_level": profile.automation_level,
            }),
        );
    }

    /// The stored profile object, empty when none was set.
    pub fn preferences(&self) -> Value {
        self.memory.get(PREFERENCES_KEY)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
