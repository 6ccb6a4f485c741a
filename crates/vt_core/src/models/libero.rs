//! Libero substitution configuration and the derived swap record.

use serde::{Deserialize, Serialize};

use super::court::RotationSlot;

/// Per-team libero automation settings (user-authored, validated at the
/// setup boundary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LiberoConfig {
    pub enabled: bool,

    /// Designated libero
    pub libero_id: Option<String>,

    /// Middle blockers the libero may replace, in preference order (max 2).
    /// Two entries also cover the "DUAL" setup surface; the automation still
    /// tracks a single active swap.
    #[serde(default)]
    pub replacement_ids: Vec<String>,
}

impl LiberoConfig {
    /// Automation can only run with a libero and at least one candidate
    pub fn is_complete(&self) -> bool {
        self.enabled && self.libero_id.is_some() && !self.replacement_ids.is_empty()
    }

    /// Drop references to players no longer on the roster
    pub fn retain_known_players(&mut self, known: impl Fn(&str) -> bool) {
        if let Some(id) = &self.libero_id {
            if !known(id) {
                self.libero_id = None;
            }
        }
        self.replacement_ids.retain(|id| known(id));
    }
}

/// Tracks an active libero-for-middle swap.
///
/// Invariant: when active, the libero occupies exactly `slot` and that slot
/// is back row. A violated record is discarded and the automation pass
/// clears the libero out of any front-row slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LiberoSwap {
    pub active: bool,
    pub slot: Option<RotationSlot>,
    pub libero_id: Option<String>,
    pub replaced_id: Option<String>,
}

impl LiberoSwap {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn activate(slot: RotationSlot, libero_id: String, replaced_id: String) -> Self {
        Self { active: true, slot: Some(slot), libero_id: Some(libero_id), replaced_id: Some(replaced_id) }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
