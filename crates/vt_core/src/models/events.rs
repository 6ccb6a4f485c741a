//! Rally action events and the pre-event snapshot carried for undo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::court::{CourtState, RotationSlot};
use super::libero::LiberoSwap;
use super::player::TeamId;
use super::skill::{Outcome, Skill};

/// Everything an event must remember about the aggregate *before* it was
/// applied, so that truncating the log restores the prior state exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub score_a: u16,
    pub score_b: u16,
    pub serving_team: TeamId,
    pub court_a: CourtState,
    pub court_b: CourtState,
    pub libero_swap_a: LiberoSwap,
    pub libero_swap_b: LiberoSwap,
    pub rally_number: u32,
    pub service_run: u32,
}

impl StateSnapshot {
    pub fn score(&self, team: TeamId) -> u16 {
        match team {
            TeamId::A => self.score_a,
            TeamId::B => self.score_b,
        }
    }
}

/// One logged rally contact. Immutable once created; removed only by undo
/// operations that drop a contiguous most-recent-first prefix of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Monotonically increasing within a match
    pub id: u64,
    pub team: TeamId,
    pub player_id: String,
    pub slot: RotationSlot,
    pub skill: Skill,
    pub outcome: Outcome,
    pub timestamp: DateTime<Utc>,

    /// Team awarded the point by this contact, if it decided the rally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_to: Option<TeamId>,

    /// Pre-event aggregate snapshot backing exact reversal
    pub snapshot: StateSnapshot,
}

impl ActionEvent {
    pub fn ends_rally(&self) -> bool {
        self.outcome.ends_rally()
    }
}
