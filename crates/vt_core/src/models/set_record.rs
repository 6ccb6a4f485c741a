//! Immutable archive of a completed set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::events::ActionEvent;
use super::player::TeamId;
use super::stats::PlayerStatLine;

/// Everything preserved when a set closes. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    /// 1-based set number
    pub number: u8,
    pub winner: TeamId,
    pub score_a: u16,
    pub score_b: u16,

    /// Events in chronological order (oldest first)
    pub events: Vec<ActionEvent>,

    /// Per-player rollup computed at archive time, keyed by player id
    pub player_stats: BTreeMap<String, PlayerStatLine>,
}

impl SetRecord {
    pub fn final_score(&self, team: TeamId) -> u16 {
        match team {
            TeamId::A => self.score_a,
            TeamId::B => self.score_b,
        }
    }
}
