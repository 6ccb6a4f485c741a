//! Match aggregate state.
//!
//! `MatchState` holds everything the tracker knows about the live match. It
//! is mutated only through the closed set of operations defined here and in
//! `engine::scoring`; every operation returns an optional [`Advisory`]
//! instead of failing. A thread-safe global instance is provided for the
//! JSON API layer; the engine itself never touches it.

use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::engine::advisory::Advisory;
use crate::engine::libero::run_libero_pass;
use crate::engine::rally::{next_rally_state, RallyState};
use crate::engine::rotation;
use crate::models::{
    ActionEvent, CourtSide, CourtState, LiberoConfig, LiberoSwap, Player, Position,
    RotationDirection, RotationSlot, SetRecord, SetRules, StateSnapshot, TeamId,
};

/// Global match state singleton
pub static MATCH_STATE: Lazy<Arc<RwLock<MatchState>>> =
    Lazy::new(|| Arc::new(RwLock::new(MatchState::default())));

/// Live match aggregate
///
/// The event log is ordered most-recent-first; its order is the sole source
/// of truth for what happened, and all derived views (stats, rally legality,
/// undo) are pure functions of it plus the fields below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Both teams' players
    pub roster: Vec<Player>,

    pub court_a: CourtState,
    pub court_b: CourtState,

    pub score_a: u16,
    pub score_b: u16,
    pub serving_team: TeamId,

    /// 1-based current set
    pub set_number: u8,
    pub sets_won_a: u8,
    pub sets_won_b: u8,

    /// Live event log, most recent first
    pub events: Vec<ActionEvent>,

    /// Archived completed sets
    pub set_records: Vec<SetRecord>,

    pub libero_config_a: LiberoConfig,
    pub libero_config_b: LiberoConfig,
    pub libero_swap_a: LiberoSwap,
    pub libero_swap_b: LiberoSwap,

    pub rules: SetRules,

    /// Side of center team A is displayed on (team B takes the other)
    #[serde(default)]
    pub team_a_side: CourtSide,

    /// Completed rallies in the current set
    pub rally_number: u32,

    /// Consecutive points by the current serving team
    pub service_run: u32,

    /// Next event id to mint
    #[serde(default)]
    pub(crate) next_event_id: u64,
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchState {
    /// Create an empty match
    pub fn new() -> Self {
        Self {
            roster: Vec::new(),
            court_a: CourtState::new(),
            court_b: CourtState::new(),
            score_a: 0,
            score_b: 0,
            serving_team: TeamId::A,
            set_number: 1,
            sets_won_a: 0,
            sets_won_b: 0,
            events: Vec::new(),
            set_records: Vec::new(),
            libero_config_a: LiberoConfig::default(),
            libero_config_b: LiberoConfig::default(),
            libero_swap_a: LiberoSwap::inactive(),
            libero_swap_b: LiberoSwap::inactive(),
            rules: SetRules::default(),
            team_a_side: CourtSide::Left,
            rally_number: 0,
            service_run: 0,
            next_event_id: 1,
        }
    }

    // ========================
    // Per-team accessors
    // ========================

    pub fn court(&self, team: TeamId) -> &CourtState {
        match team {
            TeamId::A => &self.court_a,
            TeamId::B => &self.court_b,
        }
    }

    pub fn court_mut(&mut self, team: TeamId) -> &mut CourtState {
        match team {
            TeamId::A => &mut self.court_a,
            TeamId::B => &mut self.court_b,
        }
    }

    pub fn score(&self, team: TeamId) -> u16 {
        match team {
            TeamId::A => self.score_a,
            TeamId::B => self.score_b,
        }
    }

    pub(crate) fn score_mut(&mut self, team: TeamId) -> &mut u16 {
        match team {
            TeamId::A => &mut self.score_a,
            TeamId::B => &mut self.score_b,
        }
    }

    pub fn sets_won(&self, team: TeamId) -> u8 {
        match team {
            TeamId::A => self.sets_won_a,
            TeamId::B => self.sets_won_b,
        }
    }

    pub fn libero_config(&self, team: TeamId) -> &LiberoConfig {
        match team {
            TeamId::A => &self.libero_config_a,
            TeamId::B => &self.libero_config_b,
        }
    }

    pub fn libero_swap(&self, team: TeamId) -> &LiberoSwap {
        match team {
            TeamId::A => &self.libero_swap_a,
            TeamId::B => &self.libero_swap_b,
        }
    }

    pub(crate) fn set_libero_state(&mut self, team: TeamId, court: CourtState, swap: LiberoSwap) {
        match team {
            TeamId::A => {
                self.court_a = court;
                self.libero_swap_a = swap;
            }
            TeamId::B => {
                self.court_b = court;
                self.libero_swap_b = swap;
            }
        }
    }

    pub fn side(&self, team: TeamId) -> CourtSide {
        match (team, self.team_a_side) {
            (TeamId::A, side) => side,
            (TeamId::B, CourtSide::Left) => CourtSide::Right,
            (TeamId::B, CourtSide::Right) => CourtSide::Left,
        }
    }

    // ========================
    // Roster management
    // ========================

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.roster.iter().find(|p| p.id == player_id)
    }

    pub fn add_player(&mut self, player: Player) {
        self.roster.push(player);
    }

    /// Update the mutable fields of a player; the id never changes
    pub fn update_player(
        &mut self,
        player_id: &str,
        name: Option<String>,
        number: Option<u8>,
        position: Option<Position>,
    ) -> Option<Advisory> {
        let Some(player) = self.roster.iter_mut().find(|p| p.id == player_id) else {
            return Some(Advisory::warn(format!("Unknown player: {}", player_id)));
        };
        if let Some(name) = name {
            player.name = name;
        }
        if let Some(number) = number {
            player.number = number;
        }
        if let Some(position) = position {
            player.position = position;
        }
        self.cross_validate_references();
        None
    }

    /// Explicitly remove a player and every reference to them
    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let idx = self.roster.iter().position(|p| p.id == player_id)?;
        let player = self.roster.remove(idx);
        self.court_a.remove_player(player_id);
        self.court_b.remove_player(player_id);
        self.cross_validate_references();
        Some(player)
    }

    /// Replace one team's roster wholesale
    pub fn replace_roster(&mut self, team: TeamId, players: Vec<Player>) {
        self.roster.retain(|p| p.team != team);
        self.roster.extend(players.into_iter().map(|mut p| {
            p.team = team;
            p
        }));
        let known: Vec<String> = self.roster.iter().map(|p| p.id.clone()).collect();
        for slot in RotationSlot::ALL {
            for court in [TeamId::A, TeamId::B] {
                let stale = self
                    .court(court)
                    .occupant(slot)
                    .is_some_and(|id| !known.iter().any(|k| k == id));
                if stale {
                    self.court_mut(court).clear(slot);
                }
            }
        }
        self.cross_validate_references();
    }

    /// Drop libero config / swap references that no longer resolve
    pub(crate) fn cross_validate_references(&mut self) {
        let ids: Vec<String> = self.roster.iter().map(|p| p.id.clone()).collect();
        let known = |id: &str| ids.iter().any(|k| k == id);
        self.libero_config_a.retain_known_players(known);
        self.libero_config_b.retain_known_players(known);
        for team in [TeamId::A, TeamId::B] {
            let swap = self.libero_swap(team);
            let dangling = swap.active
                && (swap.libero_id.as_deref().is_some_and(|id| !known(id))
                    || swap.replaced_id.as_deref().is_some_and(|id| !known(id)));
            if dangling {
                match team {
                    TeamId::A => self.libero_swap_a.clear(),
                    TeamId::B => self.libero_swap_b.clear(),
                }
            }
        }
    }

    // ========================
    // Court management
    // ========================

    /// Assign a player to a slot on their team's court
    pub fn assign_player(
        &mut self,
        team: TeamId,
        slot: RotationSlot,
        player_id: &str,
    ) -> Option<Advisory> {
        let Some(player) = self.player(player_id) else {
            return Some(Advisory::warn(format!("Unknown player: {}", player_id)));
        };
        if player.team != team {
            return Some(Advisory::error(format!(
                "Player {} is not on team {}",
                player.name, team
            )));
        }
        if player.is_libero() && slot.is_front_row() {
            return Some(Advisory::error(format!(
                "Rejected assignment: libero {} cannot take front-row slot {}",
                player.name,
                slot.number()
            )));
        }
        self.court_mut(team).assign(slot, player_id);
        self.run_libero_automation(team, None)
    }

    pub fn clear_slot(&mut self, team: TeamId, slot: RotationSlot) -> Option<Advisory> {
        self.court_mut(team).clear(slot);
        self.run_libero_automation(team, None)
    }

    /// Swap two slots within one team's court
    pub fn swap_slots(
        &mut self,
        team: TeamId,
        a: RotationSlot,
        b: RotationSlot,
    ) -> Option<Advisory> {
        let mut court = self.court(team).clone();
        court.swap(a, b);
        let moved_libero_front = [a, b].into_iter().any(|slot| {
            slot.is_front_row()
                && court
                    .occupant(slot)
                    .and_then(|id| self.player(id))
                    .is_some_and(Player::is_libero)
        });
        if moved_libero_front {
            return Some(Advisory::error("Rejected swap: libero cannot move to the front row"));
        }
        *self.court_mut(team) = court;
        self.run_libero_automation(team, None)
    }

    /// Rotate a team's court as seen on screen; the abstract direction is
    /// the visual one composed with the team's display side.
    pub fn rotate_visual(
        &mut self,
        team: TeamId,
        direction: RotationDirection,
    ) -> Option<Advisory> {
        let effective = direction.for_side(self.side(team));
        let court = rotation::rotated(self.court(team), effective);
        *self.court_mut(team) = court;
        self.run_libero_automation(team, Some(effective))
    }

    /// Re-run the libero automation for one team and commit the result
    pub(crate) fn run_libero_automation(
        &mut self,
        team: TeamId,
        rotation: Option<RotationDirection>,
    ) -> Option<Advisory> {
        let result = run_libero_pass(
            self.court(team),
            &self.roster,
            self.libero_config(team),
            self.libero_swap(team),
            rotation,
            self.serving_team,
            team,
        );
        self.set_libero_state(team, result.court, result.swap);
        result.notice
    }

    /// Set a team's libero configuration, cross-validating the ids
    pub fn set_libero_config(&mut self, team: TeamId, config: LiberoConfig) -> Option<Advisory> {
        let mut config = config;
        config.replacement_ids.truncate(2);
        let before =
            config.replacement_ids.len() + usize::from(config.libero_id.is_some());
        let ids: Vec<String> =
            self.roster.iter().filter(|p| p.team == team).map(|p| p.id.clone()).collect();
        config.retain_known_players(|id| ids.iter().any(|k| k == id));
        let after = config.replacement_ids.len() + usize::from(config.libero_id.is_some());
        match team {
            TeamId::A => self.libero_config_a = config,
            TeamId::B => self.libero_config_b = config,
        }
        let automation = self.run_libero_automation(team, None);
        if after < before {
            return Some(Advisory::warn("Dropped libero config ids not on the roster"));
        }
        automation
    }

    /// Clear one team's court and swap record
    pub fn reset_court(&mut self, team: TeamId) {
        self.court_mut(team).clear_all();
        match team {
            TeamId::A => self.libero_swap_a.clear(),
            TeamId::B => self.libero_swap_b.clear(),
        }
    }

    /// Wipe everything back to an empty match
    pub fn reset_match(&mut self) {
        *self = MatchState::new();
    }

    // ========================
    // Read-only queries
    // ========================

    pub fn last_event(&self) -> Option<&ActionEvent> {
        self.events.first()
    }

    /// Current rally legality (allowed skills + acting team)
    pub fn rally_state(&self) -> RallyState {
        next_rally_state(self.last_event(), self.serving_team)
    }

    /// Player ids currently on court for a team
    pub fn on_court_ids(&self, team: TeamId) -> Vec<String> {
        self.court(team).occupied_ids()
    }

    /// Winner of the match, if already decided
    pub fn match_winner(&self) -> Option<TeamId> {
        let needed = self.rules.sets_to_win();
        if self.sets_won_a >= needed {
            Some(TeamId::A)
        } else if self.sets_won_b >= needed {
            Some(TeamId::B)
        } else {
            None
        }
    }

    // ========================
    // Undo snapshots
    // ========================

    pub(crate) fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            score_a: self.score_a,
            score_b: self.score_b,
            serving_team: self.serving_team,
            court_a: self.court_a.clone(),
            court_b: self.court_b.clone(),
            libero_swap_a: self.libero_swap_a.clone(),
            libero_swap_b: self.libero_swap_b.clone(),
            rally_number: self.rally_number,
            service_run: self.service_run,
        }
    }

    pub(crate) fn restore_snapshot(&mut self, snapshot: &StateSnapshot) {
        self.score_a = snapshot.score_a;
        self.score_b = snapshot.score_b;
        self.serving_team = snapshot.serving_team;
        self.court_a = snapshot.court_a.clone();
        self.court_b = snapshot.court_b.clone();
        self.libero_swap_a = snapshot.libero_swap_a.clone();
        self.libero_swap_b = snapshot.libero_swap_b.clone();
        self.rally_number = snapshot.rally_number;
        self.service_run = snapshot.service_run;
    }
}

// ========================
// Global State Access Functions
// ========================

/// Get a read lock on the global match state
pub fn get_state() -> std::sync::RwLockReadGuard<'static, MatchState> {
    MATCH_STATE.read().expect("MATCH_STATE lock poisoned")
}

/// Get a write lock on the global match state
pub fn get_state_mut() -> std::sync::RwLockWriteGuard<'static, MatchState> {
    MATCH_STATE.write().expect("MATCH_STATE lock poisoned")
}

/// Reset the global state to an empty match
pub fn reset_state() {
    *MATCH_STATE.write().expect("MATCH_STATE lock poisoned") = MatchState::new();
}

/// Replace the entire global state
pub fn set_state(new_state: MatchState) {
    *MATCH_STATE.write().expect("MATCH_STATE lock poisoned") = new_state;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(team: TeamId, id: &str, position: Position) -> Player {
        let mut p = Player::new(team, id, 1, position);
        p.id = id.to_string();
        p
    }

    fn state_with_team_a() -> MatchState {
        let mut state = MatchState::new();
        state.add_player(player(TeamId::A, "oh1", Position::OutsideHitter));
        state.add_player(player(TeamId::A, "mb1", Position::MiddleBlocker));
        state.add_player(player(TeamId::A, "lib", Position::Libero));
        state
    }

    #[test]
    fn test_assign_rejects_front_row_libero() {
        let mut state = state_with_team_a();
        let advisory = state.assign_player(TeamId::A, RotationSlot::S3, "lib");
        assert!(advisory.is_some_and(|a| a.is_error()));
        assert_eq!(state.court_a.occupant(RotationSlot::S3), None);

        assert!(state
            .assign_player(TeamId::A, RotationSlot::S5, "lib")
            .is_none_or(|a| !a.is_error()));
        assert_eq!(state.court_a.occupant(RotationSlot::S5), Some("lib"));
    }

    #[test]
    fn test_assign_rejects_wrong_team() {
        let mut state = state_with_team_a();
        let advisory = state.assign_player(TeamId::B, RotationSlot::S1, "oh1");
        assert!(advisory.is_some_and(|a| a.is_error()));
        assert!(state.court_b.is_empty());
    }

    #[test]
    fn test_swap_slots_rejects_libero_into_front_row() {
        let mut state = state_with_team_a();
        state.assign_player(TeamId::A, RotationSlot::S5, "lib");
        state.assign_player(TeamId::A, RotationSlot::S4, "oh1");
        let advisory = state.swap_slots(TeamId::A, RotationSlot::S5, RotationSlot::S4);
        assert!(advisory.is_some_and(|a| a.is_error()));
        assert_eq!(state.court_a.occupant(RotationSlot::S5), Some("lib"));
    }

    #[test]
    fn test_remove_player_clears_all_references() {
        let mut state = state_with_team_a();
        state.assign_player(TeamId::A, RotationSlot::S6, "mb1");
        state.libero_config_a = LiberoConfig {
            enabled: true,
            libero_id: Some("lib".into()),
            replacement_ids: vec!["mb1".into()],
        };
        state.remove_player("mb1");
        assert!(state.player("mb1").is_none());
        assert!(state.court_a.slot_of("mb1").is_none());
        assert!(state.libero_config_a.replacement_ids.is_empty());
    }

    #[test]
    fn test_replace_roster_drops_stale_court_entries() {
        let mut state = state_with_team_a();
        state.assign_player(TeamId::A, RotationSlot::S1, "oh1");
        state.replace_roster(
            TeamId::A,
            vec![player(TeamId::A, "new1", Position::Setter)],
        );
        assert!(state.court_a.is_empty());
        assert_eq!(state.roster.len(), 1);
    }

    #[test]
    fn test_rotate_visual_respects_side() {
        let mut state = state_with_team_a();
        state.assign_player(TeamId::A, RotationSlot::S2, "oh1");
        state.team_a_side = CourtSide::Right;
        // Visual forward on the right side is an abstract backward rotation:
        // the occupant of 2 moves to 3 (inverse of 3→2).
        state.rotate_visual(TeamId::A, RotationDirection::Forward);
        assert_eq!(state.court_a.occupant(RotationSlot::S3), Some("oh1"));
    }

    #[test]
    fn test_rotation_never_leaves_libero_in_front_row() {
        // A back-row assignment is legal even without a swap record; the
        // rotation that would carry the libero into slot 4 must not leave
        // them there on the committed court.
        let mut state = state_with_team_a();
        state.assign_player(TeamId::A, RotationSlot::S5, "lib");
        let advisory = state.rotate_visual(TeamId::A, RotationDirection::Forward);
        assert!(advisory.is_some_and(|a| a.is_error()));
        assert!(state
            .court_a
            .slot_of("lib")
            .is_none_or(|slot| slot.is_back_row()));
        assert_eq!(state.court_a.occupant(RotationSlot::S4), None);
    }

    #[test]
    fn test_set_libero_config_drops_unknown_ids() {
        let mut state = state_with_team_a();
        let advisory = state.set_libero_config(
            TeamId::A,
            LiberoConfig {
                enabled: true,
                libero_id: Some("lib".into()),
                replacement_ids: vec!["ghost".into()],
            },
        );
        assert!(advisory.is_some());
        assert!(state.libero_config_a.replacement_ids.is_empty());
        assert_eq!(state.libero_config_a.libero_id.as_deref(), Some("lib"));
    }

    #[test]
    fn test_global_state_roundtrip() {
        reset_state();
        {
            let mut state = get_state_mut();
            state.score_a = 7;
        }
        assert_eq!(get_state().score_a, 7);
        reset_state();
        assert_eq!(get_state().score_a, 0);
    }
}
