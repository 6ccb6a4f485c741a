//! # vt_core - Volleyball Match Tracking Rules Engine
//!
//! Domain model and rules engine for live volleyball match tracking:
//! rotation handling, automatic libero substitution, a rally legality state
//! machine, scoring with sideout semantics, set lifecycle, statistics and a
//! JSON API for UI integration.
//!
//! ## Features
//! - Closed transition functions over one match aggregate; invalid input
//!   yields advisories, never panics
//! - Event log as the source of truth, with snapshot-based undo
//! - Compressed, checksummed match saves with versioned migration

pub mod api;
pub mod engine;
pub mod error;
pub mod models;
pub mod save;
pub mod state;

// Re-export main API functions
pub use api::{
    adjust_score_json, assign_player_json, create_player_json, end_set_json,
    get_leaderboard_json, get_match_state_json, get_rally_state_json, get_stats_json,
    log_action_json, reset_match_json, rotate_json, set_libero_config_json, undo_json,
};
pub use error::{CoreError, Result};

// Re-export the domain model
pub use models::{
    ActionEvent, CourtSide, CourtState, LiberoConfig, LiberoSwap, Outcome, Player, PlayerStatLine,
    Position, RoleBucket, RotationDirection, RotationSlot, SetRecord, SetRules, Skill, TeamId,
    TeamTotals,
};

// Re-export the engine surface
pub use engine::{Advisory, RallyState, Severity};

// Re-export save system
pub use save::{MatchSave, SaveError};

// Re-export state management
pub use state::{get_state, get_state_mut, reset_state, set_state, MatchState, MATCH_STATE};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    fn lineup(state: &mut MatchState, team: TeamId, prefix: &str) {
        for n in 1..=6u8 {
            let mut player = Player::new(
                team,
                format!("{}{}", prefix, n),
                n,
                match n {
                    1 | 4 => Position::OutsideHitter,
                    2 => Position::Opposite,
                    3 | 6 => Position::MiddleBlocker,
                    _ => Position::Setter,
                },
            );
            player.id = format!("{}{}", prefix, n);
            state.add_player(player);
        }
        for slot in RotationSlot::ALL {
            state.court_mut(team).assign(slot, format!("{}{}", prefix, slot.number()));
        }
    }

    fn tracked_match() -> MatchState {
        let mut state = MatchState::new();
        lineup(&mut state, TeamId::A, "a");
        lineup(&mut state, TeamId::B, "b");
        state
    }

    #[test]
    fn test_full_rally_cycle_with_sideout() {
        let mut state = tracked_match();

        // A serves in play, B runs receive-set-attack and wins the rally
        assert!(state
            .log_action(TeamId::A, RotationSlot::S1, Skill::Serve, Outcome::ServeInPlay)
            .is_none());
        assert!(state
            .log_action(TeamId::B, RotationSlot::S6, Skill::Receive, Outcome::PerfectPass)
            .is_none());
        assert!(state
            .log_action(TeamId::B, RotationSlot::S3, Skill::Set, Outcome::SetInPlay)
            .is_none());
        assert!(state
            .log_action(TeamId::B, RotationSlot::S4, Skill::Attack, Outcome::Kill)
            .is_none());

        assert_eq!((state.score_a, state.score_b), (0, 1));
        assert_eq!(state.serving_team, TeamId::B);
        assert_eq!(state.rally_number, 1);
        // Sideout rotated B: the former slot-2 player now serves
        assert_eq!(state.court_b.occupant(RotationSlot::S1), Some("b2"));

        // B must now serve and does so with an ace
        let rally = state.rally_state();
        assert_eq!(rally.acting_team, TeamId::B);
        assert_eq!(rally.allowed_skills, vec![Skill::Serve]);
        assert!(state
            .log_action(TeamId::B, RotationSlot::S1, Skill::Serve, Outcome::Ace)
            .is_none());
        assert_eq!(state.score_b, 2);
        assert_eq!(state.service_run, 2);
    }

    #[test]
    fn test_ace_on_opponent_error_scores_via_fault_event() {
        let mut state = tracked_match();
        assert!(state
            .log_action(TeamId::A, RotationSlot::S1, Skill::Serve, Outcome::AceOnOpponentError)
            .is_none());
        // The serve event itself awards nothing
        assert_eq!((state.score_a, state.score_b), (0, 0));

        // The point lands when the botched reception is logged
        assert!(state
            .log_action(TeamId::B, RotationSlot::S6, Skill::Receive, Outcome::ReceptionError)
            .is_none());
        assert_eq!((state.score_a, state.score_b), (1, 0));
        assert_eq!(state.serving_team, TeamId::A);
    }

    #[test]
    fn test_libero_follows_sideouts_across_rallies() {
        let mut state = tracked_match();
        let mut libero = Player::new(TeamId::B, "blib", 12, Position::Libero);
        libero.id = "blib".into();
        state.add_player(libero);
        state.set_libero_config(
            TeamId::B,
            LiberoConfig {
                enabled: true,
                libero_id: Some("blib".into()),
                replacement_ids: vec!["b6".into()],
            },
        );
        // B is receiving, so the libero is already in for b6
        assert_eq!(state.court_b.occupant(RotationSlot::S6), Some("blib"));

        // B wins the rally: rotation carries the libero to slot 5, still legal
        state.log_action(TeamId::A, RotationSlot::S1, Skill::Serve, Outcome::ServiceError);
        assert_eq!(state.court_b.occupant(RotationSlot::S5), Some("blib"));
        assert!(state.libero_swap_b.active);
    }

    #[test]
    fn test_deciding_set_uses_short_target() {
        let mut state = tracked_match();
        state.sets_won_a = 2;
        state.sets_won_b = 2;
        state.set_score(TeamId::A, 14);
        state.set_score(TeamId::B, 10);
        let advisory =
            state.log_action(TeamId::A, RotationSlot::S1, Skill::Serve, Outcome::Ace);
        assert!(advisory.is_some_and(|a| a.message.contains("Match over")));
        assert_eq!(state.set_records.last().unwrap().score_a, 15);
        assert_eq!(state.match_winner(), Some(TeamId::A));
    }

    #[test]
    fn test_save_roundtrip_preserves_played_match() {
        let mut state = tracked_match();
        state.log_action(TeamId::A, RotationSlot::S1, Skill::Serve, Outcome::Ace);
        state.log_action(TeamId::A, RotationSlot::S1, Skill::Serve, Outcome::ServiceError);

        let save = MatchSave::from_state(state.clone());
        let bytes = save::serialize_and_compress(&save).unwrap();
        let restored = save::decompress_and_deserialize(&bytes).unwrap();
        assert_eq!(restored.match_state, state);

        // A restored match keeps playing seamlessly
        let mut resumed = restored.match_state;
        assert!(resumed
            .log_action(TeamId::B, RotationSlot::S1, Skill::Serve, Outcome::Ace)
            .is_none());
        assert_eq!(resumed.score_b, 2);
    }

    #[test]
    fn test_stats_survive_set_boundary() {
        let mut state = tracked_match();
        state.set_score(TeamId::A, 24);
        state.log_action(TeamId::A, RotationSlot::S1, Skill::Serve, Outcome::Ace);
        assert_eq!(state.set_records.len(), 1);

        state.log_action(TeamId::A, RotationSlot::S1, Skill::Serve, Outcome::Ace);
        let lines = engine::match_stats(&state.roster, &state.set_records, &state.events);
        assert_eq!(lines["a1"].serves, 2);
    }
}
