//! Rally state machine: which skills are legal next, and which team acts.

use serde::{Deserialize, Serialize};

use crate::models::{ActionEvent, Outcome, Player, Position, RotationSlot, Skill, TeamId};

use super::advisory::Advisory;

/// Legality context for the next contact.
///
/// `serving_team` must be the *already-updated* server: scoring always runs
/// strictly before the rally state is recomputed for the same event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RallyState {
    pub allowed_skills: Vec<Skill>,
    pub acting_team: TeamId,
}

impl RallyState {
    fn serve(team: TeamId) -> Self {
        Self { allowed_skills: vec![Skill::Serve], acting_team: team }
    }

    pub fn allows(&self, team: TeamId, skill: Skill) -> bool {
        team == self.acting_team && self.allowed_skills.contains(&skill)
    }
}

/// Compute the legal next state from the last logged action.
///
/// Every decided rally funnels into a fresh serve by `serving_team`; the
/// non-terminal transitions follow the standard contact flow
/// (serve → receive → set → attack → dig/block → ...), with the two
/// hand-over outcomes routing to the opponent so their fault can be logged.
pub fn next_rally_state(last: Option<&ActionEvent>, serving_team: TeamId) -> RallyState {
    let Some(last) = last else {
        return RallyState::serve(serving_team);
    };

    if last.ends_rally() {
        return RallyState::serve(serving_team);
    }

    let same = last.team;
    let other = last.team.opponent();
    let (allowed_skills, acting_team) = match (last.skill, last.outcome) {
        (Skill::Serve, Outcome::AceOnOpponentError) => (vec![Skill::Receive], other),
        (Skill::Serve, _) => (vec![Skill::Receive], other),
        (Skill::Receive, Outcome::Overpass) => (vec![Skill::Dig, Skill::Set, Skill::Attack], other),
        (Skill::Receive, _) => (vec![Skill::Set, Skill::Attack], same),
        (Skill::Set, _) => (vec![Skill::Attack], same),
        (Skill::Attack, Outcome::AttackOnOpponentError) => (vec![Skill::Block], other),
        (Skill::Attack, _) => (vec![Skill::Dig, Skill::Block], other),
        (Skill::Block, _) => (vec![Skill::Dig], same),
        (Skill::Dig, _) => (vec![Skill::Set], same),
    };
    RallyState { allowed_skills, acting_team }
}

/// Auxiliary legality filters layered on the state machine's skill set.
///
/// Returns an error advisory when the proposed contact violates a hard rule:
/// blocks from the back row or by a libero, consecutive non-block touches by
/// one player, a server logging the reception of their own serve, or a
/// libero taking the team's next contact after their own reception.
pub fn validate_action(
    last: Option<&ActionEvent>,
    roster: &[Player],
    slot: RotationSlot,
    skill: Skill,
    player_id: &str,
) -> Option<Advisory> {
    if skill == Skill::Block {
        if slot.is_back_row() {
            return Some(Advisory::error(format!(
                "Illegal block: slot {} is back row",
                slot.number()
            )));
        }
        if is_libero(roster, player_id) {
            return Some(Advisory::error("Illegal block: liberos may not block"));
        }
    }

    let Some(last) = last else {
        return None;
    };
    if last.ends_rally() {
        return None;
    }

    if last.player_id == player_id && last.skill != Skill::Block && skill != Skill::Block {
        return Some(Advisory::error(format!(
            "Illegal touch: {} cannot make two consecutive non-block contacts",
            player_id
        )));
    }
    if last.skill == Skill::Serve && skill == Skill::Receive && last.player_id == player_id {
        return Some(Advisory::error("Illegal reception: the server cannot receive their own serve"));
    }
    if last.skill == Skill::Receive
        && last.player_id == player_id
        && is_libero(roster, player_id)
    {
        return Some(Advisory::error(
            "Illegal touch: a libero cannot take the next contact after their own reception",
        ));
    }

    None
}

fn is_libero(roster: &[Player], player_id: &str) -> bool {
    roster.iter().any(|p| p.id == player_id && p.position == Position::Libero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CourtState, LiberoSwap, StateSnapshot};
    use chrono::Utc;

    fn event(team: TeamId, skill: Skill, outcome: Outcome) -> ActionEvent {
        ActionEvent {
            id: 1,
            team,
            player_id: "p1".into(),
            slot: RotationSlot::S1,
            skill,
            outcome,
            timestamp: Utc::now(),
            point_to: None,
            snapshot: StateSnapshot {
                score_a: 0,
                score_b: 0,
                serving_team: team,
                court_a: CourtState::new(),
                court_b: CourtState::new(),
                libero_swap_a: LiberoSwap::inactive(),
                libero_swap_b: LiberoSwap::inactive(),
                rally_number: 0,
                service_run: 0,
            },
        }
    }

    #[test]
    fn test_no_prior_event_means_serve() {
        let state = next_rally_state(None, TeamId::A);
        assert_eq!(state, RallyState { allowed_skills: vec![Skill::Serve], acting_team: TeamId::A });
    }

    #[test]
    fn test_clean_ace_keeps_server_acting() {
        let serve = event(TeamId::A, Skill::Serve, Outcome::Ace);
        // Scoring already kept serve with A
        let state = next_rally_state(Some(&serve), TeamId::A);
        assert_eq!(state.allowed_skills, vec![Skill::Serve]);
        assert_eq!(state.acting_team, TeamId::A);
    }

    #[test]
    fn test_ace_via_opponent_error_hands_reception_log_over() {
        let serve = event(TeamId::A, Skill::Serve, Outcome::AceOnOpponentError);
        let state = next_rally_state(Some(&serve), TeamId::A);
        assert_eq!(state.allowed_skills, vec![Skill::Receive]);
        assert_eq!(state.acting_team, TeamId::B);
    }

    #[test]
    fn test_service_error_gives_serve_to_opponent() {
        let serve = event(TeamId::A, Skill::Serve, Outcome::ServiceError);
        // Scoring already moved the serve to B
        let state = next_rally_state(Some(&serve), TeamId::B);
        assert_eq!(state, RallyState { allowed_skills: vec![Skill::Serve], acting_team: TeamId::B });
    }

    #[test]
    fn test_reception_error_returns_serve_to_server() {
        let receive = event(TeamId::B, Skill::Receive, Outcome::ReceptionError);
        let state = next_rally_state(Some(&receive), TeamId::A);
        assert_eq!(state, RallyState { allowed_skills: vec![Skill::Serve], acting_team: TeamId::A });
    }

    #[test]
    fn test_default_flow_narrows_deterministically() {
        let serve = event(TeamId::A, Skill::Serve, Outcome::ServeInPlay);
        let state = next_rally_state(Some(&serve), TeamId::A);
        assert_eq!(state.allowed_skills, vec![Skill::Receive]);
        assert_eq!(state.acting_team, TeamId::B);

        let receive = event(TeamId::B, Skill::Receive, Outcome::PerfectPass);
        let state = next_rally_state(Some(&receive), TeamId::A);
        assert_eq!(state.allowed_skills, vec![Skill::Set, Skill::Attack]);
        assert_eq!(state.acting_team, TeamId::B);

        let set = event(TeamId::B, Skill::Set, Outcome::SetInPlay);
        let state = next_rally_state(Some(&set), TeamId::A);
        assert_eq!(state.allowed_skills, vec![Skill::Attack]);
        assert_eq!(state.acting_team, TeamId::B);

        let attack = event(TeamId::B, Skill::Attack, Outcome::AttackDefended);
        let state = next_rally_state(Some(&attack), TeamId::A);
        assert_eq!(state.allowed_skills, vec![Skill::Dig, Skill::Block]);
        assert_eq!(state.acting_team, TeamId::A);

        let block = event(TeamId::A, Skill::Block, Outcome::BlockTouch);
        let state = next_rally_state(Some(&block), TeamId::A);
        assert_eq!(state.allowed_skills, vec![Skill::Dig]);
        assert_eq!(state.acting_team, TeamId::A);

        let dig = event(TeamId::A, Skill::Dig, Outcome::DigInPlay);
        let state = next_rally_state(Some(&dig), TeamId::A);
        assert_eq!(state.allowed_skills, vec![Skill::Set]);
        assert_eq!(state.acting_team, TeamId::A);
    }

    #[test]
    fn test_overpass_passes_possession_without_ending_rally() {
        let receive = event(TeamId::B, Skill::Receive, Outcome::Overpass);
        let state = next_rally_state(Some(&receive), TeamId::A);
        assert_eq!(state.acting_team, TeamId::A);
        assert!(state.allowed_skills.contains(&Skill::Attack));
        assert!(state.allowed_skills.contains(&Skill::Dig));
    }

    #[test]
    fn test_kill_funnels_into_fresh_serve_by_scorer() {
        let attack = event(TeamId::A, Skill::Attack, Outcome::Kill);
        let state = next_rally_state(Some(&attack), TeamId::A);
        assert_eq!(state, RallyState { allowed_skills: vec![Skill::Serve], acting_team: TeamId::A });
    }

    #[test]
    fn test_back_row_block_rejected() {
        let advisory = validate_action(None, &[], RotationSlot::S6, Skill::Block, "p1");
        assert!(advisory.is_some_and(|a| a.is_error()));
        assert!(validate_action(None, &[], RotationSlot::S3, Skill::Block, "p1").is_none());
    }

    #[test]
    fn test_libero_block_rejected_even_front_row() {
        let mut libero = Player::new(TeamId::A, "L", 9, Position::Libero);
        libero.id = "lib".into();
        let advisory = validate_action(None, &[libero], RotationSlot::S3, Skill::Block, "lib");
        assert!(advisory.is_some_and(|a| a.is_error()));
    }

    #[test]
    fn test_consecutive_touch_rule() {
        let dig = event(TeamId::A, Skill::Dig, Outcome::DigInPlay);
        let advisory = validate_action(Some(&dig), &[], RotationSlot::S6, Skill::Set, "p1");
        assert!(advisory.is_some_and(|a| a.is_error()));
        // A different player may take the next touch
        assert!(validate_action(Some(&dig), &[], RotationSlot::S6, Skill::Set, "p2").is_none());
        // A block after one's own touch is fine
        assert!(validate_action(Some(&dig), &[], RotationSlot::S3, Skill::Block, "p1").is_none());
    }

    #[test]
    fn test_consecutive_rule_resets_across_rallies() {
        let kill = event(TeamId::A, Skill::Attack, Outcome::Kill);
        // Same player may open the next rally with a serve
        assert!(validate_action(Some(&kill), &[], RotationSlot::S1, Skill::Serve, "p1").is_none());
    }
}
