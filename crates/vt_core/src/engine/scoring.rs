//! Scoring and set lifecycle: the closed set of transitions that move the
//! match aggregate forward.
//!
//! Every transition validates first and mutates second; an illegal request
//! returns an error advisory and leaves the aggregate exactly as it was.

use chrono::Utc;
use log::info;

use crate::engine::advisory::Advisory;
use crate::engine::libero::run_libero_pass;
use crate::engine::rally::validate_action;
use crate::engine::rotation;
use crate::engine::stats;
use crate::models::{
    ActionEvent, Outcome, RotationDirection, RotationSlot, SetRecord, SetRules, Skill, TeamId,
};
use crate::state::MatchState;

impl MatchState {
    /// Log one contact by the player standing in `slot`.
    ///
    /// The outcome decides everything downstream: point attribution, sideout
    /// and rotation, set completion. An empty slot is a warn-level no-op; an
    /// illegal contact is rejected with an error advisory.
    pub fn log_action(
        &mut self,
        team: TeamId,
        slot: RotationSlot,
        skill: Skill,
        outcome: Outcome,
    ) -> Option<Advisory> {
        let Some(player_id) = self.court(team).occupant(slot).map(str::to_string) else {
            return Some(Advisory::warn(format!(
                "No player in slot {} for team {}",
                slot.number(),
                team
            )));
        };
        if !outcome.valid_for(skill) {
            return Some(Advisory::error(format!(
                "Outcome {:?} does not belong to skill {:?}",
                outcome, skill
            )));
        }
        let rally = self.rally_state();
        if !rally.allows(team, skill) {
            return Some(Advisory::error(format!(
                "Illegal action: team {} may not {:?} now (expected {:?} by team {})",
                team, skill, rally.allowed_skills, rally.acting_team
            )));
        }
        if let Some(advisory) = validate_action(self.last_event(), &self.roster, slot, skill, &player_id)
        {
            return Some(advisory);
        }

        let snapshot = self.snapshot();
        let point_to = outcome.awards_point(skill, team);
        let event = ActionEvent {
            id: self.next_event_id,
            team,
            player_id,
            slot,
            skill,
            outcome,
            timestamp: Utc::now(),
            point_to,
            snapshot,
        };
        self.next_event_id += 1;
        let ends = event.ends_rally();
        self.events.insert(0, event);
        if ends {
            self.rally_number += 1;
        }

        match point_to {
            Some(winner) => self.increment_score(winner),
            None => None,
        }
    }

    /// Award one point, applying sideout semantics.
    ///
    /// When the point goes to the receiving team the serve transfers, the
    /// new serving team rotates forward, and both teams' libero automation
    /// re-runs (the losing side's pass is best effort and is skipped on an
    /// error-severity result). Also the entry point for manual "+1" score
    /// adjustments.
    pub fn increment_score(&mut self, team: TeamId) -> Option<Advisory> {
        *self.score_mut(team) += 1;
        let mut notice = None;

        if self.serving_team == team {
            self.service_run += 1;
        } else {
            self.serving_team = team;
            self.service_run = 1;

            let result = {
                let court = rotation::rotated(self.court(team), RotationDirection::Forward);
                run_libero_pass(
                    &court,
                    &self.roster,
                    self.libero_config(team),
                    self.libero_swap(team),
                    Some(RotationDirection::Forward),
                    team,
                    team,
                )
            };
            self.set_libero_state(team, result.court, result.swap);
            notice = result.notice;

            // The team that just lost the serve may now bring its libero in
            let other = team.opponent();
            let result = run_libero_pass(
                self.court(other),
                &self.roster,
                self.libero_config(other),
                self.libero_swap(other),
                None,
                team,
                other,
            );
            if !result.notice.as_ref().is_some_and(Advisory::is_error) {
                self.set_libero_state(other, result.court, result.swap);
                if notice.is_none() {
                    notice = result.notice;
                }
            }
        }

        if let Some(winner) =
            self.rules
                .set_winner(self.score_a, self.score_b, self.sets_won_a, self.sets_won_b)
        {
            return self.finalize_set(winner).or(notice);
        }
        notice
    }

    /// Manual "-1" score adjustment; never triggers rotation or set logic
    pub fn decrement_score(&mut self, team: TeamId) -> Option<Advisory> {
        let score = self.score_mut(team);
        if *score == 0 {
            return Some(Advisory::warn(format!("Team {} score is already zero", team)));
        }
        *score -= 1;
        None
    }

    /// Close the current set. Without a forced winner the set must actually
    /// be over by the rules; forcing records the set as-is.
    pub fn end_set(&mut self, forced_winner: Option<TeamId>) -> Option<Advisory> {
        let winner = forced_winner.or_else(|| {
            self.rules
                .set_winner(self.score_a, self.score_b, self.sets_won_a, self.sets_won_b)
        });
        let Some(winner) = winner else {
            return Some(Advisory::warn("Set is not over; no winner to record"));
        };
        self.finalize_set(winner)
    }

    fn finalize_set(&mut self, winner: TeamId) -> Option<Advisory> {
        let mut events: Vec<ActionEvent> = self.events.drain(..).collect();
        // Archives are chronological, oldest first
        events.reverse();
        let player_stats = stats::compute_stats(&self.roster, &events);
        info!(
            "Set {} complete: {}-{} to team {}",
            self.set_number, self.score_a, self.score_b, winner
        );
        self.set_records.push(SetRecord {
            number: self.set_number,
            winner,
            score_a: self.score_a,
            score_b: self.score_b,
            events,
            player_stats,
        });

        match winner {
            TeamId::A => self.sets_won_a += 1,
            TeamId::B => self.sets_won_b += 1,
        }
        let finished = self.set_number;
        self.set_number += 1;
        self.score_a = 0;
        self.score_b = 0;
        self.rally_number = 0;
        self.service_run = 0;
        self.serving_team = winner;
        if self.rules.reset_courts_between_sets {
            self.court_a.clear_all();
            self.court_b.clear_all();
            self.libero_swap_a.clear();
            self.libero_swap_b.clear();
        }

        if let Some(champion) = self.match_winner() {
            return Some(Advisory::info(format!("Match over: team {} wins", champion)));
        }
        Some(Advisory::info(format!("Set {} to team {}", finished, winner)))
    }

    /// Undo the most recent event
    pub fn undo_last(&mut self) -> Option<Advisory> {
        if self.events.is_empty() {
            return Some(Advisory::warn("Nothing to undo"));
        }
        let event = self.events.remove(0);
        self.restore_snapshot(&event.snapshot);
        info!("Undid event {}", event.id);
        None
    }

    /// Undo everything back to and including the event with `event_id`,
    /// restoring the state as it was just before that event.
    pub fn undo_from(&mut self, event_id: u64) -> Option<Advisory> {
        let Some(pos) = self.events.iter().position(|e| e.id == event_id) else {
            return Some(Advisory::warn(format!("No live event with id {}", event_id)));
        };
        let snapshot = self.events[pos].snapshot.clone();
        let dropped = pos + 1;
        self.events.drain(0..=pos);
        self.restore_snapshot(&snapshot);
        info!("Undid {} events back through {}", dropped, event_id);
        None
    }

    /// Manual score override; no sideout, rotation or set logic runs
    pub fn set_score(&mut self, team: TeamId, value: u16) {
        *self.score_mut(team) = value;
    }

    /// Manual sets-won override
    pub fn set_sets_won(&mut self, team: TeamId, value: u8) {
        match team {
            TeamId::A => self.sets_won_a = value,
            TeamId::B => self.sets_won_b = value,
        }
    }

    /// Manual set-number override; zero is clamped to the first set
    pub fn set_set_number(&mut self, value: u8) {
        self.set_number = value.max(1);
    }

    /// Replace the set rules; applies from the next point onward
    pub fn set_rules(&mut self, rules: SetRules) {
        self.rules = rules;
    }
}
