//! Statistics aggregation: pure folds over the event log.
//!
//! Stat lines are never stored for the live set; they are recomputed from
//! the log on demand, so undo needs no bookkeeping here. Archived sets carry
//! their frozen lines and are merged in for whole-match views.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{
    ActionEvent, Outcome, Player, PlayerStatLine, RoleBucket, SetRecord, Skill, TeamId, TeamTotals,
};

/// Per-counter rating weights for one role bucket
#[derive(Debug, Clone, Copy)]
struct RatingWeights {
    serve: f32,
    reception: f32,
    reception_fault: f32,
    dig: f32,
    dig_fault: f32,
    attack: f32,
    block: f32,
    set: f32,
    set_fault: f32,
}

const fn weights_for(bucket: RoleBucket) -> RatingWeights {
    match bucket {
        RoleBucket::Winger => RatingWeights {
            serve: 2.0,
            reception: 1.0,
            reception_fault: -1.5,
            dig: 1.0,
            dig_fault: -1.0,
            attack: 2.0,
            block: 1.5,
            set: 0.5,
            set_fault: -1.0,
        },
        RoleBucket::MiddleBlocker => RatingWeights {
            serve: 2.0,
            reception: 0.5,
            reception_fault: -1.5,
            dig: 0.5,
            dig_fault: -1.0,
            attack: 4.0,
            block: 3.0,
            set: 0.5,
            set_fault: -1.0,
        },
        RoleBucket::Setter => RatingWeights {
            serve: 2.0,
            reception: 0.5,
            reception_fault: -1.5,
            dig: 1.0,
            dig_fault: -1.0,
            attack: 1.5,
            block: 1.0,
            set: 2.0,
            set_fault: -3.0,
        },
        RoleBucket::Libero => RatingWeights {
            serve: 0.0,
            reception: 2.0,
            reception_fault: -2.0,
            dig: 2.5,
            dig_fault: -1.5,
            attack: 0.0,
            block: 0.0,
            set: 1.0,
            set_fault: -1.0,
        },
    }
}

/// Weighted rating of a stat line for a given role bucket
pub fn rating(line: &PlayerStatLine, bucket: RoleBucket) -> f32 {
    let w = weights_for(bucket);
    line.serves as f32 * w.serve
        + line.receptions as f32 * w.reception
        + line.reception_faults as f32 * w.reception_fault
        + line.digs as f32 * w.dig
        + line.dig_faults as f32 * w.dig_fault
        + line.attacks as f32 * w.attack
        + line.blocks as f32 * w.block
        + line.sets as f32 * w.set
        + line.set_faults as f32 * w.set_fault
}

fn tally(line: &mut PlayerStatLine, skill: Skill, outcome: Outcome) {
    match (skill, outcome) {
        (Skill::Serve, Outcome::Ace | Outcome::AceOnOpponentError) => line.serves += 1,
        (Skill::Receive, Outcome::PerfectPass | Outcome::GoodPass) => line.receptions += 1,
        (Skill::Receive, Outcome::ReceptionError) => line.reception_faults += 1,
        (Skill::Dig, Outcome::DigInPlay) => line.digs += 1,
        (Skill::Dig, Outcome::DigError) => line.dig_faults += 1,
        (Skill::Attack, Outcome::Kill | Outcome::AttackOnOpponentError) => line.attacks += 1,
        (Skill::Block, Outcome::StuffBlock) => line.blocks += 1,
        (Skill::Set, Outcome::SetInPlay) => line.sets += 1,
        (Skill::Set, Outcome::SetError) => line.set_faults += 1,
        _ => {}
    }
}

fn bucket_of(roster: &[Player], player_id: &str) -> RoleBucket {
    roster
        .iter()
        .find(|p| p.id == player_id)
        .map(|p| p.position.role_bucket())
        .unwrap_or(RoleBucket::Winger)
}

/// Fold a sequence of events into per-player stat lines.
///
/// Only players appearing in the events get a line. Event order does not
/// matter; every counter is an independent sum.
pub fn compute_stats<'a, I>(roster: &[Player], events: I) -> BTreeMap<String, PlayerStatLine>
where
    I: IntoIterator<Item = &'a ActionEvent>,
{
    let mut lines: BTreeMap<String, PlayerStatLine> = BTreeMap::new();
    for event in events {
        let line = lines.entry(event.player_id.clone()).or_default();
        tally(line, event.skill, event.outcome);
    }
    for (player_id, line) in lines.iter_mut() {
        line.rating = rating(line, bucket_of(roster, player_id));
    }
    lines
}

/// Whole-match stat lines: archived set lines merged with the live set
pub fn match_stats(
    roster: &[Player],
    set_records: &[SetRecord],
    live_events: &[ActionEvent],
) -> BTreeMap<String, PlayerStatLine> {
    let mut lines = compute_stats(roster, live_events);
    for record in set_records {
        for (player_id, archived) in &record.player_stats {
            lines.entry(player_id.clone()).or_default().merge(archived);
        }
    }
    for (player_id, line) in lines.iter_mut() {
        line.rating = rating(line, bucket_of(roster, player_id));
    }
    lines
}

/// Team-level totals over a sequence of events
pub fn team_totals<'a, I>(events: I, team: TeamId) -> TeamTotals
where
    I: IntoIterator<Item = &'a ActionEvent>,
{
    let mut totals = TeamTotals::default();
    for event in events.into_iter().filter(|e| e.team == team) {
        match (event.skill, event.outcome) {
            (Skill::Serve, Outcome::Ace | Outcome::AceOnOpponentError) => totals.aces += 1,
            (Skill::Attack, Outcome::Kill | Outcome::AttackOnOpponentError) => totals.kills += 1,
            (Skill::Block, Outcome::StuffBlock) => totals.block_points += 1,
            _ => {
                if event.outcome.class() == crate::models::OutcomeClass::Error {
                    totals.errors += 1;
                }
            }
        }
    }
    totals
}

/// One row of a role-bucket leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub name: String,
    pub number: u8,
    pub team: TeamId,
    pub rating: f32,
}

/// Players of one role bucket ranked by rating, best first
pub fn leaderboard(
    roster: &[Player],
    lines: &BTreeMap<String, PlayerStatLine>,
    bucket: RoleBucket,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = roster
        .iter()
        .filter(|p| p.position.role_bucket() == bucket)
        .map(|p| LeaderboardEntry {
            player_id: p.id.clone(),
            name: p.name.clone(),
            number: p.number,
            team: p.team,
            rating: lines.get(&p.id).map(|l| l.rating).unwrap_or(0.0),
        })
        .collect();
    entries.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    entries
}
