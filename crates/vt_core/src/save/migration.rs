use super::error::SaveError;
use super::format::MatchSave;
use super::SAVE_VERSION;
use crate::models::{RotationSlot, TeamId};

/// Migrate save data from older versions to current version
pub fn migrate_save(mut save: MatchSave) -> Result<MatchSave, SaveError> {
    let original_version = save.version;

    save = match save.version {
        0 => migrate_v0_to_v1(save)?,
        1 => save, // Current version, no migration needed
        v if v > SAVE_VERSION => {
            // Future version - might be compatible
            log::warn!("Loading save from future version {} (current: {})", v, SAVE_VERSION);
            save
        }
        _ => {
            return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
        }
    };

    save.version = SAVE_VERSION;
    save.update_timestamp();

    if original_version != SAVE_VERSION {
        log::info!("Migrated save from version {} to {}", original_version, SAVE_VERSION);
    }

    Ok(save)
}

/// Migrate from version 0 to version 1
fn migrate_v0_to_v1(mut save: MatchSave) -> Result<MatchSave, SaveError> {
    log::info!("Migrating save from version 0 to 1");

    let state = &mut save.match_state;
    let known_ids: Vec<String> = state.roster.iter().map(|p| p.id.clone()).collect();
    let known = |id: &str| known_ids.iter().any(|k| k == id);

    // 1. Clear court entries that no longer resolve to a rostered player
    for team in [TeamId::A, TeamId::B] {
        for slot in RotationSlot::ALL {
            let stale = state.court(team).occupant(slot).is_some_and(|id| !known(id));
            if stale {
                log::warn!("Clearing stale court entry at slot {} for team {}", slot.number(), team);
                state.court_mut(team).clear(slot);
            }
        }
    }

    // 2. Drop dangling libero config and swap references
    state.cross_validate_references();

    // 3. Drop events referencing unknown players, live log and archives alike
    let before = state.events.len();
    state.events.retain(|e| known(&e.player_id));
    if state.events.len() != before {
        log::warn!("Dropped {} live events with unknown players", before - state.events.len());
    }
    for record in &mut state.set_records {
        record.events.retain(|e| known(&e.player_id));
        record.player_stats.retain(|id, _| known(id));
    }

    // 4. Re-derive set counters from the archive
    let won = |team| {
        state.set_records.iter().filter(|r| r.winner == team).count() as u8
    };
    let (wins_a, wins_b) = (won(TeamId::A), won(TeamId::B));
    if state.sets_won_a != wins_a || state.sets_won_b != wins_b {
        log::warn!(
            "Re-derived set counters from archive: {}-{} (was {}-{})",
            wins_a,
            wins_b,
            state.sets_won_a,
            state.sets_won_b
        );
        state.sets_won_a = wins_a;
        state.sets_won_b = wins_b;
    }
    let expected_set = state.set_records.len() as u8 + 1;
    if state.set_number < expected_set {
        state.set_number = expected_set;
    }

    // 5. The id counter must stay ahead of every stored event
    let max_id = state
        .events
        .iter()
        .chain(state.set_records.iter().flat_map(|r| r.events.iter()))
        .map(|e| e.id)
        .max()
        .unwrap_or(0);
    if state.next_event_id <= max_id {
        state.next_event_id = max_id + 1;
    }

    Ok(save)
}

/// Check if a save file needs migration
pub fn needs_migration(save: &MatchSave) -> bool {
    save.version < SAVE_VERSION
}
