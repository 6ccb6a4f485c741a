//! Libero automation: decides after every rotation or serve-possession
//! change whether the libero swaps in or out, enforcing the back-row-only
//! constraint.

use crate::models::{
    CourtState, LiberoConfig, LiberoSwap, Player, Position, RotationDirection, TeamId,
};

use super::advisory::Advisory;
use super::rotation::slot_after_rotation;

/// Result of one automation pass. The caller commits `court` and `swap`
/// together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct LiberoPassResult {
    pub court: CourtState,
    pub swap: LiberoSwap,
    pub notice: Option<Advisory>,
}

/// Run the libero automation for one team.
///
/// Rules in priority order: incomplete config clears any swap; an active
/// swap's tracked slot follows the rotation; a libero rotated into the front
/// row is forced out unconditionally; a drifted swap record is reconciled or
/// discarded; the serving team never swaps its libero in; otherwise the
/// libero enters for the first configured replacement found in the back row.
/// The resulting court is then checked against the hard invariant (no libero
/// in slots 2/3/4); an offender the swap record does not cover is forced off
/// court with an error advisory.
pub fn run_libero_pass(
    court: &CourtState,
    roster: &[Player],
    config: &LiberoConfig,
    swap: &LiberoSwap,
    rotation: Option<RotationDirection>,
    serving_team: TeamId,
    team: TeamId,
) -> LiberoPassResult {
    if !config.is_complete() {
        let mut next_court = court.clone();
        let notice = if config.enabled {
            Some(Advisory::info("Libero automation idle: configuration incomplete"))
        } else {
            None
        };
        let forced = force_off_front_row_libero(&mut next_court, roster);
        return LiberoPassResult {
            court: next_court,
            swap: LiberoSwap::inactive(),
            notice: forced.or(notice),
        };
    }

    // is_complete() guarantees the id is present
    let Some(libero_id) = config.libero_id.clone() else {
        return LiberoPassResult {
            court: court.clone(),
            swap: LiberoSwap::inactive(),
            notice: None,
        };
    };

    let mut next_court = court.clone();
    let mut next_swap = swap.clone();
    let mut notice = None;

    // Tracked slot follows the libero's physical position across a rotation
    if next_swap.active {
        if let (Some(slot), Some(direction)) = (next_swap.slot, rotation) {
            next_swap.slot = Some(slot_after_rotation(slot, direction));
        }
    }

    // Reconcile drift: the recorded slot must hold the libero. If the libero
    // stands elsewhere the record follows them; off court, the record goes.
    if next_swap.active {
        let holds_libero =
            next_swap.slot.map(|s| next_court.occupant(s) == Some(libero_id.as_str()));
        if holds_libero != Some(true) {
            match next_court.slot_of(&libero_id) {
                Some(actual) => next_swap.slot = Some(actual),
                None => next_swap.clear(),
            }
        }
    }

    // Front row is off limits: force the replacement back in
    if next_swap.active {
        if let Some(slot) = next_swap.slot {
            if slot.is_front_row() {
                if let Some(replaced) = next_swap.replaced_id.clone() {
                    next_court.assign(slot, replaced.clone());
                    notice = Some(Advisory::info(format!(
                        "Libero out: {} returns at slot {}",
                        replaced,
                        slot.number()
                    )));
                } else {
                    next_court.clear(slot);
                }
                next_swap.clear();
            }
        }
    }

    // Swap in only once serve possession has passed: a middle scheduled to
    // serve stays in to serve.
    if !next_swap.active && team != serving_team {
        for candidate in &config.replacement_ids {
            if candidate == &libero_id {
                continue;
            }
            if let Some(slot) = next_court.slot_of(candidate) {
                if slot.is_back_row() {
                    next_court.assign(slot, libero_id.clone());
                    next_swap = LiberoSwap::activate(slot, libero_id.clone(), candidate.clone());
                    notice = Some(Advisory::info(format!(
                        "Libero in for {} at slot {}",
                        candidate,
                        slot.number()
                    )));
                    break;
                }
            }
        }
    }

    if let Some(forced) = force_off_front_row_libero(&mut next_court, roster) {
        next_swap.clear();
        return LiberoPassResult { court: next_court, swap: next_swap, notice: Some(forced) };
    }

    LiberoPassResult { court: next_court, swap: next_swap, notice }
}

/// Clear any rostered libero out of slot 2, 3 or 4. The swap-in rule only
/// targets back-row slots, so an offender here arrived through an outside
/// mutation (a manual assignment carried forward by a rotation) and has no
/// recorded replacement to restore.
fn force_off_front_row_libero(court: &mut CourtState, roster: &[Player]) -> Option<Advisory> {
    let offender = front_row_libero(court, roster)?;
    let slot = court.slot_of(&offender)?;
    court.clear(slot);
    Some(Advisory::error(format!(
        "Libero {} removed from front-row slot {}",
        offender,
        slot.number()
    )))
}

/// Id of any rostered libero standing in slot 2, 3 or 4
fn front_row_libero(court: &CourtState, roster: &[Player]) -> Option<String> {
    crate::models::RotationSlot::ALL
        .into_iter()
        .filter(|slot| slot.is_front_row())
        .filter_map(|slot| court.occupant(slot))
        .find(|id| {
            roster
                .iter()
                .any(|p| p.id == *id && p.position == Position::Libero)
        })
        .map(str::to_string)
}
