//! JSON API over the global match state.
//!
//! Every endpoint takes a JSON request string and returns a JSON
//! `ApiResponse` string; nothing here panics on bad input. Engine advisories
//! come back as data so the UI can toast them, while malformed requests and
//! unknown labels are API-level errors.

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::advisory::Advisory;
use crate::engine::rally::RallyState;
use crate::engine::stats;
use crate::models::{
    LiberoConfig, Outcome, Player, PlayerStatLine, Position, RoleBucket, RotationDirection,
    RotationSlot, Skill, TeamId, TeamTotals,
};
use crate::state::{get_state, get_state_mut, reset_state, MatchState};

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Structured API error with codes and details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self { code: code.to_string(), message: message.to_string(), details: None }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

fn respond<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| "{}".to_string())
}

fn parse_request<T: for<'de> Deserialize<'de>, D: Serialize>(
    request_json: &str,
) -> Result<T, String> {
    serde_json::from_str(request_json).map_err(|e| {
        warn!("Failed to parse request: {}", e);
        let error = ApiError::new("INVALID_JSON", &format!("Invalid JSON format: {}", e));
        respond(&ApiResponse::<D>::error(error))
    })
}

fn parse_slot<D: Serialize>(slot: u8) -> Result<RotationSlot, String> {
    RotationSlot::from_number(slot).ok_or_else(|| {
        let error =
            ApiError::new("INVALID_SLOT", &format!("Slot must be 1..=6, got {}", slot));
        respond(&ApiResponse::<D>::error(error))
    })
}

/// Scoreboard summary attached to every mutating response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub score_a: u16,
    pub score_b: u16,
    pub sets_won_a: u8,
    pub sets_won_b: u8,
    pub set_number: u8,
    pub serving_team: TeamId,
    pub rally: RallyState,
}

impl MatchSummary {
    fn of(state: &MatchState) -> Self {
        Self {
            score_a: state.score_a,
            score_b: state.score_b,
            sets_won_a: state.sets_won_a,
            sets_won_b: state.sets_won_b,
            set_number: state.set_number,
            serving_team: state.serving_team,
            rally: state.rally_state(),
        }
    }
}

/// Outcome of one mutating call: the advisory, if any, plus the scoreboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationResponse {
    pub advisory: Option<Advisory>,
    pub summary: MatchSummary,
}

fn mutation_response(state: &MatchState, advisory: Option<Advisory>) -> String {
    respond(&ApiResponse::success(MutationResponse { advisory, summary: MatchSummary::of(state) }))
}

// ========================
// Roster endpoints
// ========================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerRequest {
    pub team: TeamId,
    pub name: String,
    pub number: u8,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResponse {
    pub player: Player,
}

/// Add a player to the roster
pub fn create_player_json(request_json: &str) -> String {
    let request: CreatePlayerRequest =
        match parse_request::<_, PlayerResponse>(request_json) {
            Ok(req) => req,
            Err(response) => return response,
        };

    let player = Player::new(request.team, request.name, request.number, request.position);
    info!("Created player {} ({})", player.name, player.id);
    let mut state = get_state_mut();
    state.add_player(player.clone());
    respond(&ApiResponse::success(PlayerResponse { player }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePlayerRequest {
    pub player_id: String,
    pub name: Option<String>,
    pub number: Option<u8>,
    pub position: Option<Position>,
}

/// Update a player's name, number or position
pub fn update_player_json(request_json: &str) -> String {
    let request: UpdatePlayerRequest =
        match parse_request::<_, MutationResponse>(request_json) {
            Ok(req) => req,
            Err(response) => return response,
        };

    let mut state = get_state_mut();
    let advisory =
        state.update_player(&request.player_id, request.name, request.number, request.position);
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovePlayerRequest {
    pub player_id: String,
}

/// Remove a player and every reference to them
pub fn remove_player_json(request_json: &str) -> String {
    let request: RemovePlayerRequest =
        match parse_request::<_, MutationResponse>(request_json) {
            Ok(req) => req,
            Err(response) => return response,
        };

    let mut state = get_state_mut();
    let advisory = match state.remove_player(&request.player_id) {
        Some(player) => {
            info!("Removed player {} ({})", player.name, player.id);
            None
        }
        None => Some(Advisory::warn(format!("Unknown player: {}", request.player_id))),
    };
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub number: u8,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRosterRequest {
    pub team: TeamId,
    pub players: Vec<RosterEntry>,
}

/// Replace one team's roster wholesale; stale court and libero references
/// are cleared.
pub fn replace_roster_json(request_json: &str) -> String {
    let request: ReplaceRosterRequest =
        match parse_request::<_, RosterResponse>(request_json) {
            Ok(req) => req,
            Err(response) => return response,
        };

    let players: Vec<Player> = request
        .players
        .into_iter()
        .map(|p| Player::new(request.team, p.name, p.number, p.position))
        .collect();
    info!("Replacing roster for team {} with {} players", request.team, players.len());
    let mut state = get_state_mut();
    state.replace_roster(request.team, players.clone());
    respond(&ApiResponse::success(RosterResponse { players }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterQueryRequest {
    pub team: Option<TeamId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResponse {
    pub players: Vec<Player>,
}

/// Fetch the roster, optionally filtered by team
pub fn get_roster_json(request_json: &str) -> String {
    let request: RosterQueryRequest = match parse_request::<_, RosterResponse>(request_json) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let state = get_state();
    let players = state
        .roster
        .iter()
        .filter(|p| request.team.is_none_or(|t| p.team == t))
        .cloned()
        .collect();
    respond(&ApiResponse::success(RosterResponse { players }))
}

// ========================
// Court endpoints
// ========================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignPlayerRequest {
    pub team: TeamId,
    pub slot: u8,
    pub player_id: String,
}

/// Put a player into a rotation slot
pub fn assign_player_json(request_json: &str) -> String {
    let request: AssignPlayerRequest =
        match parse_request::<_, MutationResponse>(request_json) {
            Ok(req) => req,
            Err(response) => return response,
        };
    let slot = match parse_slot::<MutationResponse>(request.slot) {
        Ok(slot) => slot,
        Err(response) => return response,
    };

    let mut state = get_state_mut();
    let advisory = state.assign_player(request.team, slot, &request.player_id);
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearSlotRequest {
    pub team: TeamId,
    pub slot: u8,
}

/// Empty a rotation slot
pub fn clear_slot_json(request_json: &str) -> String {
    let request: ClearSlotRequest = match parse_request::<_, MutationResponse>(request_json) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let slot = match parse_slot::<MutationResponse>(request.slot) {
        Ok(slot) => slot,
        Err(response) => return response,
    };

    let mut state = get_state_mut();
    let advisory = state.clear_slot(request.team, slot);
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapSlotsRequest {
    pub team: TeamId,
    pub slot_a: u8,
    pub slot_b: u8,
}

/// Swap the occupants of two slots on one court
pub fn swap_slots_json(request_json: &str) -> String {
    let request: SwapSlotsRequest = match parse_request::<_, MutationResponse>(request_json) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let slot_a = match parse_slot::<MutationResponse>(request.slot_a) {
        Ok(slot) => slot,
        Err(response) => return response,
    };
    let slot_b = match parse_slot::<MutationResponse>(request.slot_b) {
        Ok(slot) => slot,
        Err(response) => return response,
    };

    let mut state = get_state_mut();
    let advisory = state.swap_slots(request.team, slot_a, slot_b);
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateRequest {
    pub team: TeamId,
    pub direction: RotationDirection,
}

/// Rotate a team's court in the given visual direction
pub fn rotate_json(request_json: &str) -> String {
    let request: RotateRequest = match parse_request::<_, MutationResponse>(request_json) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let mut state = get_state_mut();
    let advisory = state.rotate_visual(request.team, request.direction);
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiberoConfigRequest {
    pub team: TeamId,
    pub config: LiberoConfig,
}

/// Install a team's libero configuration
pub fn set_libero_config_json(request_json: &str) -> String {
    let request: LiberoConfigRequest =
        match parse_request::<_, MutationResponse>(request_json) {
            Ok(req) => req,
            Err(response) => return response,
        };

    let mut state = get_state_mut();
    let advisory = state.set_libero_config(request.team, request.config);
    mutation_response(&state, advisory)
}

// ========================
// Action and score endpoints
// ========================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogActionRequest {
    pub team: TeamId,
    pub slot: u8,
    pub skill: String,
    pub outcome: String,
}

/// Log one contact. Skill and outcome arrive as labels and are parsed once
/// here; everything past this boundary is typed.
pub fn log_action_json(request_json: &str) -> String {
    let request: LogActionRequest = match parse_request::<_, MutationResponse>(request_json) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let slot = match parse_slot::<MutationResponse>(request.slot) {
        Ok(slot) => slot,
        Err(response) => return response,
    };
    let skill: Skill = match request.skill.parse() {
        Ok(skill) => skill,
        Err(e) => {
            let error = ApiError::new("UNKNOWN_SKILL", &format!("{}", e));
            return respond(&ApiResponse::<MutationResponse>::error(error));
        }
    };
    let outcome = match Outcome::parse(skill, &request.outcome) {
        Ok(outcome) => outcome,
        Err(e) => {
            let error = ApiError::new("UNKNOWN_OUTCOME", &format!("{}", e));
            return respond(&ApiResponse::<MutationResponse>::error(error));
        }
    };

    let mut state = get_state_mut();
    let advisory = state.log_action(request.team, slot, skill, outcome);
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoRequest {
    /// Undo back through this event; omitted means just the latest
    pub event_id: Option<u64>,
}

/// Undo the latest event, or everything back through a given event id
pub fn undo_json(request_json: &str) -> String {
    let request: UndoRequest = match parse_request::<_, MutationResponse>(request_json) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let mut state = get_state_mut();
    let advisory = match request.event_id {
        Some(event_id) => state.undo_from(event_id),
        None => state.undo_last(),
    };
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustScoreRequest {
    pub team: TeamId,
    /// +1 applies full sideout semantics; -1 is a plain correction
    pub delta: i8,
}

/// Manual score adjustment
pub fn adjust_score_json(request_json: &str) -> String {
    let request: AdjustScoreRequest = match parse_request::<_, MutationResponse>(request_json) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let mut state = get_state_mut();
    let advisory = match request.delta {
        1 => state.increment_score(request.team),
        -1 => state.decrement_score(request.team),
        other => {
            let error = ApiError::new(
                "INVALID_DELTA",
                &format!("Score adjustments are single steps, got {}", other),
            );
            return respond(&ApiResponse::<MutationResponse>::error(error));
        }
    };
    mutation_response(&state, advisory)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndSetRequest {
    /// Record the set for this team regardless of the score
    pub forced_winner: Option<TeamId>,
}

/// Close the current set
pub fn end_set_json(request_json: &str) -> String {
    let request: EndSetRequest = match parse_request::<_, MutationResponse>(request_json) {
        Ok(req) => req,
        Err(response) => return response,
    };

    let mut state = get_state_mut();
    let advisory = state.end_set(request.forced_winner);
    mutation_response(&state, advisory)
}

// ========================
// Query endpoints
// ========================

/// Full aggregate dump for UI hydration
pub fn get_match_state_json() -> String {
    let state = get_state();
    respond(&ApiResponse::success(state.clone()))
}

/// Legal skills and acting team for the next contact
pub fn get_rally_state_json() -> String {
    let state = get_state();
    respond(&ApiResponse::success(state.rally_state()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub player_stats: std::collections::BTreeMap<String, PlayerStatLine>,
    pub totals_a: TeamTotals,
    pub totals_b: TeamTotals,
}

/// Whole-match statistics: archived sets merged with the live log
pub fn get_stats_json() -> String {
    let state = get_state();
    let player_stats = stats::match_stats(&state.roster, &state.set_records, &state.events);
    let all_events: Vec<_> = state
        .set_records
        .iter()
        .flat_map(|r| r.events.iter())
        .chain(state.events.iter())
        .collect();
    let totals_a = stats::team_totals(all_events.iter().copied(), TeamId::A);
    let totals_b = stats::team_totals(all_events.iter().copied(), TeamId::B);
    respond(&ApiResponse::success(StatsResponse { player_stats, totals_a, totals_b }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRequest {
    pub bucket: RoleBucket,
}

/// Ranked players of one role bucket
pub fn get_leaderboard_json(request_json: &str) -> String {
    let request: LeaderboardRequest =
        match parse_request::<_, Vec<stats::LeaderboardEntry>>(request_json) {
            Ok(req) => req,
            Err(response) => return response,
        };

    let state = get_state();
    let lines = stats::match_stats(&state.roster, &state.set_records, &state.events);
    let board = stats::leaderboard(&state.roster, &lines, request.bucket);
    respond(&ApiResponse::success(board))
}

/// Wipe the global state back to an empty match
pub fn reset_match_json() -> String {
    info!("Resetting match state");
    reset_state();
    let state = get_state();
    mutation_response(&state, None)
}
