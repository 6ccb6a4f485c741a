//! JSON string-in / string-out API for UI integration.

pub mod json_api;

pub use json_api::{
    adjust_score_json, assign_player_json, clear_slot_json, create_player_json, end_set_json,
    get_leaderboard_json, get_match_state_json, get_rally_state_json, get_roster_json,
    get_stats_json, log_action_json, remove_player_json, replace_roster_json, reset_match_json,
    rotate_json, set_libero_config_json, swap_slots_json, undo_json, update_player_json,
    API_VERSION,
};
