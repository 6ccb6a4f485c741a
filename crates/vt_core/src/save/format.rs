use super::error::SaveError;
use super::SAVE_VERSION;
use crate::state::MatchState;
use serde::{Deserialize, Serialize};

use chrono::Utc;
use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

/// Persistent envelope around one tracked match
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MatchSave {
    /// Save format version for migration
    pub version: u32,

    /// Save timestamp (unix milliseconds)
    pub timestamp: u64,

    /// The full aggregate: roster, courts, scores, serving state, live
    /// event log, archived sets, libero configuration and rules
    pub match_state: MatchState,
}

impl Default for MatchSave {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchSave {
    pub fn new() -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: current_timestamp(),
            match_state: MatchState::new(),
        }
    }

    pub fn from_state(match_state: MatchState) -> Self {
        Self { version: SAVE_VERSION, timestamp: current_timestamp(), match_state }
    }

    pub fn update_timestamp(&mut self) {
        self.timestamp = current_timestamp();
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.match_state.roster.len() > 100 {
            return Err(SaveError::DataTooLarge { size: self.match_state.roster.len() });
        }

        if self.match_state.events.len() > 100_000 {
            return Err(SaveError::DataTooLarge { size: self.match_state.events.len() });
        }

        // Duplicate player ids break every reference in the aggregate
        let mut player_ids = std::collections::HashSet::new();
        for player in &self.match_state.roster {
            if !player_ids.insert(&player.id) {
                return Err(SaveError::Corrupted);
            }
        }

        Ok(())
    }
}

/// Serialize and compress a match save
pub fn serialize_and_compress(save: &MatchSave) -> Result<Vec<u8>, SaveError> {
    save.validate()?;

    // 1. Serialize to MessagePack with field names
    let msgpack = to_vec_named(save).map_err(SaveError::Serialization)?;

    // 2. Compress with LZ4 (size prepended for easy decompression)
    let compressed = compress_prepend_size(&msgpack);

    // 3. Add SHA256 checksum at the end
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Decompress and deserialize a match save
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<MatchSave, SaveError> {
    // Minimum size: length header + checksum
    if bytes.len() < 4 + 32 {
        return Err(SaveError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;

    let save: MatchSave = from_slice(&msgpack).map_err(SaveError::Deserialization)?;

    if save.version > SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }

    Ok(save)
}

pub fn current_timestamp() -> u64 {
    Utc::now().timestamp_millis() as u64
}
