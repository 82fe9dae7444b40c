//! Checksum and game-logic gatekeeping for save data crossing a trust boundary
//!
//! Cloud sync hands over `(serialized, checksum)` pairs; nothing from such a pair
//! reaches gameplay before [`IntegrityChecker::full_validation`] accepts it.

use std::sync::Arc;

use log::{error, info, warn};

use crate::checksum::ChecksumService;
use crate::codec::SaveCodec;
use crate::error::{Result, SaveError};
use crate::keys::{KeyProvider, SECRET_SALT_VAR};
use crate::record::SaveRecord;
use crate::validate::GameLogicValidator;

/// Serialized record and its salted checksum, as exchanged with cloud storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudPayload {
    pub serialized: String,
    pub checksum: String,
}

pub struct IntegrityChecker {
    keys: Arc<KeyProvider>,
    checksum: ChecksumService,
    validator: GameLogicValidator,
    codec: SaveCodec,
}

impl IntegrityChecker {
    pub fn new(keys: Arc<KeyProvider>) -> Self {
        if !keys.has_usable_salt() {
            warn!(
                "[Integrity] Secret salt not configured. Set {SECRET_SALT_VAR} before shipping builds."
            );
        }
        Self {
            keys,
            checksum: ChecksumService::new(),
            validator: GameLogicValidator::new(),
            codec: SaveCodec::new(),
        }
    }

    fn salt(&self) -> String {
        self.keys.secret_salt().unwrap_or_default()
    }

    pub fn generate_checksum(&self, data: &str) -> String {
        self.checksum.digest(data, &self.salt())
    }

    pub fn verify_checksum(&self, data: &str, checksum: &str) -> bool {
        if data.is_empty() || checksum.is_empty() {
            return false;
        }

        let valid = self.checksum.verify(data, &self.salt(), checksum);
        if !valid {
            warn!("[Integrity] Checksum mismatch!");
        }
        valid
    }

    /// Like [`verify_checksum`](Self::verify_checksum) but reports the digests
    pub fn check_checksum(&self, data: &str, checksum: &str) -> Result<()> {
        if self.verify_checksum(data, checksum) {
            Ok(())
        } else {
            Err(SaveError::ChecksumMismatch {
                expected: checksum.to_string(),
                actual: self.generate_checksum(data),
            })
        }
    }

    /// Parse and bounds-check serialized save data
    pub fn validate_game_logic(&self, save_json: &str) -> bool {
        if save_json.is_empty() {
            return false;
        }

        let Some(record) = self.codec.try_deserialize(save_json) else {
            warn!("[Integrity] Save data failed to parse (data null)");
            return false;
        };

        self.validator.validate(&record).is_ok()
    }

    /// Checksum first, then game logic
    pub fn full_validation(&self, save_json: &str, checksum: &str) -> bool {
        if !self.verify_checksum(save_json, checksum) {
            error!("[Integrity] Checksum verification failed");
            return false;
        }

        if !self.validate_game_logic(save_json) {
            error!("[Integrity] Game logic verification failed");
            return false;
        }

        info!("[Integrity] Full integrity verification passed");
        true
    }

    pub fn prepare_upload(&self, record: &SaveRecord) -> Result<CloudPayload> {
        let serialized = self.codec.serialize(record, false)?;
        let checksum = self.generate_checksum(&serialized);
        Ok(CloudPayload {
            serialized,
            checksum,
        })
    }

    /// Validate a downloaded payload and hand back the record it carries
    pub fn accept_download(&self, payload: &CloudPayload) -> Option<SaveRecord> {
        if !self.full_validation(&payload.serialized, &payload.checksum) {
            return None;
        }
        self.codec.try_deserialize(&payload.serialized)
    }
}
