//! Save and load of the single backing save file
//!
//! Loading never fails: a missing, unreadable or undecryptable file degrades to
//! a fresh record and the reason is logged. Saving falls back to plaintext when
//! no usable key is configured.
//!
//! No locking is done around the file. Callers must not run `save`/`load`
//! concurrently against the same path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info, warn};

use crate::codec::{SaveCodec, StoredFormat};
use crate::crypto::CipherEngine;
use crate::error::Result;
use crate::keys::KeyProvider;
use crate::record::SaveRecord;

/// Caller-side switches for a save
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavePolicy {
    /// Write readable JSON even when a key is configured
    pub debug_mode: bool,
}

/// How a save was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Plaintext,
    Encrypted,
}

/// Where a loaded record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// No save file yet; fresh record
    Missing,
    Plaintext,
    Decrypted,
    /// File present but unusable; fresh record
    Recovered { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub record: SaveRecord,
    pub source: LoadSource,
}

impl LoadOutcome {
    fn recovered(reason: String) -> Self {
        error!("Save file load failed: {reason}");
        Self {
            record: SaveRecord::default(),
            source: LoadSource::Recovered { reason },
        }
    }
}

pub struct SavePersistence {
    path: PathBuf,
    keys: Arc<KeyProvider>,
    cipher: CipherEngine,
    codec: SaveCodec,
}

impl SavePersistence {
    pub fn new(path: impl Into<PathBuf>, keys: Arc<KeyProvider>) -> Self {
        Self {
            path: path.into(),
            keys,
            cipher: CipherEngine::new(),
            codec: SaveCodec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save_exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> SaveRecord {
        self.load_detailed().record
    }

    pub fn load_detailed(&self) -> LoadOutcome {
        if !self.path.exists() {
            info!("No save file at {}, starting fresh", self.path.display());
            return LoadOutcome {
                record: SaveRecord::default(),
                source: LoadSource::Missing,
            };
        }

        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => return LoadOutcome::recovered(format!("read failed: {e}")),
        };

        match self.codec.detect_format(&raw) {
            StoredFormat::Plaintext(record) => {
                info!("Save loaded (plaintext)");
                LoadOutcome {
                    record,
                    source: LoadSource::Plaintext,
                }
            }
            StoredFormat::NeedsDecryption(cipher) => self.load_encrypted(&cipher),
            StoredFormat::Invalid => LoadOutcome::recovered("save file is empty".to_string()),
        }
    }

    fn load_encrypted(&self, cipher: &str) -> LoadOutcome {
        if !self.keys.has_usable_key() {
            return LoadOutcome::recovered(
                "no encryption key configured to decrypt the save file".to_string(),
            );
        }

        let result = self
            .keys
            .key_material()
            .and_then(|key| self.cipher.decrypt(cipher, &key))
            .and_then(|json| self.codec.deserialize(&json));

        match result {
            Ok(record) => {
                info!("Save loaded (decrypted)");
                LoadOutcome {
                    record,
                    source: LoadSource::Decrypted,
                }
            }
            Err(e) => LoadOutcome::recovered(e.to_string()),
        }
    }

    /// Serialize, optionally encrypt, and overwrite the backing file
    pub fn save(&self, record: &SaveRecord, policy: SavePolicy) -> Result<SaveOutcome> {
        let json = self.codec.serialize(record, true)?;

        let use_encryption = !policy.debug_mode;
        let can_encrypt = self.keys.has_usable_key();

        let (content, outcome) = if use_encryption && can_encrypt {
            let key = self.keys.key_material()?;
            (self.cipher.encrypt(&json, &key)?, SaveOutcome::Encrypted)
        } else {
            if use_encryption {
                warn!("Encryption key not configured. Save data is written as plaintext.");
            }
            (json, SaveOutcome::Plaintext)
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;

        match outcome {
            SaveOutcome::Encrypted => info!("Save complete (encrypted): {}", self.path.display()),
            SaveOutcome::Plaintext => info!("Save complete (plaintext): {}", self.path.display()),
        }
        Ok(outcome)
    }

    /// Encrypt arbitrary text for storage, passing it through unchanged when
    /// no usable key is configured
    pub fn encrypt_to_string(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        if !self.keys.has_usable_key() {
            warn!("Encryption key not configured. Returning plaintext data.");
            return Ok(plaintext.to_string());
        }

        let key = self.keys.key_material()?;
        self.cipher.encrypt(plaintext, &key)
    }

    /// Decrypt text produced by [`encrypt_to_string`](Self::encrypt_to_string)
    pub fn decrypt_to_string(&self, encrypted: &str) -> Option<String> {
        if encrypted.is_empty() {
            return None;
        }

        match self
            .keys
            .key_material()
            .and_then(|key| self.cipher.decrypt(encrypted, &key))
        {
            Ok(json) => Some(json),
            Err(e) => {
                error!("Save decryption failed: {e}");
                None
            }
        }
    }
}
