//! core functionality for protecting the Mickey13
//! game-progress save file
//!
//! # Modules
//!
//! - `keys`: secret resolution and key/IV derivation
//! - `crypto`: DES-CBC encryption and decryption
//! - `checksum`: salted MD5 digests
//! - `record`: the persisted record
//! - `codec`: JSON encoding/decoding and stored-format detection
//! - `validate`: semantic bounds checks
//! - `integrity`: checksum + game-logic gate for cloud payloads
//! - `persistence`: save/load against the backing file
//! - `locator`: default save file location

pub mod checksum;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod integrity;
pub mod keys;
pub mod locator;
pub mod persistence;
pub mod record;
pub mod validate;

// Re-export commonly used items
pub use checksum::ChecksumService;
pub use codec::{SaveCodec, StoredFormat};
pub use crypto::CipherEngine;
pub use error::{Result, SaveError, ValidationError};
pub use integrity::{CloudPayload, IntegrityChecker};
pub use keys::{ENCRYPTION_KEY_VAR, KeyMaterial, KeyProvider, SECRET_SALT_VAR, SecretSource};
pub use persistence::{LoadOutcome, LoadSource, SaveOutcome, SavePersistence, SavePolicy};
pub use record::{RecordSnapshot, SaveRecord};
pub use validate::GameLogicValidator;
