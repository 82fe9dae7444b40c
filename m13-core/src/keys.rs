//! Secret resolution for the save cipher key and the checksum salt
//!
//! Secrets come from the process environment, falling back to values compiled
//! into debug builds. Each name is resolved once and cached for the life of the
//! provider, including a miss.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use log::{debug, error, warn};

use crate::error::{Result, SaveError};

pub const ENCRYPTION_KEY_VAR: &str = "MICKEY13_SAVE_ENCRYPTION_KEY";
pub const SECRET_SALT_VAR: &str = "MICKEY13_SECRET_SALT";

/// Minimum secret length: 8 characters of key followed by 8 of IV
pub const MIN_KEY_CHARS: usize = 16;

/// DES block, key and IV size in bytes
pub const SEGMENT_LEN: usize = 8;

/// Where secret values are looked up before the compiled-in fallbacks
pub trait SecretSource: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads secrets from the process environment
pub struct EnvSource;

impl SecretSource for EnvSource {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl SecretSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

pub struct KeyProvider {
    source: Box<dyn SecretSource>,
    fallbacks: HashMap<String, String>,
    cache: Mutex<HashMap<String, String>>,
}

impl KeyProvider {
    pub fn with_source(source: impl SecretSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            fallbacks: HashMap::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Environment-backed provider. Debug builds also pick up fallback values
    /// baked in at build time.
    pub fn from_env() -> Self {
        let provider = Self::with_source(EnvSource);

        #[cfg(debug_assertions)]
        let provider = {
            let mut provider = provider;
            if let Some(key) = option_env!("MICKEY13_SAVE_ENCRYPTION_KEY_FALLBACK") {
                provider = provider.with_fallback(ENCRYPTION_KEY_VAR, key);
            }
            if let Some(salt) = option_env!("MICKEY13_SECRET_SALT_FALLBACK") {
                provider = provider.with_fallback(SECRET_SALT_VAR, salt);
            }
            provider
        };

        provider
    }

    pub fn with_fallback(mut self, name: &str, value: &str) -> Self {
        self.fallbacks.insert(name.to_string(), value.to_string());
        self
    }

    /// Resolve both secrets now instead of on first use
    pub fn preload(&self) {
        if !self.has_usable_key() {
            warn!("Save encryption key not configured, saves will be written as plaintext");
        }
        if !self.has_usable_salt() {
            warn!("Secret salt not configured. Set {SECRET_SALT_VAR} before shipping builds.");
        }
    }

    /// Resolve a secret by name. A miss is cached as empty and reported as `None`.
    pub fn resolve(&self, name: &str) -> Option<String> {
        // Held across the lookup so the first resolution happens once
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        let value = cache
            .entry(name.to_string())
            .or_insert_with(|| {
                let found = self
                    .source
                    .lookup(name)
                    .filter(|v| !v.is_empty())
                    .or_else(|| self.fallbacks.get(name).cloned())
                    .unwrap_or_default();
                debug!("Resolved secret {name} (configured: {})", !found.is_empty());
                found
            })
            .clone();

        if value.is_empty() { None } else { Some(value) }
    }

    pub fn encryption_key(&self) -> Option<String> {
        self.resolve(ENCRYPTION_KEY_VAR).map(|k| k.trim().to_string())
    }

    pub fn has_usable_key(&self) -> bool {
        match self.encryption_key() {
            None => false,
            Some(key) => match KeyMaterial::new(&key) {
                Ok(_) => true,
                Err(e) => {
                    error!("Encryption key unusable: {e}");
                    false
                }
            },
        }
    }

    pub fn key_material(&self) -> Result<KeyMaterial> {
        match self.encryption_key() {
            Some(key) => KeyMaterial::new(&key),
            None => Err(SaveError::Configuration(format!(
                "encryption key not configured ({ENCRYPTION_KEY_VAR})"
            ))),
        }
    }

    pub fn secret_salt(&self) -> Option<String> {
        self.resolve(SECRET_SALT_VAR)
    }

    pub fn has_usable_salt(&self) -> bool {
        self.secret_salt().is_some()
    }
}

/// Cipher key and IV derived from a single secret: the first 8 characters are
/// the key, the next 8 the IV. Existing save files depend on this split.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    key: [u8; SEGMENT_LEN],
    iv: [u8; SEGMENT_LEN],
}

impl KeyMaterial {
    pub fn new(secret: &str) -> Result<Self> {
        if secret.chars().count() < MIN_KEY_CHARS {
            return Err(SaveError::Configuration(format!(
                "encryption key must be at least {MIN_KEY_CHARS} characters"
            )));
        }

        let key_part: String = secret.chars().take(SEGMENT_LEN).collect();
        let iv_part: String = secret.chars().skip(SEGMENT_LEN).take(SEGMENT_LEN).collect();

        Ok(Self {
            key: segment_bytes(&key_part)?,
            iv: segment_bytes(&iv_part)?,
        })
    }

    pub fn key(&self) -> &[u8; SEGMENT_LEN] {
        &self.key
    }

    pub fn iv(&self) -> &[u8; SEGMENT_LEN] {
        &self.iv
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial(..)")
    }
}

fn segment_bytes(segment: &str) -> Result<[u8; SEGMENT_LEN]> {
    segment.as_bytes().try_into().map_err(|_| {
        SaveError::Configuration(format!(
            "key segment encodes to {} bytes, expected {SEGMENT_LEN}",
            segment.len()
        ))
    })
}
