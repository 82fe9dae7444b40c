//! DES-CBC/PKCS#7 encryption and decryption of save text
//!
//! Ciphertext is carried as standard Base64. The scheme is weak (56-bit key,
//! no authentication) but existing save files are written with it, so it is
//! reproduced exactly. A new file format version should switch to a real KDF
//! and an authenticated mode instead.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};

use crate::error::{Result, SaveError};
use crate::keys::{KeyMaterial, SEGMENT_LEN};

type DesCbcEnc = cbc::Encryptor<des::Des>;
type DesCbcDec = cbc::Decryptor<des::Des>;

#[derive(Debug, Clone, Copy, Default)]
pub struct CipherEngine;

impl CipherEngine {
    pub fn new() -> Self {
        Self
    }

    /// Encrypts UTF-8 text and returns Base64 ciphertext
    pub fn encrypt(&self, plaintext: &str, key: &KeyMaterial) -> Result<String> {
        let enc = DesCbcEnc::new_from_slices(key.key(), key.iv()).map_err(invalid_length)?;
        let cipher = enc.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Ok(STANDARD.encode(cipher))
    }

    /// Decrypts Base64 ciphertext back to UTF-8 text
    pub fn decrypt(&self, ciphertext: &str, key: &KeyMaterial) -> Result<String> {
        let cipher = STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| SaveError::Decryption(format!("invalid Base64: {e}")))?;

        if cipher.is_empty() || cipher.len() % SEGMENT_LEN != 0 {
            return Err(SaveError::Decryption(format!(
                "cipher len {} is not a multiple of {SEGMENT_LEN}",
                cipher.len()
            )));
        }

        let dec = DesCbcDec::new_from_slices(key.key(), key.iv()).map_err(invalid_length)?;
        let plain = dec
            .decrypt_padded_vec_mut::<Pkcs7>(&cipher)
            .map_err(|_| SaveError::Decryption("padding check failed (wrong key?)".to_string()))?;

        String::from_utf8(plain)
            .map_err(|e| SaveError::Decryption(format!("decrypted text is not UTF-8: {e}")))
    }

    pub fn encrypt_with_secret(&self, plaintext: &str, secret: &str) -> Result<String> {
        self.encrypt(plaintext, &KeyMaterial::new(secret)?)
    }

    pub fn decrypt_with_secret(&self, ciphertext: &str, secret: &str) -> Result<String> {
        self.decrypt(ciphertext, &KeyMaterial::new(secret)?)
    }
}

fn invalid_length(_: cbc::cipher::InvalidLength) -> SaveError {
    SaveError::Configuration(format!("DES key and IV must be {SEGMENT_LEN} bytes each"))
}
