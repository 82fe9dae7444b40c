use std::collections::HashMap;
use std::sync::Arc;

use m13_core::record::{CharacterSave, CurrencySave};
use m13_core::{
    ChecksumService, CipherEngine, ENCRYPTION_KEY_VAR, GameLogicValidator, IntegrityChecker,
    KeyProvider, LoadSource, SECRET_SALT_VAR, SaveCodec, SavePersistence, SavePolicy, SaveRecord,
};
use tempfile::TempDir;

const SECRET: &str = "ABCDEFGHIJKLMNOP";

fn progressed_record() -> SaveRecord {
    SaveRecord {
        gold: Some(CurrencySave::new(5_000)),
        soulstone: Some(CurrencySave::new(12)),
        diamond: 300,
        stage_level: 58,
        next_mid_boss_km: 3,
        next_boss_km: 8,
        cur_achievement_km: 410,
        max_achievement_km_ever: 410,
        characters: vec![CharacterSave { id: 7, level: 19 }],
        ..SaveRecord::default()
    }
}

fn provider() -> Arc<KeyProvider> {
    let mut map = HashMap::new();
    map.insert(ENCRYPTION_KEY_VAR.to_string(), SECRET.to_string());
    map.insert(SECRET_SALT_VAR.to_string(), "saltA".to_string());
    Arc::new(KeyProvider::with_source(map))
}

#[test]
fn encrypt_decrypt_and_salted_digest() {
    let json = SaveCodec::new().serialize(&progressed_record(), true).unwrap();

    let engine = CipherEngine::new();
    let encrypted = engine.encrypt_with_secret(&json, SECRET).unwrap();
    assert_eq!(engine.decrypt_with_secret(&encrypted, SECRET).unwrap(), json);

    let checksum = ChecksumService::new();
    assert_ne!(checksum.digest(&json, "saltA"), checksum.digest(&json, "saltB"));
}

#[test]
fn saved_game_survives_restart_and_validates() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user.json");

    let store = SavePersistence::new(&path, provider());
    store.save(&progressed_record(), SavePolicy::default()).unwrap();

    // A new process: fresh provider, same environment
    let restarted = SavePersistence::new(&path, provider());
    let outcome = restarted.load_detailed();
    assert_eq!(outcome.source, LoadSource::Decrypted);
    assert_eq!(outcome.record, progressed_record());
    assert!(GameLogicValidator::new().validate(&outcome.record).is_ok());
}

#[test]
fn cloud_roundtrip_rejects_edited_save() {
    let checker = IntegrityChecker::new(provider());
    let payload = checker.prepare_upload(&progressed_record()).unwrap();
    assert_eq!(checker.accept_download(&payload), Some(progressed_record()));

    let mut edited = payload.clone();
    edited.serialized = edited.serialized.replace("\"diamond\":300", "\"diamond\":999999");
    assert_ne!(edited.serialized, payload.serialized);
    assert!(checker.accept_download(&edited).is_none());
}

#[test]
fn debug_plaintext_save_can_be_read_by_a_keyless_build() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("user.json");

    SavePersistence::new(&path, provider())
        .save(&progressed_record(), SavePolicy { debug_mode: true })
        .unwrap();

    let keyless = Arc::new(KeyProvider::with_source(HashMap::<String, String>::new()));
    let outcome = SavePersistence::new(&path, keyless).load_detailed();
    assert_eq!(outcome.source, LoadSource::Plaintext);
    assert_eq!(outcome.record, progressed_record());
}
