//! Semantic bounds checks over a structurally valid record
//!
//! Checks run in a fixed order and stop at the first violation. Currency values
//! are never checked: zero and negative balances are legitimate game states.

use log::{debug, warn};

use crate::error::ValidationError;
use crate::record::SaveRecord;

pub const MIN_STAGE_LEVEL: i32 = 1;
pub const MAX_STAGE_LEVEL: i32 = 10_000;
pub const MAX_NEXT_BOSS_KM: i64 = 1_000_000;
pub const MAX_COLLECTION_LEN: usize = 500;

#[derive(Debug, Clone, Copy, Default)]
pub struct GameLogicValidator;

impl GameLogicValidator {
    pub fn new() -> Self {
        Self
    }

    /// Accept or reject a record. Rejections are logged with a field snapshot.
    pub fn validate(&self, record: &SaveRecord) -> Result<(), ValidationError> {
        match check(record) {
            Ok(()) => {
                debug!("Game logic validation passed");
                Ok(())
            }
            Err(violation) => {
                warn!("[Integrity] {violation}");
                warn!("[Integrity] Snapshot => {}", record.snapshot());
                Err(violation)
            }
        }
    }
}

fn check(record: &SaveRecord) -> Result<(), ValidationError> {
    if !(MIN_STAGE_LEVEL..=MAX_STAGE_LEVEL).contains(&record.stage_level) {
        return Err(ValidationError::StageLevel(record.stage_level));
    }

    if !(0..=MAX_NEXT_BOSS_KM).contains(&record.next_boss_km) {
        return Err(ValidationError::NextBossDistance(record.next_boss_km));
    }

    if record.next_mid_boss_km < 0 {
        return Err(ValidationError::NextMidBossDistance(record.next_mid_boss_km));
    }

    let collections = [
        ("character", record.characters.len()),
        ("artifact", record.artifacts.len()),
        ("rune", record.runes.len()),
        ("quest", record.quests.len()),
        ("active quest", record.active_quests.len()),
    ];
    for (collection, count) in collections {
        if count > MAX_COLLECTION_LEN {
            return Err(ValidationError::CollectionTooLarge { collection, count });
        }
    }

    if record.cur_achievement_km > record.max_achievement_km_ever {
        return Err(ValidationError::AchievementDistance {
            current: record.cur_achievement_km,
            max: record.max_achievement_km_ever,
        });
    }

    Ok(())
}
